//! Ephemeral pool keeper
//!
//! Off-chain service that settles committed receipts on the base ledger,
//! reports or refunds orphaned receipts, and follows undelegations until the
//! base account is owned by the program again.

mod config;
mod error;
mod pda;
mod receipt_queue;
mod scanner;
mod tx_builder;

use anyhow::{Context, Result};
use config::Config;
use error::KeeperError;
use pool_model::ReconcileMode;
use receipt_queue::{ReceiptQueue, TrackedReceipt};
use scanner::PoolAddresses;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time;

struct Keeper {
    config: Config,
    base: RpcClient,
    ephemeral: RpcClient,
    wallet: Keypair,
    queue: ReceiptQueue,
    pools: HashMap<Pubkey, PoolAddresses>,
    undelegating: HashSet<Pubkey>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting ephemeral pool keeper");

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default devnet config", e);
        Config::default_devnet()
    });

    log::info!("Base RPC: {}", config.rpc_url);
    log::info!("Venue RPC: {}", config.ephemeral_rpc_url);
    log::info!("Pool program: {}", config.pool_program);

    let wallet = load_keypair(&config.expanded_keypair_path()?)?;
    log::info!("Keeper wallet: {}", wallet.pubkey());

    let mut keeper = Keeper {
        base: RpcClient::new_with_commitment(config.rpc_url.clone(), CommitmentConfig::confirmed()),
        ephemeral: RpcClient::new_with_commitment(config.ephemeral_rpc_url.clone(), CommitmentConfig::confirmed()),
        wallet,
        queue: ReceiptQueue::new(),
        pools: HashMap::new(),
        undelegating: HashSet::new(),
        config,
    };

    let mut interval = time::interval(Duration::from_secs(keeper.config.poll_interval_secs.max(1)));
    loop {
        interval.tick().await;

        if let Err(e) = keeper.scan_receipts() {
            log::error!("Receipt scan failed: {:#}", e);
            continue;
        }
        if let Err(e) = keeper.settle_committed() {
            log::error!("Settlement pass failed: {:#}", e);
        }
        if let Err(e) = keeper.handle_orphans(unix_now()) {
            log::error!("Orphan pass failed: {:#}", e);
        }
        if let Err(e) = keeper.follow_undelegations() {
            log::error!("Undelegation poll failed: {:#}", e);
        }

        if let Some(oldest) = keeper.queue.peek() {
            log::debug!("Receipt queue size: {}, oldest created at {}", keeper.queue.len(), oldest.created_at);
        }
    }
}

impl Keeper {
    fn scan_receipts(&mut self) -> Result<()> {
        let receipts = scanner::fetch_receipts(&self.base, &self.config.pool_program)?;
        let outstanding = receipts.into_iter().filter(|r| r.status.is_outstanding());
        self.queue.refresh(outstanding);
        Ok(())
    }

    fn pool_for(&mut self, receipt: &TrackedReceipt) -> Result<PoolAddresses> {
        if let Some(pool) = self.pools.get(&receipt.pool) {
            return Ok(*pool);
        }
        let pool = scanner::fetch_pool(&self.base, &receipt.pool, &receipt.address)?;
        self.pools.insert(receipt.pool, pool);
        Ok(pool)
    }

    fn submit(&self, instruction: Instruction) -> Result<Signature> {
        let blockhash = self.base.get_latest_blockhash().context("Failed to fetch blockhash")?;
        let tx = tx_builder::build_transaction(instruction, &self.wallet, blockhash)?;
        self.base
            .send_and_confirm_transaction(&tx)
            .context("Transaction failed")
    }

    /// Committed receipts are only visible here once their account is back on
    /// the base ledger, so every one of them can be settled.
    fn settle_committed(&mut self) -> Result<()> {
        let batch = self
            .queue
            .take_matching(self.config.max_settlements_per_batch, TrackedReceipt::is_settleable);
        if batch.is_empty() {
            log::debug!("No receipts to settle");
            return Ok(());
        }
        log::info!("Settling {} receipts", batch.len());

        for receipt in batch {
            let pool = match self.pool_for(&receipt) {
                Ok(pool) => pool,
                Err(e) => {
                    log::error!("Cannot settle {}: {:#}", receipt.address, e);
                    continue;
                }
            };
            let ix = tx_builder::build_settle_instruction(
                &self.config.pool_program,
                &self.wallet.pubkey(),
                &pool,
                &receipt,
            );
            match self.submit(ix) {
                Ok(signature) => log::info!("Settled {:?} receipt {}: {}", receipt.kind, receipt.address, signature),
                Err(e) => log::error!("Failed to settle {}: {:#}", receipt.address, e),
            }
        }
        Ok(())
    }

    fn handle_orphans(&mut self, now: i64) -> Result<()> {
        let after = self.config.reconcile_after_secs;
        let orphans = self.queue.take_matching(usize::MAX, |r| r.is_orphaned(now, after));
        for receipt in orphans {
            if !self.config.auto_refund_orphans {
                log::warn!(
                    "Receipt {} pending since {}; reconcile manually",
                    receipt.address,
                    receipt.created_at
                );
                continue;
            }
            let pool = match self.pool_for(&receipt) {
                Ok(pool) => pool,
                Err(e) => {
                    log::error!("Cannot reconcile {}: {:#}", receipt.address, e);
                    continue;
                }
            };
            if pool.authority != self.wallet.pubkey() {
                log::warn!("{}", KeeperError::OrphanNeedsAuthority(receipt.address));
                continue;
            }
            let ix = tx_builder::build_reconcile_instruction(
                &self.config.pool_program,
                &self.wallet.pubkey(),
                &pool,
                &receipt,
                ReconcileMode::Refund,
            );
            match self.submit(ix) {
                Ok(signature) => log::info!("Refunded orphaned receipt {}: {}", receipt.address, signature),
                Err(e) => log::error!("Failed to refund {}: {:#}", receipt.address, e),
            }
        }
        Ok(())
    }

    /// Undelegation is asynchronous; an entity is done only once the base
    /// ledger shows the program as owner again.
    fn follow_undelegations(&mut self) -> Result<()> {
        match scanner::fetch_undelegating(&self.ephemeral, &self.config.pool_program) {
            Ok(flagged) => {
                for entity in flagged {
                    if self.undelegating.insert(entity) {
                        log::info!("Undelegation requested for {}", entity);
                    }
                }
            }
            Err(e) => log::warn!("Venue scan failed: {:#}", e),
        }

        let mut finished = Vec::new();
        for entity in &self.undelegating {
            match scanner::is_back_on_base(&self.base, &self.config.pool_program, entity) {
                Ok(true) => finished.push(*entity),
                Ok(false) => log::debug!("{} still owned by the delegation program", entity),
                Err(e) => log::debug!("{} not yet re-created: {:#}", entity, e),
            }
        }
        for entity in finished {
            self.undelegating.remove(&entity);
            self.pools.remove(&entity);
            log::info!("Undelegation of {} finalized on base ledger", entity);
        }
        Ok(())
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Load keeper keypair from file
fn load_keypair(path: &str) -> Result<Keypair> {
    let bytes = std::fs::read(path).context(format!("Failed to read keypair from {}", path))?;

    let keypair = if bytes.first() == Some(&b'[') {
        // JSON format
        let json_data: Vec<u8> = serde_json::from_slice(&bytes).context("Failed to parse keypair JSON")?;
        Keypair::try_from(&json_data[..]).context("Failed to create keypair from bytes")?
    } else {
        Keypair::try_from(&bytes[..]).context("Failed to create keypair from bytes")?
    };

    Ok(keypair)
}
