//! Account scans against the base ledger and the venue

use anyhow::{Context, Result};
use ephemeral_pool::state::{
    read_from, Delegatable, DepositReceiptAccount, LiquidityProviderAccount, PoolAccount,
    WithdrawReceiptAccount, ZeroCopy,
};
use pool_model::{DelegationState, ReceiptStatus};
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, RpcFilterType},
};
use solana_sdk::pubkey::Pubkey;

use crate::error::KeeperError;
use crate::receipt_queue::{ReceiptKind, TrackedReceipt};

/// Addresses a settlement or reconcile transaction needs from the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolAddresses {
    pub pool: Pubkey,
    pub authority: Pubkey,
    pub lp_mint: Pubkey,
    pub token_a_mint: Pubkey,
    pub token_b_mint: Pubkey,
    pub vault_a: Pubkey,
    pub vault_b: Pubkey,
    pub fee_recipient: Pubkey,
}

pub fn decode_receipt(address: Pubkey, data: &[u8]) -> Result<TrackedReceipt, KeeperError> {
    let (kind, pool, provider, status, created_at) = if let Some(r) = read_from::<DepositReceiptAccount>(data) {
        (ReceiptKind::Deposit, r.pool, r.provider, r.status, r.created_at)
    } else if let Some(r) = read_from::<WithdrawReceiptAccount>(data) {
        (ReceiptKind::Withdraw, r.pool, r.provider, r.status, r.created_at)
    } else {
        return Err(KeeperError::NotAReceipt(address));
    };
    Ok(TrackedReceipt {
        address,
        kind,
        pool: Pubkey::new_from_array(pool),
        provider: Pubkey::new_from_array(provider),
        status: ReceiptStatus::from_u8(status).ok_or(KeeperError::UnknownStatus(address, status))?,
        created_at,
    })
}

pub fn decode_pool(address: Pubkey, data: &[u8]) -> Option<PoolAddresses> {
    let pool = read_from::<PoolAccount>(data)?;
    Some(PoolAddresses {
        pool: address,
        authority: Pubkey::new_from_array(pool.authority),
        lp_mint: Pubkey::new_from_array(pool.lp_mint),
        token_a_mint: Pubkey::new_from_array(pool.token_a_mint),
        token_b_mint: Pubkey::new_from_array(pool.token_b_mint),
        vault_a: Pubkey::new_from_array(pool.token_a_vault),
        vault_b: Pubkey::new_from_array(pool.token_b_vault),
        fee_recipient: Pubkey::new_from_array(pool.fee_recipient),
    })
}

/// Delegation state of any delegatable account image
pub fn decode_delegation_state(address: Pubkey, data: &[u8]) -> Result<DelegationState, KeeperError> {
    fn state_of<T: Delegatable>(data: &[u8]) -> Option<DelegationState> {
        read_from::<T>(data)?.delegation().ok().map(|d| d.state)
    }
    let magic = data.get(..8).ok_or(KeeperError::NotAnEntity(address))?;
    let state = if magic == PoolAccount::MAGIC {
        state_of::<PoolAccount>(data)
    } else if magic == LiquidityProviderAccount::MAGIC {
        state_of::<LiquidityProviderAccount>(data)
    } else if magic == DepositReceiptAccount::MAGIC {
        state_of::<DepositReceiptAccount>(data)
    } else if magic == WithdrawReceiptAccount::MAGIC {
        state_of::<WithdrawReceiptAccount>(data)
    } else {
        None
    };
    state.ok_or(KeeperError::NotAnEntity(address))
}

fn accounts_with_magic(client: &RpcClient, program: &Pubkey, magic: [u8; 8]) -> Result<Vec<(Pubkey, Vec<u8>)>> {
    let config = RpcProgramAccountsConfig {
        filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new_base58_encoded(0, &magic))]),
        account_config: RpcAccountInfoConfig {
            encoding: Some(UiAccountEncoding::Base64),
            ..Default::default()
        },
        ..Default::default()
    };
    let accounts = client
        .get_program_accounts_with_config(program, config)
        .context("getProgramAccounts failed")?;
    Ok(accounts.into_iter().map(|(key, account)| (key, account.data)).collect())
}

/// Every receipt owned by the program on the base ledger
pub fn fetch_receipts(client: &RpcClient, program: &Pubkey) -> Result<Vec<TrackedReceipt>> {
    let mut receipts = Vec::new();
    for magic in [DepositReceiptAccount::MAGIC, WithdrawReceiptAccount::MAGIC] {
        for (address, data) in accounts_with_magic(client, program, magic)? {
            match decode_receipt(address, &data) {
                Ok(receipt) => receipts.push(receipt),
                Err(e) => log::warn!("Skipping account: {}", e),
            }
        }
    }
    Ok(receipts)
}

pub fn fetch_pool(client: &RpcClient, pool: &Pubkey, receipt: &Pubkey) -> Result<PoolAddresses> {
    let account = client
        .get_account(pool)
        .context(format!("Failed to fetch pool {}", pool))?;
    decode_pool(*pool, &account.data).ok_or_else(|| {
        KeeperError::MissingPool {
            pool: *pool,
            receipt: *receipt,
        }
        .into()
    })
}

/// Entities the venue has flagged for undelegation
pub fn fetch_undelegating(ephemeral: &RpcClient, program: &Pubkey) -> Result<Vec<Pubkey>> {
    let accounts = ephemeral
        .get_program_accounts(program)
        .context("getProgramAccounts on venue failed")?;
    Ok(accounts
        .into_iter()
        .filter(|(address, account)| {
            decode_delegation_state(*address, &account.data) == Ok(DelegationState::Undelegating)
        })
        .map(|(address, _)| address)
        .collect())
}

/// Whether `entity` is owned by the program on the base ledger again
pub fn is_back_on_base(client: &RpcClient, program: &Pubkey, entity: &Pubkey) -> Result<bool> {
    let account = client
        .get_account(entity)
        .context(format!("Failed to fetch {}", entity))?;
    Ok(account.owner == *program)
}
