//! Ephemeral Pool Integration Tests
//!
//! Simulated two-ledger harness. Accounts live as byte images either on the
//! base ledger or, while delegated, on the ephemeral venue. Every operation
//! decodes the images it touches, runs the program's pure handler, and writes
//! the result back, so the scenarios exercise the zero-copy layouts as well
//! as the pool semantics.
//!
//! Token balances (vaults, fee recipient, LP holdings, LP escrow) are tracked
//! alongside to check conservation across the receipt saga.

use std::collections::HashMap;

use ephemeral_pool::instructions::*;
use ephemeral_pool::state::*;
use pool_model::{
    CommitOutcome, DepositResolution, DepositSettlement, EntityKind, Key, PoolError, PoolParams, ReconcileMode, StatusAction,
    WithdrawResolution,
};

pub const POOL_KEY: Key = [9u8; 32];
pub const AUTHORITY: Key = [2u8; 32];
pub const FEE_RECIPIENT: Key = [3u8; 32];
pub const ALICE: Key = [1u8; 32];
pub const BOB: Key = [11u8; 32];
pub const CAROL: Key = [12u8; 32];

/// Accounts the harness knows how to address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Pool,
    Ledger(Key),
    DepositReceipt(Key),
    WithdrawReceipt(Key),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Pool => EntityKind::Pool,
            Entity::Ledger(_) => EntityKind::LiquidityProvider,
            Entity::DepositReceipt(_) => EntityKind::DepositReceipt,
            Entity::WithdrawReceipt(_) => EntityKind::WithdrawReceipt,
        }
    }
}

/// Byte image, for all-or-nothing assertions
pub fn image<T: ZeroCopy>(value: &T) -> Vec<u8> {
    as_bytes(value).to_vec()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Base,
    Venue,
}

pub struct Harness {
    base: HashMap<Entity, Vec<u8>>,
    venue: HashMap<Entity, Vec<u8>>,
    now: i64,
    vault_a: u64,
    vault_b: u64,
    fees_paid_a: u64,
    fees_paid_b: u64,
    lp_balances: HashMap<Key, u64>,
    lp_escrow: u64,
}

impl Harness {
    /// Fresh pool at reserves (0, 0)
    pub fn new(trade_fee_bps: u16, protocol_fee_bps: u16) -> Result<Self, PoolError> {
        let params = PoolParams {
            authority: AUTHORITY,
            pool_id: 1,
            name: "SOL-USDC",
            max_aum_usd: 1_000_000,
            metadata_title: "SOL-USDC LP",
            metadata_symbol: "SUL",
            metadata_uri: "https://example.invalid/lp.json",
            trade_fee_bps,
            protocol_fee_bps,
            fee_recipient: FEE_RECIPIENT,
            lp_mint: [4u8; 32],
            token_a_mint: [5u8; 32],
            token_b_mint: [6u8; 32],
            token_a_vault: [7u8; 32],
            token_b_vault: [8u8; 32],
        };
        let mut pool = PoolAccount::zeroed();
        apply_initialize_pool(&mut pool, &params, PoolBumps::default(), 0)?;

        let mut harness = Self {
            base: HashMap::new(),
            venue: HashMap::new(),
            now: 1_000,
            vault_a: 0,
            vault_b: 0,
            fees_paid_a: 0,
            fees_paid_b: 0,
            lp_balances: HashMap::new(),
            lp_escrow: 0,
        };
        harness.put(Side::Base, Entity::Pool, &pool);
        Ok(harness)
    }

    pub fn now(&self) -> i64 {
        self.now
    }

    pub fn advance(&mut self, secs: i64) {
        self.now += secs;
    }

    // ------------------------------------------------------------------
    // Account images
    // ------------------------------------------------------------------

    fn map(&self, side: Side) -> &HashMap<Entity, Vec<u8>> {
        match side {
            Side::Base => &self.base,
            Side::Venue => &self.venue,
        }
    }

    fn get<T: ZeroCopy>(&self, side: Side, entity: Entity) -> Result<T, PoolError> {
        self.map(side)
            .get(&entity)
            .and_then(|bytes| read_from::<T>(bytes))
            .ok_or(PoolError::InvalidAccount)
    }

    fn put<T: ZeroCopy>(&mut self, side: Side, entity: Entity, value: &T) {
        let bytes = as_bytes(value).to_vec();
        match side {
            Side::Base => self.base.insert(entity, bytes),
            Side::Venue => self.venue.insert(entity, bytes),
        };
    }

    pub fn is_delegated(&self, entity: Entity) -> bool {
        self.venue.contains_key(&entity)
    }

    /// Program-owned account on `side`; a delegated account is foreign on
    /// the base ledger and an undelegated one is read-only on the venue
    fn writable<T: ZeroCopy>(&self, side: Side, entity: Entity) -> Result<T, PoolError> {
        let delegated = self.is_delegated(entity);
        match side {
            Side::Base if delegated && entity == Entity::Pool => Err(PoolError::InvalidPoolState),
            Side::Base if delegated => Err(PoolError::InvalidAccount),
            Side::Venue if !delegated => Err(PoolError::InvalidAccount),
            _ => self.get(side, entity),
        }
    }

    fn home(&self, entity: Entity) -> Side {
        if self.is_delegated(entity) {
            Side::Venue
        } else {
            Side::Base
        }
    }

    /// Authoritative pool image, wherever it lives
    pub fn pool(&self) -> PoolAccount {
        self.read(Entity::Pool)
    }

    pub fn base_pool(&self) -> PoolAccount {
        match self.get(Side::Base, Entity::Pool) {
            Ok(pool) => pool,
            Err(e) => panic!("pool missing on base ledger: {e}"),
        }
    }

    pub fn ledger(&self, provider: Key) -> LiquidityProviderAccount {
        self.read(Entity::Ledger(provider))
    }

    pub fn deposit_receipt(&self, provider: Key) -> DepositReceiptAccount {
        self.read(Entity::DepositReceipt(provider))
    }

    pub fn find_deposit_receipt(&self, provider: Key) -> Option<DepositReceiptAccount> {
        let entity = Entity::DepositReceipt(provider);
        self.get(self.home(entity), entity).ok()
    }

    pub fn withdraw_receipt(&self, provider: Key) -> WithdrawReceiptAccount {
        self.read(Entity::WithdrawReceipt(provider))
    }

    fn read<T: ZeroCopy>(&self, entity: Entity) -> T {
        match self.get(self.home(entity), entity) {
            Ok(value) => value,
            Err(e) => panic!("{entity:?} not found: {e}"),
        }
    }

    pub fn lp_balance(&self, provider: Key) -> u64 {
        self.lp_balances.get(&provider).copied().unwrap_or(0)
    }

    pub fn lp_escrow(&self) -> u64 {
        self.lp_escrow
    }

    pub fn vaults(&self) -> (u64, u64) {
        (self.vault_a, self.vault_b)
    }

    pub fn fees_paid(&self) -> (u64, u64) {
        (self.fees_paid_a, self.fees_paid_b)
    }

    fn mint_lp(&mut self, provider: Key, amount: u64) {
        *self.lp_balances.entry(provider).or_insert(0) += amount;
    }

    fn burn_lp(&mut self, provider: Key, amount: u64) -> Result<(), PoolError> {
        let balance = self.lp_balances.entry(provider).or_insert(0);
        *balance = balance.checked_sub(amount).ok_or(PoolError::InsufficientTokenBalance)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Pool administration
    // ------------------------------------------------------------------

    pub fn open_ledger(&mut self, provider: Key) -> Result<(), PoolError> {
        let mut ledger = LiquidityProviderAccount::zeroed();
        apply_initialize_provider(&mut ledger, &provider, 255)?;
        self.put(Side::Base, Entity::Ledger(provider), &ledger);
        Ok(())
    }

    pub fn set_status(&mut self, signer: Key, action: StatusAction) -> Result<(), PoolError> {
        let mut pool: PoolAccount = self.writable(Side::Base, Entity::Pool)?;
        apply_set_pool_status(&mut pool, &signer, action, self.now)?;
        self.put(Side::Base, Entity::Pool, &pool);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Single-venue operations
    // ------------------------------------------------------------------

    /// Direct deposit; returns the LP tokens minted
    pub fn deposit(&mut self, provider: Key, amount_a: u64, amount_b: u64, min_lp_tokens: u64) -> Result<u64, PoolError> {
        let mut pool: PoolAccount = self.writable(Side::Base, Entity::Pool)?;
        let mut ledger: LiquidityProviderAccount = self.writable(Side::Base, Entity::Ledger(provider))?;
        let args = DepositArgs {
            amount_a,
            amount_b,
            min_lp_tokens,
        };
        let outcome = apply_deposit(&mut pool, &POOL_KEY, &mut ledger, &args, self.now)?;

        self.put(Side::Base, Entity::Pool, &pool);
        self.put(Side::Base, Entity::Ledger(provider), &ledger);
        self.vault_a += outcome.fees_a.credited();
        self.vault_b += outcome.fees_b.credited();
        self.fees_paid_a += outcome.fees_a.protocol_fee;
        self.fees_paid_b += outcome.fees_b.protocol_fee;
        self.mint_lp(provider, outcome.lp_tokens);
        Ok(outcome.lp_tokens)
    }

    /// Direct withdrawal; returns the payout
    pub fn withdraw(
        &mut self,
        provider: Key,
        lp_tokens: u64,
        min_amount_a: u64,
        min_amount_b: u64,
    ) -> Result<(u64, u64), PoolError> {
        let mut pool: PoolAccount = self.writable(Side::Base, Entity::Pool)?;
        let mut ledger: LiquidityProviderAccount = self.writable(Side::Base, Entity::Ledger(provider))?;
        if self.lp_balance(provider) < lp_tokens {
            return Err(PoolError::InsufficientTokenBalance);
        }
        let args = WithdrawArgs {
            lp_tokens,
            min_amount_a,
            min_amount_b,
        };
        let (amount_a, amount_b) = apply_withdraw(&mut pool, &POOL_KEY, &mut ledger, &args, self.now)?;

        self.put(Side::Base, Entity::Pool, &pool);
        self.put(Side::Base, Entity::Ledger(provider), &ledger);
        self.burn_lp(provider, lp_tokens)?;
        self.vault_a -= amount_a;
        self.vault_b -= amount_b;
        Ok((amount_a, amount_b))
    }

    // ------------------------------------------------------------------
    // Two-phase deposit
    // ------------------------------------------------------------------

    /// Phase 1 on the base ledger; returns the locked LP quote
    pub fn initiate_deposit(
        &mut self,
        provider: Key,
        amount_a: u64,
        amount_b: u64,
        min_lp_tokens: u64,
    ) -> Result<u64, PoolError> {
        let pool = self.base_pool();
        let entity = Entity::DepositReceipt(provider);
        let mut receipt: DepositReceiptAccount = match self.writable(Side::Base, entity) {
            Ok(receipt) => receipt,
            Err(_) if !self.base.contains_key(&entity) => {
                let mut fresh = DepositReceiptAccount::zeroed();
                fresh.init(provider, 254);
                fresh
            }
            Err(e) => return Err(e),
        };
        let args = DepositArgs {
            amount_a,
            amount_b,
            min_lp_tokens,
        };
        let outcome = apply_initiate_deposit(&pool, &POOL_KEY, &mut receipt, &provider, &args, self.now)?;

        self.put(Side::Base, entity, &receipt);
        self.vault_a += amount_a;
        self.vault_b += amount_b;
        Ok(outcome.lp_tokens)
    }

    /// Phase 2, on whichever ledger currently holds the pool
    pub fn commit_deposit(&mut self, provider: Key) -> Result<CommitOutcome, PoolError> {
        let side = self.home(Entity::Pool);
        let mut pool: PoolAccount = self.writable(side, Entity::Pool)?;
        let mut ledger: LiquidityProviderAccount = self.writable(side, Entity::Ledger(provider))?;
        let mut receipt: DepositReceiptAccount = self.writable(side, Entity::DepositReceipt(provider))?;
        let outcome = apply_commit_deposit(&mut pool, &POOL_KEY, &mut ledger, &mut receipt, self.now)?;

        self.put(side, Entity::Pool, &pool);
        self.put(side, Entity::Ledger(provider), &ledger);
        self.put(side, Entity::DepositReceipt(provider), &receipt);
        Ok(outcome)
    }

    /// Mint the committed quote on the base ledger
    pub fn settle_deposit(&mut self, provider: Key) -> Result<u64, PoolError> {
        let entity = Entity::DepositReceipt(provider);
        let mut receipt: DepositReceiptAccount = self.writable(Side::Base, entity)?;
        let settlement = apply_settle_deposit(&POOL_KEY, &mut receipt)?;
        self.put(Side::Base, entity, &receipt);
        self.pay_out(provider, &settlement);
        Ok(settlement.lp_tokens)
    }

    fn pay_out(&mut self, provider: Key, settlement: &DepositSettlement) {
        self.mint_lp(provider, settlement.lp_tokens);
        self.vault_a -= settlement.protocol_fee_a;
        self.vault_b -= settlement.protocol_fee_b;
        self.fees_paid_a += settlement.protocol_fee_a;
        self.fees_paid_b += settlement.protocol_fee_b;
    }

    pub fn reconcile_deposit(
        &mut self,
        provider: Key,
        mode: ReconcileMode,
        signer: Key,
    ) -> Result<DepositResolution, PoolError> {
        let mut pool: PoolAccount = self.writable(Side::Base, Entity::Pool)?;
        let mut ledger: LiquidityProviderAccount = self.writable(Side::Base, Entity::Ledger(provider))?;
        let mut receipt: DepositReceiptAccount = self.writable(Side::Base, Entity::DepositReceipt(provider))?;
        let resolution = apply_reconcile_deposit(
            &mut pool,
            &POOL_KEY,
            &mut ledger,
            &mut receipt,
            mode,
            &signer,
            self.now,
        )?;

        self.put(Side::Base, Entity::Pool, &pool);
        self.put(Side::Base, Entity::Ledger(provider), &ledger);
        self.put(Side::Base, Entity::DepositReceipt(provider), &receipt);
        match resolution {
            DepositResolution::Minted(settlement) => self.pay_out(provider, &settlement),
            DepositResolution::Refunded { amount_a, amount_b } => {
                self.vault_a -= amount_a;
                self.vault_b -= amount_b;
            }
        }
        Ok(resolution)
    }

    // ------------------------------------------------------------------
    // Two-phase withdrawal
    // ------------------------------------------------------------------

    /// Phase 1 on the base ledger; escrows the LP and returns the locked payout
    pub fn initiate_withdraw(
        &mut self,
        provider: Key,
        lp_tokens: u64,
        min_amount_a: u64,
        min_amount_b: u64,
    ) -> Result<(u64, u64), PoolError> {
        let pool = self.base_pool();
        let entity = Entity::WithdrawReceipt(provider);
        let mut receipt: WithdrawReceiptAccount = match self.writable(Side::Base, entity) {
            Ok(receipt) => receipt,
            Err(_) if !self.base.contains_key(&entity) => {
                let mut fresh = WithdrawReceiptAccount::zeroed();
                fresh.init(provider, 254);
                fresh
            }
            Err(e) => return Err(e),
        };
        if self.lp_balance(provider) < lp_tokens {
            return Err(PoolError::InsufficientTokenBalance);
        }
        let args = WithdrawArgs {
            lp_tokens,
            min_amount_a,
            min_amount_b,
        };
        let payout = apply_initiate_withdraw(&pool, &POOL_KEY, &mut receipt, &provider, &args, self.now)?;

        self.put(Side::Base, entity, &receipt);
        self.burn_lp(provider, lp_tokens)?;
        self.lp_escrow += lp_tokens;
        Ok(payout)
    }

    pub fn commit_withdraw(&mut self, provider: Key) -> Result<CommitOutcome, PoolError> {
        let side = self.home(Entity::Pool);
        let mut pool: PoolAccount = self.writable(side, Entity::Pool)?;
        let mut ledger: LiquidityProviderAccount = self.writable(side, Entity::Ledger(provider))?;
        let mut receipt: WithdrawReceiptAccount = self.writable(side, Entity::WithdrawReceipt(provider))?;
        let outcome = apply_commit_withdraw(&mut pool, &POOL_KEY, &mut ledger, &mut receipt, self.now)?;

        self.put(side, Entity::Pool, &pool);
        self.put(side, Entity::Ledger(provider), &ledger);
        self.put(side, Entity::WithdrawReceipt(provider), &receipt);
        Ok(outcome)
    }

    /// Burn the escrow and pay out on the base ledger
    pub fn settle_withdraw(&mut self, provider: Key) -> Result<(u64, u64), PoolError> {
        let entity = Entity::WithdrawReceipt(provider);
        let mut receipt: WithdrawReceiptAccount = self.writable(Side::Base, entity)?;
        let (lp_tokens, amount_a, amount_b) = apply_settle_withdraw(&POOL_KEY, &mut receipt)?;
        self.put(Side::Base, entity, &receipt);
        self.lp_escrow -= lp_tokens;
        self.vault_a -= amount_a;
        self.vault_b -= amount_b;
        Ok((amount_a, amount_b))
    }

    pub fn reconcile_withdraw(
        &mut self,
        provider: Key,
        mode: ReconcileMode,
        signer: Key,
    ) -> Result<WithdrawResolution, PoolError> {
        let mut pool: PoolAccount = self.writable(Side::Base, Entity::Pool)?;
        let mut ledger: LiquidityProviderAccount = self.writable(Side::Base, Entity::Ledger(provider))?;
        let mut receipt: WithdrawReceiptAccount = self.writable(Side::Base, Entity::WithdrawReceipt(provider))?;
        let resolution = apply_reconcile_withdraw(
            &mut pool,
            &POOL_KEY,
            &mut ledger,
            &mut receipt,
            mode,
            &signer,
            self.now,
        )?;

        self.put(Side::Base, Entity::Pool, &pool);
        self.put(Side::Base, Entity::Ledger(provider), &ledger);
        self.put(Side::Base, Entity::WithdrawReceipt(provider), &receipt);
        match resolution {
            WithdrawResolution::Paid {
                lp_tokens,
                amount_a,
                amount_b,
            } => {
                self.lp_escrow -= lp_tokens;
                self.vault_a -= amount_a;
                self.vault_b -= amount_b;
            }
            WithdrawResolution::Refunded { lp_tokens } => {
                self.lp_escrow -= lp_tokens;
                self.mint_lp(provider, lp_tokens);
            }
        }
        Ok(resolution)
    }

    // ------------------------------------------------------------------
    // Delegation
    // ------------------------------------------------------------------

    /// Lend `entity` to the venue; the venue starts from the staged image
    pub fn delegate(&mut self, entity: Entity, signer: Key, commit_frequency_ms: u32) -> Result<(), PoolError> {
        let params = DelegateParams {
            kind: entity.kind(),
            commit_frequency_ms,
            validator: None,
        };
        match entity {
            Entity::Pool => self.hand_over::<PoolAccount>(entity, &signer, &params),
            Entity::Ledger(_) => self.hand_over::<LiquidityProviderAccount>(entity, &signer, &params),
            Entity::DepositReceipt(_) => self.hand_over::<DepositReceiptAccount>(entity, &signer, &params),
            Entity::WithdrawReceipt(_) => self.hand_over::<WithdrawReceiptAccount>(entity, &signer, &params),
        }
    }

    fn hand_over<T: DelegatedEntity>(
        &mut self,
        entity: Entity,
        signer: &Key,
        params: &DelegateParams,
    ) -> Result<(), PoolError> {
        let mut staged: T = self.writable(Side::Base, entity)?;
        let image = stage_delegation(&mut staged, signer, params, self.now)?;
        self.put(Side::Base, entity, &staged);
        self.put(Side::Venue, entity, &image);
        Ok(())
    }

    /// Request undelegation on the venue and land the final commit on base
    pub fn undelegate(&mut self, entity: Entity, signer: Key) -> Result<(), PoolError> {
        match entity {
            Entity::Pool => self.bring_home::<PoolAccount>(entity, &signer),
            Entity::Ledger(_) => self.bring_home::<LiquidityProviderAccount>(entity, &signer),
            Entity::DepositReceipt(_) => self.bring_home::<DepositReceiptAccount>(entity, &signer),
            Entity::WithdrawReceipt(_) => self.bring_home::<WithdrawReceiptAccount>(entity, &signer),
        }
    }

    fn bring_home<T: DelegatedEntity>(&mut self, entity: Entity, signer: &Key) -> Result<(), PoolError> {
        let mut remote: T = self.writable(Side::Venue, entity)?;
        stage_undelegation(&mut remote, signer)?;
        let seeds = remote.entity_seeds()?;
        let restored: T = restore_for_seeds(as_bytes(&remote), &seeds.as_slices(), self.now)?;
        self.venue.remove(&entity);
        self.put(Side::Base, entity, &restored);
        Ok(())
    }

    /// Throttled venue checkpoint of a delegated entity
    pub fn checkpoint(&mut self, entity: Entity) -> Result<(), PoolError> {
        match entity {
            Entity::Pool => self.record_checkpoint::<PoolAccount>(entity),
            Entity::Ledger(_) => self.record_checkpoint::<LiquidityProviderAccount>(entity),
            Entity::DepositReceipt(_) => self.record_checkpoint::<DepositReceiptAccount>(entity),
            Entity::WithdrawReceipt(_) => self.record_checkpoint::<WithdrawReceiptAccount>(entity),
        }
    }

    fn record_checkpoint<T: DelegatedEntity>(&mut self, entity: Entity) -> Result<(), PoolError> {
        let mut remote: T = self.writable(Side::Venue, entity)?;
        remote.record_checkpoint(self.now)?;
        self.put(Side::Venue, entity, &remote);
        Ok(())
    }
}
