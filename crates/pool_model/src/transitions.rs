//! State transition functions
//!
//! Every transition validates and computes on copies, then writes back only
//! once all checks have passed. A returned error leaves every input exactly
//! as it was.

use arrayvec::ArrayString;

use crate::delegation::Delegation;
use crate::error::PoolError;
use crate::math::*;
use crate::state::*;

/// Age after which a pending receipt counts as orphaned
pub const RECONCILE_TIMEOUT_SECS: i64 = 3_600;

/// Priced deposit: LP quote plus the fee split of each side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositOutcome {
    pub lp_tokens: u64,
    pub fees_a: FeeSplit,
    pub fees_b: FeeSplit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied,
    /// Receipt was already consumed; nothing changed
    AlreadyCommitted,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Apply the locked quote as if the venue had committed it
    Complete = 0,
    /// Return the staged funds to the provider
    Refund = 1,
}

impl ReconcileMode {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Complete),
            1 => Some(Self::Refund),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositResolution {
    Minted(DepositSettlement),
    /// Gross amounts, protocol fee included
    Refunded { amount_a: u64, amount_b: u64 },
}

/// Token movements owed when a deposit receipt settles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositSettlement {
    pub lp_tokens: u64,
    /// Paid out of the vaults to the fee recipient
    pub protocol_fee_a: u64,
    pub protocol_fee_b: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawResolution {
    Paid { lp_tokens: u64, amount_a: u64, amount_b: u64 },
    Refunded { lp_tokens: u64 },
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Pause = 0,
    Unpause = 1,
    Deactivate = 2,
    Activate = 3,
}

impl StatusAction {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Pause),
            1 => Some(Self::Unpause),
            2 => Some(Self::Deactivate),
            3 => Some(Self::Activate),
            _ => None,
        }
    }
}

// ============================================================================
// Pool lifecycle
// ============================================================================

pub fn validate_pool_name(name: &str) -> Result<ArrayString<MAX_POOL_NAME_LEN>, PoolError> {
    if name.is_empty() {
        return Err(PoolError::InvalidName);
    }
    ArrayString::from(name).map_err(|_| PoolError::InvalidName)
}

pub fn validate_metadata(title: &str, symbol: &str, uri: &str) -> Result<(), PoolError> {
    if title.len() > MAX_METADATA_TITLE_LEN
        || symbol.len() > MAX_METADATA_SYMBOL_LEN
        || uri.len() > MAX_METADATA_URI_LEN
    {
        return Err(PoolError::InvalidName);
    }
    Ok(())
}

/// Create a pool at reserves (0, 0)
pub fn initialize_pool(params: &PoolParams<'_>, now: i64) -> Result<Pool, PoolError> {
    let fees = FeeConfig {
        trade_fee_bps: params.trade_fee_bps,
        protocol_fee_bps: params.protocol_fee_bps,
        fee_recipient: params.fee_recipient,
    };
    fees.validate()?;
    let name = validate_pool_name(params.name)?;
    validate_metadata(params.metadata_title, params.metadata_symbol, params.metadata_uri)?;
    if params.token_a_mint == params.token_b_mint {
        return Err(PoolError::InvalidAccount);
    }

    Ok(Pool {
        authority: params.authority,
        pool_id: params.pool_id,
        name,
        max_aum_usd: params.max_aum_usd,
        lp_mint: params.lp_mint,
        token_a_mint: params.token_a_mint,
        token_b_mint: params.token_b_mint,
        token_a_vault: params.token_a_vault,
        token_b_vault: params.token_b_vault,
        reserve_a: 0,
        reserve_b: 0,
        total_lp_supply: 0,
        fees,
        status: PoolStatus::default(),
        protocol_fees_a: 0,
        protocol_fees_b: 0,
        created_at: now,
        updated_at: now,
        delegation: Delegation::default(),
    })
}

pub fn apply_status(pool: &mut Pool, action: StatusAction, now: i64) -> Result<(), PoolError> {
    let mut status = pool.status;
    match action {
        StatusAction::Pause => {
            if !status.is_active {
                return Err(PoolError::PoolNotActive);
            }
            status.is_paused = true;
        }
        StatusAction::Unpause => status.is_paused = false,
        StatusAction::Deactivate => status.is_active = false,
        StatusAction::Activate => status.is_active = true,
    }
    pool.status = status;
    pool.updated_at = now;
    Ok(())
}

/// Hand the pool to the venue; blocks direct mutation until undelegated
pub fn delegate_pool(
    pool: &mut Pool,
    validator: Option<Key>,
    commit_frequency_ms: u32,
    now: i64,
) -> Result<(), PoolError> {
    if pool.status.is_migrating {
        return Err(PoolError::InvalidPoolState);
    }
    let mut delegation = pool.delegation;
    delegation.begin(validator, commit_frequency_ms, now)?;
    delegation.confirm()?;
    pool.delegation = delegation;
    pool.status.is_migrating = true;
    Ok(())
}

/// Venue finality: authority is back on the base ledger
pub fn finalize_pool_undelegation(pool: &mut Pool, now: i64) -> Result<(), PoolError> {
    let mut delegation = pool.delegation;
    delegation.finalize()?;
    pool.delegation = delegation;
    pool.status.is_migrating = false;
    pool.updated_at = now;
    Ok(())
}

// ============================================================================
// Provider ledger
// ============================================================================

/// Add to (or open) the provider's position in `pool`
pub fn record_deposit(
    provider: &mut LiquidityProvider,
    pool: Key,
    token_mint: Key,
    liquidity_amount: u64,
    lp_tokens: u64,
    now: i64,
) -> Result<(), PoolError> {
    if lp_tokens == 0 {
        return Err(PoolError::InvalidAmount);
    }
    let total_liquidity = checked_add(provider.total_liquidity_provided, liquidity_amount)?;
    let total_lp = checked_add(provider.total_lp_tokens, lp_tokens)?;

    match provider.position_index(&pool) {
        Some(idx) => {
            let pos = provider.positions[idx];
            let liquidity = checked_add(pos.liquidity_amount, liquidity_amount)?;
            let lp = checked_add(pos.lp_tokens, lp_tokens)?;
            provider.positions[idx].liquidity_amount = liquidity;
            provider.positions[idx].lp_tokens = lp;
        }
        None => {
            provider
                .positions
                .try_push(PoolPosition {
                    pool,
                    token_mint,
                    liquidity_amount,
                    lp_tokens,
                })
                .map_err(|_| PoolError::MaxPoolsReached)?;
        }
    }

    provider.total_liquidity_provided = total_liquidity;
    provider.total_lp_tokens = total_lp;
    provider.latest_liquidity_provided_on = now;
    Ok(())
}

/// Reduce the provider's position in `pool`; the entry is dropped at zero
///
/// Returns the liquidity amount released, proportional to the LP burned.
pub fn record_withdraw(
    provider: &mut LiquidityProvider,
    pool: &Key,
    lp_tokens: u64,
) -> Result<u64, PoolError> {
    if lp_tokens == 0 {
        return Err(PoolError::InvalidAmount);
    }
    let idx = provider
        .position_index(pool)
        .ok_or(PoolError::InsufficientBalance)?;
    let pos = provider.positions[idx];
    if pos.lp_tokens < lp_tokens {
        return Err(PoolError::InsufficientBalance);
    }

    let released = mul_div(pos.liquidity_amount, lp_tokens, pos.lp_tokens)?;
    let total_lp = checked_sub(provider.total_lp_tokens, lp_tokens)?;
    let remaining = pos.lp_tokens - lp_tokens;

    if remaining == 0 {
        provider.positions.remove(idx);
    } else {
        provider.positions[idx].lp_tokens = remaining;
        provider.positions[idx].liquidity_amount = pos.liquidity_amount - released;
    }
    provider.total_lp_tokens = total_lp;
    Ok(released)
}

// ============================================================================
// Direct deposit / withdraw
// ============================================================================

fn price_deposit(
    pool: &Pool,
    amount_a: u64,
    amount_b: u64,
    min_lp_tokens: u64,
) -> Result<DepositOutcome, PoolError> {
    let fees_a = apply_fees(amount_a, pool.fees.trade_fee_bps, pool.fees.protocol_fee_bps)?;
    let fees_b = apply_fees(amount_b, pool.fees.trade_fee_bps, pool.fees.protocol_fee_bps)?;
    let lp_tokens = quote_deposit(
        pool.reserve_a,
        pool.reserve_b,
        pool.total_lp_supply,
        fees_a.net,
        fees_b.net,
        min_lp_tokens,
    )?;
    Ok(DepositOutcome {
        lp_tokens,
        fees_a,
        fees_b,
    })
}

#[allow(clippy::too_many_arguments)]
fn credit_pool(
    pool: &mut Pool,
    credited_a: u64,
    credited_b: u64,
    lp_tokens: u64,
    protocol_fee_a: u64,
    protocol_fee_b: u64,
    now: i64,
) -> Result<(), PoolError> {
    pool.reserve_a = checked_add(pool.reserve_a, credited_a)?;
    pool.reserve_b = checked_add(pool.reserve_b, credited_b)?;
    pool.total_lp_supply = checked_add(pool.total_lp_supply, lp_tokens)?;
    pool.protocol_fees_a = checked_add(pool.protocol_fees_a, protocol_fee_a)?;
    pool.protocol_fees_b = checked_add(pool.protocol_fees_b, protocol_fee_b)?;
    pool.updated_at = now;
    Ok(())
}

fn debit_pool(
    pool: &mut Pool,
    amount_a: u64,
    amount_b: u64,
    lp_tokens: u64,
    now: i64,
) -> Result<(), PoolError> {
    pool.reserve_a = pool
        .reserve_a
        .checked_sub(amount_a)
        .ok_or(PoolError::InsufficientReserves)?;
    pool.reserve_b = pool
        .reserve_b
        .checked_sub(amount_b)
        .ok_or(PoolError::InsufficientReserves)?;
    pool.total_lp_supply = checked_sub(pool.total_lp_supply, lp_tokens)?;
    pool.updated_at = now;
    Ok(())
}

/// Single-venue deposit: price, credit reserves, record the position
pub fn deposit(
    pool: &mut Pool,
    pool_key: &Key,
    provider: &mut LiquidityProvider,
    amount_a: u64,
    amount_b: u64,
    min_lp_tokens: u64,
    now: i64,
) -> Result<DepositOutcome, PoolError> {
    pool.status.ensure_direct()?;
    pool.delegation.ensure_local()?;
    provider.delegation.ensure_local()?;

    let outcome = price_deposit(pool, amount_a, amount_b, min_lp_tokens)?;
    let credited_a = outcome.fees_a.credited();
    let credited_b = outcome.fees_b.credited();

    let mut next_pool = *pool;
    credit_pool(
        &mut next_pool,
        credited_a,
        credited_b,
        outcome.lp_tokens,
        outcome.fees_a.protocol_fee,
        outcome.fees_b.protocol_fee,
        now,
    )?;

    let mut next_provider = provider.clone();
    record_deposit(
        &mut next_provider,
        *pool_key,
        pool.lp_mint,
        checked_add(credited_a, credited_b)?,
        outcome.lp_tokens,
        now,
    )?;

    *pool = next_pool;
    *provider = next_provider;
    Ok(outcome)
}

/// Single-venue withdrawal: returns the (amount_a, amount_b) payout
#[allow(clippy::too_many_arguments)]
pub fn withdraw(
    pool: &mut Pool,
    pool_key: &Key,
    provider: &mut LiquidityProvider,
    lp_tokens: u64,
    min_amount_a: u64,
    min_amount_b: u64,
    now: i64,
) -> Result<(u64, u64), PoolError> {
    pool.status.ensure_direct()?;
    pool.delegation.ensure_local()?;
    provider.delegation.ensure_local()?;

    let (amount_a, amount_b) = quote_withdraw(
        pool.reserve_a,
        pool.reserve_b,
        pool.total_lp_supply,
        lp_tokens,
        min_amount_a,
        min_amount_b,
    )?;

    let mut next_provider = provider.clone();
    record_withdraw(&mut next_provider, pool_key, lp_tokens)?;

    let mut next_pool = *pool;
    debit_pool(&mut next_pool, amount_a, amount_b, lp_tokens, now)?;

    *pool = next_pool;
    *provider = next_provider;
    Ok((amount_a, amount_b))
}

// ============================================================================
// Two-phase receipts
// ============================================================================

/// Phase 1 of a deposit: price against the current reserves and lock the
/// quote into the receipt. The pool itself is only read.
#[allow(clippy::too_many_arguments)]
pub fn initiate_deposit(
    pool: &Pool,
    pool_key: &Key,
    receipt: &mut DepositReceipt,
    provider_key: &Key,
    amount_a: u64,
    amount_b: u64,
    min_lp_tokens: u64,
    now: i64,
) -> Result<DepositOutcome, PoolError> {
    pool.status.ensure_mutable()?;
    receipt.delegation.ensure_local()?;
    if receipt.status.is_outstanding() {
        return Err(PoolError::InvalidPoolState);
    }

    let outcome = price_deposit(pool, amount_a, amount_b, min_lp_tokens)?;

    *receipt = DepositReceipt {
        pool: *pool_key,
        provider: *provider_key,
        amount_a,
        amount_b,
        net_a: outcome.fees_a.net,
        net_b: outcome.fees_b.net,
        credited_a: outcome.fees_a.credited(),
        credited_b: outcome.fees_b.credited(),
        lp_tokens_minted: outcome.lp_tokens,
        min_lp_tokens,
        status: ReceiptStatus::Pending,
        created_at: now,
        committed_at: 0,
        delegation: receipt.delegation,
    };
    Ok(outcome)
}

/// Phase 2 of a deposit: consume a pending receipt into pool and ledger
///
/// The locked quote is authoritative; a re-quote below it means the reserves
/// moved against the pool and the commit is refused.
pub fn commit_deposit(
    pool: &mut Pool,
    pool_key: &Key,
    provider: &mut LiquidityProvider,
    receipt: &mut DepositReceipt,
    now: i64,
) -> Result<CommitOutcome, PoolError> {
    if receipt.pool != *pool_key {
        return Err(PoolError::InvalidPoolState);
    }
    match receipt.status {
        ReceiptStatus::Pending => {}
        ReceiptStatus::Committed | ReceiptStatus::Settled => {
            return Ok(CommitOutcome::AlreadyCommitted)
        }
        ReceiptStatus::Empty | ReceiptStatus::Refunded => {
            return Err(PoolError::InvalidPoolState)
        }
    }
    if receipt.provider != provider.provider {
        return Err(PoolError::InvalidAccount);
    }
    pool.status.ensure_mutable()?;

    quote_deposit(
        pool.reserve_a,
        pool.reserve_b,
        pool.total_lp_supply,
        receipt.net_a,
        receipt.net_b,
        receipt.lp_tokens_minted,
    )?;

    let (protocol_fee_a, protocol_fee_b) = receipt.protocol_fees();

    let mut next_pool = *pool;
    credit_pool(
        &mut next_pool,
        receipt.credited_a,
        receipt.credited_b,
        receipt.lp_tokens_minted,
        protocol_fee_a,
        protocol_fee_b,
        now,
    )?;

    let mut next_provider = provider.clone();
    record_deposit(
        &mut next_provider,
        *pool_key,
        pool.lp_mint,
        checked_add(receipt.credited_a, receipt.credited_b)?,
        receipt.lp_tokens_minted,
        now,
    )?;

    *pool = next_pool;
    *provider = next_provider;
    receipt.status = ReceiptStatus::Committed;
    receipt.committed_at = now;
    Ok(CommitOutcome::Applied)
}

/// Phase 1 of a withdrawal: lock the payout for LP tokens already escrowed
#[allow(clippy::too_many_arguments)]
pub fn initiate_withdraw(
    pool: &Pool,
    pool_key: &Key,
    receipt: &mut WithdrawReceipt,
    provider_key: &Key,
    lp_tokens: u64,
    min_amount_a: u64,
    min_amount_b: u64,
    now: i64,
) -> Result<(u64, u64), PoolError> {
    pool.status.ensure_mutable()?;
    receipt.delegation.ensure_local()?;
    if receipt.status.is_outstanding() {
        return Err(PoolError::InvalidPoolState);
    }

    let (amount_a, amount_b) = quote_withdraw(
        pool.reserve_a,
        pool.reserve_b,
        pool.total_lp_supply,
        lp_tokens,
        min_amount_a,
        min_amount_b,
    )?;

    *receipt = WithdrawReceipt {
        pool: *pool_key,
        provider: *provider_key,
        lp_tokens_to_burn: lp_tokens,
        min_amount_a,
        min_amount_b,
        amount_a_withdrawn: amount_a,
        amount_b_withdrawn: amount_b,
        status: ReceiptStatus::Pending,
        created_at: now,
        committed_at: 0,
        delegation: receipt.delegation,
    };
    Ok((amount_a, amount_b))
}

/// Phase 2 of a withdrawal
///
/// Burning the last LP tokens sweeps the whole reserves so an unseeded pool
/// never keeps dust; the receipt payout is raised to the swept amounts.
pub fn commit_withdraw(
    pool: &mut Pool,
    pool_key: &Key,
    provider: &mut LiquidityProvider,
    receipt: &mut WithdrawReceipt,
    now: i64,
) -> Result<CommitOutcome, PoolError> {
    if receipt.pool != *pool_key {
        return Err(PoolError::InvalidPoolState);
    }
    match receipt.status {
        ReceiptStatus::Pending => {}
        ReceiptStatus::Committed | ReceiptStatus::Settled => {
            return Ok(CommitOutcome::AlreadyCommitted)
        }
        ReceiptStatus::Empty | ReceiptStatus::Refunded => {
            return Err(PoolError::InvalidPoolState)
        }
    }
    if receipt.provider != provider.provider {
        return Err(PoolError::InvalidAccount);
    }
    pool.status.ensure_mutable()?;

    let (requote_a, requote_b) = quote_withdraw(
        pool.reserve_a,
        pool.reserve_b,
        pool.total_lp_supply,
        receipt.lp_tokens_to_burn,
        receipt.amount_a_withdrawn,
        receipt.amount_b_withdrawn,
    )?;

    let (pay_a, pay_b) = if receipt.lp_tokens_to_burn == pool.total_lp_supply {
        (requote_a, requote_b)
    } else {
        (receipt.amount_a_withdrawn, receipt.amount_b_withdrawn)
    };

    let mut next_provider = provider.clone();
    record_withdraw(&mut next_provider, pool_key, receipt.lp_tokens_to_burn)?;

    let mut next_pool = *pool;
    debit_pool(&mut next_pool, pay_a, pay_b, receipt.lp_tokens_to_burn, now)?;

    *pool = next_pool;
    *provider = next_provider;
    receipt.amount_a_withdrawn = pay_a;
    receipt.amount_b_withdrawn = pay_b;
    receipt.status = ReceiptStatus::Committed;
    receipt.committed_at = now;
    Ok(CommitOutcome::Applied)
}

/// Close a committed deposit receipt
pub fn settle_deposit(receipt: &mut DepositReceipt) -> Result<DepositSettlement, PoolError> {
    receipt.delegation.ensure_local()?;
    if receipt.status != ReceiptStatus::Committed {
        return Err(PoolError::InvalidPoolState);
    }
    receipt.status = ReceiptStatus::Settled;
    let (protocol_fee_a, protocol_fee_b) = receipt.protocol_fees();
    Ok(DepositSettlement {
        lp_tokens: receipt.lp_tokens_minted,
        protocol_fee_a,
        protocol_fee_b,
    })
}

/// Close a committed withdraw receipt; returns (lp_to_burn, amount_a, amount_b)
pub fn settle_withdraw(receipt: &mut WithdrawReceipt) -> Result<(u64, u64, u64), PoolError> {
    receipt.delegation.ensure_local()?;
    if receipt.status != ReceiptStatus::Committed {
        return Err(PoolError::InvalidPoolState);
    }
    receipt.status = ReceiptStatus::Settled;
    Ok((
        receipt.lp_tokens_to_burn,
        receipt.amount_a_withdrawn,
        receipt.amount_b_withdrawn,
    ))
}

// ============================================================================
// Orphan reconciliation
// ============================================================================

/// Pending for at least `timeout_secs`
pub fn is_orphaned(status: ReceiptStatus, created_at: i64, now: i64, timeout_secs: i64) -> bool {
    status == ReceiptStatus::Pending && now.saturating_sub(created_at) >= timeout_secs
}

/// Only the receipt's provider or the pool authority may reconcile
pub fn ensure_reconciler(pool: &Pool, receipt_provider: &Key, signer: &Key) -> Result<(), PoolError> {
    if signer == receipt_provider || signer == &pool.authority {
        Ok(())
    } else {
        Err(PoolError::Unauthorized)
    }
}

fn ensure_reconcilable(
    pool: &Pool,
    pool_key: &Key,
    receipt_pool: &Key,
    receipt_delegation: &Delegation,
    orphaned: bool,
) -> Result<(), PoolError> {
    if receipt_pool != pool_key || !orphaned {
        return Err(PoolError::InvalidPoolState);
    }
    receipt_delegation.ensure_local()?;
    pool.delegation.ensure_local()?;
    if pool.status.is_migrating {
        return Err(PoolError::InvalidPoolState);
    }
    Ok(())
}

/// Resolve an orphaned deposit receipt on the base ledger
#[allow(clippy::too_many_arguments)]
pub fn reconcile_deposit(
    pool: &mut Pool,
    pool_key: &Key,
    provider: &mut LiquidityProvider,
    receipt: &mut DepositReceipt,
    mode: ReconcileMode,
    now: i64,
    timeout_secs: i64,
) -> Result<DepositResolution, PoolError> {
    let orphaned = is_orphaned(receipt.status, receipt.created_at, now, timeout_secs);
    ensure_reconcilable(pool, pool_key, &receipt.pool, &receipt.delegation, orphaned)?;

    match mode {
        ReconcileMode::Complete => {
            provider.delegation.ensure_local()?;
            let mut next_pool = *pool;
            let mut next_provider = provider.clone();
            let mut next_receipt = *receipt;
            commit_deposit(&mut next_pool, pool_key, &mut next_provider, &mut next_receipt, now)?;
            let settlement = settle_deposit(&mut next_receipt)?;
            *pool = next_pool;
            *provider = next_provider;
            *receipt = next_receipt;
            Ok(DepositResolution::Minted(settlement))
        }
        ReconcileMode::Refund => {
            receipt.status = ReceiptStatus::Refunded;
            Ok(DepositResolution::Refunded {
                amount_a: receipt.amount_a,
                amount_b: receipt.amount_b,
            })
        }
    }
}

/// Resolve an orphaned withdraw receipt on the base ledger
#[allow(clippy::too_many_arguments)]
pub fn reconcile_withdraw(
    pool: &mut Pool,
    pool_key: &Key,
    provider: &mut LiquidityProvider,
    receipt: &mut WithdrawReceipt,
    mode: ReconcileMode,
    now: i64,
    timeout_secs: i64,
) -> Result<WithdrawResolution, PoolError> {
    let orphaned = is_orphaned(receipt.status, receipt.created_at, now, timeout_secs);
    ensure_reconcilable(pool, pool_key, &receipt.pool, &receipt.delegation, orphaned)?;

    match mode {
        ReconcileMode::Complete => {
            provider.delegation.ensure_local()?;
            let mut next_pool = *pool;
            let mut next_provider = provider.clone();
            let mut next_receipt = *receipt;
            commit_withdraw(&mut next_pool, pool_key, &mut next_provider, &mut next_receipt, now)?;
            let (lp_tokens, amount_a, amount_b) = settle_withdraw(&mut next_receipt)?;
            *pool = next_pool;
            *provider = next_provider;
            *receipt = next_receipt;
            Ok(WithdrawResolution::Paid {
                lp_tokens,
                amount_a,
                amount_b,
            })
        }
        ReconcileMode::Refund => {
            receipt.status = ReceiptStatus::Refunded;
            Ok(WithdrawResolution::Refunded {
                lp_tokens: receipt.lp_tokens_to_burn,
            })
        }
    }
}
