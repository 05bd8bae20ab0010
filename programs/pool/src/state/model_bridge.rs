//! Conversions between zero-copy accounts and `pool_model` values
//!
//! Handlers load an account into its model value, run the model transition,
//! and store the result back only on success. The model is the single source
//! of truth for every ledger rule; this module only moves bytes.
//!
//! | Account field | Model field | Notes |
//! |---------------|-------------|-------|
//! | `name` + `name_len` | `Pool::name` | UTF-8, at most 32 bytes |
//! | `is_active`/`is_paused`/`is_migrating` (u8) | `PoolStatus` | 0 = false |
//! | `positions[..position_count]` | `LiquidityProvider::positions` | order preserved |
//! | `status` (u8) | `ReceiptStatus` | unknown codes rejected |
//! | `DelegationSlot` | `Delegation` | see [`DelegationSlot::to_model`] |

use arrayvec::{ArrayString, ArrayVec};
use pool_model::{
    DepositReceipt, FeeConfig, LiquidityProvider, Pool, PoolError, PoolPosition, PoolStatus,
    ReceiptStatus, WithdrawReceipt, MAX_PROVIDER_POOLS,
};

use super::*;

pub fn pool_to_model(acct: &PoolAccount) -> Result<Pool, PoolError> {
    let name = ArrayString::from(acct.name()?).map_err(|_| PoolError::InvalidAccount)?;
    Ok(Pool {
        authority: acct.authority,
        pool_id: acct.pool_id,
        name,
        max_aum_usd: acct.max_aum_usd,
        lp_mint: acct.lp_mint,
        token_a_mint: acct.token_a_mint,
        token_b_mint: acct.token_b_mint,
        token_a_vault: acct.token_a_vault,
        token_b_vault: acct.token_b_vault,
        reserve_a: acct.reserve_a,
        reserve_b: acct.reserve_b,
        total_lp_supply: acct.total_lp_supply,
        fees: FeeConfig {
            trade_fee_bps: acct.trade_fee_bps,
            protocol_fee_bps: acct.protocol_fee_bps,
            fee_recipient: acct.fee_recipient,
        },
        status: PoolStatus {
            is_active: acct.is_active != 0,
            is_paused: acct.is_paused != 0,
            is_migrating: acct.is_migrating != 0,
        },
        protocol_fees_a: acct.protocol_fees_a,
        protocol_fees_b: acct.protocol_fees_b,
        created_at: acct.created_at,
        updated_at: acct.updated_at,
        delegation: acct.delegation.to_model()?,
    })
}

/// Write every model-owned field; header, bumps and metadata are untouched
pub fn store_pool(acct: &mut PoolAccount, pool: &Pool) -> Result<(), PoolError> {
    acct.name_len = write_str(&mut acct.name, pool.name.as_str())?;
    acct.authority = pool.authority;
    acct.pool_id = pool.pool_id;
    acct.max_aum_usd = pool.max_aum_usd;
    acct.lp_mint = pool.lp_mint;
    acct.token_a_mint = pool.token_a_mint;
    acct.token_b_mint = pool.token_b_mint;
    acct.token_a_vault = pool.token_a_vault;
    acct.token_b_vault = pool.token_b_vault;
    acct.reserve_a = pool.reserve_a;
    acct.reserve_b = pool.reserve_b;
    acct.total_lp_supply = pool.total_lp_supply;
    acct.trade_fee_bps = pool.fees.trade_fee_bps;
    acct.protocol_fee_bps = pool.fees.protocol_fee_bps;
    acct.fee_recipient = pool.fees.fee_recipient;
    acct.is_active = pool.status.is_active as u8;
    acct.is_paused = pool.status.is_paused as u8;
    acct.is_migrating = pool.status.is_migrating as u8;
    acct.protocol_fees_a = pool.protocol_fees_a;
    acct.protocol_fees_b = pool.protocol_fees_b;
    acct.created_at = pool.created_at;
    acct.updated_at = pool.updated_at;
    acct.delegation = DelegationSlot::from_model(&pool.delegation);
    Ok(())
}

pub fn provider_to_model(acct: &LiquidityProviderAccount) -> Result<LiquidityProvider, PoolError> {
    if acct.position_count as usize > MAX_PROVIDER_POOLS {
        return Err(PoolError::InvalidAccount);
    }
    let positions: ArrayVec<PoolPosition, MAX_PROVIDER_POOLS> = acct
        .active_positions()
        .iter()
        .map(|slot| PoolPosition {
            pool: slot.pool,
            token_mint: slot.token_mint,
            liquidity_amount: slot.liquidity_amount,
            lp_tokens: slot.lp_tokens,
        })
        .collect();
    Ok(LiquidityProvider {
        provider: acct.provider,
        total_liquidity_provided: acct.total_liquidity_provided,
        total_lp_tokens: acct.total_lp_tokens,
        positions,
        latest_liquidity_provided_on: acct.latest_liquidity_provided_on,
        delegation: acct.delegation.to_model()?,
    })
}

pub fn store_provider(acct: &mut LiquidityProviderAccount, provider: &LiquidityProvider) {
    acct.provider = provider.provider;
    acct.total_liquidity_provided = provider.total_liquidity_provided;
    acct.total_lp_tokens = provider.total_lp_tokens;
    acct.latest_liquidity_provided_on = provider.latest_liquidity_provided_on;
    acct.delegation = DelegationSlot::from_model(&provider.delegation);
    acct.positions = [PositionSlot::default(); MAX_PROVIDER_POOLS];
    for (slot, pos) in acct.positions.iter_mut().zip(provider.positions.iter()) {
        *slot = PositionSlot {
            pool: pos.pool,
            token_mint: pos.token_mint,
            liquidity_amount: pos.liquidity_amount,
            lp_tokens: pos.lp_tokens,
        };
    }
    acct.position_count = provider.positions.len() as u8;
}

fn receipt_status(code: u8) -> Result<ReceiptStatus, PoolError> {
    ReceiptStatus::from_u8(code).ok_or(PoolError::InvalidAccount)
}

pub fn deposit_receipt_to_model(acct: &DepositReceiptAccount) -> Result<DepositReceipt, PoolError> {
    Ok(DepositReceipt {
        pool: acct.pool,
        provider: acct.provider,
        amount_a: acct.amount_a,
        amount_b: acct.amount_b,
        net_a: acct.net_a,
        net_b: acct.net_b,
        credited_a: acct.credited_a,
        credited_b: acct.credited_b,
        lp_tokens_minted: acct.lp_tokens_minted,
        min_lp_tokens: acct.min_lp_tokens,
        status: receipt_status(acct.status)?,
        created_at: acct.created_at,
        committed_at: acct.committed_at,
        delegation: acct.delegation.to_model()?,
    })
}

pub fn store_deposit_receipt(acct: &mut DepositReceiptAccount, r: &DepositReceipt) {
    acct.pool = r.pool;
    acct.provider = r.provider;
    acct.amount_a = r.amount_a;
    acct.amount_b = r.amount_b;
    acct.net_a = r.net_a;
    acct.net_b = r.net_b;
    acct.credited_a = r.credited_a;
    acct.credited_b = r.credited_b;
    acct.lp_tokens_minted = r.lp_tokens_minted;
    acct.min_lp_tokens = r.min_lp_tokens;
    acct.status = r.status as u8;
    acct.created_at = r.created_at;
    acct.committed_at = r.committed_at;
    acct.delegation = DelegationSlot::from_model(&r.delegation);
}

pub fn withdraw_receipt_to_model(acct: &WithdrawReceiptAccount) -> Result<WithdrawReceipt, PoolError> {
    Ok(WithdrawReceipt {
        pool: acct.pool,
        provider: acct.provider,
        lp_tokens_to_burn: acct.lp_tokens_to_burn,
        min_amount_a: acct.min_amount_a,
        min_amount_b: acct.min_amount_b,
        amount_a_withdrawn: acct.amount_a_withdrawn,
        amount_b_withdrawn: acct.amount_b_withdrawn,
        status: receipt_status(acct.status)?,
        created_at: acct.created_at,
        committed_at: acct.committed_at,
        delegation: acct.delegation.to_model()?,
    })
}

pub fn store_withdraw_receipt(acct: &mut WithdrawReceiptAccount, r: &WithdrawReceipt) {
    acct.pool = r.pool;
    acct.provider = r.provider;
    acct.lp_tokens_to_burn = r.lp_tokens_to_burn;
    acct.min_amount_a = r.min_amount_a;
    acct.min_amount_b = r.min_amount_b;
    acct.amount_a_withdrawn = r.amount_a_withdrawn;
    acct.amount_b_withdrawn = r.amount_b_withdrawn;
    acct.status = r.status as u8;
    acct.created_at = r.created_at;
    acct.committed_at = r.committed_at;
    acct.delegation = DelegationSlot::from_model(&r.delegation);
}
