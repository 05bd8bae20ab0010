//! Invariant checking helpers

use crate::state::*;

/// reserve_a == 0 <=> reserve_b == 0 <=> total_lp_supply == 0
pub fn pool_seeding_consistent(pool: &Pool) -> bool {
    let a = pool.reserve_a == 0;
    let b = pool.reserve_b == 0;
    let lp = pool.total_lp_supply == 0;
    a == b && b == lp
}

/// trade + protocol fee strictly below 100%
pub fn fee_config_valid(pool: &Pool) -> bool {
    pool.fees.validate().is_ok()
}

/// No pool appears twice in the provider's positions
pub fn no_duplicate_positions(provider: &LiquidityProvider) -> bool {
    let positions = &provider.positions;
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            if positions[i].pool == positions[j].pool {
                return false;
            }
        }
    }
    true
}

/// total_lp_tokens equals the sum of position LP tokens, no duplicates, no
/// zero-LP entries
pub fn provider_totals_consistent(provider: &LiquidityProvider) -> bool {
    let mut sum: u128 = 0;
    for pos in provider.positions.iter() {
        if pos.lp_tokens == 0 {
            return false;
        }
        sum += pos.lp_tokens as u128;
    }
    sum == provider.total_lp_tokens as u128 && no_duplicate_positions(provider)
}

/// Pool-wide conservation check across every provider that holds LP
///
/// Only meaningful when `providers` is the complete set of LP holders.
pub fn lp_supply_matches_ledgers(pool_key: &Key, pool: &Pool, providers: &[LiquidityProvider]) -> bool {
    let held: u128 = providers
        .iter()
        .filter_map(|p| p.position(pool_key))
        .map(|pos| pos.lp_tokens as u128)
        .sum();
    held == pool.total_lp_supply as u128
}

/// Receipt amounts that must never change after creation
pub fn deposit_receipt_amounts_unchanged(before: &DepositReceipt, after: &DepositReceipt) -> bool {
    before.pool == after.pool
        && before.provider == after.provider
        && before.amount_a == after.amount_a
        && before.amount_b == after.amount_b
        && before.credited_a == after.credited_a
        && before.credited_b == after.credited_b
        && before.lp_tokens_minted == after.lp_tokens_minted
}
