//! Generators for arbitrary pool state (for Kani)

#[cfg(kani)]
use kani::any;
use pool_model::*;

pub const POOL_KEY: Key = [9u8; 32];
pub const AUTHORITY: Key = [2u8; 32];
pub const PROVIDER: Key = [1u8; 32];

// Small bounds keep the SAT problem tractable
#[cfg(kani)]
const MAX_VAL: u64 = 100;

/// Empty pool with fixed keys and the given fees
pub fn fresh_pool(trade_fee_bps: u16, protocol_fee_bps: u16) -> Option<Pool> {
    let params = PoolParams {
        authority: AUTHORITY,
        pool_id: 1,
        name: "kani",
        max_aum_usd: 0,
        metadata_title: "",
        metadata_symbol: "",
        metadata_uri: "",
        trade_fee_bps,
        protocol_fee_bps,
        fee_recipient: [3u8; 32],
        lp_mint: [4u8; 32],
        token_a_mint: [5u8; 32],
        token_b_mint: [6u8; 32],
        token_a_vault: [7u8; 32],
        token_b_vault: [8u8; 32],
    };
    initialize_pool(&params, 0).ok()
}

/// Pool whose whole LP supply is held by the returned provider
#[cfg(kani)]
pub fn any_pool_with_holder() -> (Pool, LiquidityProvider) {
    let trade_raw: u8 = any();
    let protocol_raw: u8 = any();
    let mut pool = fresh_pool(trade_raw as u16 % 50, protocol_raw as u16 % 50).expect("fees below 100%");
    let mut holder = LiquidityProvider::new(PROVIDER);

    let seeded: bool = any();
    if seeded {
        let a = (any::<u8>() as u64 % MAX_VAL).max(1);
        let b = (any::<u8>() as u64 % MAX_VAL).max(1);
        let lp = (any::<u8>() as u64 % MAX_VAL).max(1);
        pool.reserve_a = a;
        pool.reserve_b = b;
        pool.total_lp_supply = lp;
        holder.positions.push(PoolPosition {
            pool: POOL_KEY,
            token_mint: pool.lp_mint,
            liquidity_amount: a + b,
            lp_tokens: lp,
        });
        holder.total_lp_tokens = lp;
        holder.total_liquidity_provided = a + b;
    }
    (pool, holder)
}

#[cfg(kani)]
pub fn any_amount() -> u64 {
    any::<u8>() as u64 % MAX_VAL
}
