//! State space sanitizer - bounds values for Kani exploration

use pool_model::*;

pub const N_POSITIONS: usize = 3;
pub const MAX_STEPS: u8 = 4;

const MAX_RESERVE: u64 = 1_000_000;
const MAX_SUPPLY: u64 = 1_000_000;
const MAX_FEE_BPS: u16 = 500;

pub trait Sanitize {
    fn sanitize(self) -> Self;
}

impl Sanitize for Pool {
    fn sanitize(mut self) -> Pool {
        self.reserve_a %= MAX_RESERVE;
        self.reserve_b %= MAX_RESERVE;
        self.total_lp_supply %= MAX_SUPPLY;

        // Either fully seeded or fully empty
        if self.reserve_a == 0 || self.reserve_b == 0 || self.total_lp_supply == 0 {
            self.reserve_a = 0;
            self.reserve_b = 0;
            self.total_lp_supply = 0;
        }

        self.fees.trade_fee_bps %= MAX_FEE_BPS;
        self.fees.protocol_fee_bps %= MAX_FEE_BPS;
        self
    }
}

impl Sanitize for LiquidityProvider {
    fn sanitize(mut self) -> LiquidityProvider {
        self.positions.truncate(N_POSITIONS);
        self.positions.retain(|p| p.lp_tokens > 0);
        self.total_lp_tokens = self
            .positions
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.lp_tokens));
        self
    }
}
