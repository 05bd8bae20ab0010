//! Constant-product pricing and LP share math
//!
//! Every intermediate runs in u128 with checked operations; results are
//! narrowed back to u64 only after the final division. Division rounds toward
//! zero everywhere, which always favors the pool over the caller.

use crate::error::PoolError;

/// Basis point denominator (100% = 10_000 bps)
pub const BPS_DENOMINATOR: u64 = 10_000;

#[inline]
pub fn checked_add(a: u64, b: u64) -> Result<u64, PoolError> {
    a.checked_add(b).ok_or(PoolError::MathOverflow)
}

#[inline]
pub fn checked_sub(a: u64, b: u64) -> Result<u64, PoolError> {
    a.checked_sub(b).ok_or(PoolError::MathOverflow)
}

/// `a * b / d` in u128, narrowed to u64
#[inline]
pub fn mul_div(a: u64, b: u64, d: u64) -> Result<u64, PoolError> {
    let product = (a as u128)
        .checked_mul(b as u128)
        .ok_or(PoolError::MathOverflow)?;
    let quotient = product
        .checked_div(d as u128)
        .ok_or(PoolError::MathOverflow)?;
    u64::try_from(quotient).map_err(|_| PoolError::MathOverflow)
}

/// Integer square root (floor) via Newton iteration
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x >> 1) + (x & 1);
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// floor(sqrt(a * b)); seeds the LP supply of an empty pool
pub fn geometric_mean(a: u64, b: u64) -> Result<u64, PoolError> {
    let product = (a as u128)
        .checked_mul(b as u128)
        .ok_or(PoolError::MathOverflow)?;
    // sqrt of a u128 always fits in u64
    u64::try_from(isqrt(product)).map_err(|_| PoolError::MathOverflow)
}

/// Result of splitting a gross amount into fees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeSplit {
    /// Amount that earns LP shares
    pub net: u64,
    /// Retained in reserves, accrues to existing LPs
    pub trade_fee: u64,
    /// Routed to the fee recipient
    pub protocol_fee: u64,
}

impl FeeSplit {
    /// Portion that lands in the pool vault (`net + trade_fee`)
    #[inline]
    pub fn credited(&self) -> u64 {
        // net + trade_fee <= gross, cannot overflow
        self.net + self.trade_fee
    }
}

/// Take trade and protocol fees out of a gross amount
pub fn apply_fees(
    amount: u64,
    trade_fee_bps: u16,
    protocol_fee_bps: u16,
) -> Result<FeeSplit, PoolError> {
    if trade_fee_bps as u64 + protocol_fee_bps as u64 >= BPS_DENOMINATOR {
        return Err(PoolError::InvalidFeeConfig);
    }
    let trade_fee = mul_div(amount, trade_fee_bps as u64, BPS_DENOMINATOR)?;
    let protocol_fee = mul_div(amount, protocol_fee_bps as u64, BPS_DENOMINATOR)?;
    let net = checked_sub(checked_sub(amount, trade_fee)?, protocol_fee)?;
    Ok(FeeSplit {
        net,
        trade_fee,
        protocol_fee,
    })
}

/// LP tokens issued for a deposit of `(amount_a, amount_b)`
///
/// An empty pool mints `geometric_mean(amount_a, amount_b)`. Otherwise the
/// smaller of the two proportional shares is minted, so the excess of the
/// over-supplied side is donated to the pool.
pub fn quote_deposit(
    reserve_a: u64,
    reserve_b: u64,
    total_lp_supply: u64,
    amount_a: u64,
    amount_b: u64,
    min_lp_tokens: u64,
) -> Result<u64, PoolError> {
    if amount_a == 0 || amount_b == 0 {
        return Err(PoolError::InvalidAmount);
    }

    let lp_out = if total_lp_supply == 0 {
        geometric_mean(amount_a, amount_b)?
    } else {
        if reserve_a == 0 || reserve_b == 0 {
            return Err(PoolError::InvalidPoolState);
        }
        let share_a = mul_div(amount_a, total_lp_supply, reserve_a)?;
        let share_b = mul_div(amount_b, total_lp_supply, reserve_b)?;
        share_a.min(share_b)
    };

    if lp_out == 0 {
        return Err(PoolError::InvalidAmount);
    }
    if lp_out < min_lp_tokens {
        return Err(PoolError::SlippageExceeded);
    }
    Ok(lp_out)
}

/// Token payout for burning `lp_tokens_in`
///
/// `amount_x = reserve_x * lp_tokens_in / total_lp_supply`, rounded down.
pub fn quote_withdraw(
    reserve_a: u64,
    reserve_b: u64,
    total_lp_supply: u64,
    lp_tokens_in: u64,
    min_amount_a: u64,
    min_amount_b: u64,
) -> Result<(u64, u64), PoolError> {
    if lp_tokens_in == 0 {
        return Err(PoolError::InvalidAmount);
    }
    if total_lp_supply == 0 || lp_tokens_in > total_lp_supply {
        return Err(PoolError::InsufficientReserves);
    }

    let amount_a = mul_div(reserve_a, lp_tokens_in, total_lp_supply)?;
    let amount_b = mul_div(reserve_b, lp_tokens_in, total_lp_supply)?;

    if amount_a > reserve_a || amount_b > reserve_b {
        return Err(PoolError::InsufficientReserves);
    }
    if amount_a < min_amount_a || amount_b < min_amount_b {
        return Err(PoolError::SlippageExceeded);
    }
    Ok((amount_a, amount_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(3), 1);
        assert_eq!(isqrt(4), 2);
        assert_eq!(isqrt(1_000_000), 1_000);
        assert_eq!(isqrt(999_999), 999);
        assert_eq!(isqrt(u64::MAX as u128 * u64::MAX as u128), u64::MAX as u128);
    }

    #[test]
    fn test_seed_deposit_uses_geometric_mean() {
        assert_eq!(quote_deposit(0, 0, 0, 1000, 1000, 0).unwrap(), 1000);
        assert_eq!(quote_deposit(0, 0, 0, 100, 400, 0).unwrap(), 200);
    }

    #[test]
    fn test_proportional_deposit_takes_minimum() {
        // 1000/1000 pool, 1000 LP outstanding
        assert_eq!(quote_deposit(1000, 1000, 1000, 500, 500, 0).unwrap(), 500);
        // Over-supplying A only earns the B-side share
        assert_eq!(quote_deposit(1000, 1000, 1000, 900, 300, 0).unwrap(), 300);
    }

    #[test]
    fn test_deposit_rejects_zero_and_dust() {
        assert_eq!(
            quote_deposit(1000, 1000, 1000, 0, 10, 0),
            Err(PoolError::InvalidAmount)
        );
        // 1 * 10 / 1_000_000 rounds to zero
        assert_eq!(
            quote_deposit(1_000_000, 1_000_000, 10, 1, 1, 0),
            Err(PoolError::InvalidAmount)
        );
    }

    #[test]
    fn test_deposit_slippage() {
        assert_eq!(
            quote_deposit(1000, 1000, 1000, 500, 500, 501),
            Err(PoolError::SlippageExceeded)
        );
        assert_eq!(quote_deposit(1000, 1000, 1000, 500, 500, 500).unwrap(), 500);
    }

    #[test]
    fn test_deposit_overflow_surfaces() {
        // share exceeds u64
        assert_eq!(
            quote_deposit(1, 1, u64::MAX, u64::MAX, u64::MAX, 0),
            Err(PoolError::MathOverflow)
        );
    }

    #[test]
    fn test_withdraw_exact_division() {
        assert_eq!(quote_withdraw(1500, 1500, 1500, 750, 0, 0).unwrap(), (750, 750));
        // 1000 * 333 / 999 = 333.33 -> 333
        assert_eq!(quote_withdraw(1000, 2000, 999, 333, 0, 0).unwrap(), (333, 666));
    }

    #[test]
    fn test_withdraw_errors() {
        assert_eq!(quote_withdraw(100, 100, 100, 0, 0, 0), Err(PoolError::InvalidAmount));
        assert_eq!(
            quote_withdraw(100, 100, 100, 101, 0, 0),
            Err(PoolError::InsufficientReserves)
        );
        assert_eq!(quote_withdraw(0, 0, 0, 1, 0, 0), Err(PoolError::InsufficientReserves));
        assert_eq!(
            quote_withdraw(100, 100, 100, 50, 51, 0),
            Err(PoolError::SlippageExceeded)
        );
        assert_eq!(
            quote_withdraw(100, 100, 100, 50, 0, 51),
            Err(PoolError::SlippageExceeded)
        );
    }

    #[test]
    fn test_apply_fees() {
        let split = apply_fees(10_000, 30, 5).unwrap();
        assert_eq!(split.trade_fee, 30);
        assert_eq!(split.protocol_fee, 5);
        assert_eq!(split.net, 9_965);
        assert_eq!(split.credited(), 9_995);

        let free = apply_fees(777, 0, 0).unwrap();
        assert_eq!(free, FeeSplit { net: 777, trade_fee: 0, protocol_fee: 0 });

        assert_eq!(apply_fees(100, 9_000, 1_000), Err(PoolError::InvalidFeeConfig));
    }

    #[test]
    fn test_fees_round_down() {
        // 99 * 30 / 10_000 = 0.297
        let split = apply_fees(99, 30, 30).unwrap();
        assert_eq!(split.trade_fee, 0);
        assert_eq!(split.protocol_fee, 0);
        assert_eq!(split.net, 99);
    }
}
