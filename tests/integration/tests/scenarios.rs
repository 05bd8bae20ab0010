//! Single-venue pool scenarios

use pool_integration_tests::*;
use pool_model::{PoolError, StatusAction};

fn harness_with(providers: &[[u8; 32]], trade_fee_bps: u16, protocol_fee_bps: u16) -> Harness {
    let mut h = Harness::new(trade_fee_bps, protocol_fee_bps).unwrap();
    for p in providers {
        h.open_ledger(*p).unwrap();
    }
    h
}

#[test]
fn test_seed_deposit_and_partial_withdraw() {
    let mut h = harness_with(&[ALICE], 0, 0);

    assert_eq!(h.deposit(ALICE, 1_000, 1_000, 0), Ok(1_000));
    assert_eq!(h.pool().total_lp_supply, 1_000);

    assert_eq!(h.deposit(ALICE, 500, 500, 0), Ok(500));
    assert_eq!(h.pool().total_lp_supply, 1_500);

    assert_eq!(h.withdraw(ALICE, 750, 0, 0), Ok((750, 750)));
    let pool = h.pool();
    assert_eq!(pool.total_lp_supply, 750);
    assert_eq!((pool.reserve_a, pool.reserve_b), (750, 750));
    assert_eq!(h.ledger(ALICE).total_lp_tokens, 750);
    assert_eq!(h.lp_balance(ALICE), 750);
    assert_eq!(h.vaults(), (750, 750));
}

#[test]
fn test_slippage_leaves_pool_unchanged() {
    let mut h = harness_with(&[ALICE, BOB], 0, 0);
    h.deposit(ALICE, 1_000, 1_000, 0).unwrap();
    let before = image(&h.pool());

    assert_eq!(h.deposit(BOB, 500, 500, 501), Err(PoolError::SlippageExceeded));
    assert_eq!(image(&h.pool()), before);
    assert_eq!(h.ledger(BOB).total_lp_tokens, 0);
    assert_eq!(h.vaults(), (1_000, 1_000));
}

#[test]
fn test_fee_bound_rejected_at_creation() {
    assert!(matches!(Harness::new(9_000, 1_000), Err(PoolError::InvalidFeeConfig)));
    assert!(Harness::new(9_000, 999).is_ok());
}

#[test]
fn test_trade_fees_accrue_to_liquidity() {
    let mut h = harness_with(&[ALICE], 30, 5);

    // 10_000 gross: 30 trade fee stays in reserves, 5 goes to the recipient
    assert_eq!(h.deposit(ALICE, 10_000, 10_000, 0), Ok(9_965));
    let pool = h.pool();
    assert_eq!((pool.reserve_a, pool.reserve_b), (9_995, 9_995));
    assert_eq!((pool.protocol_fees_a, pool.protocol_fees_b), (5, 5));
    assert_eq!(h.fees_paid(), (5, 5));
    assert_eq!(h.vaults(), (9_995, 9_995));

    // Burning every LP token sweeps the retained fees as well
    assert_eq!(h.withdraw(ALICE, 9_965, 0, 0), Ok((9_995, 9_995)));
    assert_eq!(h.vaults(), (0, 0));
    assert_eq!(h.pool().total_lp_supply, 0);
}

#[test]
fn test_second_provider_gets_proportional_share() {
    let mut h = harness_with(&[ALICE, BOB], 0, 0);
    h.deposit(ALICE, 2_000, 500, 0).unwrap();
    let seeded = h.pool().total_lp_supply;
    assert_eq!(seeded, 1_000);

    // Over-supplying side B donates the excess
    assert_eq!(h.deposit(BOB, 200, 100, 0), Ok(100));
    let pool = h.pool();
    assert_eq!((pool.reserve_a, pool.reserve_b), (2_200, 600));
    assert_eq!(h.lp_balance(ALICE) + h.lp_balance(BOB), pool.total_lp_supply);
}

#[test]
fn test_paused_pool_rejects_deposits_until_unpaused() {
    let mut h = harness_with(&[ALICE], 0, 0);
    assert_eq!(h.set_status(BOB, StatusAction::Pause), Err(PoolError::Unauthorized));

    h.set_status(AUTHORITY, StatusAction::Pause).unwrap();
    assert_eq!(h.deposit(ALICE, 1_000, 1_000, 0), Err(PoolError::PoolPaused));

    h.set_status(AUTHORITY, StatusAction::Unpause).unwrap();
    assert_eq!(h.deposit(ALICE, 1_000, 1_000, 0), Ok(1_000));
}

#[test]
fn test_withdraw_needs_lp_balance() {
    let mut h = harness_with(&[ALICE, BOB], 0, 0);
    h.deposit(ALICE, 1_000, 1_000, 0).unwrap();
    assert_eq!(h.withdraw(BOB, 10, 0, 0), Err(PoolError::InsufficientTokenBalance));
    assert_eq!(h.withdraw(ALICE, 1_001, 0, 0), Err(PoolError::InsufficientTokenBalance));
}
