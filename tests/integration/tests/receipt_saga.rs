//! Two-phase deposit and withdrawal across the base ledger and the venue

use pool_integration_tests::*;
use pool_model::{
    CommitOutcome, DepositResolution, PoolError, ReceiptStatus, ReconcileMode, MIN_COMMIT_FREQUENCY_MS,
    RECONCILE_TIMEOUT_SECS,
};

fn seeded() -> Harness {
    let mut h = Harness::new(0, 0).unwrap();
    for p in [ALICE, BOB, CAROL] {
        h.open_ledger(p).unwrap();
    }
    h.deposit(ALICE, 1_000, 1_000, 0).unwrap();
    h
}

fn delegate_all(h: &mut Harness, provider: [u8; 32]) {
    h.delegate(Entity::Pool, AUTHORITY, MIN_COMMIT_FREQUENCY_MS).unwrap();
    h.delegate(Entity::Ledger(provider), provider, MIN_COMMIT_FREQUENCY_MS).unwrap();
    h.delegate(Entity::DepositReceipt(provider), provider, MIN_COMMIT_FREQUENCY_MS).unwrap();
}

fn undelegate_all(h: &mut Harness, provider: [u8; 32]) {
    h.undelegate(Entity::DepositReceipt(provider), provider).unwrap();
    h.undelegate(Entity::Ledger(provider), provider).unwrap();
    h.undelegate(Entity::Pool, AUTHORITY).unwrap();
}

fn lp_held(h: &Harness) -> u64 {
    [ALICE, BOB, CAROL].iter().map(|p| h.lp_balance(*p)).sum::<u64>() + h.lp_escrow()
}

#[test]
fn test_deposit_saga_through_the_venue() {
    let mut h = seeded();

    // Phase 1 moves tokens but leaves the pool alone
    assert_eq!(h.initiate_deposit(BOB, 100, 100, 0), Ok(100));
    assert_eq!(h.vaults(), (1_100, 1_100));
    assert_eq!(h.pool().reserve_a, 1_000);
    assert_eq!(h.deposit_receipt(BOB).status, ReceiptStatus::Pending as u8);

    delegate_all(&mut h, BOB);
    assert_eq!(h.commit_deposit(BOB), Ok(CommitOutcome::Applied));
    assert_eq!(h.commit_deposit(BOB), Ok(CommitOutcome::AlreadyCommitted));
    assert_eq!(h.pool().total_lp_supply, 1_100);

    // Settlement only happens once the receipt is home
    assert_eq!(h.settle_deposit(BOB), Err(PoolError::InvalidAccount));
    undelegate_all(&mut h, BOB);

    assert_eq!(h.settle_deposit(BOB), Ok(100));
    assert_eq!(h.settle_deposit(BOB), Err(PoolError::InvalidPoolState));
    assert_eq!(h.deposit_receipt(BOB).status, ReceiptStatus::Settled as u8);

    let pool = h.base_pool();
    assert_eq!((pool.reserve_a, pool.reserve_b), h.vaults());
    assert_eq!(pool.total_lp_supply, lp_held(&h));
    assert_eq!(h.ledger(BOB).total_lp_tokens, 100);
}

#[test]
fn test_pending_receipt_blocks_a_second_initiate() {
    let mut h = seeded();
    h.initiate_deposit(BOB, 100, 100, 0).unwrap();
    assert_eq!(h.initiate_deposit(BOB, 50, 50, 0), Err(PoolError::InvalidPoolState));

    h.commit_deposit(BOB).unwrap();
    assert_eq!(h.initiate_deposit(BOB, 50, 50, 0), Err(PoolError::InvalidPoolState));

    h.settle_deposit(BOB).unwrap();
    assert_eq!(h.initiate_deposit(BOB, 50, 50, 0), Ok(50));
}

#[test]
fn test_commit_refused_when_reserves_moved_against_the_quote() {
    let mut h = seeded();
    // Both quotes are taken against the same (1000, 1000) reserves
    assert_eq!(h.initiate_deposit(BOB, 1_000, 100, 0), Ok(100));
    assert_eq!(h.initiate_deposit(CAROL, 100, 1_000, 0), Ok(100));

    // BOB's lopsided deposit leaves (2000, 1100) against 1100 LP
    h.commit_deposit(BOB).unwrap();
    let before = image(&h.pool());

    // CAROL would now get min(100 * 1100 / 2000, 1000) = 55 < 100
    assert_eq!(h.commit_deposit(CAROL), Err(PoolError::SlippageExceeded));
    assert_eq!(image(&h.pool()), before);
    assert_eq!(h.deposit_receipt(CAROL).status, ReceiptStatus::Pending as u8);
    assert_eq!(h.ledger(CAROL).total_lp_tokens, 0);
}

#[test]
fn test_withdraw_saga_with_full_exit() {
    let mut h = seeded();

    assert_eq!(h.initiate_withdraw(ALICE, 400, 0, 0), Ok((400, 400)));
    assert_eq!(h.lp_balance(ALICE), 600);
    assert_eq!(h.lp_escrow(), 400);
    assert_eq!(h.pool().total_lp_supply, 1_000);

    assert_eq!(h.settle_withdraw(ALICE), Err(PoolError::InvalidPoolState));
    assert_eq!(h.commit_withdraw(ALICE), Ok(CommitOutcome::Applied));
    assert_eq!(h.settle_withdraw(ALICE), Ok((400, 400)));
    assert_eq!(h.lp_escrow(), 0);
    assert_eq!(h.vaults(), (600, 600));

    // Last LP out sweeps everything
    assert_eq!(h.initiate_withdraw(ALICE, 600, 0, 0), Ok((600, 600)));
    h.commit_withdraw(ALICE).unwrap();
    assert_eq!(h.settle_withdraw(ALICE), Ok((600, 600)));

    let pool = h.base_pool();
    assert_eq!((pool.reserve_a, pool.reserve_b, pool.total_lp_supply), (0, 0, 0));
    assert_eq!(h.vaults(), (0, 0));
    assert_eq!(h.ledger(ALICE).total_lp_tokens, 0);
}

#[test]
fn test_withdraw_initiate_checks_lp_and_slippage() {
    let mut h = seeded();
    assert_eq!(h.initiate_withdraw(BOB, 1, 0, 0), Err(PoolError::InsufficientTokenBalance));
    assert_eq!(h.initiate_withdraw(ALICE, 500, 501, 0), Err(PoolError::SlippageExceeded));
    assert_eq!(h.lp_balance(ALICE), 1_000);
    assert_eq!(h.lp_escrow(), 0);
}

#[test]
fn test_fees_on_receipt_deposits() {
    let mut h = Harness::new(100, 50).unwrap();
    h.open_ledger(ALICE).unwrap();

    // 10_000 gross: 100 trade fee, 50 protocol fee, 9_850 net
    assert_eq!(h.initiate_deposit(ALICE, 10_000, 10_000, 0), Ok(9_850));
    assert_eq!(h.vaults(), (10_000, 10_000));
    assert_eq!(h.fees_paid(), (0, 0));

    h.commit_deposit(ALICE).unwrap();
    let pool = h.pool();
    assert_eq!((pool.reserve_a, pool.reserve_b), (9_950, 9_950));
    assert_eq!((pool.protocol_fees_a, pool.protocol_fees_b), (50, 50));

    // The protocol fee leaves the vaults only on settlement
    assert_eq!(h.settle_deposit(ALICE), Ok(9_850));
    assert_eq!(h.vaults(), (9_950, 9_950));
    assert_eq!(h.fees_paid(), (50, 50));
}

#[test]
fn test_refund_returns_gross_deposit() {
    let mut h = Harness::new(30, 100).unwrap();
    h.open_ledger(ALICE).unwrap();

    h.initiate_deposit(ALICE, 10_000, 10_000, 0).unwrap();
    assert_eq!(h.deposit_receipt(ALICE).credited_a, 9_900);
    h.advance(RECONCILE_TIMEOUT_SECS);

    assert_eq!(
        h.reconcile_deposit(ALICE, ReconcileMode::Refund, ALICE),
        Ok(DepositResolution::Refunded {
            amount_a: 10_000,
            amount_b: 10_000
        })
    );
    assert_eq!(h.vaults(), (0, 0));
    assert_eq!(h.fees_paid(), (0, 0));
}
