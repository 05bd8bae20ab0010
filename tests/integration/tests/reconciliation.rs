//! Orphaned receipts resolved on the base ledger

use pool_integration_tests::*;
use pool_model::{
    CommitOutcome, DepositResolution, DepositSettlement, PoolError, ReceiptStatus, ReconcileMode, WithdrawResolution,
    MIN_COMMIT_FREQUENCY_MS, RECONCILE_TIMEOUT_SECS,
};

fn seeded() -> Harness {
    let mut h = Harness::new(0, 0).unwrap();
    for p in [ALICE, BOB, CAROL] {
        h.open_ledger(p).unwrap();
    }
    h.deposit(ALICE, 1_000, 1_000, 0).unwrap();
    h
}

#[test]
fn test_refund_only_after_timeout() {
    let mut h = seeded();
    h.initiate_deposit(BOB, 100, 100, 0).unwrap();

    h.advance(RECONCILE_TIMEOUT_SECS - 1);
    assert_eq!(
        h.reconcile_deposit(BOB, ReconcileMode::Refund, BOB),
        Err(PoolError::InvalidPoolState)
    );

    h.advance(1);
    assert_eq!(
        h.reconcile_deposit(BOB, ReconcileMode::Refund, CAROL),
        Err(PoolError::Unauthorized)
    );
    assert_eq!(
        h.reconcile_deposit(BOB, ReconcileMode::Refund, BOB),
        Ok(DepositResolution::Refunded {
            amount_a: 100,
            amount_b: 100
        })
    );
    assert_eq!(h.vaults(), (1_000, 1_000));
    assert_eq!(h.deposit_receipt(BOB).status, ReceiptStatus::Refunded as u8);
    assert_eq!(h.pool().total_lp_supply, 1_000);

    // A late commit of the refunded receipt is refused
    assert_eq!(h.commit_deposit(BOB), Err(PoolError::InvalidPoolState));

    // The receipt can be reused
    assert_eq!(h.initiate_deposit(BOB, 10, 10, 0), Ok(10));
}

#[test]
fn test_authority_completes_orphaned_deposit() {
    let mut h = seeded();
    h.initiate_deposit(BOB, 100, 100, 0).unwrap();
    h.advance(RECONCILE_TIMEOUT_SECS);

    assert_eq!(
        h.reconcile_deposit(BOB, ReconcileMode::Complete, AUTHORITY),
        Ok(DepositResolution::Minted(DepositSettlement {
            lp_tokens: 100,
            protocol_fee_a: 0,
            protocol_fee_b: 0
        }))
    );
    assert_eq!(h.lp_balance(BOB), 100);
    assert_eq!(h.ledger(BOB).total_lp_tokens, 100);
    assert_eq!(h.deposit_receipt(BOB).status, ReceiptStatus::Settled as u8);

    let pool = h.pool();
    assert_eq!((pool.reserve_a, pool.reserve_b), h.vaults());
    assert_eq!(pool.total_lp_supply, h.lp_balance(ALICE) + h.lp_balance(BOB));
}

#[test]
fn test_committed_receipt_is_not_orphaned() {
    let mut h = seeded();
    h.initiate_deposit(BOB, 100, 100, 0).unwrap();
    assert_eq!(h.commit_deposit(BOB), Ok(CommitOutcome::Applied));
    h.advance(RECONCILE_TIMEOUT_SECS * 2);

    assert_eq!(
        h.reconcile_deposit(BOB, ReconcileMode::Refund, AUTHORITY),
        Err(PoolError::InvalidPoolState)
    );
    assert_eq!(h.settle_deposit(BOB), Ok(100));
}

#[test]
fn test_reconcile_blocked_while_pool_delegated() {
    let mut h = seeded();
    h.initiate_deposit(BOB, 100, 100, 0).unwrap();
    h.delegate(Entity::Pool, AUTHORITY, MIN_COMMIT_FREQUENCY_MS).unwrap();
    h.advance(RECONCILE_TIMEOUT_SECS);

    assert_eq!(
        h.reconcile_deposit(BOB, ReconcileMode::Refund, BOB),
        Err(PoolError::InvalidPoolState)
    );

    h.undelegate(Entity::Pool, AUTHORITY).unwrap();
    assert!(h.reconcile_deposit(BOB, ReconcileMode::Refund, BOB).is_ok());
}

#[test]
fn test_delegated_receipt_cannot_be_reconciled() {
    let mut h = seeded();
    h.initiate_deposit(BOB, 100, 100, 0).unwrap();
    h.delegate(Entity::DepositReceipt(BOB), BOB, MIN_COMMIT_FREQUENCY_MS).unwrap();
    h.advance(RECONCILE_TIMEOUT_SECS);

    assert_eq!(
        h.reconcile_deposit(BOB, ReconcileMode::Refund, BOB),
        Err(PoolError::InvalidAccount)
    );
}

#[test]
fn test_refund_returns_escrowed_lp() {
    let mut h = seeded();
    h.initiate_withdraw(ALICE, 250, 0, 0).unwrap();
    assert_eq!(h.lp_balance(ALICE), 750);
    h.advance(RECONCILE_TIMEOUT_SECS);

    assert_eq!(
        h.reconcile_withdraw(ALICE, ReconcileMode::Refund, ALICE),
        Ok(WithdrawResolution::Refunded { lp_tokens: 250 })
    );
    assert_eq!(h.lp_balance(ALICE), 1_000);
    assert_eq!(h.lp_escrow(), 0);
    assert_eq!(h.vaults(), (1_000, 1_000));
    assert_eq!(h.withdraw_receipt(ALICE).status, ReceiptStatus::Refunded as u8);
}

#[test]
fn test_authority_completes_orphaned_withdraw() {
    let mut h = seeded();
    h.initiate_withdraw(ALICE, 250, 0, 0).unwrap();
    h.advance(RECONCILE_TIMEOUT_SECS);

    assert_eq!(
        h.reconcile_withdraw(ALICE, ReconcileMode::Complete, AUTHORITY),
        Ok(WithdrawResolution::Paid {
            lp_tokens: 250,
            amount_a: 250,
            amount_b: 250
        })
    );
    assert_eq!(h.lp_escrow(), 0);
    assert_eq!(h.vaults(), (750, 750));
    let pool = h.pool();
    assert_eq!((pool.reserve_a, pool.reserve_b, pool.total_lp_supply), (750, 750, 750));
    assert_eq!(h.ledger(ALICE).total_lp_tokens, 750);
}
