//! Delegation gating and venue checkpoints

use pool_integration_tests::*;
use pool_model::{PoolError, MIN_COMMIT_FREQUENCY_MS};

fn seeded() -> Harness {
    let mut h = Harness::new(0, 0).unwrap();
    h.open_ledger(ALICE).unwrap();
    h.deposit(ALICE, 1_000, 1_000, 0).unwrap();
    h
}

#[test]
fn test_direct_deposit_blocked_while_migrating() {
    let mut h = seeded();
    h.delegate(Entity::Pool, AUTHORITY, MIN_COMMIT_FREQUENCY_MS).unwrap();
    assert!(h.is_delegated(Entity::Pool));
    assert!(h.base_pool().is_migrating());

    assert_eq!(h.deposit(ALICE, 500, 500, 0), Err(PoolError::InvalidPoolState));
    assert_eq!(h.withdraw(ALICE, 100, 0, 0), Err(PoolError::InvalidPoolState));

    h.undelegate(Entity::Pool, AUTHORITY).unwrap();
    assert!(!h.is_delegated(Entity::Pool));
    assert!(!h.base_pool().is_migrating());
    assert_eq!(h.deposit(ALICE, 500, 500, 0), Ok(500));
}

#[test]
fn test_only_controller_may_delegate() {
    let mut h = seeded();
    assert_eq!(
        h.delegate(Entity::Pool, ALICE, MIN_COMMIT_FREQUENCY_MS),
        Err(PoolError::Unauthorized)
    );
    assert_eq!(
        h.delegate(Entity::Ledger(ALICE), BOB, MIN_COMMIT_FREQUENCY_MS),
        Err(PoolError::Unauthorized)
    );
    h.delegate(Entity::Ledger(ALICE), ALICE, MIN_COMMIT_FREQUENCY_MS).unwrap();

    h.delegate(Entity::Pool, AUTHORITY, MIN_COMMIT_FREQUENCY_MS).unwrap();
    assert_eq!(h.undelegate(Entity::Pool, ALICE), Err(PoolError::Unauthorized));
    assert!(h.is_delegated(Entity::Pool));
}

#[test]
fn test_cannot_delegate_twice_or_too_fast() {
    let mut h = seeded();
    assert_eq!(
        h.delegate(Entity::Pool, AUTHORITY, MIN_COMMIT_FREQUENCY_MS - 1),
        Err(PoolError::InvalidAmount)
    );
    assert!(!h.base_pool().is_migrating());

    h.delegate(Entity::Pool, AUTHORITY, MIN_COMMIT_FREQUENCY_MS).unwrap();
    assert_eq!(
        h.delegate(Entity::Pool, AUTHORITY, MIN_COMMIT_FREQUENCY_MS),
        Err(PoolError::InvalidPoolState)
    );
}

#[test]
fn test_undelegate_requires_delegation() {
    let mut h = seeded();
    assert_eq!(h.undelegate(Entity::Pool, AUTHORITY), Err(PoolError::InvalidAccount));
}

#[test]
fn test_checkpoints_are_throttled() {
    let mut h = seeded();
    assert_eq!(h.checkpoint(Entity::Pool), Err(PoolError::InvalidAccount));

    h.delegate(Entity::Pool, AUTHORITY, 2_000).unwrap();
    assert_eq!(h.checkpoint(Entity::Pool), Err(PoolError::InvalidPoolState));

    h.advance(1);
    assert_eq!(h.checkpoint(Entity::Pool), Err(PoolError::InvalidPoolState));

    h.advance(1);
    h.checkpoint(Entity::Pool).unwrap();
    assert_eq!(h.checkpoint(Entity::Pool), Err(PoolError::InvalidPoolState));
}

#[test]
fn test_venue_state_survives_the_round_trip() {
    let mut h = seeded();
    h.open_ledger(BOB).unwrap();
    h.initiate_deposit(BOB, 100, 100, 0).unwrap();

    for (entity, signer) in [
        (Entity::Pool, AUTHORITY),
        (Entity::Ledger(BOB), BOB),
        (Entity::DepositReceipt(BOB), BOB),
    ] {
        h.delegate(entity, signer, MIN_COMMIT_FREQUENCY_MS).unwrap();
    }
    h.commit_deposit(BOB).unwrap();

    // Base copy is stale until the venue hands the pool back
    assert_eq!(h.base_pool().total_lp_supply, 1_000);
    assert_eq!(h.pool().total_lp_supply, 1_100);

    h.undelegate(Entity::Pool, AUTHORITY).unwrap();
    assert_eq!(h.base_pool().total_lp_supply, 1_100);
    assert_eq!(h.base_pool().reserve_a, 1_100);
}
