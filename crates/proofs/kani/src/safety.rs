//! Kani proofs for the pool invariants

use kani::{any, assume};
use pool_model::math::*;
use pool_model::*;
use crate::{adversary::*, generators::*, sanitizer::*};

/// Seeding: reserves and supply are zero together, across any short sequence
#[kani::proof]
#[kani::unwind(6)]
fn seeding_consistent_across_short_adversary_sequences() {
    let (pool, holder) = any_pool_with_holder();
    let mut pool = pool.sanitize();
    let mut holder = holder.sanitize();
    assume(pool_seeding_consistent(&pool));

    let steps = (any::<u8>() % MAX_STEPS) + 1;
    for i in 0..steps {
        adversary_step(&mut pool, &mut holder, i as i64);
        kani::assert(pool_seeding_consistent(&pool), "reserves and supply must be zero together");
    }
}

/// LP conservation: with a single holder, supply equals the holder's position
#[kani::proof]
#[kani::unwind(6)]
fn lp_supply_matches_sole_holder() {
    let (mut pool, mut holder) = any_pool_with_holder();

    let steps = (any::<u8>() % MAX_STEPS) + 1;
    for i in 0..steps {
        adversary_step(&mut pool, &mut holder, i as i64);
        kani::assert(
            lp_supply_matches_ledgers(&POOL_KEY, &pool, core::slice::from_ref(&holder)),
            "total_lp_supply must equal LP held in ledgers",
        );
        kani::assert(provider_totals_consistent(&holder), "ledger totals must match positions");
    }
}

/// Atomicity: a failed deposit leaves pool and ledger untouched
#[kani::proof]
#[kani::unwind(6)]
fn failed_deposit_changes_nothing() {
    let (mut pool, mut holder) = any_pool_with_holder();
    let before_pool = pool;
    let before_holder = holder.clone();

    let min_lp: u8 = any();
    if deposit(&mut pool, &POOL_KEY, &mut holder, any_amount(), any_amount(), min_lp as u64, 1).is_err() {
        kani::assert(pool == before_pool, "pool must be unchanged on error");
        kani::assert(holder == before_holder, "ledger must be unchanged on error");
    }
}

/// Withdrawals never pay out more than the reserves hold
#[kani::proof]
#[kani::unwind(6)]
fn withdraw_bounded_by_reserves() {
    let (mut pool, mut holder) = any_pool_with_holder();
    let before = pool;
    let lp = any_amount();

    if let Ok((a, b)) = withdraw(&mut pool, &POOL_KEY, &mut holder, lp, 0, 0, 1) {
        kani::assert(a <= before.reserve_a && b <= before.reserve_b, "payout exceeds reserves");
        kani::assert(pool.reserve_a == before.reserve_a - a, "reserve_a debited by payout");
        kani::assert(pool.reserve_b == before.reserve_b - b, "reserve_b debited by payout");
        kani::assert(pool.total_lp_supply == before.total_lp_supply - lp, "supply debited by burn");
    }
}

/// Gating: while delegated the base ledger rejects direct mutation
#[kani::proof]
#[kani::unwind(6)]
fn delegated_pool_rejects_direct_operations() {
    let (mut pool, mut holder) = any_pool_with_holder();
    assume(delegate_pool(&mut pool, None, MIN_COMMIT_FREQUENCY_MS, 0).is_ok());
    let before = pool;

    let dep = deposit(&mut pool, &POOL_KEY, &mut holder, any_amount(), any_amount(), 0, 1);
    kani::assert(dep.is_err(), "deposit must fail while delegated");
    let wd = withdraw(&mut pool, &POOL_KEY, &mut holder, any_amount(), 0, 0, 1);
    kani::assert(wd.is_err(), "withdraw must fail while delegated");
    kani::assert(pool == before, "pool must be unchanged");
}

/// Fee split conserves the gross amount
#[kani::proof]
fn fee_split_conserves_amount() {
    let amount: u32 = any();
    let trade: u16 = any();
    let protocol: u16 = any();
    assume((trade as u64) + (protocol as u64) < BPS_DENOMINATOR);

    if let Ok(split) = apply_fees(amount as u64, trade, protocol) {
        kani::assert(
            split.net + split.trade_fee + split.protocol_fee == amount as u64,
            "net + fees must equal the gross amount",
        );
        kani::assert(split.credited() <= amount as u64, "credited never exceeds gross");
    }
}

/// Receipts: commit is idempotent and settle requires a prior commit
#[kani::proof]
#[kani::unwind(6)]
fn receipt_commit_idempotent_and_settle_ordered() {
    let (mut pool, mut holder) = any_pool_with_holder();
    let mut receipt = DepositReceipt::default();
    let provider = holder.provider;

    assume(initiate_deposit(&pool, &POOL_KEY, &mut receipt, &provider, any_amount(), any_amount(), 0, 1).is_ok());
    let locked = receipt;

    let mut early = receipt;
    kani::assert(settle_deposit(&mut early).is_err(), "settle before commit must fail");

    if commit_deposit(&mut pool, &POOL_KEY, &mut holder, &mut receipt, 2) == Ok(CommitOutcome::Applied) {
        kani::assert(deposit_receipt_amounts_unchanged(&locked, &receipt), "locked quote must not move");
        let after_first = pool;
        let again = commit_deposit(&mut pool, &POOL_KEY, &mut holder, &mut receipt, 3);
        kani::assert(again == Ok(CommitOutcome::AlreadyCommitted), "second commit is a no-op");
        kani::assert(pool == after_first, "second commit must not mutate the pool");
        kani::assert(settle_deposit(&mut receipt).map(|s| s.lp_tokens) == Ok(locked.lp_tokens_minted), "settle mints the locked quote");
    }
}
