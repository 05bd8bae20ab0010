//! Random operation sequences keep vaults, reserves and LP holdings in step
//!
//! Increase cases: PROPTEST_CASES=1000 cargo test -p pool-integration-tests

use pool_integration_tests::*;
use pool_model::{ReceiptStatus, ReconcileMode, RECONCILE_TIMEOUT_SECS};
use proptest::prelude::*;

const PROVIDERS: [[u8; 32]; 3] = [ALICE, BOB, CAROL];

#[derive(Debug, Clone)]
enum Op {
    Deposit { who: usize, a: u64, b: u64 },
    Withdraw { who: usize, pct: u64 },
    Initiate { who: usize, a: u64, b: u64 },
    Commit { who: usize },
    Settle { who: usize },
    Expire { who: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, 1u64..100_000, 1u64..100_000).prop_map(|(who, a, b)| Op::Deposit { who, a, b }),
        (0..3usize, 1u64..=100).prop_map(|(who, pct)| Op::Withdraw { who, pct }),
        (0..3usize, 1u64..100_000, 1u64..100_000).prop_map(|(who, a, b)| Op::Initiate { who, a, b }),
        (0..3usize).prop_map(|who| Op::Commit { who }),
        (0..3usize).prop_map(|who| Op::Settle { who }),
        (0..3usize).prop_map(|who| Op::Expire { who }),
    ]
}

fn pending_credit(h: &Harness) -> (u64, u64) {
    // Tokens in the vaults that are not reserves: gross pending deposits and
    // protocol fees of committed receipts awaiting settlement
    PROVIDERS.iter().fold((0, 0), |(a, b), p| {
        match h.find_deposit_receipt(*p) {
            Some(r) if r.status == ReceiptStatus::Pending as u8 => (a + r.amount_a, b + r.amount_b),
            Some(r) if r.status == ReceiptStatus::Committed as u8 => {
                (a + r.amount_a - r.credited_a, b + r.amount_b - r.credited_b)
            }
            _ => (a, b),
        }
    })
}

proptest! {
    #[test]
    fn vaults_track_reserves_and_lp_tracks_supply(
        trade in 0u16..200,
        protocol in 0u16..100,
        ops in prop::collection::vec(op(), 1..40),
    ) {
        let mut h = Harness::new(trade, protocol).unwrap();
        for p in PROVIDERS {
            h.open_ledger(p).unwrap();
        }

        for op in ops {
            let _ = match op {
                Op::Deposit { who, a, b } => h.deposit(PROVIDERS[who], a, b, 0).map(|_| ()),
                Op::Withdraw { who, pct } => {
                    let lp = h.lp_balance(PROVIDERS[who]) * pct / 100;
                    h.withdraw(PROVIDERS[who], lp, 0, 0).map(|_| ())
                }
                Op::Initiate { who, a, b } => h.initiate_deposit(PROVIDERS[who], a, b, 0).map(|_| ()),
                Op::Commit { who } => h.commit_deposit(PROVIDERS[who]).map(|_| ()),
                Op::Settle { who } => h.settle_deposit(PROVIDERS[who]).map(|_| ()),
                Op::Expire { who } => {
                    h.advance(RECONCILE_TIMEOUT_SECS);
                    h.reconcile_deposit(PROVIDERS[who], ReconcileMode::Refund, PROVIDERS[who]).map(|_| ())
                }
            };
            let (pa, pb) = pending_credit(&h);
            let pool = h.pool();
            let (va, vb) = h.vaults();
            prop_assert_eq!(va, pool.reserve_a + pa);
            prop_assert_eq!(vb, pool.reserve_b + pb);
        }

        // Settle everything that was committed, then LP must add up
        for p in PROVIDERS {
            let _ = h.settle_deposit(p);
        }
        let pool = h.pool();
        let held: u64 = PROVIDERS.iter().map(|p| h.lp_balance(*p)).sum();
        prop_assert_eq!(held, pool.total_lp_supply);
        let ledgers: u64 = PROVIDERS.iter().map(|p| h.ledger(*p).total_lp_tokens).sum();
        prop_assert_eq!(ledgers, pool.total_lp_supply);
    }
}
