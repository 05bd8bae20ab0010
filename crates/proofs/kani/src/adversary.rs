//! Adversarial step generator

#[cfg(kani)]
use kani::any;
use pool_model::*;

#[cfg(kani)]
use crate::generators::{any_amount, POOL_KEY};

#[derive(Clone, Copy)]
pub enum Step {
    Deposit,
    Withdraw,
    Pause,
    Unpause,
    Delegate,
    Undelegate,
    ReceiptCycle,
}

#[cfg(kani)]
impl kani::Arbitrary for Step {
    fn any() -> Self {
        let choice: u8 = any();
        match choice % 7 {
            0 => Step::Deposit,
            1 => Step::Withdraw,
            2 => Step::Pause,
            3 => Step::Unpause,
            4 => Step::Delegate,
            5 => Step::Undelegate,
            _ => Step::ReceiptCycle,
        }
    }
}

/// Apply one arbitrary operation; failed operations must leave state alone,
/// which the caller checks through the invariants
#[cfg(kani)]
pub fn adversary_step(pool: &mut Pool, holder: &mut LiquidityProvider, now: i64) {
    match any::<Step>() {
        Step::Deposit => {
            let _ = deposit(pool, &POOL_KEY, holder, any_amount(), any_amount(), 0, now);
        }
        Step::Withdraw => {
            let _ = withdraw(pool, &POOL_KEY, holder, any_amount(), 0, 0, now);
        }
        Step::Pause => {
            let _ = apply_status(pool, StatusAction::Pause, now);
        }
        Step::Unpause => {
            let _ = apply_status(pool, StatusAction::Unpause, now);
        }
        Step::Delegate => {
            let _ = delegate_pool(pool, None, MIN_COMMIT_FREQUENCY_MS, now);
        }
        Step::Undelegate => {
            let _ = finalize_pool_undelegation(pool, now);
        }
        Step::ReceiptCycle => {
            let mut receipt = DepositReceipt::default();
            let provider = holder.provider;
            if initiate_deposit(pool, &POOL_KEY, &mut receipt, &provider, any_amount(), any_amount(), 0, now).is_ok() {
                let _ = commit_deposit(pool, &POOL_KEY, holder, &mut receipt, now);
            }
        }
    }
}
