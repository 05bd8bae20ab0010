//! Pool instruction handlers
//!
//! Each handler is split in two: a pure `apply_*` function over the
//! zero-copy state (unit tested on the host) and a `process_*` function that
//! validates accounts and performs the CPIs.

pub mod delegation;
pub mod deposit;
pub mod deposit_receipt;
pub mod initialize_pool;
pub mod initialize_provider;
pub mod set_pool_status;
pub mod withdraw;
pub mod withdraw_receipt;

#[cfg(all(test, not(target_os = "solana")))]
pub(crate) mod fixtures;

pub use delegation::*;
pub use deposit::*;
pub use deposit_receipt::*;
pub use initialize_pool::*;
pub use initialize_provider::*;
pub use set_pool_status::*;
pub use withdraw::*;
pub use withdraw_receipt::*;

use pinocchio::{
    account_info::AccountInfo,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
    sysvars::{clock::Clock, Sysvar},
};
use pool_common::*;

use crate::state::{load, load_mut, PoolAccount, ZeroCopy};
use crate::venue::DELEGATION_PROGRAM_ID;

/// Instruction discriminator
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolInstruction {
    InitializePool = 0,
    InitializeProvider = 1,
    /// Single-venue deposit
    Deposit = 2,
    /// Single-venue withdrawal
    Withdraw = 3,
    InitiateDeposit = 4,
    CommitDeposit = 5,
    InitiateWithdraw = 6,
    CommitWithdraw = 7,
    SettleDeposit = 8,
    SettleWithdraw = 9,
    SetPoolStatus = 10,
    Delegate = 11,
    /// Runs on the venue
    Undelegate = 12,
    ReconcileDeposit = 13,
    ReconcileWithdraw = 14,
    /// Venue checkpoint
    Commit = 15,
}

impl PoolInstruction {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::InitializePool,
            1 => Self::InitializeProvider,
            2 => Self::Deposit,
            3 => Self::Withdraw,
            4 => Self::InitiateDeposit,
            5 => Self::CommitDeposit,
            6 => Self::InitiateWithdraw,
            7 => Self::CommitWithdraw,
            8 => Self::SettleDeposit,
            9 => Self::SettleWithdraw,
            10 => Self::SetPoolStatus,
            11 => Self::Delegate,
            12 => Self::Undelegate,
            13 => Self::ReconcileDeposit,
            14 => Self::ReconcileWithdraw,
            15 => Self::Commit,
            _ => return None,
        })
    }
}

#[inline]
pub(crate) fn now() -> Result<i64, ProgramError> {
    Ok(Clock::get()?.unix_timestamp)
}

/// Borrow an initialized program account as `&mut T`
///
/// # Safety
/// No other borrow of the account data may be alive while the reference is.
pub(crate) unsafe fn account_mut<'a, T: ZeroCopy>(
    account: &'a AccountInfo,
    program_id: &Pubkey,
) -> Result<&'a mut T, PoolError> {
    validate_owner(account, program_id)?;
    validate_writable(account)?;
    let acct = load_mut::<T>(account.borrow_mut_data_unchecked())?;
    if !acct.is_initialized() {
        msg!("Error: Account is not initialized");
        return Err(PoolError::InvalidAccount);
    }
    Ok(acct)
}

/// Writable pool on the ledger where it currently lives
///
/// A pool lent to the venue is reported as migrating rather than as a
/// foreign account.
///
/// # Safety
/// Same requirements as [`account_mut`].
pub(crate) unsafe fn pool_mut<'a>(
    account: &'a AccountInfo,
    program_id: &Pubkey,
) -> Result<&'a mut PoolAccount, PoolError> {
    if account.is_owned_by(&DELEGATION_PROGRAM_ID) {
        msg!("Error: Pool is delegated");
        return Err(PoolError::InvalidPoolState);
    }
    account_mut::<PoolAccount>(account, program_id)
}

/// Read-only view of a pool that may currently be lent to the venue
///
/// # Safety
/// Same requirements as [`account_mut`].
pub(crate) unsafe fn pool_view<'a>(
    account: &'a AccountInfo,
    program_id: &Pubkey,
) -> Result<&'a PoolAccount, PoolError> {
    if !account.is_owned_by(program_id) && !account.is_owned_by(&DELEGATION_PROGRAM_ID) {
        msg!("Error: Pool has wrong owner");
        return Err(PoolError::InvalidAccount);
    }
    let pool = load::<PoolAccount>(account.borrow_data_unchecked())?;
    if !pool.is_initialized() {
        msg!("Error: Pool is not initialized");
        return Err(PoolError::InvalidAccount);
    }
    Ok(pool)
}

/// Token account must belong to `owner` and hold `mint`
pub(crate) fn expect_token_account(
    account: &AccountInfo,
    owner: &[u8; 32],
    mint: &[u8; 32],
) -> Result<u64, PoolError> {
    let data = account.try_borrow_data().map_err(|_| PoolError::InvalidAccount)?;
    if &token_account_owner(&data)? != owner || &token_account_mint(&data)? != mint {
        msg!("Error: Token account owner or mint mismatch");
        return Err(PoolError::InvalidAccount);
    }
    token_account_amount(&data)
}
