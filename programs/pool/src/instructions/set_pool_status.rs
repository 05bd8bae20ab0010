//! Pause, unpause, deactivate and reactivate a pool

use pinocchio::{account_info::AccountInfo, msg, pubkey::Pubkey, ProgramResult};
use pool_common::*;
use pool_model::{apply_status, StatusAction};

use super::{account_mut, now};
use crate::state::model_bridge::*;
use crate::state::PoolAccount;

pub fn apply_set_pool_status(
    pool_acct: &mut PoolAccount,
    signer: &[u8; 32],
    action: StatusAction,
    now: i64,
) -> Result<(), PoolError> {
    if &pool_acct.authority != signer {
        msg!("Error: Only the pool authority may change status");
        return Err(PoolError::Unauthorized);
    }
    let mut pool = pool_to_model(pool_acct)?;
    apply_status(&mut pool, action, now)?;
    store_pool(pool_acct, &pool)
}

/// Process set pool status instruction
///
/// Expected accounts:
/// 0. `[signer]` Pool authority
/// 1. `[writable]` Pool
///
/// Expected data layout (1 byte):
/// - action: u8 (0 = pause, 1 = unpause, 2 = deactivate, 3 = activate)
pub fn process_set_pool_status(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let [authority, pool_info, ..] = accounts else {
        msg!("Error: SetPoolStatus requires 2 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(authority)?;
    let action = StatusAction::from_u8(InstructionReader::new(data).read_u8()?)
        .ok_or(PoolError::InvalidInstruction)?;

    let pool = unsafe { account_mut::<PoolAccount>(pool_info, program_id)? };
    apply_set_pool_status(pool, authority.key(), action, now()?)?;

    match action {
        StatusAction::Pause => msg!("Pool paused"),
        StatusAction::Unpause => msg!("Pool unpaused"),
        StatusAction::Deactivate => msg!("Pool deactivated"),
        StatusAction::Activate => msg!("Pool activated"),
    }
    Ok(())
}
