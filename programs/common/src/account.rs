//! Account validation and zero-copy borrow helpers

use pinocchio::{account_info::AccountInfo, msg, pubkey::Pubkey};
use pool_model::PoolError;

#[inline]
pub fn validate_owner(account: &AccountInfo, owner: &Pubkey) -> Result<(), PoolError> {
    if !account.is_owned_by(owner) {
        msg!("Error: Account has wrong owner");
        return Err(PoolError::InvalidAccount);
    }
    Ok(())
}

#[inline]
pub fn validate_writable(account: &AccountInfo) -> Result<(), PoolError> {
    if !account.is_writable() {
        msg!("Error: Account must be writable");
        return Err(PoolError::InvalidAccount);
    }
    Ok(())
}

#[inline]
pub fn validate_signer(account: &AccountInfo) -> Result<(), PoolError> {
    if !account.is_signer() {
        msg!("Error: Missing required signature");
        return Err(PoolError::Unauthorized);
    }
    Ok(())
}

#[inline]
pub fn validate_key(account: &AccountInfo, expected: &Pubkey) -> Result<(), PoolError> {
    if account.key() != expected {
        msg!("Error: Unexpected account address");
        return Err(PoolError::InvalidAccount);
    }
    Ok(())
}

/// Borrow account data as `&mut T`
///
/// # Safety
/// `T` must be `repr(C)`, valid for any bit pattern, and no other borrow of
/// the account data may be alive for the returned lifetime.
#[inline]
pub unsafe fn borrow_account_data_mut<T>(account: &AccountInfo) -> Result<&mut T, PoolError> {
    let data = account.borrow_mut_data_unchecked();
    if data.len() < core::mem::size_of::<T>() {
        return Err(PoolError::InvalidAccount);
    }
    Ok(&mut *(data.as_mut_ptr() as *mut T))
}

/// Borrow account data as `&T`
///
/// # Safety
/// Same requirements as [`borrow_account_data_mut`].
#[inline]
pub unsafe fn borrow_account_data<T>(account: &AccountInfo) -> Result<&T, PoolError> {
    let data = account.borrow_data_unchecked();
    if data.len() < core::mem::size_of::<T>() {
        return Err(PoolError::InvalidAccount);
    }
    Ok(&*(data.as_ptr() as *const T))
}
