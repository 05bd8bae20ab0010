//! Field readers for SPL token accounts and mints
//!
//! Token account layout: mint (0..32), owner (32..64), amount (64..72).
//! Mint layout: supply at 36..44.

use pool_model::PoolError;

pub const TOKEN_ACCOUNT_LEN: usize = 165;
pub const MINT_LEN: usize = 82;

#[inline]
pub fn token_account_mint(data: &[u8]) -> Result<[u8; 32], PoolError> {
    field::<32>(data, 0)
}

#[inline]
pub fn token_account_owner(data: &[u8]) -> Result<[u8; 32], PoolError> {
    field::<32>(data, 32)
}

#[inline]
pub fn token_account_amount(data: &[u8]) -> Result<u64, PoolError> {
    Ok(u64::from_le_bytes(field::<8>(data, 64)?))
}

#[inline]
pub fn mint_supply(data: &[u8]) -> Result<u64, PoolError> {
    if data.len() < MINT_LEN {
        return Err(PoolError::InvalidAccount);
    }
    Ok(u64::from_le_bytes(field::<8>(data, 36)?))
}

fn field<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], PoolError> {
    if data.len() < TOKEN_ACCOUNT_LEN && data.len() != MINT_LEN {
        return Err(PoolError::InvalidAccount);
    }
    let mut out = [0u8; N];
    out.copy_from_slice(
        data.get(offset..offset + N)
            .ok_or(PoolError::InvalidAccount)?,
    );
    Ok(out)
}
