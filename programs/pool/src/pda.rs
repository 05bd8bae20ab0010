//! Program-derived addresses
//!
//! Derivation only resolves on-chain; host tests exercise the handlers with
//! keys supplied directly.

use pinocchio::{
    account_info::AccountInfo,
    msg,
    pubkey::{create_program_address, find_program_address, Pubkey},
};
use pool_common::*;

use crate::venue::DELEGATION_PROGRAM_ID;

pub fn derive_pool(name: &[u8], program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[POOL_SEED, name], program_id)
}

pub fn derive_provider(provider: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[LIQUIDITY_PROVIDER_SEED, provider], program_id)
}

pub fn derive_lp_mint(program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[LP_MINT_SEED], program_id)
}

pub fn derive_lp_escrow(program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[LP_ESCROW_SEED], program_id)
}

pub fn derive_vault_a(mint_a: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[VAULT_A_SEED, mint_a], program_id)
}

pub fn derive_vault_b(mint_b: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[VAULT_B_SEED, mint_b], program_id)
}

pub fn derive_transfer_authority(program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[TRANSFER_AUTHORITY_SEED], program_id)
}

pub fn derive_deposit_receipt(provider: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[DEPOSIT_RECEIPT_SEED, provider], program_id)
}

pub fn derive_withdraw_receipt(provider: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[WITHDRAW_RECEIPT_SEED, provider], program_id)
}

/// Snapshot buffer, owned by this program until the venue takes it
pub fn derive_buffer(entity: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[BUFFER_SEED, entity], program_id)
}

pub fn derive_delegation_record(entity: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[DELEGATION_SEED, entity], &DELEGATION_PROGRAM_ID)
}

pub fn derive_delegation_metadata(entity: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[DELEGATION_METADATA_SEED, entity], &DELEGATION_PROGRAM_ID)
}

/// Require `account` to sit at `expected`, returning the bump
#[inline]
pub fn expect_pda(account: &AccountInfo, expected: (Pubkey, u8)) -> Result<u8, PoolError> {
    if account.key() != &expected.0 {
        msg!("Error: Account is not the expected PDA");
        return Err(PoolError::InvalidAccount);
    }
    Ok(expected.1)
}

/// Check the `["transfer_authority"]` PDA against the bump stored on the pool
pub fn expect_transfer_authority(
    account: &AccountInfo,
    bump: u8,
    program_id: &Pubkey,
) -> Result<(), PoolError> {
    let expected = create_program_address(&[TRANSFER_AUTHORITY_SEED, &[bump]], program_id)
        .map_err(|_| PoolError::InvalidAccount)?;
    if account.key() != &expected {
        msg!("Error: Transfer authority mismatch");
        return Err(PoolError::InvalidAccount);
    }
    Ok(())
}

/// Check the `["lp_token_account"]` escrow against the pool's stored bump
pub fn expect_lp_escrow(account: &AccountInfo, bump: u8, program_id: &Pubkey) -> Result<(), PoolError> {
    let expected = create_program_address(&[LP_ESCROW_SEED, &[bump]], program_id)
        .map_err(|_| PoolError::InvalidAccount)?;
    if account.key() != &expected {
        msg!("Error: LP escrow mismatch");
        return Err(PoolError::InvalidAccount);
    }
    Ok(())
}

/// `[salt, identity]` seeds of a delegatable entity, copied out of the
/// account so they survive the account being handed over
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySeeds {
    pub salt: &'static [u8],
    ident: [u8; 32],
    ident_len: usize,
}

impl EntitySeeds {
    pub fn new(salt: &'static [u8], ident: &[u8]) -> Result<Self, PoolError> {
        if ident.len() > 32 {
            return Err(PoolError::InvalidAccount);
        }
        let mut buf = [0u8; 32];
        buf[..ident.len()].copy_from_slice(ident);
        Ok(Self {
            salt,
            ident: buf,
            ident_len: ident.len(),
        })
    }

    pub fn ident(&self) -> &[u8] {
        &self.ident[..self.ident_len]
    }

    pub fn as_slices(&self) -> [&[u8]; 2] {
        [self.salt, self.ident()]
    }

    pub fn derive(&self, program_id: &Pubkey) -> (Pubkey, u8) {
        find_program_address(&self.as_slices(), program_id)
    }
}
