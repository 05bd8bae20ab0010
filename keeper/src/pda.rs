//! Off-chain PDA derivation, mirroring the program's seeds

use pool_common::*;
use solana_sdk::pubkey::Pubkey;

pub const TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array(ephemeral_pool::cpi::TOKEN_PROGRAM_ID);
pub const DELEGATION_PROGRAM_ID: Pubkey = Pubkey::new_from_array(ephemeral_pool::venue::DELEGATION_PROGRAM_ID);
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

pub fn pool_address(name: &str, program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POOL_SEED, name.as_bytes()], program)
}

pub fn provider_address(provider: &Pubkey, program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[LIQUIDITY_PROVIDER_SEED, provider.as_ref()], program)
}

pub fn deposit_receipt_address(provider: &Pubkey, program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[DEPOSIT_RECEIPT_SEED, provider.as_ref()], program)
}

pub fn withdraw_receipt_address(provider: &Pubkey, program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[WITHDRAW_RECEIPT_SEED, provider.as_ref()], program)
}

pub fn lp_escrow_address(program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[LP_ESCROW_SEED], program)
}

pub fn transfer_authority_address(program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[TRANSFER_AUTHORITY_SEED], program)
}

pub fn delegation_record_address(entity: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[DELEGATION_SEED, entity.as_ref()], &DELEGATION_PROGRAM_ID)
}

/// Provider's associated token account for `mint`
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}
