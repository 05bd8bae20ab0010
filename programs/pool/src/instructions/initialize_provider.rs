//! Initialize liquidity provider ledger

use pinocchio::{
    account_info::AccountInfo,
    instruction::{Seed, Signer},
    msg,
    pubkey::Pubkey,
    ProgramResult,
};
use pool_common::*;

use crate::cpi::create_pda_if_missing;
use crate::pda::{derive_provider, expect_pda};
use crate::state::{load_mut, LiquidityProviderAccount, ZeroCopy};

/// Open an empty ledger for `provider`
pub fn apply_initialize_provider(
    acct: &mut LiquidityProviderAccount,
    provider: &[u8; 32],
    bump: u8,
) -> Result<(), PoolError> {
    if acct.is_initialized() {
        msg!("Error: Liquidity provider already initialized");
        return Err(PoolError::InvalidAccount);
    }
    acct.init(*provider, bump);
    Ok(())
}

/// Process initialize provider instruction
///
/// Expected accounts:
/// 0. `[writable, signer]` Provider wallet (payer)
/// 1. `[writable]` Provider ledger PDA `["liquidity_provider_account_info", provider]`
/// 2. `[]` System program
pub fn process_initialize_provider(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    _data: &[u8],
) -> ProgramResult {
    let [provider, ledger, _system_program, ..] = accounts else {
        msg!("Error: InitializeProvider requires 3 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(provider)?;
    let bump = expect_pda(ledger, derive_provider(provider.key(), program_id))?;

    let bump_seed = [bump];
    let seeds = [
        Seed::from(LIQUIDITY_PROVIDER_SEED),
        Seed::from(&provider.key()[..]),
        Seed::from(&bump_seed[..]),
    ];
    create_pda_if_missing(
        provider,
        ledger,
        LiquidityProviderAccount::LEN,
        program_id,
        &[Signer::from(&seeds)],
    )?;
    validate_owner(ledger, program_id)?;

    let acct = unsafe { load_mut::<LiquidityProviderAccount>(ledger.borrow_mut_data_unchecked())? };
    apply_initialize_provider(acct, provider.key(), bump)?;

    msg!("Liquidity provider initialized");
    Ok(())
}
