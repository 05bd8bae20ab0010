//! Initialize pool instruction

use pinocchio::{
    account_info::AccountInfo,
    instruction::{Seed, Signer},
    msg,
    pubkey::Pubkey,
    ProgramResult,
};
use pool_common::*;
use pool_model::{initialize_pool, PoolParams};

use super::now;
use crate::cpi::{create_pda_if_missing, initialize_mint, initialize_token_account, LP_DECIMALS, TOKEN_PROGRAM_ID};
use crate::log::log_pair;
use crate::pda::*;
use crate::state::model_bridge::store_pool;
use crate::state::{load_mut, PoolAccount, PoolBumps, ZeroCopy};

/// Instruction data, after the discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializePoolArgs<'a> {
    pub name: &'a str,
    pub pool_id: u64,
    pub max_aum_usd: u64,
    pub trade_fee_bps: u16,
    pub protocol_fee_bps: u16,
    pub metadata_title: &'a str,
    pub metadata_symbol: &'a str,
    pub metadata_uri: &'a str,
}

impl<'a> InitializePoolArgs<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, PoolError> {
        let mut reader = InstructionReader::new(data);
        Ok(Self {
            name: reader.read_str()?,
            pool_id: reader.read_u64()?,
            max_aum_usd: reader.read_u64()?,
            trade_fee_bps: reader.read_u16()?,
            protocol_fee_bps: reader.read_u16()?,
            metadata_title: reader.read_str()?,
            metadata_symbol: reader.read_str()?,
            metadata_uri: reader.read_str()?,
        })
    }
}

/// Build the pool image: validates fees, name and metadata before anything
/// is written
pub fn apply_initialize_pool(
    acct: &mut PoolAccount,
    params: &PoolParams<'_>,
    bumps: PoolBumps,
    now: i64,
) -> Result<(), PoolError> {
    if acct.is_initialized() {
        msg!("Error: Pool already initialized");
        return Err(PoolError::InvalidAccount);
    }
    let pool = initialize_pool(params, now)?;

    let mut staged = PoolAccount::zeroed();
    staged.stamp(bumps);
    store_pool(&mut staged, &pool)?;
    staged.set_metadata(params.metadata_title, params.metadata_symbol, params.metadata_uri)?;
    *acct = staged;
    Ok(())
}

/// Process initialize pool instruction
///
/// Creates the pool PDA and, when missing, the shared LP mint, the per-mint
/// vaults and the LP escrow. All token accounts are owned by the
/// transfer authority PDA.
///
/// Expected accounts:
/// 0. `[writable, signer]` Pool authority (payer)
/// 1. `[writable]` Pool PDA `["pool", name]`
/// 2. `[]` Token A mint
/// 3. `[]` Token B mint
/// 4. `[writable]` LP mint PDA
/// 5. `[writable]` Vault A PDA
/// 6. `[writable]` Vault B PDA
/// 7. `[writable]` LP escrow PDA
/// 8. `[]` Transfer authority PDA
/// 9. `[]` Fee recipient wallet
/// 10. `[]` Token program
/// 11. `[]` System program
pub fn process_initialize_pool(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let [authority, pool_info, mint_a, mint_b, lp_mint, vault_a, vault_b, lp_escrow, transfer_authority, fee_recipient, _token_program, _system_program, ..] =
        accounts
    else {
        msg!("Error: InitializePool requires 12 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(authority)?;
    let args = InitializePoolArgs::parse(data)?;

    let bumps = PoolBumps {
        pool: expect_pda(pool_info, derive_pool(args.name.as_bytes(), program_id))?,
        lp_mint: expect_pda(lp_mint, derive_lp_mint(program_id))?,
        vault_a: expect_pda(vault_a, derive_vault_a(mint_a.key(), program_id))?,
        vault_b: expect_pda(vault_b, derive_vault_b(mint_b.key(), program_id))?,
        authority: expect_pda(transfer_authority, derive_transfer_authority(program_id))?,
        escrow: expect_pda(lp_escrow, derive_lp_escrow(program_id))?,
    };

    let params = PoolParams {
        authority: *authority.key(),
        pool_id: args.pool_id,
        name: args.name,
        max_aum_usd: args.max_aum_usd,
        metadata_title: args.metadata_title,
        metadata_symbol: args.metadata_symbol,
        metadata_uri: args.metadata_uri,
        trade_fee_bps: args.trade_fee_bps,
        protocol_fee_bps: args.protocol_fee_bps,
        fee_recipient: *fee_recipient.key(),
        lp_mint: *lp_mint.key(),
        token_a_mint: *mint_a.key(),
        token_b_mint: *mint_b.key(),
        token_a_vault: *vault_a.key(),
        token_b_vault: *vault_b.key(),
    };
    let mut staged = PoolAccount::zeroed();
    apply_initialize_pool(&mut staged, &params, bumps, now()?)?;

    let pool_bump = [bumps.pool];
    let pool_seeds = [
        Seed::from(POOL_SEED),
        Seed::from(args.name.as_bytes()),
        Seed::from(&pool_bump[..]),
    ];
    create_pda_if_missing(authority, pool_info, PoolAccount::LEN, program_id, &[Signer::from(&pool_seeds)])?;
    validate_owner(pool_info, program_id)?;

    let mint_bump = [bumps.lp_mint];
    let mint_seeds = [Seed::from(LP_MINT_SEED), Seed::from(&mint_bump[..])];
    if create_pda_if_missing(authority, lp_mint, MINT_LEN, &TOKEN_PROGRAM_ID, &[Signer::from(&mint_seeds)])? {
        initialize_mint(lp_mint, transfer_authority.key(), LP_DECIMALS)?;
    }

    let vault_a_bump = [bumps.vault_a];
    let vault_a_seeds = [
        Seed::from(VAULT_A_SEED),
        Seed::from(&mint_a.key()[..]),
        Seed::from(&vault_a_bump[..]),
    ];
    if create_pda_if_missing(authority, vault_a, TOKEN_ACCOUNT_LEN, &TOKEN_PROGRAM_ID, &[Signer::from(&vault_a_seeds)])? {
        initialize_token_account(vault_a, mint_a, transfer_authority.key())?;
    }

    let vault_b_bump = [bumps.vault_b];
    let vault_b_seeds = [
        Seed::from(VAULT_B_SEED),
        Seed::from(&mint_b.key()[..]),
        Seed::from(&vault_b_bump[..]),
    ];
    if create_pda_if_missing(authority, vault_b, TOKEN_ACCOUNT_LEN, &TOKEN_PROGRAM_ID, &[Signer::from(&vault_b_seeds)])? {
        initialize_token_account(vault_b, mint_b, transfer_authority.key())?;
    }

    let escrow_bump = [bumps.escrow];
    let escrow_seeds = [Seed::from(LP_ESCROW_SEED), Seed::from(&escrow_bump[..])];
    if create_pda_if_missing(authority, lp_escrow, TOKEN_ACCOUNT_LEN, &TOKEN_PROGRAM_ID, &[Signer::from(&escrow_seeds)])? {
        initialize_token_account(lp_escrow, lp_mint, transfer_authority.key())?;
    }

    let pool = unsafe { load_mut::<PoolAccount>(pool_info.borrow_mut_data_unchecked())? };
    if pool.is_initialized() {
        msg!("Error: Pool already initialized");
        return Err(PoolError::InvalidAccount.into());
    }
    *pool = staged;

    log_pair("Pool initialized, fee bps", args.trade_fee_bps as u64, args.protocol_fee_bps as u64);
    Ok(())
}
