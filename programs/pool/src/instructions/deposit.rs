//! Direct (single-venue) deposit

use pinocchio::{
    account_info::AccountInfo,
    instruction::{Seed, Signer},
    msg,
    pubkey::Pubkey,
    ProgramResult,
};
use pool_common::*;
use pool_model::{deposit, DepositOutcome};

use super::{account_mut, expect_token_account, now, pool_mut};
use crate::cpi::{mint_to, transfer};
use crate::log::{log_pair, log_value};
use crate::pda::expect_transfer_authority;
use crate::state::model_bridge::*;
use crate::state::{LiquidityProviderAccount, PoolAccount};

/// `amount_a`, `amount_b` (gross) and the LP floor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositArgs {
    pub amount_a: u64,
    pub amount_b: u64,
    pub min_lp_tokens: u64,
}

impl DepositArgs {
    pub fn parse(data: &[u8]) -> Result<Self, PoolError> {
        let mut reader = InstructionReader::new(data);
        Ok(Self {
            amount_a: reader.read_u64()?,
            amount_b: reader.read_u64()?,
            min_lp_tokens: reader.read_u64()?,
        })
    }
}

/// Price the deposit, credit the reserves and record the position
pub fn apply_deposit(
    pool_acct: &mut PoolAccount,
    pool_key: &[u8; 32],
    ledger: &mut LiquidityProviderAccount,
    args: &DepositArgs,
    now: i64,
) -> Result<DepositOutcome, PoolError> {
    let mut pool = pool_to_model(pool_acct)?;
    let mut provider = provider_to_model(ledger)?;
    let outcome = deposit(
        &mut pool,
        pool_key,
        &mut provider,
        args.amount_a,
        args.amount_b,
        args.min_lp_tokens,
        now,
    )?;
    store_pool(pool_acct, &pool)?;
    store_provider(ledger, &provider);
    Ok(outcome)
}

/// Process deposit instruction
///
/// Expected accounts:
/// 0. `[signer]` Provider wallet
/// 1. `[writable]` Pool
/// 2. `[writable]` Provider ledger
/// 3. `[writable]` Provider token A account
/// 4. `[writable]` Provider token B account
/// 5. `[writable]` Vault A
/// 6. `[writable]` Vault B
/// 7. `[writable]` Fee recipient token A account
/// 8. `[writable]` Fee recipient token B account
/// 9. `[writable]` LP mint
/// 10. `[writable]` Provider LP token account
/// 11. `[]` Transfer authority PDA
/// 12. `[]` Token program
///
/// Expected data layout (24 bytes):
/// - amount_a: u64, amount_b: u64, min_lp_tokens: u64
pub fn process_deposit(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    let [provider, pool_info, ledger_info, user_a, user_b, vault_a, vault_b, fee_a, fee_b, lp_mint, user_lp, transfer_authority, _token_program, ..] =
        accounts
    else {
        msg!("Error: Deposit requires 13 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(provider)?;
    let args = DepositArgs::parse(data)?;

    let pool = unsafe { pool_mut(pool_info, program_id)? };
    let ledger = unsafe { account_mut::<LiquidityProviderAccount>(ledger_info, program_id)? };
    if &ledger.provider != provider.key() {
        msg!("Error: Ledger does not belong to signer");
        return Err(PoolError::Unauthorized.into());
    }

    validate_key(vault_a, &pool.token_a_vault)?;
    validate_key(vault_b, &pool.token_b_vault)?;
    validate_key(lp_mint, &pool.lp_mint)?;
    expect_transfer_authority(transfer_authority, pool.authority_bump, program_id)?;

    if expect_token_account(user_a, provider.key(), &pool.token_a_mint)? < args.amount_a
        || expect_token_account(user_b, provider.key(), &pool.token_b_mint)? < args.amount_b
    {
        msg!("Error: Insufficient token balance for deposit");
        return Err(PoolError::InsufficientFunds.into());
    }
    expect_token_account(fee_a, &pool.fee_recipient, &pool.token_a_mint)?;
    expect_token_account(fee_b, &pool.fee_recipient, &pool.token_b_mint)?;
    expect_token_account(user_lp, provider.key(), &pool.lp_mint)?;

    let outcome = apply_deposit(pool, pool_info.key(), ledger, &args, now()?)?;

    transfer(user_a, vault_a, provider, outcome.fees_a.credited(), &[])?;
    transfer(user_b, vault_b, provider, outcome.fees_b.credited(), &[])?;
    if outcome.fees_a.protocol_fee > 0 {
        transfer(user_a, fee_a, provider, outcome.fees_a.protocol_fee, &[])?;
    }
    if outcome.fees_b.protocol_fee > 0 {
        transfer(user_b, fee_b, provider, outcome.fees_b.protocol_fee, &[])?;
    }

    let bump = [pool.authority_bump];
    let seeds = [Seed::from(TRANSFER_AUTHORITY_SEED), Seed::from(&bump[..])];
    mint_to(lp_mint, user_lp, transfer_authority, outcome.lp_tokens, &[Signer::from(&seeds)])?;

    log_pair("Deposit credited", outcome.fees_a.credited(), outcome.fees_b.credited());
    log_value("LP minted", outcome.lp_tokens);
    Ok(())
}
