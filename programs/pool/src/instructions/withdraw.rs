//! Direct (single-venue) withdrawal

use pinocchio::{
    account_info::AccountInfo,
    instruction::{Seed, Signer},
    msg,
    pubkey::Pubkey,
    ProgramResult,
};
use pool_common::*;
use pool_model::withdraw;

use super::{account_mut, expect_token_account, now, pool_mut};
use crate::cpi::{burn, transfer};
use crate::log::log_pair;
use crate::pda::expect_transfer_authority;
use crate::state::model_bridge::*;
use crate::state::{LiquidityProviderAccount, PoolAccount};

/// LP tokens to burn and the per-side payout floors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawArgs {
    pub lp_tokens: u64,
    pub min_amount_a: u64,
    pub min_amount_b: u64,
}

impl WithdrawArgs {
    pub fn parse(data: &[u8]) -> Result<Self, PoolError> {
        let mut reader = InstructionReader::new(data);
        Ok(Self {
            lp_tokens: reader.read_u64()?,
            min_amount_a: reader.read_u64()?,
            min_amount_b: reader.read_u64()?,
        })
    }
}

/// Returns the `(amount_a, amount_b)` payout
pub fn apply_withdraw(
    pool_acct: &mut PoolAccount,
    pool_key: &[u8; 32],
    ledger: &mut LiquidityProviderAccount,
    args: &WithdrawArgs,
    now: i64,
) -> Result<(u64, u64), PoolError> {
    let mut pool = pool_to_model(pool_acct)?;
    let mut provider = provider_to_model(ledger)?;
    let payout = withdraw(
        &mut pool,
        pool_key,
        &mut provider,
        args.lp_tokens,
        args.min_amount_a,
        args.min_amount_b,
        now,
    )?;
    store_pool(pool_acct, &pool)?;
    store_provider(ledger, &provider);
    Ok(payout)
}

/// Process withdraw instruction
///
/// Expected accounts:
/// 0. `[signer]` Provider wallet
/// 1. `[writable]` Pool
/// 2. `[writable]` Provider ledger
/// 3. `[writable]` Provider LP token account
/// 4. `[writable]` LP mint
/// 5. `[writable]` Vault A
/// 6. `[writable]` Vault B
/// 7. `[writable]` Provider token A account
/// 8. `[writable]` Provider token B account
/// 9. `[]` Transfer authority PDA
/// 10. `[]` Token program
///
/// Expected data layout (24 bytes):
/// - lp_tokens: u64, min_amount_a: u64, min_amount_b: u64
pub fn process_withdraw(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    let [provider, pool_info, ledger_info, user_lp, lp_mint, vault_a, vault_b, user_a, user_b, transfer_authority, _token_program, ..] =
        accounts
    else {
        msg!("Error: Withdraw requires 11 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(provider)?;
    let args = WithdrawArgs::parse(data)?;

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
    if expect_token_account(user_lp, provider.key(), &pool.lp_mint)? < args.lp_tokens {
        msg!("Error: Insufficient LP token balance");
        return Err(PoolError::InsufficientTokenBalance.into());
    }
    expect_token_account(user_a, provider.key(), &pool.token_a_mint)?;
    expect_token_account(user_b, provider.key(), &pool.token_b_mint)?;

    let (amount_a, amount_b) = apply_withdraw(pool, pool_info.key(), ledger, &args, now()?)?;

    burn(user_lp, lp_mint, provider, args.lp_tokens, &[])?;
    let bump = [pool.authority_bump];
    let seeds = [Seed::from(TRANSFER_AUTHORITY_SEED), Seed::from(&bump[..])];
    let signers = [Signer::from(&seeds)];
    if amount_a > 0 {
        transfer(vault_a, user_a, transfer_authority, amount_a, &signers)?;
    }
    if amount_b > 0 {
        transfer(vault_b, user_b, transfer_authority, amount_b, &signers)?;
    }

    log_pair("Withdrawn", amount_a, amount_b);
    Ok(())
}
