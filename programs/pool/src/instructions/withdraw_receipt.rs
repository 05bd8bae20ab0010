//! Two-phase withdrawal: initiate, commit, settle, reconcile
//!
//! LP tokens are parked in the pool's escrow at initiate time and only burned
//! once the commit has reached the base ledger.

use pinocchio::{
    account_info::AccountInfo,
    instruction::{Seed, Signer},
    msg,
    pubkey::Pubkey,
    ProgramResult,
};
use pool_common::*;
use pool_model::{
    commit_withdraw, ensure_reconciler, initiate_withdraw, reconcile_withdraw, settle_withdraw,
    CommitOutcome, ReconcileMode, WithdrawResolution, RECONCILE_TIMEOUT_SECS,
};

use super::withdraw::WithdrawArgs;
use super::{account_mut, expect_token_account, now, pool_mut, pool_view};
use crate::cpi::{burn, create_pda_if_missing, transfer};
use crate::log::{log_pair, log_value};
use crate::pda::{derive_withdraw_receipt, expect_lp_escrow, expect_pda, expect_transfer_authority};
use crate::state::model_bridge::*;
use crate::state::{load_mut, LiquidityProviderAccount, PoolAccount, WithdrawReceiptAccount, ZeroCopy};

/// Returns the locked `(amount_a, amount_b)` payout
pub fn apply_initiate_withdraw(
    pool_acct: &PoolAccount,
    pool_key: &[u8; 32],
    receipt_acct: &mut WithdrawReceiptAccount,
    provider_key: &[u8; 32],
    args: &WithdrawArgs,
    now: i64,
) -> Result<(u64, u64), PoolError> {
    if &receipt_acct.provider != provider_key {
        msg!("Error: Receipt belongs to another provider");
        return Err(PoolError::InvalidAccount);
    }
    let pool = pool_to_model(pool_acct)?;
    let mut receipt = withdraw_receipt_to_model(receipt_acct)?;
    let payout = initiate_withdraw(
        &pool,
        pool_key,
        &mut receipt,
        provider_key,
        args.lp_tokens,
        args.min_amount_a,
        args.min_amount_b,
        now,
    )?;
    store_withdraw_receipt(receipt_acct, &receipt);
    Ok(payout)
}

pub fn apply_commit_withdraw(
    pool_acct: &mut PoolAccount,
    pool_key: &[u8; 32],
    ledger: &mut LiquidityProviderAccount,
    receipt_acct: &mut WithdrawReceiptAccount,
    now: i64,
) -> Result<CommitOutcome, PoolError> {
    let mut pool = pool_to_model(pool_acct)?;
    let mut provider = provider_to_model(ledger)?;
    let mut receipt = withdraw_receipt_to_model(receipt_acct)?;
    let outcome = commit_withdraw(&mut pool, pool_key, &mut provider, &mut receipt, now)?;
    if outcome == CommitOutcome::Applied {
        store_pool(pool_acct, &pool)?;
        store_provider(ledger, &provider);
        store_withdraw_receipt(receipt_acct, &receipt);
    }
    Ok(outcome)
}

/// Returns `(lp_to_burn, amount_a, amount_b)`
pub fn apply_settle_withdraw(
    pool_key: &[u8; 32],
    receipt_acct: &mut WithdrawReceiptAccount,
) -> Result<(u64, u64, u64), PoolError> {
    if &receipt_acct.pool != pool_key {
        return Err(PoolError::InvalidPoolState);
    }
    let mut receipt = withdraw_receipt_to_model(receipt_acct)?;
    let settled = settle_withdraw(&mut receipt)?;
    store_withdraw_receipt(receipt_acct, &receipt);
    Ok(settled)
}

#[allow(clippy::too_many_arguments)]
pub fn apply_reconcile_withdraw(
    pool_acct: &mut PoolAccount,
    pool_key: &[u8; 32],
    ledger: &mut LiquidityProviderAccount,
    receipt_acct: &mut WithdrawReceiptAccount,
    mode: ReconcileMode,
    signer: &[u8; 32],
    now: i64,
) -> Result<WithdrawResolution, PoolError> {
    let mut pool = pool_to_model(pool_acct)?;
    let mut provider = provider_to_model(ledger)?;
    let mut receipt = withdraw_receipt_to_model(receipt_acct)?;
    ensure_reconciler(&pool, &receipt.provider, signer)?;
    let resolution = reconcile_withdraw(
        &mut pool,
        pool_key,
        &mut provider,
        &mut receipt,
        mode,
        now,
        RECONCILE_TIMEOUT_SECS,
    )?;
    store_pool(pool_acct, &pool)?;
    store_provider(ledger, &provider);
    store_withdraw_receipt(receipt_acct, &receipt);
    Ok(resolution)
}

/// Process initiate withdraw instruction
///
/// Expected accounts:
/// 0. `[writable, signer]` Provider wallet (payer)
/// 1. `[]` Pool
/// 2. `[writable]` Withdraw receipt PDA `["withdraw_recept", provider]`
/// 3. `[writable]` Provider LP token account
/// 4. `[writable]` LP escrow
/// 5. `[]` Token program
/// 6. `[]` System program
///
/// Expected data layout (24 bytes):
/// - lp_tokens: u64, min_amount_a: u64, min_amount_b: u64
pub fn process_initiate_withdraw(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let [provider, pool_info, receipt_info, user_lp, lp_escrow, _token_program, _system_program, ..] = accounts else {
        msg!("Error: InitiateWithdraw requires 7 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(provider)?;
    let args = WithdrawArgs::parse(data)?;
    let pool = unsafe { pool_view(pool_info, program_id)? };

    let bump = expect_pda(receipt_info, derive_withdraw_receipt(provider.key(), program_id))?;
    let bump_seed = [bump];
    let seeds = [
        Seed::from(WITHDRAW_RECEIPT_SEED),
        Seed::from(&provider.key()[..]),
        Seed::from(&bump_seed[..]),
    ];
    create_pda_if_missing(
        provider,
        receipt_info,
        WithdrawReceiptAccount::LEN,
        program_id,
        &[Signer::from(&seeds)],
    )?;
    validate_owner(receipt_info, program_id)?;
    let receipt = unsafe { load_mut::<WithdrawReceiptAccount>(receipt_info.borrow_mut_data_unchecked())? };
    if !receipt.is_initialized() {
        receipt.init(*provider.key(), bump);
    }

    expect_lp_escrow(lp_escrow, pool.escrow_bump, program_id)?;
    if expect_token_account(user_lp, provider.key(), &pool.lp_mint)? < args.lp_tokens {
        msg!("Error: Insufficient LP token balance");
        return Err(PoolError::InsufficientTokenBalance.into());
    }

    let (amount_a, amount_b) =
        apply_initiate_withdraw(pool, pool_info.key(), receipt, provider.key(), &args, now()?)?;

    transfer(user_lp, lp_escrow, provider, args.lp_tokens, &[])?;

    log_value("LP escrowed", args.lp_tokens);
    log_pair("Withdraw initiated, payout quote", amount_a, amount_b);
    Ok(())
}

/// Process commit withdraw instruction (venue or base)
///
/// Expected accounts:
/// 0. `[signer]` Fee payer
/// 1. `[writable]` Pool
/// 2. `[writable]` Provider ledger
/// 3. `[writable]` Withdraw receipt
pub fn process_commit_withdraw(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    _data: &[u8],
) -> ProgramResult {
    let [payer, pool_info, ledger_info, receipt_info, ..] = accounts else {
        msg!("Error: CommitWithdraw requires 4 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(payer)?;
    let pool = unsafe { account_mut::<PoolAccount>(pool_info, program_id)? };
    let ledger = unsafe { account_mut::<LiquidityProviderAccount>(ledger_info, program_id)? };
    let receipt = unsafe { account_mut::<WithdrawReceiptAccount>(receipt_info, program_id)? };

    match apply_commit_withdraw(pool, pool_info.key(), ledger, receipt, now()?)? {
        CommitOutcome::Applied => log_pair(
            "Withdraw committed",
            receipt.amount_a_withdrawn,
            receipt.amount_b_withdrawn,
        ),
        CommitOutcome::AlreadyCommitted => msg!("Withdraw receipt already committed"),
    }
    Ok(())
}

/// Process settle withdraw instruction
///
/// Expected accounts:
/// 0. `[signer]` Fee payer (keeper or provider)
/// 1. `[]` Pool
/// 2. `[writable]` Withdraw receipt
/// 3. `[writable]` LP escrow
/// 4. `[writable]` LP mint
/// 5. `[writable]` Vault A
/// 6. `[writable]` Vault B
/// 7. `[writable]` Provider token A account
/// 8. `[writable]` Provider token B account
/// 9. `[]` Transfer authority PDA
/// 10. `[]` Token program
pub fn process_settle_withdraw(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    _data: &[u8],
) -> ProgramResult {
    let [payer, pool_info, receipt_info, lp_escrow, lp_mint, vault_a, vault_b, user_a, user_b, transfer_authority, _token_program, ..] =
        accounts
    else {
        msg!("Error: SettleWithdraw requires 11 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(payer)?;
    let pool = unsafe { pool_view(pool_info, program_id)? };
    let receipt = unsafe { account_mut::<WithdrawReceiptAccount>(receipt_info, program_id)? };

    expect_lp_escrow(lp_escrow, pool.escrow_bump, program_id)?;
    validate_key(lp_mint, &pool.lp_mint)?;
    validate_key(vault_a, &pool.token_a_vault)?;
    validate_key(vault_b, &pool.token_b_vault)?;
    expect_transfer_authority(transfer_authority, pool.authority_bump, program_id)?;
    expect_token_account(user_a, &receipt.provider, &pool.token_a_mint)?;
    expect_token_account(user_b, &receipt.provider, &pool.token_b_mint)?;

    let (lp_tokens, amount_a, amount_b) = apply_settle_withdraw(pool_info.key(), receipt)?;

    let bump = [pool.authority_bump];
    let seeds = [Seed::from(TRANSFER_AUTHORITY_SEED), Seed::from(&bump[..])];
    let signers = [Signer::from(&seeds)];
    burn(lp_escrow, lp_mint, transfer_authority, lp_tokens, &signers)?;
    if amount_a > 0 {
        transfer(vault_a, user_a, transfer_authority, amount_a, &signers)?;
    }
    if amount_b > 0 {
        transfer(vault_b, user_b, transfer_authority, amount_b, &signers)?;
    }

    log_pair("Withdraw settled", amount_a, amount_b);
    Ok(())
}

/// Process reconcile withdraw instruction
///
/// Expected accounts:
/// 0. `[signer]` Provider or pool authority
/// 1. `[writable]` Pool
/// 2. `[writable]` Provider ledger
/// 3. `[writable]` Withdraw receipt
/// 4. `[writable]` LP escrow
/// 5. `[writable]` LP mint
/// 6. `[writable]` Provider LP token account
/// 7. `[writable]` Vault A
/// 8. `[writable]` Vault B
/// 9. `[writable]` Provider token A account
/// 10. `[writable]` Provider token B account
/// 11. `[]` Transfer authority PDA
/// 12. `[]` Token program
///
/// Expected data layout (1 byte):
/// - mode: u8 (0 = complete, 1 = refund)
pub fn process_reconcile_withdraw(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let [signer, pool_info, ledger_info, receipt_info, lp_escrow, lp_mint, user_lp, vault_a, vault_b, user_a, user_b, transfer_authority, _token_program, ..] =
        accounts
    else {
        msg!("Error: ReconcileWithdraw requires 13 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(signer)?;
    let mode = ReconcileMode::from_u8(InstructionReader::new(data).read_u8()?)
        .ok_or(PoolError::InvalidInstruction)?;

    let pool = unsafe { pool_mut(pool_info, program_id)? };
    let ledger = unsafe { account_mut::<LiquidityProviderAccount>(ledger_info, program_id)? };
    let receipt = unsafe { account_mut::<WithdrawReceiptAccount>(receipt_info, program_id)? };

    expect_lp_escrow(lp_escrow, pool.escrow_bump, program_id)?;
    validate_key(lp_mint, &pool.lp_mint)?;
    validate_key(vault_a, &pool.token_a_vault)?;
    validate_key(vault_b, &pool.token_b_vault)?;
    expect_transfer_authority(transfer_authority, pool.authority_bump, program_id)?;
    expect_token_account(user_lp, &receipt.provider, &pool.lp_mint)?;
    expect_token_account(user_a, &receipt.provider, &pool.token_a_mint)?;
    expect_token_account(user_b, &receipt.provider, &pool.token_b_mint)?;

    let resolution = apply_reconcile_withdraw(pool, pool_info.key(), ledger, receipt, mode, signer.key(), now()?)?;

    let bump = [pool.authority_bump];
    let seeds = [Seed::from(TRANSFER_AUTHORITY_SEED), Seed::from(&bump[..])];
    let signers = [Signer::from(&seeds)];
    match resolution {
        WithdrawResolution::Paid { lp_tokens, amount_a, amount_b } => {
            burn(lp_escrow, lp_mint, transfer_authority, lp_tokens, &signers)?;
            if amount_a > 0 {
                transfer(vault_a, user_a, transfer_authority, amount_a, &signers)?;
            }
            if amount_b > 0 {
                transfer(vault_b, user_b, transfer_authority, amount_b, &signers)?;
            }
            log_pair("Orphaned withdraw completed", amount_a, amount_b);
        }
        WithdrawResolution::Refunded { lp_tokens } => {
            transfer(lp_escrow, user_lp, transfer_authority, lp_tokens, &signers)?;
            log_value("Orphaned withdraw refunded, LP returned", lp_tokens);
        }
    }
    Ok(())
}
