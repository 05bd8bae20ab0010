//! Two-phase deposit: initiate, commit, settle, reconcile
//!
//! Initiate moves the tokens and locks the LP quote into the receipt while
//! only reading the pool. Commit runs wherever the pool currently lives (on
//! the venue while delegated) and applies the locked quote. Settle mints on
//! the base ledger once the commit has landed there. The protocol fee waits
//! in the vaults until settlement, so a refund returns the gross amounts.

use pinocchio::{
    account_info::AccountInfo,
    instruction::{Seed, Signer},
    msg,
    pubkey::Pubkey,
    ProgramResult,
};
use pool_common::*;
use pool_model::{
    commit_deposit, ensure_reconciler, initiate_deposit, reconcile_deposit, settle_deposit,
    CommitOutcome, DepositOutcome, DepositResolution, DepositSettlement, ReconcileMode, RECONCILE_TIMEOUT_SECS,
};

use super::deposit::DepositArgs;
use super::{account_mut, expect_token_account, now, pool_mut, pool_view};
use crate::cpi::{create_pda_if_missing, mint_to, transfer};
use crate::log::{log_pair, log_value};
use crate::pda::{derive_deposit_receipt, expect_pda, expect_transfer_authority};
use crate::state::model_bridge::*;
use crate::state::{load_mut, DepositReceiptAccount, LiquidityProviderAccount, PoolAccount, ZeroCopy};

pub fn apply_initiate_deposit(
    pool_acct: &PoolAccount,
    pool_key: &[u8; 32],
    receipt_acct: &mut DepositReceiptAccount,
    provider_key: &[u8; 32],
    args: &DepositArgs,
    now: i64,
) -> Result<DepositOutcome, PoolError> {
    if &receipt_acct.provider != provider_key {
        msg!("Error: Receipt belongs to another provider");
        return Err(PoolError::InvalidAccount);
    }
    let pool = pool_to_model(pool_acct)?;
    let mut receipt = deposit_receipt_to_model(receipt_acct)?;
    let outcome = initiate_deposit(
        &pool,
        pool_key,
        &mut receipt,
        provider_key,
        args.amount_a,
        args.amount_b,
        args.min_lp_tokens,
        now,
    )?;
    store_deposit_receipt(receipt_acct, &receipt);
    Ok(outcome)
}

pub fn apply_commit_deposit(
    pool_acct: &mut PoolAccount,
    pool_key: &[u8; 32],
    ledger: &mut LiquidityProviderAccount,
    receipt_acct: &mut DepositReceiptAccount,
    now: i64,
) -> Result<CommitOutcome, PoolError> {
    let mut pool = pool_to_model(pool_acct)?;
    let mut provider = provider_to_model(ledger)?;
    let mut receipt = deposit_receipt_to_model(receipt_acct)?;
    let outcome = commit_deposit(&mut pool, pool_key, &mut provider, &mut receipt, now)?;
    if outcome == CommitOutcome::Applied {
        store_pool(pool_acct, &pool)?;
        store_provider(ledger, &provider);
        store_deposit_receipt(receipt_acct, &receipt);
    }
    Ok(outcome)
}

pub fn apply_settle_deposit(
    pool_key: &[u8; 32],
    receipt_acct: &mut DepositReceiptAccount,
) -> Result<DepositSettlement, PoolError> {
    if &receipt_acct.pool != pool_key {
        return Err(PoolError::InvalidPoolState);
    }
    let mut receipt = deposit_receipt_to_model(receipt_acct)?;
    let settlement = settle_deposit(&mut receipt)?;
    store_deposit_receipt(receipt_acct, &receipt);
    Ok(settlement)
}

#[allow(clippy::too_many_arguments)]
pub fn apply_reconcile_deposit(
    pool_acct: &mut PoolAccount,
    pool_key: &[u8; 32],
    ledger: &mut LiquidityProviderAccount,
    receipt_acct: &mut DepositReceiptAccount,
    mode: ReconcileMode,
    signer: &[u8; 32],
    now: i64,
) -> Result<DepositResolution, PoolError> {
    let mut pool = pool_to_model(pool_acct)?;
    let mut provider = provider_to_model(ledger)?;
    let mut receipt = deposit_receipt_to_model(receipt_acct)?;
    ensure_reconciler(&pool, &receipt.provider, signer)?;
    let resolution = reconcile_deposit(
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
    store_deposit_receipt(receipt_acct, &receipt);
    Ok(resolution)
}

/// Process initiate deposit instruction
///
/// The pool may be owned by the delegation program; it is only read.
///
/// Expected accounts:
/// 0. `[writable, signer]` Provider wallet (payer)
/// 1. `[]` Pool
/// 2. `[writable]` Deposit receipt PDA `["deposit_recept", provider]`
/// 3. `[writable]` Provider token A account
/// 4. `[writable]` Provider token B account
/// 5. `[writable]` Vault A
/// 6. `[writable]` Vault B
/// 7. `[]` Token program
/// 8. `[]` System program
///
/// Expected data layout (24 bytes):
/// - amount_a: u64, amount_b: u64, min_lp_tokens: u64
pub fn process_initiate_deposit(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let [provider, pool_info, receipt_info, user_a, user_b, vault_a, vault_b, _token_program, _system_program, ..] = accounts
    else {
        msg!("Error: InitiateDeposit requires 9 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(provider)?;
    let args = DepositArgs::parse(data)?;
    let pool = unsafe { pool_view(pool_info, program_id)? };

    let bump = expect_pda(receipt_info, derive_deposit_receipt(provider.key(), program_id))?;
    let bump_seed = [bump];
    let seeds = [
        Seed::from(DEPOSIT_RECEIPT_SEED),
        Seed::from(&provider.key()[..]),
        Seed::from(&bump_seed[..]),
    ];
    create_pda_if_missing(
        provider,
        receipt_info,
        DepositReceiptAccount::LEN,
        program_id,
        &[Signer::from(&seeds)],
    )?;
    validate_owner(receipt_info, program_id)?;
    let receipt = unsafe { load_mut::<DepositReceiptAccount>(receipt_info.borrow_mut_data_unchecked())? };
    if !receipt.is_initialized() {
        receipt.init(*provider.key(), bump);
    }

    validate_key(vault_a, &pool.token_a_vault)?;
    validate_key(vault_b, &pool.token_b_vault)?;
    if expect_token_account(user_a, provider.key(), &pool.token_a_mint)? < args.amount_a
        || expect_token_account(user_b, provider.key(), &pool.token_b_mint)? < args.amount_b
    {
        msg!("Error: Insufficient token balance for deposit");
        return Err(PoolError::InsufficientFunds.into());
    }

    let outcome = apply_initiate_deposit(pool, pool_info.key(), receipt, provider.key(), &args, now()?)?;

    transfer(user_a, vault_a, provider, args.amount_a, &[])?;
    transfer(user_b, vault_b, provider, args.amount_b, &[])?;

    log_value("Deposit initiated, LP quote", outcome.lp_tokens);
    Ok(())
}

/// Process commit deposit instruction (venue or base)
///
/// Expected accounts:
/// 0. `[signer]` Fee payer
/// 1. `[writable]` Pool
/// 2. `[writable]` Provider ledger
/// 3. `[writable]` Deposit receipt
pub fn process_commit_deposit(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    _data: &[u8],
) -> ProgramResult {
    let [payer, pool_info, ledger_info, receipt_info, ..] = accounts else {
        msg!("Error: CommitDeposit requires 4 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(payer)?;
    let pool = unsafe { account_mut::<PoolAccount>(pool_info, program_id)? };
    let ledger = unsafe { account_mut::<LiquidityProviderAccount>(ledger_info, program_id)? };
    let receipt = unsafe { account_mut::<DepositReceiptAccount>(receipt_info, program_id)? };

    match apply_commit_deposit(pool, pool_info.key(), ledger, receipt, now()?)? {
        CommitOutcome::Applied => log_value("Deposit committed, LP", receipt.lp_tokens_minted),
        CommitOutcome::AlreadyCommitted => msg!("Deposit receipt already committed"),
    }
    Ok(())
}

/// Process settle deposit instruction
///
/// Expected accounts:
/// 0. `[signer]` Fee payer (keeper or provider)
/// 1. `[]` Pool
/// 2. `[writable]` Deposit receipt
/// 3. `[writable]` LP mint
/// 4. `[writable]` Provider LP token account
/// 5. `[writable]` Vault A
/// 6. `[writable]` Vault B
/// 7. `[writable]` Fee recipient token A account
/// 8. `[writable]` Fee recipient token B account
/// 9. `[]` Transfer authority PDA
/// 10. `[]` Token program
pub fn process_settle_deposit(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    _data: &[u8],
) -> ProgramResult {
    let [payer, pool_info, receipt_info, lp_mint, user_lp, vault_a, vault_b, fee_a, fee_b, transfer_authority, _token_program, ..] =
        accounts
    else {
        msg!("Error: SettleDeposit requires 11 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(payer)?;
    let pool = unsafe { pool_view(pool_info, program_id)? };
    let receipt = unsafe { account_mut::<DepositReceiptAccount>(receipt_info, program_id)? };

    validate_key(lp_mint, &pool.lp_mint)?;
    validate_key(vault_a, &pool.token_a_vault)?;
    validate_key(vault_b, &pool.token_b_vault)?;
    expect_transfer_authority(transfer_authority, pool.authority_bump, program_id)?;
    expect_token_account(user_lp, &receipt.provider, &pool.lp_mint)?;
    expect_token_account(fee_a, &pool.fee_recipient, &pool.token_a_mint)?;
    expect_token_account(fee_b, &pool.fee_recipient, &pool.token_b_mint)?;

    let settlement = apply_settle_deposit(pool_info.key(), receipt)?;

    let bump = [pool.authority_bump];
    let seeds = [Seed::from(TRANSFER_AUTHORITY_SEED), Seed::from(&bump[..])];
    let signers = [Signer::from(&seeds)];
    mint_to(lp_mint, user_lp, transfer_authority, settlement.lp_tokens, &signers)?;
    pay_protocol_fees([vault_a, vault_b], [fee_a, fee_b], transfer_authority, &settlement, &signers)?;

    log_value("Deposit settled, LP minted", settlement.lp_tokens);
    Ok(())
}

fn pay_protocol_fees(
    vaults: [&AccountInfo; 2],
    recipients: [&AccountInfo; 2],
    transfer_authority: &AccountInfo,
    settlement: &DepositSettlement,
    signers: &[Signer],
) -> ProgramResult {
    if settlement.protocol_fee_a > 0 {
        transfer(vaults[0], recipients[0], transfer_authority, settlement.protocol_fee_a, signers)?;
    }
    if settlement.protocol_fee_b > 0 {
        transfer(vaults[1], recipients[1], transfer_authority, settlement.protocol_fee_b, signers)?;
    }
    Ok(())
}

/// Process reconcile deposit instruction
///
/// Expected accounts:
/// 0. `[signer]` Provider or pool authority
/// 1. `[writable]` Pool
/// 2. `[writable]` Provider ledger
/// 3. `[writable]` Deposit receipt
/// 4. `[writable]` LP mint
/// 5. `[writable]` Provider LP token account
/// 6. `[writable]` Vault A
/// 7. `[writable]` Vault B
/// 8. `[writable]` Provider token A account
/// 9. `[writable]` Provider token B account
/// 10. `[writable]` Fee recipient token A account
/// 11. `[writable]` Fee recipient token B account
/// 12. `[]` Transfer authority PDA
/// 13. `[]` Token program
///
/// Expected data layout (1 byte):
/// - mode: u8 (0 = complete, 1 = refund)
pub fn process_reconcile_deposit(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let [signer, pool_info, ledger_info, receipt_info, lp_mint, user_lp, vault_a, vault_b, user_a, user_b, fee_a, fee_b, transfer_authority, _token_program, ..] =
        accounts
    else {
        msg!("Error: ReconcileDeposit requires 14 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(signer)?;
    let mode = ReconcileMode::from_u8(InstructionReader::new(data).read_u8()?)
        .ok_or(PoolError::InvalidInstruction)?;

    let pool = unsafe { pool_mut(pool_info, program_id)? };
    let ledger = unsafe { account_mut::<LiquidityProviderAccount>(ledger_info, program_id)? };
    let receipt = unsafe { account_mut::<DepositReceiptAccount>(receipt_info, program_id)? };

    validate_key(lp_mint, &pool.lp_mint)?;
    validate_key(vault_a, &pool.token_a_vault)?;
    validate_key(vault_b, &pool.token_b_vault)?;
    expect_transfer_authority(transfer_authority, pool.authority_bump, program_id)?;
    expect_token_account(user_lp, &receipt.provider, &pool.lp_mint)?;
    expect_token_account(user_a, &receipt.provider, &pool.token_a_mint)?;
    expect_token_account(user_b, &receipt.provider, &pool.token_b_mint)?;
    expect_token_account(fee_a, &pool.fee_recipient, &pool.token_a_mint)?;
    expect_token_account(fee_b, &pool.fee_recipient, &pool.token_b_mint)?;

    let resolution = apply_reconcile_deposit(pool, pool_info.key(), ledger, receipt, mode, signer.key(), now()?)?;

    let bump = [pool.authority_bump];
    let seeds = [Seed::from(TRANSFER_AUTHORITY_SEED), Seed::from(&bump[..])];
    let signers = [Signer::from(&seeds)];
    match resolution {
        DepositResolution::Minted(settlement) => {
            mint_to(lp_mint, user_lp, transfer_authority, settlement.lp_tokens, &signers)?;
            pay_protocol_fees([vault_a, vault_b], [fee_a, fee_b], transfer_authority, &settlement, &signers)?;
            log_value("Orphaned deposit completed, LP minted", settlement.lp_tokens);
        }
        DepositResolution::Refunded { amount_a, amount_b } => {
            transfer(vault_a, user_a, transfer_authority, amount_a, &signers)?;
            transfer(vault_b, user_b, transfer_authority, amount_b, &signers)?;
            log_pair("Orphaned deposit refunded", amount_a, amount_b);
        }
    }
    Ok(())
}
