//! Transaction builders for settlement and reconciliation

use anyhow::Result;
use ephemeral_pool::instructions::PoolInstruction;
use pool_model::ReconcileMode;
use solana_sdk::{
    hash::Hash,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::Transaction,
};

use crate::pda::{
    associated_token_address, lp_escrow_address, provider_address, transfer_authority_address, TOKEN_PROGRAM_ID,
};
use crate::receipt_queue::{ReceiptKind, TrackedReceipt};
use crate::scanner::PoolAddresses;

/// Mint the locked LP quote of a committed deposit receipt and pay out its protocol fee
pub fn build_settle_deposit_instruction(
    program: &Pubkey,
    payer: &Pubkey,
    pool: &PoolAddresses,
    receipt: &TrackedReceipt,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(*payer, true),
        AccountMeta::new_readonly(pool.pool, false),
        AccountMeta::new(receipt.address, false),
        AccountMeta::new(pool.lp_mint, false),
        AccountMeta::new(associated_token_address(&receipt.provider, &pool.lp_mint), false),
        AccountMeta::new(pool.vault_a, false),
        AccountMeta::new(pool.vault_b, false),
        AccountMeta::new(associated_token_address(&pool.fee_recipient, &pool.token_a_mint), false),
        AccountMeta::new(associated_token_address(&pool.fee_recipient, &pool.token_b_mint), false),
        AccountMeta::new_readonly(transfer_authority_address(program).0, false),
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
    ];
    Instruction {
        program_id: *program,
        accounts,
        data: vec![PoolInstruction::SettleDeposit as u8],
    }
}

/// Burn the escrowed LP and pay out a committed withdraw receipt
pub fn build_settle_withdraw_instruction(
    program: &Pubkey,
    payer: &Pubkey,
    pool: &PoolAddresses,
    receipt: &TrackedReceipt,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(*payer, true),
        AccountMeta::new_readonly(pool.pool, false),
        AccountMeta::new(receipt.address, false),
        AccountMeta::new(lp_escrow_address(program).0, false),
        AccountMeta::new(pool.lp_mint, false),
        AccountMeta::new(pool.vault_a, false),
        AccountMeta::new(pool.vault_b, false),
        AccountMeta::new(associated_token_address(&receipt.provider, &pool.token_a_mint), false),
        AccountMeta::new(associated_token_address(&receipt.provider, &pool.token_b_mint), false),
        AccountMeta::new_readonly(transfer_authority_address(program).0, false),
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
    ];
    Instruction {
        program_id: *program,
        accounts,
        data: vec![PoolInstruction::SettleWithdraw as u8],
    }
}

pub fn build_settle_instruction(
    program: &Pubkey,
    payer: &Pubkey,
    pool: &PoolAddresses,
    receipt: &TrackedReceipt,
) -> Instruction {
    match receipt.kind {
        ReceiptKind::Deposit => build_settle_deposit_instruction(program, payer, pool, receipt),
        ReceiptKind::Withdraw => build_settle_withdraw_instruction(program, payer, pool, receipt),
    }
}

/// Resolve an orphaned receipt; `signer` must be the provider or the pool authority
pub fn build_reconcile_instruction(
    program: &Pubkey,
    signer: &Pubkey,
    pool: &PoolAddresses,
    receipt: &TrackedReceipt,
    mode: ReconcileMode,
) -> Instruction {
    let provider = &receipt.provider;
    let mut accounts = vec![
        AccountMeta::new_readonly(*signer, true),
        AccountMeta::new(pool.pool, false),
        AccountMeta::new(provider_address(provider, program).0, false),
        AccountMeta::new(receipt.address, false),
    ];
    let tag = match receipt.kind {
        ReceiptKind::Deposit => PoolInstruction::ReconcileDeposit,
        ReceiptKind::Withdraw => {
            accounts.push(AccountMeta::new(lp_escrow_address(program).0, false));
            PoolInstruction::ReconcileWithdraw
        }
    };
    accounts.extend([
        AccountMeta::new(pool.lp_mint, false),
        AccountMeta::new(associated_token_address(provider, &pool.lp_mint), false),
        AccountMeta::new(pool.vault_a, false),
        AccountMeta::new(pool.vault_b, false),
        AccountMeta::new(associated_token_address(provider, &pool.token_a_mint), false),
        AccountMeta::new(associated_token_address(provider, &pool.token_b_mint), false),
    ]);
    if receipt.kind == ReceiptKind::Deposit {
        accounts.extend([
            AccountMeta::new(associated_token_address(&pool.fee_recipient, &pool.token_a_mint), false),
            AccountMeta::new(associated_token_address(&pool.fee_recipient, &pool.token_b_mint), false),
        ]);
    }
    accounts.extend([
        AccountMeta::new_readonly(transfer_authority_address(program).0, false),
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
    ]);
    Instruction {
        program_id: *program,
        accounts,
        data: vec![tag as u8, mode as u8],
    }
}

pub fn build_transaction(instruction: Instruction, keeper: &Keypair, recent_blockhash: Hash) -> Result<Transaction> {
    Ok(Transaction::new_signed_with_payer(
        &[instruction],
        Some(&keeper.pubkey()),
        &[keeper],
        recent_blockhash,
    ))
}
