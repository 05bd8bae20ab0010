//! SPL token and system program CPIs

use pinocchio::{
    account_info::AccountInfo,
    cpi::invoke_signed,
    instruction::{AccountMeta, Instruction, Signer},
    program_error::ProgramError,
    pubkey::Pubkey,
    sysvars::{rent::Rent, Sysvar},
    ProgramResult,
};

pub const TOKEN_PROGRAM_ID: Pubkey = pinocchio_pubkey::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const SYSTEM_PROGRAM_ID: Pubkey = pinocchio_pubkey::pubkey!("11111111111111111111111111111111");

pub const LP_DECIMALS: u8 = 6;

const IX_INITIALIZE_ACCOUNT_3: u8 = 18;
const IX_TRANSFER: u8 = 3;
const IX_MINT_TO: u8 = 7;
const IX_BURN: u8 = 8;
const IX_INITIALIZE_MINT_2: u8 = 20;

fn amount_data(tag: u8, amount: u64) -> [u8; 9] {
    let mut data = [0u8; 9];
    data[0] = tag;
    data[1..9].copy_from_slice(&amount.to_le_bytes());
    data
}

/// Move `amount` from `from` to `to`; pass `signers` when `authority` is a PDA
pub fn transfer(
    from: &AccountInfo,
    to: &AccountInfo,
    authority: &AccountInfo,
    amount: u64,
    signers: &[Signer],
) -> ProgramResult {
    let metas = [
        AccountMeta::writable(from.key()),
        AccountMeta::writable(to.key()),
        AccountMeta::readonly_signer(authority.key()),
    ];
    let data = amount_data(IX_TRANSFER, amount);
    let ix = Instruction {
        program_id: &TOKEN_PROGRAM_ID,
        accounts: &metas,
        data: &data,
    };
    invoke_signed(&ix, &[from, to, authority], signers)
}

pub fn mint_to(
    mint: &AccountInfo,
    to: &AccountInfo,
    authority: &AccountInfo,
    amount: u64,
    signers: &[Signer],
) -> ProgramResult {
    let metas = [
        AccountMeta::writable(mint.key()),
        AccountMeta::writable(to.key()),
        AccountMeta::readonly_signer(authority.key()),
    ];
    let data = amount_data(IX_MINT_TO, amount);
    let ix = Instruction {
        program_id: &TOKEN_PROGRAM_ID,
        accounts: &metas,
        data: &data,
    };
    invoke_signed(&ix, &[mint, to, authority], signers)
}

pub fn burn(
    account: &AccountInfo,
    mint: &AccountInfo,
    authority: &AccountInfo,
    amount: u64,
    signers: &[Signer],
) -> ProgramResult {
    let metas = [
        AccountMeta::writable(account.key()),
        AccountMeta::writable(mint.key()),
        AccountMeta::readonly_signer(authority.key()),
    ];
    let data = amount_data(IX_BURN, amount);
    let ix = Instruction {
        program_id: &TOKEN_PROGRAM_ID,
        accounts: &metas,
        data: &data,
    };
    invoke_signed(&ix, &[account, mint, authority], signers)
}

/// InitializeMint2 with no freeze authority
pub fn initialize_mint(mint: &AccountInfo, mint_authority: &Pubkey, decimals: u8) -> ProgramResult {
    let mut data = [0u8; 35];
    data[0] = IX_INITIALIZE_MINT_2;
    data[1] = decimals;
    data[2..34].copy_from_slice(mint_authority);
    let metas = [AccountMeta::writable(mint.key())];
    let ix = Instruction {
        program_id: &TOKEN_PROGRAM_ID,
        accounts: &metas,
        data: &data,
    };
    invoke_signed(&ix, &[mint], &[])
}

/// InitializeAccount3
pub fn initialize_token_account(
    account: &AccountInfo,
    mint: &AccountInfo,
    owner: &Pubkey,
) -> ProgramResult {
    let mut data = [0u8; 33];
    data[0] = IX_INITIALIZE_ACCOUNT_3;
    data[1..33].copy_from_slice(owner);
    let metas = [
        AccountMeta::writable(account.key()),
        AccountMeta::readonly(mint.key()),
    ];
    let ix = Instruction {
        program_id: &TOKEN_PROGRAM_ID,
        accounts: &metas,
        data: &data,
    };
    invoke_signed(&ix, &[account, mint], &[])
}

/// System CreateAccount; `signers` must cover `new_account` when it is a PDA
pub fn create_account(
    payer: &AccountInfo,
    new_account: &AccountInfo,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
    signers: &[Signer],
) -> ProgramResult {
    let mut data = [0u8; 52];
    data[4..12].copy_from_slice(&lamports.to_le_bytes());
    data[12..20].copy_from_slice(&space.to_le_bytes());
    data[20..52].copy_from_slice(owner);
    let metas = [
        AccountMeta::writable_signer(payer.key()),
        AccountMeta::writable_signer(new_account.key()),
    ];
    let ix = Instruction {
        program_id: &SYSTEM_PROGRAM_ID,
        accounts: &metas,
        data: &data,
    };
    invoke_signed(&ix, &[payer, new_account], signers)
}

/// Rent-exempt CreateAccount, skipped when the account already holds data
///
/// Returns whether the account was created by this call.
pub fn create_pda_if_missing(
    payer: &AccountInfo,
    account: &AccountInfo,
    space: usize,
    owner: &Pubkey,
    signers: &[Signer],
) -> Result<bool, ProgramError> {
    if !account.data_is_empty() {
        return Ok(false);
    }
    let lamports = Rent::get()?.minimum_balance(space);
    create_account(payer, account, lamports, space as u64, owner, signers)?;
    Ok(true)
}
