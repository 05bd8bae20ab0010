//! Ephemeral-rollup venue: delegation program and magic program CPIs
//!
//! Wire formats are borsh on the venue side. They are encoded by hand into
//! fixed stack buffers; nothing here allocates.

use arrayvec::ArrayVec;
use pinocchio::{
    account_info::AccountInfo,
    cpi::invoke_signed,
    instruction::{AccountMeta, Instruction, Signer},
    pubkey::Pubkey,
    ProgramResult,
};
use pool_model::PoolError;

pub const DELEGATION_PROGRAM_ID: Pubkey =
    pinocchio_pubkey::pubkey!("DELeGGvXpWV2fqJUhqcF5ZSYMS4JTLjteaAMARRSaeSh");
pub const MAGIC_PROGRAM_ID: Pubkey =
    pinocchio_pubkey::pubkey!("Magic11111111111111111111111111111111111111");
pub const MAGIC_CONTEXT_ID: Pubkey =
    pinocchio_pubkey::pubkey!("MagicContext1111111111111111111111111111111");

/// Prefix of the delegation program's undelegate callback
pub const UNDELEGATE_CALLBACK_DISCRIMINATOR: [u8; 8] = [196, 28, 41, 206, 48, 37, 51, 167];

const DELEGATE_DISCRIMINATOR: [u8; 8] = [0; 8];
const SCHEDULE_COMMIT: [u8; 4] = [1, 0, 0, 0];
const SCHEDULE_COMMIT_AND_UNDELEGATE: [u8; 4] = [2, 0, 0, 0];

/// Seeds per delegated account (salt + identity)
pub const MAX_ENTITY_SEEDS: usize = 4;
pub const MAX_SEED_LEN: usize = 32;
/// discriminator + frequency + vec len + seeds + option tag + validator
pub const MAX_DELEGATE_ARGS_LEN: usize =
    8 + 4 + 4 + MAX_ENTITY_SEEDS * (4 + MAX_SEED_LEN) + 1 + 32;

struct ArgWriter<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> ArgWriter<N> {
    fn new() -> Self {
        Self { buf: [0u8; N], len: 0 }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), PoolError> {
        let end = self.len.checked_add(bytes.len()).ok_or(PoolError::InvalidInstruction)?;
        self.buf
            .get_mut(self.len..end)
            .ok_or(PoolError::InvalidInstruction)?
            .copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }

    fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Encoded `delegate` instruction data
pub struct DelegateArgs {
    writer: ArgWriter<MAX_DELEGATE_ARGS_LEN>,
}

impl DelegateArgs {
    pub fn encode(
        commit_frequency_ms: u32,
        seeds: &[&[u8]],
        validator: Option<&Pubkey>,
    ) -> Result<Self, PoolError> {
        if seeds.len() > MAX_ENTITY_SEEDS || seeds.iter().any(|s| s.len() > MAX_SEED_LEN) {
            return Err(PoolError::InvalidInstruction);
        }
        let mut writer = ArgWriter::new();
        writer.put(&DELEGATE_DISCRIMINATOR)?;
        writer.put(&commit_frequency_ms.to_le_bytes())?;
        writer.put(&(seeds.len() as u32).to_le_bytes())?;
        for seed in seeds {
            writer.put(&(seed.len() as u32).to_le_bytes())?;
            writer.put(seed)?;
        }
        match validator {
            Some(key) => {
                writer.put(&[1])?;
                writer.put(key)?;
            }
            None => writer.put(&[0])?,
        }
        Ok(Self { writer })
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.writer.as_slice()
    }
}

/// Decode the borsh `Vec<Vec<u8>>` that follows the callback discriminator
pub fn parse_callback_seeds(
    data: &[u8],
) -> Result<ArrayVec<&[u8], MAX_ENTITY_SEEDS>, PoolError> {
    let mut reader = pool_common::InstructionReader::new(data);
    let count = reader.read_u32()? as usize;
    if count == 0 || count > MAX_ENTITY_SEEDS {
        return Err(PoolError::InvalidInstruction);
    }
    let mut seeds = ArrayVec::new();
    for _ in 0..count {
        let len = reader.read_u32()? as usize;
        if len > MAX_SEED_LEN {
            return Err(PoolError::InvalidInstruction);
        }
        seeds.push(reader.read_slice(len)?);
    }
    Ok(seeds)
}

/// Accounts for the delegation program's `delegate`
pub struct DelegateAccounts<'a> {
    pub payer: &'a AccountInfo,
    pub entity: &'a AccountInfo,
    pub owner_program: &'a AccountInfo,
    pub buffer: &'a AccountInfo,
    pub delegation_record: &'a AccountInfo,
    pub delegation_metadata: &'a AccountInfo,
    pub system_program: &'a AccountInfo,
}

/// Hand `entity` to the delegation program; `entity_signer` signs for the PDA
pub fn delegate(
    accounts: &DelegateAccounts<'_>,
    args: &DelegateArgs,
    entity_signer: Signer,
) -> ProgramResult {
    let metas = [
        AccountMeta::writable_signer(accounts.payer.key()),
        AccountMeta::writable_signer(accounts.entity.key()),
        AccountMeta::readonly(accounts.owner_program.key()),
        AccountMeta::writable(accounts.buffer.key()),
        AccountMeta::writable(accounts.delegation_record.key()),
        AccountMeta::writable(accounts.delegation_metadata.key()),
        AccountMeta::readonly(accounts.system_program.key()),
    ];
    let ix = Instruction {
        program_id: &DELEGATION_PROGRAM_ID,
        accounts: &metas,
        data: args.as_bytes(),
    };
    invoke_signed(
        &ix,
        &[
            accounts.payer,
            accounts.entity,
            accounts.owner_program,
            accounts.buffer,
            accounts.delegation_record,
            accounts.delegation_metadata,
            accounts.system_program,
        ],
        &[entity_signer],
    )
}

/// Ask the magic program to checkpoint `entity` to the base ledger,
/// optionally releasing it afterwards
pub fn schedule_commit(
    payer: &AccountInfo,
    magic_context: &AccountInfo,
    magic_program: &AccountInfo,
    entity: &AccountInfo,
    undelegate: bool,
) -> ProgramResult {
    let metas = [
        AccountMeta::writable_signer(payer.key()),
        AccountMeta::writable(magic_context.key()),
        AccountMeta::readonly(entity.key()),
    ];
    let data = if undelegate {
        SCHEDULE_COMMIT_AND_UNDELEGATE
    } else {
        SCHEDULE_COMMIT
    };
    let ix = Instruction {
        program_id: &MAGIC_PROGRAM_ID,
        accounts: &metas,
        data: &data,
    };
    invoke_signed(&ix, &[payer, magic_context, entity, magic_program], &[])
}
