//! Lending accounts to the ephemeral venue and taking them back
//!
//! Delegation snapshots the entity into a buffer PDA, clears it, hands it to
//! the delegation program and lets that program rebuild it from the buffer.
//! The undelegate callback runs on the base ledger and re-creates the account
//! from the venue's final image.

use arrayvec::ArrayVec;
use pinocchio::{
    account_info::AccountInfo,
    instruction::{Seed, Signer},
    msg,
    pubkey::{find_program_address, Pubkey},
    ProgramResult,
};
use pool_common::*;
use pool_model::{EntityKind, Key};

use super::{account_mut, now};
use crate::cpi::create_pda_if_missing;
use crate::log::log_value;
use crate::pda::{derive_buffer, derive_delegation_metadata, derive_delegation_record, expect_pda, EntitySeeds};
use crate::state::*;
use crate::venue::{self, DelegateAccounts, DelegateArgs, DELEGATION_PROGRAM_ID, MAGIC_CONTEXT_ID, MAGIC_PROGRAM_ID};

/// Identity of a delegatable account: its PDA seeds and who controls it
pub trait DelegatedEntity: Delegatable {
    fn entity_seeds(&self) -> Result<EntitySeeds, PoolError>;

    fn bump(&self) -> u8;

    /// Key allowed to delegate and undelegate
    fn controller(&self) -> &Key;
}

impl DelegatedEntity for PoolAccount {
    fn entity_seeds(&self) -> Result<EntitySeeds, PoolError> {
        EntitySeeds::new(POOL_SEED, self.name()?.as_bytes())
    }

    fn bump(&self) -> u8 {
        self.bump
    }

    fn controller(&self) -> &Key {
        &self.authority
    }
}

impl DelegatedEntity for LiquidityProviderAccount {
    fn entity_seeds(&self) -> Result<EntitySeeds, PoolError> {
        EntitySeeds::new(LIQUIDITY_PROVIDER_SEED, &self.provider)
    }

    fn bump(&self) -> u8 {
        self.bump
    }

    fn controller(&self) -> &Key {
        &self.provider
    }
}

impl DelegatedEntity for DepositReceiptAccount {
    fn entity_seeds(&self) -> Result<EntitySeeds, PoolError> {
        EntitySeeds::new(DEPOSIT_RECEIPT_SEED, &self.provider)
    }

    fn bump(&self) -> u8 {
        self.bump
    }

    fn controller(&self) -> &Key {
        &self.provider
    }
}

impl DelegatedEntity for WithdrawReceiptAccount {
    fn entity_seeds(&self) -> Result<EntitySeeds, PoolError> {
        EntitySeeds::new(WITHDRAW_RECEIPT_SEED, &self.provider)
    }

    fn bump(&self) -> u8 {
        self.bump
    }

    fn controller(&self) -> &Key {
        &self.provider
    }
}

/// Delegate instruction data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegateParams {
    pub kind: EntityKind,
    pub commit_frequency_ms: u32,
    pub validator: Option<Key>,
}

impl DelegateParams {
    pub fn parse(data: &[u8]) -> Result<Self, PoolError> {
        let mut reader = InstructionReader::new(data);
        let kind = EntityKind::from_u8(reader.read_u8()?).ok_or(PoolError::InvalidInstruction)?;
        let commit_frequency_ms = reader.read_u32()?;
        let validator = if reader.read_bool()? {
            Some(reader.read_pubkey()?)
        } else {
            None
        };
        Ok(Self {
            kind,
            commit_frequency_ms,
            validator,
        })
    }
}

fn read_kind(data: &[u8]) -> Result<EntityKind, PoolError> {
    EntityKind::from_u8(InstructionReader::new(data).read_u8()?).ok_or(PoolError::InvalidInstruction)
}

fn ensure_controller<T: DelegatedEntity>(entity: &T, signer: &Key) -> Result<(), PoolError> {
    if entity.controller() != signer {
        msg!("Error: Signer does not control this account");
        return Err(PoolError::Unauthorized);
    }
    Ok(())
}

/// Mark the entity remote and return the image the venue will start from
pub fn stage_delegation<T: DelegatedEntity>(
    entity: &mut T,
    signer: &Key,
    params: &DelegateParams,
    now: i64,
) -> Result<T, PoolError> {
    ensure_controller(entity, signer)?;
    entity.delegate(params.validator, params.commit_frequency_ms, now)?;
    Ok(*entity)
}

/// Venue side: flag the entity and let the final commit carry it home
pub fn stage_undelegation<T: DelegatedEntity>(entity: &mut T, signer: &Key) -> Result<(), PoolError> {
    ensure_controller(entity, signer)?;
    entity.request_undelegation()
}

/// Base side: rebuild the entity from the venue's final image
pub fn restore_from_buffer<T: DelegatedEntity>(buffer: &[u8], now: i64) -> Result<T, PoolError> {
    let mut entity = read_from::<T>(buffer).ok_or(PoolError::InvalidAccount)?;
    entity.finalize_undelegation(now)?;
    Ok(entity)
}

/// Like `restore_from_buffer`, but the image must be the entity `seeds` address
pub fn restore_for_seeds<T: DelegatedEntity>(buffer: &[u8], seeds: &[&[u8]], now: i64) -> Result<T, PoolError> {
    let restored = restore_from_buffer::<T>(buffer, now)?;
    if restored.entity_seeds()?.as_slices().as_slice() != seeds {
        msg!("Error: Buffer image does not match callback seeds");
        return Err(PoolError::InvalidAccount);
    }
    Ok(restored)
}

/// Entity kind named by the salt of the callback seeds
pub fn kind_for_salt(salt: &[u8]) -> Result<EntityKind, PoolError> {
    if salt == POOL_SEED {
        Ok(EntityKind::Pool)
    } else if salt == LIQUIDITY_PROVIDER_SEED {
        Ok(EntityKind::LiquidityProvider)
    } else if salt == DEPOSIT_RECEIPT_SEED {
        Ok(EntityKind::DepositReceipt)
    } else if salt == WITHDRAW_RECEIPT_SEED {
        Ok(EntityKind::WithdrawReceipt)
    } else {
        msg!("Error: Callback seeds name no delegatable account");
        Err(PoolError::InvalidAccount)
    }
}

/// The callback only lands on an account the delegation program holds or has closed
pub fn ensure_callback_target(delegation_owned: bool, empty: bool) -> Result<(), PoolError> {
    if !delegation_owned && !empty {
        msg!("Error: Callback target is a live account");
        return Err(PoolError::InvalidAccount);
    }
    Ok(())
}

/// Process delegate instruction
///
/// Expected accounts:
/// 0. `[writable, signer]` Payer (pool authority, or the provider for ledgers and receipts)
/// 1. `[writable]` Entity to delegate
/// 2. `[]` Owner program (this program)
/// 3. `[writable]` Buffer PDA `["buffer", entity]`
/// 4. `[writable]` Delegation record
/// 5. `[writable]` Delegation metadata
/// 6. `[]` Delegation program
/// 7. `[]` System program
///
/// Expected data layout:
/// - kind: u8, commit_frequency_ms: u32, has_validator: u8, validator: [u8; 32] (if present)
pub fn process_delegate(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    let [payer, entity, owner_program, buffer, delegation_record, delegation_metadata, delegation_program, system_program, ..] =
        accounts
    else {
        msg!("Error: Delegate requires 8 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(payer)?;
    validate_key(owner_program, program_id)?;
    validate_key(delegation_program, &DELEGATION_PROGRAM_ID)?;
    expect_pda(delegation_record, derive_delegation_record(entity.key()))?;
    expect_pda(delegation_metadata, derive_delegation_metadata(entity.key()))?;
    let params = DelegateParams::parse(data)?;

    let ctx = DelegateAccounts {
        payer,
        entity,
        owner_program,
        buffer,
        delegation_record,
        delegation_metadata,
        system_program,
    };
    match params.kind {
        EntityKind::Pool => hand_over::<PoolAccount>(program_id, &ctx, &params),
        EntityKind::LiquidityProvider => hand_over::<LiquidityProviderAccount>(program_id, &ctx, &params),
        EntityKind::DepositReceipt => hand_over::<DepositReceiptAccount>(program_id, &ctx, &params),
        EntityKind::WithdrawReceipt => hand_over::<WithdrawReceiptAccount>(program_id, &ctx, &params),
    }
}

fn hand_over<T: DelegatedEntity>(
    program_id: &Pubkey,
    ctx: &DelegateAccounts<'_>,
    params: &DelegateParams,
) -> ProgramResult {
    let acct = unsafe { account_mut::<T>(ctx.entity, program_id)? };
    let snapshot = stage_delegation(acct, ctx.payer.key(), params, now()?)?;
    let seeds = snapshot.entity_seeds()?;
    let entity_bump = [snapshot.bump()];

    // Stage the image in the buffer
    let buffer_bump = [expect_pda(ctx.buffer, derive_buffer(ctx.entity.key(), program_id))?];
    let buffer_seeds = [
        Seed::from(BUFFER_SEED),
        Seed::from(&ctx.entity.key()[..]),
        Seed::from(&buffer_bump[..]),
    ];
    create_pda_if_missing(ctx.payer, ctx.buffer, T::LEN, program_id, &[Signer::from(&buffer_seeds)])?;
    {
        let mut buf = ctx.buffer.try_borrow_mut_data()?;
        let dst = buf.get_mut(..T::LEN).ok_or(PoolError::InvalidAccount)?;
        dst.copy_from_slice(as_bytes(&snapshot));
    }
    {
        let buf = ctx.buffer.try_borrow_data()?;
        let data = ctx.entity.try_borrow_data()?;
        if buf.get(..T::LEN) != data.get(..T::LEN) {
            msg!("Error: Delegation buffer does not match entity");
            return Err(PoolError::InvalidAccount.into());
        }
    }

    // Clear and release ownership; the delegation program refills from the buffer
    ctx.entity.try_borrow_mut_data()?.fill(0);
    unsafe { ctx.entity.assign(&DELEGATION_PROGRAM_ID) };

    let slices = seeds.as_slices();
    let args = DelegateArgs::encode(params.commit_frequency_ms, &slices, params.validator.as_ref())?;
    let signer_seeds = [
        Seed::from(slices[0]),
        Seed::from(slices[1]),
        Seed::from(&entity_bump[..]),
    ];
    venue::delegate(ctx, &args, Signer::from(&signer_seeds))?;

    // Return the buffer rent to the payer
    let reclaimed = ctx.buffer.lamports();
    *ctx.payer.try_borrow_mut_lamports()? = ctx
        .payer
        .lamports()
        .checked_add(reclaimed)
        .ok_or(PoolError::MathOverflow)?;
    ctx.buffer.close()?;

    log_value("Delegated, commit frequency ms", params.commit_frequency_ms as u64);
    Ok(())
}

/// Process undelegate instruction (runs on the venue)
///
/// Expected accounts:
/// 0. `[writable, signer]` Payer (pool authority, or the provider)
/// 1. `[writable]` Delegated entity
/// 2. `[writable]` Magic context
/// 3. `[]` Magic program
///
/// Expected data layout (1 byte):
/// - kind: u8
pub fn process_undelegate(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    let [payer, entity, magic_context, magic_program, ..] = accounts else {
        msg!("Error: Undelegate requires 4 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(payer)?;
    validate_key(magic_context, &MAGIC_CONTEXT_ID)?;
    validate_key(magic_program, &MAGIC_PROGRAM_ID)?;

    let signer = payer.key();
    match read_kind(data)? {
        EntityKind::Pool => stage_undelegation(unsafe { account_mut::<PoolAccount>(entity, program_id)? }, signer)?,
        EntityKind::LiquidityProvider => {
            stage_undelegation(unsafe { account_mut::<LiquidityProviderAccount>(entity, program_id)? }, signer)?
        }
        EntityKind::DepositReceipt => {
            stage_undelegation(unsafe { account_mut::<DepositReceiptAccount>(entity, program_id)? }, signer)?
        }
        EntityKind::WithdrawReceipt => {
            stage_undelegation(unsafe { account_mut::<WithdrawReceiptAccount>(entity, program_id)? }, signer)?
        }
    }

    venue::schedule_commit(payer, magic_context, magic_program, entity, true)?;
    msg!("Undelegation scheduled");
    Ok(())
}

/// Process commit instruction: checkpoint a delegated entity to the base ledger
///
/// Rejected until the entity's commit interval has elapsed.
///
/// Expected accounts:
/// 0. `[writable, signer]` Payer
/// 1. `[writable]` Delegated entity
/// 2. `[writable]` Magic context
/// 3. `[]` Magic program
///
/// Expected data layout (1 byte):
/// - kind: u8
pub fn process_commit(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    let [payer, entity, magic_context, magic_program, ..] = accounts else {
        msg!("Error: Commit requires 4 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(payer)?;
    validate_key(magic_context, &MAGIC_CONTEXT_ID)?;
    validate_key(magic_program, &MAGIC_PROGRAM_ID)?;

    let now = now()?;
    match read_kind(data)? {
        EntityKind::Pool => unsafe { account_mut::<PoolAccount>(entity, program_id)? }.record_checkpoint(now)?,
        EntityKind::LiquidityProvider => {
            unsafe { account_mut::<LiquidityProviderAccount>(entity, program_id)? }.record_checkpoint(now)?
        }
        EntityKind::DepositReceipt => {
            unsafe { account_mut::<DepositReceiptAccount>(entity, program_id)? }.record_checkpoint(now)?
        }
        EntityKind::WithdrawReceipt => {
            unsafe { account_mut::<WithdrawReceiptAccount>(entity, program_id)? }.record_checkpoint(now)?
        }
    }

    venue::schedule_commit(payer, magic_context, magic_program, entity, false)?;
    msg!("Commit scheduled");
    Ok(())
}

/// Process the delegation program's undelegate callback
///
/// Expected accounts:
/// 0. `[writable]` Delegated account (closed by the delegation program, or still held by it)
/// 1. `[signer]` Undelegation buffer (owned by the delegation program) holding the venue's final image
/// 2. `[writable, signer]` Payer
/// 3. `[]` System program
///
/// Expected data layout:
/// - discriminator: [u8; 8], seeds: borsh `Vec<Vec<u8>>`
pub fn process_undelegation_callback(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let [delegated, buffer, payer, _system_program, ..] = accounts else {
        msg!("Error: Undelegate callback requires 4 accounts");
        return Err(PoolError::InvalidInstruction.into());
    };
    validate_signer(buffer)?;
    validate_owner(buffer, &DELEGATION_PROGRAM_ID)?;
    ensure_callback_target(delegated.is_owned_by(&DELEGATION_PROGRAM_ID), delegated.data_is_empty())?;
    let payload = data
        .get(venue::UNDELEGATE_CALLBACK_DISCRIMINATOR.len()..)
        .ok_or(PoolError::InvalidInstruction)?;
    let seeds = venue::parse_callback_seeds(payload)?;
    let kind = kind_for_salt(seeds[0])?;

    let (expected, bump) = find_program_address(&seeds, program_id);
    if delegated.key() != &expected {
        msg!("Error: Callback seeds do not derive the delegated account");
        return Err(PoolError::InvalidAccount.into());
    }

    let bump_seed = [bump];
    let mut signer_seeds: ArrayVec<Seed, { venue::MAX_ENTITY_SEEDS + 1 }> = ArrayVec::new();
    for seed in seeds.iter() {
        signer_seeds.push(Seed::from(*seed));
    }
    signer_seeds.push(Seed::from(&bump_seed[..]));
    let signer = Signer::from(&signer_seeds[..]);

    let image = buffer.try_borrow_data()?;
    let now = now()?;
    match kind {
        EntityKind::Pool => rebuild::<PoolAccount>(program_id, delegated, payer, &image, &seeds, signer, now),
        EntityKind::LiquidityProvider => {
            rebuild::<LiquidityProviderAccount>(program_id, delegated, payer, &image, &seeds, signer, now)
        }
        EntityKind::DepositReceipt => {
            rebuild::<DepositReceiptAccount>(program_id, delegated, payer, &image, &seeds, signer, now)
        }
        EntityKind::WithdrawReceipt => {
            rebuild::<WithdrawReceiptAccount>(program_id, delegated, payer, &image, &seeds, signer, now)
        }
    }
}

fn rebuild<T: DelegatedEntity>(
    program_id: &Pubkey,
    delegated: &AccountInfo,
    payer: &AccountInfo,
    image: &[u8],
    seeds: &[&[u8]],
    signer: Signer,
    now: i64,
) -> ProgramResult {
    let restored = restore_for_seeds::<T>(image, seeds, now)?;
    let created = create_pda_if_missing(payer, delegated, T::LEN, program_id, &[signer])?;
    if !created && !delegated.is_owned_by(&DELEGATION_PROGRAM_ID) {
        msg!("Error: Callback target already holds data");
        return Err(PoolError::InvalidAccount.into());
    }
    validate_owner(delegated, program_id)?;

    let mut data = delegated.try_borrow_mut_data()?;
    data.get_mut(..T::LEN)
        .ok_or(PoolError::InvalidAccount)?
        .copy_from_slice(as_bytes(&restored));

    msg!("Undelegation finalized");
    Ok(())
}
