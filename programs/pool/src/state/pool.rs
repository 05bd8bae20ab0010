//! Pool account

use pool_model::{delegate_pool, finalize_pool_undelegation, EntityKind, Key, PoolError};

use super::model_bridge::{pool_to_model, store_pool};
use super::{read_str, write_str, Delegatable, DelegationSlot, ZeroCopy, ACCOUNT_VERSION};

pub const POOL_MAGIC: [u8; 8] = *b"EPLPOOL_";

/// PDA bumps recorded at creation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolBumps {
    pub pool: u8,
    pub lp_mint: u8,
    pub vault_a: u8,
    pub vault_b: u8,
    pub authority: u8,
    pub escrow: u8,
}

/// Constant-product pool (PDA `["pool", name]`)
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct PoolAccount {
    pub magic: [u8; 8],

    pub version: u8,
    pub bump: u8,
    pub lp_mint_bump: u8,
    pub vault_a_bump: u8,
    pub vault_b_bump: u8,
    pub authority_bump: u8,
    pub escrow_bump: u8,
    pub name_len: u8,

    pub is_active: u8,
    pub is_paused: u8,
    pub is_migrating: u8,
    pub title_len: u8,
    pub symbol_len: u8,
    pub uri_len: u8,
    pub trade_fee_bps: u16,

    pub protocol_fee_bps: u16,
    pub _padding: [u8; 6],

    pub pool_id: u64,
    pub authority: [u8; 32],
    pub name: [u8; 32],

    pub lp_mint: [u8; 32],
    pub token_a_mint: [u8; 32],
    pub token_b_mint: [u8; 32],
    pub token_a_vault: [u8; 32],
    pub token_b_vault: [u8; 32],
    pub fee_recipient: [u8; 32],

    pub reserve_a: u64,
    pub reserve_b: u64,
    pub total_lp_supply: u64,
    /// Stored, not enforced
    pub max_aum_usd: u64,
    pub protocol_fees_a: u64,
    pub protocol_fees_b: u64,

    pub created_at: i64,
    pub updated_at: i64,

    pub delegation: DelegationSlot,

    pub metadata_title: [u8; 32],
    pub metadata_symbol: [u8; 16],
    pub metadata_uri: [u8; 200],
}

unsafe impl ZeroCopy for PoolAccount {
    const MAGIC: [u8; 8] = POOL_MAGIC;

    fn magic(&self) -> [u8; 8] {
        self.magic
    }
}

impl Delegatable for PoolAccount {
    const KIND: EntityKind = EntityKind::Pool;

    fn delegation_slot(&self) -> &DelegationSlot {
        &self.delegation
    }

    fn delegation_slot_mut(&mut self) -> &mut DelegationSlot {
        &mut self.delegation
    }

    /// Also raises `is_migrating`, gating direct deposits and withdrawals
    fn delegate(&mut self, validator: Option<Key>, commit_frequency_ms: u32, now: i64) -> Result<(), PoolError> {
        let mut pool = pool_to_model(self)?;
        delegate_pool(&mut pool, validator, commit_frequency_ms, now)?;
        store_pool(self, &pool)
    }

    fn finalize_undelegation(&mut self, now: i64) -> Result<(), PoolError> {
        let mut pool = pool_to_model(self)?;
        finalize_pool_undelegation(&mut pool, now)?;
        store_pool(self, &pool)
    }
}

impl PoolAccount {
    pub fn stamp(&mut self, bumps: PoolBumps) {
        self.magic = POOL_MAGIC;
        self.version = ACCOUNT_VERSION;
        self.bump = bumps.pool;
        self.lp_mint_bump = bumps.lp_mint;
        self.vault_a_bump = bumps.vault_a;
        self.vault_b_bump = bumps.vault_b;
        self.authority_bump = bumps.authority;
        self.escrow_bump = bumps.escrow;
    }

    pub fn name(&self) -> Result<&str, PoolError> {
        read_str(&self.name, self.name_len)
    }

    pub fn set_metadata(&mut self, title: &str, symbol: &str, uri: &str) -> Result<(), PoolError> {
        self.title_len = write_str(&mut self.metadata_title, title)?;
        self.symbol_len = write_str(&mut self.metadata_symbol, symbol)?;
        self.uri_len = write_str(&mut self.metadata_uri, uri)?;
        Ok(())
    }

    pub fn metadata_title(&self) -> Result<&str, PoolError> {
        read_str(&self.metadata_title, self.title_len)
    }

    pub fn metadata_symbol(&self) -> Result<&str, PoolError> {
        read_str(&self.metadata_symbol, self.symbol_len)
    }

    pub fn metadata_uri(&self) -> Result<&str, PoolError> {
        read_str(&self.metadata_uri, self.uri_len)
    }

    #[inline]
    pub fn is_migrating(&self) -> bool {
        self.is_migrating != 0
    }
}
