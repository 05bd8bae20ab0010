//! Liquidity provider ledger account

use pool_model::{EntityKind, MAX_PROVIDER_POOLS};

use super::{Delegatable, DelegationSlot, ZeroCopy, ACCOUNT_VERSION};

pub const PROVIDER_MAGIC: [u8; 8] = *b"EPLPROV_";

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PositionSlot {
    pub pool: [u8; 32],
    pub token_mint: [u8; 32],
    pub liquidity_amount: u64,
    pub lp_tokens: u64,
}

/// Per-wallet ledger (PDA `["liquidity_provider_account_info", provider]`)
///
/// Only the first `position_count` slots are meaningful; the rest are zeroed
/// whenever the ledger is written back.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct LiquidityProviderAccount {
    pub magic: [u8; 8],
    pub version: u8,
    pub bump: u8,
    pub position_count: u8,
    pub _padding: [u8; 5],
    pub provider: [u8; 32],
    pub total_liquidity_provided: u64,
    pub total_lp_tokens: u64,
    pub latest_liquidity_provided_on: i64,
    pub delegation: DelegationSlot,
    pub positions: [PositionSlot; MAX_PROVIDER_POOLS],
}

unsafe impl ZeroCopy for LiquidityProviderAccount {
    const MAGIC: [u8; 8] = PROVIDER_MAGIC;

    fn magic(&self) -> [u8; 8] {
        self.magic
    }
}

impl Delegatable for LiquidityProviderAccount {
    const KIND: EntityKind = EntityKind::LiquidityProvider;

    fn delegation_slot(&self) -> &DelegationSlot {
        &self.delegation
    }

    fn delegation_slot_mut(&mut self) -> &mut DelegationSlot {
        &mut self.delegation
    }
}

impl LiquidityProviderAccount {
    pub fn init(&mut self, provider: [u8; 32], bump: u8) {
        *self = Self::zeroed();
        self.magic = PROVIDER_MAGIC;
        self.version = ACCOUNT_VERSION;
        self.bump = bump;
        self.provider = provider;
    }

    pub fn active_positions(&self) -> &[PositionSlot] {
        let n = (self.position_count as usize).min(MAX_PROVIDER_POOLS);
        &self.positions[..n]
    }
}
