//! Pure state model for the pool, provider ledger and receipts

use arrayvec::{ArrayString, ArrayVec};

use crate::delegation::Delegation;
use crate::error::PoolError;
use crate::math::BPS_DENOMINATOR;

/// 32-byte account identity (same layout as an on-chain pubkey)
pub type Key = [u8; 32];

/// Pool names are PDA seeds, so they must fit a single seed
pub const MAX_POOL_NAME_LEN: usize = 32;
/// Distinct pools a single provider may hold positions in
pub const MAX_PROVIDER_POOLS: usize = 10;
pub const MAX_METADATA_TITLE_LEN: usize = 32;
pub const MAX_METADATA_SYMBOL_LEN: usize = 10;
pub const MAX_METADATA_URI_LEN: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FeeConfig {
    pub trade_fee_bps: u16,
    pub protocol_fee_bps: u16,
    pub fee_recipient: Key,
}

impl FeeConfig {
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.trade_fee_bps as u64 + self.protocol_fee_bps as u64 >= BPS_DENOMINATOR {
            return Err(PoolError::InvalidFeeConfig);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolStatus {
    pub is_active: bool,
    pub is_paused: bool,
    /// Set while a delegate/undelegate transition is in flight or the pool
    /// is owned by the external venue
    pub is_migrating: bool,
}

impl Default for PoolStatus {
    fn default() -> Self {
        Self {
            is_active: true,
            is_paused: false,
            is_migrating: false,
        }
    }
}

impl PoolStatus {
    /// Lifecycle gate shared by every mutating operation
    pub fn ensure_mutable(&self) -> Result<(), PoolError> {
        if !self.is_active {
            return Err(PoolError::PoolNotActive);
        }
        if self.is_paused {
            return Err(PoolError::PoolPaused);
        }
        Ok(())
    }

    /// Gate for direct (non-receipt) deposits and withdrawals
    pub fn ensure_direct(&self) -> Result<(), PoolError> {
        self.ensure_mutable()?;
        if self.is_migrating {
            return Err(PoolError::InvalidPoolState);
        }
        Ok(())
    }
}

/// Constant-product pool ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pool {
    pub authority: Key,
    pub pool_id: u64,
    pub name: ArrayString<MAX_POOL_NAME_LEN>,
    pub max_aum_usd: u64,
    pub lp_mint: Key,
    pub token_a_mint: Key,
    pub token_b_mint: Key,
    pub token_a_vault: Key,
    pub token_b_vault: Key,
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub total_lp_supply: u64,
    pub fees: FeeConfig,
    pub status: PoolStatus,
    /// Cumulative protocol fees routed to the fee recipient
    pub protocol_fees_a: u64,
    pub protocol_fees_b: u64,
    pub created_at: i64,
    pub updated_at: i64,
    pub delegation: Delegation,
}

impl Pool {
    pub fn is_seeded(&self) -> bool {
        self.total_lp_supply > 0
    }
}

/// Creation parameters for [`crate::initialize_pool`]
#[derive(Clone, Copy, Debug)]
pub struct PoolParams<'a> {
    pub authority: Key,
    pub pool_id: u64,
    pub name: &'a str,
    pub max_aum_usd: u64,
    pub metadata_title: &'a str,
    pub metadata_symbol: &'a str,
    pub metadata_uri: &'a str,
    pub trade_fee_bps: u16,
    pub protocol_fee_bps: u16,
    pub fee_recipient: Key,
    pub lp_mint: Key,
    pub token_a_mint: Key,
    pub token_b_mint: Key,
    pub token_a_vault: Key,
    pub token_b_vault: Key,
}

/// One entry of a provider's per-pool ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PoolPosition {
    pub pool: Key,
    pub token_mint: Key,
    pub liquidity_amount: u64,
    pub lp_tokens: u64,
}

/// Per-wallet aggregate across at most [`MAX_PROVIDER_POOLS`] pools
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiquidityProvider {
    pub provider: Key,
    /// Cumulative, never decreases
    pub total_liquidity_provided: u64,
    /// Sum of `lp_tokens` across positions
    pub total_lp_tokens: u64,
    /// Ordered by first deposit
    pub positions: ArrayVec<PoolPosition, MAX_PROVIDER_POOLS>,
    pub latest_liquidity_provided_on: i64,
    pub delegation: Delegation,
}

impl LiquidityProvider {
    pub fn new(provider: Key) -> Self {
        Self {
            provider,
            total_liquidity_provided: 0,
            total_lp_tokens: 0,
            positions: ArrayVec::new(),
            latest_liquidity_provided_on: 0,
            delegation: Delegation::default(),
        }
    }

    pub fn position(&self, pool: &Key) -> Option<&PoolPosition> {
        self.positions.iter().find(|p| &p.pool == pool)
    }

    pub fn position_index(&self, pool: &Key) -> Option<usize> {
        self.positions.iter().position(|p| &p.pool == pool)
    }
}

/// Two-phase receipt lifecycle
///
/// `Empty`, `Settled` and `Refunded` are all "no outstanding receipt".
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReceiptStatus {
    #[default]
    Empty = 0,
    Pending = 1,
    Committed = 2,
    Settled = 3,
    Refunded = 4,
}

impl ReceiptStatus {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Empty),
            1 => Some(Self::Pending),
            2 => Some(Self::Committed),
            3 => Some(Self::Settled),
            4 => Some(Self::Refunded),
            _ => None,
        }
    }

    /// Pending or committed-but-unsettled
    pub fn is_outstanding(self) -> bool {
        matches!(self, Self::Pending | Self::Committed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DepositReceipt {
    pub pool: Key,
    pub provider: Key,
    /// Gross amounts pulled from the provider
    pub amount_a: u64,
    pub amount_b: u64,
    /// Amounts that earn LP shares
    pub net_a: u64,
    pub net_b: u64,
    /// Amounts credited to reserves on commit (net + trade fee)
    pub credited_a: u64,
    pub credited_b: u64,
    /// Locked quote
    pub lp_tokens_minted: u64,
    pub min_lp_tokens: u64,
    pub status: ReceiptStatus,
    pub created_at: i64,
    pub committed_at: i64,
    pub delegation: Delegation,
}

impl DepositReceipt {
    /// Protocol fees held in the vaults until the receipt settles
    pub fn protocol_fees(&self) -> (u64, u64) {
        (
            self.amount_a.saturating_sub(self.credited_a),
            self.amount_b.saturating_sub(self.credited_b),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct WithdrawReceipt {
    pub pool: Key,
    pub provider: Key,
    pub lp_tokens_to_burn: u64,
    pub min_amount_a: u64,
    pub min_amount_b: u64,
    /// Locked payout
    pub amount_a_withdrawn: u64,
    pub amount_b_withdrawn: u64,
    pub status: ReceiptStatus,
    pub created_at: i64,
    pub committed_at: i64,
    pub delegation: Delegation,
}
