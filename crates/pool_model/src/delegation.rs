//! Delegation state machine for entities lent to an external venue
//!
//! ```text
//! OwnedLocal -> Delegating -> OwnedRemote -> Undelegating -> OwnedLocal
//! ```
//!
//! `OwnedRemote -> OwnedLocal` is also legal: the venue may undelegate an
//! entity on its own schedule without an explicit request passing through
//! this program first.

use crate::error::PoolError;
use crate::state::Key;

/// Lower bound on the venue checkpoint cadence
pub const MIN_COMMIT_FREQUENCY_MS: u32 = 1_000;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DelegationState {
    #[default]
    OwnedLocal = 0,
    Delegating = 1,
    OwnedRemote = 2,
    Undelegating = 3,
}

impl DelegationState {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::OwnedLocal),
            1 => Some(Self::Delegating),
            2 => Some(Self::OwnedRemote),
            3 => Some(Self::Undelegating),
            _ => None,
        }
    }
}

/// Which ledger entity a delegation refers to
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Pool = 0,
    LiquidityProvider = 1,
    DepositReceipt = 2,
    WithdrawReceipt = 3,
}

impl EntityKind {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Pool),
            1 => Some(Self::LiquidityProvider),
            2 => Some(Self::DepositReceipt),
            3 => Some(Self::WithdrawReceipt),
            _ => None,
        }
    }
}

/// Per-entity delegation bookkeeping, embedded in every delegatable account
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Delegation {
    pub state: DelegationState,
    pub commit_frequency_ms: u32,
    /// All zeros means any validator may pick the entity up
    pub validator: Key,
    pub delegated_at: i64,
    pub last_commit_at: i64,
}

/// What the venue is told when an entity is handed over
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelegationRecord {
    pub target: Key,
    pub kind: EntityKind,
    pub validator: Option<Key>,
    pub commit_frequency_ms: u32,
    pub delegated_at: i64,
}

impl Delegation {
    #[inline]
    pub fn is_local(&self) -> bool {
        self.state == DelegationState::OwnedLocal
    }

    #[inline]
    pub fn is_remote(&self) -> bool {
        matches!(
            self.state,
            DelegationState::OwnedRemote | DelegationState::Undelegating
        )
    }

    pub fn ensure_local(&self) -> Result<(), PoolError> {
        if !self.is_local() {
            return Err(PoolError::InvalidPoolState);
        }
        Ok(())
    }

    pub fn validator(&self) -> Option<Key> {
        if self.validator == [0u8; 32] {
            None
        } else {
            Some(self.validator)
        }
    }

    /// OwnedLocal -> Delegating
    pub fn begin(
        &mut self,
        validator: Option<Key>,
        commit_frequency_ms: u32,
        now: i64,
    ) -> Result<(), PoolError> {
        if self.state != DelegationState::OwnedLocal {
            return Err(PoolError::InvalidPoolState);
        }
        if commit_frequency_ms < MIN_COMMIT_FREQUENCY_MS {
            return Err(PoolError::InvalidAmount);
        }
        *self = Delegation {
            state: DelegationState::Delegating,
            commit_frequency_ms,
            validator: validator.unwrap_or([0u8; 32]),
            delegated_at: now,
            last_commit_at: now,
        };
        Ok(())
    }

    /// Delegating -> OwnedRemote, once the venue holds write authority
    pub fn confirm(&mut self) -> Result<(), PoolError> {
        if self.state != DelegationState::Delegating {
            return Err(PoolError::InvalidPoolState);
        }
        self.state = DelegationState::OwnedRemote;
        Ok(())
    }

    /// OwnedRemote -> Undelegating
    pub fn request_undelegation(&mut self) -> Result<(), PoolError> {
        if self.state != DelegationState::OwnedRemote {
            return Err(PoolError::InvalidPoolState);
        }
        self.state = DelegationState::Undelegating;
        Ok(())
    }

    /// OwnedRemote | Undelegating -> OwnedLocal, on venue finality
    pub fn finalize(&mut self) -> Result<(), PoolError> {
        if !self.is_remote() {
            return Err(PoolError::InvalidPoolState);
        }
        *self = Delegation::default();
        Ok(())
    }

    /// Whether the commit interval has elapsed since the last checkpoint
    pub fn checkpoint_due(&self, now: i64) -> bool {
        let elapsed_ms = now.saturating_sub(self.last_commit_at).saturating_mul(1_000);
        elapsed_ms >= self.commit_frequency_ms as i64
    }

    /// Record a venue checkpoint, throttled by the commit interval
    pub fn record_checkpoint(&mut self, now: i64) -> Result<(), PoolError> {
        if self.state != DelegationState::OwnedRemote {
            return Err(PoolError::InvalidPoolState);
        }
        if !self.checkpoint_due(now) {
            return Err(PoolError::InvalidPoolState);
        }
        self.last_commit_at = now;
        Ok(())
    }

    pub fn record(&self, target: Key, kind: EntityKind) -> DelegationRecord {
        DelegationRecord {
            target,
            kind,
            validator: self.validator(),
            commit_frequency_ms: self.commit_frequency_ms,
            delegated_at: self.delegated_at,
        }
    }
}
