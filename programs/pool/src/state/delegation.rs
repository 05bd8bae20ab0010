//! Delegation bookkeeping embedded in every delegatable account

use pool_model::{Delegation, DelegationState, EntityKind, Key, PoolError};

use super::ZeroCopy;

/// On-chain image of [`pool_model::Delegation`]
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DelegationSlot {
    pub state: u8,
    pub _padding: [u8; 3],
    pub commit_frequency_ms: u32,
    /// All zeros: any validator
    pub validator: [u8; 32],
    pub delegated_at: i64,
    pub last_commit_at: i64,
}

impl DelegationSlot {
    pub const SIZE: usize = core::mem::size_of::<Self>();

    pub fn to_model(&self) -> Result<Delegation, PoolError> {
        Ok(Delegation {
            state: DelegationState::from_u8(self.state).ok_or(PoolError::InvalidAccount)?,
            commit_frequency_ms: self.commit_frequency_ms,
            validator: self.validator,
            delegated_at: self.delegated_at,
            last_commit_at: self.last_commit_at,
        })
    }

    pub fn from_model(d: &Delegation) -> Self {
        Self {
            state: d.state as u8,
            _padding: [0; 3],
            commit_frequency_ms: d.commit_frequency_ms,
            validator: d.validator,
            delegated_at: d.delegated_at,
            last_commit_at: d.last_commit_at,
        }
    }
}

/// An account that can be lent to the ephemeral venue
pub trait Delegatable: ZeroCopy {
    const KIND: EntityKind;

    fn delegation_slot(&self) -> &DelegationSlot;

    fn delegation_slot_mut(&mut self) -> &mut DelegationSlot;

    fn delegation(&self) -> Result<Delegation, PoolError> {
        self.delegation_slot().to_model()
    }

    fn set_delegation(&mut self, d: &Delegation) {
        *self.delegation_slot_mut() = DelegationSlot::from_model(d);
    }

    /// OwnedLocal -> Delegating -> OwnedRemote
    ///
    /// Both steps land in the same instruction as the venue hand-over, so
    /// `Delegating` is never observable from outside.
    fn delegate(&mut self, validator: Option<Key>, commit_frequency_ms: u32, now: i64) -> Result<(), PoolError> {
        let mut d = self.delegation()?;
        d.begin(validator, commit_frequency_ms, now)?;
        d.confirm()?;
        self.set_delegation(&d);
        Ok(())
    }

    fn request_undelegation(&mut self) -> Result<(), PoolError> {
        let mut d = self.delegation()?;
        d.request_undelegation()?;
        self.set_delegation(&d);
        Ok(())
    }

    /// Venue finality: the base copy is authoritative again
    fn finalize_undelegation(&mut self, _now: i64) -> Result<(), PoolError> {
        let mut d = self.delegation()?;
        d.finalize()?;
        self.set_delegation(&d);
        Ok(())
    }

    fn record_checkpoint(&mut self, now: i64) -> Result<(), PoolError> {
        let mut d = self.delegation()?;
        d.record_checkpoint(now)?;
        self.set_delegation(&d);
        Ok(())
    }
}
