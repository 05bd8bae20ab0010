//! Two-phase deposit and withdraw receipts
//!
//! One receipt of each kind per provider. A receipt in `Settled` or
//! `Refunded` is reusable by the next initiate.

use pool_model::EntityKind;

use super::{Delegatable, DelegationSlot, ZeroCopy, ACCOUNT_VERSION};

pub const DEPOSIT_RECEIPT_MAGIC: [u8; 8] = *b"EPLDRCPT";
pub const WITHDRAW_RECEIPT_MAGIC: [u8; 8] = *b"EPLWRCPT";

/// PDA `["deposit_recept", provider]`
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DepositReceiptAccount {
    pub magic: [u8; 8],
    pub version: u8,
    pub bump: u8,
    pub status: u8,
    pub _padding: [u8; 5],
    pub pool: [u8; 32],
    pub provider: [u8; 32],
    pub amount_a: u64,
    pub amount_b: u64,
    pub net_a: u64,
    pub net_b: u64,
    pub credited_a: u64,
    pub credited_b: u64,
    pub lp_tokens_minted: u64,
    pub min_lp_tokens: u64,
    pub created_at: i64,
    pub committed_at: i64,
    pub delegation: DelegationSlot,
}

/// PDA `["withdraw_recept", provider]`
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct WithdrawReceiptAccount {
    pub magic: [u8; 8],
    pub version: u8,
    pub bump: u8,
    pub status: u8,
    pub _padding: [u8; 5],
    pub pool: [u8; 32],
    pub provider: [u8; 32],
    pub lp_tokens_to_burn: u64,
    pub min_amount_a: u64,
    pub min_amount_b: u64,
    pub amount_a_withdrawn: u64,
    pub amount_b_withdrawn: u64,
    pub created_at: i64,
    pub committed_at: i64,
    pub delegation: DelegationSlot,
}

unsafe impl ZeroCopy for DepositReceiptAccount {
    const MAGIC: [u8; 8] = DEPOSIT_RECEIPT_MAGIC;

    fn magic(&self) -> [u8; 8] {
        self.magic
    }
}

unsafe impl ZeroCopy for WithdrawReceiptAccount {
    const MAGIC: [u8; 8] = WITHDRAW_RECEIPT_MAGIC;

    fn magic(&self) -> [u8; 8] {
        self.magic
    }
}

impl Delegatable for DepositReceiptAccount {
    const KIND: EntityKind = EntityKind::DepositReceipt;

    fn delegation_slot(&self) -> &DelegationSlot {
        &self.delegation
    }

    fn delegation_slot_mut(&mut self) -> &mut DelegationSlot {
        &mut self.delegation
    }
}

impl Delegatable for WithdrawReceiptAccount {
    const KIND: EntityKind = EntityKind::WithdrawReceipt;

    fn delegation_slot(&self) -> &DelegationSlot {
        &self.delegation
    }

    fn delegation_slot_mut(&mut self) -> &mut DelegationSlot {
        &mut self.delegation
    }
}

impl DepositReceiptAccount {
    pub fn init(&mut self, provider: [u8; 32], bump: u8) {
        *self = Self::zeroed();
        self.magic = DEPOSIT_RECEIPT_MAGIC;
        self.version = ACCOUNT_VERSION;
        self.bump = bump;
        self.provider = provider;
    }
}

impl WithdrawReceiptAccount {
    pub fn init(&mut self, provider: [u8; 32], bump: u8) {
        *self = Self::zeroed();
        self.magic = WITHDRAW_RECEIPT_MAGIC;
        self.version = ACCOUNT_VERSION;
        self.bump = bump;
        self.provider = provider;
    }
}
