//! Keeper domain errors

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeeperError {
    #[error("account {0} does not hold a receipt")]
    NotAReceipt(Pubkey),

    #[error("receipt {0} has unknown status {1}")]
    UnknownStatus(Pubkey, u8),

    #[error("pool {pool} referenced by receipt {receipt} could not be decoded")]
    MissingPool { pool: Pubkey, receipt: Pubkey },

    #[error("account {0} does not hold a delegatable entity")]
    NotAnEntity(Pubkey),

    #[error("receipt {0} is orphaned and needs the pool authority to reconcile")]
    OrphanNeedsAuthority(Pubkey),
}
