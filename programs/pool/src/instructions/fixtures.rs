//! Host-side builders shared by the handler tests

use pool_model::PoolParams;

use super::apply_initialize_pool;
use crate::state::*;

pub const POOL_KEY: [u8; 32] = [9u8; 32];
pub const ALICE: [u8; 32] = [1u8; 32];
pub const BOB: [u8; 32] = [11u8; 32];
pub const AUTHORITY: [u8; 32] = [2u8; 32];

pub fn pool_account(trade_fee_bps: u16, protocol_fee_bps: u16) -> PoolAccount {
    let params = PoolParams {
        authority: AUTHORITY,
        pool_id: 1,
        name: "SOL-USDC",
        max_aum_usd: 0,
        metadata_title: "",
        metadata_symbol: "",
        metadata_uri: "",
        trade_fee_bps,
        protocol_fee_bps,
        fee_recipient: [3u8; 32],
        lp_mint: [4u8; 32],
        token_a_mint: [5u8; 32],
        token_b_mint: [6u8; 32],
        token_a_vault: [7u8; 32],
        token_b_vault: [8u8; 32],
    };
    let mut acct = PoolAccount::zeroed();
    apply_initialize_pool(&mut acct, &params, PoolBumps::default(), 0).unwrap();
    acct
}

pub fn ledger(provider: [u8; 32]) -> LiquidityProviderAccount {
    let mut acct = LiquidityProviderAccount::zeroed();
    acct.init(provider, 255);
    acct
}

pub fn deposit_receipt(provider: [u8; 32]) -> DepositReceiptAccount {
    let mut acct = DepositReceiptAccount::zeroed();
    acct.init(provider, 255);
    acct
}

pub fn withdraw_receipt(provider: [u8; 32]) -> WithdrawReceiptAccount {
    let mut acct = WithdrawReceiptAccount::zeroed();
    acct.init(provider, 255);
    acct
}

/// Byte image, for all-or-nothing assertions
pub fn snapshot<T: ZeroCopy>(acct: &T) -> Vec<u8> {
    as_bytes(acct).to_vec()
}
