//! PDA salt strings
//!
//! These must stay byte-identical to what existing on-ledger state was
//! derived with. Composition order is always `[salt, identity]`.

/// `["pool", name]`
pub const POOL_SEED: &[u8] = b"pool";
/// `["liquidity_provider_account_info", provider]`
pub const LIQUIDITY_PROVIDER_SEED: &[u8] = b"liquidity_provider_account_info";
/// `["lp_token_mint"]`
pub const LP_MINT_SEED: &[u8] = b"lp_token_mint";
/// `["lp_token_account"]`, escrow for LP tokens awaiting a withdraw commit
pub const LP_ESCROW_SEED: &[u8] = b"lp_token_account";
/// `["token_account_a", mint_a]`
pub const VAULT_A_SEED: &[u8] = b"token_account_a";
/// `["token_account_b", mint_b]`
pub const VAULT_B_SEED: &[u8] = b"token_account_b";
/// `["transfer_authority"]`, owner of vaults, escrow and LP mint
pub const TRANSFER_AUTHORITY_SEED: &[u8] = b"transfer_authority";
/// `["deposit_recept", provider]`
pub const DEPOSIT_RECEIPT_SEED: &[u8] = b"deposit_recept";
/// `["withdraw_recept", provider]`
pub const WITHDRAW_RECEIPT_SEED: &[u8] = b"withdraw_recept";

// Venue-side records, keyed by the delegated account
pub const BUFFER_SEED: &[u8] = b"buffer";
pub const DELEGATION_SEED: &[u8] = b"delegation";
pub const DELEGATION_METADATA_SEED: &[u8] = b"delegation-metadata";
