//! Pure Rust model of the ephemeral liquidity pool
//! No Solana dependencies, no unwrap/panic outside tests
//!
//! The on-chain program bridges its zero-copy accounts into these types,
//! runs a transition, and writes the result back. Kani harnesses and the
//! property tests exercise the same functions.

#![cfg_attr(not(test), no_std)]

pub mod delegation;
pub mod error;
pub mod helpers;
pub mod math;
pub mod state;
pub mod transitions;

pub use delegation::*;
pub use error::*;
pub use helpers::*;
pub use state::*;
pub use transitions::*;
