#![cfg_attr(not(test), no_std)]

pub mod account;
pub mod instruction;
pub mod seeds;
pub mod token;

pub use account::*;
pub use instruction::*;
pub use seeds::*;
pub use token::*;

pub use pool_model::PoolError;
