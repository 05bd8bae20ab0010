#![cfg_attr(target_os = "solana", no_std)]

pub mod cpi;
pub mod instructions;
pub mod log;
pub mod pda;
pub mod state;
pub mod venue;

// Always compiled for host tests; registered as the entrypoint only with `bpf-entrypoint`
pub mod entrypoint;

// Panic handler for no_std builds (only for Solana BPF)
#[cfg(all(target_os = "solana", not(test)))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

pub use instructions::*;
pub use state::*;

pinocchio_pubkey::declare_id!("EPoo1LqmR7QvD1sTXJr9pGkN4yMwZcB6hFu3tAsDe2Wx");
