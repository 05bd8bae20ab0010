//! Error taxonomy shared by the model and the on-chain program
//!
//! Codes start at 6000 so existing clients that decode the custom error
//! number keep working.

use core::fmt;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    CustomError = 6000,
    /// Pool has been deactivated
    PoolNotActive = 6001,
    /// Pool is paused by its authority
    PoolPaused = 6002,
    /// Checked arithmetic overflowed or divided by zero
    MathOverflow = 6003,
    /// Reserves cannot cover the requested payout
    InsufficientReserves = 6004,
    /// Quote fell below the caller's minimum
    SlippageExceeded = 6005,
    /// Provider already holds positions in the maximum number of pools
    MaxPoolsReached = 6006,
    /// Provider's LP token account holds fewer tokens than requested
    InsufficientTokenBalance = 6007,
    InvalidAmount = 6008,
    /// Provider's token accounts cannot fund the deposit
    InsufficientFunds = 6009,
    /// Ledger position holds fewer LP tokens than requested
    InsufficientBalance = 6010,
    /// State-machine precondition violated
    InvalidPoolState = 6011,
    InvalidInstruction = 6012,
    InvalidAccount = 6013,
    Unauthorized = 6014,
    InvalidName = 6015,
    InvalidFeeConfig = 6016,
}

impl PoolError {
    /// Numeric code surfaced as `ProgramError::Custom`
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Reverse lookup from a custom error code
    pub fn from_code(code: u32) -> Option<Self> {
        let err = match code {
            6000 => Self::CustomError,
            6001 => Self::PoolNotActive,
            6002 => Self::PoolPaused,
            6003 => Self::MathOverflow,
            6004 => Self::InsufficientReserves,
            6005 => Self::SlippageExceeded,
            6006 => Self::MaxPoolsReached,
            6007 => Self::InsufficientTokenBalance,
            6008 => Self::InvalidAmount,
            6009 => Self::InsufficientFunds,
            6010 => Self::InsufficientBalance,
            6011 => Self::InvalidPoolState,
            6012 => Self::InvalidInstruction,
            6013 => Self::InvalidAccount,
            6014 => Self::Unauthorized,
            6015 => Self::InvalidName,
            6016 => Self::InvalidFeeConfig,
            _ => return None,
        };
        Some(err)
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::CustomError => "custom error",
            Self::PoolNotActive => "pool is not active",
            Self::PoolPaused => "pool is paused",
            Self::MathOverflow => "math overflow",
            Self::InsufficientReserves => "insufficient reserves",
            Self::SlippageExceeded => "slippage tolerance exceeded",
            Self::MaxPoolsReached => "maximum number of pools reached",
            Self::InsufficientTokenBalance => "insufficient token balance",
            Self::InvalidAmount => "invalid amount",
            Self::InsufficientFunds => "insufficient funds",
            Self::InsufficientBalance => "insufficient LP balance in position",
            Self::InvalidPoolState => "invalid pool state",
            Self::InvalidInstruction => "invalid instruction",
            Self::InvalidAccount => "invalid account",
            Self::Unauthorized => "unauthorized",
            Self::InvalidName => "invalid pool name",
            Self::InvalidFeeConfig => "fee configuration out of range",
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

#[cfg(feature = "program-error")]
impl From<PoolError> for pinocchio::program_error::ProgramError {
    fn from(e: PoolError) -> Self {
        pinocchio::program_error::ProgramError::Custom(e.code())
    }
}
