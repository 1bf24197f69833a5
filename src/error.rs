//! The error taxonomy observable at the EVM level.
//!
//! Numeric ids are part of the trace document's wire format (spec §6) and
//! are never renumbered; new variants may only be appended.

use strum_macros::Display;

/// Outcome of a single instance's execution, recorded on its final trace
/// entry. `None` is success.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ErrorCode {
    #[strum(serialize = "none")]
    None = 0,
    #[strum(serialize = "stack overflow")]
    StackOverflow = 1,
    #[strum(serialize = "stack underflow")]
    StackUnderflow = 2,
    #[strum(serialize = "invalid opcode")]
    InvalidOpcode = 3,
    #[strum(serialize = "out of gas")]
    OutOfGas = 4,
    #[strum(serialize = "invalid jump")]
    InvalidJump = 5,
    #[strum(serialize = "static violation")]
    StaticViolation = 6,
    #[strum(serialize = "revert")]
    Revert = 7,
    #[strum(serialize = "depth exceeded")]
    DepthExceeded = 8,
    #[strum(serialize = "insufficient balance")]
    InsufficientBalance = 9,
    #[strum(serialize = "returndata out of bounds")]
    ReturndataOob = 10,
    #[strum(serialize = "memory limit")]
    MemoryLimit = 11,
    #[strum(serialize = "aborted")]
    Aborted = 12,
}

impl ErrorCode {
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::None)
    }
}

impl Default for ErrorCode {
    fn default() -> Self {
        Self::None
    }
}
