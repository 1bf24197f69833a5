//! EVM hard-fork revisions, ordered so `Revision::Berlin >= Revision::Istanbul`
//! style comparisons used throughout the gas-schedule layer just work.
//!
//! Carried over from the teacher's `common::Revision` with a `Shanghai`
//! variant added to match what `config.rs`'s `From<Revision> for Config`
//! already expected.

use strum_macros::Display;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Revision {
    /// The revision Ethereum launched with.
    Frontier = 0,
    /// [EIP-606](https://eips.ethereum.org/EIPS/eip-606).
    Homestead = 1,
    /// [EIP-608](https://eips.ethereum.org/EIPS/eip-608).
    Tangerine = 2,
    /// [EIP-607](https://eips.ethereum.org/EIPS/eip-607).
    Spurious = 3,
    /// [EIP-609](https://eips.ethereum.org/EIPS/eip-609).
    Byzantium = 4,
    /// [EIP-1013](https://eips.ethereum.org/EIPS/eip-1013).
    Constantinople = 5,
    /// [EIP-1716](https://eips.ethereum.org/EIPS/eip-1716).
    Petersburg = 6,
    /// [EIP-1679](https://eips.ethereum.org/EIPS/eip-1679).
    Istanbul = 7,
    /// Berlin, EIP-2929/EIP-2930.
    Berlin = 8,
    /// London, EIP-1559/EIP-3198.
    London = 9,
    /// Shanghai.
    Shanghai = 10,
}

impl Revision {
    pub fn iter() -> impl Iterator<Item = Self> {
        [
            Self::Frontier,
            Self::Homestead,
            Self::Tangerine,
            Self::Spurious,
            Self::Byzantium,
            Self::Constantinople,
            Self::Petersburg,
            Self::Istanbul,
            Self::Berlin,
            Self::London,
            Self::Shanghai,
        ]
        .into_iter()
    }

    pub const fn len() -> usize {
        Self::Shanghai as usize + 1
    }

    pub const fn latest() -> Self {
        Self::Shanghai
    }
}
