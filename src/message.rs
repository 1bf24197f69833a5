//! Immutable inputs to one call frame (spec §4.5), plus the transaction- and
//! block-wide context carried alongside it.
//!
//! Grounded on the teacher's `common.rs::{Message, CallKind}` and
//! `host.rs::TxContext`, merged per this spec's requirement that origin and
//! gas price ride on the message itself rather than be fetched through the
//! host on every `ORIGIN`/`GASPRICE`.

use bytes::Bytes;
use ethereum_types::{Address, H256, U256};

/// Maximum call depth, shared with the stack limit per spec §3.
pub const MAX_CALL_DEPTH: i32 = 1024;

/// The kind of call-like instruction that produced this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
    Create,
    Create2 { salt: H256 },
}

impl CallKind {
    pub const fn is_create(self) -> bool {
        matches!(self, Self::Create | Self::Create2 { .. })
    }
}

/// Inputs to one call frame. Immutable for the duration of that frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub kind: CallKind,
    pub is_static: bool,
    /// Call depth; 0 at the top level. Invariant: `depth <= MAX_CALL_DEPTH`.
    pub depth: i32,
    pub gas: i64,
    pub destination: Address,
    pub sender: Address,
    pub input_data: Bytes,
    pub value: U256,

    /// The transaction's origin account, unchanged through nesting.
    pub origin: Address,
    /// The transaction's gas price, unchanged through nesting.
    pub gas_price: U256,
}

impl Message {
    /// Returns up to `len` bytes of `input_data` starting at `offset`.
    ///
    /// `available` is `min(len, max(0, data.len() - offset))`; an `offset`
    /// (or `offset + len`) that overflows the address space yields
    /// `available = 0` rather than panicking, matching CALLDATALOAD/
    /// CALLDATACOPY's zero-padding-on-out-of-range-read semantics.
    pub fn input_slice(&self, offset: U256, len: usize) -> (&[u8], usize) {
        let data_len = self.input_data.len();
        if offset > U256::from(usize::MAX) {
            return (&[], 0);
        }
        let offset = offset.as_usize();
        if offset >= data_len {
            return (&[], 0);
        }
        let available = len.min(data_len - offset);
        (&self.input_data[offset..offset + available], available)
    }
}

/// The transaction- and block-wide data visible to a running instance,
/// independent of call depth (teacher's `host::TxContext`).
#[derive(Clone, Debug)]
pub struct TxContext {
    pub block_coinbase: Address,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub block_gas_limit: u64,
    pub block_difficulty: U256,
    pub chain_id: U256,
    pub block_base_fee: U256,
}
