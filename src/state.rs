//! Mutable working state of one call frame (spec §3): the stack, memory and
//! gas counters every instruction operates on, plus the immutable message
//! that seeded the frame.
//!
//! Grounded on the teacher's `state::ExecutionState`, rebuilt over the new
//! [`crate::stack::Stack`]/[`crate::memory::Memory`] types instead of the
//! teacher's raw `ArrayVec`/`Vec<u8>` pair, and carrying `gas_refund`
//! (EIP-2200) which the teacher tracked only inside the journal/host.

use crate::{memory::Memory, message::Message, revision::Revision, stack::Stack};
use bytes::Bytes;

/// Everything one call frame accumulates while executing: its stack,
/// memory, gas counters, and the data returned by its most recent
/// sub-call (`return_data`) or about to be handed back to its own caller
/// (`output_data`).
#[derive(Clone, Debug)]
pub struct ExecutionState {
    pub gas_left: i64,
    pub gas_refund: i64,
    pub stack: Stack,
    pub memory: Memory,
    pub message: Message,
    pub revision: Revision,
    pub return_data: Bytes,
    pub output_data: Bytes,
}

impl ExecutionState {
    pub fn new(message: Message, revision: Revision) -> Self {
        Self {
            gas_left: message.gas,
            gas_refund: 0,
            stack: Stack::new(),
            memory: Memory::new(),
            message,
            revision,
            return_data: Bytes::new(),
            output_data: Bytes::new(),
        }
    }
}
