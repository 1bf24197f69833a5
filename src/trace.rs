//! Per-instance opcode execution trace: an append-only log of per-step
//! snapshots, stored as parallel arrays with amortized O(1) push (spec §4.6).
//!
//! No direct teacher precedent exists for this module (the teacher traces
//! nothing); it is grounded on the teacher's own growable-collection idioms
//! elsewhere — `ArrayVec`-backed fixed buffers in `state.rs`, `getset`
//! accessors throughout — applied to a plain `Vec`-backed structure since the
//! trace has no fixed upper bound.

use crate::{error::ErrorCode, opcode::OpCode, word::Word};
use ethereum_types::{Address, H256};

/// Entries grow in increments of this many slots once capacity is exhausted.
pub const PAGE: usize = 128;

/// One touched storage slot as of some trace entry's retirement.
pub type TouchedSlot = (Address, H256, H256);

/// One step of execution, as observed just after the opcode ran.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceEntry {
    pub address: Address,
    pub pc: usize,
    pub opcode: OpCode,
    pub stack: Vec<Word>,
    pub memory: Vec<u8>,
    pub touched: Vec<TouchedSlot>,
    pub gas_used: i64,
    pub gas_limit: i64,
    pub gas_refund: i64,
    pub error_code: ErrorCode,
}

/// An ordered, append-only sequence of [`TraceEntry`] values for one
/// instance. Backing storage is parallel `Vec`s rather than one
/// `Vec<TraceEntry>` so that [`Tracer::modify_last`] can patch a single
/// field (the stack snapshot) without touching the others, and so that
/// growth is a handful of `reserve` calls rather than moving one large
/// struct array.
#[derive(Clone, Debug, Default)]
pub struct Tracer {
    address: Vec<Address>,
    pc: Vec<usize>,
    opcode: Vec<OpCode>,
    stack: Vec<Vec<Word>>,
    memory: Vec<Vec<u8>>,
    touched: Vec<Vec<TouchedSlot>>,
    gas_used: Vec<i64>,
    gas_limit: Vec<i64>,
    gas_refund: Vec<i64>,
    error_code: Vec<ErrorCode>,
    /// Set on `push`, cleared on the first `modify_last` after it; a second
    /// `modify_last` before the next `push` is a programmer error.
    patched_since_push: bool,
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pc.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.pc.capacity()
    }

    /// Appends a step, deep-copying its stack/memory/touched-state
    /// snapshots. Grows the backing arrays by [`PAGE`] slots when capacity
    /// is exhausted.
    pub fn push(&mut self, entry: TraceEntry) {
        if self.pc.len() == self.pc.capacity() {
            self.reserve(PAGE);
        }
        self.address.push(entry.address);
        self.pc.push(entry.pc);
        self.opcode.push(entry.opcode);
        self.stack.push(entry.stack);
        self.memory.push(entry.memory);
        self.touched.push(entry.touched);
        self.gas_used.push(entry.gas_used);
        self.gas_limit.push(entry.gas_limit);
        self.gas_refund.push(entry.gas_refund);
        self.error_code.push(entry.error_code);
        self.patched_since_push = false;
    }

    fn reserve(&mut self, additional: usize) {
        self.address.reserve(additional);
        self.pc.reserve(additional);
        self.opcode.reserve(additional);
        self.stack.reserve(additional);
        self.memory.reserve(additional);
        self.touched.reserve(additional);
        self.gas_used.reserve(additional);
        self.gas_limit.reserve(additional);
        self.gas_refund.reserve(additional);
        self.error_code.reserve(additional);
    }

    /// Retroactively overwrites the most recent entry's stack snapshot —
    /// the one concession to late binding, used when an opcode's effect on
    /// the stack is only known once a sub-call returns.
    ///
    /// # Panics
    /// Panics if called twice for the same entry without an intervening
    /// [`Tracer::push`], and if the trace is empty.
    pub fn modify_last(&mut self, stack: Vec<Word>) {
        assert!(!self.patched_since_push, "modify_last called twice for one entry");
        let last = self.stack.last_mut().expect("modify_last on empty trace");
        *last = stack;
        self.patched_since_push = true;
    }

    pub fn get(&self, index: usize) -> Option<TraceEntry> {
        Some(TraceEntry {
            address: *self.address.get(index)?,
            pc: *self.pc.get(index)?,
            opcode: *self.opcode.get(index)?,
            stack: self.stack.get(index)?.clone(),
            memory: self.memory.get(index)?.clone(),
            touched: self.touched.get(index)?.clone(),
            gas_used: *self.gas_used.get(index)?,
            gas_limit: *self.gas_limit.get(index)?,
            gas_refund: *self.gas_refund.get(index)?,
            error_code: *self.error_code.get(index)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = TraceEntry> + '_ {
        (0..self.len()).map(move |i| self.get(i).expect("index in range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereum_types::U256;

    fn sample(i: usize) -> TraceEntry {
        TraceEntry {
            address: Address::zero(),
            pc: i,
            opcode: OpCode::ADD,
            stack: vec![U256::from(i)],
            memory: Vec::new(),
            touched: Vec::new(),
            gas_used: i as i64,
            gas_limit: 1000,
            gas_refund: 0,
            error_code: ErrorCode::None,
        }
    }

    #[test]
    fn push_then_get_round_trips() {
        let mut t = Tracer::new();
        t.push(sample(0));
        t.push(sample(1));
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(1).unwrap().pc, 1);
    }

    #[test]
    fn modify_last_overwrites_only_the_stack_of_the_most_recent_entry() {
        let mut t = Tracer::new();
        t.push(sample(0));
        t.push(sample(1));
        t.modify_last(vec![U256::from(999)]);

        let patched = t.get(1).unwrap();
        assert_eq!(patched.stack, vec![U256::from(999)]);
        assert_eq!(patched.pc, 1);
        assert_eq!(t.get(0).unwrap().stack, vec![U256::from(0)]);
    }

    #[test]
    #[should_panic(expected = "modify_last called twice")]
    fn modify_last_twice_without_a_push_between_panics() {
        let mut t = Tracer::new();
        t.push(sample(0));
        t.modify_last(vec![U256::from(1)]);
        t.modify_last(vec![U256::from(2)]);
    }

    #[test]
    fn growth_by_page_preserves_the_existing_prefix() {
        let mut t = Tracer::new();
        for i in 0..130 {
            t.push(sample(i));
        }
        assert_eq!(t.len(), 130);
        assert!(t.capacity() >= 130);
        for i in 0..130 {
            assert_eq!(t.get(i).unwrap().pc, i, "entry {i} corrupted by growth");
        }
    }

    #[test]
    fn snapshot_is_independent_of_later_mutation() {
        let mut t = Tracer::new();
        let mut mem = vec![1u8, 2, 3];
        t.push(TraceEntry {
            memory: mem.clone(),
            ..sample(0)
        });
        mem[0] = 99;
        assert_eq!(t.get(0).unwrap().memory, vec![1, 2, 3]);
    }
}
