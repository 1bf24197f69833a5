//! Host↔device batch marshalling (spec §4.7).
//!
//! The full protocol moves a batch's jagged per-instance arrays (stacks,
//! memories, traces) across a control/accelerator boundary via an outer
//! descriptor allocation, an inner-array copy, and a descriptor fix-up pass.
//! This target is CPU-only, so the three phases collapse to ownership
//! transfer: [`Instance::to_staged`]/[`Instance::from_staged`] exist so the
//! batch can later be dropped onto a heterogeneous runtime unchanged, but
//! here they round-trip a `Vec` rather than walk device pointers.
//!
//! Grounded on the teacher's `ExecutionState` (`state.rs`) as the thing being
//! staged, generalized to the full per-instance graph this spec names.

use crate::{journal::Journal, memory::Memory, message::Message, stack::Stack, trace::Tracer};

/// One instance's complete, independently addressable state: the inputs
/// that seeded it (via `message`) plus everything it accumulated while
/// running.
#[derive(Clone, Debug)]
pub struct Instance {
    pub message: Message,
    pub stack: Stack,
    pub memory: Memory,
    pub journal: Journal,
    pub trace: Tracer,
    pub gas_left: i64,
    pub gas_refund: i64,
}

/// The host-resident, plain-data form of a staged instance. On a CPU-only
/// target this carries exactly the same fields as [`Instance`] — the
/// "device" representation and the host representation coincide — so
/// staging is a move, not a transcode.
#[derive(Clone, Debug)]
pub struct StagedInstance {
    message: Message,
    stack: Stack,
    memory: Memory,
    journal: Journal,
    trace: Tracer,
    gas_left: i64,
    gas_refund: i64,
}

impl Instance {
    /// Outer allocation + inner-array copy + descriptor fix-up, collapsed:
    /// moves this instance into its staged form by value.
    pub fn to_staged(self) -> StagedInstance {
        StagedInstance {
            message: self.message,
            stack: self.stack,
            memory: self.memory,
            journal: self.journal,
            trace: self.trace,
            gas_left: self.gas_left,
            gas_refund: self.gas_refund,
        }
    }
}

impl StagedInstance {
    /// Reverse direction: descriptor rewrite + inner-array copy-out,
    /// collapsed to a move back into host-addressable form.
    pub fn from_staged(self) -> Instance {
        Instance {
            message: self.message,
            stack: self.stack,
            memory: self.memory,
            journal: self.journal,
            trace: self.trace,
            gas_left: self.gas_left,
            gas_refund: self.gas_refund,
        }
    }
}

/// A batch of independently staged instances — the array of descriptors in
/// the general protocol, a plain `Vec` here.
#[derive(Clone, Debug, Default)]
pub struct Batch {
    instances: Vec<StagedInstance>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Stages every instance in `instances`, tearing nothing down on
    /// success since ownership simply transfers; a panic mid-iteration
    /// (the only failure mode at this layer, since staging itself cannot
    /// fail on a CPU target) drops whatever was already staged along with
    /// the rest of the input vector, leaking nothing.
    pub fn stage_all(instances: Vec<Instance>) -> Self {
        Self {
            instances: instances.into_iter().map(Instance::to_staged).collect(),
        }
    }

    /// Reverse of [`Batch::stage_all`]: hands every instance back by value.
    pub fn unstage_all(self) -> Vec<Instance> {
        self.instances
            .into_iter()
            .map(StagedInstance::from_staged)
            .collect()
    }
}
