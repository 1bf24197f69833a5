//! Batch-executing EVM interpreter core with per-step opcode tracing.

pub use config::Config;
pub use error::ErrorCode;
#[cfg(feature = "util")]
pub use fixture::{expand_instances, Fixture, FixtureError, TraceDocumentEntry, TransactionSpec};
pub use host::Host;
pub use interpreter::{AnalyzedCode, Output};
pub use journal::Journal;
pub use message::{CallKind, Message, TxContext};
pub use opcode::OpCode;
pub use revision::Revision;
pub use staging::{Batch, Instance};
pub use state::ExecutionState;
pub use trace::{TraceEntry, Tracer};

/// Maximum allowed EVM bytecode size.
pub const MAX_CODE_SIZE: usize = 0x6000;

pub mod config;
pub mod error;
#[cfg(feature = "util")]
pub mod fixture;
pub mod host;
#[doc(hidden)]
pub mod instructions;
mod interpreter;
pub mod journal;
pub mod memory;
pub mod message;
pub mod opcode;
pub mod revision;
pub mod stack;
mod staging;
mod state;
pub mod trace;
pub mod word;

#[cfg(feature = "util")]
pub mod util;
