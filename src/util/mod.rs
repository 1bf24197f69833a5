//! Test-only helpers: a bytecode builder, an in-memory [`Host`](crate::host::Host), and a
//! fluent execution tester, gated behind the `util` feature the way the teacher gates its own.

pub mod bytecode;
pub mod mocked_host;
pub mod tester;

pub use bytecode::{Bytecode, CallInstruction};
pub use mocked_host::MockedHost;
pub use tester::EvmTester;
