//! The synchronous world-state collaborator an instance calls out to for
//! anything outside its own stack/memory/journal (account balances, code,
//! other instances' storage, logs, nested calls).
//!
//! Grounded on the teacher's `host::Host`, with every method made
//! synchronous: this spec's interpreter runs in-process and never blocks on
//! a remote host, so the teacher's `#[async_trait]` resumability has no
//! reason to exist here (see DESIGN.md for the dependency this drops).

use crate::{
    journal::{AccessStatus, StorageStatus},
    message::{Message, TxContext},
};
use ethereum_types::{Address, H256, U256};

/// Output of a nested call, mirroring the teacher's `common::Output`.
#[derive(Clone, Debug, PartialEq)]
pub struct CallOutput {
    pub success: bool,
    pub gas_left: i64,
    pub output_data: bytes::Bytes,
    pub create_address: Option<Address>,
}

/// Everything an instance needs from outside its own frame.
pub trait Host {
    /// Whether `address` has any balance, code, or nonce.
    fn account_exists(&self, address: Address) -> bool;
    /// Value of a storage key, `H256::zero()` if unset.
    fn get_storage(&self, address: Address, key: H256) -> H256;
    /// Sets a storage key, returning its EIP-2200 status.
    fn set_storage(&mut self, address: Address, key: H256, value: H256) -> StorageStatus;
    /// Balance of `address`, zero if it does not exist.
    fn get_balance(&self, address: Address) -> U256;
    /// Size in bytes of `address`'s code, zero if it does not exist.
    fn get_code_size(&self, address: Address) -> U256;
    /// Hash of `address`'s code, zero if it does not exist.
    fn get_code_hash(&self, address: Address) -> H256;
    /// Copies up to `buffer.len()` bytes of `address`'s code starting at
    /// `offset`, returning the number of bytes actually copied.
    fn copy_code(&self, address: Address, offset: usize, buffer: &mut [u8]) -> usize;
    /// Registers `address` for destruction, beneficiary `beneficiary`.
    fn selfdestruct(&mut self, address: Address, beneficiary: Address);
    /// Executes a nested call described by `msg`.
    fn call(&mut self, msg: &Message) -> CallOutput;
    /// The ambient transaction/block context.
    fn get_tx_context(&self) -> TxContext;
    /// Hash of block `block_number`, `H256::zero()` if out of the queryable window.
    fn get_block_hash(&self, block_number: u64) -> H256;
    /// Appends a log entry.
    fn emit_log(&mut self, address: Address, data: &[u8], topics: &[H256]);
    /// Marks `address` warm, returning its status beforehand.
    fn access_account(&mut self, address: Address) -> AccessStatus;
    /// Marks `(address, key)` warm, returning its status beforehand.
    fn access_storage(&mut self, address: Address, key: H256) -> AccessStatus;
    /// Every storage slot touched so far, for the tracer's per-step
    /// touched-state snapshot. Hosts with no backing journal (or that don't
    /// care to pay the snapshot cost) may leave this empty.
    fn touched_snapshot(&self) -> Vec<(Address, H256, H256)> {
        Vec::new()
    }
}

/// A host that panics on every call; useful for exercising instructions that
/// provably never reach the host (pure stack/memory opcodes).
#[derive(Default)]
pub struct DummyHost;

impl Host for DummyHost {
    fn account_exists(&self, _: Address) -> bool {
        unimplemented!("DummyHost has no world state")
    }
    fn get_storage(&self, _: Address, _: H256) -> H256 {
        unimplemented!("DummyHost has no world state")
    }
    fn set_storage(&mut self, _: Address, _: H256, _: H256) -> StorageStatus {
        unimplemented!("DummyHost has no world state")
    }
    fn get_balance(&self, _: Address) -> U256 {
        unimplemented!("DummyHost has no world state")
    }
    fn get_code_size(&self, _: Address) -> U256 {
        unimplemented!("DummyHost has no world state")
    }
    fn get_code_hash(&self, _: Address) -> H256 {
        unimplemented!("DummyHost has no world state")
    }
    fn copy_code(&self, _: Address, _: usize, _: &mut [u8]) -> usize {
        unimplemented!("DummyHost has no world state")
    }
    fn selfdestruct(&mut self, _: Address, _: Address) {
        unimplemented!("DummyHost has no world state")
    }
    fn call(&mut self, _: &Message) -> CallOutput {
        unimplemented!("DummyHost has no world state")
    }
    fn get_tx_context(&self) -> TxContext {
        unimplemented!("DummyHost has no world state")
    }
    fn get_block_hash(&self, _: u64) -> H256 {
        unimplemented!("DummyHost has no world state")
    }
    fn emit_log(&mut self, _: Address, _: &[u8], _: &[H256]) {
        unimplemented!("DummyHost has no world state")
    }
    fn access_account(&mut self, _: Address) -> AccessStatus {
        unimplemented!("DummyHost has no world state")
    }
    fn access_storage(&mut self, _: Address, _: H256) -> AccessStatus {
        unimplemented!("DummyHost has no world state")
    }
}
