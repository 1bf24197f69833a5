//! An in-memory [`Host`] for tests and the batch demo CLI.
//!
//! Grounded on the teacher's `host::Host`/`DummyHost` pair, but backed by a
//! real account map instead of `bail!("unsupported")`, and routed through
//! the crate's own [`Journal`] for access-list and storage-status bookkeeping
//! rather than reimplementing EIP-2929/EIP-2200 bookkeeping a second time.

use crate::{
    host::{CallOutput, Host},
    journal::{AccessStatus, Journal, StorageStatus},
    message::{Message, TxContext},
};
use ethereum_types::{Address, H256, U256};
use std::collections::HashMap;

/// One mocked account's balance, code and nonce. Storage itself lives in the
/// [`Journal`], which already tracks warm/cold access and per-call reverts.
#[derive(Clone, Debug, Default)]
pub struct MockedAccount {
    pub nonce: u64,
    pub balance: U256,
    pub code: bytes::Bytes,
    /// This account's storage as it stood before the current call, i.e. the
    /// `base` value the journal diffs every write against for EIP-2200
    /// tri-value accounting.
    pub storage: HashMap<H256, H256>,
}

/// A recorded `emit_log` call, kept for test assertions.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub address: Address,
    pub data: Vec<u8>,
    pub topics: Vec<H256>,
}

/// A recorded nested `call`, kept for test assertions.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub message: Message,
}

/// An in-memory [`Host`] implementation. Every nested `call()` returns
/// whatever [`MockedHost::call_result`] is currently set to, rather than
/// actually interpreting the callee's code — tests that need recursive
/// execution set it per-case.
#[derive(Clone, Debug)]
pub struct MockedHost {
    pub accounts: HashMap<Address, MockedAccount>,
    pub journal: Journal,
    pub tx_context: TxContext,
    pub block_hashes: HashMap<u64, H256>,
    pub call_result: CallOutput,
    pub recorded_calls: Vec<RecordedCall>,
    pub recorded_logs: Vec<LogEntry>,
    pub selfdestructs: Vec<(Address, Address)>,
    /// Every address passed to `access_account`, in call order, regardless
    /// of whether it was already warm — lets tests assert the exact
    /// sequence of EIP-2929 touches an opcode performs.
    pub account_accesses: Vec<Address>,
}

impl Default for MockedHost {
    fn default() -> Self {
        Self {
            accounts: HashMap::new(),
            journal: Journal::new(),
            tx_context: TxContext {
                block_coinbase: Address::zero(),
                block_number: 0,
                block_timestamp: 0,
                block_gas_limit: 0,
                block_difficulty: U256::zero(),
                chain_id: U256::zero(),
                block_base_fee: U256::zero(),
            },
            block_hashes: HashMap::new(),
            call_result: CallOutput {
                success: true,
                gas_left: 0,
                output_data: bytes::Bytes::new(),
                create_address: None,
            },
            recorded_calls: Vec::new(),
            recorded_logs: Vec::new(),
            selfdestructs: Vec::new(),
            account_accesses: Vec::new(),
        }
    }
}

impl MockedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&mut self, address: Address, balance: impl Into<U256>) {
        self.accounts.entry(address).or_default().balance = balance.into();
    }

    pub fn set_code(&mut self, address: Address, code: impl Into<bytes::Bytes>) {
        self.accounts.entry(address).or_default().code = code.into();
    }
}

impl Host for MockedHost {
    fn account_exists(&self, address: Address) -> bool {
        self.accounts.contains_key(&address)
    }

    fn get_storage(&self, address: Address, key: H256) -> H256 {
        let base = self
            .accounts
            .get(&address)
            .and_then(|a| a.storage.get(&key))
            .copied()
            .unwrap_or_default();
        self.journal.read_storage(address, key, base)
    }

    fn set_storage(&mut self, address: Address, key: H256, value: H256) -> StorageStatus {
        let base = self
            .accounts
            .get(&address)
            .and_then(|a| a.storage.get(&key))
            .copied()
            .unwrap_or_default();
        self.journal.write_storage(address, key, value, base)
    }

    fn get_balance(&self, address: Address) -> U256 {
        self.accounts.get(&address).map_or(U256::zero(), |a| a.balance)
    }

    fn get_code_size(&self, address: Address) -> U256 {
        self.accounts
            .get(&address)
            .map_or(U256::zero(), |a| U256::from(a.code.len()))
    }

    fn get_code_hash(&self, address: Address) -> H256 {
        use sha3::{Digest, Keccak256};
        self.accounts.get(&address).map_or(H256::zero(), |a| {
            H256::from_slice(&Keccak256::digest(&a.code))
        })
    }

    fn copy_code(&self, address: Address, offset: usize, buffer: &mut [u8]) -> usize {
        let Some(account) = self.accounts.get(&address) else {
            return 0;
        };
        if offset >= account.code.len() {
            return 0;
        }
        let n = std::cmp::min(buffer.len(), account.code.len() - offset);
        buffer[..n].copy_from_slice(&account.code[offset..offset + n]);
        n
    }

    fn selfdestruct(&mut self, address: Address, beneficiary: Address) {
        let balance = self.accounts.get(&address).map_or(U256::zero(), |a| a.balance);
        self.accounts.entry(beneficiary).or_default().balance += balance;
        self.accounts.entry(address).or_default().balance = U256::zero();
        self.selfdestructs.push((address, beneficiary));
    }

    fn call(&mut self, msg: &Message) -> CallOutput {
        self.recorded_calls.push(RecordedCall { message: msg.clone() });
        self.call_result.clone()
    }

    fn get_tx_context(&self) -> TxContext {
        self.tx_context.clone()
    }

    fn get_block_hash(&self, block_number: u64) -> H256 {
        self.block_hashes.get(&block_number).copied().unwrap_or_default()
    }

    fn emit_log(&mut self, address: Address, data: &[u8], topics: &[H256]) {
        self.recorded_logs.push(LogEntry {
            address,
            data: data.to_vec(),
            topics: topics.to_vec(),
        });
    }

    fn access_account(&mut self, address: Address) -> AccessStatus {
        self.account_accesses.push(address);
        self.journal.access_account(address)
    }

    fn access_storage(&mut self, address: Address, key: H256) -> AccessStatus {
        self.journal.access_storage(address, key)
    }

    fn touched_snapshot(&self) -> Vec<(Address, H256, H256)> {
        self.journal.touched_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_account_has_zero_balance_and_does_not_exist() {
        let host = MockedHost::new();
        let addr = Address::repeat_byte(0x41);
        assert_eq!(host.get_balance(addr), U256::zero());
        assert!(!host.account_exists(addr));
    }

    #[test]
    fn set_balance_makes_the_account_exist() {
        let mut host = MockedHost::new();
        let addr = Address::repeat_byte(0x41);
        host.set_balance(addr, 100u64);
        assert!(host.account_exists(addr));
        assert_eq!(host.get_balance(addr), U256::from(100));
    }

    #[test]
    fn selfdestruct_moves_balance_to_beneficiary() {
        let mut host = MockedHost::new();
        let victim = Address::repeat_byte(1);
        let beneficiary = Address::repeat_byte(2);
        host.set_balance(victim, 50u64);
        host.selfdestruct(victim, beneficiary);
        assert_eq!(host.get_balance(victim), U256::zero());
        assert_eq!(host.get_balance(beneficiary), U256::from(50));
    }

    #[test]
    fn storage_round_trips_through_the_journal() {
        let mut host = MockedHost::new();
        let addr = Address::repeat_byte(1);
        let key = H256::repeat_byte(2);
        let value = H256::repeat_byte(3);
        host.set_storage(addr, key, value);
        assert_eq!(host.get_storage(addr, key), value);
    }
}
