//! Touched-state journal: per-instance bookkeeping of every account and
//! storage slot an instance has read or written, with snapshot/revert and
//! the EIP-2929/EIP-2200 gas rules layered on top (spec §4.4).
//!
//! Grounded on the teacher's `host::{AccessStatus, StorageStatus}` and the
//! cold/warm + tri-value arithmetic inlined in `instructions/external.rs`'s
//! `sload!`/`sstore!`/`selfdestruct!` macros, restructured as a plain
//! synchronous journal rather than yielded host round-trips. The nested
//! layer-stack shape is grounded on the reference journaled `InnerEvmContext`
//! (`load_account`/`sload`/`sstore`/`selfdestruct`) pattern.

use ethereum_types::{Address, H256, U256};
use std::collections::{HashMap, HashSet};

/// State access status (EIP-2929).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessStatus {
    Cold,
    Warm,
}

impl Default for AccessStatus {
    fn default() -> Self {
        Self::Cold
    }
}

/// The EIP-2200 classification of one `SSTORE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageStatus {
    /// The value of a storage item is left unchanged: 0 -> 0 or X -> X.
    Unchanged,
    /// The value of a storage item is modified: X -> Y.
    Modified,
    /// The value of a storage item is modified after a prior modification: X -> Y -> Z.
    ModifiedAgain,
    /// A new storage item is added: 0 -> X.
    Added,
    /// A storage item is deleted: X -> 0.
    Deleted,
}

/// Additional gas owed on top of the opcode's base cost for a cold access.
pub const COLD_SLOAD_COST: u16 = 2100;
pub const COLD_ACCOUNT_ACCESS_COST: u16 = 2600;
pub const WARM_STORAGE_READ_COST: u16 = 100;
pub const ADDITIONAL_COLD_ACCOUNT_ACCESS_COST: u16 =
    COLD_ACCOUNT_ACCESS_COST - WARM_STORAGE_READ_COST;
pub const ADDITIONAL_COLD_SLOAD_COST: u16 = COLD_SLOAD_COST - WARM_STORAGE_READ_COST;

/// Per-slot tri-value state needed for EIP-2200 refund accounting:
/// the value at transaction start, and the value before this particular write.
#[derive(Clone, Copy, Debug, Default)]
struct SlotRecord {
    original: H256,
    current: H256,
}

/// One journal layer: everything mutated since the matching `snapshot()`.
/// Reverting drops the layer; committing merges it into its parent.
#[derive(Clone, Debug, Default)]
struct Layer {
    storage: HashMap<(Address, H256), SlotRecord>,
    warm_accounts: HashSet<Address>,
    warm_storage: HashSet<(Address, H256)>,
    /// Victim address -> beneficiary to credit at settlement.
    destructed: HashMap<Address, Address>,
}

/// Touched-state journal for one top-level instance, shared across its
/// nested call frames via [`Journal::snapshot`]/[`Journal::revert_to`].
#[derive(Clone, Debug, Default)]
pub struct Journal {
    layers: Vec<Layer>,
}

/// Opaque marker returned by [`Journal::snapshot`]; pass back to
/// [`Journal::revert_to`] or [`Journal::commit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint(usize);

impl Journal {
    pub fn new() -> Self {
        Self {
            layers: vec![Layer::default()],
        }
    }

    /// Opens a new layer and returns a checkpoint identifying it.
    pub fn snapshot(&mut self) -> Checkpoint {
        self.layers.push(Layer::default());
        Checkpoint(self.layers.len() - 1)
    }

    /// Discards every layer from `checkpoint` onward, undoing their writes.
    /// Cold/warm access-list entries recorded in those layers are undone
    /// along with everything else, so a reverted frame's accesses are
    /// observed as cold again by its caller.
    pub fn revert_to(&mut self, checkpoint: Checkpoint) {
        assert!(checkpoint.0 < self.layers.len());
        self.layers.truncate(checkpoint.0);
    }

    /// Merges the layer at `checkpoint` (and anything above it) into its
    /// parent, keeping the writes.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        assert!(checkpoint.0 < self.layers.len());
        while self.layers.len() > checkpoint.0 {
            let top = self.layers.pop().unwrap();
            let parent = self.layers.last_mut().expect("cannot commit the base layer");
            parent.storage.extend(top.storage);
            parent.warm_accounts.extend(top.warm_accounts);
            parent.warm_storage.extend(top.warm_storage);
            parent.destructed.extend(top.destructed);
        }
    }

    fn top(&mut self) -> &mut Layer {
        self.layers.last_mut().expect("journal always has a base layer")
    }

    /// Marks `address` warm, returning the status it had before this call.
    pub fn access_account(&mut self, address: Address) -> AccessStatus {
        if self.layers.iter().any(|l| l.warm_accounts.contains(&address)) {
            return AccessStatus::Warm;
        }
        self.top().warm_accounts.insert(address);
        AccessStatus::Cold
    }

    /// Marks `(address, key)` warm, returning the status it had before this call.
    pub fn access_storage(&mut self, address: Address, key: H256) -> AccessStatus {
        let slot = (address, key);
        if self.layers.iter().any(|l| l.warm_storage.contains(&slot)) {
            return AccessStatus::Warm;
        }
        self.top().warm_storage.insert(slot);
        AccessStatus::Cold
    }

    fn find_slot(&self, address: Address, key: H256) -> Option<SlotRecord> {
        self.layers
            .iter()
            .rev()
            .find_map(|l| l.storage.get(&(address, key)).copied())
    }

    /// Reads the current value of `(address, key)`, defaulting to zero for
    /// a slot never written in this journal (the underlying base-state
    /// value is supplied by the caller as `base`).
    pub fn read_storage(&self, address: Address, key: H256, base: H256) -> H256 {
        self.find_slot(address, key).map_or(base, |s| s.current)
    }

    /// Writes `value` to `(address, key)` and returns its EIP-2200 status.
    /// `base` is the value this slot held before the enclosing transaction
    /// began (supplied once by the caller, typically from a prior
    /// `read_storage` at depth 0).
    pub fn write_storage(
        &mut self,
        address: Address,
        key: H256,
        value: H256,
        base: H256,
    ) -> StorageStatus {
        let existing = self.find_slot(address, key);
        let original = existing.map_or(base, |s| s.original);
        let current = existing.map_or(base, |s| s.current);

        let status = if current == value {
            StorageStatus::Unchanged
        } else if original == current {
            if value.is_zero() {
                StorageStatus::Deleted
            } else if original.is_zero() {
                StorageStatus::Added
            } else {
                StorageStatus::Modified
            }
        } else {
            StorageStatus::ModifiedAgain
        };

        self.top().storage.insert(
            (address, key),
            SlotRecord {
                original,
                current: value,
            },
        );
        status
    }

    /// Gas owed for an `SLOAD`/`BALANCE`/`EXTCODESIZE`-style read, given its
    /// warm/cold status and the opcode's already-charged warm-case base cost.
    pub fn cold_surcharge_storage(status: AccessStatus) -> i64 {
        match status {
            AccessStatus::Cold => i64::from(ADDITIONAL_COLD_SLOAD_COST),
            AccessStatus::Warm => 0,
        }
    }

    pub fn cold_surcharge_account(status: AccessStatus) -> i64 {
        match status {
            AccessStatus::Cold => i64::from(ADDITIONAL_COLD_ACCOUNT_ACCESS_COST),
            AccessStatus::Warm => 0,
        }
    }

    /// Records `address` for destruction, crediting `beneficiary` only at
    /// [`Journal::settle`]. A frame that self-destructs and then reverts
    /// never reaches `settle`, since the record lives on a discarded layer.
    pub fn selfdestruct(&mut self, address: Address, beneficiary: Address) {
        self.top().destructed.insert(address, beneficiary);
        self.top().warm_accounts.insert(beneficiary);
    }

    /// A deep, point-in-time snapshot of every storage slot touched so far
    /// across all live layers, collapsed to each slot's current value. Used
    /// by the tracer to log the touched-account set at each retirement
    /// (spec's "touched-state snapshot"); ordering is deterministic
    /// (address, key) so identical journals always render identically.
    pub fn touched_snapshot(&self) -> Vec<(Address, H256, H256)> {
        let mut merged: std::collections::BTreeMap<(Address, H256), H256> = Default::default();
        for layer in &self.layers {
            for (&slot, rec) in &layer.storage {
                merged.insert(slot, rec.current);
            }
        }
        merged.into_iter().map(|((a, k), v)| (a, k, v)).collect()
    }

    /// Every `(victim, beneficiary)` pair marked for destruction across all
    /// committed layers, in first-recorded order, so the driver can credit
    /// each beneficiary and empty each victim per spec §4.4.5/§9(c). Call
    /// once, after the top-level instance has finished and nothing further
    /// can revert.
    pub fn settle(&self) -> Vec<(Address, Address)> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for layer in &self.layers {
            for (&addr, &beneficiary) in &layer.destructed {
                if seen.insert(addr) {
                    out.push((addr, beneficiary));
                }
            }
        }
        out
    }
}

/// Converts a stack word to a storage key, matching `H256(word.into())`.
pub fn word_to_key(w: U256) -> H256 {
    let mut buf = [0u8; 32];
    w.to_big_endian(&mut buf);
    H256(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn key(n: u64) -> H256 {
        word_to_key(n.into())
    }

    fn val(n: u64) -> H256 {
        word_to_key(n.into())
    }

    #[test]
    fn first_account_access_is_cold_then_warm() {
        let mut j = Journal::new();
        assert_eq!(j.access_account(addr(1)), AccessStatus::Cold);
        assert_eq!(j.access_account(addr(1)), AccessStatus::Warm);
    }

    #[test]
    fn storage_status_tracks_tri_value_transitions() {
        let mut j = Journal::new();
        let a = addr(1);
        let k = key(1);

        // original = current = 0 (base), write 5 -> Added.
        assert!(matches!(
            j.write_storage(a, k, val(5), H256::zero()),
            StorageStatus::Added
        ));
        // 5 -> 5 -> Unchanged.
        assert!(matches!(
            j.write_storage(a, k, val(5), H256::zero()),
            StorageStatus::Unchanged
        ));
        // 5 -> 7, original still 0 -> Modified.
        assert!(matches!(
            j.write_storage(a, k, val(7), H256::zero()),
            StorageStatus::Modified
        ));
        // 7 -> 9, original (0) != current (7) -> ModifiedAgain.
        assert!(matches!(
            j.write_storage(a, k, val(9), H256::zero()),
            StorageStatus::ModifiedAgain
        ));
        // 9 -> 0, original (0) != current (9) -> ModifiedAgain (not Deleted,
        // since the slot wasn't unchanged-from-original).
        assert!(matches!(
            j.write_storage(a, k, H256::zero(), H256::zero()),
            StorageStatus::ModifiedAgain
        ));
    }

    #[test]
    fn write_then_delete_from_untouched_original_is_deleted() {
        let mut j = Journal::new();
        let a = addr(2);
        let k = key(2);
        assert!(matches!(
            j.write_storage(a, k, H256::zero(), val(3)),
            StorageStatus::Deleted
        ));
    }

    #[test]
    fn revert_undoes_writes_and_warmth() {
        let mut j = Journal::new();
        let a = addr(1);
        let k = key(1);

        j.access_account(a);
        let cp = j.snapshot();
        j.write_storage(a, k, val(42), H256::zero());
        j.access_storage(a, k);
        assert_eq!(j.read_storage(a, k, H256::zero()), val(42));

        j.revert_to(cp);
        assert_eq!(j.read_storage(a, k, H256::zero()), H256::zero());
        // Storage access from the reverted frame doesn't linger as warm.
        assert_eq!(j.access_storage(a, k), AccessStatus::Cold);
        // But the pre-snapshot account access survives the revert.
        assert_eq!(j.access_account(a), AccessStatus::Warm);
    }

    #[test]
    fn commit_keeps_writes_from_a_successful_nested_frame() {
        let mut j = Journal::new();
        let a = addr(1);
        let k = key(1);

        let cp = j.snapshot();
        j.write_storage(a, k, val(9), H256::zero());
        j.commit(cp);

        assert_eq!(j.read_storage(a, k, H256::zero()), val(9));
    }

    #[test]
    fn selfdestruct_settles_once_and_ignores_reverted_frames() {
        let mut j = Journal::new();
        let keep = addr(10);
        let reverted = addr(20);
        let beneficiary = addr(99);

        j.selfdestruct(keep, beneficiary);

        let cp = j.snapshot();
        j.selfdestruct(reverted, beneficiary);
        j.revert_to(cp);

        assert_eq!(j.settle(), vec![(keep, beneficiary)]);
    }
}
