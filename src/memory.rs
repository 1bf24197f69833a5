//! Growable, word-addressable byte memory (spec §4.3).
//!
//! Generalizes the teacher's ad hoc `verify_memory_region[_u64]` free
//! functions (`instructions/memory.rs`) into a reusable struct: the cost
//! formula and growth behavior are unchanged, but gas can now be queried
//! (`expansion_cost`) before committing a mutation.

use crate::error::ErrorCode;

/// Maximum single memory access size the EVM allows to be addressed at once.
pub const MAX_BUFFER_SIZE: u32 = u32::MAX;

const WORD_SIZE: u64 = 32;

/// Number of 32-byte words needed to cover `size_in_bytes`.
pub fn num_words(size_in_bytes: usize) -> u64 {
    (size_in_bytes as u64 + (WORD_SIZE - 1)) / WORD_SIZE
}

/// Pure EVM memory-expansion gas cost for a buffer `n` words long.
fn word_cost(words: u64) -> i64 {
    (3 * words + words * words / 512) as i64
}

/// Byte-addressable scratch memory for one call frame.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    buf: Vec<u8>,
    /// The byte cursor ever touched, rounded up to a word boundary.
    len_bytes: usize,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(4 * 1024),
            len_bytes: 0,
        }
    }

    pub fn len_bytes(&self) -> usize {
        self.len_bytes
    }

    pub fn len_words(&self) -> u64 {
        num_words(self.len_bytes)
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The gas delta `C(new) - C(old)` for growing to cover `new_len_bytes`,
    /// without mutating. Returns 0 if no growth is needed.
    pub fn expansion_cost(&self, new_len_bytes: usize) -> i64 {
        if new_len_bytes <= self.len_bytes {
            return 0;
        }
        let new_words = num_words(new_len_bytes);
        let current_words = num_words(self.len_bytes);
        word_cost(new_words) - word_cost(current_words)
    }

    /// Grows backing storage (by doubling, at minimum) so that
    /// `offset + size` is addressable, charging `gas_left` for the
    /// expansion. `len_bytes` only ever increases.
    pub fn ensure(
        &mut self,
        offset: usize,
        size: usize,
        gas_left: &mut i64,
    ) -> Result<(), ErrorCode> {
        if size == 0 {
            return Ok(());
        }
        let end = offset
            .checked_add(size)
            .filter(|&e| e <= MAX_BUFFER_SIZE as usize)
            .ok_or(ErrorCode::MemoryLimit)?;

        if end > self.len_bytes {
            let cost = self.expansion_cost(end);
            *gas_left -= cost;
            if *gas_left < 0 {
                return Err(ErrorCode::OutOfGas);
            }

            let new_len = (num_words(end) * WORD_SIZE) as usize;
            if new_len > self.buf.len() {
                // Reserve in doubling increments to amortise repeated small
                // expansions, but only ever expose `new_len` logical bytes.
                let target_capacity = new_len.max(self.buf.capacity().saturating_mul(2));
                self.buf.reserve(target_capacity - self.buf.len());
                self.buf.resize(new_len, 0);
            }
            self.len_bytes = new_len;
        }
        Ok(())
    }

    /// Reads `len` bytes at `offset`, growing (and charging for) memory first.
    pub fn read(
        &mut self,
        offset: usize,
        len: usize,
        gas_left: &mut i64,
    ) -> Result<&[u8], ErrorCode> {
        self.ensure(offset, len, gas_left)?;
        Ok(&self.buf[offset..offset + len])
    }

    /// Writes `data` at `offset`, growing (and charging for) memory first.
    pub fn write(
        &mut self,
        offset: usize,
        data: &[u8],
        gas_left: &mut i64,
    ) -> Result<(), ErrorCode> {
        self.ensure(offset, data.len(), gas_left)?;
        self.buf[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Copies `len` bytes from `src` to `dst` within this memory, supporting overlap.
    pub fn copy(
        &mut self,
        dst: usize,
        src: usize,
        len: usize,
        gas_left: &mut i64,
    ) -> Result<(), ErrorCode> {
        if len == 0 {
            return Ok(());
        }
        let max_end = dst.max(src).checked_add(len).ok_or(ErrorCode::MemoryLimit)?;
        self.ensure(0, max_end, gas_left)?;
        self.buf.copy_within(src..src + len, dst);
        Ok(())
    }

    /// Direct read-only access to the backing buffer, for instruction use
    /// once the caller has already charged gas via [`Memory::ensure`].
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len_bytes]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let len = self.len_bytes;
        &mut self.buf[..len]
    }

    /// A by-value deep copy suitable for a trace entry snapshot.
    pub fn snapshot(&self) -> Vec<u8> {
        self.buf[..self.len_bytes].to_vec()
    }
}
