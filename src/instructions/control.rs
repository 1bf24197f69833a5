//! `RETURN`/`REVERT`'s shared memory-to-output-data copy, `JUMP`/`JUMPI`'s
//! destination validation, and the calldata accessors.

use crate::{error::ErrorCode, interpreter::JumpdestMap, state::ExecutionState};
use ethereum_types::U256;

/// Copies the memory region `(offset, size)` on top of the stack into
/// `state.output_data`, growing memory (and charging gas) as needed. Used
/// by both `RETURN` and `REVERT` — the two opcodes differ only in the
/// error code their caller assigns afterward.
pub(crate) fn ret(state: &mut ExecutionState) -> Result<(), ErrorCode> {
    let offset = state.stack.pop()?;
    let size = state.stack.pop()?;

    if size.is_zero() {
        state.output_data = Default::default();
        return Ok(());
    }
    if offset > U256::from(usize::MAX) || size > U256::from(usize::MAX) {
        return Err(ErrorCode::MemoryLimit);
    }
    let offset = offset.as_usize();
    let size = size.as_usize();

    let data = state.memory.read(offset, size, &mut state.gas_left)?;
    state.output_data = data.to_vec().into();
    Ok(())
}

/// Pops the jump target and validates it against the precomputed jumpdest
/// map, returning the new program counter.
pub(crate) fn op_jump(
    state: &mut ExecutionState,
    jumpdest_map: &JumpdestMap,
) -> Result<usize, ErrorCode> {
    let dst = state.stack.pop()?;
    if dst > U256::from(usize::MAX) || !jumpdest_map.contains(dst.as_usize()) {
        return Err(ErrorCode::InvalidJump);
    }
    Ok(dst.as_usize())
}

pub(crate) fn calldataload(state: &mut ExecutionState) -> Result<(), ErrorCode> {
    let index = state.stack.pop()?;
    let (data, available) = state.message.input_slice(index, 32);

    let mut buf = [0u8; 32];
    buf[..available].copy_from_slice(data);
    state.stack.push(U256::from_big_endian(&buf))
}

pub(crate) fn calldatasize(state: &mut ExecutionState) -> Result<(), ErrorCode> {
    state.stack.push(state.message.input_data.len().into())
}
