//! Opcodes that read the message/transaction/block context, storage, or
//! another account's balance/code, plus `LOG*` and `SELFDESTRUCT`.
//!
//! Grounded on the teacher's `balance!`/`extcodesize!`/`push_txcontext!`/
//! `selfbalance!`/`blockhash!`/`do_log!`/`sload!`/`sstore!`/`selfdestruct!`
//! macros, converted from host-interrupt round-trips to direct calls on a
//! synchronous [`Host`].
use crate::{
    error::ErrorCode,
    host::Host,
    journal::{AccessStatus, StorageStatus},
    message::TxContext,
    state::ExecutionState,
    word,
};
use arrayvec::ArrayVec;
use ethereum_types::{H256, U256};

pub(crate) fn address(state: &mut ExecutionState) -> Result<(), ErrorCode> {
    state.stack.push(word::from_address(state.message.destination))
}

pub(crate) fn caller(state: &mut ExecutionState) -> Result<(), ErrorCode> {
    state.stack.push(word::from_address(state.message.sender))
}

pub(crate) fn callvalue(state: &mut ExecutionState) -> Result<(), ErrorCode> {
    state.stack.push(state.message.value)
}

fn charge_cold_account_surcharge<H: Host>(
    state: &mut ExecutionState,
    host: &mut H,
    address: ethereum_types::Address,
) -> Result<(), ErrorCode> {
    if state.revision >= crate::revision::Revision::Berlin
        && host.access_account(address) == AccessStatus::Cold
    {
        state.gas_left -= i64::from(crate::journal::ADDITIONAL_COLD_ACCOUNT_ACCESS_COST);
        if state.gas_left < 0 {
            return Err(ErrorCode::OutOfGas);
        }
    }
    Ok(())
}

pub(crate) fn balance<H: Host>(state: &mut ExecutionState, host: &mut H) -> Result<(), ErrorCode> {
    let address = word::to_address(state.stack.pop()?);
    charge_cold_account_surcharge(state, host, address)?;
    state.stack.push(host.get_balance(address))
}

pub(crate) fn extcodesize<H: Host>(state: &mut ExecutionState, host: &mut H) -> Result<(), ErrorCode> {
    let address = word::to_address(state.stack.pop()?);
    charge_cold_account_surcharge(state, host, address)?;
    state.stack.push(host.get_code_size(address))
}

pub(crate) fn extcodehash<H: Host>(state: &mut ExecutionState, host: &mut H) -> Result<(), ErrorCode> {
    let address = word::to_address(state.stack.pop()?);
    charge_cold_account_surcharge(state, host, address)?;
    let hash = host.get_code_hash(address);
    state.stack.push(U256::from_big_endian(hash.as_bytes()))
}

pub(crate) fn origin_accessor(state: &ExecutionState, _tx_context: &TxContext) -> U256 {
    word::from_address(state.message.origin)
}

pub(crate) fn gasprice_accessor(state: &ExecutionState, _tx_context: &TxContext) -> U256 {
    state.message.gas_price
}

pub(crate) fn coinbase_accessor(_state: &ExecutionState, tx_context: &TxContext) -> U256 {
    word::from_address(tx_context.block_coinbase)
}

pub(crate) fn timestamp_accessor(_state: &ExecutionState, tx_context: &TxContext) -> U256 {
    tx_context.block_timestamp.into()
}

pub(crate) fn number_accessor(_state: &ExecutionState, tx_context: &TxContext) -> U256 {
    tx_context.block_number.into()
}

pub(crate) fn gaslimit_accessor(_state: &ExecutionState, tx_context: &TxContext) -> U256 {
    tx_context.block_gas_limit.into()
}

pub(crate) fn difficulty_accessor(_state: &ExecutionState, tx_context: &TxContext) -> U256 {
    tx_context.block_difficulty
}

pub(crate) fn chainid_accessor(_state: &ExecutionState, tx_context: &TxContext) -> U256 {
    tx_context.chain_id
}

pub(crate) fn basefee_accessor(_state: &ExecutionState, tx_context: &TxContext) -> U256 {
    tx_context.block_base_fee
}

/// Shared plumbing for the nine context-reading opcodes (`ORIGIN`,
/// `GASPRICE`, `COINBASE`, `TIMESTAMP`, `NUMBER`, `GASLIMIT`, `DIFFICULTY`,
/// `CHAINID`, `BASEFEE`): fetch the ambient context once and push whatever
/// `accessor` extracts from it (or from the message itself, for the two
/// that now ride on the frame rather than the host).
pub(crate) fn push_txcontext<H: Host>(
    state: &mut ExecutionState,
    host: &H,
    accessor: fn(&ExecutionState, &TxContext) -> U256,
) -> Result<(), ErrorCode> {
    let tx_context = host.get_tx_context();
    let value = accessor(state, &tx_context);
    state.stack.push(value)
}

pub(crate) fn selfbalance<H: Host>(state: &mut ExecutionState, host: &H) -> Result<(), ErrorCode> {
    state.stack.push(host.get_balance(state.message.destination))
}

pub(crate) fn blockhash<H: Host>(state: &mut ExecutionState, host: &H) -> Result<(), ErrorCode> {
    let number = state.stack.pop()?;

    let upper_bound = host.get_tx_context().block_number;
    let lower_bound = upper_bound.saturating_sub(256);

    let mut header = H256::zero();
    if number <= U256::from(u64::MAX) {
        let n = number.as_u64();
        if (lower_bound..upper_bound).contains(&n) {
            header = host.get_block_hash(n);
        }
    }

    state.stack.push(U256::from_big_endian(header.as_bytes()))
}

pub(crate) fn log<H: Host>(
    state: &mut ExecutionState,
    host: &mut H,
    num_topics: usize,
) -> Result<(), ErrorCode> {
    if state.message.is_static {
        return Err(ErrorCode::StaticViolation);
    }

    let offset = state.stack.pop()?;
    let size = state.stack.pop()?;

    let data = if size.is_zero() {
        Vec::new()
    } else {
        if offset > U256::from(u32::MAX) || size > U256::from(u32::MAX) {
            return Err(ErrorCode::MemoryLimit);
        }
        let offset = offset.as_usize();
        let size = size.as_usize();

        let cost = crate::memory::num_words(size) as i64 * 8;
        state.gas_left -= cost;
        if state.gas_left < 0 {
            return Err(ErrorCode::OutOfGas);
        }

        state.memory.read(offset, size, &mut state.gas_left)?.to_vec()
    };

    // Topics are pushed in LOG's stack order (top of stack is the first topic).
    let mut topics: ArrayVec<H256, 4> = ArrayVec::new();
    for _ in 0..num_topics {
        topics.push(crate::journal::word_to_key(state.stack.pop()?));
    }

    host.emit_log(state.message.destination, &data, &topics);
    Ok(())
}

pub(crate) fn sload<H: Host>(state: &mut ExecutionState, host: &mut H) -> Result<(), ErrorCode> {
    let key = crate::journal::word_to_key(state.stack.pop()?);

    if state.revision >= crate::revision::Revision::Berlin
        && host.access_storage(state.message.destination, key) == AccessStatus::Cold
    {
        state.gas_left -= i64::from(crate::journal::ADDITIONAL_COLD_SLOAD_COST);
        if state.gas_left < 0 {
            return Err(ErrorCode::OutOfGas);
        }
    }

    let value = host.get_storage(state.message.destination, key);
    state.stack.push(U256::from_big_endian(value.as_bytes()))
}

pub(crate) fn sstore<H: Host>(state: &mut ExecutionState, host: &mut H) -> Result<(), ErrorCode> {
    use crate::revision::Revision;

    if state.message.is_static {
        return Err(ErrorCode::StaticViolation);
    }
    if state.revision >= Revision::Istanbul && state.gas_left <= 2300 {
        return Err(ErrorCode::OutOfGas);
    }

    let key = crate::journal::word_to_key(state.stack.pop()?);
    let value = crate::journal::word_to_key(state.stack.pop()?);

    let mut cost = 0i64;
    if state.revision >= Revision::Berlin
        && host.access_storage(state.message.destination, key) == AccessStatus::Cold
    {
        cost = i64::from(crate::journal::COLD_SLOAD_COST);
    }

    let status = host.set_storage(state.message.destination, key, value);

    cost += match status {
        StorageStatus::Unchanged | StorageStatus::ModifiedAgain => {
            if state.revision >= Revision::Berlin {
                i64::from(crate::journal::WARM_STORAGE_READ_COST)
            } else if state.revision == Revision::Istanbul {
                800
            } else if state.revision == Revision::Constantinople {
                200
            } else {
                5000
            }
        }
        StorageStatus::Modified | StorageStatus::Deleted => {
            if state.revision >= Revision::Berlin {
                5000 - i64::from(crate::journal::COLD_SLOAD_COST)
            } else {
                5000
            }
        }
        StorageStatus::Added => 20000,
    };

    state.gas_left -= cost;
    if state.gas_left < 0 {
        return Err(ErrorCode::OutOfGas);
    }
    Ok(())
}

pub(crate) fn selfdestruct<H: Host>(state: &mut ExecutionState, host: &mut H) -> Result<(), ErrorCode> {
    use crate::revision::Revision;

    if state.message.is_static {
        return Err(ErrorCode::StaticViolation);
    }

    let beneficiary = word::to_address(state.stack.pop()?);

    if state.revision >= Revision::Berlin
        && host.access_account(beneficiary) == AccessStatus::Cold
    {
        state.gas_left -= i64::from(crate::journal::COLD_ACCOUNT_ACCESS_COST);
        if state.gas_left < 0 {
            return Err(ErrorCode::OutOfGas);
        }
    }

    if state.revision >= Revision::Tangerine
        && (state.revision == Revision::Tangerine
            || !host.get_balance(state.message.destination).is_zero())
        && !host.account_exists(beneficiary)
    {
        state.gas_left -= 25000;
        if state.gas_left < 0 {
            return Err(ErrorCode::OutOfGas);
        }
    }

    host.selfdestruct(state.message.destination, beneficiary);
    Ok(())
}
