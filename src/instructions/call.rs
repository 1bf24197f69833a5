//! `CALL`/`CALLCODE`/`DELEGATECALL`/`STATICCALL` and `CREATE`/`CREATE2`.
//!
//! Grounded on the teacher's `do_call!`/`do_create!` macros, converted from
//! host-interrupt round-trips to a single synchronous [`Host::call`].

use crate::{
    error::ErrorCode,
    host::Host,
    journal::ADDITIONAL_COLD_ACCOUNT_ACCESS_COST,
    message::{CallKind, Message},
    revision::Revision,
    state::ExecutionState,
    word,
};
use bytes::Bytes;
use ethereum_types::{H256, U256};
use std::cmp::min;

fn clamp_region(offset: U256, size: U256) -> Result<(usize, usize), ErrorCode> {
    if size.is_zero() {
        return Ok((0, 0));
    }
    if offset > U256::from(crate::memory::MAX_BUFFER_SIZE) || size > U256::from(crate::memory::MAX_BUFFER_SIZE) {
        return Err(ErrorCode::MemoryLimit);
    }
    Ok((offset.as_usize(), size.as_usize()))
}

fn clamp_gas(requested: U256) -> i64 {
    if requested > U256::from(i64::MAX) {
        i64::MAX
    } else {
        requested.as_u64() as i64
    }
}

/// `CALL`/`CALLCODE`/`DELEGATECALL`/`STATICCALL`. `kind` identifies which;
/// `STATICCALL` additionally forces the nested frame static regardless of
/// the caller's own `is_static`.
pub(crate) fn call<H: Host>(
    state: &mut ExecutionState,
    host: &mut H,
    kind: CallKind,
) -> Result<(), ErrorCode> {
    let is_staticcall = matches!(kind, CallKind::StaticCall);
    let is_delegatecall = matches!(kind, CallKind::DelegateCall);

    let gas = state.stack.pop()?;
    let dst = word::to_address(state.stack.pop()?);
    let value = if is_staticcall || is_delegatecall {
        U256::zero()
    } else {
        state.stack.pop()?
    };
    let has_value = !value.is_zero();
    let input_offset = state.stack.pop()?;
    let input_size = state.stack.pop()?;
    let output_offset = state.stack.pop()?;
    let output_size = state.stack.pop()?;

    state.stack.push(U256::zero())?; // Assume failure; overwritten below on success.

    if state.revision >= Revision::Berlin
        && host.access_account(dst) == crate::journal::AccessStatus::Cold
    {
        state.gas_left -= i64::from(ADDITIONAL_COLD_ACCOUNT_ACCESS_COST);
        if state.gas_left < 0 {
            return Err(ErrorCode::OutOfGas);
        }
    }

    let (in_off, in_len) = clamp_region(input_offset, input_size)?;
    let (out_off, out_len) = clamp_region(output_offset, output_size)?;

    state.memory.ensure(in_off, in_len, &mut state.gas_left)?;
    state.memory.ensure(out_off, out_len, &mut state.gas_left)?;
    let input_data: Bytes = state.memory.as_slice()[in_off..in_off + in_len].to_vec().into();

    let mut msg = Message {
        kind,
        is_static: is_staticcall || state.message.is_static,
        depth: state.message.depth + 1,
        destination: dst,
        sender: if is_delegatecall {
            state.message.sender
        } else {
            state.message.destination
        },
        gas: i64::MAX,
        value: if is_delegatecall { state.message.value } else { value },
        input_data,
        origin: state.message.origin,
        gas_price: state.message.gas_price,
    };

    let mut cost: i64 = if has_value { 9000 } else { 0 };

    if matches!(kind, CallKind::Call) {
        if has_value && state.message.is_static {
            return Err(ErrorCode::StaticViolation);
        }
        if (has_value || state.revision < Revision::Spurious) && !host.account_exists(dst) {
            cost += 25000;
        }
    }
    state.gas_left -= cost;
    if state.gas_left < 0 {
        return Err(ErrorCode::OutOfGas);
    }

    let requested_gas = clamp_gas(gas);
    if requested_gas < msg.gas {
        msg.gas = requested_gas;
    }

    if state.revision >= Revision::Tangerine {
        msg.gas = min(msg.gas, state.gas_left - state.gas_left / 64);
    } else if msg.gas > state.gas_left {
        return Err(ErrorCode::OutOfGas);
    }

    if has_value {
        msg.gas += 2300; // Call stipend.
        state.gas_left += 2300;
    }

    state.return_data = Bytes::new();

    if state.message.depth < crate::message::MAX_CALL_DEPTH
        && !(has_value && host.get_balance(state.message.destination) < value)
    {
        let msg_gas = msg.gas;
        let result = host.call(&msg);
        state.return_data = result.output_data.clone();
        *state.stack.get_mut(0)? = if result.success { U256::one() } else { U256::zero() };

        if out_len > 0 {
            let copy_size = min(out_len, result.output_data.len());
            if copy_size > 0 {
                state.memory.as_mut_slice()[out_off..out_off + copy_size]
                    .copy_from_slice(&result.output_data[..copy_size]);
            }
        }

        let gas_used = msg_gas - result.gas_left;
        state.gas_left -= gas_used;
    }

    Ok(())
}

/// `CREATE`/`CREATE2`.
pub(crate) fn create<H: Host>(
    state: &mut ExecutionState,
    host: &mut H,
    is_create2: bool,
) -> Result<(), ErrorCode> {
    if state.message.is_static {
        return Err(ErrorCode::StaticViolation);
    }

    let endowment = state.stack.pop()?;
    let init_code_offset = state.stack.pop()?;
    let init_code_size = state.stack.pop()?;

    let (code_off, code_len) = clamp_region(init_code_offset, init_code_size)?;
    state.memory.ensure(code_off, code_len, &mut state.gas_left)?;

    let call_kind = if is_create2 {
        let salt = state.stack.pop()?;

        if code_len > 0 {
            let salt_cost = crate::memory::num_words(code_len) as i64 * 6;
            state.gas_left -= salt_cost;
            if state.gas_left < 0 {
                return Err(ErrorCode::OutOfGas);
            }
        }

        CallKind::Create2 {
            salt: H256(word::to_be_bytes(salt)),
        }
    } else {
        CallKind::Create
    };

    state.stack.push(U256::zero())?;
    state.return_data = Bytes::new();

    if state.message.depth < crate::message::MAX_CALL_DEPTH
        && !(!endowment.is_zero() && host.get_balance(state.message.destination) < endowment)
    {
        let msg = Message {
            gas: if state.revision >= Revision::Tangerine {
                state.gas_left - state.gas_left / 64
            } else {
                state.gas_left
            },
            is_static: false,
            destination: ethereum_types::Address::zero(),
            kind: call_kind,
            input_data: if code_len > 0 {
                state.memory.as_slice()[code_off..code_off + code_len].to_vec().into()
            } else {
                Bytes::new()
            },
            sender: state.message.destination,
            depth: state.message.depth + 1,
            value: endowment,
            origin: state.message.origin,
            gas_price: state.message.gas_price,
        };
        let msg_gas = msg.gas;
        let result = host.call(&msg);
        state.gas_left -= msg_gas - result.gas_left;

        state.return_data = result.output_data;
        if result.success {
            *state.stack.get_mut(0)? =
                word::from_address(result.create_address.expect("successful create reports an address"));
        }
    }

    Ok(())
}
