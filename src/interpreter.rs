//! Synchronous bytecode interpreter: jumpdest analysis, per-opcode gas/stack
//! preflight checks, and the opcode dispatch loop (spec §4.1/§4.6).
//!
//! Grounded on the teacher's `interpreter.rs`: `JumpdestMap`/`AnalyzedCode`
//! and `check_requirements` carry over almost unchanged; the big `match op`
//! keeps its shape, with the teacher's `genawaiter` coroutine round-trips to
//! `Host` replaced by direct synchronous calls and a [`TraceEntry`] appended
//! to the [`Tracer`] after every opcode retires.

use crate::{
    error::ErrorCode,
    host::Host,
    instructions::{
        arithmetic, bitwise, boolean, call, control, external,
        instruction_table::{get_baseline_instruction_table, InstructionTable},
        memory, stack_manip,
    },
    message::{CallKind, Message},
    opcode::OpCode,
    revision::Revision,
    stack::Stack,
    state::ExecutionState,
    trace::{TraceEntry, Tracer},
};
use bytes::Bytes;
use ethereum_types::U256;

fn check_requirements(
    instruction_table: &InstructionTable,
    state: &mut ExecutionState,
    op: OpCode,
) -> Result<(), ErrorCode> {
    let metrics = instruction_table[op.to_usize()].ok_or(ErrorCode::InvalidOpcode)?;

    state.gas_left -= metrics.gas_cost as i64;
    if state.gas_left < 0 {
        return Err(ErrorCode::OutOfGas);
    }

    let stack_size = state.stack.len();
    if stack_size == Stack::limit() {
        if metrics.can_overflow_stack {
            return Err(ErrorCode::StackOverflow);
        }
    } else if stack_size < metrics.stack_height_required.into() {
        return Err(ErrorCode::StackUnderflow);
    }

    Ok(())
}

/// A precomputed map of valid `JUMP`/`JUMPI` destinations, indexed by
/// program counter.
#[derive(Clone, Debug)]
pub struct JumpdestMap(Vec<bool>);

impl JumpdestMap {
    pub fn contains(&self, dst: usize) -> bool {
        dst < self.0.len() && self.0[dst]
    }
}

/// What a single opcode's dispatch did to control flow. Separate from
/// [`ErrorCode`] so a clean `Ok` can still mean "stop" (`STOP`/`RETURN`/
/// `SELFDESTRUCT`) without borrowing the error taxonomy to say so.
enum Step {
    Continue,
    Jump(usize),
    Halt,
}

/// Bytecode with its jumpdest analysis precomputed once, reused across every
/// instance that runs it.
#[derive(Clone, Debug)]
pub struct AnalyzedCode {
    jumpdest_map: JumpdestMap,
    code: Bytes,
}

impl AnalyzedCode {
    /// Analyzes `code`, building its jumpdest map and padding it with a
    /// trailing `STOP` so the dispatch loop never reads past the buffer
    /// (a truncated trailing `PUSH` reads zero for its missing immediate
    /// bytes, matching every other EVM implementation).
    pub fn analyze(code: impl AsRef<[u8]>) -> Self {
        let code = code.as_ref();
        let mut jumpdest_map = vec![false; code.len()];

        let mut i = 0;
        while i < code.len() {
            let opcode = OpCode(code[i]);
            i += match opcode {
                OpCode::JUMPDEST => {
                    jumpdest_map[i] = true;
                    1
                }
                OpCode::PUSH1
                | OpCode::PUSH2
                | OpCode::PUSH3
                | OpCode::PUSH4
                | OpCode::PUSH5
                | OpCode::PUSH6
                | OpCode::PUSH7
                | OpCode::PUSH8
                | OpCode::PUSH9
                | OpCode::PUSH10
                | OpCode::PUSH11
                | OpCode::PUSH12
                | OpCode::PUSH13
                | OpCode::PUSH14
                | OpCode::PUSH15
                | OpCode::PUSH16
                | OpCode::PUSH17
                | OpCode::PUSH18
                | OpCode::PUSH19
                | OpCode::PUSH20
                | OpCode::PUSH21
                | OpCode::PUSH22
                | OpCode::PUSH23
                | OpCode::PUSH24
                | OpCode::PUSH25
                | OpCode::PUSH26
                | OpCode::PUSH27
                | OpCode::PUSH28
                | OpCode::PUSH29
                | OpCode::PUSH30
                | OpCode::PUSH31
                | OpCode::PUSH32 => opcode.to_usize() - OpCode::PUSH1.to_usize() + 2,
                _ => 1,
            }
        }

        let mut padded_code = vec![0_u8; i + 1];
        padded_code[..code.len()].copy_from_slice(code);
        padded_code[i] = OpCode::STOP.to_u8();

        Self {
            jumpdest_map: JumpdestMap(jumpdest_map),
            code: padded_code.into(),
        }
    }

    /// Runs this bytecode to completion against `host`, appending one
    /// [`TraceEntry`] per retired opcode to `tracer`.
    ///
    /// On any halt other than success or `REVERT`, `gas_left` (and hence
    /// the trace entry's `gas_used`) reflects the entire message gas having
    /// been consumed — EVM convention for a hard error.
    pub fn execute<H: Host>(
        &self,
        host: &mut H,
        tracer: &mut Tracer,
        message: Message,
        revision: Revision,
    ) -> Output {
        let message_gas = message.gas;
        let destination = message.destination;
        let mut state = ExecutionState::new(message, revision);
        let instruction_table = get_baseline_instruction_table(revision);

        let mut pc = 0usize;

        let error_code = loop {
            let op = OpCode(self.code[pc]);
            let entry_pc = pc;

            let outcome = match check_requirements(instruction_table, &mut state, op) {
                Ok(()) => self.dispatch(&mut state, host, op, &mut pc),
                Err(e) => Err(e),
            };

            let error_code = match &outcome {
                Ok(_) => ErrorCode::None,
                Err(e) => *e,
            };

            // A hard error (anything but success or a deliberate REVERT)
            // consumes all remaining gas, per EVM convention.
            if !matches!(error_code, ErrorCode::None | ErrorCode::Revert) {
                state.gas_left = 0;
            }

            tracer.push(TraceEntry {
                address: destination,
                pc: entry_pc,
                opcode: op,
                stack: state.stack.snapshot(),
                memory: state.memory.snapshot(),
                touched: host.touched_snapshot(),
                gas_used: message_gas - state.gas_left,
                gas_limit: message_gas,
                gas_refund: state.gas_refund,
                error_code,
            });

            match outcome {
                Ok(Step::Continue) => {
                    pc += 1;
                }
                Ok(Step::Jump(dst)) => {
                    pc = dst;
                }
                Ok(Step::Halt) => break ErrorCode::None,
                Err(e) => break e,
            }
        };

        Output {
            error_code,
            gas_left: state.gas_left,
            gas_refund: state.gas_refund,
            output_data: state.output_data,
        }
    }

    fn dispatch<H: Host>(
        &self,
        state: &mut ExecutionState,
        host: &mut H,
        op: OpCode,
        pc: &mut usize,
    ) -> Result<Step, ErrorCode> {
        match op {
            OpCode::STOP => return Ok(Step::Halt),
            OpCode::ADD => arithmetic::add(&mut state.stack)?,
            OpCode::MUL => arithmetic::mul(&mut state.stack)?,
            OpCode::SUB => arithmetic::sub(&mut state.stack)?,
            OpCode::DIV => arithmetic::div(&mut state.stack)?,
            OpCode::SDIV => arithmetic::sdiv(&mut state.stack)?,
            OpCode::MOD => arithmetic::modulo(&mut state.stack)?,
            OpCode::SMOD => arithmetic::smod(&mut state.stack)?,
            OpCode::ADDMOD => arithmetic::addmod(&mut state.stack)?,
            OpCode::MULMOD => arithmetic::mulmod(&mut state.stack)?,
            OpCode::EXP => arithmetic::exp(&mut state.stack, &mut state.gas_left, state.revision)?,
            OpCode::SIGNEXTEND => arithmetic::signextend(&mut state.stack)?,

            OpCode::LT => boolean::lt(&mut state.stack)?,
            OpCode::GT => boolean::gt(&mut state.stack)?,
            OpCode::SLT => boolean::slt(&mut state.stack)?,
            OpCode::SGT => boolean::sgt(&mut state.stack)?,
            OpCode::EQ => boolean::eq(&mut state.stack)?,
            OpCode::ISZERO => boolean::iszero(&mut state.stack)?,
            OpCode::AND => boolean::and(&mut state.stack)?,
            OpCode::OR => boolean::or(&mut state.stack)?,
            OpCode::XOR => boolean::xor(&mut state.stack)?,
            OpCode::NOT => boolean::not(&mut state.stack)?,
            OpCode::BYTE => bitwise::byte(&mut state.stack)?,
            OpCode::SHL => bitwise::shl(&mut state.stack)?,
            OpCode::SHR => bitwise::shr(&mut state.stack)?,
            OpCode::SAR => bitwise::sar(&mut state.stack)?,

            OpCode::KECCAK256 => memory::keccak256(state)?,
            OpCode::ADDRESS => external::address(state)?,
            OpCode::BALANCE => external::balance(state, host)?,
            OpCode::CALLER => external::caller(state)?,
            OpCode::CALLVALUE => external::callvalue(state)?,
            OpCode::CALLDATALOAD => control::calldataload(state)?,
            OpCode::CALLDATASIZE => control::calldatasize(state)?,
            OpCode::CALLDATACOPY => memory::calldatacopy(state)?,
            OpCode::CODESIZE => memory::codesize(state, &self.code)?,
            OpCode::CODECOPY => memory::codecopy(state, &self.code)?,
            OpCode::EXTCODESIZE => external::extcodesize(state, host)?,
            OpCode::EXTCODECOPY => memory::extcodecopy(state, host)?,
            OpCode::RETURNDATASIZE => memory::returndatasize(state)?,
            OpCode::RETURNDATACOPY => memory::returndatacopy(state)?,
            OpCode::EXTCODEHASH => external::extcodehash(state, host)?,
            OpCode::BLOCKHASH => external::blockhash(state, host)?,
            OpCode::ORIGIN => external::push_txcontext(state, host, external::origin_accessor)?,
            OpCode::COINBASE => external::push_txcontext(state, host, external::coinbase_accessor)?,
            OpCode::GASPRICE => external::push_txcontext(state, host, external::gasprice_accessor)?,
            OpCode::TIMESTAMP => external::push_txcontext(state, host, external::timestamp_accessor)?,
            OpCode::NUMBER => external::push_txcontext(state, host, external::number_accessor)?,
            OpCode::DIFFICULTY => external::push_txcontext(state, host, external::difficulty_accessor)?,
            OpCode::GASLIMIT => external::push_txcontext(state, host, external::gaslimit_accessor)?,
            OpCode::CHAINID => external::push_txcontext(state, host, external::chainid_accessor)?,
            OpCode::BASEFEE => external::push_txcontext(state, host, external::basefee_accessor)?,
            OpCode::SELFBALANCE => external::selfbalance(state, host)?,

            OpCode::POP => stack_manip::pop(&mut state.stack)?,
            OpCode::MLOAD => memory::mload(state)?,
            OpCode::MSTORE => memory::mstore(state)?,
            OpCode::MSTORE8 => memory::mstore8(state)?,

            OpCode::JUMP => {
                let dst = control::op_jump(state, &self.jumpdest_map)?;
                return Ok(Step::Jump(dst));
            }
            OpCode::JUMPI => {
                if !state.stack.peek(1)?.is_zero() {
                    let dst = control::op_jump(state, &self.jumpdest_map)?;
                    state.stack.pop()?;
                    return Ok(Step::Jump(dst));
                } else {
                    state.stack.pop()?;
                    state.stack.pop()?;
                }
            }
            OpCode::PC => state.stack.push(U256::from(*pc))?,
            OpCode::MSIZE => memory::msize(state)?,
            OpCode::SLOAD => external::sload(state, host)?,
            OpCode::SSTORE => external::sstore(state, host)?,
            OpCode::GAS => state.stack.push(U256::from(state.gas_left))?,
            OpCode::JUMPDEST => {}

            OpCode::PUSH1
            | OpCode::PUSH2
            | OpCode::PUSH3
            | OpCode::PUSH4
            | OpCode::PUSH5
            | OpCode::PUSH6
            | OpCode::PUSH7
            | OpCode::PUSH8
            | OpCode::PUSH9
            | OpCode::PUSH10
            | OpCode::PUSH11
            | OpCode::PUSH12
            | OpCode::PUSH13
            | OpCode::PUSH14
            | OpCode::PUSH15
            | OpCode::PUSH16
            | OpCode::PUSH17
            | OpCode::PUSH18
            | OpCode::PUSH19
            | OpCode::PUSH20
            | OpCode::PUSH21
            | OpCode::PUSH22
            | OpCode::PUSH23
            | OpCode::PUSH24
            | OpCode::PUSH25
            | OpCode::PUSH26
            | OpCode::PUSH27
            | OpCode::PUSH28
            | OpCode::PUSH29
            | OpCode::PUSH30
            | OpCode::PUSH31
            | OpCode::PUSH32 => {
                let num_bytes = op.to_usize() - OpCode::PUSH1.to_usize() + 1;
                stack_manip::push(&mut state.stack, &self.code[*pc + 1..*pc + 1 + num_bytes])?;
                *pc += num_bytes;
            }

            OpCode::DUP1
            | OpCode::DUP2
            | OpCode::DUP3
            | OpCode::DUP4
            | OpCode::DUP5
            | OpCode::DUP6
            | OpCode::DUP7
            | OpCode::DUP8
            | OpCode::DUP9
            | OpCode::DUP10
            | OpCode::DUP11
            | OpCode::DUP12
            | OpCode::DUP13
            | OpCode::DUP14
            | OpCode::DUP15
            | OpCode::DUP16 => {
                stack_manip::dup(&mut state.stack, op.to_usize() - OpCode::DUP1.to_usize() + 1)?;
            }

            OpCode::SWAP1
            | OpCode::SWAP2
            | OpCode::SWAP3
            | OpCode::SWAP4
            | OpCode::SWAP5
            | OpCode::SWAP6
            | OpCode::SWAP7
            | OpCode::SWAP8
            | OpCode::SWAP9
            | OpCode::SWAP10
            | OpCode::SWAP11
            | OpCode::SWAP12
            | OpCode::SWAP13
            | OpCode::SWAP14
            | OpCode::SWAP15
            | OpCode::SWAP16 => {
                stack_manip::swap(&mut state.stack, op.to_usize() - OpCode::SWAP1.to_usize() + 1)?;
            }

            OpCode::LOG0 | OpCode::LOG1 | OpCode::LOG2 | OpCode::LOG3 | OpCode::LOG4 => {
                external::log(state, host, op.to_usize() - OpCode::LOG0.to_usize())?;
            }
            OpCode::CREATE | OpCode::CREATE2 => {
                call::create(state, host, op == OpCode::CREATE2)?;
            }
            OpCode::CALL | OpCode::CALLCODE | OpCode::DELEGATECALL | OpCode::STATICCALL => {
                let kind = match op {
                    OpCode::CALL => CallKind::Call,
                    OpCode::CALLCODE => CallKind::CallCode,
                    OpCode::DELEGATECALL => CallKind::DelegateCall,
                    OpCode::STATICCALL => CallKind::StaticCall,
                    _ => unreachable!(),
                };
                call::call(state, host, kind)?;
            }
            OpCode::RETURN => {
                control::ret(state)?;
                return Ok(Step::Halt);
            }
            OpCode::REVERT => {
                control::ret(state)?;
                return Err(ErrorCode::Revert);
            }
            OpCode::INVALID => return Err(ErrorCode::InvalidOpcode),
            OpCode::SELFDESTRUCT => {
                external::selfdestruct(state, host)?;
                return Ok(Step::Halt);
            }
            other => unreachable!("every defined opcode is handled above: {other}"),
        }

        Ok(Step::Continue)
    }
}

/// Outcome of running one instance's bytecode to completion.
#[derive(Clone, Debug, PartialEq)]
pub struct Output {
    pub error_code: ErrorCode,
    pub gas_left: i64,
    pub gas_refund: i64,
    pub output_data: Bytes,
}
