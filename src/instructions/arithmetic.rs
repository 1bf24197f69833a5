//! Stack-level wrappers around [`crate::word`]'s pure arithmetic (spec §4.1
//! consumed by §3's opcode semantics).

use crate::{error::ErrorCode, revision::Revision, stack::Stack, word};

pub(crate) fn add(stack: &mut Stack) -> Result<(), ErrorCode> {
    let a = stack.pop()?;
    let b = stack.pop()?;
    stack.push(word::add(a, b))
}

pub(crate) fn mul(stack: &mut Stack) -> Result<(), ErrorCode> {
    let a = stack.pop()?;
    let b = stack.pop()?;
    stack.push(word::mul(a, b))
}

pub(crate) fn sub(stack: &mut Stack) -> Result<(), ErrorCode> {
    let a = stack.pop()?;
    let b = stack.pop()?;
    stack.push(word::sub(a, b))
}

pub(crate) fn div(stack: &mut Stack) -> Result<(), ErrorCode> {
    let a = stack.pop()?;
    let b = stack.pop()?;
    stack.push(word::div(a, b))
}

pub(crate) fn sdiv(stack: &mut Stack) -> Result<(), ErrorCode> {
    let a = stack.pop()?;
    let b = stack.pop()?;
    stack.push(word::sdiv(a, b))
}

pub(crate) fn modulo(stack: &mut Stack) -> Result<(), ErrorCode> {
    let a = stack.pop()?;
    let b = stack.pop()?;
    stack.push(word::modulo(a, b))
}

pub(crate) fn smod(stack: &mut Stack) -> Result<(), ErrorCode> {
    let a = stack.pop()?;
    let b = stack.pop()?;
    stack.push(word::smod(a, b))
}

pub(crate) fn addmod(stack: &mut Stack) -> Result<(), ErrorCode> {
    let a = stack.pop()?;
    let b = stack.pop()?;
    let m = stack.pop()?;
    stack.push(word::addmod(a, b, m))
}

pub(crate) fn mulmod(stack: &mut Stack) -> Result<(), ErrorCode> {
    let a = stack.pop()?;
    let b = stack.pop()?;
    let m = stack.pop()?;
    stack.push(word::mulmod(a, b, m))
}

/// `EXP`'s additional per-byte-of-exponent gas is charged here, since it
/// depends on the popped operand rather than the static gas-cost table.
pub(crate) fn exp(stack: &mut Stack, gas_left: &mut i64, revision: Revision) -> Result<(), ErrorCode> {
    let base = stack.pop()?;
    let power = stack.pop()?;

    if !power.is_zero() {
        let per_byte = if revision >= Revision::Spurious { 50 } else { 10 };
        let additional_gas = per_byte * (word::log2floor(power) / 8 + 1);
        *gas_left -= additional_gas as i64;
        if *gas_left < 0 {
            return Err(ErrorCode::OutOfGas);
        }
    }

    stack.push(word::exp(base, power))
}

pub(crate) fn signextend(stack: &mut Stack) -> Result<(), ErrorCode> {
    let b = stack.pop()?;
    let x = stack.pop()?;
    stack.push(word::signextend(b, x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereum_types::U256;

    #[test]
    fn add_pops_two_pushes_one() {
        let mut stack = Stack::new();
        stack.push(U256::from(2)).unwrap();
        stack.push(U256::from(3)).unwrap();
        add(&mut stack).unwrap();
        assert_eq!(stack.peek(0).unwrap(), U256::from(5));
    }

    #[test]
    fn exp_charges_per_byte_of_exponent() {
        let mut stack = Stack::new();
        stack.push(U256::from(256)).unwrap();
        stack.push(U256::from(2)).unwrap();
        let mut gas = 100;
        exp(&mut stack, &mut gas, Revision::London).unwrap();
        // log2floor(256) = 8, so (8/8 + 1) * 50 = 100.
        assert_eq!(gas, 0);
        // base=2, power=256: 2^256 wraps to 0 in 256-bit arithmetic.
        assert_eq!(stack.peek(0).unwrap(), U256::zero());
    }
}
