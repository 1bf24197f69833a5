//! Stack-level wrappers around [`crate::word`]'s pure bit-twiddling ops,
//! mirroring `instructions/arithmetic.rs`'s shape.

use crate::{error::ErrorCode, stack::Stack, word};

pub(crate) fn byte(stack: &mut Stack) -> Result<(), ErrorCode> {
    let i = stack.pop()?;
    let x = stack.pop()?;
    stack.push(word::byte(i, x))
}

pub(crate) fn shl(stack: &mut Stack) -> Result<(), ErrorCode> {
    let shift = stack.pop()?;
    let value = stack.pop()?;
    stack.push(word::shl(shift, value))
}

pub(crate) fn shr(stack: &mut Stack) -> Result<(), ErrorCode> {
    let shift = stack.pop()?;
    let value = stack.pop()?;
    stack.push(word::shr(shift, value))
}

pub(crate) fn sar(stack: &mut Stack) -> Result<(), ErrorCode> {
    let shift = stack.pop()?;
    let value = stack.pop()?;
    stack.push(word::sar(shift, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereum_types::U256;

    #[test]
    fn byte_extracts_the_requested_position() {
        let mut stack = Stack::new();
        stack.push(U256::from(0x1122u64)).unwrap();
        stack.push(U256::from(31)).unwrap();
        byte(&mut stack).unwrap();
        assert_eq!(stack.peek(0).unwrap(), U256::from(0x22));
    }

    #[test]
    fn shl_shifts_left() {
        let mut stack = Stack::new();
        stack.push(U256::from(1)).unwrap();
        stack.push(U256::from(4)).unwrap();
        shl(&mut stack).unwrap();
        assert_eq!(stack.peek(0).unwrap(), U256::from(16));
    }
}
