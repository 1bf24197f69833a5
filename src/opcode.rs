//! EVM instruction opcodes.

use core::fmt;

/// A single EVM instruction opcode.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OpCode(pub u8);

impl OpCode {
    pub const STOP: Self = Self(0x00);
    pub const ADD: Self = Self(0x01);
    pub const MUL: Self = Self(0x02);
    pub const SUB: Self = Self(0x03);
    pub const DIV: Self = Self(0x04);
    pub const SDIV: Self = Self(0x05);
    pub const MOD: Self = Self(0x06);
    pub const SMOD: Self = Self(0x07);
    pub const ADDMOD: Self = Self(0x08);
    pub const MULMOD: Self = Self(0x09);
    pub const EXP: Self = Self(0x0a);
    pub const SIGNEXTEND: Self = Self(0x0b);

    pub const LT: Self = Self(0x10);
    pub const GT: Self = Self(0x11);
    pub const SLT: Self = Self(0x12);
    pub const SGT: Self = Self(0x13);
    pub const EQ: Self = Self(0x14);
    pub const ISZERO: Self = Self(0x15);
    pub const AND: Self = Self(0x16);
    pub const OR: Self = Self(0x17);
    pub const XOR: Self = Self(0x18);
    pub const NOT: Self = Self(0x19);
    pub const BYTE: Self = Self(0x1a);
    pub const SHL: Self = Self(0x1b);
    pub const SHR: Self = Self(0x1c);
    pub const SAR: Self = Self(0x1d);

    pub const KECCAK256: Self = Self(0x20);

    pub const ADDRESS: Self = Self(0x30);
    pub const BALANCE: Self = Self(0x31);
    pub const ORIGIN: Self = Self(0x32);
    pub const CALLER: Self = Self(0x33);
    pub const CALLVALUE: Self = Self(0x34);
    pub const CALLDATALOAD: Self = Self(0x35);
    pub const CALLDATASIZE: Self = Self(0x36);
    pub const CALLDATACOPY: Self = Self(0x37);
    pub const CODESIZE: Self = Self(0x38);
    pub const CODECOPY: Self = Self(0x39);
    pub const GASPRICE: Self = Self(0x3a);
    pub const EXTCODESIZE: Self = Self(0x3b);
    pub const EXTCODECOPY: Self = Self(0x3c);
    pub const RETURNDATASIZE: Self = Self(0x3d);
    pub const RETURNDATACOPY: Self = Self(0x3e);
    pub const EXTCODEHASH: Self = Self(0x3f);

    pub const BLOCKHASH: Self = Self(0x40);
    pub const COINBASE: Self = Self(0x41);
    pub const TIMESTAMP: Self = Self(0x42);
    pub const NUMBER: Self = Self(0x43);
    pub const DIFFICULTY: Self = Self(0x44);
    pub const GASLIMIT: Self = Self(0x45);
    pub const CHAINID: Self = Self(0x46);
    pub const SELFBALANCE: Self = Self(0x47);
    pub const BASEFEE: Self = Self(0x48);

    pub const POP: Self = Self(0x50);
    pub const MLOAD: Self = Self(0x51);
    pub const MSTORE: Self = Self(0x52);
    pub const MSTORE8: Self = Self(0x53);
    pub const SLOAD: Self = Self(0x54);
    pub const SSTORE: Self = Self(0x55);
    pub const JUMP: Self = Self(0x56);
    pub const JUMPI: Self = Self(0x57);
    pub const PC: Self = Self(0x58);
    pub const MSIZE: Self = Self(0x59);
    pub const GAS: Self = Self(0x5a);
    pub const JUMPDEST: Self = Self(0x5b);

    pub const PUSH1: Self = Self(0x60);
    pub const PUSH2: Self = Self(0x61);
    pub const PUSH3: Self = Self(0x62);
    pub const PUSH4: Self = Self(0x63);
    pub const PUSH5: Self = Self(0x64);
    pub const PUSH6: Self = Self(0x65);
    pub const PUSH7: Self = Self(0x66);
    pub const PUSH8: Self = Self(0x67);
    pub const PUSH9: Self = Self(0x68);
    pub const PUSH10: Self = Self(0x69);
    pub const PUSH11: Self = Self(0x6a);
    pub const PUSH12: Self = Self(0x6b);
    pub const PUSH13: Self = Self(0x6c);
    pub const PUSH14: Self = Self(0x6d);
    pub const PUSH15: Self = Self(0x6e);
    pub const PUSH16: Self = Self(0x6f);
    pub const PUSH17: Self = Self(0x70);
    pub const PUSH18: Self = Self(0x71);
    pub const PUSH19: Self = Self(0x72);
    pub const PUSH20: Self = Self(0x73);
    pub const PUSH21: Self = Self(0x74);
    pub const PUSH22: Self = Self(0x75);
    pub const PUSH23: Self = Self(0x76);
    pub const PUSH24: Self = Self(0x77);
    pub const PUSH25: Self = Self(0x78);
    pub const PUSH26: Self = Self(0x79);
    pub const PUSH27: Self = Self(0x7a);
    pub const PUSH28: Self = Self(0x7b);
    pub const PUSH29: Self = Self(0x7c);
    pub const PUSH30: Self = Self(0x7d);
    pub const PUSH31: Self = Self(0x7e);
    pub const PUSH32: Self = Self(0x7f);

    pub const DUP1: Self = Self(0x80);
    pub const DUP2: Self = Self(0x81);
    pub const DUP3: Self = Self(0x82);
    pub const DUP4: Self = Self(0x83);
    pub const DUP5: Self = Self(0x84);
    pub const DUP6: Self = Self(0x85);
    pub const DUP7: Self = Self(0x86);
    pub const DUP8: Self = Self(0x87);
    pub const DUP9: Self = Self(0x88);
    pub const DUP10: Self = Self(0x89);
    pub const DUP11: Self = Self(0x8a);
    pub const DUP12: Self = Self(0x8b);
    pub const DUP13: Self = Self(0x8c);
    pub const DUP14: Self = Self(0x8d);
    pub const DUP15: Self = Self(0x8e);
    pub const DUP16: Self = Self(0x8f);

    pub const SWAP1: Self = Self(0x90);
    pub const SWAP2: Self = Self(0x91);
    pub const SWAP3: Self = Self(0x92);
    pub const SWAP4: Self = Self(0x93);
    pub const SWAP5: Self = Self(0x94);
    pub const SWAP6: Self = Self(0x95);
    pub const SWAP7: Self = Self(0x96);
    pub const SWAP8: Self = Self(0x97);
    pub const SWAP9: Self = Self(0x98);
    pub const SWAP10: Self = Self(0x99);
    pub const SWAP11: Self = Self(0x9a);
    pub const SWAP12: Self = Self(0x9b);
    pub const SWAP13: Self = Self(0x9c);
    pub const SWAP14: Self = Self(0x9d);
    pub const SWAP15: Self = Self(0x9e);
    pub const SWAP16: Self = Self(0x9f);

    pub const LOG0: Self = Self(0xa0);
    pub const LOG1: Self = Self(0xa1);
    pub const LOG2: Self = Self(0xa2);
    pub const LOG3: Self = Self(0xa3);
    pub const LOG4: Self = Self(0xa4);

    pub const CREATE: Self = Self(0xf0);
    pub const CALL: Self = Self(0xf1);
    pub const CALLCODE: Self = Self(0xf2);
    pub const RETURN: Self = Self(0xf3);
    pub const DELEGATECALL: Self = Self(0xf4);
    pub const CREATE2: Self = Self(0xf5);
    pub const STATICCALL: Self = Self(0xfa);
    pub const REVERT: Self = Self(0xfd);
    pub const INVALID: Self = Self(0xfe);
    pub const SELFDESTRUCT: Self = Self(0xff);

    pub const fn to_u8(self) -> u8 {
        self.0
    }

    pub const fn to_usize(self) -> usize {
        self.0 as usize
    }

    /// Human-readable mnemonic, falling back to a hex literal for unassigned opcodes.
    pub fn name(self) -> &'static str {
        crate::instructions::properties::get_properties()[self.to_usize()]
            .map(|p| p.name)
            .unwrap_or("UNKNOWN")
    }
}

impl fmt::Debug for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02x})", self.name(), self.0)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<u8> for OpCode {
    fn from(v: u8) -> Self {
        Self(v)
    }
}
