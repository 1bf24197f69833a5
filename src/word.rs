//! 256-bit word arithmetic with exact EVM semantics.
//!
//! `Word` is a type alias, not a newtype: the teacher never reinvents a
//! bignum and neither do we. Every op here is total — there is no failure
//! mode at this layer (spec §4.1).

use ethereum_types::{H160, U256, U512};
use i256::I256;

/// The EVM's native 256-bit value.
pub type Word = U256;

/// `a + b`, wrapping modulo 2^256.
pub fn add(a: Word, b: Word) -> Word {
    a.overflowing_add(b).0
}

/// `a - b`, wrapping modulo 2^256.
pub fn sub(a: Word, b: Word) -> Word {
    a.overflowing_sub(b).0
}

/// `a * b`, wrapping modulo 2^256.
pub fn mul(a: Word, b: Word) -> Word {
    a.overflowing_mul(b).0
}

/// `a / b`, EVM convention: `div(a, 0) = 0`.
pub fn div(a: Word, b: Word) -> Word {
    if b.is_zero() {
        Word::zero()
    } else {
        a / b
    }
}

/// `a % b`, EVM convention: `mod(a, 0) = 0`.
pub fn modulo(a: Word, b: Word) -> Word {
    if b.is_zero() {
        Word::zero()
    } else {
        a % b
    }
}

/// Signed division (two's complement). `sdiv(a, 0) = 0`, `sdiv(MIN, -1) = MIN` (wraps).
pub fn sdiv(a: Word, b: Word) -> Word {
    (I256::from(a) / I256::from(b)).into()
}

/// Signed modulo (two's complement). `smod(a, 0) = 0`.
pub fn smod(a: Word, b: Word) -> Word {
    if b.is_zero() {
        Word::zero()
    } else {
        (I256::from(a) % I256::from(b)).into()
    }
}

/// `(a + b) % m`, modulus 0 yields 0. Computed widened to 512 bits to avoid
/// intermediate overflow.
pub fn addmod(a: Word, b: Word, m: Word) -> Word {
    if m.is_zero() {
        return Word::zero();
    }
    let wide = (U512::from(a) + U512::from(b)) % U512::from(m);
    wide_to_word(wide)
}

/// `(a * b) % m`, modulus 0 yields 0.
pub fn mulmod(a: Word, b: Word, m: Word) -> Word {
    if m.is_zero() {
        return Word::zero();
    }
    let wide = (U512::from(a) * U512::from(b)) % U512::from(m);
    wide_to_word(wide)
}

/// Full 512-bit product of two words — the modexp-style wide multiply
/// spec §3 calls for.
pub fn mul_wide(a: Word, b: Word) -> U512 {
    U512::from(a) * U512::from(b)
}

fn wide_to_word(v: U512) -> Word {
    let mut buf = [0u8; 64];
    v.to_big_endian(&mut buf);
    Word::from_big_endian(&buf[32..])
}

/// `a << shift`, `0` for `shift >= 256`.
pub fn shl(shift: Word, value: Word) -> Word {
    if value.is_zero() || shift >= Word::from(256) {
        Word::zero()
    } else {
        value << shift.as_usize()
    }
}

/// `a >> shift` (logical), `0` for `shift >= 256`.
pub fn shr(shift: Word, value: Word) -> Word {
    if value.is_zero() || shift >= Word::from(256) {
        Word::zero()
    } else {
        value >> shift.as_usize()
    }
}

/// Arithmetic shift right. `0` or all-ones for `shift >= 256`, depending on sign.
pub fn sar(shift: Word, value: Word) -> Word {
    use i256::Sign;

    let value = I256::from(value);

    if value == I256::zero() || shift >= Word::from(256) {
        return match value.0 {
            Sign::Plus | Sign::NoSign => Word::zero(),
            Sign::Minus => I256(Sign::Minus, Word::one()).into(),
        };
    }

    let shift = shift.as_usize();
    match value.0 {
        Sign::Plus | Sign::NoSign => value.1 >> shift,
        Sign::Minus => {
            let shifted = ((value.1.overflowing_sub(Word::one()).0) >> shift)
                .overflowing_add(Word::one())
                .0;
            I256(Sign::Minus, shifted).into()
        }
    }
}

/// `x`'s `i`-th byte, counted from the big-endian side. `i >= 32` yields 0.
pub fn byte(i: Word, x: Word) -> Word {
    if i >= Word::from(32) {
        return Word::zero();
    }
    let mut ret = Word::zero();
    for bit in 0..256 {
        if bit < 8 {
            let o = i.as_usize();
            let t = 255 - (7 - bit + 8 * o);
            let bit_mask = Word::one() << t;
            let v = (x & bit_mask) >> t;
            ret = ret.overflowing_add(v << bit).0;
        }
    }
    ret
}

/// Sign-extends `x` from bit `8*(b+1)-1`. `b >= 31` is identity.
pub fn signextend(b: Word, x: Word) -> Word {
    if b > Word::from(31) {
        return x;
    }
    let len = b.as_usize();
    let t = 8 * (len + 1) - 1;
    let t_bit_mask = Word::one() << t;
    let t_value = (x & t_bit_mask) >> t;

    let mut v = Word::zero();
    for i in 0..256 {
        let bit_mask = Word::one() << i;
        let i_value = (x & bit_mask) >> i;
        if i <= t {
            v = v.overflowing_add(i_value << i).0;
        } else {
            v = v.overflowing_add(t_value << i).0;
        }
    }
    v
}

/// `base ^ exp` by square-and-multiply, wrapping modulo 2^256.
pub fn exp(mut base: Word, mut exp: Word) -> Word {
    let mut v = Word::one();
    while !exp.is_zero() {
        if !(exp & Word::one()).is_zero() {
            v = v.overflowing_mul(base).0;
        }
        exp >>= 1;
        base = base.overflowing_mul(base).0;
    }
    v
}

/// `floor(log2(value))`. Panics on `value == 0` (same contract as the
/// teacher's private helper this is grounded on).
pub fn log2floor(value: Word) -> u64 {
    assert!(!value.is_zero());
    let mut l: u64 = 256;
    for i in 0..4 {
        let i = 3 - i;
        if value.0[i] == 0u64 {
            l -= 64;
        } else {
            l -= value.0[i].leading_zeros() as u64;
            return if l == 0 { l } else { l - 1 };
        }
    }
    l
}

/// Big-endian 32-byte encoding.
pub fn to_be_bytes(w: Word) -> [u8; 32] {
    let mut buf = [0u8; 32];
    w.to_big_endian(&mut buf);
    buf
}

/// Decodes a big-endian 32-byte buffer.
pub fn from_be_bytes(buf: &[u8; 32]) -> Word {
    Word::from_big_endian(buf)
}

/// Lower-case `0x`-prefixed hexadecimal encoding.
pub fn to_hex(w: Word) -> String {
    format!("0x{}", hex::encode(to_be_bytes(w)))
}

/// Parses a (optionally `0x`-prefixed) hexadecimal string.
pub fn from_hex(s: &str) -> Result<Word, hex::FromHexError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let s = if s.is_empty() { "0" } else { s };
    let padded = if s.len() % 2 == 1 {
        format!("0{s}")
    } else {
        s.to_owned()
    };
    let bytes = hex::decode(padded)?;
    Ok(Word::from_big_endian(&bytes))
}

/// The low 160 bits, interpreted as an address (spec §3).
pub fn to_address(w: Word) -> H160 {
    let bytes = to_be_bytes(w);
    H160::from_slice(&bytes[12..])
}

/// Zero-extends a 20-byte address into a word.
pub fn from_address(addr: H160) -> Word {
    Word::from_big_endian(addr.as_bytes())
}
