//! 256-bit unsigned arithmetic with the Bitcoin compact ("nBits") codec.
//!
//! Difficulty targets are 256-bit integers, but headers carry them in the
//! 32-bit compact form: a one-byte exponent and a three-byte mantissa, with
//! a sign bit inside the mantissa. The codec here reproduces Bitcoin's
//! `arith_uint256::SetCompact`/`GetCompact` bit for bit, including the
//! `negative` and `overflow` flags on decode -- both are consensus-visible.
//!
//! Note that the compact form is lossy: only the top 23 bits of a target
//! survive a round-trip. `to_compact` followed by `from_compact` is the
//! canonical normal form used whenever a computed target is written back
//! into a header.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul};

/// Mantissa sign bit of the compact encoding.
const COMPACT_SIGN_BIT: u32 = 0x0080_0000;

/// Mantissa mask of the compact encoding (low 23 bits).
const COMPACT_MANTISSA_MASK: u32 = 0x007f_ffff;

/// 256-bit unsigned integer used for difficulty targets.
///
/// Backed by `BigUint`; constructors reduce modulo 2^256 so the value never
/// exceeds the fixed width the consensus rules assume.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ArithU256(BigUint);

impl ArithU256 {
    /// The zero target.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Whether the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Decode a compact target.
    ///
    /// Returns `(value, negative, overflow)`. The value itself is only
    /// meaningful when both flags are false; callers must reject otherwise.
    pub fn from_compact(bits: u32) -> (Self, bool, bool) {
        let size = bits >> 24;
        let word = bits & COMPACT_MANTISSA_MASK;

        let value = if size <= 3 {
            BigUint::from(word >> (8 * (3 - size)))
        } else {
            BigUint::from(word) << (8 * (size - 3) as u64)
        };

        let negative = word != 0 && (bits & COMPACT_SIGN_BIT) != 0;
        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

        (Self(reduce(value)), negative, overflow)
    }

    /// Encode as a compact target (unsigned; the sign bit is never set).
    pub fn to_compact(&self) -> u32 {
        let mut size = (self.0.bits() + 7) / 8;
        let mut compact = if size <= 3 {
            self.low_u64() << (8 * (3 - size))
        } else {
            let shifted = &self.0 >> (8 * (size - 3));
            shifted.iter_u64_digits().next().unwrap_or(0)
        };
        // the mantissa is unsigned, so a high bit there would read back as
        // the sign; push it into the exponent instead
        if compact & u64::from(COMPACT_SIGN_BIT) != 0 {
            compact >>= 8;
            size += 1;
        }
        compact as u32 | ((size as u32) << 24)
    }

    /// Interpret a 32-byte hash as a little-endian 256-bit integer.
    pub fn from_le_bytes(bytes: &[u8; 32]) -> Self {
        Self(BigUint::from_bytes_le(bytes))
    }

    /// Parse a big-endian hex literal, e.g. a chain-parameter pow limit.
    ///
    /// Returns `None` for non-hex input or a value wider than 256 bits.
    pub fn parse_be_hex(hex: &str) -> Option<Self> {
        let cleaned = hex.trim();
        let cleaned = cleaned
            .strip_prefix("0x")
            .or_else(|| cleaned.strip_prefix("0X"))
            .unwrap_or(cleaned);
        let value = BigUint::parse_bytes(cleaned.as_bytes(), 16)?;
        if value.bits() > 256 {
            return None;
        }
        Some(Self(value))
    }

    /// Parse a trusted big-endian hex literal.
    ///
    /// # Panics
    /// Panics on invalid input; only use with compile-time constants.
    pub fn from_be_hex(hex: &str) -> Self {
        Self::parse_be_hex(hex).expect("valid 256-bit hex literal")
    }

    fn low_u64(&self) -> u64 {
        self.0.iter_u64_digits().next().unwrap_or(0)
    }
}

/// Reduce modulo 2^256.
fn reduce(value: BigUint) -> BigUint {
    if value.bits() > 256 {
        value & ((BigUint::one() << 256u32) - BigUint::one())
    } else {
        value
    }
}

impl Add<&ArithU256> for &ArithU256 {
    type Output = ArithU256;

    fn add(self, rhs: &ArithU256) -> ArithU256 {
        ArithU256(reduce(&self.0 + &rhs.0))
    }
}

impl Mul<u64> for &ArithU256 {
    type Output = ArithU256;

    fn mul(self, rhs: u64) -> ArithU256 {
        ArithU256(reduce(&self.0 * rhs))
    }
}

impl Div<u64> for &ArithU256 {
    type Output = ArithU256;

    fn div(self, rhs: u64) -> ArithU256 {
        ArithU256(&self.0 / rhs)
    }
}

impl fmt::Display for ArithU256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0>64}", self.0.to_str_radix(16))
    }
}

impl fmt::Debug for ArithU256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArithU256({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_clean(bits: u32) -> ArithU256 {
        let (value, negative, overflow) = ArithU256::from_compact(bits);
        assert!(!negative && !overflow, "0x{:08x} should decode cleanly", bits);
        value
    }

    #[test]
    fn test_from_compact_zero_mantissa() {
        let (value, negative, overflow) = ArithU256::from_compact(0x01003456);
        assert!(value.is_zero());
        assert!(!negative);
        assert!(!overflow);
        assert_eq!(value.to_compact(), 0);
    }

    #[test]
    fn test_from_compact_small_values() {
        assert_eq!(decode_clean(0x01123456), ArithU256::from_be_hex("12"));
        assert_eq!(decode_clean(0x02008000), ArithU256::from_be_hex("80"));
        assert_eq!(decode_clean(0x05009234), ArithU256::from_be_hex("92340000"));
        assert_eq!(decode_clean(0x04123456), ArithU256::from_be_hex("12345600"));
    }

    #[test]
    fn test_from_compact_negative_flag() {
        let (value, negative, overflow) = ArithU256::from_compact(0x04923456);
        assert!(negative);
        assert!(!overflow);
        // magnitude still decodes
        assert_eq!(value, ArithU256::from_be_hex("12345600"));

        let (_, negative, overflow) = ArithU256::from_compact(0x20ffffff);
        assert!(negative);
        assert!(!overflow);
    }

    #[test]
    fn test_from_compact_overflow_flag() {
        for bits in [0xff123456u32, 0x22000100, 0x23010000] {
            let (_, _, overflow) = ArithU256::from_compact(bits);
            assert!(overflow, "0x{:08x} should overflow", bits);
        }
        // a zero mantissa never overflows, whatever the exponent says
        let (value, negative, overflow) = ArithU256::from_compact(0xff000000);
        assert!(value.is_zero());
        assert!(!negative);
        assert!(!overflow);
    }

    #[test]
    fn test_mainnet_genesis_limit() {
        let value = decode_clean(0x1d00ffff);
        assert_eq!(
            value,
            ArithU256::from_be_hex(
                "00000000ffff0000000000000000000000000000000000000000000000000000"
            )
        );
        assert_eq!(value.to_compact(), 0x1d00ffff);
    }

    #[test]
    fn test_to_compact_roundtrips() {
        for bits in [
            0x02008000u32,
            0x05009234,
            0x04123456,
            0x1d00ffff,
            0x1c3fffc0,
            0x207fffff,
            0x200fffff,
        ] {
            assert_eq!(decode_clean(bits).to_compact(), bits);
        }
    }

    #[test]
    fn test_to_compact_normalizes() {
        // low mantissa bits shifted out on decode do not come back
        assert_eq!(decode_clean(0x01123456).to_compact(), 0x01120000);
        // a leading zero byte in the value shrinks the exponent
        assert_eq!(decode_clean(0x21000001).to_compact(), 0x1f010000);
    }

    #[test]
    fn test_from_le_bytes() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x2a;
        assert_eq!(ArithU256::from_le_bytes(&bytes), ArithU256::from_be_hex("2a"));

        bytes = [0u8; 32];
        bytes[31] = 0x80;
        assert_eq!(
            ArithU256::from_le_bytes(&bytes),
            ArithU256::from_be_hex(
                "8000000000000000000000000000000000000000000000000000000000000000"
            )
        );
    }

    #[test]
    fn test_ordering_and_scalar_ops() {
        let limit = decode_clean(0x1d00ffff);
        let quarter = &limit / 4;
        assert!(quarter < limit);
        assert_eq!(&quarter * 4, limit);
        assert_eq!(quarter.to_compact(), 0x1c3fffc0);

        let doubled = &limit + &limit;
        assert_eq!(&doubled / 2, limit);
    }

    #[test]
    fn test_parse_be_hex_hygiene() {
        assert_eq!(
            ArithU256::parse_be_hex(" 0x2a "),
            Some(ArithU256::from_be_hex("2a"))
        );
        assert_eq!(ArithU256::parse_be_hex("not hex"), None);
        // 257 bits is out of range
        let wide = format!("1{}", "0".repeat(64));
        assert_eq!(ArithU256::parse_be_hex(&wide), None);
    }

    #[test]
    fn test_display_padding() {
        assert_eq!(
            ArithU256::from_be_hex("2a").to_string(),
            "000000000000000000000000000000000000000000000000000000000000002a"
        );
    }
}
