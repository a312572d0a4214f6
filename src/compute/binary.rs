//! Fixed-width binary digit strings for unsigned 32-bit values.
//!
//! Bit positions are counted from the most significant displayed digit, so
//! position 0 is the leftmost character of the string.

use crate::schema::FULL_BIT_WIDTH;

/// Unsigned binary representation of `value`, left-padded with `'0'` to at
/// least `min_width` digits. Zero renders as `"0"` before padding.
pub fn to_binary(value: u32, min_width: usize) -> String {
    format!("{value:0min_width$b}")
}

/// Full 32-digit representation.
#[inline]
pub fn to_binary_full(value: u32) -> String {
    to_binary(value, FULL_BIT_WIDTH)
}

/// Number of digits needed to show `value` without leading zeros (minimum 1).
#[inline]
pub fn natural_width(value: u32) -> usize {
    (u32::BITS - value.leading_zeros()).max(1) as usize
}

/// Digit at `position` counted from the most significant digit.
#[inline]
pub fn bit_at(binary: &str, position: usize) -> Option<char> {
    binary.as_bytes().get(position).map(|&b| b as char)
}

/// Keep only the `cap` least-significant digits of `binary`.
pub fn truncate_low_bits(binary: &str, cap: usize) -> &str {
    let len = binary.len();
    if len > cap { &binary[len - cap..] } else { binary }
}

/// Parse a string of `'0'`/`'1'` digits back into a value.
pub fn parse_binary(binary: &str) -> Result<u32, BinaryError> {
    if binary.is_empty() {
        return Err(BinaryError::Empty);
    }
    if let Some((position, digit)) = binary.chars().enumerate().find(|(_, c)| *c != '0' && *c != '1')
    {
        return Err(BinaryError::InvalidDigit { position, digit });
    }
    let significant = binary.trim_start_matches('0');
    if significant.len() > u32::BITS as usize {
        return Err(BinaryError::Overflow(binary.len()));
    }
    if significant.is_empty() {
        return Ok(0);
    }
    u32::from_str_radix(significant, 2).map_err(|_| BinaryError::Overflow(binary.len()))
}

/// Binary parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BinaryError {
    #[error("Binary string is empty")]
    Empty,
    #[error("Invalid binary digit '{digit}' at position {position}")]
    InvalidDigit { position: usize, digit: char },
    #[error("Binary string of {0} digits does not fit in 32 bits")]
    Overflow(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_padding() {
        assert_eq!(to_binary(5, 1), "101");
        assert_eq!(to_binary(5, 8), "00000101");
        assert_eq!(to_binary(0, 1), "0");
        assert_eq!(to_binary(0, 0), "0");
        assert_eq!(to_binary_full(1).len(), 32);
        assert_eq!(to_binary_full(u32::MAX), "1".repeat(32));
    }

    #[test]
    fn test_no_sign_for_high_bit() {
        let binary = to_binary_full(0x8000_0000);
        assert!(binary.starts_with('1'));
        assert!(!binary.contains('-'));
    }

    #[test]
    fn test_bit_at() {
        let binary = to_binary(6, 3);
        assert_eq!(bit_at(&binary, 0), Some('1'));
        assert_eq!(bit_at(&binary, 2), Some('0'));
        assert_eq!(bit_at(&binary, 3), None);
    }

    #[test]
    fn test_natural_width() {
        assert_eq!(natural_width(0), 1);
        assert_eq!(natural_width(1), 1);
        assert_eq!(natural_width(4), 3);
        assert_eq!(natural_width(u32::MAX), 32);
    }

    #[test]
    fn test_truncate_keeps_low_bits() {
        assert_eq!(truncate_low_bits("110101", 4), "0101");
        assert_eq!(truncate_low_bits("101", 4), "101");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_binary(""), Err(BinaryError::Empty));
        assert_eq!(
            parse_binary("10a1"),
            Err(BinaryError::InvalidDigit {
                position: 2,
                digit: 'a'
            })
        );
        assert_eq!(parse_binary(&"1".repeat(33)), Err(BinaryError::Overflow(33)));
        assert_eq!(parse_binary(&format!("0{}", "1".repeat(32))), Ok(u32::MAX));
        assert_eq!(parse_binary("0000"), Ok(0));
    }

    proptest! {
        #[test]
        fn prop_full_width_round_trip(v in any::<u32>()) {
            prop_assert_eq!(parse_binary(&to_binary(v, 32)), Ok(v));
        }

        #[test]
        fn prop_bits_match_shifts(v in any::<u32>(), pos in 0usize..32) {
            let binary = to_binary_full(v);
            let expected = if (v >> (31 - pos)) & 1 == 1 { '1' } else { '0' };
            prop_assert_eq!(bit_at(&binary, pos), Some(expected));
        }
    }
}
