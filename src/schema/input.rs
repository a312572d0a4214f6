//! The validated input array handed to the core.

use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Smallest accepted array length.
pub const MIN_INPUT_LEN: usize = 1;
/// Largest array length the grid is laid out for.
pub const MAX_INPUT_LEN: usize = 20;

/// Ordered, immutable sequence of unsigned 32-bit values (1-20 entries).
///
/// Construction only checks the length contract. Whether the values form a
/// valid "pairs plus one singleton" array is reported separately by
/// [`crate::compute::validate`], because an invalid array must still be
/// visualized as a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct InputArray(Vec<u32>);

impl InputArray {
    pub fn new(values: Vec<u32>) -> Result<Self, InputError> {
        if values.len() < MIN_INPUT_LEN {
            return Err(InputError::Empty);
        }
        if values.len() > MAX_INPUT_LEN {
            return Err(InputError::TooLong(values.len()));
        }
        Ok(Self(values))
    }

    #[inline]
    pub fn values(&self) -> &[u32] {
        &self.0
    }
}

impl Deref for InputArray {
    type Target = [u32];

    fn deref(&self) -> &[u32] {
        &self.0
    }
}

impl TryFrom<Vec<u32>> for InputArray {
    type Error = InputError;

    fn try_from(values: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<InputArray> for Vec<u32> {
    fn from(input: InputArray) -> Self {
        input.0
    }
}

/// Parses comma separated decimal values such as `"4, 1, 2, 1, 2"`.
///
/// Empty segments are skipped. Every token must be `0` or a decimal number
/// without leading zeros, and fit in `[0, 2^32)`.
impl FromStr for InputArray {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.len() > MAX_INPUT_LEN {
            return Err(InputError::TooLong(tokens.len()));
        }

        let malformed: Vec<String> = tokens
            .iter()
            .filter(|t| !is_canonical_decimal(t))
            .map(|t| t.to_string())
            .collect();
        if !malformed.is_empty() {
            return Err(InputError::Malformed(malformed));
        }

        let mut values = Vec::with_capacity(tokens.len());
        let mut out_of_range = Vec::new();
        for token in tokens {
            match token.parse::<u32>() {
                Ok(v) => values.push(v),
                Err(_) => out_of_range.push(token.to_string()),
            }
        }
        if !out_of_range.is_empty() {
            return Err(InputError::OutOfRange(out_of_range));
        }

        Self::new(values)
    }
}

fn is_canonical_decimal(token: &str) -> bool {
    let bytes = token.as_bytes();
    match bytes {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        _ => bytes.iter().all(u8::is_ascii_digit),
    }
}

/// Input contract violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Input array must contain at least {MIN_INPUT_LEN} value")]
    Empty,
    #[error("Input array has {0} values, at most {MAX_INPUT_LEN} are supported")]
    TooLong(usize),
    #[error("Not a non-negative integer: {}", .0.join(", "))]
    Malformed(Vec<String>),
    #[error("Outside [0, 2^32): {}", .0.join(", "))]
    OutOfRange(Vec<String>),
}
