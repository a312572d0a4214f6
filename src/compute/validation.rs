//! The "exactly one singleton, every other value paired" invariant.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// The unique value of a valid input and the row that holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Singleton {
    pub value: u32,
    pub index: usize,
}

/// Occurrence count of one distinct value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: u32,
    pub count: usize,
    /// Rows holding the value, ascending.
    pub rows: Vec<usize>,
}

/// A single way the invariant can fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// No value occurs exactly once.
    NoSingleton,
    /// More than one value occurs exactly once.
    MultipleSingletons { values: Vec<u32> },
    /// Values occurring neither once nor twice.
    InvalidMultiplicity { counts: Vec<ValueCount> },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NoSingleton => write!(f, "no value appears exactly once"),
            Violation::MultipleSingletons { values } => {
                write!(f, "{} values appear exactly once: {values:?}", values.len())
            }
            Violation::InvalidMultiplicity { counts } => {
                write!(f, "values not appearing exactly twice:")?;
                for c in counts {
                    write!(f, " {}x{}", c.value, c.count)?;
                }
                Ok(())
            }
        }
    }
}

/// Report of every violated constraint. Not fatal: it is rendered as a
/// diagnostic frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("single number invariant violated: {}", describe(.violations))]
pub struct InvariantViolation {
    /// Number of values occurring exactly once.
    pub singleton_count: usize,
    /// Values occurring exactly once, in order of first appearance.
    pub singletons: Vec<u32>,
    /// Violated constraints; singleton problems come before multiplicity problems.
    pub violations: Vec<Violation>,
}

fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl InvariantViolation {
    /// Values whose count is not exactly two (singletons excluded).
    pub fn invalid_counts(&self) -> &[ValueCount] {
        self.violations
            .iter()
            .find_map(|v| match v {
                Violation::InvalidMultiplicity { counts } => Some(counts.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn has_no_singleton(&self) -> bool {
        self.violations.contains(&Violation::NoSingleton)
    }
}

/// Group row indices by value, preserving first-appearance order.
pub fn count_values(input: &[u32]) -> Vec<ValueCount> {
    let mut slots: HashMap<u32, usize> = HashMap::with_capacity(input.len());
    let mut counts: Vec<ValueCount> = Vec::new();

    for (row, &value) in input.iter().enumerate() {
        let slot = *slots.entry(value).or_insert_with(|| {
            counts.push(ValueCount {
                value,
                count: 0,
                rows: Vec::new(),
            });
            counts.len() - 1
        });
        counts[slot].count += 1;
        counts[slot].rows.push(row);
    }

    counts
}

/// Check that exactly one value occurs once and every other value twice.
pub fn validate(input: &[u32]) -> Result<Singleton, InvariantViolation> {
    let counts = count_values(input);

    let singletons: Vec<&ValueCount> = counts.iter().filter(|c| c.count == 1).collect();
    let invalid: Vec<ValueCount> = counts
        .iter()
        .filter(|c| c.count != 1 && c.count != 2)
        .cloned()
        .collect();

    if singletons.len() == 1 && invalid.is_empty() {
        let single = singletons[0];
        return Ok(Singleton {
            value: single.value,
            index: single.rows[0],
        });
    }

    let mut violations = Vec::new();
    match singletons.len() {
        0 => violations.push(Violation::NoSingleton),
        1 => {}
        _ => violations.push(Violation::MultipleSingletons {
            values: singletons.iter().map(|c| c.value).collect(),
        }),
    }
    if !invalid.is_empty() {
        violations.push(Violation::InvalidMultiplicity { counts: invalid });
    }

    Err(InvariantViolation {
        singleton_count: singletons.len(),
        singletons: singletons.iter().map(|c| c.value).collect(),
        violations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input() {
        assert_eq!(validate(&[2, 2, 3]), Ok(Singleton { value: 3, index: 2 }));
        assert_eq!(validate(&[7]), Ok(Singleton { value: 7, index: 0 }));
    }

    #[test]
    fn test_no_singleton() {
        let err = validate(&[2, 2, 3, 3]).unwrap_err();
        assert_eq!(err.singleton_count, 0);
        assert_eq!(err.violations, vec![Violation::NoSingleton]);
        assert!(err.invalid_counts().is_empty());
    }

    #[test]
    fn test_invalid_multiplicity() {
        let err = validate(&[1, 1, 1, 2, 2]).unwrap_err();
        assert_eq!(
            err.invalid_counts(),
            &[ValueCount {
                value: 1,
                count: 3,
                rows: vec![0, 1, 2]
            }]
        );
        assert!(err.has_no_singleton());
    }

    #[test]
    fn test_multiple_singletons() {
        let err = validate(&[5, 6, 7, 7]).unwrap_err();
        assert_eq!(err.singleton_count, 2);
        assert_eq!(
            err.violations,
            vec![Violation::MultipleSingletons { values: vec![5, 6] }]
        );
    }

    #[test]
    fn test_error_message_lists_everything() {
        let err = validate(&[9, 9, 9, 4, 4]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("no value appears exactly once"));
        assert!(msg.contains("9x3"));
    }

    #[test]
    fn test_count_values_order() {
        let counts = count_values(&[5, 3, 5, 3, 9]);
        let values: Vec<u32> = counts.iter().map(|c| c.value).collect();
        assert_eq!(values, vec![5, 3, 9]);
        assert_eq!(counts[0].rows, vec![0, 2]);
    }
}
