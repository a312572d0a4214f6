//! Cumulative XOR steps across the input array.

use serde::Serialize;

/// Running XOR results: `steps[0] = 0`, `steps[i] = steps[i-1] ^ input[i-1]`.
///
/// XOR is well-defined for any input, so this never requires the
/// singleton invariant to hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XorSteps {
    steps: Vec<u32>,
}

impl XorSteps {
    pub fn compute(input: &[u32]) -> Self {
        let mut steps = Vec::with_capacity(input.len() + 1);
        let mut acc = 0u32;
        steps.push(acc);
        for &value in input {
            acc ^= value;
            steps.push(acc);
        }
        Self { steps }
    }

    /// Result after folding in the first `index` values.
    #[inline]
    pub fn get(&self, index: usize) -> Option<u32> {
        self.steps.get(index).copied()
    }

    /// XOR of the whole input.
    #[inline]
    pub fn final_result(&self) -> u32 {
        // steps always holds the initial zero
        self.steps[self.steps.len() - 1]
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.steps
    }

    /// Number of prefixes, one more than the input length.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`: steps always hold the initial zero, even for an
    /// empty input.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// One XOR step: `result = accumulator ^ operand`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XorStep {
    /// Position of the operand in the input array.
    pub operand_index: usize,
    pub accumulator: u32,
    pub operand: u32,
    pub result: u32,
}

impl XorStep {
    /// Step that folds `input[operand_index]` into the running result.
    pub fn at(steps: &XorSteps, input: &[u32], operand_index: usize) -> Option<Self> {
        let accumulator = steps.get(operand_index)?;
        let operand = *input.get(operand_index)?;
        Some(Self {
            operand_index,
            accumulator,
            operand,
            result: accumulator ^ operand,
        })
    }
}

/// Bit positions (from the most significant of `width` digits) where `a`
/// and `b` differ, i.e. the bits flipped by `a ^ b`.
pub fn differing_bits(a: u32, b: u32, width: usize) -> Vec<usize> {
    let diff = a ^ b;
    let width = width.min(u32::BITS as usize);
    (0..width)
        .filter(|&pos| (diff >> (width - 1 - pos)) & 1 == 1)
        .collect()
}
