//! Compute module - Binary codec, XOR steps, validation and grid layout.

mod binary;
mod layout;
mod validation;
mod xor;

pub use binary::*;
pub use layout::*;
pub use validation::*;
pub use xor::*;
