//! Schema module - Configuration, input and test-data types for the visualizer.

mod config;
mod input;
mod random;

pub use config::*;
pub use input::*;
pub use random::*;
