//! Single Number visualizer - animated proof that XOR-ing every value of a
//! "pairs plus one" array leaves the unpaired value.
//!
//! # Architecture
//!
//! The crate is a pipeline of pure derivations followed by a small state machine:
//!
//! - `schema`: Configuration, the validated input array and random test data
//! - `compute`: Binary codec, cumulative XOR steps, invariant validation and grid layout
//! - `animation`: Playback timeline, frame renderer, scene types and sound cues
//! - `visualizer`: Facade wiring the above together
//!
//! # Example
//!
//! ```rust,no_run
//! use single_number_viz::{
//!     schema::{InputArray, VisualizerConfig},
//!     visualizer::Visualizer,
//! };
//!
//! let input: InputArray = "4, 1, 2, 1, 2".parse().unwrap();
//! let mut viz = Visualizer::new(VisualizerConfig::default(), input).unwrap();
//!
//! viz.next();
//! let scene = viz.scene();
//! println!("{}", serde_json::to_string_pretty(&scene).unwrap());
//! ```

pub mod animation;
pub mod compute;
pub mod schema;
pub mod visualizer;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use animation::{AnimationTimeline, Scene, SoundCue, render_frame};
pub use compute::{Analysis, XorSteps, validate};
pub use schema::{InputArray, VisualizerConfig};
pub use visualizer::Visualizer;
