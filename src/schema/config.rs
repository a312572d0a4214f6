//! Configuration types for the visualizer: playback mode, speed and canvas geometry.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of bit columns rendered when rows are shown at full width.
pub const FULL_BIT_WIDTH: usize = 32;

fn default_one_shot_delay_ms() -> u64 {
    1000
}

fn default_meteor_duration_ms() -> u64 {
    800
}

fn default_impact_duration_ms() -> u64 {
    300
}

/// How the animation is split into frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationMode {
    /// Two frames: all rows with pairings, then the result with meteors.
    #[default]
    OneShot,
    /// One frame per array element plus the initial and result frames.
    Stepwise,
}

impl AnimationMode {
    /// Total frame count for an input of `len` values.
    #[inline]
    pub fn total_frames(self, len: usize) -> usize {
        match self {
            AnimationMode::OneShot => 2,
            AnimationMode::Stepwise => len + 1,
        }
    }
}

/// Autoplay speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl Speed {
    /// Delay between autoplay ticks in stepwise mode.
    pub fn interval(self) -> Duration {
        Duration::from_millis(match self {
            Speed::Slow => 2000,
            Speed::Medium => 1000,
            Speed::Fast => 500,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Speed::Slow => "slow",
            Speed::Medium => "medium",
            Speed::Fast => "fast",
        }
    }
}

impl std::str::FromStr for Speed {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(Speed::Slow),
            "medium" => Ok(Speed::Medium),
            "fast" => Ok(Speed::Fast),
            other => Err(ConfigError::UnknownSpeed(other.to_string())),
        }
    }
}

/// Drawing surface dimensions and grid spacing limits.
///
/// Spacing values are upper bounds: the layout shrinks cells and rows until
/// the whole grid fits inside `width` x `height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Canvas width in user units.
    pub width: f32,
    /// Canvas height in user units.
    pub height: f32,
    /// Width reserved on the left for decimal labels.
    pub label_width: f32,
    /// Margin on the right of the grid, where connector curves bulge.
    pub right_margin: f32,
    /// Largest horizontal distance between two bit cells.
    pub max_digit_width: f32,
    /// Largest row height.
    pub max_row_height: f32,
    /// Vertical gap between rows.
    pub row_gap: f32,
    /// Pad every row to the full 32-bit width instead of the widest value.
    pub full_width: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            label_width: 100.0,
            right_margin: 30.0,
            max_digit_width: 20.0,
            max_row_height: 22.0,
            row_gap: 2.0,
            full_width: true,
        }
    }
}

impl CanvasConfig {
    /// Horizontal space available to bit cells.
    #[inline]
    pub fn content_width(&self) -> f32 {
        (self.width - self.label_width - self.right_margin).max(0.0)
    }
}

/// Top-level visualizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizerConfig {
    /// Frame split; fixed for the lifetime of a timeline.
    #[serde(default)]
    pub mode: AnimationMode,
    /// Initial autoplay speed.
    #[serde(default)]
    pub speed: Speed,
    /// Single transition delay used by one-shot playback.
    #[serde(default = "default_one_shot_delay_ms")]
    pub one_shot_delay_ms: u64,
    /// Travel time of a meteor from its first source row to the result row.
    #[serde(default = "default_meteor_duration_ms")]
    pub meteor_duration_ms: u64,
    /// Duration of the impact flash once a meteor lands.
    #[serde(default = "default_impact_duration_ms")]
    pub impact_duration_ms: u64,
    /// Drawing surface.
    #[serde(default)]
    pub canvas: CanvasConfig,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            mode: AnimationMode::default(),
            speed: Speed::default(),
            one_shot_delay_ms: default_one_shot_delay_ms(),
            meteor_duration_ms: default_meteor_duration_ms(),
            impact_duration_ms: default_impact_duration_ms(),
            canvas: CanvasConfig::default(),
        }
    }
}

impl VisualizerConfig {
    /// Read and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: VisualizerConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Delay before the next autoplay tick for the given speed.
    pub fn tick_interval(&self, speed: Speed) -> Duration {
        match self.mode {
            AnimationMode::Stepwise => speed.interval(),
            AnimationMode::OneShot => Duration::from_millis(self.one_shot_delay_ms),
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.canvas;
        let dims = [
            c.width,
            c.height,
            c.label_width,
            c.right_margin,
            c.max_digit_width,
            c.max_row_height,
            c.row_gap,
        ];
        if dims.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFinite);
        }
        if !(c.width > 0.0 && c.height > 0.0) {
            return Err(ConfigError::InvalidCanvas);
        }
        if c.label_width < 0.0 || c.right_margin < 0.0 {
            return Err(ConfigError::NegativeMargin);
        }
        if c.content_width() <= 0.0 {
            return Err(ConfigError::NoContentWidth {
                width: c.width,
                reserved: c.label_width + c.right_margin,
            });
        }
        if !(c.max_digit_width > 0.0 && c.max_row_height > 0.0) || c.row_gap < 0.0 {
            return Err(ConfigError::InvalidSpacing);
        }
        if self.one_shot_delay_ms == 0 {
            return Err(ConfigError::ZeroDelay);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Canvas dimensions and spacing must be finite")]
    NonFinite,
    #[error("Canvas width and height must be positive")]
    InvalidCanvas,
    #[error("Label width and right margin must be non-negative")]
    NegativeMargin,
    #[error("Canvas width {width} leaves no room for bits after reserving {reserved}")]
    NoContentWidth { width: f32, reserved: f32 },
    #[error("Digit width and row height must be positive, row gap non-negative")]
    InvalidSpacing,
    #[error("One-shot transition delay must be non-zero")]
    ZeroDelay,
    #[error("Unknown speed '{0}' (expected slow, medium or fast)")]
    UnknownSpeed(String),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
