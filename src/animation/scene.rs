//! Declarative description of what one frame shows.
//!
//! A [`Scene`] is plain data: positions in canvas units, logical colors and a
//! list of [`TimedEffect`]s relative to the moment the frame is entered. The
//! drawing surface decides how each element actually looks.

use serde::Serialize;

use crate::compute::{BitCell, ColorRole, PairingEdge, ValueCount, Violation, XorStep};
use crate::schema::AnimationMode;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// What a row on screen stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RowRole {
    /// Input value at `index`.
    Input { index: usize },
    /// Running XOR before the step.
    Accumulator,
    /// Value folded in by the step, from input `index`.
    Operand { index: usize },
    /// Running XOR after the step.
    StepResult,
    /// XOR of the whole input.
    Result,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneRow {
    pub role: RowRole,
    pub value: u32,
    pub binary: String,
    pub color: ColorRole,
    pub center_y: f32,
    /// Anchor for the row's decimal label, right-aligned against the grid.
    pub label_x: f32,
    pub cells: Vec<BitCell>,
}

/// Quadratic curve joining two rows holding the same value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Connector {
    pub edge: PairingEdge,
    pub color: ColorRole,
    pub from: Point,
    pub control: Point,
    pub to: Point,
}

/// Box drawn around the row of the unpaired value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SingletonMarker {
    pub row: usize,
    pub value: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Vertical box over a column whose bit flips in an XOR step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnHighlight {
    pub bit: usize,
    pub x: f32,
    pub top: f32,
    pub bottom: f32,
    pub width: f32,
}

/// Point where a meteor passes a row holding a 1 in its column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeteorWaypoint {
    pub row: usize,
    pub y: f32,
    /// Bit carried after passing this row.
    pub accumulated: u8,
    /// Time the meteor reaches the row, relative to frame entry.
    pub at_ms: u64,
}

/// A column's bits falling into the result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meteor {
    pub column: usize,
    pub color: ColorRole,
    pub start: Point,
    pub end: Point,
    pub waypoints: Vec<MeteorWaypoint>,
    /// Bit delivered to the result row.
    pub bit: u8,
    pub launch_ms: u64,
    pub arrive_ms: u64,
}

/// Result row with its decimal rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultDisplay {
    pub value: u32,
    pub decimal: String,
    pub binary: String,
    pub row: SceneRow,
}

/// Explanation shown instead of the animation for an invalid input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub singleton_count: usize,
    pub singletons: Vec<u32>,
    /// Values whose count is neither one nor two.
    pub invalid: Vec<ValueCount>,
    pub violations: Vec<Violation>,
}

/// Something the surface should start at `delay_ms` after frame entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimedEffect {
    pub delay_ms: u64,
    pub duration_ms: u64,
    pub effect: Effect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    /// Fade in scene row `row`.
    RevealRow { row: usize },
    RevealConnectors,
    MarkSingleton,
    ShowEquation,
    /// Show the digits of every row.
    RevealBinary,
    ShowHighlights,
    LaunchMeteor { column: usize },
    MeteorImpact { column: usize },
    RevealResult,
}

/// Frame-specific content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneContent {
    Initial {
        rows: Vec<SceneRow>,
        connectors: Vec<Connector>,
        singleton: Option<SingletonMarker>,
    },
    XorStep {
        step: XorStep,
        /// Accumulator, operand and result rows, top to bottom.
        rows: Vec<SceneRow>,
        highlights: Vec<ColumnHighlight>,
    },
    Result {
        rows: Vec<SceneRow>,
        result: ResultDisplay,
        meteors: Vec<Meteor>,
    },
    Diagnostic {
        diagnostic: Diagnostic,
    },
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub frame: usize,
    pub total_frames: usize,
    pub mode: AnimationMode,
    pub content: SceneContent,
    /// Ordered by `delay_ms`.
    pub effects: Vec<TimedEffect>,
}

impl Scene {
    pub fn is_diagnostic(&self) -> bool {
        matches!(self.content, SceneContent::Diagnostic { .. })
    }

    /// Rows drawn in this scene, the result row excluded.
    pub fn rows(&self) -> &[SceneRow] {
        match &self.content {
            SceneContent::Initial { rows, .. }
            | SceneContent::XorStep { rows, .. }
            | SceneContent::Result { rows, .. } => rows,
            SceneContent::Diagnostic { .. } => &[],
        }
    }

    /// The equation text `prev ^ operand = result` for step frames.
    pub fn equation(&self) -> Option<String> {
        match &self.content {
            SceneContent::XorStep { step, .. } => Some(format!(
                "{} ^ {} = {}",
                step.accumulator, step.operand, step.result
            )),
            _ => None,
        }
    }

    /// Time from frame entry until the last effect finishes.
    pub fn settle_ms(&self) -> u64 {
        self.effects
            .iter()
            .map(|e| e.delay_ms + e.duration_ms)
            .max()
            .unwrap_or(0)
    }
}
