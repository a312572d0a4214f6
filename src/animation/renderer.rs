//! Frame renderer: turns a frame index plus derived data into a [`Scene`].
//!
//! Rendering is a pure function of its inputs. Calling [`render_frame`]
//! twice with the same context yields equal scenes, so a surface can
//! re-render freely (window resize, theme change) without side effects.

use super::scene::{
    ColumnHighlight, Connector, Diagnostic, Effect, Meteor, MeteorWaypoint, Point, ResultDisplay,
    RowRole, Scene, SceneContent, SceneRow, SingletonMarker, TimedEffect,
};
use crate::compute::{
    Analysis, ColorRole, GridGeometry, InvariantViolation, Layout, Pairings, RowLayout, XorStep,
    XorSteps, differing_bits, row_binary,
};
use crate::schema::{AnimationMode, VisualizerConfig};

/// Stagger between input row reveals on the initial frame.
pub const ROW_STAGGER_MS: u64 = 100;
/// Fade duration used by reveal effects.
pub const FADE_MS: u64 = 300;
/// Delay before the binary digits appear on a step frame.
pub const BINARY_REVEAL_MS: u64 = 600;

/// Gap between the grid and a row's decimal label.
const LABEL_GAP: f32 = 8.0;
/// Horizontal bulge of a connector spanning adjacent rows.
const CONNECTOR_BULGE: f32 = 12.0;
/// Extra bulge per row spanned, so nested connectors do not overlap.
const CONNECTOR_BULGE_PER_ROW: f32 = 2.0;
const MARKER_PAD: f32 = 2.0;

/// Which kind of content a frame index resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Initial,
    /// Intermediate frame folding in the operand at this input index.
    Step(usize),
    Result,
}

impl FrameKind {
    /// Resolve `frame` for an input of `len` values. Indexes past the end
    /// resolve to the terminal frame.
    pub fn resolve(mode: AnimationMode, frame: usize, len: usize) -> Self {
        let last = mode.total_frames(len) - 1;
        match frame.min(last) {
            0 => FrameKind::Initial,
            f if f == last => FrameKind::Result,
            f => FrameKind::Step(f - 1),
        }
    }
}

/// Inputs to [`render_frame`]. Everything is borrowed; nothing is mutated.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub mode: AnimationMode,
    pub input: &'a [u32],
    pub steps: &'a XorSteps,
    pub analysis: &'a Analysis,
    pub meteor_duration_ms: u64,
    pub impact_duration_ms: u64,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        config: &VisualizerConfig,
        input: &'a [u32],
        steps: &'a XorSteps,
        analysis: &'a Analysis,
    ) -> Self {
        Self {
            mode: config.mode,
            input,
            steps,
            analysis,
            meteor_duration_ms: config.meteor_duration_ms,
            impact_duration_ms: config.impact_duration_ms,
        }
    }

    #[inline]
    pub fn total_frames(&self) -> usize {
        self.mode.total_frames(self.input.len())
    }
}

/// Describe frame `frame`.
///
/// An input violating the singleton invariant yields a diagnostic scene for
/// every frame index; this never fails.
pub fn render_frame(frame: usize, ctx: &RenderContext<'_>) -> Scene {
    let total_frames = ctx.total_frames();
    let frame = frame.min(total_frames - 1);

    let (content, effects) = match ctx.analysis {
        Analysis::Invalid { violation } => (diagnostic(violation), Vec::new()),
        Analysis::Valid { layout, pairings } => {
            match FrameKind::resolve(ctx.mode, frame, ctx.input.len()) {
                FrameKind::Initial => initial(layout, pairings),
                FrameKind::Step(index) => match XorStep::at(ctx.steps, ctx.input, index) {
                    Some(step) => xor_step(layout, step),
                    None => result(layout, ctx),
                },
                FrameKind::Result => result(layout, ctx),
            }
        }
    };

    Scene {
        frame,
        total_frames,
        mode: ctx.mode,
        content,
        effects,
    }
}

fn diagnostic(violation: &InvariantViolation) -> SceneContent {
    SceneContent::Diagnostic {
        diagnostic: Diagnostic {
            singleton_count: violation.singleton_count,
            singletons: violation.singletons.clone(),
            invalid: violation.invalid_counts().to_vec(),
            violations: violation.violations.clone(),
        },
    }
}

fn scene_row(role: RowRole, row: &RowLayout, geometry: &GridGeometry) -> SceneRow {
    SceneRow {
        role,
        value: row.value,
        binary: row.binary.clone(),
        color: row.color,
        center_y: row.center_y,
        label_x: geometry.grid_left() - LABEL_GAP,
        cells: row.cells.clone(),
    }
}

/// Row for `value` placed on grid row `grid_row`, independent of the input rows.
fn value_row(
    role: RowRole,
    value: u32,
    color: ColorRole,
    grid_row: usize,
    geometry: &GridGeometry,
) -> SceneRow {
    let binary = row_binary(value, geometry.bit_width);
    SceneRow {
        role,
        value,
        color,
        center_y: geometry.row_center_y(grid_row),
        label_x: geometry.grid_left() - LABEL_GAP,
        cells: geometry.cells(grid_row, &binary),
        binary,
    }
}

fn input_rows(layout: &Layout) -> Vec<SceneRow> {
    layout
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| scene_row(RowRole::Input { index }, row, &layout.geometry))
        .collect()
}

fn fade(delay_ms: u64, effect: Effect) -> TimedEffect {
    TimedEffect {
        delay_ms,
        duration_ms: FADE_MS,
        effect,
    }
}

fn initial(layout: &Layout, pairings: &Pairings) -> (SceneContent, Vec<TimedEffect>) {
    let g = &layout.geometry;
    let rows = input_rows(layout);

    // Curves bulge into the space right of the grid, never past the canvas edge.
    let room = (g.canvas_width - g.grid_right()).max(0.0);
    let connectors = pairings
        .edges
        .iter()
        .map(|edge| {
            let from = Point::new(g.grid_right(), g.row_center_y(edge.row_a));
            let to = Point::new(g.grid_right(), g.row_center_y(edge.row_b));
            let span = (edge.row_b - edge.row_a) as f32;
            let bulge = (CONNECTOR_BULGE + CONNECTOR_BULGE_PER_ROW * span).min(room);
            Connector {
                edge: *edge,
                color: layout.rows[edge.row_a].color,
                from,
                control: Point::new(from.x + bulge, (from.y + to.y) / 2.0),
                to,
            }
        })
        .collect();

    let singleton = &pairings.singleton;
    let marker = SingletonMarker {
        row: singleton.index,
        value: singleton.value,
        x: g.grid_left() - MARKER_PAD,
        y: g.row_center_y(singleton.index) - g.row_height / 2.0 - MARKER_PAD / 2.0,
        width: g.grid_right() - g.grid_left() + 2.0 * MARKER_PAD,
        height: g.row_height + MARKER_PAD,
    };

    let revealed = rows.len() as u64 * ROW_STAGGER_MS;
    let mut effects: Vec<TimedEffect> = (0..rows.len())
        .map(|row| fade(row as u64 * ROW_STAGGER_MS, Effect::RevealRow { row }))
        .collect();
    effects.push(fade(revealed, Effect::RevealConnectors));
    effects.push(fade(revealed + FADE_MS, Effect::MarkSingleton));

    let content = SceneContent::Initial {
        rows,
        connectors,
        singleton: Some(marker),
    };
    (content, effects)
}

fn xor_step(layout: &Layout, step: XorStep) -> (SceneContent, Vec<TimedEffect>) {
    let g = &layout.geometry;
    let operand_color = layout
        .rows
        .get(step.operand_index)
        .map_or(ColorRole::Value(0), |r| r.color);

    let rows = vec![
        value_row(RowRole::Accumulator, step.accumulator, ColorRole::Result, 0, g),
        value_row(
            RowRole::Operand {
                index: step.operand_index,
            },
            step.operand,
            operand_color,
            1,
            g,
        ),
        value_row(RowRole::StepResult, step.result, ColorRole::Result, 2, g),
    ];

    let top = g.row_center_y(0) - g.row_height / 2.0;
    let bottom = g.row_center_y(2) + g.row_height / 2.0;
    let highlights = differing_bits(step.accumulator, step.operand, g.bit_width)
        .into_iter()
        .map(|bit| ColumnHighlight {
            bit,
            x: g.cell_x(bit) - g.cell_spacing / 2.0,
            top,
            bottom,
            width: g.cell_spacing,
        })
        .collect();

    let effects = vec![
        fade(0, Effect::ShowEquation),
        fade(BINARY_REVEAL_MS, Effect::RevealBinary),
        fade(BINARY_REVEAL_MS, Effect::ShowHighlights),
    ];

    let content = SceneContent::XorStep {
        step,
        rows,
        highlights,
    };
    (content, effects)
}

fn result(layout: &Layout, ctx: &RenderContext<'_>) -> (SceneContent, Vec<TimedEffect>) {
    let g = &layout.geometry;
    let travel = ctx.meteor_duration_ms;
    let meteors: Vec<Meteor> = (0..g.bit_width)
        .filter_map(|column| meteor(layout, column, travel))
        .collect();

    let result_row = &layout.result_row;
    let result = ResultDisplay {
        value: result_row.value,
        decimal: result_row.value.to_string(),
        binary: result_row.binary.clone(),
        row: scene_row(RowRole::Result, result_row, g),
    };

    let mut effects: Vec<TimedEffect> = meteors
        .iter()
        .map(|m| TimedEffect {
            delay_ms: m.launch_ms,
            duration_ms: m.arrive_ms - m.launch_ms,
            effect: Effect::LaunchMeteor { column: m.column },
        })
        .collect();
    effects.extend(meteors.iter().map(|m| TimedEffect {
        delay_ms: m.arrive_ms,
        duration_ms: ctx.impact_duration_ms,
        effect: Effect::MeteorImpact { column: m.column },
    }));
    let reveal_at = if meteors.is_empty() {
        0
    } else {
        travel + ctx.impact_duration_ms
    };
    effects.push(fade(reveal_at, Effect::RevealResult));

    let content = SceneContent::Result {
        rows: input_rows(layout),
        result,
        meteors,
    };
    (content, effects)
}

/// Meteor for `column`, or `None` when no input row has a 1 there.
///
/// The marker starts at the topmost row holding a 1 and XORs in the bit of
/// every row it passes.
fn meteor(layout: &Layout, column: usize, travel_ms: u64) -> Option<Meteor> {
    let g = &layout.geometry;
    let sources: Vec<(usize, &RowLayout)> = layout
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.cells.get(column).is_some_and(|c| c.digit == 1))
        .collect();
    let &(_, first) = sources.first()?;

    let x = g.cell_x(column);
    let start = Point::new(x, first.center_y);
    let end = Point::new(x, layout.result_row.center_y);
    let distance = end.y - start.y;

    let mut accumulated = 0u8;
    let waypoints: Vec<MeteorWaypoint> = sources
        .iter()
        .map(|&(row, source)| {
            accumulated ^= 1;
            let progress = if distance > 0.0 {
                (source.center_y - start.y) / distance
            } else {
                0.0
            };
            MeteorWaypoint {
                row,
                y: source.center_y,
                accumulated,
                at_ms: (travel_ms as f32 * progress).round() as u64,
            }
        })
        .collect();

    debug_assert_eq!(
        Some(accumulated),
        layout.result_row.cells.get(column).map(|c| c.digit),
        "meteor in column {column} disagrees with the folded result"
    );

    Some(Meteor {
        column,
        color: if accumulated == 1 {
            ColorRole::Result
        } else {
            first.color
        },
        start,
        end,
        waypoints,
        bit: accumulated,
        launch_ms: 0,
        arrive_ms: travel_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Violation;
    use crate::schema::{CanvasConfig, InputArray};

    struct Fixture {
        config: VisualizerConfig,
        input: InputArray,
        steps: XorSteps,
        analysis: Analysis,
    }

    impl Fixture {
        fn new(mode: AnimationMode, values: Vec<u32>) -> Self {
            let config = VisualizerConfig {
                mode,
                canvas: CanvasConfig {
                    full_width: false,
                    ..Default::default()
                },
                ..Default::default()
            };
            let input = InputArray::new(values).unwrap();
            let steps = XorSteps::compute(&input);
            let analysis = Analysis::derive(&input, &steps, &config.canvas);
            Self {
                config,
                input,
                steps,
                analysis,
            }
        }

        fn ctx(&self) -> RenderContext<'_> {
            RenderContext::new(&self.config, &self.input, &self.steps, &self.analysis)
        }
    }

    #[test]
    fn test_frame_kinds() {
        use AnimationMode::*;
        assert_eq!(FrameKind::resolve(Stepwise, 0, 5), FrameKind::Initial);
        assert_eq!(FrameKind::resolve(Stepwise, 1, 5), FrameKind::Step(0));
        assert_eq!(FrameKind::resolve(Stepwise, 4, 5), FrameKind::Step(3));
        assert_eq!(FrameKind::resolve(Stepwise, 5, 5), FrameKind::Result);
        assert_eq!(FrameKind::resolve(Stepwise, 99, 5), FrameKind::Result);
        assert_eq!(FrameKind::resolve(OneShot, 1, 5), FrameKind::Result);
        assert_eq!(FrameKind::resolve(Stepwise, 1, 1), FrameKind::Result);
    }

    #[test]
    fn test_render_is_idempotent() {
        let fx = Fixture::new(AnimationMode::Stepwise, vec![4, 1, 2, 1, 2]);
        for frame in 0..fx.ctx().total_frames() {
            assert_eq!(render_frame(frame, &fx.ctx()), render_frame(frame, &fx.ctx()));
        }
    }

    #[test]
    fn test_initial_frame() {
        let fx = Fixture::new(AnimationMode::OneShot, vec![4, 1, 2, 1, 2]);
        let scene = render_frame(0, &fx.ctx());
        let SceneContent::Initial {
            rows,
            connectors,
            singleton,
        } = &scene.content
        else {
            panic!("expected initial content, got {:?}", scene.content);
        };

        assert_eq!(rows.len(), 5);
        assert_eq!(connectors.len(), 2);
        assert_eq!(singleton.unwrap().row, 0);
        assert_eq!(singleton.unwrap().value, 4);
        for c in connectors {
            assert!(c.control.x > c.from.x);
            assert!(c.control.x <= fx.config.canvas.width);
            assert!(c.from.y < c.to.y);
        }
        assert_eq!(
            scene.effects[1],
            TimedEffect {
                delay_ms: 100,
                duration_ms: FADE_MS,
                effect: Effect::RevealRow { row: 1 }
            }
        );
    }

    #[test]
    fn test_step_highlights_differing_bits() {
        let fx = Fixture::new(AnimationMode::Stepwise, vec![6, 3, 6]);
        let scene = render_frame(2, &fx.ctx());
        let SceneContent::XorStep {
            step,
            rows,
            highlights,
        } = &scene.content
        else {
            panic!("expected step content, got {:?}", scene.content);
        };

        assert_eq!((step.accumulator, step.operand, step.result), (6, 3, 5));
        let binaries: Vec<&str> = rows.iter().map(|r| r.binary.as_str()).collect();
        assert_eq!(binaries, vec!["110", "011", "101"]);
        let bits: Vec<usize> = highlights.iter().map(|h| h.bit).collect();
        assert_eq!(bits, vec![0, 2]);
        assert_eq!(scene.equation().as_deref(), Some("6 ^ 3 = 5"));
        assert!(
            scene
                .effects
                .iter()
                .any(|e| e.effect == Effect::RevealBinary && e.delay_ms == BINARY_REVEAL_MS)
        );
    }

    #[test]
    fn test_meteors_match_result() {
        let fx = Fixture::new(AnimationMode::Stepwise, vec![4, 1, 2, 1, 2]);
        let scene = render_frame(5, &fx.ctx());
        let SceneContent::Result {
            result, meteors, ..
        } = &scene.content
        else {
            panic!("expected result content, got {:?}", scene.content);
        };

        assert_eq!(result.value, 4);
        assert_eq!(result.decimal, "4");
        assert_eq!(result.binary, "100");
        // Every column has a 1 somewhere.
        assert_eq!(meteors.len(), 3);
        for m in meteors {
            let expected = result.binary.as_bytes()[m.column] - b'0';
            assert_eq!(m.bit, expected);
            assert_eq!(m.waypoints.last().unwrap().accumulated, expected);
            assert_eq!(m.arrive_ms, 800);
        }
        // Column 1 holds the pair of 2s: rows 2 and 4.
        let rows: Vec<usize> = meteors[1].waypoints.iter().map(|w| w.row).collect();
        assert_eq!(rows, vec![2, 4]);
        assert_eq!(meteors[1].bit, 0);

        let reveal = scene.effects.last().unwrap();
        assert_eq!(reveal.effect, Effect::RevealResult);
        assert_eq!(reveal.delay_ms, 1100);
        assert_eq!(scene.settle_ms(), 1100 + FADE_MS);
    }

    #[test]
    fn test_zero_input_has_no_meteors() {
        let fx = Fixture::new(AnimationMode::OneShot, vec![0]);
        let scene = render_frame(1, &fx.ctx());
        let SceneContent::Result { meteors, .. } = &scene.content else {
            panic!("expected result content");
        };
        assert!(meteors.is_empty());
        assert_eq!(scene.effects[0].effect, Effect::RevealResult);
        assert_eq!(scene.effects[0].delay_ms, 0);
    }

    #[test]
    fn test_invalid_input_renders_diagnostic_everywhere() {
        let fx = Fixture::new(AnimationMode::Stepwise, vec![1, 1, 1, 2, 2]);
        for frame in [0, 2, 5, 40] {
            let scene = render_frame(frame, &fx.ctx());
            let SceneContent::Diagnostic { diagnostic } = &scene.content else {
                panic!("expected diagnostic at frame {frame}");
            };
            assert_eq!(diagnostic.singleton_count, 0);
            assert_eq!(diagnostic.invalid.len(), 1);
            assert_eq!(diagnostic.invalid[0].value, 1);
            assert_eq!(diagnostic.invalid[0].count, 3);
            assert!(diagnostic.violations.contains(&Violation::NoSingleton));
            assert!(scene.rows().is_empty());
        }
    }

    #[test]
    fn test_frame_past_end_is_clamped() {
        let fx = Fixture::new(AnimationMode::OneShot, vec![7, 3, 7]);
        let scene = render_frame(10, &fx.ctx());
        assert_eq!(scene.frame, 1);
        assert!(matches!(scene.content, SceneContent::Result { .. }));
    }
}
