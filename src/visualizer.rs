//! Pipeline facade: input array to validation, XOR steps, layout, timeline and scene.
//!
//! Derived data is recomputed explicitly: [`Visualizer::set_input`] rebuilds
//! everything and starts a new playback session, a canvas change only
//! re-runs the layout.

use crate::animation::{
    AnimationTimeline, PlaybackState, RenderContext, Scene, TickToken, TimelineEvent, render_frame,
};
use crate::compute::{Analysis, XorSteps};
use crate::schema::{CanvasConfig, ConfigError, InputArray, Speed, VisualizerConfig};

/// One visualization: configuration, the current input and its playback.
#[derive(Debug)]
pub struct Visualizer {
    config: VisualizerConfig,
    input: InputArray,
    steps: XorSteps,
    analysis: Analysis,
    timeline: AnimationTimeline,
}

impl Visualizer {
    pub fn new(config: VisualizerConfig, input: InputArray) -> Result<Self, ConfigError> {
        config.validate()?;

        let steps = XorSteps::compute(&input);
        let analysis = Analysis::derive(&input, &steps, &config.canvas);
        let timeline = AnimationTimeline::new(&config, input.len());
        log::info!(
            "Visualizer ready: {} values, {} frames, {:?} mode",
            input.len(),
            timeline.total_frames(),
            config.mode
        );

        Ok(Self {
            config,
            input,
            steps,
            analysis,
            timeline,
        })
    }

    /// Replace the input array. Any pending tick is cancelled and playback
    /// returns to `Idle(0)`.
    pub fn set_input(&mut self, input: InputArray) {
        self.steps = XorSteps::compute(&input);
        self.analysis = Analysis::derive(&input, &self.steps, &self.config.canvas);
        self.timeline.replace_input(input.len());
        log::debug!(
            "Input replaced with {} values (valid: {})",
            input.len(),
            self.analysis.is_valid()
        );
        self.input = input;
    }

    /// Resize the drawing surface width. Only the layout is recomputed.
    pub fn set_canvas_width(&mut self, width: f32) -> Result<(), ConfigError> {
        let mut canvas = self.config.canvas.clone();
        canvas.width = width;
        self.set_canvas(canvas)
    }

    pub fn set_canvas_height(&mut self, height: f32) -> Result<(), ConfigError> {
        let mut canvas = self.config.canvas.clone();
        canvas.height = height;
        self.set_canvas(canvas)
    }

    fn set_canvas(&mut self, canvas: CanvasConfig) -> Result<(), ConfigError> {
        let candidate = VisualizerConfig {
            canvas,
            ..self.config.clone()
        };
        candidate.validate()?;
        self.config = candidate;
        self.analysis
            .relayout(&self.input, &self.steps, &self.config.canvas);
        log::debug!(
            "Relayout for {}x{} canvas",
            self.config.canvas.width,
            self.config.canvas.height
        );
        Ok(())
    }

    pub fn play(&mut self) {
        self.timeline.play();
    }

    pub fn pause(&mut self) {
        self.timeline.pause();
    }

    pub fn next(&mut self) {
        self.timeline.next();
    }

    pub fn prev(&mut self) {
        self.timeline.prev();
    }

    pub fn reset(&mut self) {
        self.timeline.reset();
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.timeline.set_speed(speed);
    }

    /// Deliver a fired timer. Returns `false` for stale tokens.
    pub fn on_tick(&mut self, token: TickToken) -> bool {
        self.timeline.on_tick(token)
    }

    /// Scene for the current frame.
    pub fn scene(&self) -> Scene {
        self.scene_at(self.timeline.frame())
    }

    /// Scene for any frame; indexes past the end show the terminal frame.
    pub fn scene_at(&self, frame: usize) -> Scene {
        render_frame(frame, &self.render_context())
    }

    fn render_context(&self) -> RenderContext<'_> {
        RenderContext::new(&self.config, &self.input, &self.steps, &self.analysis)
    }

    /// Notifications produced since the last call.
    pub fn drain_events(&mut self) -> Vec<TimelineEvent> {
        self.timeline.drain_events()
    }

    pub fn state(&self) -> PlaybackState {
        self.timeline.state()
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn input(&self) -> &InputArray {
        &self.input
    }

    pub fn steps(&self) -> &XorSteps {
        &self.steps
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    pub fn timeline(&self) -> &AnimationTimeline {
        &self.timeline
    }

    /// Mutable timeline access for timer hosts such as [`crate::animation::VirtualScheduler`].
    pub fn timeline_mut(&mut self) -> &mut AnimationTimeline {
        &mut self.timeline
    }
}
