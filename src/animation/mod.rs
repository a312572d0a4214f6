//! Playback and frame description for the XOR visualization.
//!
//! [`AnimationTimeline`] decides *which* frame is current, [`render_frame`]
//! describes *what* that frame shows, and [`SoundHookAdapter`] forwards the
//! sound cues raised on frame entry.
//!
//! # Scheduling
//!
//! The timeline never sleeps or owns a timer. Each scheduling decision is
//! published as an event:
//!
//! ```text
//! play()          -> TickScheduled { token: (s, 0), delay_ms }
//! on_tick((s,0))  -> FrameChanged, Sound, TickScheduled { token: (s, 1) }
//! reset()         -> TickCancelled { token: (s, 1) }  ; session s+1 begins
//! on_tick((s,1))  -> ignored
//! ```
//!
//! A host (browser `setTimeout`, [`VirtualScheduler`] in tests and the CLI)
//! arms timers accordingly and hands the token back when one fires.

mod renderer;
mod scene;
mod scheduler;
mod sound;
mod timeline;

pub use renderer::{
    BINARY_REVEAL_MS, FADE_MS, FrameKind, ROW_STAGGER_MS, RenderContext, render_frame,
};
pub use scene::{
    ColumnHighlight, Connector, Diagnostic, Effect, Meteor, MeteorWaypoint, Point, ResultDisplay,
    RowRole, Scene, SceneContent, SceneRow, SingletonMarker, TimedEffect,
};
pub use scheduler::{TickScheduler, VirtualScheduler, apply_scheduling};
pub use sound::{LogSink, NullSink, SoundCue, SoundHookAdapter, SoundSink};
pub use timeline::{AnimationTimeline, PlaybackState, PlaybackStatus, TickToken, TimelineEvent};
