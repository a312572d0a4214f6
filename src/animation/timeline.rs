//! Playback state machine: current frame, play/pause/step/reset and speed.
//!
//! The timeline never owns a real timer. Scheduling is expressed as
//! [`TimelineEvent::TickScheduled`] / [`TimelineEvent::TickCancelled`]
//! events carrying a [`TickToken`]; the host arms a timer and calls
//! [`AnimationTimeline::on_tick`] with the token when it fires. At most one
//! token is live at a time, and a token from a cancelled or replaced
//! session is ignored, so a late timer can never move a reset timeline.

use std::time::Duration;

use serde::Serialize;

use super::sound::SoundCue;
use crate::schema::{AnimationMode, Speed, VisualizerConfig};

/// Coarse playback status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    /// At frame 0 after construction, input replacement or reset.
    Idle,
    Playing,
    Paused,
}

/// Snapshot of the timeline exposed to transport controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    pub frame: usize,
    pub total_frames: usize,
    pub status: PlaybackStatus,
    pub speed: Speed,
}

impl PlaybackState {
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.frame + 1 >= self.total_frames
    }

    /// Position in `[0, 1]` for a progress bar.
    pub fn progress(&self) -> f32 {
        if self.total_frames > 1 {
            self.frame as f32 / (self.total_frames - 1) as f32
        } else {
            0.0
        }
    }
}

/// Identifies one scheduled tick. Only the most recently scheduled token of
/// the current session is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TickToken {
    pub session: u64,
    pub seq: u64,
}

/// Largest integer a JavaScript Number holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl TickToken {
    /// Rebuild a token from the plain numbers a JavaScript host reads back
    /// out of a serialized event. Returns `None` unless both parts are
    /// non-negative integers a Number can represent exactly.
    pub fn from_f64(session: f64, seq: f64) -> Option<Self> {
        fn part(x: f64) -> Option<u64> {
            (x.is_finite() && x >= 0.0 && x.fract() == 0.0 && x <= MAX_SAFE_INTEGER)
                .then_some(x as u64)
        }
        Some(Self {
            session: part(session)?,
            seq: part(seq)?,
        })
    }
}

/// Notifications produced by timeline operations, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineEvent {
    FrameChanged { frame: usize },
    PlaybackChanged { state: PlaybackState },
    TickScheduled { token: TickToken, delay_ms: u64 },
    TickCancelled { token: TickToken },
    Sound { cue: SoundCue },
}

/// Owner of the pending tick for one input array. Dropping the session
/// (on reset or input replacement) invalidates every token it issued.
#[derive(Debug)]
struct AnimationSession {
    id: u64,
    next_seq: u64,
    pending: Option<TickToken>,
}

impl AnimationSession {
    fn new(id: u64) -> Self {
        Self {
            id,
            next_seq: 0,
            pending: None,
        }
    }

    /// Issue a new token, replacing any pending one. Returns the replaced token.
    fn arm(&mut self) -> (TickToken, Option<TickToken>) {
        let token = TickToken {
            session: self.id,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        (token, self.pending.replace(token))
    }

    fn cancel(&mut self) -> Option<TickToken> {
        self.pending.take()
    }

    /// Consume `token` if it is the live one.
    fn claim(&mut self, token: TickToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

/// Frame timeline for one input array.
#[derive(Debug)]
pub struct AnimationTimeline {
    mode: AnimationMode,
    total_frames: usize,
    frame: usize,
    status: PlaybackStatus,
    speed: Speed,
    one_shot_delay: Duration,
    session: AnimationSession,
    events: Vec<TimelineEvent>,
}

impl AnimationTimeline {
    /// Create a timeline at `Idle(0)` for an input of `input_len` values.
    ///
    /// The initial frame entry is announced with `FrameChanged(0)` and the
    /// `init` cue.
    pub fn new(config: &VisualizerConfig, input_len: usize) -> Self {
        let mut timeline = Self {
            mode: config.mode,
            total_frames: config.mode.total_frames(input_len),
            frame: 0,
            status: PlaybackStatus::Idle,
            speed: config.speed,
            one_shot_delay: Duration::from_millis(config.one_shot_delay_ms),
            session: AnimationSession::new(0),
            events: Vec::new(),
        };
        timeline.enter_frame(0);
        timeline.push_state();
        timeline
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            frame: self.frame,
            total_frames: self.total_frames,
            status: self.status,
            speed: self.speed,
        }
    }

    #[inline]
    pub fn frame(&self) -> usize {
        self.frame
    }

    #[inline]
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    #[inline]
    pub fn mode(&self) -> AnimationMode {
        self.mode
    }

    #[inline]
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    #[inline]
    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Token of the tick currently awaited, if any.
    #[inline]
    pub fn pending_tick(&self) -> Option<TickToken> {
        self.session.pending
    }

    /// Delay between autoplay ticks at the current speed.
    pub fn tick_interval(&self) -> Duration {
        match self.mode {
            AnimationMode::Stepwise => self.speed.interval(),
            AnimationMode::OneShot => self.one_shot_delay,
        }
    }

    #[inline]
    fn last_frame(&self) -> usize {
        self.total_frames - 1
    }

    /// Take all notifications produced since the last call.
    pub fn drain_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start autoplay. From the terminal frame, playback restarts at frame 0.
    pub fn play(&mut self) {
        if self.status == PlaybackStatus::Playing {
            return;
        }
        self.cancel_pending();
        if self.frame == self.last_frame() {
            self.enter_frame(0);
        }
        self.status = PlaybackStatus::Playing;
        self.push_state();
        self.schedule_tick();
    }

    /// Stop autoplay, keeping the current frame. No-op unless playing.
    pub fn pause(&mut self) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        self.cancel_pending();
        self.status = PlaybackStatus::Paused;
        self.push_state();
    }

    /// Step forward one frame; always stops autoplay.
    pub fn next(&mut self) {
        self.cancel_pending();
        if self.frame < self.last_frame() {
            self.enter_frame(self.frame + 1);
            self.set_status(PlaybackStatus::Paused);
        } else if self.status == PlaybackStatus::Playing {
            self.set_status(PlaybackStatus::Paused);
        }
    }

    /// Step back one frame; always stops autoplay.
    pub fn prev(&mut self) {
        self.cancel_pending();
        if self.frame > 0 {
            self.enter_frame(self.frame - 1);
            self.set_status(PlaybackStatus::Paused);
        } else if self.status == PlaybackStatus::Playing {
            self.set_status(PlaybackStatus::Paused);
        }
    }

    /// Return to `Idle(0)` and invalidate every outstanding tick.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.renew_session();
        if self.frame != 0 {
            self.enter_frame(0);
        }
        self.set_status(PlaybackStatus::Idle);
    }

    /// Change speed. While playing, the pending tick is replaced by one
    /// using the new interval.
    pub fn set_speed(&mut self, speed: Speed) {
        if self.speed == speed {
            return;
        }
        self.speed = speed;
        if self.status == PlaybackStatus::Playing {
            self.schedule_tick();
        }
        self.push_state();
    }

    /// Discard all playback state for a new input array of `input_len`
    /// values. The mode chosen at construction is kept.
    pub fn replace_input(&mut self, input_len: usize) {
        self.cancel_pending();
        self.renew_session();
        self.total_frames = self.mode.total_frames(input_len);
        self.status = PlaybackStatus::Idle;
        self.enter_frame(0);
        self.push_state();
    }

    /// Handle a fired tick. Returns `false`, without touching any state,
    /// when `token` is not the live pending tick.
    pub fn on_tick(&mut self, token: TickToken) -> bool {
        if self.status != PlaybackStatus::Playing || !self.session.claim(token) {
            log::debug!(
                "Ignoring stale tick {token:?} (pending {:?}, {:?})",
                self.session.pending,
                self.status
            );
            return false;
        }

        let next = (self.frame + 1).min(self.last_frame());
        if next != self.frame {
            self.enter_frame(next);
        }
        if self.frame >= self.last_frame() {
            self.set_status(PlaybackStatus::Paused);
        } else {
            self.schedule_tick();
        }
        true
    }

    fn enter_frame(&mut self, frame: usize) {
        self.frame = frame;
        self.events.push(TimelineEvent::FrameChanged { frame });
        self.events.push(TimelineEvent::Sound {
            cue: SoundCue::for_frame(frame, self.total_frames),
        });
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            self.status = status;
            self.push_state();
        }
    }

    fn push_state(&mut self) {
        let state = self.state();
        self.events.push(TimelineEvent::PlaybackChanged { state });
    }

    fn schedule_tick(&mut self) {
        let (token, replaced) = self.session.arm();
        if let Some(old) = replaced {
            self.events.push(TimelineEvent::TickCancelled { token: old });
        }
        self.events.push(TimelineEvent::TickScheduled {
            token,
            delay_ms: self.tick_interval().as_millis() as u64,
        });
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.session.cancel() {
            self.events.push(TimelineEvent::TickCancelled { token });
        }
    }

    fn renew_session(&mut self) {
        self.session = AnimationSession::new(self.session.id + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stepwise(len: usize) -> AnimationTimeline {
        let config = VisualizerConfig {
            mode: AnimationMode::Stepwise,
            ..Default::default()
        };
        let mut timeline = AnimationTimeline::new(&config, len);
        timeline.drain_events();
        timeline
    }

    fn live_token(timeline: &AnimationTimeline) -> TickToken {
        timeline.pending_tick().expect("a tick should be pending")
    }

    #[test]
    fn test_initial_state() {
        let config = VisualizerConfig::default();
        let mut timeline = AnimationTimeline::new(&config, 5);
        assert_eq!(timeline.total_frames(), 2);
        assert_eq!(timeline.status(), PlaybackStatus::Idle);

        let events = timeline.drain_events();
        assert_eq!(events[0], TimelineEvent::FrameChanged { frame: 0 });
        assert_eq!(events[1], TimelineEvent::Sound { cue: SoundCue::Init });
    }

    #[test]
    fn test_play_runs_to_terminal_frame_and_stops() {
        let mut timeline = stepwise(5);
        timeline.play();
        assert_eq!(timeline.status(), PlaybackStatus::Playing);

        for expected in 1..=5 {
            let token = live_token(&timeline);
            assert!(timeline.on_tick(token));
            assert_eq!(timeline.frame(), expected);
        }
        assert_eq!(timeline.status(), PlaybackStatus::Paused);
        assert_eq!(timeline.pending_tick(), None);
    }

    #[test]
    fn test_play_from_terminal_restarts() {
        let mut timeline = stepwise(2);
        timeline.next();
        timeline.next();
        assert_eq!(timeline.frame(), 2);
        timeline.drain_events();

        timeline.play();
        assert_eq!(timeline.frame(), 0);
        let events = timeline.drain_events();
        assert!(events.contains(&TimelineEvent::FrameChanged { frame: 0 }));
    }

    #[test]
    fn test_reset_invalidates_pending_tick() {
        let mut timeline = stepwise(4);
        timeline.play();
        let stale = live_token(&timeline);
        timeline.reset();

        assert!(!timeline.on_tick(stale));
        assert_eq!(timeline.frame(), 0);
        assert_eq!(timeline.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn test_stale_token_after_replay_is_ignored() {
        let mut timeline = stepwise(4);
        timeline.play();
        let old = live_token(&timeline);
        timeline.reset();
        timeline.play();
        let fresh = live_token(&timeline);
        assert_ne!(old, fresh);

        assert!(!timeline.on_tick(old));
        assert_eq!(timeline.frame(), 0);
        assert!(timeline.on_tick(fresh));
        assert_eq!(timeline.frame(), 1);
    }

    #[test]
    fn test_pause_cancels_tick() {
        let mut timeline = stepwise(4);
        timeline.play();
        let token = live_token(&timeline);
        timeline.drain_events();

        timeline.pause();
        assert_eq!(timeline.status(), PlaybackStatus::Paused);
        assert!(timeline
            .drain_events()
            .contains(&TimelineEvent::TickCancelled { token }));
        assert!(!timeline.on_tick(token));
    }

    #[test]
    fn test_pause_from_idle_is_noop() {
        let mut timeline = stepwise(4);
        timeline.pause();
        assert_eq!(timeline.status(), PlaybackStatus::Idle);
        assert!(timeline.drain_events().is_empty());
    }

    #[test]
    fn test_manual_steps_force_paused() {
        let mut timeline = stepwise(3);
        timeline.play();
        timeline.next();
        assert_eq!(timeline.frame(), 1);
        assert_eq!(timeline.status(), PlaybackStatus::Paused);
        assert_eq!(timeline.pending_tick(), None);

        timeline.prev();
        assert_eq!(timeline.frame(), 0);
        assert_eq!(timeline.status(), PlaybackStatus::Paused);

        // Already at the first frame: nothing to do.
        timeline.drain_events();
        timeline.prev();
        assert!(timeline.drain_events().is_empty());
    }

    #[test]
    fn test_next_clamps_at_terminal() {
        let mut timeline = stepwise(1);
        timeline.next();
        timeline.next();
        timeline.next();
        assert_eq!(timeline.frame(), 1);
    }

    #[test]
    fn test_speed_change_reschedules_once() {
        let mut timeline = stepwise(4);
        timeline.play();
        let old = live_token(&timeline);
        timeline.drain_events();

        timeline.set_speed(Speed::Fast);
        let events = timeline.drain_events();
        let new = live_token(&timeline);
        assert_eq!(
            &events[..2],
            &[
                TimelineEvent::TickCancelled { token: old },
                TimelineEvent::TickScheduled {
                    token: new,
                    delay_ms: 500
                },
            ]
        );
        assert!(!timeline.on_tick(old));
        assert!(timeline.on_tick(new));
    }

    #[test]
    fn test_speed_change_while_paused_schedules_nothing() {
        let mut timeline = stepwise(4);
        timeline.set_speed(Speed::Slow);
        assert_eq!(timeline.pending_tick(), None);
        assert_eq!(timeline.tick_interval(), Duration::from_millis(2000));
    }

    #[test]
    fn test_sound_cues_once_per_frame_entry() {
        let mut timeline = stepwise(3);
        timeline.play();
        while let Some(token) = timeline.pending_tick() {
            timeline.on_tick(token);
        }
        let cues: Vec<SoundCue> = timeline
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                TimelineEvent::Sound { cue } => Some(cue),
                _ => None,
            })
            .collect();
        assert_eq!(cues, vec![SoundCue::Xor, SoundCue::Xor, SoundCue::Result]);
    }

    #[test]
    fn test_replace_input_resets_everything() {
        let mut timeline = stepwise(3);
        timeline.play();
        let stale = live_token(&timeline);
        timeline.on_tick(stale);
        let stale = live_token(&timeline);

        timeline.replace_input(7);
        assert_eq!(timeline.total_frames(), 8);
        assert_eq!(timeline.frame(), 0);
        assert_eq!(timeline.status(), PlaybackStatus::Idle);
        assert!(!timeline.on_tick(stale));
    }

    #[test]
    fn test_one_shot_uses_fixed_delay() {
        let config = VisualizerConfig {
            one_shot_delay_ms: 1200,
            ..Default::default()
        };
        let mut timeline = AnimationTimeline::new(&config, 9);
        timeline.set_speed(Speed::Fast);
        timeline.drain_events();
        timeline.play();
        assert!(timeline.drain_events().contains(&TimelineEvent::TickScheduled {
            token: TickToken { session: 0, seq: 0 },
            delay_ms: 1200
        }));
        let token = live_token(&timeline);
        assert!(timeline.on_tick(token));
        assert_eq!(timeline.frame(), 1);
        assert_eq!(timeline.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn test_token_from_f64() {
        assert_eq!(
            TickToken::from_f64(3.0, 7.0),
            Some(TickToken { session: 3, seq: 7 })
        );
        assert_eq!(TickToken::from_f64(-1.0, 0.0), None);
        assert_eq!(TickToken::from_f64(0.0, 0.5), None);
        assert_eq!(TickToken::from_f64(f64::NAN, 0.0), None);
        assert_eq!(TickToken::from_f64(0.0, f64::INFINITY), None);
        assert_eq!(TickToken::from_f64(MAX_SAFE_INTEGER + 2.0, 0.0), None);
    }

    #[test]
    fn test_scheduled_token_survives_json_numbers() {
        let mut timeline = stepwise(3);
        timeline.play();
        let events = serde_json::to_value(timeline.drain_events()).unwrap();
        let scheduled = events
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["type"] == "tick_scheduled")
            .unwrap();

        // A JavaScript host sees plain Numbers for every field.
        let token = &scheduled["token"];
        assert!(scheduled["delay_ms"].is_number());
        let token = TickToken::from_f64(
            token["session"].as_f64().unwrap(),
            token["seq"].as_f64().unwrap(),
        )
        .unwrap();
        assert!(timeline.on_tick(token));
        assert_eq!(timeline.frame(), 1);
    }

    #[test]
    fn test_progress() {
        let mut timeline = stepwise(4);
        assert_eq!(timeline.state().progress(), 0.0);
        timeline.next();
        timeline.next();
        assert_eq!(timeline.state().progress(), 0.5);
    }
}
