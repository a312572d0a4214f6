//! Sound hook boundary. The core only names cues; synthesis lives elsewhere.

use serde::{Deserialize, Serialize};

use super::TimelineEvent;

/// Discrete cue fired once when a frame is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundCue {
    /// Entered the initial frame.
    Init,
    /// Entered an intermediate XOR step frame.
    Xor,
    /// Entered the terminal result frame.
    Result,
}

impl SoundCue {
    /// Cue for entering `frame` of a `total_frames` timeline.
    pub fn for_frame(frame: usize, total_frames: usize) -> Self {
        if frame == 0 {
            SoundCue::Init
        } else if frame + 1 >= total_frames {
            SoundCue::Result
        } else {
            SoundCue::Xor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SoundCue::Init => "init",
            SoundCue::Xor => "xor",
            SoundCue::Result => "result",
        }
    }
}

/// Consumer of sound cues, e.g. an audio component on the host page.
pub trait SoundSink {
    fn emit(&mut self, cue: SoundCue);
}

impl<F: FnMut(SoundCue)> SoundSink for F {
    fn emit(&mut self, cue: SoundCue) {
        self(cue)
    }
}

/// Sink that drops every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SoundSink for NullSink {
    fn emit(&mut self, _cue: SoundCue) {}
}

/// Sink that logs cues at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SoundSink for LogSink {
    fn emit(&mut self, cue: SoundCue) {
        log::debug!("sound cue: {}", cue.as_str());
    }
}

/// Forwards the sound cues found in a batch of timeline events to a sink.
pub struct SoundHookAdapter<S: SoundSink> {
    sink: S,
    muted: bool,
}

impl<S: SoundSink> SoundHookAdapter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, muted: false }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Emit every cue in `events`, in order. Returns the number emitted.
    pub fn dispatch(&mut self, events: &[TimelineEvent]) -> usize {
        if self.muted {
            return 0;
        }
        let mut emitted = 0;
        for event in events {
            if let TimelineEvent::Sound { cue } = event {
                self.sink.emit(*cue);
                emitted += 1;
            }
        }
        emitted
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_for_frame() {
        assert_eq!(SoundCue::for_frame(0, 6), SoundCue::Init);
        assert_eq!(SoundCue::for_frame(3, 6), SoundCue::Xor);
        assert_eq!(SoundCue::for_frame(5, 6), SoundCue::Result);
        assert_eq!(SoundCue::for_frame(1, 2), SoundCue::Result);
    }

    #[test]
    fn test_adapter_forwards_only_sound_events() {
        let mut heard = Vec::new();
        let events = vec![
            TimelineEvent::FrameChanged { frame: 1 },
            TimelineEvent::Sound { cue: SoundCue::Xor },
            TimelineEvent::FrameChanged { frame: 2 },
            TimelineEvent::Sound {
                cue: SoundCue::Result,
            },
        ];
        {
            let mut adapter = SoundHookAdapter::new(|cue: SoundCue| heard.push(cue));
            assert_eq!(adapter.dispatch(&events), 2);
        }
        assert_eq!(heard, vec![SoundCue::Xor, SoundCue::Result]);
    }

    #[test]
    fn test_muted_adapter_is_silent() {
        let mut count = 0;
        {
            let mut adapter = SoundHookAdapter::new(|_: SoundCue| count += 1);
            adapter.set_muted(true);
            assert_eq!(
                adapter.dispatch(&[TimelineEvent::Sound { cue: SoundCue::Init }]),
                0
            );
        }
        assert_eq!(count, 0);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&SoundCue::Result).unwrap(), "\"result\"");
    }
}
