//! Timer hosts for the timeline's scheduled ticks.

use std::collections::BTreeMap;
use std::time::Duration;

use super::timeline::{AnimationTimeline, TickToken, TimelineEvent};

/// A timer facility able to fire a token after a delay.
///
/// Implementations only arm and disarm timers; when one fires they hand the
/// token back to [`AnimationTimeline::on_tick`].
pub trait TickScheduler {
    fn schedule(&mut self, token: TickToken, delay: Duration);
    fn cancel(&mut self, token: TickToken);
}

/// Forward the scheduling requests found in `events` to `scheduler`.
pub fn apply_scheduling<S: TickScheduler + ?Sized>(scheduler: &mut S, events: &[TimelineEvent]) {
    for event in events {
        match *event {
            TimelineEvent::TickScheduled { token, delay_ms } => {
                scheduler.schedule(token, Duration::from_millis(delay_ms))
            }
            TimelineEvent::TickCancelled { token } => scheduler.cancel(token),
            _ => {}
        }
    }
}

/// Deterministic scheduler driven by a virtual clock.
///
/// Usage:
/// ```ignore
/// let mut scheduler = VirtualScheduler::new();
/// timeline.play();
/// let events = scheduler.advance(&mut timeline, Duration::from_secs(3));
/// ```
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now: Duration,
    /// Armed timers keyed by (due time, arm order).
    timers: BTreeMap<(Duration, u64), TickToken>,
    armed: u64,
    /// When set, cancellations are dropped, modelling a host whose timers
    /// cannot be cleared.
    ignore_cancel: bool,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler that never disarms timers; cancelled ticks still fire.
    pub fn without_cancellation() -> Self {
        Self {
            ignore_cancel: true,
            ..Self::default()
        }
    }

    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed timers.
    #[inline]
    pub fn armed(&self) -> usize {
        self.timers.len()
    }

    /// Due time of the earliest armed timer.
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.keys().next().map(|&(due, _)| due)
    }

    /// Move the clock forward by `by`, firing every timer that falls due in
    /// order. Events already queued on the timeline are applied first.
    /// Returns every timeline event observed, in order.
    pub fn advance(&mut self, timeline: &mut AnimationTimeline, by: Duration) -> Vec<TimelineEvent> {
        let target = self.now + by;
        let mut observed = timeline.drain_events();
        apply_scheduling(self, &observed);

        while let Some(entry) = self.timers.first_entry() {
            let (due, _) = *entry.key();
            if due > target {
                break;
            }
            let token = entry.remove();
            self.now = due;
            timeline.on_tick(token);

            let events = timeline.drain_events();
            apply_scheduling(self, &events);
            observed.extend(events);
        }

        self.now = target;
        observed
    }

    /// Fire timers until none are armed or `limit` elapses.
    pub fn run_until_idle(
        &mut self,
        timeline: &mut AnimationTimeline,
        limit: Duration,
    ) -> Vec<TimelineEvent> {
        let deadline = self.now + limit;
        let mut observed = timeline.drain_events();
        apply_scheduling(self, &observed);

        while let Some(due) = self.next_due() {
            if due > deadline {
                break;
            }
            observed.extend(self.advance(timeline, due - self.now));
        }
        observed
    }
}

impl TickScheduler for VirtualScheduler {
    fn schedule(&mut self, token: TickToken, delay: Duration) {
        self.timers.insert((self.now + delay, self.armed), token);
        self.armed += 1;
    }

    fn cancel(&mut self, token: TickToken) {
        if self.ignore_cancel {
            return;
        }
        self.timers.retain(|_, t| *t != token);
    }
}
