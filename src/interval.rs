//! Software interval counter.
//!
//! Pure counting logic with no hardware access: feeds on ticks from a
//! [`TickSource`](crate::tick::TickSource) and produces a derived event every
//! `target` ticks. As long as [`on_tick`](IntervalCounter::on_tick) is called
//! exactly once per underlying tick, the N-th completion lands on tick
//! `N × target` exactly, with no drift accumulation.

use core::num::NonZeroU16;

/// The configured number of ticks has elapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalComplete;

/// Counts ticks up to a target and wraps.
///
/// Owned by whatever logical feature composes a tick source ("toggle the LED
/// every 20 ticks"). Mutated exclusively by the main body, never by a
/// handler, so it needs no synchronization.
#[derive(Clone, Copy, Debug)]
pub struct IntervalCounter {
    target: NonZeroU16,
    count: u16,
}

impl IntervalCounter {
    /// Counter completing every `target` ticks.
    pub fn new(target: NonZeroU16) -> Self {
        IntervalCounter { target, count: 0 }
    }

    /// Record one tick; reports completion every `target` calls.
    pub fn on_tick(&mut self) -> Option<IntervalComplete> {
        self.count += 1;
        if self.count == self.target.get() {
            self.count = 0;
            Some(IntervalComplete)
        } else {
            None
        }
    }

    /// Ticks counted toward the current interval.
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Restart the current interval from zero.
    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Re-arm with a new target and restart from zero.
    ///
    /// Always available; one-shot versus repeating behavior is the policy of
    /// the composing feature.
    pub fn set_target(&mut self, target: NonZeroU16) {
        self.target = target;
        self.count = 0;
    }
}
