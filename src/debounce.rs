//! Debounced edge detection for mechanical switches.
//!
//! Replaces the empty-bodied delay loops that debounce buttons in small
//! firmware with an explicit settle timer: a level change only becomes an
//! edge after the new level has held for the full debounce window, and any
//! bounce back restarts the window. The window is an abstract duration,
//! decoupled from CPU clock speed and compiler optimization.
//!
//! The detector is sampled, not interrupt-driven: call [`Debouncer::sample`]
//! once per tick of whatever drives your loop, at the sample rate the window
//! was computed from. Sampling faster than that rate shrinks the realized
//! window below the requested one.
//!
//! When several inputs share one interrupt source, give each its own
//! `Debouncer` and attribute the wakeup with the platform's interrupt vector
//! register (and a distinct [`Events`](crate::notify::Events) bit per input);
//! never infer the source from timing.

use core::time::Duration;

use embedded_hal::digital::InputPin;

use crate::clock::{cycles_spanning, ConfigurationError};

/// A clean transition reported after the input settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// The level settled high after being stably low.
    Rising,
    /// The level settled low after being stably high.
    Falling,
}

/// Settle-timer edge detector for one digital input.
///
/// Missed or duplicate edges under electrical noise longer than the window
/// are accepted behavior, not errors, so nothing here is fallible after
/// construction.
#[derive(Debug)]
pub struct Debouncer {
    /// Consecutive deviating samples required to accept a transition.
    settle: u16,
    /// Last reported stable level.
    level: bool,
    /// Samples still required before the pending transition commits.
    /// Zero means no transition is pending.
    remaining: u16,
}

impl Debouncer {
    /// Create a detector for an input currently at `initial_level`.
    ///
    /// `window` is converted to a sample count at `sample_rate_hz`, rounding
    /// up so stability is required for at least the full window. Errors if
    /// the window rounds to zero samples or overflows the settle counter.
    pub fn new(
        initial_level: bool,
        window: Duration,
        sample_rate_hz: u32,
    ) -> Result<Self, ConfigurationError> {
        let settle = cycles_spanning(window, sample_rate_hz);
        if settle == 0 {
            return Err(ConfigurationError::PeriodTooShort);
        }
        if settle > u16::MAX as u64 {
            return Err(ConfigurationError::PeriodTooLong);
        }
        Ok(Debouncer {
            settle: settle as u16,
            level: initial_level,
            remaining: 0,
        })
    }

    /// Feed one raw sample; returns the edge once the new level has held for
    /// the full window.
    ///
    /// A sample matching the stable level cancels any pending transition and
    /// re-arms the settle timer from scratch.
    pub fn sample(&mut self, raw: bool) -> Option<Edge> {
        if raw == self.level {
            self.remaining = 0;
            return None;
        }
        if self.remaining == 0 {
            self.remaining = self.settle;
        }
        self.remaining -= 1;
        if self.remaining > 0 {
            return None;
        }
        self.level = raw;
        Some(if raw { Edge::Rising } else { Edge::Falling })
    }

    /// Sample directly from an [`InputPin`], propagating the pin's error.
    pub fn sample_pin<P: InputPin>(&mut self, pin: &mut P) -> Result<Option<Edge>, P::Error> {
        let raw = pin.is_high()?;
        Ok(self.sample(raw))
    }

    /// Last reported stable level.
    pub fn level(&self) -> bool {
        self.level
    }
}
