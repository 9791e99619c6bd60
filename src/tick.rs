//! Periodic tick source over a compare-match timer.
//!
//! Wraps one [`TimerDevice`] into a fixed-period, edge-triggered "tick
//! elapsed" flag. Periods longer than the counter width are chained as N
//! full-scale segments plus one partial segment, generalizing the
//! count-to-50000-twenty-times loops this class of firmware writes by hand.
//!
//! The elapsed flag follows acknowledge-before-rearm semantics: [`poll`]
//! reports it, [`clear`] acknowledges it, and a period completing before the
//! previous one was acknowledged is counted as an overrun, not raised twice.
//!
//! [`poll`]: TickSource::poll
//! [`clear`]: TickSource::clear

use core::time::Duration;

use crate::clock::{cycles_for, ConfigurationError};
use crate::hw_traits::timer::TimerDevice;

/// Fixed-period tick generator owning one hardware timer.
///
/// Usable from either side of the notification split: the main body calls
/// [`poll`](TickSource::poll)/[`clear`](TickSource::clear), or a compare-match
/// handler calls [`advance`](TickSource::advance) and raises an event latch
/// bit on completion. Two sources over distinct timers never interfere.
#[derive(Debug)]
pub struct TickSource<T: TimerDevice> {
    timer: T,
    /// Full-scale segments per period.
    rollovers: u32,
    /// Final partial segment in timer cycles, zero if the period divides evenly.
    remainder: u16,
    /// Full or partial segments completed within the current period.
    segment: u32,
    /// Edge-triggered period-elapsed flag, held until acknowledged.
    fired: bool,
    overruns: u8,
}

impl<T: TimerDevice> TickSource<T> {
    /// Configure `timer` to tick every `period` and start it.
    ///
    /// The period is resolved against the timer's driving clock, rounding
    /// down to whole cycles so a deadline is never overshot. A period shorter
    /// than one cycle is rejected rather than silently truncated.
    pub fn new(timer: T, period: Duration, clock_hz: u32) -> Result<Self, ConfigurationError> {
        let mut source = TickSource {
            timer,
            rollovers: 0,
            remainder: 0,
            segment: 0,
            fired: false,
            overruns: 0,
        };
        source.set_period(period, clock_hz)?;
        Ok(source)
    }

    /// Re-arm with a new period, restarting the timer from zero.
    ///
    /// Always available; one-shot versus repeating behavior is the policy of
    /// whatever composes this source.
    pub fn set_period(&mut self, period: Duration, clock_hz: u32) -> Result<(), ConfigurationError> {
        let total = cycles_for(period, clock_hz);
        if total == 0 {
            return Err(ConfigurationError::PeriodTooShort);
        }
        let max = T::MAX_COUNT as u64;
        let rollovers = total / max;
        if rollovers > u32::MAX as u64 {
            return Err(ConfigurationError::PeriodTooLong);
        }
        self.timer.stop();
        self.rollovers = rollovers as u32;
        self.remainder = (total % max) as u16;
        self.segment = 0;
        self.timer.set_compare(self.first_compare());
        self.timer.start();
        Ok(())
    }

    fn first_compare(&self) -> u16 {
        if self.rollovers > 0 {
            T::MAX_COUNT
        } else {
            self.remainder
        }
    }

    fn segments_per_period(&self) -> u32 {
        self.rollovers + (self.remainder != 0) as u32
    }

    /// Consume the hardware elapsed flag and step the rollover chain.
    ///
    /// Returns true exactly when a full period boundary completes on this
    /// call. Short enough for an interrupt handler body; never blocks.
    pub fn advance(&mut self) -> bool {
        if !self.timer.elapsed() {
            return false;
        }
        self.timer.clear_elapsed();
        self.segment += 1;
        if self.segment == self.rollovers && self.remainder != 0 {
            // Entering the final, partial segment
            self.timer.set_compare(self.remainder);
        }
        if self.segment < self.segments_per_period() {
            return false;
        }
        self.segment = 0;
        if self.rollovers > 0 {
            self.timer.set_compare(T::MAX_COUNT);
        }
        if self.fired {
            // Previous tick never acknowledged; the older one is lost
            self.overruns = self.overruns.saturating_add(1);
        }
        self.fired = true;
        true
    }

    /// Non-blocking check of the period-elapsed flag.
    ///
    /// Steps the rollover chain as a side effect, then reports whether a tick
    /// is pending. Stays true until [`clear`](TickSource::clear); a new
    /// period cannot be reported before the pending one is acknowledged.
    pub fn poll(&mut self) -> bool {
        self.advance();
        self.fired
    }

    /// Acknowledge the pending tick.
    pub fn clear(&mut self) {
        self.fired = false;
    }

    /// Ticks that completed while a previous tick was still unacknowledged.
    ///
    /// Event loss by design, mirroring the single hardware flag; saturates at
    /// `u8::MAX`.
    pub fn overrun_count(&self) -> u8 {
        self.overruns
    }

    /// Halt the underlying timer without losing configuration.
    pub fn stop(&mut self) {
        self.timer.stop();
    }

    /// Restart the underlying timer from zero.
    pub fn start(&mut self) {
        self.segment = 0;
        self.timer.set_compare(self.first_compare());
        self.timer.start();
    }

    /// Fire the compare-match handler on every segment boundary.
    ///
    /// The handler should call [`advance`](TickSource::advance) and treat a
    /// true return as the period notification. Stays enabled until
    /// explicitly disabled.
    pub fn enable_interrupts(&mut self) {
        self.timer.enable_interrupt();
    }

    /// Stop firing the compare-match handler.
    pub fn disable_interrupts(&mut self) {
        self.timer.disable_interrupt();
    }

    /// Release the underlying timer.
    pub fn free(mut self) -> T {
        self.timer.stop();
        self.timer
    }
}
