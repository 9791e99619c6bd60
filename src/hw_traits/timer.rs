//! Compare-match timer contract.

/// A free-running hardware counter with a single compare register.
///
/// The counter counts driving-clock cycles from zero up to the compare value,
/// raises its elapsed flag, wraps, and keeps counting. The flag is
/// edge-triggered: it stays raised until [`clear_elapsed`](TimerDevice::clear_elapsed)
/// is called, and raising it again before then is silent at this layer.
///
/// Each implementor owns exactly one hardware timer, so two devices never
/// interfere with each other.
pub trait TimerDevice {
    /// Largest compare value the counter supports.
    const MAX_COUNT: u16 = u16::MAX;

    /// Set the compare value, in driving-clock cycles per elapsed flag.
    ///
    /// Takes effect for the segment after the counter next wraps; callers
    /// reprogram the compare value only from within an elapsed-flag
    /// acknowledgment, where the counter has just wrapped.
    fn set_compare(&mut self, count: u16);

    /// Reset the counter to zero and start counting.
    fn start(&mut self);

    /// Halt the counter. The elapsed flag is left untouched.
    fn stop(&mut self);

    /// Whether the compare match has been reached since the last clear.
    fn elapsed(&self) -> bool;

    /// Acknowledge the elapsed flag so it can rise again.
    fn clear_elapsed(&mut self);

    /// Invoke the registered handler on future compare matches.
    fn enable_interrupt(&mut self);

    /// Stop invoking the handler. Already-raised flags are unaffected.
    fn disable_interrupt(&mut self);
}
