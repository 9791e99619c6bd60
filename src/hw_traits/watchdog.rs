//! Watchdog contract.

/// A running watchdog that resets the system unless fed.
///
/// The core only ever feeds; configuring, holding or re-arming the watchdog
/// is the platform's business.
pub trait WatchdogDevice {
    /// Reset the watchdog countdown.
    fn feed(&mut self);
}
