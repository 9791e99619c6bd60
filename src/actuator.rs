//! Boolean output actuation.
//!
//! Drives a single output pin (typically an LED) in response to dispatcher
//! decisions. The physical pin is write-only from the software's point of
//! view, so the actuator keeps a shadow of the last commanded level instead
//! of reading the pin back for control decisions.

use embedded_hal::digital::{OutputPin, PinState};

/// Write-only driver for one output pin.
pub struct Actuator<P: OutputPin> {
    pin: P,
    level: bool,
}

impl<P: OutputPin> Actuator<P> {
    /// Take ownership of `pin` and drive it to `initial` immediately.
    pub fn new(mut pin: P, initial: bool) -> Result<Self, P::Error> {
        pin.set_state(PinState::from(initial))?;
        Ok(Actuator {
            pin,
            level: initial,
        })
    }

    /// Drive the output to `level`.
    pub fn set(&mut self, level: bool) -> Result<(), P::Error> {
        self.pin.set_state(PinState::from(level))?;
        self.level = level;
        Ok(())
    }

    /// Invert the output.
    pub fn toggle(&mut self) -> Result<(), P::Error> {
        self.set(!self.level)
    }

    /// Last commanded level.
    pub fn level(&self) -> bool {
        self.level
    }

    /// Release the underlying pin.
    pub fn free(self) -> P {
        self.pin
    }
}
