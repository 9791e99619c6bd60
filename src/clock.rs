//! Clock source description and duration arithmetic.
//!
//! The core never touches the clock tree; it only needs to know how fast the
//! cell feeding a peripheral runs so that abstract [`Duration`]s can be
//! resolved to integer cycle counts. The rounding direction of each
//! conversion is part of its contract.

use core::time::Duration;

/// Clock feeding a peripheral, one of the two recognized options.
///
/// The frequency is whatever the board's clock configuration produced; the
/// core treats it as data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockSource {
    /// Factory-calibrated internal oscillator.
    CalibratedInternal {
        /// Frequency in Hz.
        freq: u32,
    },
    /// External crystal or bypass clock.
    External {
        /// Frequency in Hz.
        freq: u32,
    },
}

impl ClockSource {
    /// Frequency of the source in Hz.
    pub fn freq(self) -> u32 {
        match self {
            ClockSource::CalibratedInternal { freq } => freq,
            ClockSource::External { freq } => freq,
        }
    }
}

/// A requested rate or window cannot be realized from the given clock.
///
/// Reported at setup and fatal to startup; nothing in this crate enters an
/// unrecoverable state after configuration succeeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The duration rounds down to zero cycles of the driving clock.
    PeriodTooShort,
    /// The duration exceeds what the consuming component can count.
    PeriodTooLong,
    /// No integer divisor hits the requested baud rate within tolerance.
    BaudUnachievable {
        /// Closest achievable baud rate in bits per second.
        actual: u32,
    },
}

/// Number of whole clock cycles fitting inside `period`, rounding down.
///
/// Used for periodic deadlines: rounding down guarantees the realized period
/// never overshoots the requested one.
pub fn cycles_for(period: Duration, freq_hz: u32) -> u64 {
    let cycles = period.as_nanos() * freq_hz as u128 / 1_000_000_000;
    cycles.min(u64::MAX as u128) as u64
}

/// Number of clock cycles needed to span at least `window`, rounding up.
///
/// Used for settle windows: rounding up guarantees the realized window covers
/// the full requested duration.
pub fn cycles_spanning(window: Duration, freq_hz: u32) -> u64 {
    let cycles = (window.as_nanos() * freq_hz as u128 + 999_999_999) / 1_000_000_000;
    cycles.min(u64::MAX as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_for_rounds_down() {
        // 1.5 cycles at 10 kHz
        assert_eq!(cycles_for(Duration::from_micros(150), 10_000), 1);
        assert_eq!(cycles_for(Duration::from_secs(1), 40_000), 40_000);
        assert_eq!(cycles_for(Duration::from_micros(99), 10_000), 0);
    }

    #[test]
    fn cycles_spanning_rounds_up() {
        assert_eq!(cycles_spanning(Duration::from_micros(150), 10_000), 2);
        assert_eq!(cycles_spanning(Duration::from_secs(1), 40_000), 40_000);
        assert_eq!(cycles_spanning(Duration::from_micros(1), 10_000), 1);
    }

    #[test]
    fn clock_source_reports_frequency() {
        assert_eq!(
            ClockSource::CalibratedInternal { freq: 1_000_000 }.freq(),
            1_000_000
        );
        assert_eq!(ClockSource::External { freq: 32_768 }.freq(), 32_768);
    }
}
