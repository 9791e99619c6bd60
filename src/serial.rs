//! Asynchronous serial channel.
//!
//! A minimal UART transmit/receive engine over the one-byte-deep buffers
//! every MSP430-class part provides. Each direction is an independent
//! one-place buffer: at most one transmit frame and one receive frame are in
//! flight at a time, and a completed receive must be drained before the next
//! may land losslessly.
//!
//! Begin configuration with [`SerialConfig::new`]; [`SerialConfig::init`]
//! validates the baud divisor against the driving clock and produces a
//! [`SerialChannel`]. Completion may be observed by the main body polling, or
//! signaled by an interrupt handler that raises an event latch bit — the
//! channel's contract is identical either way and callers must not assume
//! which is in effect.
//!
//! The channel implements both [`embedded-io`](embedded_io)'s buffer-based
//! blocking traits and [`embedded-hal-nb`](embedded_hal_nb::serial)'s
//! single-byte non-blocking ones. With a single-byte hardware buffer the
//! `embedded-io` reads and writes always move exactly one byte despite
//! taking slices.

use core::convert::Infallible;
use core::num::NonZeroU32;

use crate::clock::{ClockSource, ConfigurationError};
use crate::hw_traits::serial::SerialDevice;

/// Maximum deviation from the nominal baud rate, in parts per ten thousand.
///
/// 0.5 % keeps the accumulated error under a quarter bit across a ten-bit
/// frame. A divisor that cannot do better is a configuration error, never
/// silently accepted.
pub const BAUD_TOLERANCE_E4: u32 = 50;

/// Loopback settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Loopback {
    /// No loopback
    NoLoop,
    /// Tx feeds into Rx
    Loopback,
}

/// Integer divisor from the driving clock down to the bit clock.
///
/// Computed by [`SerialConfig::init`] with round-to-nearest and handed to the
/// register layer opaquely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaudDivisor(pub u16);

/// Attempted transmit while the previous byte is still in flight.
///
/// Recoverable: retry after completion or apply backpressure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Busy;

/// Progress of a frame through its one-place buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameState {
    Idle,
    InFlight,
}

/// Builder for a serial channel.
pub struct SerialConfig<S: SerialDevice> {
    dev: S,
    baud: NonZeroU32,
    clock: ClockSource,
    loopback: Loopback,
}

impl<S: SerialDevice> SerialConfig<S> {
    /// Describe a channel at `baud` bits per second fed by `clock`.
    pub fn new(dev: S, baud: u32, clock: ClockSource, loopback: Loopback) -> Self {
        const ONE: NonZeroU32 = unsafe { NonZeroU32::new_unchecked(1) };
        SerialConfig {
            dev,
            baud: NonZeroU32::new(baud).unwrap_or(ONE),
            clock,
            loopback,
        }
    }

    /// Validate the configuration, program the device and open the channel.
    ///
    /// Fails with [`ConfigurationError::BaudUnachievable`] if no integer
    /// divisor lands within [`BAUD_TOLERANCE_E4`] of the requested rate.
    pub fn init(mut self) -> Result<SerialChannel<S>, ConfigurationError> {
        let divisor = calculate_divisor(self.clock.freq(), self.baud)?;
        self.dev.configure(self.clock, divisor, self.loopback);
        Ok(SerialChannel {
            dev: self.dev,
            tx: FrameState::Idle,
            rx: None,
            rx_overruns: 0,
        })
    }
}

fn calculate_divisor(clk_freq: u32, bps: NonZeroU32) -> Result<BaudDivisor, ConfigurationError> {
    // Round to nearest, then clamp into the 16-bit divisor register
    let n = ((clk_freq as u64 + (bps.get() / 2) as u64) / bps.get() as u64).clamp(1, 0xFFFF);
    let actual = clk_freq / n as u32;
    let deviation_e4 = (actual as u64).abs_diff(bps.get() as u64) * 10_000 / bps.get() as u64;
    if deviation_e4 > BAUD_TOLERANCE_E4 as u64 {
        Err(ConfigurationError::BaudUnachievable { actual })
    } else {
        Ok(BaudDivisor(n as u16))
    }
}

/// Half-duplex-buffered byte channel over a [`SerialDevice`].
pub struct SerialChannel<S: SerialDevice> {
    dev: S,
    tx: FrameState,
    /// Drained receive buffer; `Some` is the Ready state.
    rx: Option<u8>,
    rx_overruns: u8,
}

impl<S: SerialDevice> SerialChannel<S> {
    /// Observe transmit completion and retire the in-flight frame.
    fn poll_tx(&mut self) {
        if self.tx == FrameState::InFlight && self.dev.tx_ready() {
            self.tx = FrameState::Idle;
        }
    }

    /// Move a completed receive out of the hardware buffer.
    ///
    /// If a byte lands while the previous one is still undrained, the newer
    /// byte wins and the loss is counted, mirroring the one-deep hardware
    /// buffer.
    fn poll_rx(&mut self) {
        if self.dev.rx_pending() {
            let byte = self.dev.rx_read();
            if self.rx.is_some() {
                self.rx_overruns = self.rx_overruns.saturating_add(1);
            }
            self.rx = Some(byte);
        }
    }

    /// Start transmitting one byte.
    ///
    /// Fails with [`Busy`] while the previous byte's transmission has not yet
    /// completed.
    pub fn send(&mut self, byte: u8) -> Result<(), Busy> {
        self.poll_tx();
        if self.tx != FrameState::Idle {
            return Err(Busy);
        }
        self.dev.tx_write(byte);
        self.tx = FrameState::InFlight;
        Ok(())
    }

    /// Take the buffered received byte, if any.
    pub fn try_receive(&mut self) -> Option<u8> {
        self.poll_rx();
        self.rx.take()
    }

    /// Whether the transmit direction is idle.
    pub fn tx_idle(&mut self) -> bool {
        self.poll_tx();
        self.tx == FrameState::Idle
    }

    /// Receives that overwrote an undrained byte. Saturates at `u8::MAX`.
    pub fn rx_overrun_count(&self) -> u8 {
        self.rx_overruns
    }

    /// Fire the receive handler when a byte arrives. Stays enabled until
    /// explicitly disabled.
    pub fn enable_rx_interrupts(&mut self) {
        self.dev.enable_rx_interrupt();
    }

    /// Stop firing the receive handler.
    pub fn disable_rx_interrupts(&mut self) {
        self.dev.disable_rx_interrupt();
    }

    /// Fire the transmit handler when the buffer drains. Stays enabled until
    /// explicitly disabled.
    pub fn enable_tx_interrupts(&mut self) {
        self.dev.enable_tx_interrupt();
    }

    /// Stop firing the transmit handler.
    pub fn disable_tx_interrupts(&mut self) {
        self.dev.disable_tx_interrupt();
    }

    /// Release the underlying device.
    pub fn free(self) -> S {
        self.dev
    }

    // Internal send function
    fn nb_send(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        self.send(byte).map_err(|_busy| nb::Error::WouldBlock)
    }

    // Internal receive function
    fn nb_recv(&mut self) -> nb::Result<u8, Infallible> {
        self.try_receive().ok_or(nb::Error::WouldBlock)
    }

    // Internal flush function
    fn nb_flush(&mut self) -> nb::Result<(), Infallible> {
        if self.tx_idle() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

mod emb_io {
    use super::*;
    use embedded_io::{ErrorType, Read, ReadReady, Write, WriteReady};
    use nb::block;

    impl<S: SerialDevice> ErrorType for SerialChannel<S> {
        type Error = Infallible;
    }

    impl<S: SerialDevice> Read for SerialChannel<S> {
        /// Read one byte into the buffer, blocking until one is available,
        /// then return `Ok(1)`. If `buf` is empty, returns `Ok(0)` without
        /// blocking.
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            if buf.is_empty() {
                return Ok(0);
            }
            buf[0] = block!(self.nb_recv())?;
            Ok(1)
        }
    }

    impl<S: SerialDevice> ReadReady for SerialChannel<S> {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            self.poll_rx();
            Ok(self.rx.is_some())
        }
    }

    impl<S: SerialDevice> Write for SerialChannel<S> {
        /// Send only **the first** byte of the buffer, blocking until the
        /// transmit direction is free, then return `Ok(1)`. Use `write_all`
        /// to send an entire buffer. If `buf` is empty, returns `Ok(0)`
        /// without blocking.
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            if buf.is_empty() {
                return Ok(0);
            }
            block!(self.nb_send(buf[0]))?;
            Ok(1)
        }

        /// Block until the in-flight byte, if any, has completed.
        fn flush(&mut self) -> Result<(), Self::Error> {
            block!(self.nb_flush())
        }
    }

    impl<S: SerialDevice> WriteReady for SerialChannel<S> {
        fn write_ready(&mut self) -> Result<bool, Self::Error> {
            Ok(self.tx_idle())
        }
    }
}

mod ehal_nb1 {
    use super::*;
    use embedded_hal_nb::serial::{ErrorType, Read, Write};

    impl<S: SerialDevice> ErrorType for SerialChannel<S> {
        type Error = Infallible;
    }

    impl<S: SerialDevice> Read<u8> for SerialChannel<S> {
        /// Take the buffered received byte or return `WouldBlock`. Hardware
        /// overruns overwrite and are visible only through
        /// [`SerialChannel::rx_overrun_count`].
        fn read(&mut self) -> nb::Result<u8, Self::Error> {
            self.nb_recv()
        }
    }

    impl<S: SerialDevice> Write<u8> for SerialChannel<S> {
        /// Start transmitting a byte, or return `WouldBlock` while the
        /// previous one is in flight.
        fn write(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
            self.nb_send(byte)
        }

        fn flush(&mut self) -> nb::Result<(), Self::Error> {
            self.nb_flush()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory UART: a byte written to tx sits in flight until the test
    /// calls `complete_tx`, which loops it into rx when loopback is on.
    #[derive(Default)]
    struct FakeUart {
        configured_with: Option<(ClockSource, BaudDivisor, Loopback)>,
        tx_buf: Option<u8>,
        rx_buf: Option<u8>,
        rx_ie: bool,
    }

    impl FakeUart {
        fn complete_tx(&mut self) {
            let byte = self.tx_buf.take().expect("nothing in flight");
            if let Some((_, _, Loopback::Loopback)) = self.configured_with {
                self.rx_buf = Some(byte);
            }
        }
    }

    impl SerialDevice for FakeUart {
        fn configure(&mut self, clock: ClockSource, divisor: BaudDivisor, loopback: Loopback) {
            self.configured_with = Some((clock, divisor, loopback));
        }
        fn tx_ready(&self) -> bool {
            self.tx_buf.is_none()
        }
        fn tx_write(&mut self, byte: u8) {
            self.tx_buf = Some(byte);
        }
        fn rx_pending(&self) -> bool {
            self.rx_buf.is_some()
        }
        fn rx_read(&mut self) -> u8 {
            self.rx_buf.take().unwrap()
        }
        fn enable_rx_interrupt(&mut self) {
            self.rx_ie = true;
        }
        fn disable_rx_interrupt(&mut self) {
            self.rx_ie = false;
        }
        fn enable_tx_interrupt(&mut self) {}
        fn disable_tx_interrupt(&mut self) {}
    }

    fn smclk_1mhz() -> ClockSource {
        ClockSource::CalibratedInternal { freq: 1_000_000 }
    }

    fn channel(loopback: Loopback) -> SerialChannel<FakeUart> {
        SerialConfig::new(FakeUart::default(), 9600, smclk_1mhz(), loopback)
            .init()
            .unwrap()
    }

    #[test]
    fn divisor_is_rounded_to_nearest_within_tolerance() {
        // 1 MHz / 104 = 9615.4 bps, 0.16% off nominal
        assert_eq!(
            calculate_divisor(1_000_000, NonZeroU32::new(9600).unwrap()).unwrap(),
            BaudDivisor(104)
        );
        // 32768 Hz / 3 = 10923 bps, 13.8% off: must be rejected at setup
        assert_eq!(
            calculate_divisor(32_768, NonZeroU32::new(9600).unwrap()).unwrap_err(),
            ConfigurationError::BaudUnachievable { actual: 10_922 }
        );
    }

    #[test]
    fn init_programs_the_device() {
        let ch = channel(Loopback::NoLoop);
        let dev = ch.free();
        assert_eq!(
            dev.configured_with,
            Some((smclk_1mhz(), BaudDivisor(104), Loopback::NoLoop))
        );
    }

    #[test]
    fn second_send_before_completion_is_busy() {
        let mut ch = channel(Loopback::NoLoop);
        assert_eq!(ch.send(0x56), Ok(()));
        assert_eq!(ch.send(0x57), Err(Busy));
        ch.dev.complete_tx();
        assert_eq!(ch.send(0x57), Ok(()));
    }

    #[test]
    fn loopback_round_trip_preserves_payload() {
        let mut ch = channel(Loopback::Loopback);
        assert_eq!(ch.try_receive(), None);
        ch.send(0x56).unwrap();
        ch.dev.complete_tx();
        assert_eq!(ch.try_receive(), Some(0x56));
        // Ready -> Idle: the buffer is drained
        assert_eq!(ch.try_receive(), None);
    }

    #[test]
    fn undrained_receive_is_overwritten_and_counted() {
        let mut ch = channel(Loopback::Loopback);
        ch.send(0x01).unwrap();
        ch.dev.complete_tx();
        ch.poll_rx();
        ch.send(0x02).unwrap();
        ch.dev.complete_tx();
        assert_eq!(ch.try_receive(), Some(0x02));
        assert_eq!(ch.rx_overrun_count(), 1);
    }

    #[test]
    fn nb_write_would_block_while_in_flight() {
        use embedded_hal_nb::serial::Write;
        let mut ch = channel(Loopback::NoLoop);
        Write::write(&mut ch, b'A').unwrap();
        assert_eq!(Write::write(&mut ch, b'B'), Err(nb::Error::WouldBlock));
        assert_eq!(Write::flush(&mut ch), Err(nb::Error::WouldBlock));
        ch.dev.complete_tx();
        assert_eq!(Write::flush(&mut ch), Ok(()));
    }

    #[test]
    fn emb_io_moves_one_byte_at_a_time() {
        use embedded_io::{Read, ReadReady, Write};
        let mut ch = channel(Loopback::Loopback);
        assert_eq!(Write::write(&mut ch, b"V").unwrap(), 1);
        ch.dev.complete_tx();
        assert!(ch.read_ready().unwrap());
        let mut buf = [0u8; 4];
        assert_eq!(Read::read(&mut ch, &mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'V');
    }

    #[test]
    fn interrupt_enables_pass_through() {
        let mut ch = channel(Loopback::NoLoop);
        ch.enable_rx_interrupts();
        assert!(ch.dev.rx_ie);
        ch.disable_rx_interrupts();
        assert!(!ch.dev.rx_ie);
    }
}
