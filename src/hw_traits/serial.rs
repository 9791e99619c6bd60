//! UART register-layer contract.

use crate::clock::ClockSource;
use crate::serial::{BaudDivisor, Loopback};

/// A UART engine with one-byte-deep transmit and receive buffers.
///
/// `tx_ready` mirrors the transmit-buffer-empty flag and `rx_pending` the
/// receive-buffer-full flag. Both are edge-triggered on the hardware side;
/// reading the receive buffer is expected to clear `rx_pending`, and writing
/// the transmit buffer to clear `tx_ready`, as every UART in this class does.
pub trait SerialDevice {
    /// Apply clock selection, baud divisor and loopback routing.
    ///
    /// Called once at channel setup, before any transfer. Implementations
    /// hold the engine in reset while reprogramming, per the usual
    /// software-reset dance.
    fn configure(&mut self, clock: ClockSource, divisor: BaudDivisor, loopback: Loopback);

    /// Whether the transmit buffer can accept a byte.
    fn tx_ready(&self) -> bool;

    /// Write a byte into the transmit buffer. Only valid when
    /// [`tx_ready`](SerialDevice::tx_ready) reports true.
    fn tx_write(&mut self, byte: u8);

    /// Whether a received byte is waiting in the receive buffer.
    fn rx_pending(&self) -> bool;

    /// Read and consume the received byte. Only valid when
    /// [`rx_pending`](SerialDevice::rx_pending) reports true.
    fn rx_read(&mut self) -> u8;

    /// Invoke the registered handler when a byte arrives.
    fn enable_rx_interrupt(&mut self);

    /// Stop invoking the receive handler.
    fn disable_rx_interrupt(&mut self);

    /// Invoke the registered handler when the transmit buffer drains.
    fn enable_tx_interrupt(&mut self);

    /// Stop invoking the transmit handler.
    fn disable_tx_interrupt(&mut self);
}
