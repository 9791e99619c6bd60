//! Cooperative polling-plus-interrupt scheduler core for MSP430-class
//! microcontrollers.
//!
//! This crate factors out the control-loop shape that small MSP430 firmware
//! re-derives by hand in every program: a periodic hardware timer driving
//! debounced edge detection and software interval counters, coexisting with a
//! single-byte-buffered serial channel, all advanced by one cooperative main
//! loop that either polls hardware flags or is notified by short interrupt
//! handlers.
//!
//! The chip's register layer is deliberately out of scope. Board support
//! crates implement the contracts in [`hw_traits`] on top of their PAC;
//! digital pins enter through [`embedded-hal`](embedded_hal)'s `digital`
//! traits. Everything in this crate is portable and runs unmodified on a host
//! for testing.
//!
//! # Model
//!
//! * [`tick::TickSource`] wraps one compare-match timer into an edge-triggered
//!   "period elapsed" flag, chaining rollovers for periods longer than the
//!   counter width.
//! * [`interval::IntervalCounter`] counts ticks into multi-second derived
//!   events with zero drift.
//! * [`debounce::Debouncer`] turns a bouncing input level into clean edges.
//! * [`serial::SerialChannel`] is a half-duplex-buffered byte channel with
//!   `Busy` backpressure and setup-time baud validation.
//! * [`notify::EventLatch`] carries one-bit notifications from interrupt
//!   handlers to the main body; [`dispatch::Dispatcher`] drains it and hosts
//!   the only blocking point in the system.
//!
//! Interrupt handlers only ever set flags or step a [`tick::TickSource`];
//! multi-step logic belongs to the main body. If the main body does not drain
//! an event before its source fires again, the earlier event is lost and
//! counted, matching the single-flag hardware semantics being modeled.

#![no_std]
#![deny(missing_docs)]

pub mod actuator;
pub mod clock;
pub mod debounce;
pub mod dispatch;
pub mod hw_traits;
pub mod interval;
pub mod notify;
pub mod prelude;
pub mod serial;
pub mod tick;
