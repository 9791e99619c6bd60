//! Contracts standing in for the chip-specific register layer.
//!
//! The core treats hardware registers as opaque read/write cells behind these
//! traits. A board support crate implements them on top of its PAC, mapping
//! each operation to whatever flag-clear mechanics the silicon uses
//! (write-1-to-clear, write-0, vector register reads). No trait method may
//! block or spin.
//!
//! Enabling or disabling a notification source is expected to be idempotent
//! on the implementing side.

pub mod serial;
pub mod timer;
pub mod watchdog;
