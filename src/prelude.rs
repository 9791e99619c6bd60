//! Prelude

pub use crate::dispatch::IdleWait as _msp430_coop_IdleWait;
pub use crate::hw_traits::serial::SerialDevice as _msp430_coop_SerialDevice;
pub use crate::hw_traits::timer::TimerDevice as _msp430_coop_TimerDevice;
pub use crate::hw_traits::watchdog::WatchdogDevice as _msp430_coop_WatchdogDevice;
pub use embedded_hal::digital::InputPin as _msp430_coop_InputPin;
pub use embedded_hal::digital::OutputPin as _msp430_coop_OutputPin;
