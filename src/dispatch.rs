//! Cooperative dispatcher loop.
//!
//! The single logical thread of control: everything multi-step happens here,
//! while notification handlers only raise [`EventLatch`] bits or step a tick
//! source. Each iteration drains the latch, and the caller reacts to the
//! returned [`Events`] by advancing interval counters, sampling debouncers
//! and issuing actuator or serial commands.
//!
//! There is no event queue. A source that fires twice between iterations
//! leaves one pending event and a counted overrun; see
//! [`EventLatch::raise`].
//!
//! [`wait_events`](Dispatcher::wait_events) is the only blocking point in the
//! system. Between polls it calls the [`IdleWait`] implementation, which on
//! real hardware enters a low-power state that any enabled notification
//! source can resume (the interrupt wakes the CPU, the handler raises its
//! bit, the loop drains it). On a host, [`SpinWait`] just polls.

use crate::hw_traits::watchdog::WatchdogDevice;
use crate::notify::{EventLatch, Events};

/// Bounded suspension between dispatcher iterations.
///
/// Implementations must return once any enabled notification source has had
/// a chance to fire, and must be resumable by every configured source, not
/// just one. They must not themselves consume events.
pub trait IdleWait {
    /// Suspend until a notification source may have fired.
    fn wait(&mut self);
}

/// Busy-polling idle strategy; never suspends.
pub struct SpinWait;

impl IdleWait for SpinWait {
    fn wait(&mut self) {}
}

/// Drains an [`EventLatch`] on behalf of the main body.
///
/// Optionally feeds a watchdog once per iteration, so a correctly configured
/// loop never trips it while the loop is live.
pub struct Dispatcher<'a, W: IdleWait> {
    latch: &'a EventLatch,
    idle: W,
    watchdog: Option<&'a mut dyn WatchdogDevice>,
}

impl<'a, W: IdleWait> Dispatcher<'a, W> {
    /// Dispatcher over `latch`, idling with `idle`.
    pub fn new(latch: &'a EventLatch, idle: W) -> Self {
        Dispatcher {
            latch,
            idle,
            watchdog: None,
        }
    }

    /// Feed `watchdog` once per iteration.
    pub fn with_watchdog(mut self, watchdog: &'a mut dyn WatchdogDevice) -> Self {
        self.watchdog = Some(watchdog);
        self
    }

    /// One non-blocking iteration: feed the watchdog and drain the latch.
    ///
    /// Empty when nothing fired since the previous iteration.
    pub fn try_events(&mut self) -> Events {
        if let Some(watchdog) = self.watchdog.as_mut() {
            watchdog.feed();
        }
        self.latch.take()
    }

    /// Block until at least one event is pending, then drain the latch.
    ///
    /// Idles between polls; with a low-power [`IdleWait`] this suspends the
    /// main body until any enabled notification source fires.
    pub fn wait_events(&mut self) -> Events {
        loop {
            let events = self.try_events();
            if !events.is_empty() {
                return events;
            }
            self.idle.wait();
        }
    }

    /// Occurrences lost because `source` re-fired before an iteration
    /// drained it.
    pub fn overrun_count(&self, source: Events) -> u8 {
        self.latch.overrun_count(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingWait<'a> {
        latch: &'a EventLatch,
        raise_after: u32,
        waits: u32,
    }

    impl IdleWait for CountingWait<'_> {
        fn wait(&mut self) {
            self.waits += 1;
            if self.waits == self.raise_after {
                // Stand-in for an interrupt firing mid-sleep
                self.latch.raise(Events::TICK_A);
            }
        }
    }

    #[derive(Default)]
    struct FakeWatchdog {
        feeds: u32,
    }

    impl WatchdogDevice for FakeWatchdog {
        fn feed(&mut self) {
            self.feeds += 1;
        }
    }

    #[test]
    fn try_events_is_empty_when_nothing_fired() {
        let latch = EventLatch::new();
        let mut dispatcher = Dispatcher::new(&latch, SpinWait);
        assert_eq!(dispatcher.try_events(), Events::empty());
        latch.raise(Events::EDGE_A);
        assert_eq!(dispatcher.try_events(), Events::EDGE_A);
        assert_eq!(dispatcher.try_events(), Events::empty());
    }

    #[test]
    fn wait_events_idles_until_a_source_fires() {
        let latch = EventLatch::new();
        let wait = CountingWait {
            latch: &latch,
            raise_after: 3,
            waits: 0,
        };
        let mut dispatcher = Dispatcher::new(&latch, wait);
        assert_eq!(dispatcher.wait_events(), Events::TICK_A);
        assert_eq!(dispatcher.idle.waits, 3);
    }

    #[test]
    fn watchdog_is_fed_every_iteration() {
        let latch = EventLatch::new();
        let mut watchdog = FakeWatchdog::default();
        let mut dispatcher = Dispatcher::new(&latch, SpinWait).with_watchdog(&mut watchdog);
        for _ in 0..5 {
            dispatcher.try_events();
        }
        drop(dispatcher);
        assert_eq!(watchdog.feeds, 5);
    }

    #[test]
    fn overruns_surface_through_the_dispatcher() {
        let latch = EventLatch::new();
        latch.raise(Events::SERIAL_RX);
        latch.raise(Events::SERIAL_RX);
        let dispatcher = Dispatcher::new(&latch, SpinWait);
        assert_eq!(dispatcher.overrun_count(Events::SERIAL_RX), 1);
    }
}
