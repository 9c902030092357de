//! Idle scheduling
//!
//! Waits between refresh cycles, dropping into a low-power mode when the
//! wait is long enough to be worth the clock switch. Flushes and bus
//! transactions are blocking calls that finish before `sleep` is reached,
//! so a low-power entry can never cut a transfer short.
//!
//! With an async delay, [`IdlePowerScheduler::sleep_async`] hands the wait
//! to the executor, which is where the core actually stops.

use embedded_hal::delay::DelayNs;
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;
use pagewise_hal::ClockController;

use crate::config::IdleConfig;

/// Sleeps through idle periods
pub struct IdlePowerScheduler<C, D> {
    clock: C,
    delay: D,
    config: IdleConfig,
}

impl<C: ClockController, D> IdlePowerScheduler<C, D> {
    pub fn new(clock: C, delay: D, config: IdleConfig) -> Self {
        Self {
            clock,
            delay,
            config,
        }
    }

    pub fn config(&self) -> &IdleConfig {
        &self.config
    }

    /// Check if a wait of `duration_ms` would enter low power
    pub fn uses_low_power(&self, duration_ms: u32) -> bool {
        self.config.mode.is_enabled() && duration_ms >= self.config.min_low_power_ms
    }

    /// Borrow the delay, e.g. for a reset pulse
    pub fn delay(&mut self) -> &mut D {
        &mut self.delay
    }

    pub fn into_parts(self) -> (C, D) {
        (self.clock, self.delay)
    }
}

impl<C: ClockController, D: DelayNs> IdlePowerScheduler<C, D> {

    /// Wait for `duration_ms`
    ///
    /// Zero returns immediately. Short waits, or any wait with low power
    /// disabled, are a plain delay; otherwise the clock controller is
    /// entered before the delay and restored after it.
    pub fn sleep(&mut self, duration_ms: u32) {
        if duration_ms == 0 {
            return;
        }
        if !self.uses_low_power(duration_ms) {
            self.delay.delay_ms(duration_ms);
            return;
        }

        let token = self.clock.enter_low_power(self.config.mode);
        self.delay.delay_ms(duration_ms);
        self.clock.restore(token);
    }

    /// Wait one poll interval
    pub fn sleep_poll_interval(&mut self) {
        self.sleep(self.config.poll_interval_ms);
    }
}

impl<C: ClockController, D: AsyncDelayNs> IdlePowerScheduler<C, D> {
    /// Same rules as [`sleep`](Self::sleep), awaiting the delay
    pub async fn sleep_async(&mut self, duration_ms: u32) {
        if duration_ms == 0 {
            return;
        }
        if !self.uses_low_power(duration_ms) {
            self.delay.delay_ms(duration_ms).await;
            return;
        }

        let token = self.clock.enter_low_power(self.config.mode);
        self.delay.delay_ms(duration_ms).await;
        self.clock.restore(token);
    }

    pub async fn sleep_poll_interval_async(&mut self) {
        self.sleep_async(self.config.poll_interval_ms).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Poll, Waker};
    use pagewise_hal::{LowPowerMode, NoLowPower};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Enter(LowPowerMode),
        Delay(u32),
        Restore(u8),
    }

    type Log = Rc<RefCell<Vec<Call>>>;

    struct MockClock {
        log: Log,
        previous: u8,
    }

    impl ClockController for MockClock {
        type Token = u8;

        fn enter_low_power(&mut self, mode: LowPowerMode) -> u8 {
            self.log.borrow_mut().push(Call::Enter(mode));
            self.previous
        }

        fn restore(&mut self, token: u8) {
            self.log.borrow_mut().push(Call::Restore(token));
        }
    }

    struct MockDelay {
        log: Log,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.log.borrow_mut().push(Call::Delay(ms));
        }
    }

    impl AsyncDelayNs for MockDelay {
        async fn delay_ns(&mut self, _ns: u32) {}

        async fn delay_ms(&mut self, ms: u32) {
            self.log.borrow_mut().push(Call::Delay(ms));
        }
    }

    struct NoopWake;

    impl std::task::Wake for NoopWake {
        fn wake(self: Arc<Self>) {}
    }

    /// Drive a future that never actually waits
    fn block_on<F: Future>(fut: F) -> F::Output {
        let waker = Waker::from(Arc::new(NoopWake));
        let mut cx = Context::from_waker(&waker);
        let mut fut = pin!(fut);
        loop {
            if let Poll::Ready(out) = fut.as_mut().poll(&mut cx) {
                return out;
            }
        }
    }

    fn scheduler(mode: LowPowerMode) -> (IdlePowerScheduler<MockClock, MockDelay>, Log) {
        let log: Log = Rc::default();
        let clock = MockClock {
            log: log.clone(),
            previous: 0x2A,
        };
        let delay = MockDelay { log: log.clone() };
        let config = IdleConfig {
            mode,
            ..IdleConfig::DEFAULT
        };
        (IdlePowerScheduler::new(clock, delay, config), log)
    }

    #[test]
    fn test_zero_returns_immediately() {
        let (mut sched, log) = scheduler(LowPowerMode::Vlps);
        sched.sleep(0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_short_sleep_skips_clock() {
        let (mut sched, log) = scheduler(LowPowerMode::Vlps);
        sched.sleep(249);
        assert_eq!(*log.borrow(), vec![Call::Delay(249)]);
    }

    #[test]
    fn test_disabled_mode_skips_clock() {
        let (mut sched, log) = scheduler(LowPowerMode::Disabled);
        sched.sleep(5_000);
        assert_eq!(*log.borrow(), vec![Call::Delay(5_000)]);
    }

    #[test]
    fn test_long_sleep_enters_and_restores() {
        let (mut sched, log) = scheduler(LowPowerMode::Stop);
        sched.sleep(250);
        assert_eq!(
            *log.borrow(),
            vec![
                Call::Enter(LowPowerMode::Stop),
                Call::Delay(250),
                Call::Restore(0x2A)
            ]
        );
    }

    #[test]
    fn test_poll_interval() {
        let (mut sched, log) = scheduler(LowPowerMode::Vlps);
        sched.sleep_poll_interval();
        assert_eq!(log.borrow().len(), 3);
        assert_eq!(log.borrow()[1], Call::Delay(5_000));
    }

    #[test]
    fn test_no_low_power_controller() {
        let log: Log = Rc::default();
        let delay = MockDelay { log: log.clone() };
        let mut sched = IdlePowerScheduler::new(NoLowPower, delay, IdleConfig::DEFAULT);
        sched.sleep(1_000);
        assert_eq!(*log.borrow(), vec![Call::Delay(1_000)]);
    }

    #[test]
    fn test_async_sleep_matches_blocking() {
        let (mut sched, log) = scheduler(LowPowerMode::Vlps);
        block_on(sched.sleep_async(0));
        block_on(sched.sleep_async(100));
        block_on(sched.sleep_poll_interval_async());
        assert_eq!(
            *log.borrow(),
            vec![
                Call::Delay(100),
                Call::Enter(LowPowerMode::Vlps),
                Call::Delay(5_000),
                Call::Restore(0x2A)
            ]
        );
    }
}
