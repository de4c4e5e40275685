//! Cancellable timers for the simulation engine.
//!
//! Both handles are inert until armed. Waiting on an unarmed handle never
//! resolves, so they can sit in a `select!` unconditionally. Cancelling
//! drops the underlying tokio timer.

use std::future::pending;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep};

/// A recurring tick with a fixed period.
pub struct Ticker {
    period: Duration,
    interval: Option<Interval>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    /// Start ticking. The first tick fires one period from now.
    ///
    /// Does nothing if already armed, so the cadence is not disturbed.
    pub fn arm(&mut self) {
        if self.interval.is_some() {
            return;
        }
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    /// Restart the cadence from now.
    pub fn rearm(&mut self) {
        self.cancel();
        self.arm();
    }

    pub fn cancel(&mut self) {
        self.interval = None;
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick. Cancel safe.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => pending::<()>().await,
        }
    }
}

/// A one-shot deadline.
pub struct Deadline {
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl Deadline {
    pub fn new(delay: Duration) -> Self {
        Self { delay, sleep: None }
    }

    /// Fire once, `delay` from now. Re-arming restarts the delay.
    pub fn arm(&mut self) {
        self.sleep = Some(Box::pin(sleep(self.delay)));
    }

    pub fn cancel(&mut self) {
        self.sleep = None;
    }

    pub fn is_armed(&self) -> bool {
        self.sleep.is_some()
    }

    /// Wait for the deadline, then disarm. Cancel safe.
    pub async fn fire(&mut self) {
        match self.sleep.as_mut() {
            Some(sleep) => sleep.as_mut().await,
            None => pending::<()>().await,
        }
        self.sleep = None;
    }
}
