// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{interval, Interval, MissedTickBehavior};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A lazy sequence of ticks driving transaction-status polling.
#[async_trait]
pub trait PollTrigger: Send {
    async fn tick(&mut self);
}

/// The default trigger: a fixed-period timer, matching the spec's default
/// of a 1-second periodic tick.
pub struct IntervalTrigger(Interval);

impl IntervalTrigger {
    pub fn new(period: Duration) -> Self {
        let mut timer = interval(period);
        // A slow subscriber should not cause a burst of catch-up ticks.
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self(timer)
    }
}

impl Default for IntervalTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

#[async_trait]
impl PollTrigger for IntervalTrigger {
    async fn tick(&mut self) {
        self.0.tick().await;
    }
}
