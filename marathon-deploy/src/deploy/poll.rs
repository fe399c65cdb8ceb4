//! Bounded polling with an injectable clock

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Source of time for polling loops
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;

    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio timers
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock that only moves when slept on or advanced
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Move virtual time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += duration;
    }

    /// Virtual time elapsed since creation
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Every sleep requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
        self.advance(duration);
    }
}

/// Polling loop options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between two checks
    pub interval: Duration,

    /// Total budget, initial delay included
    pub timeout: Duration,

    /// Delay before the first check
    pub initial_delay: Duration,
}

impl PollOptions {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            initial_delay: Duration::ZERO,
        }
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(300))
    }
}

/// Drives a check-then-sleep loop until its deadline
///
/// ```ignore
/// let mut timer = PollTimer::start(clock, options).await;
/// loop {
///     if check().await? { return Ok(()) }
///     if !timer.wait_next().await { return Err(timeout) }
/// }
/// ```
pub struct PollTimer<'a> {
    clock: &'a dyn Clock,
    interval: Duration,
    started_at: Instant,
    /// `None` when the budget reaches past what `Instant` can represent
    deadline: Option<Instant>,
}

impl<'a> PollTimer<'a> {
    /// Start the budget now and wait out the initial delay
    pub async fn start(clock: &'a dyn Clock, options: PollOptions) -> PollTimer<'a> {
        let started_at = clock.now();
        if !options.initial_delay.is_zero() {
            clock.sleep(options.initial_delay).await;
        }

        Self {
            clock,
            interval: options.interval,
            started_at,
            deadline: started_at.checked_add(options.timeout),
        }
    }

    /// Time spent since the timer started
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.started_at)
    }

    /// Sleep until the next check is due.
    ///
    /// Returns `false` once the deadline has passed; the last sleep is
    /// shortened so that one check happens exactly at the deadline.
    pub async fn wait_next(&mut self) -> bool {
        let now = self.clock.now();
        let wait = match self.deadline {
            Some(deadline) if now >= deadline => return false,
            Some(deadline) => self.interval.min(deadline - now),
            None => self.interval,
        };

        self.clock.sleep(wait).await;
        true
    }
}
