use std::time::Duration;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::{AppError, Result};

/// Length of one rate-limit window.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WindowUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl WindowUnit {
    pub fn duration(self) -> Duration {
        match self {
            WindowUnit::Milliseconds => Duration::from_millis(1),
            WindowUnit::Seconds => Duration::from_secs(1),
            WindowUnit::Minutes => Duration::from_secs(60),
            WindowUnit::Hours => Duration::from_secs(60 * 60),
            WindowUnit::Days => Duration::from_secs(24 * 60 * 60),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Admission {
    Granted,
    /// Quota is spent; the current window closes at this instant.
    WaitUntil(Instant),
}

#[derive(Debug)]
struct Window {
    started_at: Option<Instant>,
    remaining: u32,
}

impl Window {
    fn try_admit(&mut self, now: Instant, capacity: u32, length: Duration) -> Admission {
        let Some(start) = self.started_at else {
            self.open(now, capacity);
            return Admission::Granted;
        };

        // The end instant already belongs to the next window.
        let end = start + length;
        if now >= end {
            self.open(now, capacity);
            Admission::Granted
        } else if self.remaining > 0 {
            self.remaining -= 1;
            Admission::Granted
        } else {
            Admission::WaitUntil(end)
        }
    }

    /// Starts a new window at `now` with the caller already admitted.
    fn open(&mut self, now: Instant, capacity: u32) {
        trace!("Opening a new rate-limit window with {} requests", capacity);
        self.started_at = Some(now);
        self.remaining = capacity - 1;
    }
}

/// Fixed-window request limiter that makes callers wait instead of failing them.
///
/// At most `capacity` callers are admitted per window. A window starts with the
/// first admission after the previous one has elapsed, so windows are aligned to
/// the last reset rather than to the wall clock.
///
/// The caller that runs into an exhausted window keeps the lock while it sleeps.
/// The tokio mutex is fair, so everybody arriving meanwhile queues behind it and
/// is evaluated against the window it opens on wake-up.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    capacity: u32,
    state: Mutex<Window>,
}

impl RateLimiter {
    pub fn new(unit: WindowUnit, capacity: i64) -> Result<Self> {
        Self::with_window(unit.duration(), capacity)
    }

    pub fn with_window(window: Duration, capacity: i64) -> Result<Self> {
        if capacity <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "request limit must be positive, got {}",
                capacity
            )));
        }
        let capacity = u32::try_from(capacity).map_err(|_| {
            AppError::InvalidArgument(format!("request limit {} is too large", capacity))
        })?;
        if window.is_zero() {
            return Err(AppError::InvalidArgument("rate-limit window must not be empty".into()));
        }

        Ok(Self {
            window,
            capacity,
            state: Mutex::new(Window {
                started_at: None,
                remaining: capacity,
            }),
        })
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Waits until a request may be sent and takes one unit of quota.
    ///
    /// Returns how long the caller slept for the window to close; zero when
    /// the quota allowed an immediate admission.
    pub async fn acquire(&self) -> Duration {
        let mut window = self.state.lock().await;
        let now = Instant::now();

        match window.try_admit(now, self.capacity, self.window) {
            Admission::Granted => Duration::ZERO,
            Admission::WaitUntil(deadline) => {
                let wait = deadline - now;
                debug!("Request quota of {} exhausted, waiting {:?}", self.capacity, wait);
                tokio::time::sleep_until(deadline).await;
                window.open(Instant::now(), self.capacity);
                wait
            }
        }
    }

    /// Thread-blocking variant of [`RateLimiter::acquire`] for callers outside a runtime.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn acquire_blocking(&self) -> Duration {
        let mut window = self.state.blocking_lock();
        let now = Instant::now();

        match window.try_admit(now, self.capacity, self.window) {
            Admission::Granted => Duration::ZERO,
            Admission::WaitUntil(deadline) => {
                let wait = deadline - now;
                debug!("Request quota of {} exhausted, blocking for {:?}", self.capacity, wait);
                std::thread::sleep(wait);
                window.open(Instant::now(), self.capacity);
                wait
            }
        }
    }
}
