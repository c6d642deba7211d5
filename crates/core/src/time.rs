use chrono::{DateTime, Duration, Utc};

/// Where the engine reads wall-clock time from.
///
/// Only session bookkeeping uses it: `last_seen_at` for idle eviction and
/// `started_at` of a big quiz. Quiz deadlines run on tokio time instead.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    /// Pinned time, moved only by [`Clock::advance`].
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Sessions last seen before this instant count as idle.
    #[must_use]
    pub fn idle_cutoff(&self, max_idle: Duration) -> DateTime<Utc> {
        self.now() - max_idle
    }

    /// Time since `started_at`, never negative.
    #[must_use]
    pub fn elapsed_since(&self, started_at: DateTime<Utc>) -> Duration {
        (self.now() - started_at).max(Duration::zero())
    }

    /// Moves a pinned clock forward; the system clock ignores this.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(at) = self {
            *at += delta;
        }
    }
}

/// 2023-11-14T22:13:20Z, the instant test sessions start at.
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// [`FIXED_TEST_TIMESTAMP`] as a `DateTime<Utc>`.
///
/// # Panics
///
/// Panics if the timestamp is out of chrono's range, which it is not.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("test timestamp is in range")
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
