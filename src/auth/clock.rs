//! Clock sources used to time credential issuance and expiry.

use std::fmt;

use chrono::Utc;

/// Source of the current Unix time in seconds.
///
/// Credential issuance and freshness checks read the same clock so that
/// assertion and installation expiries are compared without skew between
/// sources.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current Unix timestamp in seconds.
    fn now(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-support"))]
mod manual {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::Clock;

    /// Settable clock for deterministic expiry tests.
    ///
    /// Clones share the same instant, so a test can keep a handle while the
    /// token manager owns another.
    #[derive(Debug, Clone, Default)]
    pub struct ManualClock {
        now: Arc<AtomicI64>,
    }

    impl ManualClock {
        /// Creates a clock frozen at `start`.
        #[must_use]
        pub fn new(start: i64) -> Self {
            Self {
                now: Arc::new(AtomicI64::new(start)),
            }
        }

        /// Moves the clock forward by `seconds`.
        pub fn advance(&self, seconds: i64) {
            self.now.fetch_add(seconds, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock};

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(1_000);
        let handle = clock.clone();

        handle.advance(30);

        assert_eq!(clock.now(), 1_030);
    }
}
