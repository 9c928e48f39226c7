//! Injectable time source.
//!
//! Exploit classification compares tag age against a configured window,
//! so the engine must never read the system clock directly: tests pin the
//! clock to a fixed instant, production wires in [`SystemTimeSource`].

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

/// A source of the current instant.
pub trait TimeSource: Send + Sync {
    /// Return the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    /// Create a wall-clock time source.
    pub const fn new() -> Self {
        Self
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A time source pinned to an explicit instant, advanced only by the
/// test driving it.
#[derive(Debug)]
pub struct FixedTimeSource {
    instant: RwLock<DateTime<Utc>>,
}

impl FixedTimeSource {
    /// Create a time source frozen at `instant`.
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: RwLock::new(instant),
        }
    }

    /// Move the frozen clock to a new instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self
            .instant
            .write()
            .unwrap_or_else(PoisonError::into_inner) = instant;
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn fixed_source_returns_the_pinned_instant() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).single();
        let Some(t0) = t0 else {
            return;
        };
        let source = FixedTimeSource::new(t0);
        assert_eq!(source.now(), t0);
        assert_eq!(source.now(), t0);

        let t1 = t0 + chrono::Duration::seconds(10);
        source.set(t1);
        assert_eq!(source.now(), t1);
    }
}
