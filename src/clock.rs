use chrono::{DateTime, SecondsFormat, Utc};

// Wall-clock source for response timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    // RFC3339 with second precision, e.g. "2024-01-15T10:30:00Z"
    fn timestamp(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// Always returns the same instant. Used by tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
