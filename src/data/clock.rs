//! Time source for validation rules that depend on "now".

use time::OffsetDateTime;

/// Supplies the current calendar year.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn current_year(&self) -> i32;
}

/// Reads the system clock (UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year(&self) -> i32 {
        OffsetDateTime::now_utc().year()
    }
}

/// Always reports the same year.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
    fn current_year(&self) -> i32 {
        self.0
    }
}
