//! Interval value stored as a combination of calendar months, whole days, and microseconds.

use colview_result::{Error, Result};

use crate::temporal::{MICROS_PER_DAY, MICROS_PER_SECOND};

/// Interval value stored as a combination of calendar months, whole days, and microseconds.
///
/// Months capture both month and year components (12 months == 1 year). Days represent
/// whole 24-hour periods and microseconds account for sub-day precision. The layout is the
/// engine's 16-byte interval slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct IntervalValue {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

impl IntervalValue {
    pub const fn new(months: i32, days: i32, micros: i64) -> Self {
        Self {
            months,
            days,
            micros,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn is_zero(self) -> bool {
        self.months == 0 && self.days == 0 && self.micros == 0
    }

    /// Exact duration of an interval without a calendar component.
    ///
    /// Months have no fixed length, so any non-zero month count is a domain error.
    pub fn to_duration(self) -> Result<time::Duration> {
        if self.months != 0 {
            return Err(Error::domain(format!(
                "INTERVAL with {} months has no fixed duration",
                self.months
            )));
        }
        let micros = i64::from(self.days)
            .checked_mul(MICROS_PER_DAY)
            .and_then(|day_micros| day_micros.checked_add(self.micros))
            .ok_or_else(|| Error::domain("INTERVAL overflows a duration"))?;
        Ok(time::Duration::new(
            micros.div_euclid(MICROS_PER_SECOND),
            (micros.rem_euclid(MICROS_PER_SECOND) * 1_000) as i32,
        ))
    }
}
