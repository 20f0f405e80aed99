//! Date, time and timestamp slot encodings and their calendar conversions.
//!
//! The raw structs mirror the engine's slot layouts one to one. Conversions to
//! `time` crate types are fallible: the engine stores infinities and ranges the
//! calendar types cannot express, and those surface as
//! [`Error::DomainMismatch`].

use colview_result::{Error, Result};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::kind::ValueKind;

pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

/// Julian day number of 1970-01-01.
const UNIX_EPOCH_JULIAN_DAY: i32 = 2_440_588;

/// Days since 1970-01-01.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct DateValue {
    pub days: i32,
}

impl DateValue {
    pub const POSITIVE_INFINITY: Self = Self { days: i32::MAX };
    pub const NEGATIVE_INFINITY: Self = Self { days: -i32::MAX };

    pub const fn new(days: i32) -> Self {
        Self { days }
    }

    pub const fn is_finite(self) -> bool {
        self.days != i32::MAX && self.days != -i32::MAX
    }

    pub fn to_date(self) -> Result<Date> {
        if !self.is_finite() {
            return Err(Error::domain(
                "infinite DATE has no calendar representation",
            ));
        }
        let julian = UNIX_EPOCH_JULIAN_DAY
            .checked_add(self.days)
            .ok_or_else(|| Error::domain(format!("DATE {} days is out of range", self.days)))?;
        Date::from_julian_day(julian)
            .map_err(|e| Error::domain(format!("DATE {} days is out of range: {e}", self.days)))
    }

    pub fn from_date(date: Date) -> Self {
        Self {
            days: date.to_julian_day() - UNIX_EPOCH_JULIAN_DAY,
        }
    }
}

/// Microseconds since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct TimeValue {
    pub micros: i64,
}

impl TimeValue {
    pub const fn new(micros: i64) -> Self {
        Self { micros }
    }

    /// `24:00:00` is a valid engine time but not a valid `time::Time`.
    pub fn to_time(self) -> Result<Time> {
        if self.micros < 0 || self.micros >= MICROS_PER_DAY {
            return Err(Error::domain(format!(
                "TIME of {} microseconds is outside 00:00:00..24:00:00",
                self.micros
            )));
        }
        let total_seconds = self.micros / MICROS_PER_SECOND;
        let micros = (self.micros % MICROS_PER_SECOND) as u32;
        let hour = (total_seconds / 3_600) as u8;
        let minute = ((total_seconds / 60) % 60) as u8;
        let second = (total_seconds % 60) as u8;
        Time::from_hms_micro(hour, minute, second, micros).map_err(Error::domain)
    }

    pub fn from_time(time: Time) -> Self {
        let (hour, minute, second, micros) = time.as_hms_micro();
        let seconds = i64::from(hour) * 3_600 + i64::from(minute) * 60 + i64::from(second);
        Self {
            micros: seconds * MICROS_PER_SECOND + i64::from(micros),
        }
    }
}

/// Time of day paired with a UTC offset in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimeTzValue {
    pub time: TimeValue,
    pub offset_seconds: i32,
}

impl TimeTzValue {
    const OFFSET_BITS: u32 = 24;
    const OFFSET_MASK: u64 = (1 << Self::OFFSET_BITS) - 1;
    /// Largest offset magnitude the encoding supports (15:59:59).
    pub const MAX_OFFSET: i32 = 16 * 60 * 60 - 1;

    pub const fn new(time: TimeValue, offset_seconds: i32) -> Self {
        Self {
            time,
            offset_seconds,
        }
    }

    /// Decode the packed slot: micros in the high 40 bits, the offset stored as
    /// `MAX_OFFSET - offset` in the low 24 bits so that packed values sort.
    pub const fn from_bits(bits: u64) -> Self {
        let micros = (bits >> Self::OFFSET_BITS) as i64;
        let encoded = (bits & Self::OFFSET_MASK) as i32;
        Self {
            time: TimeValue { micros },
            offset_seconds: Self::MAX_OFFSET - encoded,
        }
    }

    pub const fn to_bits(self) -> u64 {
        let encoded = (Self::MAX_OFFSET - self.offset_seconds) as u64 & Self::OFFSET_MASK;
        ((self.time.micros as u64) << Self::OFFSET_BITS) | encoded
    }

    pub fn offset(self) -> Result<UtcOffset> {
        UtcOffset::from_whole_seconds(self.offset_seconds).map_err(Error::domain)
    }
}

/// Microseconds since the Unix epoch (UTC for `TIMESTAMP WITH TIME ZONE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct TimestampValue {
    pub micros: i64,
}

impl TimestampValue {
    pub const POSITIVE_INFINITY: Self = Self { micros: i64::MAX };
    pub const NEGATIVE_INFINITY: Self = Self { micros: -i64::MAX };

    pub const fn new(micros: i64) -> Self {
        Self { micros }
    }

    pub const fn is_finite(self) -> bool {
        self.micros != i64::MAX && self.micros != -i64::MAX
    }

    /// Normalize a raw slot of the given timestamp kind to microseconds.
    ///
    /// Infinities keep their sentinel; nanoseconds are floored.
    pub fn from_slot(raw: i64, kind: ValueKind) -> Result<Self> {
        if raw == i64::MAX || raw == -i64::MAX {
            return Ok(Self { micros: raw });
        }
        let micros = match kind {
            ValueKind::TimestampS => raw.checked_mul(MICROS_PER_SECOND),
            ValueKind::TimestampMs => raw.checked_mul(1_000),
            ValueKind::TimestampNs => Some(raw.div_euclid(1_000)),
            ValueKind::Timestamp | ValueKind::TimestampTz => Some(raw),
            other => {
                return Err(Error::Internal(format!("{other} is not a timestamp kind")));
            }
        };
        micros.map(Self::new).ok_or_else(|| {
            Error::domain(format!("{kind} value {raw} overflows microsecond precision"))
        })
    }

    pub fn to_offset_date_time(self) -> Result<OffsetDateTime> {
        slot_to_offset_date_time(self.micros, ValueKind::Timestamp)
    }

    pub fn to_primitive_date_time(self) -> Result<PrimitiveDateTime> {
        self.to_offset_date_time()
            .map(|dt| PrimitiveDateTime::new(dt.date(), dt.time()))
    }

    pub fn from_offset_date_time(dt: OffsetDateTime) -> Self {
        let nanos = dt.unix_timestamp_nanos();
        Self {
            micros: nanos.div_euclid(1_000) as i64,
        }
    }
}

/// Convert a raw timestamp slot into a UTC date-time at full slot precision.
pub fn slot_to_offset_date_time(raw: i64, kind: ValueKind) -> Result<OffsetDateTime> {
    if raw == i64::MAX || raw == -i64::MAX {
        return Err(Error::domain(format!(
            "infinite {kind} has no calendar representation"
        )));
    }
    let nanos = i128::from(raw)
        * match kind {
            ValueKind::TimestampS => 1_000_000_000,
            ValueKind::TimestampMs => 1_000_000,
            ValueKind::TimestampNs => 1,
            _ => 1_000,
        };
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map_err(|e| Error::domain(format!("{kind} value {raw} is out of range: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn date_round_trip() {
        let date = Date::from_calendar_date(2024, Month::February, 29).unwrap();
        let raw = DateValue::from_date(date);
        assert_eq!(raw.to_date().unwrap(), date);
        assert_eq!(DateValue::new(0).to_date().unwrap().year(), 1970);
        assert_eq!(DateValue::new(-1).to_date().unwrap().day(), 31);
    }

    #[test]
    fn infinite_date_is_domain_error() {
        let err = DateValue::POSITIVE_INFINITY.to_date().unwrap_err();
        assert!(matches!(err, Error::DomainMismatch(_)));
        assert!(!DateValue::NEGATIVE_INFINITY.is_finite());
    }

    #[test]
    fn time_conversion() {
        let t = TimeValue::new(((13 * 60 + 5) * 60 + 7) * MICROS_PER_SECOND + 250);
        let time = t.to_time().unwrap();
        assert_eq!(time.as_hms_micro(), (13, 5, 7, 250));
        assert_eq!(TimeValue::from_time(time), t);
        assert!(TimeValue::new(MICROS_PER_DAY).to_time().is_err());
    }

    #[test]
    fn time_tz_bits() {
        let value = TimeTzValue::new(TimeValue::new(3_600 * MICROS_PER_SECOND), -5 * 3_600);
        let decoded = TimeTzValue::from_bits(value.to_bits());
        assert_eq!(decoded, value);
        assert_eq!(decoded.offset().unwrap().whole_hours(), -5);
    }

    #[test]
    fn timestamp_units() {
        assert_eq!(
            TimestampValue::from_slot(2, ValueKind::TimestampS).unwrap(),
            TimestampValue::new(2_000_000)
        );
        assert_eq!(
            TimestampValue::from_slot(-1, ValueKind::TimestampNs).unwrap(),
            TimestampValue::new(-1)
        );
        assert!(TimestampValue::from_slot(i64::MAX / 10, ValueKind::TimestampS).is_err());

        let dt = slot_to_offset_date_time(1_500, ValueKind::TimestampNs).unwrap();
        assert_eq!(dt.nanosecond(), 1_500);
        assert!(slot_to_offset_date_time(i64::MAX, ValueKind::Timestamp).is_err());
    }
}
