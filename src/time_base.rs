//! # Time Base
//!
//! Julian Day ⇄ calendar conversion and the TT−UT correction.
//!
//! ## Calendars
//! Conversions follow Meeus, *Astronomical Algorithms*, chapter 7. Dates
//! before 1582-10-15 are read on the Julian calendar, later dates on the
//! Gregorian one. Julian Days in `[2299150, 2299160)` are rejected in both
//! directions with [`EphemerisError::InvalidDate`].
//!
//! ## ΔT
//! Periodic terms are evaluated on Terrestrial Time, rise/set/transit times
//! are reported on Universal Time. The polynomial fit in [`delta_t_seconds`]
//! only shifts the Julian century `t`; the UT axis is never touched.

use crate::angles::{J2000, JULIAN_DAYS_PER_CENTURY, SECONDS_PER_DAY};
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First Julian Day rejected as falling in the calendar reform gap.
const REFORM_GAP_START: f64 = 2_299_150.0;
/// First Julian Day accepted again after the reform gap.
const REFORM_GAP_END: f64 = 2_299_160.0;

/// Errors raised by the ephemeris engine.
///
/// Numeric edge cases (no rise, circumpolar body, non-converging refinement)
/// are reported through sentinel values instead; the only fatal condition is a
/// date that never existed.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EphemerisError {
    /// The Julian Day lands in the Gregorian calendar reform gap
    #[error("invalid julian day {jd}: this date does not exist")]
    InvalidDate { jd: f64 },
}

/// A broken-down UT calendar date.
///
/// Fields are truncated, never rounded, when produced from a Julian Day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDate {
    /// Astronomical year (1 BC = 0)
    pub year: i32,
    /// Month, 1 = January
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

fn check_reform_gap(jd: f64) -> Result<(), EphemerisError> {
    if (REFORM_GAP_START..REFORM_GAP_END).contains(&jd) {
        return Err(EphemerisError::InvalidDate { jd });
    }
    Ok(())
}

/// Convert a UT calendar date and time to a Julian Day.
pub fn calendar_to_julian_day(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<f64, EphemerisError> {
    let julian_calendar = (year, month, day) < (1582, 10, 15);

    // Jan/Feb are months 13/14 of the previous year
    let (mut y, mut m) = (year as i64, month as i64);
    if m < 3 {
        y -= 1;
        m += 12;
    }
    let a = y / 100;
    let b = if julian_calendar { 0 } else { 2 - a + a / 4 };

    let day_fraction =
        (hour as f64 + (minute as f64 + second as f64 / 60.0) / 60.0) / 24.0;
    let jd = day_fraction
        + (365.25 * (y + 4716) as f64).trunc()
        + (30.6001 * (m + 1) as f64).trunc()
        + day as f64
        + b as f64
        - 1524.5;

    check_reform_gap(jd)?;
    Ok(jd)
}

/// Convert a Julian Day back to a UT calendar date.
pub fn julian_day_to_calendar(jd: f64) -> Result<CalendarDate, EphemerisError> {
    check_reform_gap(jd)?;

    let z = (jd + 0.5).floor();
    let f = jd + 0.5 - z;
    let mut a = z;
    if z >= 2_299_161.0 {
        let alpha = ((z - 1_867_216.25) / 36_524.25).trunc();
        a += 1.0 + alpha - (alpha / 4.0).trunc();
    }
    let b = a + 1524.0;
    let c = ((b - 122.1) / 365.25).trunc();
    let d = (c * 365.25).trunc();
    let e = ((b - d) / 30.6001).trunc();

    let exact_day = f + b - d - (30.6001 * e).trunc();
    let day = exact_day.trunc();
    let month = if e < 14.0 { e - 1.0 } else { e - 13.0 };
    let mut year = c - 4715.0;
    if month > 2.0 {
        year -= 1.0;
    }

    let hours = (exact_day - day) * 24.0;
    let hour = hours.trunc();
    let minutes = (hours - hour) * 60.0;
    let minute = minutes.trunc();
    let second = ((minutes - minute) * 60.0).trunc();

    Ok(CalendarDate {
        year: year as i32,
        month: month as u32,
        day: day as u32,
        hour: hour as u32,
        minute: minute as u32,
        second: second as u32,
    })
}

/// Convert a Julian Day to a chrono timestamp on the proleptic Gregorian
/// calendar, for presentation.
///
/// Returns `None` for dates chrono cannot represent; the reform gap is still
/// an error.
pub fn julian_day_to_datetime(jd: f64) -> Result<Option<NaiveDateTime>, EphemerisError> {
    check_reform_gap(jd)?;
    // JD 2440587.5 is 1970-01-01T00:00:00
    let millis = ((jd - 2_440_587.5) * SECONDS_PER_DAY * 1000.0).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return Ok(None);
    }
    Ok(DateTime::<Utc>::from_timestamp_millis(millis as i64).map(|dt| dt.naive_utc()))
}

/// Approximate TT−UT in seconds.
///
/// Two polynomial fits in the fractional year, one before 1600 and one up to
/// 2200. Zero outside `(-600, 2200)`.
pub fn delta_t_seconds(year: i32, month: u32, day: u32) -> f64 {
    if year <= -600 || year >= 2200 {
        return 0.0;
    }
    let x = year as f64 + (month as f64 - 1.0 + day as f64 / 30.0) / 12.0;
    let x2 = x * x;
    let x3 = x2 * x;
    let x4 = x3 * x;
    if year < 1600 {
        10535.328003326353 - 9.995238627481024 * x + 0.003067307630020489 * x2
            - 7.76340698361363e-6 * x3
            + 3.1331045394223196e-9 * x4
            + 8.225530854405553e-12 * x2 * x3
            - 7.486164715632051e-15 * x4 * x2
            + 1.9362461549678834e-18 * x4 * x3
            - 8.489224937827653e-23 * x4 * x4
    } else {
        -1027175.3477559977 + 2523.256625418965 * x - 1.885686849058459 * x2
            + 5.869246227888417e-5 * x3
            + 3.3379295816475025e-7 * x4
            + 1.7758961671447929e-10 * x2 * x3
            - 2.7889902806153024e-13 * x2 * x4
            + 1.0224295822336825e-16 * x3 * x4
            - 1.2528102370680435e-20 * x4 * x4
    }
}

/// A point on the UT axis with the TT−UT offset fixed at construction.
///
/// The offset is derived from the calendar date the instant was built from and
/// is carried unchanged by [`Instant::at`], so every refinement pass of one
/// computation uses the same correction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Instant {
    jd_ut: f64,
    delta_t: f64,
}

impl Instant {
    /// Build an instant from a UT calendar date.
    pub fn from_calendar(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, EphemerisError> {
        let jd_ut = calendar_to_julian_day(year, month, day, hour, minute, second)?;
        Ok(Instant {
            jd_ut,
            delta_t: delta_t_seconds(year, month, day),
        })
    }

    /// Build an instant from a UTC timestamp.
    pub fn from_datetime(when: DateTime<Utc>) -> Result<Self, EphemerisError> {
        Self::from_calendar(
            when.year(),
            when.month(),
            when.day(),
            when.hour(),
            when.minute(),
            when.second(),
        )
    }

    /// Build an instant from a UT Julian Day.
    pub fn from_julian_day(jd_ut: f64) -> Result<Self, EphemerisError> {
        let date = julian_day_to_calendar(jd_ut)?;
        Ok(Instant {
            jd_ut,
            delta_t: delta_t_seconds(date.year, date.month, date.day),
        })
    }

    /// The same computation moved to another UT Julian Day.
    pub fn at(&self, jd_ut: f64) -> Self {
        Instant {
            jd_ut,
            delta_t: self.delta_t,
        }
    }

    /// Julian Day on the UT axis.
    pub fn jd_ut(&self) -> f64 {
        self.jd_ut
    }

    /// TT−UT in seconds.
    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    /// Julian centuries since J2000 on the TT axis.
    pub fn julian_century(&self) -> f64 {
        (self.jd_ut + self.delta_t / SECONDS_PER_DAY - J2000) / JULIAN_DAYS_PER_CENTURY
    }
}

impl TryFrom<NaiveDateTime> for Instant {
    type Error = EphemerisError;

    fn try_from(value: NaiveDateTime) -> Result<Self, Self::Error> {
        Self::from_datetime(value.and_utc())
    }
}
