//! # Report Rendering
//!
//! Turns a [`SunMoonReport`] into text for a terminal: event times at the
//! configured UTC offset, angles in degrees, and a small ASCII sketch of the
//! Moon with its terminator turned the way it appears in the sky.
//!
//! This is the only place radians become degrees. [`NO_EVENT`] never reaches
//! a time formatter; it is printed as a blank placeholder instead.

use crate::angles::{AU_KM, RAD_TO_DEG};
use crate::config::Config;
use crate::time_base::{julian_day_to_calendar, julian_day_to_datetime, EphemerisError};
use crate::{MoonExtras, SunMoonReport, NO_EVENT};
use chrono::Duration;
use std::fmt;

/// Placeholder for values that could not be computed
pub const BLANK: &str = "-";

/// Placeholder for event times that do not occur
pub const BLANK_TIME: &str = "--:--:--";

/// Text used by [`format_julian_day`] for the sentinel
pub const NO_EVENT_TEXT: &str = "NO RISE/SET/TRANSIT FOR THIS OBSERVER/DATE";

/// Render a Julian Day as `Y/M/D h:m:s UT`.
pub fn format_julian_day(jd: f64) -> Result<String, EphemerisError> {
    if jd == NO_EVENT {
        return Ok(NO_EVENT_TEXT.to_string());
    }
    let d = julian_day_to_calendar(jd)?;
    Ok(format!(
        "{}/{}/{} {}:{}:{} UT",
        d.year, d.month, d.day, d.hour, d.minute, d.second
    ))
}

/// Render an event instant as `HH:MM:SS` at `utc_offset_minutes`.
pub fn format_event_time(jd: f64, utc_offset_minutes: i32) -> String {
    if jd == NO_EVENT || !jd.is_finite() {
        return BLANK_TIME.to_string();
    }
    match julian_day_to_datetime(jd) {
        Ok(Some(utc)) => (utc + Duration::minutes(utc_offset_minutes as i64))
            .format("%H:%M:%S")
            .to_string(),
        _ => BLANK_TIME.to_string(),
    }
}

/// Render an angle in radians as degrees with one decimal.
pub fn format_angle(rad: f64) -> String {
    format!("{:.1}°", rad * RAD_TO_DEG)
}

/// Render a UTC offset as `UTC+HH:MM`.
pub fn format_utc_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.unsigned_abs();
    format!("UTC{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

/// Insert thousands separators into a non-negative integer.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render a distance in AU as kilometres with separators.
pub fn format_distance_km(au: f64) -> String {
    format!("{} km", group_thousands((au * AU_KM).round().max(0.0) as u64))
}

/// Index of the pre-rendered terminator mask for a phase angle in degrees.
///
/// The angle is rounded to whole degrees, then bucketed into 10° steps
/// (95° is mask 9, 99.6° rounds to 100° and is mask 10). `None` means full
/// Moon, no mask.
pub fn mask_index(phase_angle_deg: f64) -> Option<u8> {
    let whole_degrees = phase_angle_deg.round().clamp(0.0, 180.0) as u8;
    match whole_degrees / 10 {
        0 => None,
        step => Some(step),
    }
}

/// Draw the Moon as `rows` lines of ASCII, lit surface `@`, dark side `.`.
///
/// The lit limb points along the bright-limb angle measured against the
/// observer's vertical, east to the left, as when facing the Moon.
pub fn draw_moon(extras: &MoonExtras, rows: usize) -> Vec<String> {
    if rows == 0 {
        return Vec::new();
    }
    let cols = rows * 2;
    let cos_phase = extras.phase_angle().cos();
    let limb = -extras.shadow_rotation();
    let (dir_x, dir_y) = (-limb.sin(), limb.cos());

    (0..rows)
        .map(|row| {
            let v = 1.0 - (row as f64 + 0.5) * 2.0 / rows as f64;
            (0..cols)
                .map(|col| {
                    let u = (col as f64 + 0.5) * 2.0 / cols as f64 - 1.0;
                    if u * u + v * v > 1.0 {
                        return ' ';
                    }
                    // Along and across the bright-limb direction
                    let along = u * dir_x + v * dir_y;
                    let across = -u * dir_y + v * dir_x;
                    let half_chord = (1.0 - across * across).max(0.0).sqrt();
                    if along > -cos_phase * half_chord {
                        '@'
                    } else {
                        '.'
                    }
                })
                .collect::<String>()
        })
        .collect()
}

/// Text report for one observer, formatted through [`fmt::Display`].
pub struct ReportText<'a> {
    pub report: &'a SunMoonReport,
    pub config: &'a Config,
}

/// Elevation at transit, blank when the body does not transit.
fn transit_elevation(transit: f64, elevation: f64) -> String {
    if transit == NO_EVENT {
        BLANK.to_string()
    } else {
        format_angle(elevation)
    }
}

impl fmt::Display for ReportText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.config;
        let offset = config.display.utc_offset_minutes;
        let time = |jd: f64| format_event_time(jd, offset);

        writeln!(
            f,
            "Observer: {} ({:.3}°, {:.3}°)",
            config.observer.name, config.observer.longitude_deg, config.observer.latitude_deg
        )?;
        let date = format_julian_day(self.report.jd_ut).unwrap_or_else(|_| BLANK.to_string());
        writeln!(f, "Date/Time: {}  (times in {})", date, format_utc_offset(offset))?;
        writeln!(f)?;

        let sun = &self.report.sun;
        writeln!(f, "Sun")?;
        writeln!(f, "  Rise:       {}", time(sun.rise))?;
        writeln!(
            f,
            "  Noon:       {}  (elevation {})",
            time(sun.transit),
            transit_elevation(sun.transit, sun.transit_elevation)
        )?;
        writeln!(f, "  Set:        {}", time(sun.set))?;
        writeln!(f, "  Azimuth:    {}", format_angle(sun.azimuth))?;
        writeln!(f, "  Elevation:  {}", format_angle(sun.elevation))?;
        writeln!(f, "  Distance:   {:.4} AU", sun.distance)?;
        writeln!(f)?;

        let moon = &self.report.moon;
        let extras = &self.report.moon_extras;
        writeln!(f, "Moon")?;
        writeln!(f, "  Rise:       {}", time(moon.rise))?;
        writeln!(
            f,
            "  Transit:    {}  (elevation {})",
            time(moon.transit),
            transit_elevation(moon.transit, moon.transit_elevation)
        )?;
        writeln!(f, "  Set:        {}", time(moon.set))?;
        writeln!(f, "  Azimuth:    {}", format_angle(moon.azimuth))?;
        writeln!(f, "  Elevation:  {}", format_angle(moon.elevation))?;
        writeln!(f, "  Distance:   {}", format_distance_km(moon.distance))?;
        writeln!(f, "  Age:        {:.1} days", extras.age)?;
        writeln!(f, "  Illuminated: {:.1}%", extras.illumination * 100.0)?;
        writeln!(f, "  Phase:      {}", extras.phase)?;
        writeln!(f, "  Phase angle: {}", format_angle(extras.phase_angle()))?;
        let mask = mask_index(extras.phase_angle() * RAD_TO_DEG)
            .map_or_else(|| "none".to_string(), |index| index.to_string());
        writeln!(f, "  Mask:       {}", mask)?;
        writeln!(f, "  Moon angle:  {}", format_angle(extras.moon_rotation()))?;
        writeln!(f, "  Shadow angle: {}", format_angle(extras.shadow_rotation()))?;
        writeln!(
            f,
            "  Axis {}, bright limb {}, parallactic {}",
            format_angle(extras.disk.p),
            format_angle(extras.disk.bl),
            format_angle(extras.disk.par)
        )?;

        let sketch = draw_moon(extras, config.display.moon_rows);
        if !sketch.is_empty() {
            writeln!(f)?;
            for line in sketch {
                writeln!(f, "  {}", line.trim_end())?;
            }
        }
        Ok(())
    }
}

/// Render the full text report.
pub fn render_report(report: &SunMoonReport, config: &Config) -> String {
    ReportText { report, config }.to_string()
}

/// Print the text report to stdout.
pub fn draw_ascii(report: &SunMoonReport, config: &Config) {
    print!("{}", ReportText { report, config });
}

/// Serialize a report as pretty JSON.
pub fn to_json(report: &SunMoonReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::LUNAR_CYCLE_DAYS;
    use crate::disk::DiskAngles;
    use crate::engine::{illumination_fraction, MoonPhase};
    use crate::time_base::calendar_to_julian_day;

    fn extras(age: f64, bl: f64, par: f64) -> MoonExtras {
        MoonExtras {
            age,
            illumination: illumination_fraction(age),
            phase: crate::classify_phase(age),
            disk: DiskAngles {
                lp: 0.0,
                bp: 0.0,
                p: 0.0,
                bl,
                par,
            },
        }
    }

    fn count(lines: &[String], ch: char) -> usize {
        lines.iter().map(|l| l.chars().filter(|&c| c == ch).count()).sum()
    }

    #[test]
    fn julian_day_string() {
        let jd = calendar_to_julian_day(2017, 5, 25, 18, 5, 9).unwrap();
        let text = format_julian_day(jd).unwrap();
        // Truncation may shave a second
        assert!(text == "2017/5/25 18:5:9 UT" || text == "2017/5/25 18:5:8 UT", "{}", text);
        assert_eq!(format_julian_day(NO_EVENT).unwrap(), NO_EVENT_TEXT);
        assert!(format_julian_day(2_299_155.0).is_err());
    }

    #[test]
    fn event_time_with_offset_and_sentinel() {
        let jd = calendar_to_julian_day(2024, 1, 1, 23, 30, 0).unwrap();
        assert_eq!(format_event_time(jd, 0), "23:30:00");
        assert_eq!(format_event_time(jd, 60), "00:30:00");
        assert_eq!(format_event_time(jd, -330), "18:00:00");
        assert_eq!(format_event_time(NO_EVENT, 60), BLANK_TIME);
        assert_eq!(format_event_time(f64::NAN, 0), BLANK_TIME);
    }

    #[test]
    fn number_formats() {
        assert_eq!(format_angle(core::f64::consts::PI), "180.0°");
        assert_eq!(format_utc_offset(-330), "UTC-05:30");
        assert_eq!(format_utc_offset(120), "UTC+02:00");
        assert_eq!(group_thousands(384_400), "384,400");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000_000), "1,000,000");
        assert_eq!(format_distance_km(1.0), "149,597,871 km");
    }

    #[test]
    fn mask_steps() {
        assert_eq!(mask_index(0.0), None);
        assert_eq!(mask_index(4.9), None);
        assert_eq!(mask_index(9.4), None);
        assert_eq!(mask_index(9.5), Some(1));
        assert_eq!(mask_index(92.0), Some(9));
        // Whole degrees first, then tens: 95° stays in the 90° mask
        assert_eq!(mask_index(95.0), Some(9));
        assert_eq!(mask_index(99.4), Some(9));
        assert_eq!(mask_index(99.6), Some(10));
        assert_eq!(mask_index(180.0), Some(18));
        assert_eq!(mask_index(f64::NAN), None);
    }

    fn mask_line(text: &str) -> &str {
        text.lines()
            .find(|line| line.trim_start().starts_with("Mask:"))
            .unwrap()
            .trim()
    }

    #[test]
    fn report_names_the_mask() {
        let config = Config::default();
        let observer = config.observer_location();

        // Full Moon 2024-01-25 17:54 UT: no mask
        let full = crate::Instant::from_julian_day(2_460_335.246).unwrap();
        let report = crate::calc_sun_and_moon(&crate::Context::new(full, observer));
        assert_eq!(mask_line(&render_report(&report, &config)), "Mask:       none");

        // New Moon of 2024-04-08: darkest mask
        let new = crate::Instant::from_calendar(2024, 4, 8, 18, 0, 0).unwrap();
        let report = crate::calc_sun_and_moon(&crate::Context::new(new, observer));
        assert_eq!(mask_line(&render_report(&report, &config)), "Mask:       18");
    }

    #[test]
    fn sketch_lighting_follows_phase() {
        let full = draw_moon(&extras(LUNAR_CYCLE_DAYS / 2.0, 0.0, 0.0), 10);
        let new = draw_moon(&extras(0.0, 0.0, 0.0), 10);
        assert_eq!(full.len(), 10);
        assert_eq!(count(&full, '.'), 0);
        assert_eq!(count(&new, '@'), 0);
        assert!(count(&full, '@') > 50);
        assert!(draw_moon(&extras(3.0, 0.0, 0.0), 0).is_empty());
    }

    #[test]
    fn sketch_lit_side_turns_with_bright_limb() {
        // First quarter, bright limb due west (270°) with zero parallactic angle:
        // lit half on the right, east on the left
        let quarter = draw_moon(&extras(LUNAR_CYCLE_DAYS / 4.0, 1.5 * core::f64::consts::PI, 0.0), 10);
        let middle = &quarter[5];
        let half = middle.len() / 2;
        let left = &middle[..half];
        let right = &middle[half..];
        assert!(left.chars().filter(|&c| c == '.').count() > left.chars().filter(|&c| c == '@').count());
        assert!(right.chars().filter(|&c| c == '@').count() > right.chars().filter(|&c| c == '.').count());
    }

    #[test]
    fn json_keeps_sentinels() {
        let instant = crate::Instant::from_calendar(2024, 6, 21, 12, 0, 0).unwrap();
        let ctx = crate::Context::new(
            instant,
            crate::ObserverLocation::new(0.0, core::f64::consts::FRAC_PI_2),
        );
        let report = crate::calc_sun_and_moon(&ctx);
        let json = to_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["sun"]["rise"], serde_json::json!(-1.0));
        assert!(value["moon_extras"]["phase"].is_string());
        assert!(MoonPhase::Unknown.name() == BLANK);
    }
}
