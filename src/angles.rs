//! # Angle Helpers and Physical Constants
//!
//! Every numeric module works in radians; conversion to degrees only happens
//! in the renderer. This module holds the unit factors, the physical constants
//! shared by the orbital series and the coordinate transforms, and the two
//! small angle routines everything else leans on.

use core::f64::consts::{FRAC_PI_2, PI, TAU};

/// Radians to degrees.
pub const RAD_TO_DEG: f64 = 180.0 / PI;

/// Degrees to radians.
pub const DEG_TO_RAD: f64 = 1.0 / RAD_TO_DEG;

/// Radians of hour angle to hours.
pub const RAD_TO_HOUR: f64 = 180.0 / (15.0 * PI);

/// Radians of hour angle to days.
pub const RAD_TO_DAY: f64 = RAD_TO_HOUR / 24.0;

/// Astronomical unit in km (JPL value).
pub const AU_KM: f64 = 149_597_870.691;

/// Earth equatorial radius in km (IERS 2003).
pub const EARTH_RADIUS_KM: f64 = 6378.1366;

/// Solar radius in km, used for the apparent angular radius.
pub const SUN_RADIUS_KM: f64 = 696_000.0;

/// Lunar radius in km, used for the apparent angular radius.
pub const MOON_RADIUS_KM: f64 = 1737.4;

/// Length of a sidereal day in days (IERS conventions).
pub const SIDEREAL_DAY_LENGTH: f64 = 1.002_737_811_911_354_48;

/// Days per Julian century.
pub const JULIAN_DAYS_PER_CENTURY: f64 = 36525.0;

/// Seconds in one day.
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Julian Day of 2000-01-01 12:00 TT.
pub const J2000: f64 = 2_451_545.0;

/// Mean synodic month in days.
pub const LUNAR_CYCLE_DAYS: f64 = 29.530_588_853;

/// Reduce an angle in radians to `[0, 2π)`.
///
/// The cheap branches cover the common case of an angle that is at most one
/// turn out of range; anything else goes through a floor reduction.
pub fn normalize_radians(r: f64) -> f64 {
    if (-TAU..0.0).contains(&r) {
        let wrapped = r + TAU;
        // -1e-17 + 2π rounds to exactly 2π
        return if wrapped < TAU { wrapped } else { 0.0 };
    }
    if (TAU..2.0 * TAU).contains(&r) {
        return r - TAU;
    }
    if (0.0..TAU).contains(&r) {
        return r;
    }

    let mut reduced = r - TAU * (r / TAU).floor();
    if reduced < 0.0 {
        reduced += TAU;
    }
    if reduced >= TAU {
        reduced = 0.0;
    }
    reduced
}

/// Apparent elevation from a geometric one.
///
/// Empirical tangent formula assuming 1010 mb and 10 °C. Only applied above
/// −3°, where the formula is still well behaved; the result is clamped to
/// the zenith.
pub fn refract(geometric_alt: f64) -> f64 {
    if geometric_alt <= -3.0 * DEG_TO_RAD {
        return geometric_alt;
    }
    let alt_deg = geometric_alt * RAD_TO_DEG;
    let r = 0.016_667
        * DEG_TO_RAD
        * (FRAC_PI_2 - (alt_deg + 7.31 / (alt_deg + 4.4)) * DEG_TO_RAD)
            .tan()
            .abs();
    let refraction = r * (0.28 * 1010.0 / (10.0 + 273.0));
    (geometric_alt + refraction).min(FRAC_PI_2)
}
