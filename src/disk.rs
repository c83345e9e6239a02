//! # Lunar Disk Orientation
//!
//! Angles a renderer needs to draw the Moon as it appears in the sky: where
//! the rotation axis points, which way the lit limb faces, and how the
//! equatorial frame is rotated against the observer's vertical.

use crate::angles::{normalize_radians, DEG_TO_RAD};
use crate::Context;
use core::f64::consts::{FRAC_PI_2, PI};
use serde::Serialize;

/// Inclination of the lunar equator to the ecliptic.
const MOON_INCLINATION_DEG: f64 = 1.54242;

/// Fixed obliquity used for the axis angle; the small error is invisible at
/// rendering scale.
const OBLIQUITY_DEG: f64 = 23.43929;

/// Orientation angles of the lunar disk (rad).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DiskAngles {
    /// Optical libration in longitude
    pub lp: f64,
    /// Optical libration in latitude
    pub bp: f64,
    /// Position angle of the rotation axis, from celestial north
    pub p: f64,
    /// Position angle of the bright-limb midpoint, from celestial north
    pub bl: f64,
    /// Parallactic angle: zenith direction against celestial north
    pub par: f64,
}

/// Compute libration, axis, bright-limb and parallactic angles.
///
/// `lst` is the local sidereal time of the evaluation, RA/Dec are topocentric
/// and `moon_lon`/`moon_lat` geocentric ecliptic, all in radians.
#[allow(clippy::too_many_arguments)]
pub fn moon_disk_angles(
    ctx: &Context,
    lst: f64,
    sun_ra: f64,
    sun_dec: f64,
    moon_lon: f64,
    moon_lat: f64,
    moon_ra: f64,
    moon_dec: f64,
) -> DiskAngles {
    let t = ctx.instant.julian_century();
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let f = (93.2720993 + 483202.0175273 * t - 0.0034029 * t2 - t3 / 3526000.0
        + t4 / 863310000.0)
        * DEG_TO_RAD;
    let inclination = MOON_INCLINATION_DEG * DEG_TO_RAD;
    let omega = (125.0445550 - 1934.1361849 * t + 0.0020762 * t2 + t3 / 467410.0
        - t4 / 18999000.0)
        * DEG_TO_RAD;
    let eps = OBLIQUITY_DEG * DEG_TO_RAD;

    // Optical librations
    let w = moon_lon - omega;
    let sin_a = w.sin() * moon_lat.cos() * inclination.cos() - moon_lat.sin() * inclination.sin();
    let cos_a = w.cos() * moon_lat.cos();
    let a = sin_a.atan2(cos_a);
    let lp = normalize_radians(a - f);
    let bp = (-w.sin() * moon_lat.cos() * inclination.sin() - moon_lat.sin() * inclination.cos()).asin();

    // Position angle of the axis
    let x = inclination.sin() * omega.sin();
    let y = inclination.sin() * omega.cos() * eps.cos() - inclination.cos() * eps.sin();
    let w = x.atan2(y);
    let p = ((x * x + y * y).sqrt() * (moon_ra - w).cos() / bp.cos()).asin();

    // Bright limb
    let bl = PI
        + (sun_dec.cos() * (moon_ra - sun_ra).sin()).atan2(
            sun_dec.cos() * moon_dec.sin() * (moon_ra - sun_ra).cos()
                - sun_dec.sin() * moon_dec.cos(),
        );

    let par = parallactic_angle(ctx.observer.latitude, lst - moon_ra, moon_dec);

    DiskAngles { lp, bp, p, bl, par }
}

/// Parallactic angle for hour angle `h` and declination `dec` at latitude
/// `lat`.
///
/// When the denominator vanishes the angle is ±π/2 by the sign of the
/// numerator (0 if both vanish).
pub fn parallactic_angle(lat: f64, h: f64, dec: f64) -> f64 {
    let y = h.sin();
    let x = lat.tan() * dec.cos() - dec.sin() * h.cos();
    if x != 0.0 {
        y.atan2(x)
    } else if y == 0.0 {
        0.0
    } else {
        y.signum() * FRAC_PI_2
    }
}
