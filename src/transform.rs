//! # Coordinate Transforms
//!
//! Takes a geocentric ecliptic [`BodyPosition`] to what the observer sees:
//!
//! 1. ecliptic → equatorial (mean obliquity plus nutation in obliquity)
//! 2. sidereal time at the observer
//! 3. topocentric parallax correction in rectangular coordinates
//! 4. hour angle → azimuth and refracted elevation
//! 5. first-guess rise/set/transit instants for the current day
//!
//! The event instants produced here assume the body is fixed on the sky for
//! the whole day; [`crate::events::refine`] iterates them to convergence.

use crate::angles::{
    normalize_radians, refract, AU_KM, DEG_TO_RAD, EARTH_RADIUS_KM, J2000,
    JULIAN_DAYS_PER_CENTURY, RAD_TO_DAY, SECONDS_PER_DAY, SIDEREAL_DAY_LENGTH,
};
use crate::orbital::BodyPosition;
use crate::{Context, NO_EVENT};
use core::f64::consts::{FRAC_PI_2, PI, TAU};
use serde::Serialize;

/// Everything one evaluation of a body at one instant yields.
///
/// Angles in radians, event instants as UT Julian Days or [`NO_EVENT`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    /// Azimuth measured from north through east
    pub azimuth: f64,
    /// Apparent (refracted) elevation
    pub elevation: f64,
    pub rise: f64,
    pub set: f64,
    pub transit: f64,
    /// Refracted elevation at meridian transit
    pub transit_elevation: f64,
    /// Topocentric right ascension
    pub right_ascension: f64,
    /// Topocentric declination
    pub declination: f64,
    /// Topocentric distance (AU)
    pub distance: f64,
    /// Local mean sidereal time
    pub local_sidereal_time: f64,
}

/// True obliquity of the ecliptic (rad) at TT century `t`.
pub fn obliquity(t: f64) -> f64 {
    let u = t / 100.0;
    let mut tmp = u * (27.87 + u * (5.79 + u * 2.45));
    tmp = u * (-249.67 + u * (-39.05 + u * (7.12 + tmp)));
    tmp = u * (-1.55 + u * (1999.25 + u * (-51.38 + tmp)));
    tmp = (u * (-4680.93 + tmp)) / 3600.0;
    let mean = (23.439_291_111_111_1 + tmp) * DEG_TO_RAD;

    let m1 = (124.90 - 1934.134 * t + 0.002063 * t * t) * DEG_TO_RAD;
    let m2 = (201.11 + 72001.5377 * t + 0.00057 * t * t) * DEG_TO_RAD;
    let nutation = 0.002558 * m1.cos() - 0.00015339 * m2.cos();
    mean + nutation * DEG_TO_RAD
}

/// Greenwich mean sidereal time (rad, not reduced) at UT Julian Day `jd_ut`.
pub fn greenwich_mean_sidereal_time(jd_ut: f64) -> f64 {
    let jd0 = (jd_ut - 0.5).floor() + 0.5;
    let t0 = (jd0 - J2000) / JULIAN_DAYS_PER_CENTURY;
    let secs = (jd_ut - jd0) * SECONDS_PER_DAY;
    let gmst_at_0h = (((-6.2e-6 * t0) + 9.3104e-2) * t0 + 8_640_184.812_866) * t0 + 24_110.548_41;
    let sidereal_rate = 1.0
        + (((-1.86e-5 * t0) + 0.186_208) * t0 + 8_640_184.812_866)
            / (SECONDS_PER_DAY * JULIAN_DAYS_PER_CENTURY);
    (gmst_at_0h + sidereal_rate * secs) * (15.0 / 3600.0) * DEG_TO_RAD
}

/// Midnight-to-midnight day number holding `jd` (0h UT boundaries).
fn day_of(jd: f64) -> f64 {
    (jd - 0.5).floor() + 0.5
}

/// Pick between the principal root and the one a sidereal day earlier.
///
/// The earlier root wins only when it falls on the same UT day as `jd_ut` and
/// is closer in time; this keeps the refinement on the intended calendar day.
fn select_root(jd_ut: f64, principal: f64, earlier: f64) -> f64 {
    if day_of(jd_ut) == day_of(jd_ut + earlier) && earlier.abs() < principal.abs() {
        earlier
    } else {
        principal
    }
}

/// Evaluate a body for the observer and instant held by `ctx`.
pub fn evaluate(position: &BodyPosition, ctx: &Context) -> Evaluation {
    let t = ctx.instant.julian_century();
    let jd_ut = ctx.instant.jd_ut();
    let lat = ctx.observer.latitude;

    // Ecliptic → equatorial, rectangular
    let eps = obliquity(t);
    let cos_b = position.latitude.cos();
    let x = position.distance * position.longitude.cos() * cos_b;
    let y0 = position.distance * position.longitude.sin() * cos_b;
    let z0 = position.distance * position.latitude.sin();
    let y = y0 * eps.cos() - z0 * eps.sin();
    let z = y0 * eps.sin() + z0 * eps.cos();

    let lst = greenwich_mean_sidereal_time(jd_ut) + ctx.observer.longitude;

    // Topocentric shift by the observer's geocentric position
    let radius_au = EARTH_RADIUS_KM / AU_KM;
    let x_topo = x - radius_au * lat.cos() * lst.cos();
    let y_topo = y - radius_au * lat.cos() * lst.sin();
    let z_topo = z - radius_au * lat.sin();

    let (ra, dec) = if x_topo != 0.0 || y_topo != 0.0 {
        (
            y_topo.atan2(x_topo),
            (z_topo / (x_topo * x_topo + y_topo * y_topo).sqrt()).atan2(1.0),
        )
    } else if z_topo < 0.0 {
        (0.0, -FRAC_PI_2)
    } else {
        (0.0, FRAC_PI_2)
    };
    let distance = (x_topo * x_topo + y_topo * y_topo + z_topo * z_topo).sqrt();

    let hour_angle = lst - ra;
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_dec, cos_dec) = dec.sin_cos();
    let geometric_alt = (sin_lat * sin_dec + cos_lat * cos_dec * hour_angle.cos()).asin();
    let az_y = hour_angle.sin();
    let az_x = hour_angle.cos() * sin_lat - sin_dec * cos_lat / cos_dec;
    let azimuth = PI + az_y.atan2(az_x);
    let elevation = refract(geometric_alt);

    let threshold = ctx.twilight.threshold(position.angular_radius);
    let cos_hour_angle = (threshold.sin() - sin_lat * sin_dec) / (cos_lat * cos_dec);
    let sidereal_to_days = RAD_TO_DAY / SIDEREAL_DAY_LENGTH;

    let to_meridian = normalize_radians(ra - lst);
    let transit_time = select_root(
        jd_ut,
        sidereal_to_days * to_meridian,
        sidereal_to_days * (to_meridian - TAU),
    );
    let transit = jd_ut + transit_time;
    let transit_elevation = refract((sin_dec * sin_lat + cos_dec * cos_lat).asin());

    let (rise, set) = if cos_hour_angle.abs() <= 1.0 {
        let horizon_angle = cos_hour_angle.acos().abs();
        let to_rise = normalize_radians(ra - horizon_angle - lst);
        let to_set = normalize_radians(ra + horizon_angle - lst);
        let rise_time = select_root(
            jd_ut,
            sidereal_to_days * to_rise,
            sidereal_to_days * (to_rise - TAU),
        );
        let set_time = select_root(
            jd_ut,
            sidereal_to_days * to_set,
            sidereal_to_days * (to_set - TAU),
        );
        (jd_ut + rise_time, jd_ut + set_time)
    } else {
        (NO_EVENT, NO_EVENT)
    };

    Evaluation {
        azimuth,
        elevation,
        rise,
        set,
        transit,
        transit_elevation,
        right_ascension: ra,
        declination: dec,
        distance,
        local_sidereal_time: lst,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::RAD_TO_DEG;
    use crate::orbital::sun_position;
    use crate::time_base::Instant;
    use crate::ObserverLocation;

    #[test]
    fn obliquity_at_j2000() {
        let eps = obliquity(0.0) * RAD_TO_DEG;
        // Mean 23.4393° plus about -0.0013° nutation
        assert!((eps - 23.4380).abs() < 0.001, "obliquity {}", eps);
    }

    #[test]
    fn sidereal_time_at_j2000() {
        let gmst = normalize_radians(greenwich_mean_sidereal_time(J2000)) * RAD_TO_DEG;
        assert!((gmst - 280.4606).abs() < 1e-3, "gmst {}", gmst);
    }

    #[test]
    fn earlier_root_needs_same_day_and_smaller_offset() {
        let jd = 2_460_000.75; // 06:00 UT
        // Earlier root lands on the same day and is closer
        assert_eq!(select_root(jd, 0.9, -0.1), -0.1);
        // Earlier root is on the previous day
        assert_eq!(select_root(jd, 0.9, -0.3), 0.9);
        // Same day but further away
        assert_eq!(select_root(2_460_000.95, 0.1, -0.2), 0.1);
    }

    #[test]
    fn sun_at_greenwich_equator_j2000_noon() {
        let instant = Instant::from_calendar(2000, 1, 1, 12, 0, 0).unwrap();
        let ctx = Context::new(instant, ObserverLocation::new(0.0, 0.0));
        let (sun, _) = sun_position(instant.julian_century());
        let eval = evaluate(&sun, &ctx);

        let az = eval.azimuth * RAD_TO_DEG;
        let el = eval.elevation * RAD_TO_DEG;
        // Sun just east of the meridian, 23° south of the zenith
        assert!((az - 178.07).abs() < 0.05, "azimuth {}", az);
        assert!((el - 66.96).abs() < 0.05, "elevation {}", el);
        assert!((eval.distance - 0.9833).abs() < 1e-3);

        // Rise, transit, set straddle noon on the same day
        assert!(eval.rise < eval.transit && eval.transit < eval.set);
        assert_eq!(day_of(eval.transit), day_of(instant.jd_ut()));
    }

    #[test]
    fn never_rising_body_gets_sentinels_but_keeps_transit() {
        // Winter solstice at 80°N: Sun stays below every threshold
        let instant = Instant::from_calendar(2023, 12, 21, 12, 0, 0).unwrap();
        let ctx = Context::new(instant, ObserverLocation::from_degrees(0.0, 80.0));
        let (sun, _) = sun_position(instant.julian_century());
        let eval = evaluate(&sun, &ctx);
        assert_eq!(eval.rise, NO_EVENT);
        assert_eq!(eval.set, NO_EVENT);
        assert_ne!(eval.transit, NO_EVENT);
        assert!(eval.transit_elevation < 0.0);
    }
}
