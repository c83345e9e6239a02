//! # Orbital Model
//!
//! Low-order analytical theories for the Sun and the Moon, evaluated on the TT
//! Julian century `t`. Formulae follow *Calendrical Calculations* for the mean
//! elements and P. Duffett-Smith's MOON program for the periodic terms.
//!
//! Accuracy: better than 0.003° for the Sun's apparent longitude and about
//! 0.01° for the Moon, enough for rise/set timing within a few seconds.
//!
//! The Moon series needs the Sun's mean anomaly and apparent longitude at the
//! same instant; [`sun_position`] returns them as a [`SunState`] which the
//! caller hands to [`moon_position`].

use crate::angles::{
    normalize_radians, AU_KM, DEG_TO_RAD, EARTH_RADIUS_KM, LUNAR_CYCLE_DAYS, MOON_RADIUS_KM,
    SUN_RADIUS_KM,
};
use core::f64::consts::TAU;
use serde::Serialize;

/// Geocentric ecliptic position of a body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BodyPosition {
    /// Ecliptic longitude (rad)
    pub longitude: f64,
    /// Ecliptic latitude (rad)
    pub latitude: f64,
    /// Distance (AU)
    pub distance: f64,
    /// Apparent angular radius (rad)
    pub angular_radius: f64,
}

/// The Sun quantities the lunar theory depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunState {
    /// Mean anomaly (rad)
    pub mean_anomaly: f64,
    /// Apparent ecliptic longitude (deg, not reduced)
    pub apparent_longitude_deg: f64,
}

/// Nutation arguments shared by both bodies (rad).
fn nutation_arguments(t: f64) -> (f64, f64) {
    let m1 = (124.90 - 1934.134 * t + 0.002063 * t * t) * DEG_TO_RAD;
    let m2 = (201.11 + 72001.5377 * t + 0.00057 * t * t) * DEG_TO_RAD;
    (m1, m2)
}

/// Apparent geocentric position of the Sun.
pub fn sun_position(t: f64) -> (BodyPosition, SunState) {
    let mean_longitude = 280.46645 + 36000.76983 * t + 0.0003032 * t * t;
    let anomaly_deg = 357.5291 + 35999.0503 * t - 0.0001559 * t * t - 4.8e-7 * t * t * t;
    let mean_anomaly = anomaly_deg * DEG_TO_RAD;

    // Equation of center
    let c = (1.9146 - 0.004817 * t - 0.000014 * t * t) * mean_anomaly.sin()
        + (0.019993 - 0.000101 * t) * (2.0 * mean_anomaly).sin()
        + 0.00029 * (3.0 * mean_anomaly).sin();

    // Nutation and aberration
    let (m1, m2) = nutation_arguments(t);
    let d = -0.00569 - 0.0047785 * m1.sin() - 0.0003667 * m2.sin();

    let apparent_longitude_deg = mean_longitude + c + d;

    let ecc = 0.016708617 - 4.2037e-5 * t - 1.236e-7 * t * t;
    let true_anomaly = mean_anomaly + c * DEG_TO_RAD;
    let distance = 1.000001018 * (1.0 - ecc * ecc) / (1.0 + ecc * true_anomaly.cos());

    let position = BodyPosition {
        longitude: apparent_longitude_deg * DEG_TO_RAD,
        // The Sun's ecliptic latitude never exceeds ~1″
        latitude: 0.0,
        distance,
        angular_radius: (SUN_RADIUS_KM / (AU_KM * distance)).atan(),
    };
    let state = SunState {
        mean_anomaly,
        apparent_longitude_deg,
    };
    (position, state)
}

/// Apparent geocentric position of the Moon and its age in days.
///
/// `sun` must be the Sun state at the same `t`.
pub fn moon_position(t: f64, sun: &SunState) -> (BodyPosition, f64) {
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    // Mean elongation
    let phase = normalize_radians(
        (297.8502042 + 445267.1115168 * t - 0.00163 * t2 + t3 / 538841.0 - t4 / 65194000.0)
            * DEG_TO_RAD,
    );
    // Anomalistic phase
    let anomaly = (134.9634114 + 477198.8676313 * t + 0.008997 * t2 + t3 / 69699.0
        - t4 / 14712000.0)
        * DEG_TO_RAD;
    // Argument of latitude
    let node = (93.2720993 + 483202.0175273 * t - 0.0034029 * t2 - t3 / 3526000.0
        + t4 / 863310000.0)
        * DEG_TO_RAD;
    // Eccentricity correction for terms involving the Sun's anomaly
    let e = 1.0 - (0.002495 + 7.52e-6 * (t + 1.0)) * (t + 1.0);
    let sa = sun.mean_anomaly;

    let mut l = 218.31664563 + 481267.8811958 * t - 0.00146639 * t2 + t3 / 540135.03
        - t4 / 65193770.4;
    // Evection, variation and equation of the year first
    l += 6.28875 * anomaly.sin()
        + 1.274018 * (2.0 * phase - anomaly).sin()
        + 0.658309 * (2.0 * phase).sin();
    l += 0.213616 * (2.0 * anomaly).sin() - e * 0.185596 * sa.sin()
        - 0.114336 * (2.0 * node).sin();
    l += 0.058793 * (2.0 * phase - 2.0 * anomaly).sin()
        + 0.057212 * e * (2.0 * phase - anomaly - sa).sin()
        + 0.05332 * (2.0 * phase + anomaly).sin();
    l += 0.045874 * e * (2.0 * phase - sa).sin() + 0.041024 * e * (anomaly - sa).sin()
        - 0.034718 * phase.sin()
        - e * 0.030465 * (sa + anomaly).sin();
    l += 0.015326 * (2.0 * (phase - node)).sin() - 0.012528 * (2.0 * node + anomaly).sin()
        - 0.01098 * (2.0 * node - anomaly).sin()
        + 0.010674 * (4.0 * phase - anomaly).sin();
    l += 0.010034 * (3.0 * anomaly).sin() + 0.008548 * (4.0 * phase - 2.0 * anomaly).sin();
    l += -e * 0.00791 * (sa - anomaly + 2.0 * phase).sin()
        - e * 0.006783 * (2.0 * phase + sa).sin()
        + 0.005162 * (anomaly - phase).sin()
        + e * 0.005 * (sa + phase).sin();
    l += 0.003862 * (4.0 * phase).sin()
        + e * 0.004049 * (anomaly - sa + 2.0 * phase).sin()
        + 0.003996 * (2.0 * (anomaly + phase)).sin()
        + 0.003665 * (2.0 * phase - 3.0 * anomaly).sin();
    l += e * 2.695e-3 * (2.0 * anomaly - sa).sin()
        + 2.602e-3 * (anomaly - 2.0 * (node + phase)).sin();
    l += e * 2.396e-3 * (2.0 * (phase - anomaly) - sa).sin() - 2.349e-3 * (anomaly + phase).sin();
    l += e * e * 2.249e-3 * (2.0 * (phase - sa)).sin() - e * 2.125e-3 * (2.0 * anomaly + sa).sin();
    l += -e * e * 2.079e-3 * (2.0 * sa).sin()
        + e * e * 2.059e-3 * (2.0 * (phase - sa) - anomaly).sin();
    l += -1.773e-3 * (anomaly + 2.0 * (phase - node)).sin() - 1.595e-3 * (2.0 * (node + phase)).sin();
    l += e * 1.22e-3 * (4.0 * phase - sa - anomaly).sin() - 1.11e-3 * (2.0 * (anomaly + node)).sin();

    let (m1, m2) = nutation_arguments(t);
    let longitude_deg = l - 0.0047785 * m1.sin() - 0.0003667 * m2.sin();

    let age = normalize_radians((longitude_deg - sun.apparent_longitude_deg) * DEG_TO_RAD)
        * LUNAR_CYCLE_DAYS
        / TAU;

    // Horizontal parallax (deg)
    let mut parallax = 0.950724 + 0.051818 * anomaly.cos() + 0.009531 * (2.0 * phase - anomaly).cos();
    parallax += 0.007843 * (2.0 * phase).cos() + 0.002824 * (2.0 * anomaly).cos();
    parallax += 0.000857 * (2.0 * phase + anomaly).cos() + e * 0.000533 * (2.0 * phase - sa).cos();
    parallax += e * 0.000401 * (2.0 * phase - anomaly - sa).cos()
        + e * 0.00032 * (anomaly - sa).cos()
        - 0.000271 * phase.cos();
    parallax += -e * 0.000264 * (sa + anomaly).cos() - 0.000198 * (2.0 * node - anomaly).cos();
    parallax += 1.73e-4 * (3.0 * anomaly).cos() + 1.67e-4 * (4.0 * phase - anomaly).cos();

    let distance_earth_radii = 1.0 / (parallax * DEG_TO_RAD).sin();

    // Latitude from the nodal phase
    let mut b = 5.128189 * node.sin()
        + 0.280606 * (node + anomaly).sin()
        + 0.277693 * (anomaly - node).sin();
    b += 0.173238 * (2.0 * phase - node).sin() + 0.055413 * (2.0 * phase + node - anomaly).sin();
    b += 0.046272 * (2.0 * phase - node - anomaly).sin() + 0.032573 * (2.0 * phase + node).sin();
    b += 0.017198 * (2.0 * anomaly + node).sin() + 0.009267 * (2.0 * phase + anomaly - node).sin();
    b += 0.008823 * (2.0 * anomaly - node).sin()
        + e * 0.008247 * (2.0 * phase - sa - node).sin()
        + 0.004323 * (2.0 * (phase - anomaly) - node).sin();
    b += 0.0042 * (2.0 * phase + node + anomaly).sin() + e * 0.003372 * (node - sa - 2.0 * phase).sin();
    b += e * 2.472e-3 * (2.0 * phase + node - sa - anomaly).sin();
    b += e * 2.222e-3 * (2.0 * phase + node - sa).sin();
    b += e * 2.072e-3 * (2.0 * phase - node - sa - anomaly).sin();

    let position = BodyPosition {
        longitude: longitude_deg * DEG_TO_RAD,
        latitude: b * DEG_TO_RAD,
        distance: distance_earth_radii * EARTH_RADIUS_KM / AU_KM,
        angular_radius: (MOON_RADIUS_KM / (distance_earth_radii * EARTH_RADIUS_KM)).atan(),
    };
    (position, age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::RAD_TO_DEG;

    #[test]
    fn sun_at_j2000() {
        let (sun, state) = sun_position(0.0);
        let lon = normalize_radians(sun.longitude) * RAD_TO_DEG;
        // Apparent longitude 2000-01-01 12h TT is 280.37°
        assert!((lon - 280.37).abs() < 0.02, "sun longitude {}", lon);
        assert_eq!(sun.latitude, 0.0);
        assert!((sun.distance - 0.98333).abs() < 1e-3, "sun distance {}", sun.distance);
        // ~16.3 arcmin
        let radius_arcmin = sun.angular_radius * RAD_TO_DEG * 60.0;
        assert!((16.0..16.6).contains(&radius_arcmin));
        assert!((state.mean_anomaly * RAD_TO_DEG - 357.5291).abs() < 1e-9);
    }

    #[test]
    fn sun_distance_tracks_perihelion_and_aphelion() {
        // Early January vs early July 2024
        let jan = (2_460_315.5 - 2_451_545.0) / 36525.0;
        let jul = (2_460_496.5 - 2_451_545.0) / 36525.0;
        let (perihelion, _) = sun_position(jan);
        let (aphelion, _) = sun_position(jul);
        assert!(perihelion.distance < 0.984);
        assert!(aphelion.distance > 1.016);
    }

    #[test]
    fn moon_stays_within_physical_bounds() {
        for step in 0..60 {
            let t = -0.5 + step as f64 * 0.017;
            let (_, sun) = sun_position(t);
            let (moon, age) = moon_position(t, &sun);
            let km = moon.distance * AU_KM;
            assert!((355_000.0..407_500.0).contains(&km), "moon distance {} km", km);
            assert!(moon.latitude.abs() * RAD_TO_DEG < 5.4);
            assert!((0.0..LUNAR_CYCLE_DAYS).contains(&age), "age {}", age);
            let radius_arcmin = moon.angular_radius * RAD_TO_DEG * 60.0;
            assert!((14.5..17.0).contains(&radius_arcmin));
        }
    }

    #[test]
    fn moon_age_near_known_new_and_full_moons() {
        // New moon 2024-01-11 11:57 UT, full moon 2024-01-25 17:54 UT
        let new_moon_t = (2_460_321.0 - 2_451_545.0) / 36525.0;
        let (_, sun) = sun_position(new_moon_t);
        let (_, age) = moon_position(new_moon_t, &sun);
        assert!(age < 0.1 || age > LUNAR_CYCLE_DAYS - 0.1, "new moon age {}", age);

        let full_moon_t = (2_460_335.246 - 2_451_545.0) / 36525.0;
        let (_, sun) = sun_position(full_moon_t);
        let (_, age) = moon_position(full_moon_t, &sun);
        assert!((age - LUNAR_CYCLE_DAYS / 2.0).abs() < 0.3, "full moon age {}", age);
    }
}
