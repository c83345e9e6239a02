//! # Sun & Moon Calculator Core Library
//!
//! Positions, rise/set/transit times and distances of the Sun and the Moon
//! for an observer on Earth, plus the Moon's age, illumination, phase and the
//! angles needed to draw its disk the way it appears in the sky.
//!
//! ## Design Philosophy
//!
//! ### Closed-form series
//! - **No integrator**: truncated trigonometric series for both bodies, good to
//!   a few hundredths of a degree and a few seconds of time
//! - **Deterministic**: the same inputs always give bit-identical reports
//!
//! ### Explicit state
//! The whole pipeline is pure functions over small `Copy` values. A
//! [`Context`] holds the instant, the observer and the rise/set threshold;
//! the Sun state the lunar theory needs is returned by the Sun series and
//! passed on by value. Contexts can be cloned onto any number of threads.
//!
//! ### Units
//! - **Angles**: radians everywhere inside the library
//! - **Time**: Julian Days on the UT axis; TT only enters through the Julian
//!   century used by the series
//! - **Missing events**: a body that does not rise, set or transit on the
//!   requested day reports [`NO_EVENT`] (−1), never a fake time
//!
//! ## Pipeline
//! 1. [`time_base`]: calendar → Julian Day, ΔT
//! 2. [`orbital`]: ecliptic position of Sun and Moon, Moon age
//! 3. [`transform`]: equatorial, topocentric, horizontal; first-guess events
//! 4. [`events`]: fixed-point refinement of rise/set/transit
//! 5. [`disk`]: libration, axis, bright limb, parallactic angle
//! 6. [`engine`]: ties it together into a [`SunMoonReport`]
//!
//! # Example
//! ```
//! use sunmoon_lib::{calc_sun_and_moon, Context, Instant, ObserverLocation, NO_EVENT};
//!
//! let instant = Instant::from_calendar(2024, 6, 21, 12, 0, 0).unwrap();
//! let madrid = ObserverLocation::from_degrees(-3.7, 40.4);
//! let report = calc_sun_and_moon(&Context::new(instant, madrid));
//!
//! assert_ne!(report.sun.rise, NO_EVENT);
//! assert!(report.sun.elevation > 1.0); // about 73° at midsummer noon
//! assert!(report.moon_extras.illumination <= 1.0);
//! ```

use serde::{Deserialize, Serialize};

// Module declarations
pub mod angles;
pub mod config;
pub mod disk;
pub mod engine;
pub mod events;
pub mod orbital;
pub mod renderer;
pub mod time_base;
pub mod transform;

pub use engine::{calc_sun_and_moon, classify_phase, HorizontalReport, MoonExtras, MoonPhase, SunMoonReport};
pub use time_base::{julian_day_to_calendar, CalendarDate, EphemerisError, Instant};

use angles::DEG_TO_RAD;

/// Sentinel for a rise, set or transit that does not happen on the requested
/// day (or whose refinement did not converge).
pub const NO_EVENT: f64 = -1.0;

/// Where the observer stands.
///
/// Longitude positive east, latitude positive north, both in radians. Values
/// are not range-checked.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObserverLocation {
    pub longitude: f64,
    pub latitude: f64,
}

impl ObserverLocation {
    /// Observer from radians.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        ObserverLocation {
            longitude,
            latitude,
        }
    }

    /// Observer from degrees.
    pub fn from_degrees(longitude_deg: f64, latitude_deg: f64) -> Self {
        Self::new(longitude_deg * DEG_TO_RAD, latitude_deg * DEG_TO_RAD)
    }
}

/// Altitude threshold used for rise and set.
///
/// Transit is unaffected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwilightKind {
    /// Center of the disk at −18°
    Astronomical,
    /// Center of the disk at −12°
    Nautical,
    /// Center of the disk at −6°
    Civil,
    /// Upper limb on the horizon with the standard 34′ refraction
    #[default]
    #[serde(rename = "horizon_34arcmin")]
    Horizon34Arcmin,
}

impl TwilightKind {
    /// Geometric altitude (rad) of the body's center at the event.
    pub fn threshold(self, angular_radius: f64) -> f64 {
        match self {
            TwilightKind::Astronomical => -18.0 * DEG_TO_RAD,
            TwilightKind::Nautical => -12.0 * DEG_TO_RAD,
            TwilightKind::Civil => -6.0 * DEG_TO_RAD,
            TwilightKind::Horizon34Arcmin => -(34.0 / 60.0) * DEG_TO_RAD - angular_radius,
        }
    }
}

impl std::str::FromStr for TwilightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "astronomical" => Ok(TwilightKind::Astronomical),
            "nautical" => Ok(TwilightKind::Nautical),
            "civil" => Ok(TwilightKind::Civil),
            "horizon" | "horizon_34arcmin" => Ok(TwilightKind::Horizon34Arcmin),
            other => Err(format!("unknown twilight kind: {}", other)),
        }
    }
}

/// Everything one computation needs: when, where, and which threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Context {
    pub instant: Instant,
    pub observer: ObserverLocation,
    pub twilight: TwilightKind,
}

impl Context {
    /// Context with the default horizon threshold.
    pub fn new(instant: Instant, observer: ObserverLocation) -> Self {
        Context {
            instant,
            observer,
            twilight: TwilightKind::default(),
        }
    }

    pub fn with_twilight(self, twilight: TwilightKind) -> Self {
        Context { twilight, ..self }
    }

    /// The same context moved to another UT Julian Day.
    pub fn at(&self, jd_ut: f64) -> Self {
        Context {
            instant: self.instant.at(jd_ut),
            ..*self
        }
    }
}
