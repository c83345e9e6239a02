//! # Sun & Moon Engine
//!
//! Runs the whole pipeline for one [`Context`]:
//!
//! 1. Sun: series → transform → refine rise/set/transit (3 passes) → transit
//!    elevation at the refined transit
//! 2. Moon: same with 5 passes, the Sun state taken from the requested instant
//! 3. Disk orientation from the Sun pass sidereal time and both bodies' RA/Dec
//!
//! Every stage works on values derived from the caller's context, which is
//! borrowed immutably; nothing has to be restored afterward and independent
//! reports can be computed on as many threads as needed.

use crate::angles::LUNAR_CYCLE_DAYS;
use crate::disk::{moon_disk_angles, DiskAngles};
use crate::events::{evaluate_body_at, refine, Body, EventKind, MOON_ITERATIONS, SUN_ITERATIONS};
use crate::orbital::{moon_position, sun_position};
use crate::transform::{evaluate, Evaluation};
use crate::{Context, NO_EVENT};
use core::f64::consts::TAU;
use log::debug;
use serde::Serialize;
use std::fmt;

/// Position and daily events of one body as seen by the observer.
///
/// Event fields hold UT Julian Days or [`NO_EVENT`]; use the accessor methods
/// to get them as `Option`s.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HorizontalReport {
    /// Azimuth from north through east (rad)
    pub azimuth: f64,
    /// Apparent elevation (rad)
    pub elevation: f64,
    pub rise: f64,
    pub set: f64,
    pub transit: f64,
    /// Apparent elevation at transit (rad), 0 when there is no transit
    pub transit_elevation: f64,
    /// Topocentric distance (AU)
    pub distance: f64,
}

fn event(jd: f64) -> Option<f64> {
    (jd != NO_EVENT).then_some(jd)
}

impl HorizontalReport {
    pub fn rise_jd(&self) -> Option<f64> {
        event(self.rise)
    }

    pub fn set_jd(&self) -> Option<f64> {
        event(self.set)
    }

    pub fn transit_jd(&self) -> Option<f64> {
        event(self.transit)
    }
}

/// Moon phase category by age.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
    /// Age outside `[0, LUNAR_CYCLE_DAYS]`
    Unknown,
}

impl MoonPhase {
    pub fn name(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
            MoonPhase::Unknown => "-",
        }
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a Moon age in days.
pub fn classify_phase(age: f64) -> MoonPhase {
    if !(0.0..=LUNAR_CYCLE_DAYS).contains(&age) {
        return MoonPhase::Unknown;
    }
    match age {
        a if a < 1.0 || a > LUNAR_CYCLE_DAYS - 1.0 => MoonPhase::NewMoon,
        a if a < 6.4 => MoonPhase::WaxingCrescent,
        a if a < 8.4 => MoonPhase::FirstQuarter,
        a if a < 13.8 => MoonPhase::WaxingGibbous,
        a if a < 15.8 => MoonPhase::FullMoon,
        a if a < 21.1 => MoonPhase::WaningGibbous,
        a if a < 23.1 => MoonPhase::LastQuarter,
        _ => MoonPhase::WaningCrescent,
    }
}

/// Illuminated fraction of the disk for a Moon age in days.
pub fn illumination_fraction(age: f64) -> f64 {
    (1.0 - (age / LUNAR_CYCLE_DAYS * TAU).cos()) / 2.0
}

/// Moon quantities beyond position and events.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MoonExtras {
    /// Days since new Moon, in `[0, LUNAR_CYCLE_DAYS)`
    pub age: f64,
    /// Illuminated fraction, 0..=1
    pub illumination: f64,
    pub phase: MoonPhase,
    /// Libration, axis, bright-limb and parallactic angles (rad)
    pub disk: DiskAngles,
}

impl MoonExtras {
    /// Age-derived stand-in for the Sun–Moon–Earth phase angle (rad):
    /// π at new Moon, 0 at full Moon.
    pub fn phase_angle(&self) -> f64 {
        (-(self.age / LUNAR_CYCLE_DAYS * TAU).cos()).acos()
    }

    /// Rotation to apply to an upright Moon image so its axis matches the sky
    /// as seen by the observer (rad, against the vertical).
    pub fn moon_rotation(&self) -> f64 {
        -(self.disk.p - self.disk.par)
    }

    /// Rotation to apply to the terminator mask so the lit limb faces the Sun
    /// (rad, against the vertical).
    pub fn shadow_rotation(&self) -> f64 {
        -(self.disk.bl - self.disk.par)
    }
}

/// Complete Sun and Moon report for one instant and observer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SunMoonReport {
    /// UT Julian Day the report was computed for
    pub jd_ut: f64,
    pub sun: HorizontalReport,
    pub moon: HorizontalReport,
    pub moon_extras: MoonExtras,
}

/// Refine the three daily events of `body` and re-evaluate the transit
/// elevation at the refined transit.
fn refine_events(ctx: &Context, body: Body, first: &Evaluation, iterations: usize) -> HorizontalReport {
    let rise = refine(ctx, first.rise, EventKind::Rise, iterations, body);
    let set = refine(ctx, first.set, EventKind::Set, iterations, body);
    let transit = refine(ctx, first.transit, EventKind::Transit, iterations, body);
    let transit_elevation = if transit == NO_EVENT {
        0.0
    } else {
        evaluate_body_at(ctx, body, transit).transit_elevation
    };
    debug!(
        "{:?}: rise {} set {} transit {} (first guess {} {} {})",
        body, rise, set, transit, first.rise, first.set, first.transit
    );

    HorizontalReport {
        azimuth: first.azimuth,
        elevation: first.elevation,
        rise,
        set,
        transit,
        transit_elevation,
        distance: first.distance,
    }
}

/// Compute positions, events and Moon extras for `ctx`.
pub fn calc_sun_and_moon(ctx: &Context) -> SunMoonReport {
    let t = ctx.instant.julian_century();
    debug!(
        "computing report for JD {} (t = {}, ΔT = {} s)",
        ctx.instant.jd_ut(),
        t,
        ctx.instant.delta_t()
    );

    let (sun_pos, sun_state) = sun_position(t);
    let sun_eval = evaluate(&sun_pos, ctx);
    let sun = refine_events(ctx, Body::Sun, &sun_eval, SUN_ITERATIONS);

    let (moon_pos, age) = moon_position(t, &sun_state);
    let moon_eval = evaluate(&moon_pos, ctx);
    let moon = refine_events(ctx, Body::Moon, &moon_eval, MOON_ITERATIONS);

    let disk = moon_disk_angles(
        ctx,
        sun_eval.local_sidereal_time,
        sun_eval.right_ascension,
        sun_eval.declination,
        moon_pos.longitude,
        moon_pos.latitude,
        moon_eval.right_ascension,
        moon_eval.declination,
    );

    SunMoonReport {
        jd_ut: ctx.instant.jd_ut(),
        sun,
        moon,
        moon_extras: MoonExtras {
            age,
            illumination: illumination_fraction(age),
            phase: classify_phase(age),
            disk,
        },
    }
}
