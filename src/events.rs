//! # Event Refinement
//!
//! [`crate::transform::evaluate`] predicts rise, set and transit assuming the
//! body stays put for a day. Both bodies move, the Moon by about 13° a day, so
//! the prediction is fed back in: evaluate at the predicted instant, take the
//! new prediction, repeat. Three passes are enough for the Sun, the Moon needs
//! five.

use crate::angles::SECONDS_PER_DAY;
use crate::orbital::{moon_position, sun_position};
use crate::transform::{evaluate, Evaluation};
use crate::{Context, NO_EVENT};
use log::trace;
use serde::{Deserialize, Serialize};

/// Refinement passes for the Sun.
pub const SUN_ITERATIONS: usize = 3;
/// Refinement passes for the Moon.
pub const MOON_ITERATIONS: usize = 5;

/// Which body an evaluation is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
}

/// The horizon or meridian crossing being refined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Rise,
    Set,
    Transit,
}

impl EventKind {
    fn pick(self, eval: &Evaluation) -> f64 {
        match self {
            EventKind::Rise => eval.rise,
            EventKind::Set => eval.set,
            EventKind::Transit => eval.transit,
        }
    }
}

/// Evaluate `body` with the instant of `ctx` moved to `jd_ut`.
///
/// The Sun state feeding the Moon series is recomputed at the new instant.
pub fn evaluate_body_at(ctx: &Context, body: Body, jd_ut: f64) -> Evaluation {
    let moved = ctx.at(jd_ut);
    let t = moved.instant.julian_century();
    let (sun, sun_state) = sun_position(t);
    match body {
        Body::Sun => evaluate(&sun, &moved),
        Body::Moon => {
            let (moon, _) = moon_position(t, &sun_state);
            evaluate(&moon, &moved)
        }
    }
}

/// Iterate an event instant to a fixed point.
///
/// Returns [`NO_EVENT`] if the estimate ever becomes the sentinel, or if the
/// last pass still moved the estimate by more than one second.
pub fn refine(
    ctx: &Context,
    initial_jd: f64,
    event: EventKind,
    iterations: usize,
    body: Body,
) -> f64 {
    let mut estimate = initial_jd;
    let mut step: f64 = -1.0;
    for pass in 0..iterations {
        if estimate == NO_EVENT {
            return NO_EVENT;
        }
        let eval = evaluate_body_at(ctx, body, estimate);
        let next = event.pick(&eval);
        step = (estimate - next).abs();
        trace!("{:?} {:?} pass {}: {} -> {}", body, event, pass, estimate, next);
        estimate = next;
    }
    if step > 1.0 / SECONDS_PER_DAY {
        return NO_EVENT;
    }
    estimate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_base::Instant;
    use crate::{ObserverLocation, TwilightKind};

    fn context(lon_deg: f64, lat_deg: f64) -> Context {
        let instant = Instant::from_calendar(2024, 3, 20, 12, 0, 0).unwrap();
        Context::new(instant, ObserverLocation::from_degrees(lon_deg, lat_deg))
    }

    #[test]
    fn sentinel_input_stays_sentinel() {
        let ctx = context(0.0, 45.0);
        for iterations in [0, 1, 3, 5, 20] {
            for event in [EventKind::Rise, EventKind::Set, EventKind::Transit] {
                assert_eq!(refine(&ctx, NO_EVENT, event, iterations, Body::Sun), NO_EVENT);
                assert_eq!(refine(&ctx, NO_EVENT, event, iterations, Body::Moon), NO_EVENT);
            }
        }
    }

    #[test]
    fn never_crossing_threshold_returns_sentinel() {
        // Astronomical twilight never ends near midsummer at 60°N
        let instant = Instant::from_calendar(2024, 6, 21, 0, 0, 0).unwrap();
        let ctx = Context::new(instant, ObserverLocation::from_degrees(10.0, 60.0))
            .with_twilight(TwilightKind::Astronomical);
        let guess = instant.jd_ut() + 0.1;
        for iterations in [1, 3, 5, 8] {
            assert_eq!(refine(&ctx, guess, EventKind::Rise, iterations, Body::Sun), NO_EVENT);
            assert_eq!(refine(&ctx, guess, EventKind::Set, iterations, Body::Sun), NO_EVENT);
        }
    }

    #[test]
    fn sun_transit_converges_to_a_fixed_point() {
        let ctx = context(0.0, 45.0);
        let first = evaluate_body_at(&ctx, Body::Sun, ctx.instant.jd_ut()).transit;
        let refined = refine(&ctx, first, EventKind::Transit, SUN_ITERATIONS, Body::Sun);
        assert_ne!(refined, NO_EVENT);
        let again = evaluate_body_at(&ctx, Body::Sun, refined).transit;
        assert!((again - refined).abs() < 1.0 / SECONDS_PER_DAY);
        // Equinox: equation of time about -7.5 min, so transit near 12:07 UT
        let minutes_after_noon = (refined - ctx.instant.jd_ut()) * 1440.0;
        assert!((5.0..10.0).contains(&minutes_after_noon), "transit offset {}", minutes_after_noon);
    }

    #[test]
    fn moon_rise_converges_with_five_passes() {
        let ctx = context(-3.7, 40.4);
        let first = evaluate_body_at(&ctx, Body::Moon, ctx.instant.jd_ut()).rise;
        assert_ne!(first, NO_EVENT);
        let refined = refine(&ctx, first, EventKind::Rise, MOON_ITERATIONS, Body::Moon);
        assert_ne!(refined, NO_EVENT);
        assert!((refined - first).abs() < 0.1, "refinement moved {} days", refined - first);
    }
}
