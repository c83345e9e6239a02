//! # Sun & Moon Calculator Entry Point
//!
//! Command-line front end: loads the observer from sunmoon-config.toml,
//! applies command-line overrides, computes the report for the requested
//! instant (now by default) and prints it as text or JSON.
//!
//! ```text
//! sunmoon [--date 2024-06-21T12:00:00] [--lon -3.7] [--lat 40.4]
//!         [--twilight civil] [--utc-offset 120] [--json]
//!         [--config path.toml] [--save]
//! ```


use anyhow::{anyhow, bail, Context as _};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use log::{debug, info};
use std::env;
use sunmoon_lib::config::{Config, CONFIG_FILE};
use sunmoon_lib::renderer::{draw_ascii, to_json};
use sunmoon_lib::{calc_sun_and_moon, Context, Instant, TwilightKind};

/// Options collected from the command line.
#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    date: Option<NaiveDateTime>,
    longitude_deg: Option<f64>,
    latitude_deg: Option<f64>,
    twilight: Option<TwilightKind>,
    utc_offset_minutes: Option<i32>,
    json: bool,
    config_path: Option<String>,
    save: bool,
    help: bool,
}

const USAGE: &str = "\
Usage: sunmoon [OPTIONS]

Options:
  --date <YYYY-MM-DD[THH:MM:SS]>  Instant to compute, UT (default: now)
  --lon <DEG>                     Observer longitude, east positive
  --lat <DEG>                     Observer latitude, north positive
  --twilight <KIND>               horizon | civil | nautical | astronomical
  --utc-offset <MINUTES>          Offset used when printing times
  --json                          Print the report as JSON
  --config <PATH>                 Configuration file (default: sunmoon-config.toml)
  --save                          Write the effective configuration back
  --help                          Show this message";

/// Parse a date given as a full timestamp or a bare day (midnight UT).
fn parse_date(value: &str) -> anyhow::Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}'", value))?;
    day.and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("invalid date '{}'", value))
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<CliOptions> {
    let mut options = CliOptions::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| anyhow!("missing value for {}", name))
        };
        match arg.as_str() {
            "--date" => options.date = Some(parse_date(&value("--date")?)?),
            "--lon" => {
                let v = value("--lon")?;
                options.longitude_deg =
                    Some(v.parse().with_context(|| format!("invalid longitude '{}'", v))?);
            }
            "--lat" => {
                let v = value("--lat")?;
                options.latitude_deg =
                    Some(v.parse().with_context(|| format!("invalid latitude '{}'", v))?);
            }
            "--twilight" => {
                options.twilight = Some(value("--twilight")?.parse().map_err(|e: String| anyhow!(e))?)
            }
            "--utc-offset" => {
                let v = value("--utc-offset")?;
                options.utc_offset_minutes =
                    Some(v.parse().with_context(|| format!("invalid UTC offset '{}'", v))?);
            }
            "--config" => options.config_path = Some(value("--config")?),
            "--json" => options.json = true,
            "--save" => options.save = true,
            "--help" | "-h" => options.help = true,
            other => bail!("unknown argument '{}'\n\n{}", other, USAGE),
        }
    }
    Ok(options)
}

/// Apply command-line overrides on top of the loaded configuration.
///
/// Fails when the resulting observer lies outside ±180° / ±90°; nothing is
/// computed or saved for such a location.
fn apply_overrides(config: &mut Config, options: &CliOptions) -> anyhow::Result<()> {
    if let Some(lon) = options.longitude_deg {
        config.observer.longitude_deg = lon;
    }
    if let Some(lat) = options.latitude_deg {
        config.observer.latitude_deg = lat;
    }
    if options.longitude_deg.is_some() || options.latitude_deg.is_some() {
        config.observer.name = "Custom location".to_string();
    }
    if let Some(twilight) = options.twilight {
        config.events.twilight = twilight;
    }
    if let Some(offset) = options.utc_offset_minutes {
        config.display.utc_offset_minutes = offset;
    }
    if let Err(e) = config.observer.validate() {
        bail!("{} (longitude must be within ±180°, latitude within ±90°)", e);
    }
    Ok(())
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = parse_args(env::args().skip(1))?;
    if options.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config_path = options.config_path.as_deref().unwrap_or(CONFIG_FILE);
    let mut config = Config::load_from_path(config_path);
    apply_overrides(&mut config, &options)?;

    if options.save {
        config
            .save_to_path(config_path)
            .with_context(|| format!("saving configuration to {}", config_path))?;
        eprintln!("Configuration saved to {}", config_path);
    }

    let instant = match options.date {
        Some(date) => Instant::try_from(date)?,
        None => Instant::from_datetime(Utc::now())?,
    };
    debug!("instant JD {} (ΔT {:.1} s)", instant.jd_ut(), instant.delta_t());

    let ctx = Context::new(instant, config.observer_location()).with_twilight(config.events.twilight);
    let report = calc_sun_and_moon(&ctx);
    info!("report computed for {}", config.observer.name);

    if options.json {
        println!("{}", to_json(&report)?);
    } else {
        draw_ascii(&report, &config);
    }
    Ok(())
}
