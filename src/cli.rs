use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::app::{AppConfig, DEFAULT_ZOOM};
use crate::error::POSITION_WARNING;
use crate::types::Coords;
use crate::workout::SpeedFormula;

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts from a map-click event script"
)]
pub struct Cli {
    /// JSON-lines event script. Reads stdin when omitted.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Position reported by the geolocation lookup, as LAT,LNG.
    ///
    /// When omitted the lookup fails and no map is loaded.
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub position: Option<Coords>,

    /// Message reported when the geolocation lookup fails.
    #[arg(long, value_name = "MSG", default_value = POSITION_WARNING)]
    pub geolocation_error: String,

    /// Initial map zoom level
    #[arg(long, default_value_t = DEFAULT_ZOOM)]
    pub zoom: f64,

    /// Cycling speed formula: `literal` (always 60) or `duration` (km/h)
    #[arg(long, value_enum, default_value_t = SpeedFormula::Literal)]
    pub speed_formula: SpeedFormula,

    /// Print the workout list as HTML list items
    #[arg(long)]
    pub html: bool,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

impl Cli {
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            zoom: self.zoom,
            speed_formula: self.speed_formula,
            ..AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_app() {
        let cli = Cli::try_parse_from(["mapty"]).unwrap();
        assert!(cli.script.is_none());
        assert!(cli.position.is_none());
        assert_eq!(cli.geolocation_error, POSITION_WARNING);
        assert_eq!(cli.app_config(), AppConfig::default());
    }

    #[test]
    fn parses_negative_position_and_formula() {
        let cli = Cli::try_parse_from([
            "mapty",
            "--position",
            "-33.9,18.4",
            "--speed-formula",
            "duration",
            "-vv",
            "session.jsonl",
        ])
        .unwrap();
        assert_eq!(cli.position, Some(Coords::new(-33.9, 18.4)));
        assert_eq!(cli.speed_formula, SpeedFormula::DurationBased);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.script.as_deref(), Some(std::path::Path::new("session.jsonl")));
    }

    #[test]
    fn rejects_bad_position() {
        assert!(Cli::try_parse_from(["mapty", "--position", "north"]).is_err());
    }
}
