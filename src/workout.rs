use chrono::{DateTime, Datelike, Local};
use clap::ValueEnum;
use std::fmt;

use crate::types::{Coords, WorkoutKind};
use crate::validation::ValidInput;

pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// How cycling speed is derived.
///
/// `Literal` reproduces the long-standing behaviour `distance / (distance / 60)`,
/// which is 60 for every non-zero distance. `DurationBased` is km/h computed
/// from the duration: `distance / (duration / 60)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SpeedFormula {
    #[default]
    #[value(name = "literal")]
    Literal,
    #[value(name = "duration")]
    DurationBased,
}

impl SpeedFormula {
    pub fn speed_km_per_h(self, distance_km: f64, duration_min: f64) -> f64 {
        let raw = match self {
            Self::Literal => distance_km / (distance_km / 60.0),
            Self::DurationBased => distance_km / (duration_min / 60.0),
        };
        raw.round()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Last 10 decimal digits of an epoch-millisecond timestamp.
    pub fn from_millis(ms: i64) -> Self {
        let digits = ms.to_string();
        let start = digits.len().saturating_sub(10);
        Self(digits[start..].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out time-derived ids, bumping the millisecond when two records
/// land on the same one.
#[derive(Debug, Default)]
pub struct IdSource {
    last_ms: Option<i64>,
}

impl IdSource {
    pub fn next(&mut self, now: DateTime<Local>) -> WorkoutId {
        let mut ms = now.timestamp_millis();
        if let Some(last) = self.last_ms
            && ms <= last
        {
            ms = last + 1;
        }
        self.last_ms = Some(ms);
        WorkoutId::from_millis(ms)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Running {
    pub cadence_spm: f64,
    pub pace_min_per_km: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cycling {
    pub elevation_gain_m: f64,
    pub speed_km_per_h: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkoutDetails {
    Running(Running),
    Cycling(Cycling),
}

impl WorkoutDetails {
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running(_) => WorkoutKind::Running,
            Self::Cycling(_) => WorkoutKind::Cycling,
        }
    }
}

/// One logged session. Every field is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Local>,
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    description: String,
    details: WorkoutDetails,
}

impl Workout {
    pub fn running(
        id: WorkoutId,
        created_at: DateTime<Local>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Self {
        let details = WorkoutDetails::Running(Running {
            cadence_spm,
            pace_min_per_km: (duration_min / distance_km).round(),
        });
        Self::with_details(id, created_at, coords, distance_km, duration_min, details)
    }

    pub fn cycling(
        id: WorkoutId,
        created_at: DateTime<Local>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
        formula: SpeedFormula,
    ) -> Self {
        let details = WorkoutDetails::Cycling(Cycling {
            elevation_gain_m,
            speed_km_per_h: formula.speed_km_per_h(distance_km, duration_min),
        });
        Self::with_details(id, created_at, coords, distance_km, duration_min, details)
    }

    fn with_details(
        id: WorkoutId,
        created_at: DateTime<Local>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        details: WorkoutDetails,
    ) -> Self {
        Self {
            id,
            description: describe(details.kind(), &created_at),
            created_at,
            coords,
            distance_km,
            duration_min,
            details,
        }
    }

    pub const fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn details(&self) -> &WorkoutDetails {
        &self.details
    }

    pub const fn kind(&self) -> WorkoutKind {
        self.details.kind()
    }
}

/// `"<Kind> on <Month> <day>"`, e.g. `Running on April 14`.
pub fn describe(kind: WorkoutKind, at: &DateTime<Local>) -> String {
    let month = MONTHS[at.month0() as usize];
    format!("{} on {month} {}", kind.capitalized(), at.day())
}

/// Builds records from validated input, owning id generation and the
/// cycling speed formula.
#[derive(Debug, Default)]
pub struct WorkoutFactory {
    ids: IdSource,
    speed_formula: SpeedFormula,
}

impl WorkoutFactory {
    pub fn new(speed_formula: SpeedFormula) -> Self {
        Self {
            ids: IdSource::default(),
            speed_formula,
        }
    }

    pub const fn speed_formula(&self) -> SpeedFormula {
        self.speed_formula
    }

    pub fn build(&mut self, input: ValidInput, coords: Coords, now: DateTime<Local>) -> Workout {
        let id = self.ids.next(now);
        match input {
            ValidInput::Running {
                distance_km,
                duration_min,
                cadence_spm,
            } => Workout::running(id, now, coords, distance_km, duration_min, cadence_spm),
            ValidInput::Cycling {
                distance_km,
                duration_min,
                elevation_gain_m,
            } => Workout::cycling(
                id,
                now,
                coords,
                distance_km,
                duration_min,
                elevation_gain_m,
                self.speed_formula,
            ),
        }
    }
}
