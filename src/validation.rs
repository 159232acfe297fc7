use crate::error::MaptyError;
use crate::types::{FormValues, WorkoutKind};
use crate::utils::coerce_number;

/// Form input that passed the per-kind checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidInput {
    Running {
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    },
    Cycling {
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    },
}

impl ValidInput {
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

pub fn all_finite(inputs: &[f64]) -> bool {
    inputs.iter().all(|v| v.is_finite())
}

pub fn all_positive(inputs: &[f64]) -> bool {
    inputs.iter().all(|&v| v > 0.0)
}

/// Coerces the raw form fields and applies the rule for the selected kind.
///
/// Running needs distance, duration and cadence finite and positive.
/// Cycling needs all three finite but only distance and duration positive:
/// elevation may be zero or negative.
pub fn validate(values: &FormValues) -> Result<ValidInput, MaptyError> {
    let kind: WorkoutKind = values.kind.parse()?;
    let distance_km = coerce_number(&values.distance);
    let duration_min = coerce_number(&values.duration);

    match kind {
        WorkoutKind::Running => {
            let cadence_spm = coerce_number(&values.cadence);
            let fields = [distance_km, duration_min, cadence_spm];
            if !all_finite(&fields) || !all_positive(&fields) {
                return Err(MaptyError::InputInvalid { kind });
            }
            Ok(ValidInput::Running {
                distance_km,
                duration_min,
                cadence_spm,
            })
        }
        WorkoutKind::Cycling => {
            let elevation_gain_m = coerce_number(&values.elevation);
            if !all_finite(&[distance_km, duration_min, elevation_gain_m])
                || !all_positive(&[distance_km, duration_min])
            {
                return Err(MaptyError::InputInvalid { kind });
            }
            Ok(ValidInput::Cycling {
                distance_km,
                duration_min,
                elevation_gain_m,
            })
        }
    }
}
