use thiserror::Error;

use crate::types::WorkoutKind;

/// Warning shown when a submission fails validation.
pub const INPUT_WARNING: &str = "Input has to be a positive number";

/// Warning shown when the startup position cannot be used.
pub const POSITION_WARNING: &str = "Could not get your position";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaptyError {
    #[error("invalid {kind} input: input has to be a positive number")]
    InputInvalid { kind: WorkoutKind },
    #[error("unknown workout type: {0:?}")]
    UnknownKind(String),
    #[error("geolocation unavailable: {0}")]
    GeolocationUnavailable(String),
    #[error("unusable position ({lat}, {lng})")]
    MalformedPosition { lat: f64, lng: f64 },
    #[error("map is not loaded")]
    MapNotLoaded,
    #[error("no map location selected")]
    NoPendingLocation,
    #[error("duplicate workout id {0}")]
    DuplicateId(String),
}

impl MaptyError {
    /// Text surfaced to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::InputInvalid { .. } => INPUT_WARNING.to_string(),
            Self::GeolocationUnavailable(msg) => msg.clone(),
            Self::MalformedPosition { .. } => POSITION_WARNING.to_string(),
            other => other.to_string(),
        }
    }
}
