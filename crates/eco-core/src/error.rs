//! Error types for the simulation.

use crate::types::OccupantType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Invalid value {value} for parameter {key}")]
    InvalidParameter { key: String, value: i64 },

    #[error("Config error on line {line}: {message}")]
    Config { line: usize, message: String },

    #[error("Coordinates out of bounds: {x}/{y}")]
    OutOfBounds { x: i32, y: i32 },

    #[error("Field {x}/{y} is already occupied")]
    Occupied { x: i32, y: i32 },

    #[error("Invalid occupant type for an animal: {0}")]
    InvalidOccupant(OccupantType),

    #[error("No {kind} at {x}/{y}")]
    AnimalNotFound { kind: OccupantType, x: i32, y: i32 },

    #[error("Missing gene: {0}")]
    MissingGene(String),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Animal ID number overflow")]
    IdOverflow,
}

impl Error {
    /// Fatal errors leave the simulation unable to guarantee its invariants;
    /// the driving process is expected to shut down.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::IdOverflow | Error::InvalidOccupant(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
