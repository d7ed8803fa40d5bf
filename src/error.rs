//! Error types for pvtilt
//!
//! Every failure in the pipeline is fatal: there is no retry and no partial
//! recovery, the error is reported and the run stops.

use std::path::PathBuf;

use thiserror::Error;

use crate::dataset::TiltAngle;

/// Main error type for pvtilt operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid dataset {path}: {reason}")]
    InvalidDataset { path: PathBuf, reason: String },

    #[error("Tilt angle {angle}° appears in both {first} and {second}")]
    DuplicateAngle { angle: TiltAngle, first: PathBuf, second: PathBuf },

    #[error("Empty dataset file range: {start}-{end}")]
    EmptyAngleRange { start: u32, end: u32 },

    #[error("No datasets loaded")]
    NoDatasets,

    #[error("Dataset for {angle}° has no records for {month}")]
    MissingMonth { angle: TiltAngle, month: &'static str },

    #[error("No tilt angle produced a positive winter average of {quantity}")]
    NoPositiveCandidate { quantity: &'static str },

    #[error("Extraterrestrial irradiance for {month} is zero, clearness index undefined")]
    ZeroExtraterrestrial { month: &'static str },

    #[error("Sun never rises at local noon during {month} at latitude {latitude}°")]
    NoDaylight { month: &'static str, latitude: f64 },

    #[error("Invalid year range: {start}-{end}")]
    InvalidYearRange { start: i32, end: i32 },

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for pvtilt operations
pub type Result<T> = std::result::Result<T, Error>;
