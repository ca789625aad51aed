//! Error taxonomy for the epicycle engine.
//!
//! Only asset and configuration problems surface as errors. Out-of-range UI
//! requests (zoom below 1, fading below the natural threshold, ...) are not
//! errors: the store ignores them and keeps its last valid state.

use thiserror::Error;

/// A drawable resource could not be turned into a path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssetParseError {
    #[error("no <path> element found")]
    MissingPath,
    #[error("<path> element has no `d` attribute")]
    MissingPathData,
    #[error("no viewBox attribute found")]
    MissingViewBox,
    #[error("malformed viewBox {0:?}: expected \"minX minY width height\"")]
    MalformedViewBox(String),
    #[error("malformed path data: {0}")]
    MalformedPathData(String),
}

#[derive(Debug, Error)]
pub enum EpicycleError {
    #[error("unable to load drawable `{name}`: {source}")]
    AssetParse {
        name: String,
        #[source]
        source: AssetParseError,
    },
    #[error("failed to read drawable `{name}`: {message}")]
    AssetLoad { name: String, message: String },
    #[error("drawable index {index} out of range ({available} available)")]
    UnknownDrawable { index: usize, available: usize },
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),
}

pub type Result<T, E = EpicycleError> = std::result::Result<T, E>;
