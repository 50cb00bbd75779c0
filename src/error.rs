use std::path::PathBuf;

use thiserror::Error;

use crate::types::Counts;

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("{axis} must be a positive finite number, got {value}")]
    InvalidDimension { axis: &'static str, value: f64 },

    #[error("aisle gap must be zero or a positive finite number, got {0}")]
    InvalidGap(f64),

    #[error("height margin must be at least 1.0, got {0}")]
    InvalidMargin(f64),

    #[error("layout grid {grid} exceeds the limit of {limit} placements")]
    TooManyPlacements { grid: Counts, limit: usize },

    #[error("{0}")]
    Parse(String),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error("failed to encode layout: {0}")]
    Encode(#[source] serde_json::Error),
}
