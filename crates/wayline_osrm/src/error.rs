use std::ops::Range;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OsrmError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("OSRM could not route the request: {0}")]
    NoRoute(String),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Incomplete response")]
    IncompleteResponse,

    #[error(
        "table batch {index} failed (origins {origins:?}, destinations {destinations:?}): {source}"
    )]
    Batch {
        index: usize,
        origins: Range<usize>,
        destinations: Range<usize>,
        #[source]
        source: Box<OsrmError>,
    },

    #[error("invalid coordinate: latitude {lat}, longitude {lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("cell '{0}' is not a number")]
    BadNumber(String),

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("row has {got} cells, expected {expected}")]
    RowLength { expected: usize, got: usize },

    #[error("empty coordinate list")]
    EmptyInput,
}
