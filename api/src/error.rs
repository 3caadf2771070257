//! API error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unknown server location: {0}")]
    UnknownLocation(String),

    #[error("No server locations configured")]
    NoLocations,

    #[error("Duplicate server location id: {0}")]
    DuplicateLocation(String),

    #[error("Invalid location list: {0}")]
    InvalidLocationList(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Unknown DNS record type: {0}")]
    UnknownDnsType(String),
}
