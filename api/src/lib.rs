//! ktools API Library
//!
//! Shared definitions for talking to the looking-glass backend.
//! This includes the response types of every endpoint, endpoint templating,
//! the server location registry and input validation.

pub mod endpoint;
pub mod error;
pub mod location;
pub mod types;
pub mod validate;

pub use endpoint::{endpoint, ParamValue};
pub use error::ApiError;
pub use location::{Location, LocationRegistry};

/// API version prefix inserted between the location origin and the endpoint
pub const API_VERSION: &str = "v1";
