//! Server locations and API URL resolution
//!
//! Every backend region is described by a [`Location`]. The registry is built
//! once at startup and handed to the request layer.

use crate::error::ApiError;
use crate::API_VERSION;
use serde::{Deserialize, Serialize};

/// A named backend region
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Location {
    /// Display name, e.g. "London"
    pub name: String,
    /// Identifier used on the command line and in requests, e.g. "london"
    pub id: String,
    /// Origin of the backend. `None` means same-origin (relative URLs).
    #[serde(default)]
    pub url: Option<String>,
}

impl Location {
    pub fn new(name: impl Into<String>, id: impl Into<String>, url: Option<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            url,
        }
    }

    /// Resolve an endpoint path (which may carry a query string) to a full URL
    pub fn api_url(&self, endpoint: &str) -> String {
        let mut url = match self.url.as_deref() {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => String::from("/"),
        };
        if !url.ends_with('/') {
            url.push('/');
        }
        url.push_str(API_VERSION);
        url.push_str(endpoint);
        url
    }
}

/// Locations fallen back to when nothing else is configured: (name, id)
pub const DEFAULT_LOCATIONS: [(&str, &str); 3] = [
    ("London", "london"),
    ("US East", "us-east"),
    ("US West", "us-west"),
];

/// Environment variable holding the origin of a default location
pub fn origin_env_var(id: &str) -> String {
    format!(
        "KTOOLS_BACKEND_{}_ORIGIN",
        id.to_ascii_uppercase().replace('-', "_")
    )
}

/// Ordered, immutable set of known locations
#[derive(Debug, Clone)]
pub struct LocationRegistry {
    locations: Vec<Location>,
}

impl LocationRegistry {
    /// Build the registry. The first location is the default.
    pub fn init(locations: Vec<Location>) -> Result<Self, ApiError> {
        if locations.is_empty() {
            return Err(ApiError::NoLocations);
        }

        for (i, location) in locations.iter().enumerate() {
            if locations[..i].iter().any(|l| l.id == location.id) {
                return Err(ApiError::DuplicateLocation(location.id.clone()));
            }
        }

        Ok(Self { locations })
    }

    /// Parse the JSON list format served by the backend: `[{name, id, url}]`
    pub fn from_json(blob: &str) -> Result<Self, ApiError> {
        let locations: Vec<Location> = serde_json::from_str(blob)?;
        Self::init(locations)
    }

    /// Build the default locations, reading each origin through `lookup`
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let locations = DEFAULT_LOCATIONS
            .iter()
            .map(|(name, id)| Location::new(*name, *id, lookup(&origin_env_var(id))))
            .collect();
        Self::init(locations)
    }

    /// Build the default locations from `KTOOLS_BACKEND_*_ORIGIN`
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn default_location(&self) -> &Location {
        // init() guarantees at least one entry
        &self.locations[0]
    }

    /// Resolve an optional location id, falling back to the default
    pub fn resolve(&self, id: Option<&str>) -> Result<&Location, ApiError> {
        match id {
            Some(id) => self
                .get(id)
                .ok_or_else(|| ApiError::UnknownLocation(id.to_string())),
            None => Ok(self.default_location()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
