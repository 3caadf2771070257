//! Configuration management

use anyhow::{Context, Result};
use api::{Location, LocationRegistry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::sequencer::HopTarget;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ping: PingConfig,
    #[serde(default)]
    pub traceroute: TracerouteConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Location used when none is given on the command line
    #[serde(default)]
    pub default_location: Option<String>,
    /// JSON file with `[{name, id, url}]`, used when no [[locations]] are set
    #[serde(default)]
    pub locations_file: Option<PathBuf>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PingConfig {
    #[serde(default = "default_ping_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TracerouteConfig {
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,
    #[serde(default)]
    pub hop_target: HopTarget,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub use_colors: bool,
    #[serde(default = "default_true")]
    pub timestamps: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_ping_interval_ms() -> u64 {
    500
}

fn default_max_samples() -> usize {
    10
}

fn default_max_hops() -> u32 {
    64
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_location: None,
            locations_file: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_ping_interval_ms(),
            max_samples: default_max_samples(),
        }
    }
}

impl Default for TracerouteConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            hop_target: HopTarget::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            timestamps: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::parse(&contents)
    }

    /// Load `path` if it exists, otherwise fall back to the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            debug!("No config file at {:?}, using defaults", path.as_ref());
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .with_context(|| "Failed to parse config file")?;

        if config.ping.max_samples == 0 {
            anyhow::bail!("ping.max_samples must be at least 1");
        }
        if config.traceroute.max_hops == 0 {
            anyhow::bail!("traceroute.max_hops must be at least 1");
        }

        Ok(config)
    }

    /// Build the location registry: [[locations]], then the locations file,
    /// then the KTOOLS_BACKEND_*_ORIGIN environment fallback
    pub fn location_registry(&self) -> Result<LocationRegistry> {
        let registry = if !self.locations.is_empty() {
            LocationRegistry::init(self.locations.clone())?
        } else if let Some(file) = &self.general.locations_file {
            let blob = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read locations file: {:?}", file))?;
            LocationRegistry::from_json(&blob)
                .with_context(|| format!("Failed to parse locations file: {:?}", file))?
        } else {
            LocationRegistry::from_env()?
        };

        if let Some(id) = &self.general.default_location {
            registry
                .resolve(Some(id))
                .context("general.default_location is not a configured location")?;
        }

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.ping.interval_ms, 500);
        assert_eq!(config.ping.max_samples, 10);
        assert_eq!(config.traceroute.max_hops, 64);
        assert_eq!(config.traceroute.hop_target, HopTarget::ResolvedDestination);
        assert_eq!(config.general.request_timeout_ms, 10_000);
        assert!(config.output.use_colors);
        assert!(config.locations.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            [general]
            default_location = "us-east"
            request_timeout_ms = 2000

            [ping]
            interval_ms = 250
            max_samples = 4

            [traceroute]
            max_hops = 30
            hop_target = "last-hop"

            [output]
            use_colors = false

            [[locations]]
            name = "London"
            id = "london"
            url = "https://uk.example.com"

            [[locations]]
            name = "US East"
            id = "us-east"
            url = "https://us-east.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.ping.max_samples, 4);
        assert_eq!(config.traceroute.hop_target, HopTarget::LastHop);
        assert!(!config.output.use_colors);

        let registry = config.location_registry().unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.default_location().id, "london");
    }

    #[test]
    fn test_rejects_zero_limits() {
        assert!(Config::parse("[ping]\nmax_samples = 0").is_err());
        assert!(Config::parse("[traceroute]\nmax_hops = 0").is_err());
    }

    #[test]
    fn test_unknown_default_location() {
        let config = Config::parse(
            r#"
            [general]
            default_location = "mars"

            [[locations]]
            name = "London"
            id = "london"
            "#,
        )
        .unwrap();
        assert!(config.location_registry().is_err());
    }
}
