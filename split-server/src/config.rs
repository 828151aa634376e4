//! Process configuration from environment variables.
//!
//! Read once at startup. Unset variables fall back to defaults; a set
//! but unparseable variable is a startup error rather than a silent
//! fallback.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::split::{MAX_SPLIT_POINTS, ScanConfig};
use crate::vendo::VendoConfig;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Error in the process configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub vendo: VendoConfig,
    pub scan: ScanConfig,
    pub cache: CacheConfig,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which returns a
    /// variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = match parse(&lookup, "SPLIT_BIND_ADDR")? {
            Some(addr) => addr,
            None => default_bind_addr(),
        };

        let mut vendo = VendoConfig::default();
        if let Some(url) = lookup("VENDO_BASE_URL") {
            vendo = vendo.with_base_url(url);
        }
        if let Some(agent) = lookup("VENDO_USER_AGENT") {
            vendo = vendo.with_user_agent(agent);
        }
        if let Some(secs) = parse(&lookup, "VENDO_TIMEOUT_SECS")? {
            vendo = vendo.with_timeout(secs);
        }
        if let Some(n) = parse_positive(&lookup, "VENDO_MAX_CONCURRENT")? {
            vendo = vendo.with_max_concurrent(n);
        }

        let mut scan = ScanConfig::default();
        if let Some(n) = parse_positive(&lookup, "SPLIT_MAX_CONCURRENT")? {
            scan.max_concurrent = n;
        }
        if let Some(secs) = parse(&lookup, "SPLIT_CALL_TIMEOUT_SECS")? {
            scan.call_timeout_secs = secs;
        }
        if let Some(n) = parse::<usize>(&lookup, "SPLIT_MAX_SPLIT_POINTS")? {
            if n > MAX_SPLIT_POINTS {
                return Err(ConfigError::Invalid {
                    name: "SPLIT_MAX_SPLIT_POINTS",
                    value: n.to_string(),
                    reason: format!("must be at most {MAX_SPLIT_POINTS}"),
                });
            }
            scan.max_split_points = n;
        }

        let mut cache = CacheConfig::default();
        if let Some(secs) = parse(&lookup, "SPLIT_CACHE_TTL_SECS")? {
            cache = cache.with_ttl(Duration::from_secs(secs));
        }

        Ok(Self {
            bind_addr,
            vendo,
            scan,
            cache,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            vendo: VendoConfig::default(),
            scan: ScanConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };

    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value,
            reason: e.to_string(),
        })
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<usize>, ConfigError> {
    match parse::<usize>(lookup, name)? {
        Some(0) => Err(ConfigError::Invalid {
            name,
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        }),
        other => Ok(other),
    }
}
