// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for connecting to Redis and shaping queries.
//!
//! # Example
//!
//! ```
//! use redis_repository::RedisConfig;
//!
//! // Minimal config (uses defaults)
//! let config = RedisConfig::default();
//! assert_eq!(config.connection_url(), "redis://127.0.0.1:6379/0");
//!
//! // Full config
//! let config = RedisConfig {
//!     host: "cache.internal".into(),
//!     password: Some("s3cret".into()),
//!     tls: true,
//!     key_prefix: "myapp:".into(),
//!     ..Default::default()
//! };
//! assert_eq!(config.connection_url(), "rediss://:s3cret@cache.internal:6379/0");
//!
//! // Reserved characters in credentials are percent-encoded
//! let config = RedisConfig {
//!     password: Some("a/b#c".into()),
//!     ..Default::default()
//! };
//! assert_eq!(config.connection_url(), "redis://:a%2Fb%23c@127.0.0.1:6379/0");
//! ```
//!
//! # Environment
//!
//! [`RedisConfig::from_env`] loads a `.env` file if present, then reads:
//!
//! | Variable | Field |
//! |---|---|
//! | `REDIS_HOST` | `host` |
//! | `REDIS_PORT` | `port` |
//! | `REDIS_USERNAME` | `username` |
//! | `REDIS_PASSWORD` | `password` |
//! | `REDIS_DB` | `db` |
//! | `REDIS_TLS` | `tls` (`true`/`1`) |
//! | `REDIS_KEY_PREFIX` | `key_prefix` |
//! | `REDIS_SEARCH_INDEX` | `search_index` |
//! | `REDIS_CACHE_PREFIX` | `cache_prefix` |
//! | `REDIS_CACHE_TTL_SECS` | `cache_ttl_secs` |

use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::search::{QueryFactoryConfig, ReducerAliases};
use crate::storage::traits::RepositoryError;

/// Everything but RFC 3986 unreserved characters is encoded in userinfo.
/// `%` itself is encoded so a literal `%41` survives the client's decoding.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Connection and naming settings.
///
/// All fields have defaults pointing at a local, unauthenticated Redis.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// ACL user (Redis 6+)
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Logical database number
    #[serde(default)]
    pub db: i64,

    /// Use `rediss://` (needs the `tls` feature)
    #[serde(default)]
    pub tls: bool,

    /// Prefix applied to every collection key
    #[serde(default)]
    pub key_prefix: String,

    /// RediSearch index targeted by search queries
    #[serde(default = "default_search_index")]
    pub search_index: String,

    #[serde(default)]
    pub reducer_aliases: ReducerAliases,

    /// Prefix applied to cache keys (default: "cache:")
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Default cache entry TTL, None = no expiry
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 6379 }
fn default_search_index() -> String { "idx:default".into() }
fn default_cache_prefix() -> String { "cache:".into() }

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: None,
            password: None,
            db: 0,
            tls: false,
            key_prefix: String::new(),
            search_index: default_search_index(),
            reducer_aliases: ReducerAliases::default(),
            cache_prefix: default_cache_prefix(),
            cache_ttl_secs: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T, RepositoryError> {
    raw.trim()
        .parse()
        .map_err(|_| RepositoryError::Config(format!("{} has invalid value '{}'", name, raw)))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, RepositoryError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(RepositoryError::Config(format!("{} has invalid value '{}'", name, raw))),
    }
}

impl RedisConfig {
    /// Load from the process environment, after reading `.env` if one exists.
    pub fn from_env() -> Result<Self, RepositoryError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RepositoryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("REDIS_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("REDIS_PORT") {
            config.port = parse_var("REDIS_PORT", &port)?;
        }
        config.username = lookup("REDIS_USERNAME").filter(|s| !s.is_empty());
        config.password = lookup("REDIS_PASSWORD").filter(|s| !s.is_empty());
        if let Some(db) = lookup("REDIS_DB") {
            config.db = parse_var("REDIS_DB", &db)?;
        }
        if let Some(tls) = lookup("REDIS_TLS") {
            config.tls = parse_bool("REDIS_TLS", &tls)?;
        }
        if let Some(prefix) = lookup("REDIS_KEY_PREFIX") {
            config.key_prefix = prefix;
        }
        if let Some(index) = lookup("REDIS_SEARCH_INDEX") {
            config.search_index = index;
        }
        if let Some(prefix) = lookup("REDIS_CACHE_PREFIX") {
            config.cache_prefix = prefix;
        }
        if let Some(ttl) = lookup("REDIS_CACHE_TTL_SECS") {
            config.cache_ttl_secs = Some(parse_var("REDIS_CACHE_TTL_SECS", &ttl)?);
        }

        Ok(config)
    }

    /// Connection URL: `redis[s]://[user][:password@]host:port/db`
    ///
    /// Username and password are percent-encoded.
    pub fn connection_url(&self) -> String {
        let scheme = if self.tls { "rediss" } else { "redis" };
        let encode = |part: &str| utf8_percent_encode(part, USERINFO).to_string();
        let auth = match (&self.username, &self.password) {
            (Some(user), Some(pass)) => format!("{}:{}@", encode(user.as_str()), encode(pass.as_str())),
            (Some(user), None) => format!("{}@", encode(user.as_str())),
            (None, Some(pass)) => format!(":{}@", encode(pass.as_str())),
            (None, None) => String::new(),
        };
        format!("{}://{}{}:{}/{}", scheme, auth, self.host, self.port, self.db)
    }

    /// Settings for the search query factory
    pub fn query_factory_config(&self) -> QueryFactoryConfig {
        QueryFactoryConfig {
            index_name: self.search_index.clone(),
            aliases: self.reducer_aliases.clone(),
        }
    }
}
