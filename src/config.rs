//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every key has a default so the relay
//! starts with no configuration at all.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::RelayError;

/// Default greeting carried by the consumer welcome frame.
pub const DEFAULT_WELCOME_MESSAGE: &str = "Connected to the relay";

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Host address every listener binds to.
    pub host: IpAddr,

    /// Port of the producer ("game") WebSocket endpoint.
    pub game_port: u16,

    /// Port of the HTTP endpoint (landing page, health, static assets).
    pub web_port: u16,

    /// Port of the consumer ("web") WebSocket endpoint.
    pub ws_port: u16,

    /// Domain / identity string reported by `/health`.
    pub domain: String,

    /// Directory served for every HTTP path without a dedicated route.
    pub static_dir: PathBuf,

    /// Landing page served at `GET /`.
    pub index_file: PathBuf,

    /// Capacity of each consumer's outbound queue.
    pub consumer_queue_capacity: usize,

    /// Greeting sent to consumers right after they connect.
    pub welcome_message: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            game_port: 8080,
            web_port: 8081,
            ws_port: 8082,
            domain: "localhost".to_string(),
            static_dir: PathBuf::from("public"),
            index_file: PathBuf::from("index.html"),
            consumer_queue_capacity: 1024,
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
        }
    }
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `RELAY_HOST` is set but is not a
    /// valid IP address.
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Numeric keys that are missing or unparsable fall back to their
    /// defaults. `WS_PORT` defaults to `WEB_PORT + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if `RELAY_HOST` cannot be parsed, or
    /// if `WS_PORT` is unset and `WEB_PORT + 1` overflows.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = match lookup("RELAY_HOST") {
            Some(raw) => raw
                .parse()
                .map_err(|_| RelayError::Config(format!("invalid RELAY_HOST: {raw}")))?,
            None => defaults.host,
        };

        let game_port = parse_value(&lookup, "GAME_PORT", defaults.game_port);
        let web_port = parse_value(&lookup, "WEB_PORT", defaults.web_port);
        let ws_port = match lookup("WS_PORT").and_then(|v| v.parse().ok()) {
            Some(port) => port,
            None => web_port.checked_add(1).ok_or_else(|| {
                RelayError::Config(format!("WEB_PORT {web_port} leaves no room for WS_PORT"))
            })?,
        };

        let consumer_queue_capacity = parse_value(
            &lookup,
            "CONSUMER_QUEUE_CAPACITY",
            defaults.consumer_queue_capacity,
        )
        .max(1);

        Ok(Self {
            host,
            game_port,
            web_port,
            ws_port,
            domain: lookup("RELAY_DOMAIN").unwrap_or(defaults.domain),
            static_dir: lookup("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
            index_file: lookup("INDEX_FILE").map_or(defaults.index_file, PathBuf::from),
            consumer_queue_capacity,
            welcome_message: lookup("WELCOME_MESSAGE").unwrap_or(defaults.welcome_message),
        })
    }

    /// Socket address of the producer endpoint.
    #[must_use]
    pub const fn game_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.game_port)
    }

    /// Socket address of the HTTP endpoint.
    #[must_use]
    pub const fn web_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.web_port)
    }

    /// Socket address of the consumer endpoint.
    #[must_use]
    pub const fn ws_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.ws_port)
    }
}

/// Parses a looked-up value as `T`, returning `default` on missing or
/// invalid values.
fn parse_value<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
