//! Configuration types.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 8000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub readiness: ReadinessConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to bind (0 picks a free port).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Which route set to serve.
    #[serde(default)]
    pub routes: RouteLayout,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            routes: RouteLayout::default(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("taskboard.db")
}

/// Startup readiness gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessConfig {
    #[serde(default)]
    pub mode: StartupMode,

    /// Total schema creation attempts in retry mode (default: 10).
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Fixed delay between attempts in milliseconds (default: 2000).
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// What to do when every attempt failed.
    #[serde(default)]
    pub on_exhausted: ExhaustedPolicy,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            mode: StartupMode::default(),
            attempts: default_attempts(),
            delay_ms: default_delay_ms(),
            on_exhausted: ExhaustedPolicy::default(),
        }
    }
}

fn default_attempts() -> u32 {
    10
}

fn default_delay_ms() -> u64 {
    2_000
}

/// Route set served by the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteLayout {
    /// List at `/`, mark done at `POST /{id}`, open tasks at `/not_finished`.
    #[default]
    Root,
    /// List at `/main`, mark done at `POST /main/{id}/done`, open tasks at `/not_done`.
    Main,
}

/// How the schema is created at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupMode {
    /// Retry on connection failures with a fixed delay.
    #[default]
    Retry,
    /// Single attempt; failure aborts startup. Only sensible for a local file.
    Once,
}

/// Behavior once retry mode runs out of attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustedPolicy {
    /// Log and start serving anyway.
    #[default]
    Proceed,
    /// Abort startup.
    Fail,
}

macro_rules! impl_from_str {
    ($ty:ty, $($name:literal => $variant:expr),+ $(,)?) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    other => Err(format!(
                        "unknown value '{}', expected one of: {}",
                        other,
                        [$($name),+].join(", ")
                    )),
                }
            }
        }
    };
}

impl_from_str!(RouteLayout, "root" => RouteLayout::Root, "main" => RouteLayout::Main);
impl_from_str!(StartupMode, "retry" => StartupMode::Retry, "once" => StartupMode::Once);
impl_from_str!(ExhaustedPolicy, "proceed" => ExhaustedPolicy::Proceed, "fail" => ExhaustedPolicy::Fail);
