//! Process configuration, read from the environment

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::error::ConfigError;

/// Where and how the register is served
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// listening address, all interfaces by default
    pub host: IpAddr,
    /// listening port
    pub port: u16,
    /// number of `may` worker threads, runtime default when `None`
    pub workers: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: Config::DEFAULT_PORT,
            workers: None,
        }
    }
}

impl Config {
    pub const DEFAULT_PORT: u16 = 8000;

    /// `env_logger` filter used when `RUST_LOG` is unset, keeps the
    /// runtime's own chatter out of the register log
    pub const DEFAULT_LOG_FILTER: &'static str = "first_writer=info";

    /// read `HOST`, `PORT` and `WORKERS`, unset or blank variables keep their default
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    /// same as `from_env`, with the variables supplied by `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(host) = var(&lookup, "HOST") {
            config.host = parse("HOST", host)?;
        }
        if let Some(port) = var(&lookup, "PORT") {
            config.port = parse("PORT", port)?;
        }
        if let Some(workers) = var(&lookup, "WORKERS") {
            let workers: usize = parse("WORKERS", workers)?;
            if workers == 0 {
                return Err(ConfigError::Invalid {
                    name: "WORKERS",
                    value: "0".to_owned(),
                    reason: "at least one worker is needed".to_owned(),
                });
            }
            config.workers = Some(workers);
        }
        Ok(config)
    }

    /// the socket address to bind
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn var<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn parse<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.parse() {
        Ok(v) => Ok(v),
        Err(e) => Err(ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}
