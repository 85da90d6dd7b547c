use std::{env, net::SocketAddr, str::FromStr};

use thiserror::Error;

pub const DEFAULT_GRPC_PORT: u16 = 12345;
pub const DEFAULT_HTTP_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub grpc_port: u16,
    pub http_port: u16,
    pub log_format: LogFormat,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be a valid u16")]
    InvalidPort(&'static str),
    #[error("MATH_GRPC_PORT and MATH_HTTP_PORT must differ")]
    PortConflict,
    #[error("LOG_FORMAT must be `compact` or `json`")]
    InvalidLogFormat,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("MATH_BIND_ADDR")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let grpc_port = parse_port(&lookup, "MATH_GRPC_PORT")?.unwrap_or(DEFAULT_GRPC_PORT);
        let http_port = parse_port(&lookup, "MATH_HTTP_PORT")?.unwrap_or(DEFAULT_HTTP_PORT);
        let log_format = lookup("LOG_FORMAT")
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        // Port 0 asks the OS for an ephemeral port, so two zeroes never collide.
        if grpc_port == http_port && grpc_port != 0 {
            return Err(ConfigError::PortConflict);
        }

        let config = Self {
            bind_addr,
            grpc_port,
            http_port,
            log_format,
        };

        let _ = config.grpc_socket()?;
        Ok(config)
    }

    pub fn grpc_socket(&self) -> Result<SocketAddr, ConfigError> {
        socket(&self.bind_addr, self.grpc_port)
    }

    pub fn http_socket(&self) -> Result<SocketAddr, ConfigError> {
        socket(&self.bind_addr, self.http_port)
    }
}

fn parse_port<F>(lookup: &F, key: &'static str) -> Result<Option<u16>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(key))
        })
        .transpose()
}

fn socket(bind_addr: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    format!("{bind_addr}:{port}")
        .parse::<SocketAddr>()
        .map_err(|_| ConfigError::InvalidSocket)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn parse_defaults() {
        let config = config_from(&[]).expect("config should parse");
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.grpc_port, 12345);
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.log_format, LogFormat::Compact);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("MATH_BIND_ADDR", "127.0.0.1"),
            ("MATH_GRPC_PORT", "50051"),
            ("MATH_HTTP_PORT", "3000"),
            ("LOG_FORMAT", "JSON"),
        ])
        .expect("config should parse");

        assert_eq!(
            config.grpc_socket().expect("grpc socket"),
            "127.0.0.1:50051".parse().expect("valid socket")
        );
        assert_eq!(
            config.http_socket().expect("http socket"),
            "127.0.0.1:3000".parse().expect("valid socket")
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_port_fails() {
        let err = config_from(&[("MATH_HTTP_PORT", "80800")]).expect_err("expected port error");
        assert!(matches!(err, ConfigError::InvalidPort("MATH_HTTP_PORT")));
    }

    #[test]
    fn equal_ports_conflict() {
        let err = config_from(&[("MATH_GRPC_PORT", "9000"), ("MATH_HTTP_PORT", "9000")])
            .expect_err("expected port conflict");
        assert!(matches!(err, ConfigError::PortConflict));
    }

    #[test]
    fn ephemeral_ports_do_not_conflict() {
        let config = config_from(&[("MATH_GRPC_PORT", "0"), ("MATH_HTTP_PORT", "0")])
            .expect("config should parse");
        assert_eq!(config.grpc_port, 0);
        assert_eq!(config.http_port, 0);
    }

    #[test]
    fn invalid_bind_addr_fails() {
        let err = config_from(&[("MATH_BIND_ADDR", "not an address")])
            .expect_err("expected socket error");
        assert!(matches!(err, ConfigError::InvalidSocket));
    }

    #[test]
    fn unknown_log_format_fails() {
        let err = config_from(&[("LOG_FORMAT", "pretty")]).expect_err("expected format error");
        assert!(matches!(err, ConfigError::InvalidLogFormat));
    }
}
