//! 服务器配置
//!
//! 默认监听 `127.0.0.1:8088`，可以用环境变量覆盖：
//!
//! - `LITAF_SOCKET`          设置后改为监听这个 Unix socket 路径 (权限 0660)
//! - `LITAF_BIND_ADDR`       默认 "127.0.0.1"
//! - `LITAF_PORT`            默认 "8088"
//! - `LITAF_OUTBOUND_BUFFER` 每个连接的发送队列长度，默认 "32"
//!
//! 日志级别由 `RUST_LOG` 控制。

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8088;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp { host: String, port: u16 },
    Unix(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub endpoint: Endpoint,
    /// 每个连接的发送队列长度，队列满视为该连接背压
    pub outbound_buffer: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}={value} is not a valid value")]
    InvalidValue { key: &'static str, value: String },

    #[error("LITAF_OUTBOUND_BUFFER must be at least 1")]
    ZeroBuffer,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            endpoint: Endpoint::Tcp { host: DEFAULT_HOST.to_string(), port: DEFAULT_PORT },
            outbound_buffer: 32,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置，缺省的键使用默认值
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();

        let endpoint = match lookup("LITAF_SOCKET") {
            Some(path) if !path.is_empty() => Endpoint::Unix(PathBuf::from(path)),
            _ => Endpoint::Tcp {
                host: lookup("LITAF_BIND_ADDR").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: read_or_default(&lookup, "LITAF_PORT", DEFAULT_PORT)?,
            },
        };

        let outbound_buffer = read_or_default(&lookup, "LITAF_OUTBOUND_BUFFER", defaults.outbound_buffer)?;
        if outbound_buffer == 0 {
            return Err(ConfigError::ZeroBuffer);
        }

        Ok(ServerConfig { endpoint, outbound_buffer })
    }
}

fn read_or_default<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Endpoint::Tcp { host, port } => write!(f, "{}:{}", host, port),
            Endpoint::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.endpoint.to_string(), "127.0.0.1:8088");
    }

    #[test]
    fn test_tcp_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("LITAF_BIND_ADDR", "0.0.0.0"),
            ("LITAF_PORT", "9001"),
            ("LITAF_OUTBOUND_BUFFER", "8"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, Endpoint::Tcp { host: "0.0.0.0".to_string(), port: 9001 });
        assert_eq!(config.outbound_buffer, 8);
    }

    #[test]
    fn test_unix_socket_wins_over_tcp() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("LITAF_SOCKET", "lit_af.sock"),
            ("LITAF_PORT", "9001"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, Endpoint::Unix(PathBuf::from("lit_af.sock")));
    }

    #[test]
    fn test_invalid_values() {
        let err = ServerConfig::from_lookup(lookup_from(&[("LITAF_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "LITAF_PORT", .. }));

        let err = ServerConfig::from_lookup(lookup_from(&[("LITAF_OUTBOUND_BUFFER", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroBuffer));
    }
}
