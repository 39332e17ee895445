//! # Configuration Types
//!
//! Connection parameters for clients, server options for transports and the
//! aggregate configuration of the `service-host` binary.

use common::config::{ConfigValidation, LoggingConfig};
use common::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use service_logger::LoggerConfig;
use std::time::Duration;

use crate::transport::TransportKind;

/// Retry interval used when `retry_after_milli_secs` is not positive
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_millis(1000);

/// How to reach a remote gRPC endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionInfo {
    pub use_tls: bool,
    /// CA certificate for [`crate::GrpcClient::connect`], client certificate
    /// for [`crate::GrpcClient::connect_mutual`]
    pub cert_file: String,
    pub key_file: String,
    pub ca_file: String,
    /// Name checked against the server certificate, `ip` when empty
    pub server_host_name: String,
    pub ip: String,
    pub port: String,
    /// Non-zero makes each dial blocking with this deadline
    pub timeout_in_milli_secs: i64,
    /// Additional attempts after the first failed dial
    pub retry_times: i64,
    pub retry_after_milli_secs: i64,
}

impl ConnectionInfo {
    /// Deadline of a single dial, `None` for a lazily connecting channel
    pub fn dial_timeout(&self) -> Option<Duration> {
        match self.timeout_in_milli_secs {
            0 => None,
            ms => Some(Duration::from_millis(ms.max(0).unsigned_abs())),
        }
    }

    /// Pause between two dial attempts
    pub fn retry_interval(&self) -> Duration {
        match u64::try_from(self.retry_after_milli_secs) {
            Ok(ms) if ms > 0 => Duration::from_millis(ms),
            _ => DEFAULT_RETRY_AFTER,
        }
    }

    /// Total number of dial attempts, `retry_times + 1`
    pub fn attempts(&self) -> u32 {
        u32::try_from(self.retry_times.max(0))
            .unwrap_or(u32::MAX - 1)
            .saturating_add(1)
    }

    /// Domain name used for TLS server verification
    pub fn tls_domain(&self) -> String {
        if self.server_host_name.is_empty() {
            self.ip.clone()
        } else {
            self.server_host_name.clone()
        }
    }
}

/// Options for creating a transport
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerOptions {
    pub kind: TransportKind,
    pub use_tls: bool,
    pub cert_file: String,
    pub key_file: String,
    /// Client CA bundle, enables mutual TLS for gRPC transports when set
    pub ca_file: String,
    /// Listening port, 0 picks a free one
    pub port: u16,
}

/// Configuration of the `service-host` binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Server name used in log lines
    pub name: String,
    pub transport: ServerOptions,
    pub logger: LoggerConfig,
    pub logging: LoggingConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "Service Host".to_string(),
            transport: ServerOptions {
                port: 50051,
                ..ServerOptions::default()
            },
            logger: LoggerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ConfigValidation for ServiceConfig {
    type Error = ConfigurationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.name.is_empty() {
            return Err(ConfigurationError::MissingRequired {
                key: "name".to_string(),
            });
        }

        if self.transport.use_tls {
            for (key, value) in [
                ("transport.cert_file", &self.transport.cert_file),
                ("transport.key_file", &self.transport.key_file),
            ] {
                if value.is_empty() {
                    return Err(ConfigurationError::MissingRequired {
                        key: key.to_string(),
                    });
                }
            }
        }

        if self.transport.kind == TransportKind::GrpcWeb && !self.transport.ca_file.is_empty() {
            return Err(ConfigurationError::invalid_value(
                "transport.ca_file",
                &self.transport.ca_file,
                "mutual TLS is only supported by the grpc transport",
            ));
        }

        self.logging.validate()
    }

    fn warnings(&self) -> Vec<String> {
        let mut warnings = self.logging.warnings();

        if !self.transport.use_tls {
            warnings.push("TLS disabled, traffic is sent in plaintext".to_string());
        }
        if self.transport.port == 0 {
            warnings.push("transport.port is 0, a random port will be used".to_string());
        }
        if self.logger.log_file_path().is_none() {
            warnings.push("No log file configured, logging to console only".to_string());
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::loader::load_from_file;
    use tempfile::TempDir;

    #[test]
    fn test_dial_timeout() {
        let mut info = ConnectionInfo::default();
        assert_eq!(info.dial_timeout(), None);

        info.timeout_in_milli_secs = 250;
        assert_eq!(info.dial_timeout(), Some(Duration::from_millis(250)));

        info.timeout_in_milli_secs = -5;
        assert_eq!(info.dial_timeout(), Some(Duration::ZERO));
    }

    #[test]
    fn test_retry_interval_defaults() {
        let mut info = ConnectionInfo::default();
        assert_eq!(info.retry_interval(), DEFAULT_RETRY_AFTER);

        info.retry_after_milli_secs = -1;
        assert_eq!(info.retry_interval(), DEFAULT_RETRY_AFTER);

        info.retry_after_milli_secs = 20;
        assert_eq!(info.retry_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_attempts() {
        let mut info = ConnectionInfo::default();
        assert_eq!(info.attempts(), 1);

        info.retry_times = 3;
        assert_eq!(info.attempts(), 4);

        info.retry_times = -2;
        assert_eq!(info.attempts(), 1);
    }

    #[test]
    fn test_tls_domain() {
        let mut info = ConnectionInfo {
            ip: "10.0.0.1".to_string(),
            ..ConnectionInfo::default()
        };
        assert_eq!(info.tls_domain(), "10.0.0.1");

        info.server_host_name = "api.example.com".to_string();
        assert_eq!(info.tls_domain(), "api.example.com");
    }

    #[test]
    fn test_service_config_validation() {
        let mut config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.warnings().is_empty());

        config.transport.use_tls = true;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MissingRequired { .. })
        ));

        config.transport.cert_file = "server.pem".to_string();
        config.transport.key_file = "server.key".to_string();
        assert!(config.validate().is_ok());

        config.transport.kind = TransportKind::GrpcWeb;
        config.transport.ca_file = "ca.pem".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_service_config_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("service.toml");
        std::fs::write(
            &path,
            r#"
name = "Greeter"

[transport]
kind = "grpc-web"
port = 8080

[logger]
server_name = "Greeter"
level = "warning"
log_dir = "/tmp/greeter"
log_file_name = "greeter.log"
"#,
        )
        .unwrap();

        let config: ServiceConfig = load_from_file(&path).unwrap();
        assert_eq!(config.name, "Greeter");
        assert_eq!(config.transport.kind, TransportKind::GrpcWeb);
        assert_eq!(config.transport.port, 8080);
        assert_eq!(
            config.logger.level,
            service_logger::LogLevel::Warning
        );
        assert!(config.logger.log_file_path().is_some());
        assert_eq!(config.logging, LoggingConfig::default());
    }
}
