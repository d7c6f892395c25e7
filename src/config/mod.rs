// Configuration module entry point
// Loads configuration from defaults, an optional file and the environment

mod state;
mod types;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Prefix for environment overrides, e.g. `ITSANDBOX__SERVER__PORT=9000`
const ENV_PREFIX: &str = "ITSANDBOX";

impl Config {
    /// Load configuration from specified file path (extension optional)
    /// A missing file is not an error; defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = with_defaults(config::Config::builder())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Built-in defaults only, ignoring files and environment
    #[cfg(test)]
    pub fn defaults() -> Result<Self, ConfigError> {
        with_defaults(config::Config::builder())?
            .build()?
            .try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("logging.access_log", true)?
        .set_default("logging.access_log_format", "combined")?
        .set_default("logging.log_events", true)?
        .set_default("performance.keep_alive_timeout", 75)?
        .set_default("performance.read_timeout", 30)?
        .set_default("performance.write_timeout", 30)?
        .set_default("performance.backlog", 128)?
        .set_default("performance.shutdown_grace", 5)?
        .set_default("http.server_name", "itsandbox-backend")?
        .set_default("http.max_body_size", 65_536)?
        .set_default("http.dispatch_path", "/")?
        .set_default("http.invoke_path", "/invoke")?
        .set_default("health.enabled", true)?
        .set_default("health.liveness_path", "/healthz")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let cfg = Config::defaults().unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.workers, None);
        assert!(cfg.logging.access_log);
        assert!(cfg.logging.log_events);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.performance.max_connections, None);
        assert_eq!(cfg.http.max_body_size, 65_536);
        assert_eq!(cfg.http.dispatch_path, "/");
        assert_eq!(cfg.http.invoke_path, "/invoke");
        assert!(cfg.health.enabled);
        assert_eq!(cfg.health.liveness_path, "/healthz");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!(
            "itsandbox-config-test-{}.toml",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"
[server]
port = 9090
workers = 2

[performance]
max_connections = 64

[http]
invoke_path = "/2015-03-31/invoke"
"#,
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.performance.max_connections, Some(64));
        assert_eq!(cfg.http.invoke_path, "/2015-03-31/invoke");
        // untouched keys keep their defaults
        assert_eq!(cfg.http.dispatch_path, "/");
        assert_eq!(cfg.performance.read_timeout, 30);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        assert!(Config::load_from("/nonexistent/itsandbox/config").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::defaults().unwrap();
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8080);

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
