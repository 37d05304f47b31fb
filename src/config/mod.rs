// Configuration module entry point
// Layers defaults, an optional TOML file and environment variables

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, DataConfig, HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig, RoutesConfig,
    ServerConfig,
};

use crate::loader::{BaseDir, DataLoader};

/// Environment variable prefix, e.g. `DINNERS_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "DINNERS";

/// Default config file (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.backlog", 128)?
            .set_default("data.relative_path", crate::loader::DEFAULT_RELATIVE_PATH)?
            .set_default("data.schema", "passthrough")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_grace", 10)?
            .set_default("http.server_name", "dinners-web")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("routes.page_path", "/")?
            .set_default("routes.data_path", "/__data.json")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Build the data loader described by the `data` section
    pub fn data_loader(&self) -> DataLoader {
        let base_dir = self
            .data
            .base_dir
            .as_ref()
            .map_or(BaseDir::CurrentDir, |dir| BaseDir::Fixed(PathBuf::from(dir)));
        DataLoader::new(base_dir, &self.data.relative_path, self.data.schema)
    }
}
