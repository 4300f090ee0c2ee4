// Configuration module entry point
// Loads the startup configuration and holds the shared runtime state

mod state;
mod types;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::imaging::resolve::normalize_path;
use crate::logger;

// Re-export public types
pub use state::AppState;
pub use types::{Config, RouteConfig};

/// Default config file name (extension is detected by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Sections that configure the server itself rather than a route
const RESERVED_SECTIONS: &[&str] = &["server", "logging", "performance", "images"];

/// Startup configuration failure; the process does not start
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("route '{route}' directory '{dir}' is outside base directory '{base_dir}'")]
    RouteOutsideBase {
        route: String,
        dir: String,
        base_dir: String,
    },
}

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is required; environment variables prefixed `IMGRESIZE_`
    /// override it (`IMGRESIZE_SERVER__PORT=9000`).
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(true))
            .add_source(
                config::Environment::with_prefix("IMGRESIZE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 15)?
            .set_default("performance.read_timeout", 10)?
            .set_default("performance.write_timeout", 10)?
            .set_default("images.max_dimension", 8192)?
            .build()?;

        let sections: HashMap<String, config::Value> = settings.clone().try_deserialize()?;
        let mut cfg: Self = settings.try_deserialize()?;
        cfg.routes = collect_routes(sections);
        cfg.validate_routes()?;
        Ok(cfg)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::InvalidAddress(format!("{e}")))
    }

    /// Ensure every route directory lies inside `server.base_dir` when one is set
    fn validate_routes(&self) -> Result<(), ConfigError> {
        let Some(base_dir) = self.server.base_dir.as_deref() else {
            return Ok(());
        };
        let base = normalize_path(Path::new(base_dir));
        for route in &self.routes {
            if !normalize_path(Path::new(&route.dir)).starts_with(&base) {
                return Err(ConfigError::RouteOutsideBase {
                    route: route.route.clone(),
                    dir: route.dir.clone(),
                    base_dir: base_dir.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
impl Config {
    /// Defaults matching `load_from`, with access logging off
    pub fn for_tests(routes: Vec<RouteConfig>) -> Self {
        Self {
            server: types::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                base_dir: None,
                workers: None,
            },
            logging: types::LoggingConfig {
                access_log: false,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: types::PerformanceConfig {
                keep_alive_timeout: 15,
                read_timeout: 10,
                write_timeout: 10,
                max_connections: None,
            },
            images: types::ImageConfig {
                max_dimension: 4096,
            },
            routes,
        }
    }
}

/// Turn every non-reserved section with `route` and `dir` keys into a route
fn collect_routes(sections: HashMap<String, config::Value>) -> Vec<RouteConfig> {
    let mut names: Vec<_> = sections
        .keys()
        .filter(|name| !RESERVED_SECTIONS.contains(&name.as_str()))
        .cloned()
        .collect();
    names.sort();

    let mut routes = Vec::new();
    for name in names {
        let Some(table) = sections
            .get(&name)
            .and_then(|v| v.clone().into_table().ok())
        else {
            continue;
        };

        let field = |key: &str| {
            table
                .get(key)
                .and_then(|v| v.clone().into_string().ok())
                .filter(|s| !s.is_empty())
        };

        match (field("route"), field("dir")) {
            (Some(route), Some(dir)) => routes.push(RouteConfig { route, dir }),
            _ => logger::log_warning(&format!(
                "Section [{name}] skipped: both 'route' and 'dir' are required"
            )),
        }
    }
    routes
}
