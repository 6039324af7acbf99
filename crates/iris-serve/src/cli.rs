use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, ServeConfig};

#[derive(Parser, Debug)]
#[command(
    name = "iris-serve",
    version,
    about = "Serve the iris classifier over HTTP"
)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long, env = "IRIS_SERVE_CONFIG")]
    pub config: Option<PathBuf>,
    #[arg(long, env = "IRIS_SERVE_HOST")]
    pub host: Option<String>,
    #[arg(short, long, env = "IRIS_SERVE_PORT")]
    pub port: Option<u16>,
    /// Classifier artifact stem
    #[arg(long, env = "IRIS_SERVE_MODEL_PATH")]
    pub model_path: Option<PathBuf>,
    #[arg(long, env = "IRIS_SERVE_RESULT_LOG_URL")]
    pub result_log_url: Option<String>,
    #[arg(long, env = "IRIS_SERVE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl ServeArgs {
    /// Reads the config file if one was given, then applies the flags on top.
    pub fn resolve(&self) -> Result<ServeConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServeConfig::load(path)?,
            None => ServeConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut ServeConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(path) = &self.model_path {
            config.model.path = path.clone();
        }
        if let Some(url) = &self.result_log_url {
            config.result_log.url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

pub fn parse_serve_args() -> ServeArgs {
    ServeArgs::parse()
}
