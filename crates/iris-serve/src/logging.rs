use env_logger::{Builder, Env};

/// Installs the global logger. `RUST_LOG` wins over `default_level`.
///
/// Calling it twice is harmless: the second logger is discarded.
pub fn init(default_level: &str) {
    let env = Env::default().default_filter_or(default_level);
    if Builder::from_env(env).format_timestamp_millis().try_init().is_err() {
        log::debug!("Logger already installed");
    }
}
