//! Tracing / logging initialisation helpers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Crates covered by [`LogConfig::feed_level`].
pub const FEED_CRATES: [&str; 3] = ["chainfeed", "chainfeed_core", "chainfeed_http"];

/// Log level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Level for every ChainFeed crate, e.g. `debug` to see filter polling
    /// without turning up reqwest/hyper. Entries in `components` win.
    #[serde(default)]
    pub feed_level: Option<String>,
    /// Per-crate overrides, e.g. `chainfeed-http → debug`.
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            feed_level: None,
            components: BTreeMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// `EnvFilter` directive string, e.g. `"info,chainfeed_http=debug"`.
    pub fn directives(&self) -> String {
        let components: BTreeMap<String, &str> = self
            .components
            .iter()
            .map(|(component, level)| (component.replace('-', "_"), level.as_str()))
            .collect();

        let mut directives = self.level.clone();
        if let Some(feed_level) = &self.feed_level {
            for krate in FEED_CRATES.iter().filter(|k| !components.contains_key(**k)) {
                directives.push_str(&format!(",{krate}={feed_level}"));
            }
        }
        for (component, level) in &components {
            directives.push_str(&format!(",{component}={level}"));
        }
        directives
    }
}

/// Install the global tracing subscriber.
///
/// Call once at startup; a second call returns an error and leaves the
/// existing subscriber in place. Unparseable directives fall back to `info`.
pub fn init_tracing(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_new(config.directives()).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
    }
}
