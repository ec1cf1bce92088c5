use std::sync::Arc;

use tracing::Level;

use crate::config::LoggerConfig;

/// A component-scoped logging handle.
///
/// Every subsystem gets a logger tagged with its own component name
/// (`"robots"`, `"sitemap"`, `"scheduler"`, ...), and a component may have
/// its own level override.
///
/// Emission itself is delegated to `tracing` — this crate never wires up a
/// subscriber (no file handles, no color codes); it
/// only decides, from `LoggerConfig`, whether a given component/level pair
/// is worth emitting before calling the `tracing` macros. The embedder is
/// responsible for installing a `tracing_subscriber` that actually honors
/// `LoggerConfig::file_enabled`/`use_colors`/`format`.
#[derive(Debug, Clone)]
pub struct Logger {
    component: Arc<str>,
    config: LoggerConfig,
}

impl Logger {
    pub fn new(component: impl Into<Arc<str>>, config: LoggerConfig) -> Self {
        Logger {
            component: component.into(),
            config,
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    fn enabled(&self, level: Level) -> bool {
        // tracing::Level orders DEBUG < INFO < WARN < ERROR is backwards from
        // its numeric `as usize`; compare via the documented ordering instead.
        level <= self.config.effective_level(&self.component)
    }

    pub fn debug(&self, message: impl std::fmt::Display) {
        if self.enabled(Level::DEBUG) {
            tracing::debug!(target: "ethicrawl", component = %self.component, "{message}");
        }
    }

    pub fn info(&self, message: impl std::fmt::Display) {
        if self.enabled(Level::INFO) {
            tracing::info!(target: "ethicrawl", component = %self.component, "{message}");
        }
    }

    pub fn warn(&self, message: impl std::fmt::Display) {
        if self.enabled(Level::WARN) {
            tracing::warn!(target: "ethicrawl", component = %self.component, "{message}");
        }
    }

    pub fn error(&self, message: impl std::fmt::Display) {
        if self.enabled(Level::ERROR) {
            tracing::error!(target: "ethicrawl", component = %self.component, "{message}");
        }
    }

    /// Derive a sub-component logger, e.g. `logger.scoped("node")` from a
    /// `"sitemap"` logger to get `"sitemap.node"`.
    pub fn scoped(&self, suffix: &str) -> Logger {
        Logger::new(format!("{}.{suffix}", self.component), self.config.clone())
    }
}
