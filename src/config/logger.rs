use std::collections::HashMap;
use std::path::PathBuf;

use tracing::Level;

use crate::error::{EthicrawlError, Result};

/// Logging configuration: a global level, optional per-component overrides,
/// and console/file sink settings. Levels are `tracing::Level`, the facade
/// the rest of the crate's logging is built on (see [`crate::logger::Logger`]).
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    level: Level,
    console_enabled: bool,
    file_enabled: bool,
    file_path: Option<PathBuf>,
    use_colors: bool,
    format: String,
    component_levels: HashMap<String, Level>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            level: Level::INFO,
            console_enabled: true,
            file_enabled: false,
            file_path: None,
            use_colors: true,
            format: "{timestamp} - {component} - {level} - {message}".to_string(),
            component_levels: HashMap::new(),
        }
    }
}

impl LoggerConfig {
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    pub fn console_enabled(&self) -> bool {
        self.console_enabled
    }

    pub fn set_console_enabled(&mut self, value: bool) {
        self.console_enabled = value;
    }

    pub fn file_enabled(&self) -> bool {
        self.file_enabled
    }

    pub fn set_file_enabled(&mut self, value: bool) {
        self.file_enabled = value;
    }

    pub fn file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    pub fn set_file_path(&mut self, path: Option<PathBuf>) {
        self.file_path = path;
    }

    pub fn use_colors(&self) -> bool {
        self.use_colors
    }

    pub fn set_use_colors(&mut self, value: bool) {
        self.use_colors = value;
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn set_format(&mut self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        if value.is_empty() {
            return Err(EthicrawlError::Config("format string cannot be empty".to_string()));
        }
        self.format = value;
        Ok(())
    }

    /// A copy of the per-component level overrides, matching the source's
    /// copy-on-read discipline (`component_levels` returns `self._component_levels.copy()`).
    pub fn component_levels(&self) -> HashMap<String, Level> {
        self.component_levels.clone()
    }

    pub fn set_component_level(&mut self, component: impl Into<String>, level: Level) {
        self.component_levels.insert(component.into(), level);
    }

    /// The level that should gate emission from `component`: its override,
    /// if set, else the global level.
    pub fn effective_level(&self, component: &str) -> Level {
        self.component_levels
            .get(component)
            .copied()
            .unwrap_or(self.level)
    }
}
