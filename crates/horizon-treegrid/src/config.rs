//! Tree-grid configuration.
//!
//! [`TreeGridConfig`] gathers the behavioural switches of the grid. Every
//! field has a default, so a configuration file only needs to list what it
//! changes:
//!
//! ```toml
//! dangling_parents = "reject"
//! child_filter_mode = "parent-values"
//! ```
//!
//! # Persistence
//!
//! Configurations can be parsed from TOML or JSON strings, or loaded from and
//! saved to files whose format is picked by extension:
//!
//! ```ignore
//! use horizon_treegrid::TreeGridConfig;
//!
//! let config = TreeGridConfig::load("grid.toml")?;
//! config.save("grid.json")?;
//! ```
//!
//! Saves are atomic: the text is written to a temporary file next to the
//! target and renamed over it.

use std::io::Write;
use std::path::Path;

use horizon_treegrid_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TreeGridError};
use crate::model::{ChildFilterMode, DanglingParentPolicy};

/// Behavioural configuration of a [`TreeGrid`](crate::TreeGrid).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeGridConfig {
    /// What the annotator does with rows whose parent does not exist.
    pub dangling_parents: DanglingParentPolicy,
    /// Initial state of rows discovered to be parents.
    pub default_expanded: bool,
    /// Which row's values column predicates look at for child rows.
    pub child_filter_mode: ChildFilterMode,
    /// Request a render even when `set_expanded` changes nothing.
    pub render_on_noop: bool,
    /// Move focus to the toggled row after each transition.
    pub restore_focus: bool,
    /// Whether substring text filters honour case.
    pub text_filter_case_sensitive: bool,
}

impl Default for TreeGridConfig {
    fn default() -> Self {
        Self {
            dangling_parents: DanglingParentPolicy::default(),
            default_expanded: false,
            child_filter_mode: ChildFilterMode::default(),
            render_on_noop: false,
            restore_focus: true,
            text_filter_case_sensitive: false,
        }
    }
}

/// On-disk format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format.
    Json,
    /// TOML format.
    Toml,
}

impl ConfigFormat {
    /// Picks the format from a file extension (`.json` or `.toml`).
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            _ => Err(TreeGridError::config_parse(format!(
                "cannot infer configuration format from '{}'",
                path.display()
            ))),
        }
    }
}

impl TreeGridConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dangling-parent policy.
    pub fn with_dangling_parents(mut self, policy: DanglingParentPolicy) -> Self {
        self.dangling_parents = policy;
        self
    }

    /// Sets the initial state of newly discovered parents.
    pub fn with_default_expanded(mut self, expanded: bool) -> Self {
        self.default_expanded = expanded;
        self
    }

    /// Sets how child rows are matched against column filters.
    pub fn with_child_filter_mode(mut self, mode: ChildFilterMode) -> Self {
        self.child_filter_mode = mode;
        self
    }

    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| TreeGridError::config_parse(e.to_string()))
    }

    /// Parses a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| TreeGridError::config_parse(e.to_string()))
    }

    /// Serializes to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| TreeGridError::config_parse(e.to_string()))
    }

    /// Serializes to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TreeGridError::config_parse(e.to_string()))
    }

    /// Loads a configuration file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|e| TreeGridError::config_io(path, e))?;

        let config = match format {
            ConfigFormat::Json => Self::from_json_str(&text)?,
            ConfigFormat::Toml => Self::from_toml_str(&text)?,
        };
        tracing::debug!(
            target: targets::CONFIG,
            path = %path.display(),
            ?format,
            "loaded tree-grid configuration"
        );
        Ok(config)
    }

    /// Saves the configuration atomically, choosing the format by extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => self.to_json_string()?,
            ConfigFormat::Toml => self.to_toml_string()?,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| TreeGridError::config_io(path, e))?;
        temp.write_all(text.as_bytes())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| TreeGridError::config_io(path, e))?;
        temp.persist(path)
            .map_err(|e| TreeGridError::config_io(path, e.error))?;

        tracing::debug!(
            target: targets::CONFIG,
            path = %path.display(),
            "saved tree-grid configuration"
        );
        Ok(())
    }
}
