//! # Runtime Configuration Module
//!
//! Loads [`RouterConfig`] from a YAML file and/or environment variables.
//!
//! ## File format
//!
//! ```yaml
//! context: api               # optional first path segment, empty = none
//! plugin_id: com.example.widgets   # only load modules declaring this identity
//! plugin_locations:          # appended after the default locations
//!   - /opt/widgets
//! use_default_locations: true
//! include_static: true
//! coercion: lenient          # or: strict
//! log:
//!   level: info
//!   format: json             # or: pretty
//!   include_location: false
//! ```
//!
//! Every field is optional.
//!
//! ## Environment Variables
//!
//! Applied by [`RouterConfig::apply_env`], overriding the file:
//!
//! - `CLASSROUTER_CONTEXT`
//! - `CLASSROUTER_PLUGIN_ID`
//! - `CLASSROUTER_PLUGIN_PATH`: extra locations, separated like `PATH`
//! - `CLASSROUTER_COERCION`: `lenient` or `strict`
//! - `CLASSROUTER_LOG_LEVEL`, `CLASSROUTER_LOG_FORMAT`, `CLASSROUTER_LOG_INCLUDE_LOCATION`
//!
//! ## Usage
//!
//! ```rust
//! use classrouter::runtime_config::RouterConfig;
//!
//! let config = RouterConfig::from_env();
//! println!("context: {:?}", config.context);
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dispatcher::CoercionPolicy;
use crate::logging::LogConfig;
use crate::plugin::{default_locations, ModuleLoader, PluginLocations};
use crate::registry::RegistryBuilder;

pub const CONTEXT_ENV: &str = "CLASSROUTER_CONTEXT";
pub const PLUGIN_ID_ENV: &str = "CLASSROUTER_PLUGIN_ID";
pub const PLUGIN_PATH_ENV: &str = "CLASSROUTER_PLUGIN_PATH";
pub const COERCION_ENV: &str = "CLASSROUTER_COERCION";

/// Everything needed to build a [`Router`](crate::router::Router).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// First path segment this router accepts; empty for none
    pub context: String,
    /// Identity filter for dynamic modules
    pub plugin_id: Option<String>,
    /// Locations searched in addition to the defaults
    pub plugin_locations: Vec<PathBuf>,
    /// Start from the default locations (see [`default_locations`])
    pub use_default_locations: bool,
    /// Register statically linked handlers
    pub include_static: bool,
    pub coercion: CoercionPolicy,
    pub log: LogConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            context: String::new(),
            plugin_id: None,
            plugin_locations: Vec::new(),
            use_default_locations: true,
            include_static: true,
            coercion: CoercionPolicy::default(),
            log: LogConfig::default(),
        }
    }
}

impl RouterConfig {
    /// Read a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).context("Failed to parse router config")
    }

    /// Defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    #[must_use]
    pub fn apply_env(mut self) -> Self {
        if let Ok(context) = env::var(CONTEXT_ENV) {
            self.context = context;
        }
        if let Ok(plugin_id) = env::var(PLUGIN_ID_ENV) {
            self.plugin_id = Some(plugin_id).filter(|id| !id.is_empty());
        }
        if let Some(paths) = env::var_os(PLUGIN_PATH_ENV) {
            for path in env::split_paths(&paths) {
                if !self.plugin_locations.contains(&path) {
                    self.plugin_locations.push(path);
                }
            }
        }
        if let Ok(policy) = env::var(COERCION_ENV) {
            self.coercion = CoercionPolicy::parse(&policy);
        }
        self.log = self.log.apply_env();
        self
    }

    /// The locations a registry built from this config searches.
    #[must_use]
    pub fn locations(&self) -> PluginLocations {
        let mut locations = if self.use_default_locations {
            default_locations()
        } else {
            PluginLocations::new()
        };
        locations.extend(self.plugin_locations.iter().cloned());
        locations
    }

    /// A registry builder carrying this config's locations, identity filter
    /// and static-handler switch.
    #[must_use]
    pub fn registry_builder(&self, loader: Option<Box<dyn ModuleLoader>>) -> RegistryBuilder {
        RegistryBuilder::default()
            .locations(self.locations())
            .plugin_id(self.plugin_id.clone())
            .include_static(self.include_static)
            .boxed_loader(loader)
    }
}
