use std::env::consts::DLL_EXTENSION;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::locations::{PluginLocations, PLUGINS_SUBDIR};
use crate::error::PluginError;
use crate::handler::ClassHandler;

/// Metadata declared next to a module file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModuleManifest {
    /// Declared identity, compared against the registry's identity filter.
    #[serde(rename = "IID", default)]
    pub iid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Turns module files into handler instances.
///
/// The registry never assumes a module format; it hands each candidate path to the
/// loader. Any `Fn(&Path) -> Result<Vec<Arc<dyn ClassHandler>>, PluginError>` is a
/// loader whose identities come from the sidecar manifest.
pub trait ModuleLoader: Send + Sync {
    /// Identity the module declares, if any.
    fn identity(&self, module: &Path) -> Option<String> {
        match read_manifest(module) {
            Ok(manifest) => manifest.and_then(|m| m.iid),
            Err(err) => {
                warn!(module = %module.display(), error = %err, "Unreadable module manifest");
                None
            }
        }
    }

    /// Instantiate the handlers the module provides.
    fn load(&self, module: &Path) -> Result<Vec<Arc<dyn ClassHandler>>, PluginError>;
}

impl<F> ModuleLoader for F
where
    F: Fn(&Path) -> Result<Vec<Arc<dyn ClassHandler>>, PluginError> + Send + Sync,
{
    fn load(&self, module: &Path) -> Result<Vec<Arc<dyn ClassHandler>>, PluginError> {
        self(module)
    }
}

/// `libwidgets.so` → `libwidgets.json`
#[must_use]
pub fn manifest_path(module: &Path) -> PathBuf {
    module.with_extension("json")
}

/// Read the sidecar manifest of `module`. A missing manifest is `Ok(None)`.
pub fn read_manifest(module: &Path) -> Result<Option<ModuleManifest>, PluginError> {
    let path = manifest_path(module);
    if !path.is_file() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path).map_err(|source| PluginError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| PluginError::Manifest { path, source })
}

/// Every file with the platform's dynamic library extension under `<location>/plugins`.
///
/// Locations without a `plugins` directory are skipped silently; unreadable ones are
/// logged. Results keep location order and are sorted by file name within a location.
#[must_use]
pub fn scan_modules(locations: &PluginLocations) -> Vec<PathBuf> {
    let mut modules = Vec::new();
    for location in locations.iter() {
        let dir = location.join(PLUGINS_SUBDIR);
        if !dir.is_dir() {
            continue;
        }
        debug!(dir = %dir.display(), "Searching for plugin modules");

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "Cannot read plugin directory");
                continue;
            }
        };

        let mut found: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_module_extension(path))
            .collect();
        found.sort();
        modules.extend(found);
    }
    modules
}

fn has_module_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == DLL_EXTENSION)
}
