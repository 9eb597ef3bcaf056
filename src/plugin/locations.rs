use std::env;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Directory name used under user, system and library locations.
pub const PLUGIN_DIR_NAME: &str = "classrouter";
/// Subdirectory of each location that holds module files.
pub const PLUGINS_SUBDIR: &str = "plugins";
/// Extra library search paths, separated like `PATH`.
pub const LIBRARY_PATH_ENV: &str = "CLASSROUTER_LIBRARY_PATH";

/// Ordered, de-duplicated list of directories searched for plugin modules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginLocations {
    paths: Vec<PathBuf>,
}

impl PluginLocations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform defaults: user config dir(s), library paths, install dir.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut locations = Self::new();
        for dir in user_dirs() {
            locations.add(dir);
        }
        for dir in library_dirs() {
            locations.add(dir);
        }
        if let Some(dir) = install_dir() {
            locations.add(dir);
        }
        debug!(locations = ?locations.paths, "Default plugin locations");
        locations
    }

    /// Append `path` unless it is already listed. Returns whether it was added.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.paths.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    pub fn extend<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for path in paths {
            self.add(path);
        }
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.paths
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for PluginLocations {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut locations = Self::new();
        locations.extend(iter);
        locations
    }
}

#[cfg(target_os = "macos")]
fn user_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(home) = env::var_os("HOME") {
        dirs.push(
            PathBuf::from(home)
                .join("Library/Application Support")
                .join(PLUGIN_DIR_NAME),
        );
    }
    dirs.push(Path::new("/Library/Application Support").join(PLUGIN_DIR_NAME));
    dirs
}

#[cfg(windows)]
fn user_dirs() -> Vec<PathBuf> {
    env::var_os("APPDATA")
        .map(|appdata| vec![PathBuf::from(appdata).join(PLUGIN_DIR_NAME)])
        .unwrap_or_default()
}

#[cfg(not(any(target_os = "macos", windows)))]
fn user_dirs() -> Vec<PathBuf> {
    env::var_os("HOME")
        .map(|home| vec![PathBuf::from(home).join(format!(".{PLUGIN_DIR_NAME}"))])
        .unwrap_or_default()
}

fn library_dirs() -> Vec<PathBuf> {
    let Some(paths) = env::var_os(LIBRARY_PATH_ENV) else {
        return Vec::new();
    };
    env::split_paths(&paths)
        .map(|dir| dir.join(PLUGIN_DIR_NAME))
        .filter(|dir| dir.is_dir())
        .collect()
}

fn install_dir() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    exe.parent().filter(|dir| dir.is_dir()).map(Path::to_path_buf)
}

static DEFAULT_LOCATIONS: OnceCell<Mutex<PluginLocations>> = OnceCell::new();

/// Install the process-wide default locations. Call once, at startup.
///
/// Returns `false` (and leaves the installed set alone) if defaults were already
/// installed.
pub fn install_default_locations(locations: PluginLocations) -> bool {
    let installed = DEFAULT_LOCATIONS.set(Mutex::new(locations)).is_ok();
    if !installed {
        warn!("Default plugin locations already installed, ignoring");
    }
    installed
}

/// Append to the process-wide defaults. Duplicates are ignored.
///
/// Returns `false` if the path was already present or no defaults were installed.
/// Registries that already exist are unaffected.
pub fn add_default_location(path: impl Into<PathBuf>) -> bool {
    let path = path.into();
    match DEFAULT_LOCATIONS.get() {
        Some(locations) => locations.lock().add(path),
        None => {
            warn!(
                path = %path.display(),
                "No default plugin locations installed, location not added"
            );
            false
        }
    }
}

/// Snapshot of the process-wide defaults, or freshly computed platform defaults
/// when none were installed.
#[must_use]
pub fn default_locations() -> PluginLocations {
    DEFAULT_LOCATIONS
        .get()
        .map(|locations| locations.lock().clone())
        .unwrap_or_else(PluginLocations::with_defaults)
}
