//! # Plugin Module
//!
//! Where handler modules are looked for, and the seam through which they are loaded.
//!
//! ## Search locations
//!
//! [`PluginLocations`] is an ordered, de-duplicated list of directories. The defaults
//! ([`PluginLocations::with_defaults`]) are, in order:
//!
//! - the per-user config directory (`~/.classrouter` on Linux,
//!   `~/Library/Application Support/classrouter` plus the system-wide
//!   `/Library/Application Support/classrouter` on macOS, `%APPDATA%\classrouter` on Windows)
//! - every directory listed in `CLASSROUTER_LIBRARY_PATH` that has a `classrouter`
//!   subdirectory (the subdirectory is what gets added)
//! - the directory of the running executable
//!
//! Modules live in the `plugins/` subdirectory of each location and must carry the
//! platform's dynamic library extension (`so`, `dylib`, `dll`).
//!
//! A registry is always built from an explicit `PluginLocations` value. For programs
//! that want one process-wide default, [`install_default_locations`] is the single
//! initialization point; [`add_default_location`] appends to it afterwards and only
//! affects registries built later.
//!
//! ## Loading
//!
//! Turning a module file into handler instances is platform business and lives behind
//! [`ModuleLoader`]. The registry only asks a loader for a module's declared identity
//! (used by the identity filter) and for the handlers it provides. By default the
//! identity is read from a sidecar manifest, `<module>.json`, holding `{"IID": "..."}`.

mod loader;
mod locations;

pub use loader::{manifest_path, read_manifest, scan_modules, ModuleLoader, ModuleManifest};
pub use locations::{
    add_default_location, default_locations, install_default_locations, PluginLocations,
    LIBRARY_PATH_ENV, PLUGINS_SUBDIR, PLUGIN_DIR_NAME,
};
