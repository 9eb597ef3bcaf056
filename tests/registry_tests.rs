//! Handler discovery from the static set and plugin locations.

mod common;

use std::path::Path;
use std::sync::Arc;

use classrouter::handler::ClassHandler;
use classrouter::plugin::{ModuleLoader, PluginLocations};
use classrouter::registry::HandlerRegistry;
use classrouter::echo::{self, ECHO_CLASS};
use classrouter::router::Router;
use classrouter::PluginError;
use common::{stem_loader, write_module, Widgets};
use tempfile::TempDir;

fn builtin() -> Arc<dyn ClassHandler> {
    Widgets::named("Builtin")
}

classrouter::register_static_handler!(builtin);

fn locations(dirs: &[&TempDir]) -> PluginLocations {
    dirs.iter().map(|dir| dir.path().to_path_buf()).collect()
}

/// Reports a fixed identity for every module instead of reading manifests.
struct FixedIdentity(&'static str);

impl ModuleLoader for FixedIdentity {
    fn identity(&self, _module: &Path) -> Option<String> {
        Some(self.0.to_string())
    }

    fn load(&self, module: &Path) -> Result<Vec<Arc<dyn ClassHandler>>, PluginError> {
        stem_loader(module)
    }
}

#[test]
fn test_static_handlers_are_registered_first() {
    let dir = TempDir::new().unwrap();
    write_module(dir.path(), "widgets", None);

    let registry = HandlerRegistry::builder()
        .locations(locations(&[&dir]))
        .loader(stem_loader)
        .discover();

    let classes: Vec<&str> = registry.class_names().collect();
    assert_eq!(classes, vec!["Builtin", "Widgets"]);
}

#[test]
fn test_modules_load_across_locations_in_order() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_module(first.path(), "beta", None);
    write_module(first.path(), "alpha", None);
    write_module(second.path(), "gamma", None);

    let registry = HandlerRegistry::builder()
        .locations(locations(&[&first, &second]))
        .include_static(false)
        .loader(stem_loader)
        .discover();

    let classes: Vec<&str> = registry.class_names().collect();
    assert_eq!(classes, vec!["Alpha", "Beta", "Gamma"]);
}

#[test]
fn test_failing_and_empty_modules_are_skipped() {
    let dir = TempDir::new().unwrap();
    write_module(dir.path(), "broken", None);
    write_module(dir.path(), "empty", None);
    write_module(dir.path(), "widgets", None);

    let registry = HandlerRegistry::builder()
        .locations(locations(&[&dir]))
        .include_static(false)
        .loader(stem_loader)
        .discover();

    assert_eq!(registry.len(), 1);
    assert!(registry.lookup("Widgets").is_some());
}

#[test]
fn test_first_class_name_wins_across_modules() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_module(first.path(), "widgets", Some("first"));
    write_module(second.path(), "widgets", Some("second"));

    let registry = HandlerRegistry::builder()
        .locations(locations(&[&first, &second]))
        .include_static(false)
        .loader(stem_loader)
        .discover();

    assert_eq!(registry.len(), 1);

    let filtered = HandlerRegistry::builder()
        .locations(locations(&[&first, &second]))
        .include_static(false)
        .plugin_id(Some("second".to_string()))
        .loader(stem_loader)
        .discover();
    assert_eq!(filtered.len(), 1);
}

#[test]
fn test_identity_filter_uses_manifests() {
    let dir = TempDir::new().unwrap();
    write_module(dir.path(), "wanted", Some("com.example.widgets"));
    write_module(dir.path(), "other", Some("com.example.other"));
    write_module(dir.path(), "anonymous", None);

    let registry = HandlerRegistry::builder()
        .locations(locations(&[&dir]))
        .include_static(false)
        .plugin_id(Some("com.example.widgets".to_string()))
        .loader(stem_loader)
        .discover();

    let classes: Vec<&str> = registry.class_names().collect();
    assert_eq!(classes, vec!["Wanted"]);
}

#[test]
fn test_empty_identity_filter_loads_everything() {
    let dir = TempDir::new().unwrap();
    write_module(dir.path(), "wanted", Some("com.example.widgets"));
    write_module(dir.path(), "anonymous", None);

    let registry = HandlerRegistry::builder()
        .locations(locations(&[&dir]))
        .include_static(false)
        .plugin_id(Some(String::new()))
        .loader(stem_loader)
        .discover();

    assert_eq!(registry.len(), 2);
}

#[test]
fn test_custom_loader_identity() {
    let dir = TempDir::new().unwrap();
    write_module(dir.path(), "widgets", Some("ignored-by-this-loader"));

    let matching = HandlerRegistry::builder()
        .locations(locations(&[&dir]))
        .include_static(false)
        .plugin_id(Some("fixed".to_string()))
        .loader(FixedIdentity("fixed"))
        .discover();
    assert_eq!(matching.len(), 1);

    let other = HandlerRegistry::builder()
        .locations(locations(&[&dir]))
        .include_static(false)
        .plugin_id(Some("ignored-by-this-loader".to_string()))
        .loader(FixedIdentity("fixed"))
        .discover();
    assert!(other.is_empty());
}

#[test]
fn test_modules_without_loader_are_ignored() {
    let dir = TempDir::new().unwrap();
    write_module(dir.path(), "widgets", None);

    let registry = HandlerRegistry::builder()
        .locations(locations(&[&dir]))
        .discover();

    let classes: Vec<&str> = registry.class_names().collect();
    assert_eq!(classes, vec!["Builtin"]);
}

#[test]
fn test_manual_registration_after_discovery() {
    let mut registry = HandlerRegistry::builder().discover();
    let widgets = Widgets::new();

    assert!(registry.register(widgets.clone()));
    assert_eq!(widgets.init_count(), 1);
    assert!(!registry.register(Widgets::new()));

    let endpoints = registry.endpoints();
    assert!(endpoints.contains(&"Widgets.get(request, response, id)".to_string()));
    assert!(endpoints.contains(&"Builtin.list(request, response)".to_string()));
    // private and non-dispatchable operations are never listed
    assert!(!endpoints.iter().any(|e| e.contains("purge")));
}

#[test]
fn test_static_set_holds_only_submitted_handlers() {
    let registry = HandlerRegistry::builder().discover();
    let classes: Vec<&str> = registry.class_names().collect();
    assert_eq!(classes, vec!["Builtin"]);
}

#[test]
fn test_user_echo_class_keeps_its_name() {
    let mut registry = HandlerRegistry::builder().discover();
    let users_echo = Widgets::named(ECHO_CLASS);
    assert!(registry.register(users_echo.clone()));
    // the built-in handler yields when registered afterwards
    assert!(!registry.register(echo::handler()));

    let router = Router::new(registry, "");
    assert!(router.route("/echo/list"));
    assert!(!router.route("/echo/ping"));
    assert_eq!(users_echo.last_call().unwrap().operation, "list");
}
