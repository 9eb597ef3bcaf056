use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::signature::{request_signature, signature_hash, SignatureHash};
use crate::handler::{ClassHandler, MethodDescriptor, StaticHandler};
use crate::plugin::{scan_modules, ModuleLoader, PluginLocations};

/// A registered handler and the index of its dispatchable operations.
pub struct HandlerEntry {
    class_name: String,
    handler: Arc<dyn ClassHandler>,
    /// The handler's full method table; indices into it are method indices.
    descriptors: Vec<MethodDescriptor>,
    methods: HashMap<SignatureHash, usize>,
    /// One entry per dispatchable operation; overloads repeat their name.
    method_names: Vec<String>,
}

impl HandlerEntry {
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[must_use]
    pub fn handler(&self) -> &Arc<dyn ClassHandler> {
        &self.handler
    }

    #[must_use]
    pub fn descriptor(&self, method_index: usize) -> Option<&MethodDescriptor> {
        self.descriptors.get(method_index)
    }

    #[must_use]
    pub fn method_names(&self) -> &[String] {
        &self.method_names
    }

    #[must_use]
    pub fn has_method_name(&self, name: &str) -> bool {
        self.method_names.iter().any(|n| n == name)
    }

    /// Signature hash → method index.
    #[must_use]
    pub fn methods(&self) -> &HashMap<SignatureHash, usize> {
        &self.methods
    }

    #[must_use]
    pub fn method_index(&self, hash: SignatureHash) -> Option<usize> {
        self.methods.get(&hash).copied()
    }

    /// Dispatchable operations in declaration order.
    pub fn endpoints(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.descriptors.iter().filter(|d| d.is_dispatchable())
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("class_name", &self.class_name)
            .field("method_names", &self.method_names)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// All registered handlers, keyed by class name.
///
/// Built once, then only read. Registration order is kept for listings.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, HandlerEntry>,
    order: Vec<String>,
}

impl HandlerRegistry {
    /// An empty registry; nothing is discovered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Index `handler`'s dispatchable operations.
    ///
    /// Returns `true` if the handler was added. A class name that is already
    /// registered, or a handler without any dispatchable operation, is left out
    /// and its `init` hook is not called.
    pub fn register(&mut self, handler: Arc<dyn ClassHandler>) -> bool {
        let class_name = handler.class_name().to_string();
        if self.handlers.contains_key(&class_name) {
            debug!(class = %class_name, "Handler already registered, ignoring");
            return false;
        }

        debug!(class = %class_name, "Registering handler");
        let descriptors = handler.methods();
        let mut methods = HashMap::new();
        let mut method_names = Vec::new();

        for (index, descriptor) in descriptors.iter().enumerate() {
            if !descriptor.is_dispatchable() {
                continue;
            }
            let hash = signature_hash(&descriptor.name, descriptor.parameter_names());
            if let Some(previous) = methods.insert(hash, index) {
                warn!(
                    class = %class_name,
                    signature = %descriptor.signature(),
                    shadowed_index = previous,
                    "Signature hash already taken, later declaration wins"
                );
            }
            method_names.push(descriptor.name.clone());
            debug!(
                class = %class_name,
                signature = %descriptor.signature(),
                "Dispatchable endpoint"
            );
        }

        if methods.is_empty() {
            debug!(class = %class_name, "Handler exposes no dispatchable operations");
            return false;
        }

        let endpoints = method_names.len();
        self.handlers.insert(
            class_name.clone(),
            HandlerEntry {
                class_name: class_name.clone(),
                handler: Arc::clone(&handler),
                descriptors,
                methods,
                method_names,
            },
        );
        self.order.push(class_name.clone());
        handler.init();

        info!(
            class = %class_name,
            endpoints,
            total_handlers = self.handlers.len(),
            "Handler registered"
        );
        true
    }

    #[must_use]
    pub fn lookup(&self, class_name: &str) -> Option<&HandlerEntry> {
        self.handlers.get(class_name)
    }

    /// Find the overload of `method_name` whose user parameters are exactly `argument_keys`.
    pub fn select_method<'a, I>(
        &self,
        class_name: &str,
        method_name: &str,
        argument_keys: I,
    ) -> Option<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let entry = self.lookup(class_name)?;
        entry.method_index(request_signature(method_name, argument_keys))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Class names in registration order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &HandlerEntry> {
        self.order.iter().filter_map(|name| self.handlers.get(name))
    }

    /// `Class.method(request, response, ...)` for every dispatchable operation.
    #[must_use]
    pub fn endpoints(&self) -> Vec<String> {
        self.entries()
            .flat_map(|entry| {
                entry
                    .endpoints()
                    .map(move |d| format!("{}.{}", entry.class_name(), d.signature()))
            })
            .collect()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("classes", &self.order)
            .finish()
    }
}

/// Assembles a [`HandlerRegistry`] from the static handler set and plugin modules.
pub struct RegistryBuilder {
    locations: PluginLocations,
    plugin_id: Option<String>,
    loader: Option<Box<dyn ModuleLoader>>,
    include_static: bool,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            locations: PluginLocations::new(),
            plugin_id: None,
            loader: None,
            include_static: true,
        }
    }
}

impl RegistryBuilder {
    #[must_use]
    pub fn locations(mut self, locations: PluginLocations) -> Self {
        self.locations = locations;
        self
    }

    /// Only load modules whose declared identity equals `plugin_id`. Empty means no filter.
    #[must_use]
    pub fn plugin_id(mut self, plugin_id: Option<String>) -> Self {
        self.plugin_id = plugin_id.filter(|id| !id.is_empty());
        self
    }

    #[must_use]
    pub fn loader(mut self, loader: impl ModuleLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    #[must_use]
    pub fn boxed_loader(mut self, loader: Option<Box<dyn ModuleLoader>>) -> Self {
        self.loader = loader;
        self
    }

    #[must_use]
    pub fn include_static(mut self, include: bool) -> Self {
        self.include_static = include;
        self
    }

    /// Register static handlers, then every loadable module under the locations.
    #[must_use]
    pub fn discover(self) -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();

        if self.include_static {
            for entry in inventory::iter::<StaticHandler> {
                registry.register((entry.factory)());
            }
        }

        let modules = scan_modules(&self.locations);
        let Some(loader) = self.loader.as_deref() else {
            if !modules.is_empty() {
                warn!(
                    modules = modules.len(),
                    "Plugin modules found but no module loader configured"
                );
            }
            return registry;
        };

        for module in modules {
            if let Some(wanted) = &self.plugin_id {
                let identity = loader.identity(&module);
                if identity.as_deref() != Some(wanted.as_str()) {
                    debug!(
                        module = %module.display(),
                        identity = ?identity,
                        plugin_id = %wanted,
                        "Skipping module with non-matching identity"
                    );
                    continue;
                }
            }

            match loader.load(&module) {
                Ok(handlers) if handlers.is_empty() => {
                    warn!(
                        module = %module.display(),
                        "Module yielded no handlers, skipping"
                    );
                }
                Ok(handlers) => {
                    for handler in handlers {
                        registry.register(handler);
                    }
                }
                Err(err) => {
                    warn!(
                        module = %module.display(),
                        error = %err,
                        "Couldn't load the dynamic library, skipping"
                    );
                }
            }
        }

        info!(
            handlers = registry.len(),
            locations = self.locations.len(),
            "Handler discovery complete"
        );
        registry
    }
}
