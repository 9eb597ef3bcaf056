//! Router core module - path decomposition and handler lookup.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dispatcher::{CoercionPolicy, Dispatcher, HandlerRequest, HandlerResponse};
use crate::error::RouteRejection;
use crate::handler::MAX_ARGUMENT_PAIRS;
use crate::plugin::ModuleLoader;
use crate::registry::{HandlerEntry, HandlerRegistry};
use crate::runtime_config::RouterConfig;

/// Class and method, the minimum a path must name.
pub const MIN_PATH_SEGMENTS: usize = 2;
/// Upper bound on segments after class and method.
pub const MAX_ARGUMENT_SEGMENTS: usize = MAX_ARGUMENT_PAIRS * 2;

/// A decomposed request path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// The router's context; empty when none is configured
    pub context: String,
    pub class_name: String,
    pub method_name: String,
    pub arguments: HashMap<String, String>,
}

impl RequestContext {
    /// Argument keys, for signature lookup.
    pub fn argument_keys(&self) -> impl Iterator<Item = &str> {
        self.arguments.keys().map(String::as_str)
    }
}

/// A path that names a registered operation.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub request: RequestContext,
    pub entry: &'a HandlerEntry,
    pub method_index: usize,
}

/// Split on `/`, dropping empty segments, query string and fragment.
///
/// Segments are percent-decoded; one that does not decode to UTF-8 is kept as is.
#[must_use]
pub fn split_path(path: &str) -> Vec<String> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| segment.to_string())
        })
        .collect()
}

/// Routes paths to the operations of one handler registry.
///
/// The registry is owned and never mutated after construction, so a router can be
/// shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct Router {
    registry: HandlerRegistry,
    dispatcher: Dispatcher,
    context: String,
}

impl Router {
    /// A router over `registry`; an empty `context` accepts paths without a prefix.
    #[must_use]
    pub fn new(registry: HandlerRegistry, context: impl Into<String>) -> Self {
        let router = Self {
            registry,
            dispatcher: Dispatcher::default(),
            context: context.into(),
        };
        info!(
            context = %router.context,
            handlers = router.registry.len(),
            classes = ?router.registry.class_names().collect::<Vec<_>>(),
            "Router ready"
        );
        router
    }

    /// Discover handlers as `config` describes and build a router over them.
    #[must_use]
    pub fn from_config(config: &RouterConfig, loader: Option<Box<dyn ModuleLoader>>) -> Self {
        let registry = config.registry_builder(loader).discover();
        Self::new(registry, config.context.clone()).with_policy(config.coercion)
    }

    #[must_use]
    pub fn with_policy(mut self, policy: CoercionPolicy) -> Self {
        self.dispatcher = Dispatcher::new(policy);
        self
    }

    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Decompose `path` without consulting the registry.
    pub fn parse(&self, path: &str) -> Result<RequestContext, RouteRejection> {
        let segments = split_path(path);
        let use_context = !self.context.is_empty();
        let minimum = MIN_PATH_SEGMENTS + usize::from(use_context);
        let maximum = minimum + MAX_ARGUMENT_SEGMENTS;

        if segments.len() < minimum {
            return Err(RouteRejection::Incomplete {
                found: segments.len(),
                minimum,
            });
        }
        if segments.len() > maximum {
            return Err(RouteRejection::Excessive {
                found: segments.len(),
                maximum,
            });
        }

        let mut rest = segments.into_iter();
        if use_context {
            let found = rest.next().unwrap_or_default();
            if found != self.context {
                return Err(RouteRejection::ContextMismatch {
                    expected: self.context.clone(),
                    found,
                });
            }
        }
        let class_name = rest.next().unwrap_or_default();
        let method_name = rest.next().unwrap_or_default();

        let remaining: Vec<String> = rest.collect();
        if remaining.len() % 2 != 0 {
            return Err(RouteRejection::OddArguments {
                count: remaining.len(),
            });
        }

        let mut arguments = HashMap::with_capacity(remaining.len() / 2);
        let mut pairs = remaining.into_iter();
        while let (Some(key), Some(value)) = (pairs.next(), pairs.next()) {
            arguments.insert(key, value);
        }

        Ok(RequestContext {
            context: self.context.clone(),
            class_name,
            method_name,
            arguments,
        })
    }

    /// Decompose `path` and find the operation it names.
    pub fn resolve(&self, path: &str) -> Result<Resolved<'_>, RouteRejection> {
        let request = self.parse(path)?;

        let entry = self
            .registry
            .lookup(&request.class_name)
            .ok_or_else(|| RouteRejection::UnknownClass(request.class_name.clone()))?;

        if !entry.has_method_name(&request.method_name) {
            return Err(RouteRejection::UnknownMethod {
                class: request.class_name.clone(),
                method: request.method_name.clone(),
            });
        }

        let method_index = self
            .registry
            .select_method(
                &request.class_name,
                &request.method_name,
                request.argument_keys(),
            )
            .ok_or_else(|| {
                let mut arguments: Vec<String> = request.arguments.keys().cloned().collect();
                arguments.sort();
                RouteRejection::NoMatchingSignature {
                    class: request.class_name.clone(),
                    method: request.method_name.clone(),
                    arguments,
                }
            })?;

        Ok(Resolved {
            request,
            entry,
            method_index,
        })
    }

    /// Route `request` and, on a match, invoke the operation with `response`.
    ///
    /// Returns `true` iff an operation was invoked.
    pub fn dispatch(&self, request: &mut HandlerRequest, response: &mut HandlerResponse) -> bool {
        debug!(
            request_id = %request.request_id,
            method = %request.method,
            path = %request.path,
            "Route attempt"
        );

        let resolved = match self.resolve(&request.path) {
            Ok(resolved) => resolved,
            Err(rejection) => {
                if let RouteRejection::ContextMismatch { .. } = rejection {
                    debug!(request_id = %request.request_id, reason = %rejection, "Not for this context");
                } else if rejection.is_malformed() {
                    warn!(
                        request_id = %request.request_id,
                        path = %request.path,
                        reason = %rejection,
                        "Request dispatched to router but path is malformed"
                    );
                } else {
                    warn!(
                        request_id = %request.request_id,
                        path = %request.path,
                        reason = %rejection,
                        "No handler matched"
                    );
                }
                return false;
            }
        };

        request.set_context(&self.context);
        self.dispatcher.invoke(
            resolved.entry,
            resolved.method_index,
            request,
            response,
            &resolved.request.arguments,
        )
    }

    /// Dispatch a bare `GET` for `path`, discarding the response.
    pub fn route(&self, path: &str) -> bool {
        let mut request = HandlerRequest::get(path);
        let mut response = HandlerResponse::default();
        self.dispatch(&mut request, &mut response)
    }
}
