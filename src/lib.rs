//! # classrouter
//!
//! **classrouter** routes request paths to operations on pluggable handler classes by
//! convention: no route table, no annotations, just names.
//!
//! ## Overview
//!
//! A path such as `/api/Widgets/get/id/42` names a class (`Widgets`), a method (`get`)
//! and a set of named arguments (`id = "42"`). The router looks the class up in a
//! [`HandlerRegistry`](registry::HandlerRegistry), picks the overload of `get` whose
//! parameter *names* are exactly the ones supplied, converts each string argument to
//! the declared parameter type and calls the operation with the request and response.
//!
//! ## Architecture
//!
//! - **[`handler`]** - The [`ClassHandler`](handler::ClassHandler) contract and method descriptors
//! - **[`registry`]** - Handler discovery, registration and signature hashing
//! - **[`plugin`]** - Search locations for dynamic modules and the loader seam
//! - **[`router`]** - Path decomposition and handler/method selection
//! - **[`dispatcher`]** - Argument coercion and invocation
//! - **[`runtime_config`]** - YAML/env configuration
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`echo`]** - A built-in `echo` handler for smoke tests, registered on demand
//! - **[`cli`]** - The `classrouter` command line
//!
//! ### Request Handling Flow
//!
//! ```text
//! HandlerRequest ──► Router::dispatch
//!                     ├─ split_path / context check / pair arguments
//!                     ├─ HandlerRegistry::lookup(class)
//!                     ├─ HandlerRegistry::select_method(method, argument names)
//!                     └─ Dispatcher::invoke ── coerce arguments ──► operation(request, response, args)
//! ```
//!
//! `dispatch` returns `true` only if an operation ran, so the router can sit in a
//! chain of handlers and let misses fall through.
//!
//! ## Quick Start
//!
//! ```rust
//! use classrouter::dispatcher::{HandlerRequest, HandlerResponse};
//! use classrouter::handler::{ClassHandler, MethodDescriptor, ParamType};
//! use classrouter::registry::HandlerRegistry;
//! use classrouter::router::Router;
//! use std::sync::Arc;
//!
//! struct Greeter;
//!
//! impl ClassHandler for Greeter {
//!     fn class_name(&self) -> &str {
//!         "Greeter"
//!     }
//!
//!     fn methods(&self) -> Vec<MethodDescriptor> {
//!         vec![MethodDescriptor::endpoint("hello")
//!             .param("name", ParamType::String)
//!             .call(|_req, resp, args| {
//!                 let name = args.get_str("name").unwrap_or_default();
//!                 resp.body = serde_json::json!(format!("hello {name}"));
//!             })]
//!     }
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register(Arc::new(Greeter));
//! let router = Router::new(registry, "");
//!
//! let mut request = HandlerRequest::get("/Greeter/hello/name/world");
//! let mut response = HandlerResponse::default();
//! assert!(router.dispatch(&mut request, &mut response));
//! assert_eq!(response.body, "hello world");
//! ```
//!
//! ## Threading
//!
//! Registries are built once and then only read; a [`Router`](router::Router) can be
//! shared across threads behind an `Arc`. Operations run synchronously on the calling
//! thread and must be `Send + Sync` themselves.

pub mod cli;
pub mod dispatcher;
pub mod echo;
pub mod error;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod plugin;
pub mod registry;
pub mod router;
pub mod runtime_config;

pub use dispatcher::{CoercionPolicy, Dispatcher, HandlerRequest, HandlerResponse};
pub use echo::ECHO_CLASS;
pub use error::{CoercionError, PluginError, RouteRejection};
pub use handler::{ClassHandler, MethodDescriptor, ParamType};
pub use registry::HandlerRegistry;
pub use router::Router;
pub use runtime_config::RouterConfig;

#[doc(hidden)]
pub use inventory;
