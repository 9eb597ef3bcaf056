//! # Router Module
//!
//! Maps a request path onto a handler operation by convention.
//!
//! ## Path shape
//!
//! ```text
//! [/context]/Class/method[/key/value]...
//! ```
//!
//! The path is split on `/` with empty segments dropped; anything after `?` or `#`
//! is ignored and segments are percent-decoded. If the router has a context, the
//! first segment must equal it. The next two segments name the class and method, and
//! the rest are consumed pairwise as `key/value` arguments (a repeated key keeps its
//! last value).
//!
//! ## Limits
//!
//! - fewer than class + method (+ context) segments: incomplete
//! - more than eight argument pairs: excessive
//! - an odd number of argument segments: malformed, never truncated or padded
//!
//! ## Outcome
//!
//! [`Router::dispatch`] returns `true` only when an operation was invoked. Every miss
//! (bad shape, wrong context, unknown class, unknown method, no overload taking exactly
//! the supplied argument names) is reported as `false` so the caller can fall through to
//! another handler chain or answer 404. [`Router::resolve`] exposes the typed reason.
//!
//! ## Example
//!
//! ```rust
//! use classrouter::dispatcher::{HandlerRequest, HandlerResponse};
//! use classrouter::handler::{ClassHandler, MethodDescriptor, ParamType};
//! use classrouter::registry::HandlerRegistry;
//! use classrouter::router::Router;
//! use std::sync::Arc;
//!
//! struct Widgets;
//!
//! impl ClassHandler for Widgets {
//!     fn class_name(&self) -> &str {
//!         "Widgets"
//!     }
//!
//!     fn methods(&self) -> Vec<MethodDescriptor> {
//!         vec![MethodDescriptor::endpoint("get")
//!             .param("id", ParamType::String)
//!             .call(|_req, resp, args| {
//!                 resp.body = serde_json::json!({ "id": args.get_str("id") });
//!             })]
//!     }
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register(Arc::new(Widgets));
//! let router = Router::new(registry, "api");
//!
//! let mut request = HandlerRequest::get("/api/Widgets/get/id/42");
//! let mut response = HandlerResponse::default();
//! assert!(router.dispatch(&mut request, &mut response));
//! assert_eq!(response.body["id"], "42");
//! assert_eq!(request.context, "api");
//! ```

mod core;
#[cfg(test)]
mod tests;

pub use core::{
    split_path, RequestContext, Resolved, Router, MAX_ARGUMENT_SEGMENTS, MIN_PATH_SEGMENTS,
};
