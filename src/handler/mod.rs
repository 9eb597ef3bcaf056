//! # Handler Module
//!
//! The contract a pluggable unit satisfies to receive requests.
//!
//! ## Overview
//!
//! A handler is a named class (`Widgets`, `echo`, ...) that publishes a table of
//! [`MethodDescriptor`]s. Each descriptor names one operation, lists its parameters
//! in declaration order and carries the closure that runs it. Nothing is discovered
//! by reflection: the table *is* the interface.
//!
//! An operation is **dispatchable** when it is [`Visibility::Public`] and its first
//! two parameters are named `request` and `response`. Only dispatchable operations
//! are reachable from a path; everything else in the table is ignored by the registry.
//!
//! ```rust
//! use std::sync::Arc;
//! use classrouter::handler::{ClassHandler, MethodDescriptor, ParamType};
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
//!             .param("id", ParamType::Int)
//!             .call(|_req, resp, args| {
//!                 let id = args.get_i64("id").unwrap_or_default();
//!                 resp.body = serde_json::json!({ "id": id });
//!             })]
//!     }
//! }
//!
//! let handler: Arc<dyn ClassHandler> = Arc::new(Widgets);
//! assert!(handler.methods()[0].is_dispatchable());
//! ```
//!
//! ## Statically linked handlers
//!
//! Handlers compiled into the binary announce themselves with
//! [`register_static_handler!`](crate::register_static_handler); the registry collects
//! them at discovery time before any dynamic module is considered.

mod core;

pub use core::{
    ArgValue, Arguments, ClassHandler, MethodBuilder, MethodDescriptor, MethodFn, ParamSpec,
    ParamType, StaticHandler, Visibility, MAX_ARGUMENT_PAIRS, REQUEST_PARAM, RESPONSE_PARAM,
};
