//! # Registry Module
//!
//! Discovers handlers and indexes their dispatchable operations.
//!
//! ## Discovery
//!
//! [`RegistryBuilder::discover`] registers handlers from two sources, in order:
//!
//! 1. handlers statically linked into the binary (see
//!    [`register_static_handler!`](crate::register_static_handler))
//! 2. dynamic modules found under the configured
//!    [`PluginLocations`](crate::plugin::PluginLocations), turned into handlers by a
//!    [`ModuleLoader`](crate::plugin::ModuleLoader) and optionally filtered by identity
//!
//! A module that fails to load is logged and skipped; discovery never aborts.
//!
//! ## Registration
//!
//! [`HandlerRegistry::register`] scans a handler's method table. Every public operation
//! whose first two parameters are `request` and `response` is indexed under its
//! [signature hash](signature_hash). If at least one operation qualifies, the handler's
//! `init` hook runs once. A class name that is already registered is ignored.
//!
//! ## Method selection
//!
//! [`HandlerRegistry::select_method`] recomputes the hash from the requested method
//! name and the argument *names* the path supplied. Overloads that share a name are
//! told apart purely by those names; an unexpected extra argument is a miss, never a
//! partial match.

mod core;
mod signature;

pub use core::{HandlerEntry, HandlerRegistry, RegistryBuilder};
pub use signature::{request_signature, signature_hash, SignatureHash};
