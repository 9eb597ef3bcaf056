//! # Dispatcher Module
//!
//! Argument coercion and invocation: the last step of a dispatch.
//!
//! ## Overview
//!
//! Once the [router](crate::router) has picked a handler entry and a method index,
//! the dispatcher:
//! - looks up every declared parameter (after `request`/`response`) by name in the
//!   path's argument map, treating a missing key as an empty string
//! - converts each string into the parameter's [`ParamType`](crate::handler::ParamType)
//! - calls the operation synchronously on the current thread with the request,
//!   the response and the converted [`Arguments`](crate::handler::Arguments)
//!
//! ## Coercion failures
//!
//! What happens when a value does not convert is governed by [`CoercionPolicy`]:
//!
//! - **Lenient** (default): the failure is logged at `warn` and the parameter gets its
//!   type's default (`0`, `false`, `""` ...). The operation still runs, so handlers must
//!   not assume every argument arrived intact.
//! - **Strict**: the request is rejected and the operation is not called.
//!
//! ## Panics
//!
//! A panicking operation is caught, logged at `error`, and turned into a 500 JSON
//! response. The dispatch still counts as handled because the operation was invoked.

mod coerce;
mod core;

pub use coerce::{coerce, CoercionPolicy};
pub use core::{Dispatcher, HandlerRequest, HandlerResponse, HeaderVec, MAX_INLINE_HEADERS};
