//! Dispatcher core module - the invocation step of the request path.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, error, info, warn};

use super::coerce::{coerce, CoercionPolicy};
use crate::error::CoercionError;
use crate::handler::{Arguments, MethodDescriptor};
use crate::ids::RequestId;
use crate::registry::HandlerEntry;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage.
///
/// Header names are `Arc<str>` since the same few names repeat across requests.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// The inbound half of a request/response pair.
///
/// Produced by the transport; the router only reads [`path`](Self::path) and sets
/// [`context`](Self::context) before handing the request to an operation.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    pub method: Method,
    /// Raw request path, possibly with a query string
    pub path: String,
    /// Context of the router that accepted this request; empty when none is configured
    pub context: String,
    pub headers: HeaderVec,
}

impl HandlerRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            context: String::new(),
            headers: HeaderVec::new(),
        }
    }

    /// Shorthand for a `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_context(&mut self, context: &str) {
        context.clone_into(&mut self.context);
    }
}

/// The outbound half of a request/response pair; operations write into it.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Value::Null,
        }
    }
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with default headers
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Coerces path arguments and calls the selected operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher {
    policy: CoercionPolicy,
}

impl Dispatcher {
    #[must_use]
    pub fn new(policy: CoercionPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> CoercionPolicy {
        self.policy
    }

    /// Build the typed argument list for `descriptor` from the path's argument map.
    ///
    /// Missing keys are read as `""`. Under [`CoercionPolicy::Lenient`] this never
    /// fails; under [`CoercionPolicy::Strict`] the first failed conversion is returned.
    /// A lenient default for a missing key is logged at debug, a value that does
    /// not convert at warn.
    pub fn build_arguments(
        &self,
        descriptor: &MethodDescriptor,
        arguments: &HashMap<String, String>,
    ) -> Result<Arguments, CoercionError> {
        let mut built = Arguments::new();
        for param in descriptor.user_params() {
            let supplied = arguments.get(param.name.as_ref());
            let raw = supplied.map(String::as_str).unwrap_or_default();

            match coerce(&param.name, raw, param.ty) {
                Ok(value) => {
                    debug!(
                        parameter = %param.name,
                        value = %raw,
                        ty = %param.ty,
                        "Argument converted"
                    );
                    built.push(Arc::clone(&param.name), value);
                }
                Err(err) => match self.policy {
                    CoercionPolicy::Strict => return Err(err),
                    CoercionPolicy::Lenient => {
                        if supplied.is_none() {
                            debug!(
                                parameter = %param.name,
                                ty = %param.ty,
                                "Argument missing, passing default value"
                            );
                        } else {
                            warn!(
                                parameter = %param.name,
                                value = %raw,
                                ty = %param.ty,
                                "Can not convert argument, passing default value"
                            );
                        }
                        if let Some(default) = param.ty.default_value() {
                            built.push(Arc::clone(&param.name), default);
                        }
                    }
                },
            }
        }
        Ok(built)
    }

    /// Invoke operation `method_index` of `entry`.
    ///
    /// Returns `true` iff the operation was called. A strict-mode coercion failure or
    /// an index that does not name a dispatchable operation returns `false`.
    pub fn invoke(
        &self,
        entry: &HandlerEntry,
        method_index: usize,
        request: &mut HandlerRequest,
        response: &mut HandlerResponse,
        arguments: &HashMap<String, String>,
    ) -> bool {
        let Some(descriptor) = entry
            .descriptor(method_index)
            .filter(|d| d.is_dispatchable())
        else {
            warn!(
                class = %entry.class_name(),
                method_index,
                "No dispatchable method at index"
            );
            return false;
        };

        let args = match self.build_arguments(descriptor, arguments) {
            Ok(args) => args,
            Err(err) => {
                warn!(
                    request_id = %request.request_id,
                    class = %entry.class_name(),
                    method = %descriptor.name,
                    error = %err,
                    "Argument coercion failed, request rejected"
                );
                return false;
            }
        };

        let request_id = request.request_id;
        let start = Instant::now();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            (descriptor.call)(request, response, &args);
        }));

        let elapsed_us = whole_micros(start.elapsed());
        match outcome {
            Ok(()) => {
                info!(
                    request_id = %request_id,
                    class = %entry.class_name(),
                    signature = %descriptor.signature(),
                    status = response.status,
                    elapsed_us,
                    "Handler invoked"
                );
            }
            Err(panic) => {
                let panic_message = panic_message(panic.as_ref());
                error!(
                    request_id = %request_id,
                    class = %entry.class_name(),
                    signature = %descriptor.signature(),
                    panic_message = %panic_message,
                    "Handler panicked"
                );
                *response =
                    HandlerResponse::error(500, &format!("Handler panicked: {panic_message}"));
            }
        }
        true
    }
}

/// Microseconds in `elapsed`, saturating at `u64::MAX`.
pub(crate) fn whole_micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
