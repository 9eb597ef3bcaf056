use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Name of the fixed first parameter of every dispatchable operation.
pub const REQUEST_PARAM: &str = "request";
/// Name of the fixed second parameter of every dispatchable operation.
pub const RESPONSE_PARAM: &str = "response";

/// Maximum number of named arguments a path may carry after class and method.
pub const MAX_ARGUMENT_PAIRS: usize = 8;

/// Declared type of an operation parameter.
///
/// `Request` and `Response` only appear in the two fixed leading slots; the
/// remaining variants are the types a path argument can be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Request,
    Response,
    String,
    Int,
    UInt,
    Float,
    Bool,
    Char,
}

impl ParamType {
    /// Value a parameter receives when its argument cannot be converted.
    ///
    /// `None` for the request/response slots, which are never coerced.
    #[must_use]
    pub fn default_value(self) -> Option<ArgValue> {
        match self {
            ParamType::Request | ParamType::Response => None,
            ParamType::String => Some(ArgValue::String(String::new())),
            ParamType::Int => Some(ArgValue::Int(0)),
            ParamType::UInt => Some(ArgValue::UInt(0)),
            ParamType::Float => Some(ArgValue::Float(0.0)),
            ParamType::Bool => Some(ArgValue::Bool(false)),
            ParamType::Char => Some(ArgValue::Char('\0')),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Request => "request",
            ParamType::Response => "response",
            ParamType::String => "string",
            ParamType::Int => "int",
            ParamType::UInt => "uint",
            ParamType::Float => "float",
            ParamType::Bool => "bool",
            ParamType::Char => "char",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Char(char),
}

impl ArgValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ArgValue::UInt(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_char(&self) -> Option<char> {
        match self {
            ArgValue::Char(v) => Some(*v),
            _ => None,
        }
    }
}

/// Named, typed arguments handed to an operation in declaration order.
///
/// Stack-allocated for the common case; at most [`MAX_ARGUMENT_PAIRS`] entries
/// ever come from a path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: SmallVec<[(Arc<str>, ArgValue); MAX_ARGUMENT_PAIRS]>,
}

impl Arguments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: Arc<str>, value: ArgValue) {
        self.values.push((name, value));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ArgValue::as_str)
    }

    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ArgValue::as_i64)
    }

    #[must_use]
    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(ArgValue::as_u64)
    }

    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ArgValue::as_f64)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ArgValue::as_bool)
    }

    #[must_use]
    pub fn get_char(&self, name: &str) -> Option<char> {
        self.get(name).and_then(ArgValue::as_char)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_ref(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Whether an operation may be reached from outside its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: Arc<str>,
    pub ty: ParamType,
}

impl ParamSpec {
    pub fn new(name: &str, ty: ParamType) -> Self {
        Self {
            name: Arc::from(name),
            ty,
        }
    }
}

/// Entry point of an operation.
pub type MethodFn = Arc<dyn Fn(&mut HandlerRequest, &mut HandlerResponse, &Arguments) + Send + Sync>;

/// One addressable operation on a handler.
#[derive(Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub visibility: Visibility,
    /// All parameters in declaration order, including the leading request/response pair.
    pub params: Vec<ParamSpec>,
    pub call: MethodFn,
}

impl MethodDescriptor {
    /// Build a descriptor from a raw parameter list.
    ///
    /// Nothing is prepended: the list must start with `request`/`response` for the
    /// operation to be dispatchable. Prefer [`MethodDescriptor::endpoint`].
    pub fn new<F>(name: impl Into<String>, params: Vec<ParamSpec>, call: F) -> Self
    where
        F: Fn(&mut HandlerRequest, &mut HandlerResponse, &Arguments) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            params,
            call: Arc::new(call),
        }
    }

    /// Start a dispatchable operation; `request` and `response` are already declared.
    pub fn endpoint(name: impl Into<String>) -> MethodBuilder {
        MethodBuilder {
            name: name.into(),
            visibility: Visibility::Public,
            params: vec![
                ParamSpec::new(REQUEST_PARAM, ParamType::Request),
                ParamSpec::new(RESPONSE_PARAM, ParamType::Response),
            ],
        }
    }

    /// Public, and the first two parameters are named `request` and `response`.
    #[must_use]
    pub fn is_dispatchable(&self) -> bool {
        self.visibility == Visibility::Public
            && self.params.len() >= 2
            && self.params[0].name.as_ref() == REQUEST_PARAM
            && self.params[1].name.as_ref() == RESPONSE_PARAM
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_ref())
    }

    /// Parameters filled from the path, i.e. everything after request/response.
    #[must_use]
    pub fn user_params(&self) -> &[ParamSpec] {
        self.params.get(2..).unwrap_or_default()
    }

    /// `get(request, response, id)` style rendering for logs and listings.
    #[must_use]
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.parameter_names().collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Builder returned by [`MethodDescriptor::endpoint`].
#[derive(Debug)]
pub struct MethodBuilder {
    name: String,
    visibility: Visibility,
    params: Vec<ParamSpec>,
}

impl MethodBuilder {
    #[must_use]
    pub fn param(mut self, name: &str, ty: ParamType) -> Self {
        self.params.push(ParamSpec::new(name, ty));
        self
    }

    /// Mark the operation internal; the registry will not expose it.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn call<F>(self, call: F) -> MethodDescriptor
    where
        F: Fn(&mut HandlerRequest, &mut HandlerResponse, &Arguments) + Send + Sync + 'static,
    {
        MethodDescriptor {
            name: self.name,
            visibility: self.visibility,
            params: self.params,
            call: Arc::new(call),
        }
    }
}

/// A pluggable unit of request handling.
///
/// Implementations are shared behind `Arc` and may be called from any thread
/// that owns a router, hence the `Send + Sync` bound.
pub trait ClassHandler: Send + Sync {
    /// Identifier matched against the class segment of a path. Must be stable.
    fn class_name(&self) -> &str;

    /// The operation table. Called once, at registration.
    fn methods(&self) -> Vec<MethodDescriptor>;

    /// Called once, after registration found at least one dispatchable operation.
    fn init(&self) {}
}

/// A handler compiled into the running binary.
///
/// Submitted with [`register_static_handler!`](crate::register_static_handler) and
/// collected by the registry during discovery.
pub struct StaticHandler {
    pub factory: fn() -> Arc<dyn ClassHandler>,
}

impl StaticHandler {
    pub const fn new(factory: fn() -> Arc<dyn ClassHandler>) -> Self {
        Self { factory }
    }
}

inventory::collect!(StaticHandler);

/// Link a handler factory into the static handler set.
///
/// ```rust,ignore
/// fn widgets() -> Arc<dyn ClassHandler> {
///     Arc::new(Widgets::default())
/// }
///
/// classrouter::register_static_handler!(widgets);
/// ```
#[macro_export]
macro_rules! register_static_handler {
    ($factory:path) => {
        $crate::inventory::submit! {
            $crate::handler::StaticHandler::new($factory)
        }
    };
}
