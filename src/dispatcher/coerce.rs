use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoercionError;
use crate::handler::{ArgValue, ParamType};

/// What to do with an argument that does not convert to its declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionPolicy {
    /// Log, pass the type's default value, and invoke anyway.
    #[default]
    Lenient,
    /// Reject the request; the operation is not invoked.
    Strict,
}

impl CoercionPolicy {
    /// Unknown values fall back to `Lenient`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "strict" => CoercionPolicy::Strict,
            _ => CoercionPolicy::Lenient,
        }
    }
}

/// Convert a raw path value into `ty`.
///
/// Empty input only converts to `String`. Booleans accept
/// `true/false`, `1/0`, `yes/no` and `on/off`, case-insensitively.
pub fn coerce(parameter: &str, raw: &str, ty: ParamType) -> Result<ArgValue, CoercionError> {
    let fail = || CoercionError {
        parameter: parameter.to_string(),
        value: raw.to_string(),
        expected: ty,
    };

    match ty {
        ParamType::String => Ok(ArgValue::String(raw.to_string())),
        ParamType::Int => parse_trimmed::<i64>(raw).map(ArgValue::Int).ok_or_else(fail),
        ParamType::UInt => parse_trimmed::<u64>(raw).map(ArgValue::UInt).ok_or_else(fail),
        ParamType::Float => parse_trimmed::<f64>(raw)
            .filter(|v| v.is_finite())
            .map(ArgValue::Float)
            .ok_or_else(fail),
        ParamType::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(ArgValue::Bool(true)),
            "false" | "0" | "no" | "off" => Ok(ArgValue::Bool(false)),
            _ => Err(fail()),
        },
        ParamType::Char => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(ArgValue::Char(c)),
                _ => Err(fail()),
            }
        }
        // The fixed slots are filled by the dispatcher, never from the path.
        ParamType::Request | ParamType::Response => Err(fail()),
    }
}

fn parse_trimmed<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}
