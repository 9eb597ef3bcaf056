//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::env::consts::DLL_EXTENSION;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use classrouter::handler::{ArgValue, ClassHandler, MethodBuilder, MethodDescriptor, ParamType};
use classrouter::plugin::{manifest_path, PLUGINS_SUBDIR};
use classrouter::PluginError;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

/// One recorded operation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub operation: &'static str,
    pub context: String,
    pub arguments: Vec<(String, ArgValue)>,
}

type CallLog = Arc<Mutex<Vec<Call>>>;

/// A handler that records every call it receives.
pub struct Widgets {
    name: String,
    inits: AtomicUsize,
    calls: CallLog,
}

impl Widgets {
    pub fn new() -> Arc<Self> {
        Self::named("Widgets")
    }

    pub fn named(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            inits: AtomicUsize::new(0),
            calls: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn last_call(&self) -> Option<Call> {
        self.calls.lock().last().cloned()
    }
}

/// Finish `builder` with an operation that records the call under `operation`
/// and echoes its arguments into the response body.
fn recorded(builder: MethodBuilder, operation: &'static str, calls: &CallLog) -> MethodDescriptor {
    let calls = Arc::clone(calls);
    builder.call(move |req, resp, args| {
        let mut body = Map::new();
        for (name, value) in args.iter() {
            body.insert(name.to_string(), json!(value));
        }
        resp.body = json!({ "operation": operation, "arguments": Value::Object(body) });

        calls.lock().push(Call {
            operation,
            context: req.context.clone(),
            arguments: args
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        });
    })
}

impl ClassHandler for Widgets {
    fn class_name(&self) -> &str {
        &self.name
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        let calls = &self.calls;
        vec![
            recorded(MethodDescriptor::endpoint("list"), "list", calls),
            recorded(
                MethodDescriptor::endpoint("get").param("id", ParamType::Int),
                "get",
                calls,
            ),
            recorded(
                MethodDescriptor::endpoint("get")
                    .param("id", ParamType::Int)
                    .param("verbose", ParamType::Bool),
                "get_verbose",
                calls,
            ),
            recorded(
                MethodDescriptor::endpoint("tag")
                    .param("label", ParamType::String)
                    .param("weight", ParamType::Float)
                    .param("grade", ParamType::Char)
                    .param("count", ParamType::UInt),
                "tag",
                calls,
            ),
            recorded(MethodDescriptor::endpoint("purge").private(), "purge", calls),
            MethodDescriptor::endpoint("explode").call(|_, _, _| panic!("widget exploded")),
        ]
    }

    fn init(&self) {
        self.inits.fetch_add(1, Ordering::SeqCst);
    }
}

/// Write an empty module file under `<location>/plugins`, plus a manifest when `iid` is set.
pub fn write_module(location: &Path, stem: &str, iid: Option<&str>) -> PathBuf {
    let dir = location.join(PLUGINS_SUBDIR);
    fs::create_dir_all(&dir).unwrap();
    let module = dir.join(format!("{stem}.{DLL_EXTENSION}"));
    fs::write(&module, b"").unwrap();
    if let Some(iid) = iid {
        fs::write(manifest_path(&module), json!({ "IID": iid }).to_string()).unwrap();
    }
    module
}

/// Test loader keyed on the module's file stem.
///
/// `broken*` fails, `empty*` yields nothing, anything else yields one recording
/// handler whose class name is the stem with its first letter capitalized.
pub fn stem_loader(module: &Path) -> Result<Vec<Arc<dyn ClassHandler>>, PluginError> {
    let stem = module
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    if stem.starts_with("broken") {
        return Err(PluginError::load(module, "not a valid module"));
    }
    if stem.starts_with("empty") {
        return Ok(Vec::new());
    }
    let mut class = stem.to_string();
    if let Some(first) = class.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    let handler: Arc<dyn ClassHandler> = Widgets::named(&class);
    Ok(vec![handler])
}
