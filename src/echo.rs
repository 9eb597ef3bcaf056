//! Built-in `echo` handler.
//!
//! Handy for checking a deployment end to end: `/echo/ping` answers without
//! arguments, `/echo/echo/message/hi` reflects its argument back.
//!
//! The handler is not part of the static set. Callers that want it register
//! [`handler`] themselves, usually after discovery so a user class named `echo`
//! keeps its name. The `classrouter` binary does exactly that.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::dispatcher::HandlerResponse;
use crate::handler::{ClassHandler, MethodDescriptor, ParamType};

/// Class name the echo handler registers under.
pub const ECHO_CLASS: &str = "echo";

/// Upper bound on `times` for the repeating overload.
pub const MAX_ECHO_REPEAT: u64 = 100;

#[derive(Debug, Default)]
struct Echo;

impl ClassHandler for Echo {
    fn class_name(&self) -> &str {
        ECHO_CLASS
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::endpoint("ping").call(|req, resp, _args| {
                resp.body = json!({
                    "pong": true,
                    "request_id": req.request_id.to_string(),
                });
            }),
            MethodDescriptor::endpoint("echo")
                .param("message", ParamType::String)
                .call(|req, resp, args| {
                    resp.body = json!({
                        "message": args.get_str("message").unwrap_or_default(),
                        "method": req.method.to_string(),
                        "path": req.path,
                        "context": req.context,
                    });
                }),
            // Overload told apart by the extra `times` argument.
            MethodDescriptor::endpoint("echo")
                .param("message", ParamType::String)
                .param("times", ParamType::UInt)
                .call(|_req, resp, args| {
                    let message = args.get_str("message").unwrap_or_default();
                    let times = args.get_u64("times").unwrap_or_default();
                    if times > MAX_ECHO_REPEAT {
                        warn!(times, maximum = MAX_ECHO_REPEAT, "Echo repeat count too large");
                        *resp = HandlerResponse::error(
                            400,
                            &format!("times must be at most {MAX_ECHO_REPEAT}, got {times}"),
                        );
                        return;
                    }
                    let repeated: Vec<&str> = (0..times).map(|_| message).collect();
                    resp.body = json!({ "message": repeated });
                }),
        ]
    }

    fn init(&self) {
        debug!(class = ECHO_CLASS, "Echo handler initialized");
    }
}

/// A fresh echo handler, ready for [`HandlerRegistry::register`](crate::registry::HandlerRegistry::register).
pub fn handler() -> Arc<dyn ClassHandler> {
    Arc::new(Echo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::HandlerRequest;
    use crate::registry::HandlerRegistry;
    use crate::router::Router;

    fn router() -> Router {
        let mut registry = HandlerRegistry::new();
        assert!(registry.register(handler()));
        Router::new(registry, "")
    }

    #[test]
    fn test_echo_methods() {
        let mut registry = HandlerRegistry::new();
        registry.register(handler());
        let entry = registry.lookup(ECHO_CLASS).unwrap();
        assert_eq!(entry.method_names(), &["ping", "echo", "echo"]);
    }

    #[test]
    fn test_echo_is_not_in_the_static_set() {
        let registry = HandlerRegistry::builder().discover();
        assert!(registry.lookup(ECHO_CLASS).is_none());
    }

    #[test]
    fn test_ping() {
        let mut request = HandlerRequest::get("/echo/ping");
        let mut response = HandlerResponse::default();
        assert!(router().dispatch(&mut request, &mut response));
        assert_eq!(response.body["pong"], true);
        assert_eq!(response.body["request_id"], request.request_id.to_string());
    }

    #[test]
    fn test_echo_overloads() {
        let router = router();

        let mut response = HandlerResponse::default();
        assert!(router.dispatch(&mut HandlerRequest::get("/echo/echo/message/hi"), &mut response));
        assert_eq!(response.body["message"], "hi");

        let mut response = HandlerResponse::default();
        assert!(router.dispatch(
            &mut HandlerRequest::get("/echo/echo/times/2/message/hi"),
            &mut response
        ));
        assert_eq!(response.body["message"], json!(["hi", "hi"]));
    }

    #[test]
    fn test_echo_repeat_is_capped() {
        let router = router();

        let mut response = HandlerResponse::default();
        assert!(router.dispatch(
            &mut HandlerRequest::get("/echo/echo/message/hi/times/1000000000000"),
            &mut response
        ));
        assert_eq!(response.status, 400);
        assert!(response.body["error"]
            .as_str()
            .unwrap()
            .contains("at most 100"));

        let mut response = HandlerResponse::default();
        let path = format!("/echo/echo/message/hi/times/{MAX_ECHO_REPEAT}");
        assert!(router.dispatch(&mut HandlerRequest::get(&path), &mut response));
        assert_eq!(response.status, 200);
        assert_eq!(response.body["message"].as_array().unwrap().len(), 100);
    }
}
