use std::sync::Arc;

use super::{split_path, Router, MAX_ARGUMENT_SEGMENTS};
use crate::error::RouteRejection;
use crate::handler::{ClassHandler, MethodDescriptor, ParamType};
use crate::registry::HandlerRegistry;

struct Widgets;

impl ClassHandler for Widgets {
    fn class_name(&self) -> &str {
        "Widgets"
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::endpoint("list").call(|_, _, _| {}),
            MethodDescriptor::endpoint("get")
                .param("id", ParamType::Int)
                .call(|_, _, _| {}),
            MethodDescriptor::endpoint("get")
                .param("id", ParamType::Int)
                .param("verbose", ParamType::Bool)
                .call(|_, _, _| {}),
        ]
    }
}

fn router(context: &str) -> Router {
    let mut registry = HandlerRegistry::new();
    registry.register(Arc::new(Widgets));
    Router::new(registry, context)
}

fn pairs(n: usize) -> String {
    (0..n).map(|i| format!("/k{i}/v{i}")).collect()
}

#[test]
fn test_split_path_drops_empty_segments() {
    assert_eq!(split_path("//api///Widgets/get//"), vec!["api", "Widgets", "get"]);
    assert!(split_path("/").is_empty());
    assert!(split_path("").is_empty());
}

#[test]
fn test_split_path_strips_query_and_fragment() {
    assert_eq!(split_path("/a/b?c=d/e"), vec!["a", "b"]);
    assert_eq!(split_path("/a/b#frag/x"), vec!["a", "b"]);
}

#[test]
fn test_split_path_percent_decodes() {
    assert_eq!(split_path("/a/hello%20world"), vec!["a", "hello world"]);
    assert_eq!(split_path("/a/x%2Fy"), vec!["a", "x/y"]);
    // not valid UTF-8 once decoded
    assert_eq!(split_path("/a/%FF"), vec!["a", "%FF"]);
}

#[test]
fn test_parse_with_context() {
    let parsed = router("api").parse("/api/Widgets/get/id/42").unwrap();
    assert_eq!(parsed.context, "api");
    assert_eq!(parsed.class_name, "Widgets");
    assert_eq!(parsed.method_name, "get");
    assert_eq!(parsed.arguments.len(), 1);
    assert_eq!(parsed.arguments["id"], "42");
}

#[test]
fn test_parse_without_context() {
    let parsed = router("").parse("/Widgets/list").unwrap();
    assert_eq!(parsed.context, "");
    assert_eq!(parsed.class_name, "Widgets");
    assert_eq!(parsed.method_name, "list");
    assert!(parsed.arguments.is_empty());
}

#[test]
fn test_parse_incomplete() {
    assert_eq!(
        router("api").parse("/api/Widgets"),
        Err(RouteRejection::Incomplete {
            found: 2,
            minimum: 3
        })
    );
    assert_eq!(
        router("").parse("/"),
        Err(RouteRejection::Incomplete {
            found: 0,
            minimum: 2
        })
    );
}

#[test]
fn test_length_is_checked_before_context() {
    let err = router("api").parse("/other/Widgets").unwrap_err();
    assert!(matches!(err, RouteRejection::Incomplete { .. }));
}

#[test]
fn test_parse_context_mismatch() {
    assert_eq!(
        router("api").parse("/other/Widgets/get"),
        Err(RouteRejection::ContextMismatch {
            expected: "api".to_string(),
            found: "other".to_string(),
        })
    );
}

#[test]
fn test_parse_argument_limit() {
    let router = router("api");
    let max_pairs = MAX_ARGUMENT_SEGMENTS / 2;

    let at_limit = format!("/api/Widgets/get{}", pairs(max_pairs));
    assert_eq!(router.parse(&at_limit).unwrap().arguments.len(), max_pairs);

    let over_limit = format!("/api/Widgets/get{}", pairs(max_pairs + 1));
    assert_eq!(
        router.parse(&over_limit),
        Err(RouteRejection::Excessive {
            found: 3 + MAX_ARGUMENT_SEGMENTS + 2,
            maximum: 3 + MAX_ARGUMENT_SEGMENTS,
        })
    );
}

#[test]
fn test_one_segment_over_the_limit_is_excessive() {
    // 17 trailing segments: over the limit by one and unpaired
    let trailing = format!("{}/k8", pairs(8));

    let bare = router("");
    let path = format!("/Widgets/get{trailing}");
    assert_eq!(
        bare.parse(&path),
        Err(RouteRejection::Excessive {
            found: 19,
            maximum: 18,
        })
    );
    assert!(!bare.route(&path));

    let with_context = router("api");
    let path = format!("/api/Widgets/get{trailing}");
    assert_eq!(
        with_context.parse(&path),
        Err(RouteRejection::Excessive {
            found: 20,
            maximum: 19,
        })
    );
    assert!(!with_context.route(&path));
}

#[test]
fn test_parse_odd_arguments() {
    assert_eq!(
        router("api").parse("/api/Widgets/get/id/1/verbose"),
        Err(RouteRejection::OddArguments { count: 3 })
    );
    // Without a context the first segment is the class.
    assert_eq!(
        router("").parse("/api/Widgets/get"),
        Err(RouteRejection::OddArguments { count: 1 })
    );
}

#[test]
fn test_parse_repeated_key_keeps_last_value() {
    let parsed = router("").parse("/Widgets/get/id/1/id/2").unwrap();
    assert_eq!(parsed.arguments.len(), 1);
    assert_eq!(parsed.arguments["id"], "2");
}

#[test]
fn test_resolve_selects_overload_by_argument_names() {
    let router = router("");

    let short = router.resolve("/Widgets/get/id/1").unwrap();
    let long = router.resolve("/Widgets/get/verbose/true/id/1").unwrap();
    assert_ne!(short.method_index, long.method_index);

    let descriptor = long.entry.descriptor(long.method_index).unwrap();
    assert_eq!(descriptor.signature(), "get(request, response, id, verbose)");
}

#[test]
fn test_resolve_misses() {
    let router = router("");

    assert_eq!(
        router.resolve("/Gadgets/get").unwrap_err(),
        RouteRejection::UnknownClass("Gadgets".to_string())
    );
    assert_eq!(
        router.resolve("/Widgets/delete/id/1").unwrap_err(),
        RouteRejection::UnknownMethod {
            class: "Widgets".to_string(),
            method: "delete".to_string(),
        }
    );
    assert_eq!(
        router.resolve("/Widgets/get/name/x/id/1").unwrap_err(),
        RouteRejection::NoMatchingSignature {
            class: "Widgets".to_string(),
            method: "get".to_string(),
            arguments: vec!["id".to_string(), "name".to_string()],
        }
    );
    // no overload of `get` takes zero arguments
    assert!(router.resolve("/Widgets/get").is_err());
}

#[test]
fn test_resolve_ignores_argument_values() {
    let router = router("");

    // Argument values never take part in selection; names do.
    let numeric = router.resolve("/Widgets/get/id/1").unwrap();
    let textual = router.resolve("/Widgets/get/id/abc").unwrap();
    assert_eq!(numeric.method_index, textual.method_index);
}

#[test]
fn test_route_reports_handled() {
    let router = router("api");
    assert!(router.route("/api/Widgets/list"));
    assert!(!router.route("/api/Widgets/list/extra"));
    assert!(!router.route("/web/Widgets/list"));
}
