use apiflow_models::NodeId;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};

// Pattern: {node_<id>.<dotted.path>}
// node_       - literal prefix
// ([^.{}\s]+) - the referenced node id
// \.([^{}\s]+) - the dotted path into that node's result
static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{node_([^.{}\s]+)\.([^{}\s]+)\}").expect("Invalid regex"));

/// Anything that can hand out a node's stored result by id.
pub trait ResultSource {
    fn result(&self, id: &str) -> Option<&Value>;
}

impl ResultSource for HashMap<NodeId, Value> {
    fn result(&self, id: &str) -> Option<&Value> {
        self.get(id)
    }
}

impl ResultSource for BTreeMap<NodeId, Value> {
    fn result(&self, id: &str) -> Option<&Value> {
        self.get(id)
    }
}

/// Substitute every `{node_<id>.<path>}` in `template`.
///
/// References to nodes without a result, or paths that do not resolve, are
/// left verbatim. Substitution is single pass: inserted text is never
/// scanned again.
pub fn resolve<R: ResultSource + ?Sized>(template: &str, results: &R) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures| {
            lookup(results, &caps[1], &caps[2])
                .map(render)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Absent templates pass through untouched.
pub fn resolve_optional<R: ResultSource + ?Sized>(
    template: Option<&str>,
    results: &R,
) -> Option<String> {
    template.map(|t| resolve(t, results))
}

/// Node ids referenced by placeholders in `template`, first occurrence order.
pub fn references(template: &str) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = Vec::new();
    for caps in PLACEHOLDER_REGEX.captures_iter(template) {
        let id = &caps[1];
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

fn lookup<'a, R: ResultSource + ?Sized>(results: &'a R, id: &str, path: &str) -> Option<&'a Value> {
    let mut current = results.result(id)?;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Results accumulated during one run, keyed by node id.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    results: HashMap<NodeId, Value>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            results: HashMap::new(),
        }
    }

    pub fn set_result(&mut self, id: &str, value: Value) {
        self.results.insert(id.to_string(), value);
    }

    pub fn results(&self) -> &HashMap<NodeId, Value> {
        &self.results
    }

    pub fn resolve(&self, template: &str) -> String {
        resolve(template, &self.results)
    }

    /// View restricted to the given ids.
    pub fn scoped<'a>(&'a self, visible: &'a HashSet<NodeId>) -> ScopedResults<'a> {
        ScopedResults {
            results: &self.results,
            visible,
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSource for RunContext {
    fn result(&self, id: &str) -> Option<&Value> {
        self.results.get(id)
    }
}

/// Results filtered to a fixed id set, e.g. a node's ancestors.
pub struct ScopedResults<'a> {
    results: &'a HashMap<NodeId, Value>,
    visible: &'a HashSet<NodeId>,
}

impl ResultSource for ScopedResults<'_> {
    fn result(&self, id: &str) -> Option<&Value> {
        if self.visible.contains(id) {
            self.results.get(id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn results(entries: &[(&str, Value)]) -> HashMap<NodeId, Value> {
        entries
            .iter()
            .map(|(id, v)| (id.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_resolve_nested_path() {
        let r = results(&[("1", json!({"user": {"name": "Ann"}}))]);
        assert_eq!(resolve("{node_1.user.name}", &r), "Ann");
    }

    #[test]
    fn test_unknown_node_left_verbatim() {
        let r = results(&[]);
        assert_eq!(resolve("{node_9.x}", &r), "{node_9.x}");
    }

    #[test]
    fn test_missing_key_left_verbatim() {
        let r = results(&[("1", json!({"user": {"name": "Ann"}}))]);
        assert_eq!(resolve("{node_1.user.email}", &r), "{node_1.user.email}");
    }

    #[test]
    fn test_scalar_is_not_traversable() {
        let r = results(&[("1", json!({"count": 3}))]);
        assert_eq!(resolve("{node_1.count.value}", &r), "{node_1.count.value}");
    }

    #[test]
    fn test_embedded_in_url() {
        let r = results(&[("1", json!({"id": 42}))]);
        assert_eq!(
            resolve("https://api.example.com/users/{node_1.id}/posts", &r),
            "https://api.example.com/users/42/posts"
        );
    }

    #[test]
    fn test_multiple_references_mixed_resolution() {
        let r = results(&[("a", json!({"id": "u-1"}))]);
        assert_eq!(
            resolve("{node_a.id}:{node_b.id}:{node_a.id}", &r),
            "u-1:{node_b.id}:u-1"
        );
    }

    #[test]
    fn test_array_index_segments() {
        let r = results(&[("1", json!({"items": [{"id": 10}, {"id": 20}]}))]);
        assert_eq!(resolve("{node_1.items.1.id}", &r), "20");
        assert_eq!(resolve("{node_1.items.5.id}", &r), "{node_1.items.5.id}");
        assert_eq!(resolve("{node_1.items.x}", &r), "{node_1.items.x}");
    }

    #[test]
    fn test_structured_values_render_as_json() {
        let r = results(&[("1", json!({"user": {"name": "Ann", "tags": ["a"]}, "ok": true, "none": null}))]);
        assert_eq!(
            resolve("{node_1.user}", &r),
            r#"{"name":"Ann","tags":["a"]}"#
        );
        assert_eq!(resolve("{node_1.ok}", &r), "true");
        assert_eq!(resolve("{node_1.none}", &r), "null");
    }

    #[test]
    fn test_error_record_is_addressable() {
        let r = results(&[("b", json!({"error": "HTTP 500: oops"}))]);
        assert_eq!(resolve("{node_b.error}", &r), "HTTP 500: oops");
        assert_eq!(resolve("{node_b.data.id}", &r), "{node_b.data.id}");
    }

    #[test]
    fn test_single_pass_substitution() {
        let r = results(&[
            ("1", json!({"text": "{node_2.secret}"})),
            ("2", json!({"secret": "leaked"})),
        ]);
        assert_eq!(resolve("{node_1.text}", &r), "{node_2.secret}");
    }

    #[test]
    fn test_non_placeholder_braces_untouched() {
        let r = results(&[("1", json!({"id": 1}))]);
        let body = r#"{"userId": "{node_1.id}", "static": {"a": 1}}"#;
        assert_eq!(resolve(body, &r), r#"{"userId": "1", "static": {"a": 1}}"#);
        assert_eq!(resolve("{node_1}", &r), "{node_1}");
    }

    #[test]
    fn test_resolve_optional_passes_none_through() {
        let r = results(&[]);
        assert_eq!(resolve_optional(None, &r), None);
        assert_eq!(resolve_optional(Some("plain"), &r), Some("plain".to_string()));
    }

    #[test]
    fn test_references() {
        assert_eq!(
            references("{node_a.x}/{node_b.y.z}?q={node_a.w}"),
            vec!["a", "b"]
        );
        assert!(references("no placeholders").is_empty());
    }

    #[test]
    fn test_scoped_results_hide_other_nodes() {
        let mut ctx = RunContext::new();
        ctx.set_result("a", json!({"v": 1}));
        ctx.set_result("b", json!({"v": 2}));
        let visible: HashSet<NodeId> = ["a".to_string()].into_iter().collect();
        let scoped = ctx.scoped(&visible);
        assert_eq!(resolve("{node_a.v}-{node_b.v}", &scoped), "1-{node_b.v}");
        assert_eq!(ctx.resolve("{node_b.v}"), "2");
    }
}
