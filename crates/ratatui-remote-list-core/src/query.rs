use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Items per page. The backend contract is built around this constant; it is not
/// runtime-configurable.
pub const PAGE_SIZE: u64 = 10;

/// A JSON object of constraint keys to values, as the backend understands them.
pub type Constraints = Map<String, Value>;

/// The base request state of a remote list: arbitrary top-level parameters plus an optional
/// base `where` object. Replaced wholesale through the controller, never mutated in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    pub params: Constraints,
    pub where_clause: Constraints,
}

impl Query {
    pub fn new(params: Constraints) -> Self {
        Self {
            params,
            where_clause: Constraints::new(),
        }
    }

    pub fn with_where(mut self, where_clause: Constraints) -> Self {
        self.where_clause = where_clause;
        self
    }
}

/// The effective request for one page, in the wire shape the injected fetch function sends
/// upstream: `{ ...params, "max_results": 10, "page": n, "where"?: {...}, "sort"?: "..." }`.
///
/// `where` and `sort` are skipped entirely when absent; the backend distinguishes "no
/// constraint" from "empty object constraint".
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageRequest {
    #[serde(flatten)]
    pub params: Constraints,
    pub max_results: u64,
    pub page: u32,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Constraints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

/// Merge the ad-hoc filter into the base `where` clause. The filter wins on key collision;
/// the result is `None` when both sides are empty.
pub fn merged_where(base: &Constraints, filter: &Constraints) -> Option<Constraints> {
    if base.is_empty() && filter.is_empty() {
        return None;
    }
    let mut merged = base.clone();
    for (key, value) in filter {
        merged.insert(key.clone(), value.clone());
    }
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn constraints(value: Value) -> Constraints {
        value.as_object().expect("object literal").clone()
    }

    #[test]
    fn merged_where_is_none_when_both_sides_empty() {
        assert_eq!(merged_where(&Constraints::new(), &Constraints::new()), None);
    }

    #[test]
    fn filter_wins_on_key_collision() {
        let base = constraints(json!({"a": 2, "b": 3}));
        let filter = constraints(json!({"a": 1}));
        assert_eq!(
            merged_where(&base, &filter),
            Some(constraints(json!({"a": 1, "b": 3})))
        );
    }

    #[test]
    fn request_serializes_to_the_wire_shape() {
        let request = PageRequest {
            params: constraints(json!({"embedded": {"user": 1}})),
            max_results: PAGE_SIZE,
            page: 3,
            where_clause: Some(constraints(json!({"confirmed": true}))),
            sort: Some("-created".into()),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "embedded": {"user": 1},
                "max_results": 10,
                "page": 3,
                "where": {"confirmed": true},
                "sort": "-created",
            })
        );
    }

    #[test]
    fn absent_where_and_sort_are_omitted_not_null() {
        let request = PageRequest {
            params: Constraints::new(),
            max_results: PAGE_SIZE,
            page: 1,
            where_clause: None,
            sort: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("where"));
        assert!(!object.contains_key("sort"));
    }
}
