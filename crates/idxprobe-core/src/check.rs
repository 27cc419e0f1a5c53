//! Named boolean predicates evaluated against a single probe response.

use serde_json::Value;

/// Ephemeral view of one HTTP response, as seen by the checks.
///
/// Transport-level failures (timeout, refused connection, TLS error) are
/// represented as status 0 with no body, so every predicate fails on them
/// through the ordinary evaluation path.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// HTTP status code; 0 when the request never produced a response.
    pub status: u16,

    /// Body parsed as JSON, when parsing succeeded.
    pub body: Option<Value>,
}

impl ProbeResponse {
    /// Response for a request that never reached the server.
    pub fn transport_failure() -> Self {
        Self { status: 0, body: None }
    }

    /// Looks up a dot-separated field path in the parsed body.
    ///
    /// `field("ticker.last")` resolves the nested `last` key inside the
    /// `ticker` object. A present-but-null field still counts as present.
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut current = self.body.as_ref()?;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current)
    }
}

/// Declarative predicate over a probe response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Status code equals the given value.
    StatusIs(u16),

    /// A dot-separated field path resolves in the parsed body.
    HasField(&'static str),

    /// The body parses as a JSON array.
    IsArray,

    /// The body parses as a JSON array with at least one element.
    NonEmptyArray,
}

impl Condition {
    /// Evaluates the predicate against one response.
    pub fn eval(&self, response: &ProbeResponse) -> bool {
        match self {
            Condition::StatusIs(expected) => response.status == *expected,
            Condition::HasField(path) => response.field(path).is_some(),
            Condition::IsArray => matches!(response.body, Some(Value::Array(_))),
            Condition::NonEmptyArray => match &response.body {
                Some(Value::Array(items)) => !items.is_empty(),
                _ => false,
            },
        }
    }
}

/// One named check: a predicate plus the label it is recorded under.
#[derive(Debug, Clone)]
pub struct Check {
    /// Label used for metrics attribution.
    pub name: &'static str,

    /// The predicate itself.
    pub condition: Condition,
}

impl Check {
    /// Creates a named check.
    pub const fn new(name: &'static str, condition: Condition) -> Self {
        Self { name, condition }
    }
}

/// Outcome of one evaluated check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Label of the evaluated check.
    pub name: &'static str,

    /// Whether the predicate held.
    pub passed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok_response(body: Value) -> ProbeResponse {
        ProbeResponse { status: 200, body: Some(body) }
    }

    #[test]
    fn status_check_matches_exact_code() {
        let response = ok_response(json!({}));
        assert!(Condition::StatusIs(200).eval(&response));
        assert!(!Condition::StatusIs(201).eval(&response));
    }

    #[test]
    fn field_lookup_traverses_dot_paths() {
        let response = ok_response(json!({"ticker": {"last": "1000500000"}}));
        assert!(Condition::HasField("ticker").eval(&response));
        assert!(Condition::HasField("ticker.last").eval(&response));
        assert!(!Condition::HasField("ticker.volume").eval(&response));
        assert!(!Condition::HasField("tickers").eval(&response));
    }

    #[test]
    fn null_field_still_counts_as_present() {
        let response = ok_response(json!({"timezone": null}));
        assert!(Condition::HasField("timezone").eval(&response));
    }

    #[test]
    fn array_checks_distinguish_empty_from_populated() {
        let empty = ok_response(json!([]));
        assert!(Condition::IsArray.eval(&empty));
        assert!(!Condition::NonEmptyArray.eval(&empty));

        let populated = ok_response(json!([{"id": "btcidr"}]));
        assert!(Condition::IsArray.eval(&populated));
        assert!(Condition::NonEmptyArray.eval(&populated));

        let object = ok_response(json!({"id": "btcidr"}));
        assert!(!Condition::IsArray.eval(&object));
    }

    #[test]
    fn transport_failure_fails_every_condition() {
        let response = ProbeResponse::transport_failure();
        assert!(!Condition::StatusIs(200).eval(&response));
        assert!(!Condition::HasField("server_time").eval(&response));
        assert!(!Condition::IsArray.eval(&response));
        assert!(!Condition::NonEmptyArray.eval(&response));
    }
}
