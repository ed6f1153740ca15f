//! Scripted transport and payload builders.

use cardsift_remote::transport::{FetchError, RemoteRequest, Transport};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Transport answering from a routing table. Unrouted paths fail with a
/// connectivity error, which is what an offline host looks like.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: BTreeMap<String, Result<Value, FetchError>>,
    calls: usize,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `path` to a successful payload.
    #[must_use]
    pub fn route(mut self, path: &str, payload: Value) -> Self {
        self.routes.insert(path.to_string(), Ok(payload));
        self
    }

    /// Route `path` to a failure.
    #[must_use]
    pub fn fail(mut self, path: &str, error: FetchError) -> Self {
        self.routes.insert(path.to_string(), Err(error));
        self
    }

    /// Total transport invocations so far.
    #[must_use]
    pub const fn calls(&self) -> usize {
        self.calls
    }
}

impl Transport for ScriptedTransport {
    fn get(&mut self, request: &RemoteRequest) -> Result<Value, FetchError> {
        self.calls += 1;
        self.routes
            .get(request.path())
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Connectivity("unrouted path".to_string())))
    }
}

/// Build one page of a sprint listing payload.
#[must_use]
pub fn sprint_page(sprints: &[(u64, &str)], is_last: bool, start_at: u64) -> Value {
    json!({
        "values": sprints
            .iter()
            .map(|&(id, state)| json!({"id": id, "state": state}))
            .collect::<Vec<_>>(),
        "isLast": is_last,
        "startAt": start_at,
    })
}

/// Build an issue listing payload with reviewer assignments under `field`.
#[must_use]
pub fn issue_page(field: &str, reviewers: &[(&str, Option<&str>)]) -> Value {
    json!({
        "issues": reviewers
            .iter()
            .map(|&(key, reviewer)| match reviewer {
                Some(name) => json!({
                    "key": key,
                    "fields": {field: {"displayName": name}},
                }),
                None => json!({"key": key, "fields": {}}),
            })
            .collect::<Vec<_>>(),
    })
}
