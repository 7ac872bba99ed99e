//! In-memory transport for development and testing.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Delivery, InventoryRequest, InventoryTransport, Method};
use crate::core::ReportError;

#[derive(Debug)]
struct FailureRule {
    needle: String,
    remaining: Option<u32>,
    status: u16,
}

impl FailureRule {
    fn matches(&self, request: &InventoryRequest) -> bool {
        self.remaining != Some(0) && target_matches(request, &self.needle)
    }
}

/// A request matches when its path or its entity `id` contains `needle`.
fn target_matches(request: &InventoryRequest, needle: &str) -> bool {
    request.path.contains(needle) || request.entity_id().is_some_and(|id| id.contains(needle))
}

#[derive(Debug, Default)]
struct State {
    accepted: Vec<InventoryRequest>,
    attempts: Vec<InventoryRequest>,
    rules: Vec<FailureRule>,
    /// Entity ids created so far.
    entities: HashSet<String>,
}

/// Transport that records every request and fails on demand.
///
/// It keeps track of created entity ids like a real inventory: a second
/// create of the same id is taken as [`Delivery::AlreadyExists`] and a
/// replace of an unknown id fails with `404`.
///
/// Clones share state, so a test keeps one handle while the scheduler owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<Mutex<State>>,
}

impl InMemoryTransport {
    /// Create a transport that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` requests whose path or entity id contains `needle`.
    pub fn fail_next(&self, needle: impl Into<String>, times: u32) {
        self.reject_next(needle, times, 503);
    }

    /// Answer the next `times` matching requests with `status`.
    pub fn reject_next(&self, needle: impl Into<String>, times: u32, status: u16) {
        self.state.lock().rules.push(FailureRule {
            needle: needle.into(),
            remaining: Some(times),
            status,
        });
    }

    /// Fail every request whose path or entity id contains `needle`.
    pub fn fail_always(&self, needle: impl Into<String>) {
        self.state.lock().rules.push(FailureRule {
            needle: needle.into(),
            remaining: None,
            status: 503,
        });
    }

    /// Mark `id` as created, as if an earlier run had stored it.
    pub fn seed_entity(&self, id: impl Into<String>) {
        self.state.lock().entities.insert(id.into());
    }

    /// Drop all failure rules.
    pub fn heal(&self) {
        self.state.lock().rules.clear();
    }

    /// Requests whose body was stored, in arrival order.
    pub fn accepted(&self) -> Vec<InventoryRequest> {
        self.state.lock().accepted.clone()
    }

    /// Every request attempted, including failures.
    pub fn attempts(&self) -> Vec<InventoryRequest> {
        self.state.lock().attempts.clone()
    }

    /// Attempts whose path or entity id contains `needle`.
    pub fn attempts_matching(&self, needle: &str) -> usize {
        self.state
            .lock()
            .attempts
            .iter()
            .filter(|r| target_matches(r, needle))
            .count()
    }

    /// Stored requests whose path or entity id contains `needle`.
    pub fn accepted_matching(&self, needle: &str) -> Vec<InventoryRequest> {
        self.state
            .lock()
            .accepted
            .iter()
            .filter(|r| target_matches(r, needle))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl InventoryTransport for InMemoryTransport {
    async fn send(&self, request: InventoryRequest) -> Result<Delivery, ReportError> {
        let mut state = self.state.lock();
        state.attempts.push(request.clone());

        let rule = state.rules.iter_mut().find(|r| r.matches(&request));
        if let Some(rule) = rule {
            if let Some(remaining) = rule.remaining.as_mut() {
                *remaining -= 1;
            }
            return Err(ReportError::Status {
                status: rule.status,
                body: format!("scripted failure for {}", request.path),
            });
        }

        let id = request.entity_id().map(str::to_owned);
        match (request.method, id) {
            (Method::Post, Some(id)) if state.entities.contains(&id) => {
                return Ok(Delivery::AlreadyExists);
            }
            (Method::Post, Some(id)) => {
                state.entities.insert(id);
            }
            (Method::Put, Some(id)) if !state.entities.contains(&id) => {
                return Err(ReportError::Status {
                    status: 404,
                    body: format!("no entity {id}"),
                });
            }
            _ => {}
        }

        state.accepted.push(request);
        Ok(Delivery::Stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fail_next_expires() {
        let transport = InMemoryTransport::new();
        transport.fail_next("/feed", 2);
        let req = || InventoryRequest::post("/entity/feed", serde_json::json!({}));

        assert!(transport.send(req()).await.is_err());
        assert!(transport.send(req()).await.is_err());
        assert!(transport.send(req()).await.is_ok());
        assert_eq!(transport.attempts().len(), 3);
        assert_eq!(transport.accepted().len(), 1);
    }

    #[tokio::test]
    async fn second_create_is_not_stored() {
        let transport = InMemoryTransport::new();
        let req = || InventoryRequest::post("/entity/feed", serde_json::json!({ "id": "f" }));

        assert_eq!(transport.send(req()).await.unwrap(), Delivery::Stored);
        assert_eq!(transport.send(req()).await.unwrap(), Delivery::AlreadyExists);
        assert_eq!(transport.accepted().len(), 1);
        assert_eq!(transport.attempts().len(), 2);
    }

    #[tokio::test]
    async fn replace_needs_existing_entity() {
        let transport = InMemoryTransport::new();
        let put = || InventoryRequest::put("/entity/x", serde_json::json!({ "id": "x" }));
        assert!(matches!(
            transport.send(put()).await,
            Err(ReportError::Status { status: 404, .. })
        ));

        transport.seed_entity("x");
        assert_eq!(transport.send(put()).await.unwrap(), Delivery::Stored);
    }

    #[tokio::test]
    async fn unrelated_paths_pass() {
        let transport = InMemoryTransport::new();
        transport.fail_always("/feed");
        let req = InventoryRequest::post("/entity/f;x/resource", serde_json::json!({}));
        assert!(transport.send(req).await.is_ok());
    }
}
