//! Transport backends for inventory requests.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::ReportError;

pub use http::HttpTransport;
pub use memory::InMemoryTransport;

/// HTTP verb of an inventory request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    /// Create an entity.
    Post,
    /// Replace an entity.
    Put,
}

/// One request against the inventory API. `path` is relative to the
/// configured inventory URI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRequest {
    /// HTTP verb.
    pub method: Method,
    /// Path below the inventory URI, starting with `/`.
    pub path: String,
    /// JSON body.
    pub body: serde_json::Value,
}

impl InventoryRequest {
    /// A `POST` creating an entity at `path`.
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body,
        }
    }

    /// A `PUT` replacing the entity at `path`.
    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body,
        }
    }

    /// Entity id carried in the body, if any.
    pub fn entity_id(&self) -> Option<&str> {
        self.body.get("id").and_then(serde_json::Value::as_str)
    }
}

/// How the inventory took a request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The body was stored.
    Stored,
    /// A create found the entity already present. Its content is unchanged,
    /// so the body was not stored.
    AlreadyExists,
}

/// Asynchronous transport shared by the bootstrap steps and every reporter.
///
/// [`Delivery::AlreadyExists`] is only ever returned for [`Method::Post`]; a
/// conflict on a replace is a failure.
#[async_trait]
pub trait InventoryTransport: Send + Sync + 'static {
    /// Send one request and report how it was taken, or the failure cause.
    async fn send(&self, request: InventoryRequest) -> Result<Delivery, ReportError>;
}
