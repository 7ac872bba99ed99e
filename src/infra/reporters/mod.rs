//! Reporter variants, one per resource kind.
//!
//! Every reporter builds [`InventoryRequest`]s and sends them through the
//! shared transport. Payloads are small: an id, a name, the resource type
//! path and a property map.

pub mod bootstrap;
pub mod buffered;
pub mod eventbus;
pub mod server;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use crate::core::{ReportError, ResourceKind};
use crate::infra::transport::{Delivery, InventoryRequest, InventoryTransport};

pub use bootstrap::{FeedReporter, RootResourceReporter};
pub use buffered::{ClientReporter, DatagramSocketReporter};
pub use eventbus::EventBusReporter;
pub use server::ServerReporter;

/// Identity and transport shared by all reporters of one scheduler.
#[derive(Clone)]
pub struct ReporterContext {
    /// Feed identifier.
    pub feed_id: String,
    /// Root resource identifier.
    pub root_id: String,
    /// Shared transport.
    pub transport: Arc<dyn InventoryTransport>,
}

impl ReporterContext {
    /// Build a context; the root resource id is derived from the feed id.
    pub fn new(feed_id: impl Into<String>, transport: Arc<dyn InventoryTransport>) -> Self {
        let feed_id = feed_id.into();
        Self {
            root_id: format!("{feed_id}.root"),
            feed_id,
            transport,
        }
    }

    /// Path under which sub-resources of the root are created.
    pub fn sub_resource_path(&self) -> String {
        format!("/entity/f;{}/r;{}/resource", self.feed_id, self.root_id)
    }

    /// Entity id of a sub-resource, optionally qualified by a suffix.
    pub fn sub_resource_id(&self, kind: ResourceKind, qualifier: Option<&str>) -> String {
        match qualifier {
            Some(q) => format!("{}.{kind}.{q}", self.root_id),
            None => format!("{}.{kind}", self.root_id),
        }
    }

    /// Path of one existing sub-resource.
    pub fn sub_resource_entity_path(&self, id: &str) -> String {
        format!("/entity/f;{}/r;{}/r;{id}", self.feed_id, self.root_id)
    }

    /// Request creating a sub-resource of `kind` under the root resource.
    pub fn sub_resource_request(
        &self,
        kind: ResourceKind,
        qualifier: Option<&str>,
        properties: Value,
    ) -> InventoryRequest {
        let id = self.sub_resource_id(kind, qualifier);
        InventoryRequest::post(self.sub_resource_path(), sub_resource_body(&id, kind, properties))
    }

    /// Request replacing an existing sub-resource of `kind`.
    pub fn sub_resource_update(
        &self,
        kind: ResourceKind,
        qualifier: Option<&str>,
        properties: Value,
    ) -> InventoryRequest {
        let id = self.sub_resource_id(kind, qualifier);
        InventoryRequest::put(
            self.sub_resource_entity_path(&id),
            sub_resource_body(&id, kind, properties),
        )
    }

    /// Store `properties` on the sub-resource of `kind`: create it while
    /// `created` is unset, replace it afterwards. A create that finds the
    /// entity already present is followed by a replace, so the properties
    /// are never silently dropped.
    pub async fn upsert_sub_resource(
        &self,
        created: &AtomicBool,
        kind: ResourceKind,
        properties: Value,
    ) -> Result<(), ReportError> {
        if !created.load(Ordering::Acquire) {
            let request = self.sub_resource_request(kind, None, properties.clone());
            let delivery = self.transport.send(request).await?;
            created.store(true, Ordering::Release);
            if delivery == Delivery::Stored {
                return Ok(());
            }
            tracing::debug!(%kind, "sub-resource already present; replacing it");
        }
        let request = self.sub_resource_update(kind, None, properties);
        self.transport.send(request).await?;
        Ok(())
    }
}

fn sub_resource_body(id: &str, kind: ResourceKind, properties: Value) -> Value {
    json!({
        "id": id,
        "name": id,
        "resourceTypePath": format!("/rt;{kind}"),
        "properties": properties,
    })
}

impl std::fmt::Debug for ReporterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReporterContext")
            .field("feed_id", &self.feed_id)
            .field("root_id", &self.root_id)
            .finish_non_exhaustive()
    }
}
