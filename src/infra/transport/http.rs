//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};

use super::{Delivery, InventoryRequest, InventoryTransport, Method};
use crate::config::InventoryConfig;
use crate::core::{ReportError, SchedulerError};

/// Header carrying the tenant on every request.
pub const TENANT_HEADER: &str = "hawkular-tenant";

/// HTTP transport talking to the configured inventory host.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// Build the client from configuration.
    pub fn new(cfg: &InventoryConfig) -> Result<Self, SchedulerError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &cfg.http.headers {
            match (
                name.parse::<HeaderName>(),
                value.parse::<HeaderValue>(),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "skipping invalid header"),
            }
        }
        if cfg.send_tenant_header {
            let value = cfg
                .tenant
                .parse::<HeaderValue>()
                .map_err(|e| SchedulerError::InvalidConfig(format!("tenant: {e}")))?;
            headers.insert(TENANT_HEADER, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.http.timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.http.connect_timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| SchedulerError::Transport(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}{}",
                cfg.base_url(),
                cfg.inventory_uri.trim_end_matches('/')
            ),
        })
    }

    /// Absolute URL for a request path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }
}

/// Map a response status to a delivery. `None` means the request failed.
fn delivery_for(method: Method, status: StatusCode) -> Option<Delivery> {
    if status.is_success() {
        Some(Delivery::Stored)
    } else if method == Method::Post && status == StatusCode::CONFLICT {
        Some(Delivery::AlreadyExists)
    } else {
        None
    }
}

#[async_trait]
impl InventoryTransport for HttpTransport {
    async fn send(&self, request: InventoryRequest) -> Result<Delivery, ReportError> {
        let url = self.url_for(&request.path);
        let builder = match request.method {
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
        };

        let response = builder
            .json(&request.body)
            .send()
            .await
            .map_err(|e| ReportError::Transport(e.to_string()))?;

        let status = response.status();
        if let Some(delivery) = delivery_for(request.method, status) {
            tracing::debug!(%url, status = status.as_u16(), ?delivery, "inventory request accepted");
            return Ok(delivery);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ReportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_inventory_uri() {
        let mut cfg = InventoryConfig::default();
        cfg.inventory_uri = "/hawkular/inventory/".into();
        let transport = HttpTransport::new(&cfg).unwrap();
        assert_eq!(
            transport.url_for("/entity/feed"),
            "http://localhost:8080/hawkular/inventory/entity/feed"
        );
    }

    #[test]
    fn conflict_counts_only_for_creates() {
        assert_eq!(
            delivery_for(Method::Post, StatusCode::CONFLICT),
            Some(Delivery::AlreadyExists)
        );
        assert_eq!(delivery_for(Method::Put, StatusCode::CONFLICT), None);
        assert_eq!(delivery_for(Method::Put, StatusCode::NO_CONTENT), Some(Delivery::Stored));
        assert_eq!(delivery_for(Method::Post, StatusCode::CREATED), Some(Delivery::Stored));
        assert_eq!(delivery_for(Method::Post, StatusCode::SERVICE_UNAVAILABLE), None);
    }

    #[test]
    fn invalid_tenant_is_rejected() {
        let mut cfg = InventoryConfig::default();
        cfg.tenant = "bad\ntenant".into();
        assert!(matches!(
            HttpTransport::new(&cfg),
            Err(SchedulerError::InvalidConfig(_))
        ));
    }
}
