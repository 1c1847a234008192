//! Catalog provider for the Ecoleta backend: item categories and collection points.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use ecoleta_core::{
    model::{Item, NewPoint},
    ports::{CatalogPort, PortError},
};

/// Address the backend listens on during local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3333";

/// Client for `GET /items` and `POST /points`.
pub struct BackendCatalogPort {
    client: Client,
    base_url: String,
}

impl BackendCatalogPort {
    /// Create a new port bound to the given HTTP client and backend address.
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[async_trait]
impl CatalogPort for BackendCatalogPort {
    async fn list_items(&self) -> Result<Vec<Item>, PortError> {
        debug!(base_url = %self.base_url, "requesting item catalog");
        fetch_json(self.client.get(self.url("items"))).await
    }

    async fn create_point(&self, point: &NewPoint) -> Result<(), PortError> {
        debug!(base_url = %self.base_url, "posting collection point");
        let resp = self
            .client
            .post(self.url("points"))
            .json(point)
            .send()
            .await
            .map_err(PortError::from)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        // The body usually explains what was rejected; keep going without it.
        let body = resp.text().await.unwrap_or_default();
        Err(rejection(status, &body))
    }
}

fn rejection(status: StatusCode, body: &str) -> PortError {
    PortError::from_status(status, body.trim().to_owned())
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}

#[cfg(test)]
mod tests {
    use ecoleta_core::model::{ItemId, RegistrationDraft};

    use super::*;

    #[test]
    fn urls_join_without_double_slashes() {
        let port = BackendCatalogPort::new(Client::new(), "http://localhost:3333/");

        assert_eq!(port.url("items"), "http://localhost:3333/items");
        assert_eq!(port.url("points"), "http://localhost:3333/points");
    }

    #[test]
    fn catalog_response_decodes_into_items() {
        let body = r#"[
            {"id": 1, "title": "Lâmpadas", "image_url": "http://localhost:3333/uploads/lampadas.svg"},
            {"id": 2, "title": "Pilhas e Baterias", "image_url": "http://localhost:3333/uploads/baterias.svg"}
        ]"#;

        let items: Vec<Item> = serde_json::from_str(body).expect("decodes");

        assert_eq!(items.len(), 2);
        assert_eq!(items.get(1).map(|item| item.id), Some(ItemId(2)));
    }

    #[test]
    fn rejected_payload_carries_the_server_message() {
        let err = rejection(StatusCode::BAD_REQUEST, "  \"uf\" must have 2 characters\n");

        assert!(matches!(
            err,
            PortError::Validation { status: 400, ref message }
                if message == "\"uf\" must have 2 characters"
        ));
    }

    #[test]
    fn internal_failures_map_to_server_errors() {
        assert!(matches!(
            rejection(StatusCode::INTERNAL_SERVER_ERROR, ""),
            PortError::Server { status: 500 }
        ));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let port = BackendCatalogPort::new(Client::new(), "http://127.0.0.1:9");
        let point = RegistrationDraft::default().to_new_point();

        let err = port.create_point(&point).await.expect_err("nothing listens there");

        assert!(matches!(err, PortError::Network(_)));
    }
}
