//! Geography provider backed by the IBGE localities API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use ecoleta_core::{
    model::{CityName, StateCode},
    ports::{GeographyPort, PortError},
};

/// Public IBGE localities endpoint.
pub const DEFAULT_BASE_URL: &str = "https://servicodados.ibge.gov.br/api/v1/localidades";

/// Single entry from /estados
#[derive(Debug, Deserialize)]
struct StateEntry {
    sigla: String,
}

/// Single entry from /estados/{uf}/municipios
#[derive(Debug, Deserialize)]
struct MunicipalityEntry {
    nome: String,
}

/// State and city lookups against IBGE.
pub struct IbgeGeographyPort {
    client: Client,
    base_url: String,
}

impl IbgeGeographyPort {
    /// Create a port talking to the public IBGE endpoint.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Create a port talking to a custom endpoint, e.g. a mirror.
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }
}

#[async_trait]
impl GeographyPort for IbgeGeographyPort {
    async fn list_states(&self) -> Result<Vec<StateCode>, PortError> {
        debug!("requesting IBGE states");
        let req = self
            .client
            .get(format!("{}/estados", self.base_url))
            .query(&[("orderBy", "nome")]);

        let states = fetch_json::<Vec<StateEntry>>(req).await?;
        Ok(map_states(states))
    }

    async fn list_cities(&self, state: &StateCode) -> Result<Vec<CityName>, PortError> {
        let code = state.as_str().trim();
        if code.is_empty() {
            return Ok(Vec::new());
        }

        debug!(state = code, "requesting IBGE municipalities");
        let req = self
            .client
            .get(format!("{}/estados/{code}/municipios", self.base_url))
            .query(&[("orderBy", "nome")]);

        let municipalities = fetch_json::<Vec<MunicipalityEntry>>(req).await?;
        Ok(map_municipalities(municipalities))
    }
}

fn map_states(entries: Vec<StateEntry>) -> Vec<StateCode> {
    entries
        .into_iter()
        .map(|entry| StateCode(entry.sigla))
        .collect()
}

fn map_municipalities(entries: Vec<MunicipalityEntry>) -> Vec<CityName> {
    entries
        .into_iter()
        .map(|entry| CityName(entry.nome))
        .collect()
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
    use super::*;

    #[test]
    fn states_keep_provider_order() {
        // IBGE already sorts by name; Acre, Alagoas, Amapá...
        let body = r#"[
            {"id": 12, "sigla": "AC", "nome": "Acre", "regiao": {"id": 1, "sigla": "N", "nome": "Norte"}},
            {"id": 27, "sigla": "AL", "nome": "Alagoas", "regiao": {"id": 2, "sigla": "NE", "nome": "Nordeste"}},
            {"id": 16, "sigla": "AP", "nome": "Amapá", "regiao": {"id": 1, "sigla": "N", "nome": "Norte"}}
        ]"#;

        let entries: Vec<StateEntry> = serde_json::from_str(body).expect("decodes");

        assert_eq!(
            map_states(entries),
            vec![StateCode::from("AC"), StateCode::from("AL"), StateCode::from("AP")]
        );
    }

    #[test]
    fn municipalities_map_to_names() {
        let body = r#"[
            {"id": 3509502, "nome": "Campinas", "microrregiao": {}},
            {"id": 3548500, "nome": "Santos", "microrregiao": {}}
        ]"#;

        let entries: Vec<MunicipalityEntry> = serde_json::from_str(body).expect("decodes");

        assert_eq!(
            map_municipalities(entries),
            vec![CityName::from("Campinas"), CityName::from("Santos")]
        );
    }

    #[test]
    fn unexpected_shape_is_rejected() {
        let decoded = serde_json::from_str::<Vec<StateEntry>>(r#"{"message": "oops"}"#);
        assert!(decoded.is_err());
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let port = IbgeGeographyPort::with_base_url(Client::new(), "http://localhost:8080/api/");
        assert_eq!(port.base_url, "http://localhost:8080/api");
    }

    #[tokio::test]
    async fn blank_state_needs_no_request() {
        let port = IbgeGeographyPort::with_base_url(Client::new(), "http://127.0.0.1:9");
        let cities = port
            .list_cities(&StateCode::from("  "))
            .await
            .expect("no request is made");
        assert!(cities.is_empty());
    }
}
