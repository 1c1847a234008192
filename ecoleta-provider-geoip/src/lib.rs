//! Position providers used to center the registration map.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use ecoleta_core::{
    model::Coordinate,
    ports::{GeolocationPort, PortError},
};

/// ip-api.com lookup restricted to the fields we read.
pub const DEFAULT_LOOKUP_URL: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

/// Response from the IP lookup service.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Approximates the device position from its public IP address.
pub struct IpGeolocationPort {
    client: Client,
    lookup_url: String,
}

impl IpGeolocationPort {
    /// Create a new port querying the given lookup URL.
    #[must_use]
    pub fn new(client: Client, lookup_url: impl Into<String>) -> Self {
        Self {
            client,
            lookup_url: lookup_url.into(),
        }
    }
}

#[async_trait]
impl GeolocationPort for IpGeolocationPort {
    async fn current_position(&self) -> Result<Coordinate, PortError> {
        debug!(url = %self.lookup_url, "looking up position by IP");
        let resp = self
            .client
            .get(&self.lookup_url)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|err| PortError::Unavailable(err.to_string()))?;

        let lookup = resp
            .json::<LookupResponse>()
            .await
            .map_err(|err| PortError::Unavailable(err.to_string()))?;

        position_from(lookup)
    }
}

fn position_from(lookup: LookupResponse) -> Result<Coordinate, PortError> {
    if lookup.status != "success" {
        let reason = lookup
            .message
            .unwrap_or_else(|| format!("lookup status {}", lookup.status));
        return Err(PortError::Unavailable(reason));
    }

    match (lookup.lat, lookup.lon) {
        (Some(latitude), Some(longitude)) => Ok(Coordinate::new(latitude, longitude)),
        _ => Err(PortError::Unavailable("lookup returned no coordinates".to_owned())),
    }
}

/// Always reports the same, configured position.
pub struct FixedGeolocationPort {
    position: Coordinate,
}

impl FixedGeolocationPort {
    /// Create a port that always answers with `position`.
    #[must_use]
    pub fn new(position: Coordinate) -> Self {
        Self { position }
    }
}

#[async_trait]
impl GeolocationPort for FixedGeolocationPort {
    async fn current_position(&self) -> Result<Coordinate, PortError> {
        Ok(self.position)
    }
}

/// Used when the user opted out of location lookups.
pub struct DisabledGeolocationPort;

#[async_trait]
impl GeolocationPort for DisabledGeolocationPort {
    async fn current_position(&self) -> Result<Coordinate, PortError> {
        Err(PortError::PermissionDenied)
    }
}
