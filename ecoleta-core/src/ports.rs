//! Traits describing the external clients and the errors they report.

use async_trait::async_trait;
use reqwest::{Error as ReqwestError, StatusCode};

use crate::model::{CityName, Coordinate, Item, NewPoint, StateCode};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to external services.
pub enum PortError {
    /// Transport failure or timeout.
    #[error("Network error: {0}")]
    Network(#[source] ReqwestError),
    /// Response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
    /// Backend rejected the request (4xx).
    #[error("Rejected by server ({status}): {message}")]
    Validation {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        message: String,
    },
    /// Backend failed internally (5xx or any other unexpected status).
    #[error("Server error ({status})")]
    Server {
        /// HTTP status code.
        status: u16,
    },
    /// The position provider is not allowed to locate the device.
    #[error("Location permission denied")]
    PermissionDenied,
    /// The position could not be determined.
    #[error("Location unavailable: {0}")]
    Unavailable(String),
    /// The task running the request stopped before producing a result.
    #[error("Request aborted: {0}")]
    Aborted(String),
}

impl PortError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: StatusCode, message: String) -> Self {
        if status.is_client_error() {
            PortError::Validation {
                status: status.as_u16(),
                message,
            }
        } else {
            PortError::Server {
                status: status.as_u16(),
            }
        }
    }
}

impl From<ReqwestError> for PortError {
    fn from(err: ReqwestError) -> Self {
        if err.is_decode() {
            PortError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            PortError::from_status(status, String::new())
        } else {
            PortError::Network(err)
        }
    }
}

#[async_trait]
/// State and city lookup service.
pub trait GeographyPort: Send + Sync {
    /// List all state codes, ordered by state name.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails or the body is malformed.
    async fn list_states(&self) -> Result<Vec<StateCode>, PortError>;

    /// List the cities of a state, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails or the body is malformed.
    async fn list_cities(&self, state: &StateCode) -> Result<Vec<CityName>, PortError>;
}

#[async_trait]
/// Application backend holding the item catalog and the collection points.
pub trait CatalogPort: Send + Sync {
    /// Fetch every selectable item.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails.
    async fn list_items(&self) -> Result<Vec<Item>, PortError>;

    /// Register a new collection point.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Validation`] for 4xx answers, [`PortError::Server`] for
    /// 5xx answers and [`PortError::Network`] on transport failure.
    async fn create_point(&self, point: &NewPoint) -> Result<(), PortError>;
}

#[async_trait]
/// Source of the device's current position.
pub trait GeolocationPort: Send + Sync {
    /// Resolve the current position.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::PermissionDenied`] or [`PortError::Unavailable`].
    async fn current_position(&self) -> Result<Coordinate, PortError>;
}
