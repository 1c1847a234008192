//! Bundle of the client implementations the registration form talks to.

use std::sync::Arc;

use crate::ports::{CatalogPort, GeographyPort, GeolocationPort};

/// Collection of ports wired into a form controller.
#[derive(Clone)]
pub struct Backends {
    /// Implementation for state and city lookups.
    pub geography: Arc<dyn GeographyPort>,
    /// Implementation for the item catalog and point submission.
    pub catalog: Arc<dyn CatalogPort>,
    /// Implementation for the initial map position.
    pub geolocation: Arc<dyn GeolocationPort>,
}

impl Backends {
    /// Bundle the three ports.
    #[must_use]
    pub fn new(
        geography: Arc<dyn GeographyPort>,
        catalog: Arc<dyn CatalogPort>,
        geolocation: Arc<dyn GeolocationPort>,
    ) -> Self {
        Self {
            geography,
            catalog,
            geolocation,
        }
    }
}
