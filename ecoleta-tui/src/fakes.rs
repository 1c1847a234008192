//! In-memory clients for UI tests.

use std::sync::Arc;

use async_trait::async_trait;
use ecoleta_core::{
    backends::Backends,
    model::{CityName, Coordinate, Item, ItemId, NewPoint, StateCode},
    ports::{CatalogPort, GeographyPort, GeolocationPort, PortError},
};

pub(crate) const CENTER: Coordinate = Coordinate::new(-22.9, -43.2);

struct Geography;

#[async_trait]
impl GeographyPort for Geography {
    async fn list_states(&self) -> Result<Vec<StateCode>, PortError> {
        Ok(vec![StateCode::from("RJ"), StateCode::from("SP")])
    }

    async fn list_cities(&self, state: &StateCode) -> Result<Vec<CityName>, PortError> {
        let names: &[&str] = match state.as_str() {
            "RJ" => &["Niterói", "Petrópolis"],
            "SP" => &["Campinas", "Santos"],
            _ => &[],
        };
        Ok(names.iter().copied().map(CityName::from).collect())
    }
}

struct Catalog {
    accept: bool,
}

#[async_trait]
impl CatalogPort for Catalog {
    async fn list_items(&self) -> Result<Vec<Item>, PortError> {
        Ok(["Lâmpadas", "Pilhas e Baterias", "Papéis e Papelão"]
            .into_iter()
            .zip(1..)
            .map(|(title, id)| Item {
                id: ItemId(id),
                title: title.to_owned(),
                image_url: format!("http://localhost:3333/uploads/{id}.svg"),
            })
            .collect())
    }

    async fn create_point(&self, _point: &NewPoint) -> Result<(), PortError> {
        if self.accept {
            Ok(())
        } else {
            Err(PortError::Validation {
                status: 400,
                message: "name is required".to_owned(),
            })
        }
    }
}

struct Geolocation;

#[async_trait]
impl GeolocationPort for Geolocation {
    async fn current_position(&self) -> Result<Coordinate, PortError> {
        Ok(CENTER)
    }
}

pub(crate) fn backends() -> Backends {
    Backends::new(
        Arc::new(Geography),
        Arc::new(Catalog { accept: true }),
        Arc::new(Geolocation),
    )
}

pub(crate) fn rejecting_backends() -> Backends {
    Backends::new(
        Arc::new(Geography),
        Arc::new(Catalog { accept: false }),
        Arc::new(Geolocation),
    )
}
