//! Domain data structures for items, geography, coordinates, and registration drafts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire value used by the backend for an unset state or city selection.
pub const UNSET_SELECTION: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Server-assigned identifier of a collectable item category.
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Material category a collection point can accept (plastic, glass, ...).
pub struct Item {
    /// Unique identifier.
    pub id: ItemId,
    /// Display name.
    #[serde(default)]
    pub title: String,
    /// Image shown next to the title.
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Federal state code, e.g. `SP`.
pub struct StateCode(pub String);

impl StateCode {
    /// Borrow the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for StateCode {
    fn from(code: &str) -> Self {
        StateCode(code.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// City name, only meaningful together with the state it was listed for.
pub struct CityName(pub String);

impl CityName {
    /// Borrow the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for CityName {
    fn from(name: &str) -> Self {
        CityName(name.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
/// Geographic position in decimal degrees.
pub struct Coordinate {
    /// Latitude, positive north.
    pub latitude: f64,
    /// Longitude, positive east.
    pub longitude: f64,
}

impl Coordinate {
    /// Sentinel for "no point picked yet".
    pub const UNSET: Coordinate = Coordinate {
        latitude: 0.0,
        longitude: 0.0,
    };

    /// Build a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether this is the unset sentinel.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        *self == Self::UNSET
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Editable contact fields of the registration form.
pub enum ContactField {
    /// Organization name.
    Name,
    /// Contact e-mail.
    Email,
    /// `WhatsApp` number.
    Whatsapp,
}

impl ContactField {
    /// All fields in form order.
    pub const ALL: [ContactField; 3] = [
        ContactField::Name,
        ContactField::Email,
        ContactField::Whatsapp,
    ];

    /// Human-friendly label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ContactField::Name => "Organization name",
            ContactField::Email => "E-mail",
            ContactField::Whatsapp => "WhatsApp",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Free-text contact details; nothing is validated client-side.
pub struct ContactInfo {
    /// Organization name.
    pub name: String,
    /// Contact e-mail.
    pub email: String,
    /// `WhatsApp` number.
    pub whatsapp: String,
}

impl ContactInfo {
    /// Read a single field.
    #[must_use]
    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Whatsapp => &self.whatsapp,
        }
    }

    /// Overwrite a single field.
    pub fn set(&mut self, field: ContactField, value: String) {
        let slot = match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Whatsapp => &mut self.whatsapp,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// In-progress, unsaved registration of a collection point.
pub struct RegistrationDraft {
    /// Contact details.
    pub contact: ContactInfo,
    /// Chosen state, `None` while unset.
    pub state: Option<StateCode>,
    /// Chosen city, `None` while unset.
    pub city: Option<CityName>,
    /// Point picked on the map, [`Coordinate::UNSET`] until the first click.
    pub position: Coordinate,
    /// Selected item ids in the order they were picked, without duplicates.
    pub items: Vec<ItemId>,
}

impl RegistrationDraft {
    /// Whether the item is currently selected.
    #[must_use]
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.items.contains(&id)
    }

    /// Package the draft as the wire payload for `POST /points`.
    #[must_use]
    pub fn to_new_point(&self) -> NewPoint {
        NewPoint {
            name: self.contact.name.clone(),
            email: self.contact.email.clone(),
            whatsapp: self.contact.whatsapp.clone(),
            uf: self
                .state
                .as_ref()
                .map_or_else(|| UNSET_SELECTION.to_owned(), ToString::to_string),
            city: self
                .city
                .as_ref()
                .map_or_else(|| UNSET_SELECTION.to_owned(), ToString::to_string),
            latitude: self.position.latitude,
            longitude: self.position.longitude,
            items: self.items.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Body of `POST /points`.
pub struct NewPoint {
    /// Organization name.
    pub name: String,
    /// Contact e-mail.
    pub email: String,
    /// `WhatsApp` number.
    pub whatsapp: String,
    /// State code or [`UNSET_SELECTION`].
    pub uf: String,
    /// City name or [`UNSET_SELECTION`].
    pub city: String,
    /// Latitude of the picked point.
    pub latitude: f64,
    /// Longitude of the picked point.
    pub longitude: f64,
    /// Accepted item categories.
    pub items: Vec<ItemId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_uses_sentinels_on_the_wire() {
        let point = RegistrationDraft::default().to_new_point();

        assert_eq!(point.uf, UNSET_SELECTION);
        assert_eq!(point.city, UNSET_SELECTION);
        assert!(point.items.is_empty());
        assert!(Coordinate::new(point.latitude, point.longitude).is_unset());
    }

    #[test]
    fn new_point_serializes_with_backend_field_names() {
        let draft = RegistrationDraft {
            contact: ContactInfo {
                name: "Recicla Já".to_owned(),
                email: "contato@recicla.org".to_owned(),
                whatsapp: "11999990000".to_owned(),
            },
            state: Some(StateCode::from("SP")),
            city: Some(CityName::from("Santos")),
            position: Coordinate::new(-23.5, -46.6),
            items: vec![ItemId(7), ItemId(2)],
        };

        let json = serde_json::to_value(draft.to_new_point()).expect("serializes");

        assert_eq!(
            json,
            serde_json::json!({
                "name": "Recicla Já",
                "email": "contato@recicla.org",
                "whatsapp": "11999990000",
                "uf": "SP",
                "city": "Santos",
                "latitude": -23.5,
                "longitude": -46.6,
                "items": [7, 2],
            })
        );
    }

    #[test]
    fn items_with_missing_fields_still_decode() {
        let items: Vec<Item> =
            serde_json::from_str(r#"[{"id": 1, "title": "Lâmpadas"}, {"id": 2}]"#)
                .expect("decodes");

        assert_eq!(items.len(), 2);
        assert_eq!(items.first().map(|item| item.image_url.as_str()), Some(""));
        assert_eq!(items.get(1).map(|item| item.title.as_str()), Some(""));
    }

    #[test]
    fn contact_fields_are_independent() {
        let mut contact = ContactInfo::default();
        contact.set(ContactField::Email, "a@b.c".to_owned());
        contact.set(ContactField::Name, "Coleta".to_owned());
        contact.set(ContactField::Email, "x@y.z".to_owned());

        assert_eq!(contact.get(ContactField::Name), "Coleta");
        assert_eq!(contact.get(ContactField::Email), "x@y.z");
        assert_eq!(contact.get(ContactField::Whatsapp), "");
    }
}
