//! Core types, client ports, and the registration form controller for Ecoleta,
//! a directory of waste collection points.

/// Bundle of client implementations used by the form.
pub mod backends;
/// State container and request sequencing for the registration form.
pub mod form;
/// Domain models and wire payloads.
pub mod model;
/// Traits describing the external clients.
pub mod ports;

pub use backends::*;
pub use form::*;
pub use model::*;
pub use ports::*;
