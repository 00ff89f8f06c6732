//! Shared model and CSV conversion for the shipment importer.
//!
//! Nothing in this crate touches the network or a database. The backend feeds
//! raw upload bytes into [`parse::convert_document`] and receives typed
//! [`model::shipment::ShipmentRecord`]s, or the first error found.

pub mod error;
pub mod model;
pub mod parse;
pub mod schema;
