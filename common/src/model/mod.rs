pub mod shipment;
pub mod summary;
