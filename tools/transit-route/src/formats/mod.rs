//! Binary file format for the persisted routable network

pub mod crc;
pub mod transit_db;

pub use transit_db::{FormatError, TransitDbFile};
