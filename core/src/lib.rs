//! Record model, validation, and storage core for the panel telemetry service.
//!
//! The modules mirror the write path of the service: an untyped candidate
//! payload is validated into a typed [`Reading`], persisted through the
//! [`ReadingStore`] seam, and returned as a [`StoredReading`] carrying the
//! id the store assigned.

pub mod prelude;
pub mod reading;
pub mod store;
pub mod telemetry;

pub use prelude::{Reading, ReadingStore, StoredReading};
