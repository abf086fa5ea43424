pub mod record;
pub mod validate;

pub use record::{Reading, StoredReading};
pub use validate::{validate, ValidationError};
