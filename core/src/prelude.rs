pub use crate::reading::record::{Reading, StoredReading};
pub use crate::reading::validate::{validate, ValidationError};
pub use crate::store::{ReadingStore, SqliteStore, StoreError, StoreResult};
pub use crate::telemetry::MetricsRecorder;
