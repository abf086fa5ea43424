use serde::{Deserialize, Serialize};

/// A validated instrument reading as accepted on the write path.
///
/// The heading and attitude indicators keep their legacy wire names `HIS`
/// and `ADI` on the JSON surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Altitude in feet, within [0, 3000].
    pub altitude: f64,
    /// Heading indicator in degrees, within [0, 360].
    #[serde(rename = "HIS")]
    pub heading: f64,
    /// Attitude indicator, within [-100, 100].
    #[serde(rename = "ADI")]
    pub attitude: f64,
}

/// A reading as persisted by the store, including its assigned id.
///
/// Stored readings are immutable: there is no update or delete operation
/// anywhere in the service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredReading {
    pub id: i64,
    #[serde(flatten)]
    pub reading: Reading,
}
