use std::time::Duration;

use crate::AttributeKey;

/// The single failure kind an accessor can report.
///
/// Covers platform calls that threw or returned nothing, features the device
/// does not support, dropped callbacks and timeouts. The collector never lets
/// one escape; it always becomes the attribute's fallback value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("accessor unavailable: {reason}")]
pub struct AccessorUnavailable {
    reason: String,
}

impl AccessorUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn not_supported(feature: &str) -> Self {
        Self::new(format!("{feature} is not supported by this accessor"))
    }

    pub fn timed_out(after: Duration) -> Self {
        Self::new(format!("timed out after {}ms", after.as_millis()))
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot is missing attribute {0}")]
    MissingKey(AttributeKey),
}
