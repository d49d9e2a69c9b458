//! Fault-tolerant collection of device and identifier attributes.
//!
//! A [`Collector`] drives a caller-owned [`PlatformAccessor`] and always
//! produces a complete [`AttributeSnapshot`]: every failing accessor degrades
//! to that attribute's documented fallback instead of failing the pass.

mod accessor;
mod attributes;
mod collector;
mod error;
pub mod profile;
mod resolve;
mod snapshot;

pub use accessor::{from_callback, AccessorResult, Completion, PlatformAccessor};
pub use attributes::{AdTrackingStatus, AttributeKey};
pub use collector::{CollectionReport, Collector, CollectorOptions, DEFAULT_ASYNC_TIMEOUT};
pub use error::{AccessorUnavailable, SnapshotError};
pub use profile::{DeviceProfile, ProfileAccessor, ProfileError};
pub use resolve::{resolve, Resolution};
pub use snapshot::AttributeSnapshot;
