use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AttributeKey, SnapshotError};

/// Immutable mapping holding a value for every [`AttributeKey`].
///
/// Serializes as a flat JSON object keyed by wire names. Deserializing
/// rejects unknown keys and incomplete maps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<AttributeKey, String>")]
pub struct AttributeSnapshot {
    #[serde(flatten)]
    values: BTreeMap<AttributeKey, String>,
}

impl AttributeSnapshot {
    /// Callers fill every key; see [`TryFrom`] for untrusted input.
    pub(crate) fn from_values(values: BTreeMap<AttributeKey, String>) -> Self {
        debug_assert_eq!(values.len(), AttributeKey::ALL.len());
        Self { values }
    }

    pub fn get(&self, key: AttributeKey) -> &str {
        self.values.get(&key).map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = AttributeKey> + '_ {
        self.values.keys().copied()
    }
}

impl TryFrom<BTreeMap<AttributeKey, String>> for AttributeSnapshot {
    type Error = SnapshotError;

    fn try_from(values: BTreeMap<AttributeKey, String>) -> Result<Self, Self::Error> {
        if let Some(missing) = AttributeKey::ALL
            .into_iter()
            .find(|key| !values.contains_key(key))
        {
            return Err(SnapshotError::MissingKey(missing));
        }
        Ok(Self { values })
    }
}
