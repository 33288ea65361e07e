//! Snapshot persistence: the tree as compact JSON under a fixed key.

use crate::error::StorageError;
use crate::tree::TreeValue;

use super::kv::KeyValueStore;


/// Serialize `tree` compactly and store it under `key`.
pub fn save_snapshot(
    store: &mut dyn KeyValueStore,
    key: &str,
    tree: &TreeValue,
) -> Result<(), StorageError> {
    let text = serde_json::to_string(tree).map_err(|e| StorageError::Serialize(e.to_string()))?;
    store.write(key, &text)
}


/// Load the snapshot under `key`.
///
/// Returns `Ok(None)` when nothing is stored and `StorageError::Corrupt`
/// when the stored text does not parse.
pub fn load_snapshot(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<TreeValue>, StorageError> {
    let Some(text) = store.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| StorageError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })
}


/// Remove the snapshot under `key`.
pub fn clear_snapshot(store: &mut dyn KeyValueStore, key: &str) -> Result<(), StorageError> {
    store.remove(key)
}
