//! LocalStorage JSON persistence
//!
//! Values are stored as JSON strings under a hub-wide key prefix. Native
//! builds have no storage: loads find nothing and saves succeed silently.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Prefix shared by every key the hub writes
pub const KEY_PREFIX: &str = "pixel_arcade_";

pub fn storage_key(name: &str) -> String {
    format!("{KEY_PREFIX}{name}")
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage> {
    use crate::error::ArcadeError;

    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or_else(|| ArcadeError::Storage("LocalStorage unavailable".to_string()))
}

/// Read and decode `name`. `Ok(None)` when nothing was stored.
#[cfg(target_arch = "wasm32")]
pub fn load_json<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
    use crate::error::ArcadeError;

    let storage = local_storage()?;
    let raw = storage
        .get_item(&storage_key(name))
        .map_err(|_| ArcadeError::Storage(format!("failed to read {name}")))?;
    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Encode and write `value` under `name`
#[cfg(target_arch = "wasm32")]
pub fn save_json<T: Serialize>(name: &str, value: &T) -> Result<()> {
    use crate::error::ArcadeError;

    let json = serde_json::to_string(value)?;
    local_storage()?
        .set_item(&storage_key(name), &json)
        .map_err(|_| ArcadeError::Storage(format!("failed to write {name}")))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_json<T: DeserializeOwned>(_name: &str) -> Result<Option<T>> {
    Ok(None)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_json<T: Serialize>(_name: &str, value: &T) -> Result<()> {
    // Still encode so bad values fail the same way on every target
    serde_json::to_string(value)?;
    Ok(())
}

/// Load `name`, falling back to the default on a miss or a corrupt entry
pub fn load_or_default<T: DeserializeOwned + Default>(name: &str) -> T {
    match load_json(name) {
        Ok(Some(value)) => {
            log::info!("Loaded {} from storage", name);
            value
        }
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Discarding stored {}: {}", name, e);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key("settings"), "pixel_arcade_settings");
    }

    #[test]
    fn test_native_has_no_storage() {
        let loaded: Option<Vec<u32>> = load_json("anything").unwrap();
        assert!(loaded.is_none());
        assert!(save_json("anything", &vec![1, 2, 3]).is_ok());
        let fallback: Vec<u32> = load_or_default("anything");
        assert!(fallback.is_empty());
    }
}
