/// Asset ids and asset byte sources.

use std::sync::RwLock;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};

/// Asset id (`string_id` of the asset name in content)
pub type AssetId = u32;

/// Id used where no asset is referenced
pub const INVALID_ASSET_ID: AssetId = u32::MAX;

/// Where asset bytes come from (package file, network, memory)
///
/// Called from the streamer thread.
pub trait AssetSource: Send + Sync {
    fn read_asset(&self, asset_id: AssetId) -> Result<Vec<u8>>;
}

/// In-memory asset source
///
/// Assets may be replaced at any time; the next load or reload of the asset
/// sees the new bytes.
#[derive(Default)]
pub struct MemoryAssetSource {
    assets: RwLock<FxHashMap<AssetId, Vec<u8>>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the bytes of an asset
    pub fn insert(&self, asset_id: AssetId, bytes: Vec<u8>) -> Result<()> {
        let mut assets = self.assets.write()
            .map_err(|_| Error::BackendError("MemoryAssetSource lock poisoned".to_string()))?;
        assets.insert(asset_id, bytes);
        Ok(())
    }

    pub fn contains(&self, asset_id: AssetId) -> bool {
        self.assets.read().map(|assets| assets.contains_key(&asset_id)).unwrap_or(false)
    }
}

impl AssetSource for MemoryAssetSource {
    fn read_asset(&self, asset_id: AssetId) -> Result<Vec<u8>> {
        let assets = self.assets.read()
            .map_err(|_| Error::BackendError("MemoryAssetSource lock poisoned".to_string()))?;
        assets.get(&asset_id)
            .cloned()
            .ok_or_else(|| Error::InvalidAsset(format!("Unknown asset {:#010x}", asset_id)))
    }
}
