/// Generic storage for streamed resources of one kind.
///
/// Keeps slotmap ids stable across reloads and counts how many times each
/// resource finished loading, so dependents can rebuild when the content
/// behind an id changed.

use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};
use crate::error::{Error, Result};
use crate::{engine_debug, engine_error};
use super::{AssetId, PendingLoad, ResourceStreamer};

/// Loading state of a streamed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingState {
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

struct ResourceEntry<R> {
    asset_id: AssetId,
    loading_state: LoadingState,
    resource: Option<R>,
    pending: Option<PendingLoad<R>>,
    /// Incremented every time a load of this entry completes successfully
    loading_generation: u32,
    last_error: Option<Error>,
}

/// Streamed resources keyed by slotmap id and by asset id
pub struct ResourceManagerTemplate<K: Key, R: Send + 'static> {
    resources: SlotMap<K, ResourceEntry<R>>,
    asset_id_to_key: FxHashMap<AssetId, K>,
    log_source: &'static str,
}

impl<K: Key, R: Send + 'static> ResourceManagerTemplate<K, R> {
    /// `log_source` tags the log lines of this manager
    pub fn new(log_source: &'static str) -> Self {
        Self {
            resources: SlotMap::with_key(),
            asset_id_to_key: FxHashMap::default(),
            log_source,
        }
    }

    /// Start loading `asset_id`, or return the id of the already known resource
    pub fn load_resource_by_asset_id<F>(
        &mut self,
        streamer: &ResourceStreamer,
        asset_id: AssetId,
        deserialize: F,
    ) -> Result<K>
    where
        F: FnOnce(&[u8]) -> Result<R> + Send + 'static,
    {
        if let Some(&key) = self.asset_id_to_key.get(&asset_id) {
            return Ok(key);
        }
        let pending = streamer.request(asset_id, deserialize)?;
        let key = self.resources.insert(ResourceEntry {
            asset_id,
            loading_state: LoadingState::Loading,
            resource: None,
            pending: Some(pending),
            loading_generation: 0,
            last_error: None,
        });
        self.asset_id_to_key.insert(asset_id, key);
        engine_debug!(self.log_source, "Loading asset {:#010x}", asset_id);
        Ok(key)
    }

    /// Load the asset behind `key` again
    ///
    /// The previous content stays readable until the new load finished.
    pub fn reload<F>(&mut self, streamer: &ResourceStreamer, key: K, deserialize: F) -> Result<()>
    where
        F: FnOnce(&[u8]) -> Result<R> + Send + 'static,
    {
        let log_source = self.log_source;
        let entry = self.resources.get_mut(key)
            .ok_or_else(|| Error::InvalidResource("Reload of an unknown resource id".to_string()))?;
        entry.pending = Some(streamer.request(entry.asset_id, deserialize)?);
        entry.loading_state = LoadingState::Loading;
        engine_debug!(log_source, "Reloading asset {:#010x}", entry.asset_id);
        Ok(())
    }

    /// Apply every finished load without blocking. Returns the number applied.
    pub fn dispatch(&mut self) -> usize {
        let log_source = self.log_source;
        let mut finished = 0;
        for (_, entry) in self.resources.iter_mut() {
            let result = match entry.pending.as_ref().and_then(|pending| pending.try_take()) {
                Some(result) => result,
                None => continue,
            };
            entry.pending = None;
            Self::apply(log_source, entry, result);
            finished += 1;
        }
        finished
    }

    /// Block until the resource behind `key` finished loading
    ///
    /// Fails if the id is unknown or the load failed.
    pub fn enforce_fully_loaded(&mut self, key: K) -> Result<()> {
        let log_source = self.log_source;
        let entry = self.resources.get_mut(key)
            .ok_or_else(|| Error::InvalidResource("Unknown resource id".to_string()))?;
        if let Some(pending) = entry.pending.take() {
            let result = pending.wait();
            Self::apply(log_source, entry, result);
        }
        match entry.loading_state {
            LoadingState::Loaded => Ok(()),
            LoadingState::Failed => Err(entry.last_error.clone().unwrap_or_else(|| {
                Error::InvalidAsset(format!("Asset {:#010x} failed to load", entry.asset_id))
            })),
            state => Err(Error::InvalidResource(format!(
                "Asset {:#010x} is {:?}", entry.asset_id, state
            ))),
        }
    }

    fn apply(log_source: &'static str, entry: &mut ResourceEntry<R>, result: Result<R>) {
        match result {
            Ok(resource) => {
                entry.resource = Some(resource);
                entry.loading_state = LoadingState::Loaded;
                entry.loading_generation = entry.loading_generation.wrapping_add(1);
                entry.last_error = None;
                engine_debug!(log_source, "Asset {:#010x} loaded", entry.asset_id);
            }
            Err(error) => {
                engine_error!(log_source, "Asset {:#010x} failed to load: {}", entry.asset_id, error);
                entry.resource = None;
                entry.loading_state = LoadingState::Failed;
                entry.last_error = Some(error);
            }
        }
    }

    /// Block until every load in flight finished. Returns the number applied.
    ///
    /// Failed loads are logged and left in `LoadingState::Failed`.
    pub fn flush(&mut self) -> usize {
        let log_source = self.log_source;
        let mut finished = 0;
        for (_, entry) in self.resources.iter_mut() {
            if let Some(pending) = entry.pending.take() {
                let result = pending.wait();
                Self::apply(log_source, entry, result);
                finished += 1;
            }
        }
        finished
    }

    /// The resource, once loaded
    pub fn try_get_by_id(&self, key: K) -> Option<&R> {
        self.resources.get(key).and_then(|entry| entry.resource.as_ref())
    }

    pub fn loading_state(&self, key: K) -> Option<LoadingState> {
        self.resources.get(key).map(|entry| entry.loading_state)
    }

    /// Number of successful loads of the resource behind `key`
    pub fn loading_generation(&self, key: K) -> Option<u32> {
        self.resources.get(key).map(|entry| entry.loading_generation)
    }

    pub fn key_by_asset_id(&self, asset_id: AssetId) -> Option<K> {
        self.asset_id_to_key.get(&asset_id).copied()
    }

    pub fn asset_id(&self, key: K) -> Option<AssetId> {
        self.resources.get(key).map(|entry| entry.asset_id)
    }

    /// Ids of every known resource
    pub fn keys(&self) -> Vec<K> {
        self.resources.keys().collect()
    }

    /// Whether any load is still in flight
    pub fn has_pending_loads(&self) -> bool {
        self.resources.values().any(|entry| entry.pending.is_some())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
#[path = "resource_manager_template_tests.rs"]
mod tests;
