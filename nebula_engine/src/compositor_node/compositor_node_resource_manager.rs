/// Streams compositor node assets and keeps them by id.
///
/// The pass factory used to deserialize node payloads is injected; replacing
/// it reloads every known node so that the new pass types are picked up.

use std::sync::Arc;
use slotmap::new_key_type;
use crate::error::Result;
use crate::engine_info;
use crate::resource::{AssetId, LoadingState, ResourceManagerTemplate, ResourceStreamer};
use super::loader::read_compositor_node;
use super::pass::CompositorPassFactory;
use super::CompositorNodeResource;

new_key_type! {
    /// Stable id of a compositor node resource
    pub struct CompositorNodeResourceId;
}

pub struct CompositorNodeResourceManager {
    resources: ResourceManagerTemplate<CompositorNodeResourceId, Arc<CompositorNodeResource>>,
    resource_streamer: Arc<ResourceStreamer>,
    compositor_pass_factory: Arc<dyn CompositorPassFactory>,
}

impl CompositorNodeResourceManager {
    pub fn new(
        resource_streamer: Arc<ResourceStreamer>,
        compositor_pass_factory: Arc<dyn CompositorPassFactory>,
    ) -> Self {
        Self {
            resources: ResourceManagerTemplate::new("nebula::CompositorNodeResourceManager"),
            resource_streamer,
            compositor_pass_factory,
        }
    }

    pub fn compositor_pass_factory(&self) -> &Arc<dyn CompositorPassFactory> {
        &self.compositor_pass_factory
    }

    /// Replace the pass factory and reload every known node with it
    pub fn set_compositor_pass_factory(&mut self, compositor_pass_factory: Arc<dyn CompositorPassFactory>) -> Result<()> {
        self.compositor_pass_factory = compositor_pass_factory;
        let ids = self.resources.keys();
        for &id in &ids {
            let factory = self.compositor_pass_factory.clone();
            self.resources.reload(&self.resource_streamer, id, move |bytes| {
                read_compositor_node(bytes, factory.as_ref()).map(Arc::new)
            })?;
        }
        if !ids.is_empty() {
            engine_info!("nebula::CompositorNodeResourceManager",
                "Pass factory replaced, reloading {} compositor nodes", ids.len());
        }
        Ok(())
    }

    /// Start streaming a node asset, or return the id it is already known under
    pub fn load_compositor_node_resource_by_asset_id(&mut self, asset_id: AssetId) -> Result<CompositorNodeResourceId> {
        let factory = self.compositor_pass_factory.clone();
        self.resources.load_resource_by_asset_id(&self.resource_streamer, asset_id, move |bytes| {
            read_compositor_node(bytes, factory.as_ref()).map(Arc::new)
        })
    }

    /// Block until the node behind `id` is loaded
    pub fn enforce_fully_loaded(&mut self, id: CompositorNodeResourceId) -> Result<()> {
        self.resources.enforce_fully_loaded(id)
    }

    pub fn try_get_by_id(&self, id: CompositorNodeResourceId) -> Option<&Arc<CompositorNodeResource>> {
        self.resources.try_get_by_id(id)
    }

    pub fn loading_state(&self, id: CompositorNodeResourceId) -> Option<LoadingState> {
        self.resources.loading_state(id)
    }

    pub fn loading_generation(&self, id: CompositorNodeResourceId) -> Option<u32> {
        self.resources.loading_generation(id)
    }

    pub fn id_by_asset_id(&self, asset_id: AssetId) -> Option<CompositorNodeResourceId> {
        self.resources.key_by_asset_id(asset_id)
    }

    /// Apply finished loads without blocking
    pub fn dispatch(&mut self) -> usize {
        self.resources.dispatch()
    }

    /// Block until no load is in flight
    pub fn flush(&mut self) -> usize {
        self.resources.flush()
    }

    pub fn has_pending_loads(&self) -> bool {
        self.resources.has_pending_loads()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
#[path = "compositor_node_resource_manager_tests.rs"]
mod tests;
