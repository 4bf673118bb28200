/// Streams compositor workspace assets and keeps them by id.

use std::sync::Arc;
use slotmap::new_key_type;
use crate::error::Result;
use crate::resource::{AssetId, LoadingState, ResourceManagerTemplate, ResourceStreamer};
use super::loader::read_compositor_workspace;
use super::CompositorWorkspaceResource;

new_key_type! {
    /// Stable id of a compositor workspace resource
    pub struct CompositorWorkspaceResourceId;
}

pub struct CompositorWorkspaceResourceManager {
    resources: ResourceManagerTemplate<CompositorWorkspaceResourceId, Arc<CompositorWorkspaceResource>>,
    resource_streamer: Arc<ResourceStreamer>,
}

impl CompositorWorkspaceResourceManager {
    pub fn new(resource_streamer: Arc<ResourceStreamer>) -> Self {
        Self {
            resources: ResourceManagerTemplate::new("nebula::CompositorWorkspaceResourceManager"),
            resource_streamer,
        }
    }

    pub fn load_compositor_workspace_resource_by_asset_id(&mut self, asset_id: AssetId) -> Result<CompositorWorkspaceResourceId> {
        self.resources.load_resource_by_asset_id(&self.resource_streamer, asset_id, |bytes| {
            read_compositor_workspace(bytes).map(Arc::new)
        })
    }

    /// Load the workspace asset again, e.g. after content changed on disk
    pub fn reload(&mut self, id: CompositorWorkspaceResourceId) -> Result<()> {
        self.resources.reload(&self.resource_streamer, id, |bytes| {
            read_compositor_workspace(bytes).map(Arc::new)
        })
    }

    pub fn enforce_fully_loaded(&mut self, id: CompositorWorkspaceResourceId) -> Result<()> {
        self.resources.enforce_fully_loaded(id)
    }

    pub fn try_get_by_id(&self, id: CompositorWorkspaceResourceId) -> Option<&Arc<CompositorWorkspaceResource>> {
        self.resources.try_get_by_id(id)
    }

    pub fn loading_state(&self, id: CompositorWorkspaceResourceId) -> Option<LoadingState> {
        self.resources.loading_state(id)
    }

    pub fn loading_generation(&self, id: CompositorWorkspaceResourceId) -> Option<u32> {
        self.resources.loading_generation(id)
    }

    pub fn dispatch(&mut self) -> usize {
        self.resources.dispatch()
    }

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
