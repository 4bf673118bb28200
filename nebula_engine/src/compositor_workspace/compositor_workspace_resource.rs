/// Deserialized compositor workspace: the node assets executed in sequence.

use crate::resource::AssetId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositorWorkspaceResource {
    /// Compositor node assets, in execution order
    pub compositor_node_asset_ids: Vec<AssetId>,
}

impl CompositorWorkspaceResource {
    pub fn new(compositor_node_asset_ids: Vec<AssetId>) -> Self {
        Self { compositor_node_asset_ids }
    }
}
