/// Compositor workspace asset format
///
/// An LZ4 memory file of type `CompositorWorkspace`, version 2: an unused
/// header word, the number of nodes, then the node asset ids.

use bytemuck::{Pod, Zeroable};
use crate::error::{Error, Result};
use crate::resource::{AssetId, MemoryFile};
use crate::utils::{string_id, BinaryWriter};
use super::CompositorWorkspaceResource;

pub const COMPOSITOR_WORKSPACE_FORMAT_TYPE: u32 = string_id("CompositorWorkspace");
pub const COMPOSITOR_WORKSPACE_FORMAT_VERSION: u32 = 2;

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct CompositorWorkspaceHeader {
    unused: u32,
}

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct CompositorNodes {
    number_of_nodes: u32,
}

pub fn read_compositor_workspace(bytes: &[u8]) -> Result<CompositorWorkspaceResource> {
    let memory_file = MemoryFile::from_bytes(bytes)?;
    memory_file.validate(COMPOSITOR_WORKSPACE_FORMAT_TYPE, COMPOSITOR_WORKSPACE_FORMAT_VERSION)?;
    let mut reader = memory_file.reader();

    reader.read::<CompositorWorkspaceHeader>()?;
    let nodes = reader.read::<CompositorNodes>()?;
    let compositor_node_asset_ids = reader.read_vec::<AssetId>(nodes.number_of_nodes as usize)?;
    if !reader.is_at_end() {
        return Err(Error::InvalidAsset(format!(
            "Compositor workspace has {} trailing bytes", reader.remaining()
        )));
    }
    Ok(CompositorWorkspaceResource::new(compositor_node_asset_ids))
}

pub fn write_compositor_workspace(resource: &CompositorWorkspaceResource) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    writer.write(&CompositorWorkspaceHeader { unused: 0 });
    writer.write(&CompositorNodes {
        number_of_nodes: resource.compositor_node_asset_ids.len() as u32,
    });
    writer.write_slice(&resource.compositor_node_asset_ids);
    MemoryFile::new(COMPOSITOR_WORKSPACE_FORMAT_TYPE, COMPOSITOR_WORKSPACE_FORMAT_VERSION, writer.into_bytes()).to_bytes()
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
