/// Compute pass: dispatches a compute material.

use std::any::Any;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use crate::error::Result;
use crate::compositor_workspace::CompositorContextData;
use crate::graphics_device::{Command, CommandBuffer, RenderTarget};
use crate::resource::{AssetId, INVALID_ASSET_ID};
use crate::utils::{string_id, BinaryWriter, StringId};
use super::scene::DEFAULT_MATERIAL_TECHNIQUE_ID;
use super::{
    read_pass_payload, write_pass_payload, CompositorInstancePass, CompositorPassTypeId,
    CompositorResourcePass, CompositorResourcePassBase,
};

/// Threads per group along x and y when the group count follows the render target
pub const COMPUTE_THREAD_GROUP_SIZE: u32 = 8;

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ComputePassRecord {
    material_asset_id: u32,
    material_technique_id: u32,
    thread_group_count: [u32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComputeResourcePass {
    pub base: CompositorResourcePassBase,
    pub material_asset_id: AssetId,
    pub material_technique_id: StringId,
    /// `[0, 0, 0]` covers the bound render target with 8x8 groups
    pub thread_group_count: [u32; 3],
}

impl ComputeResourcePass {
    pub const TYPE_ID: CompositorPassTypeId = string_id("Compute");
}

impl Default for ComputeResourcePass {
    fn default() -> Self {
        Self {
            base: CompositorResourcePassBase::default(),
            material_asset_id: INVALID_ASSET_ID,
            material_technique_id: DEFAULT_MATERIAL_TECHNIQUE_ID,
            thread_group_count: [0; 3],
        }
    }
}

impl CompositorResourcePass for ComputeResourcePass {
    fn compositor_pass_type_id(&self) -> CompositorPassTypeId {
        Self::TYPE_ID
    }

    fn base(&self) -> &CompositorResourcePassBase {
        &self.base
    }

    fn deserialize(&mut self, bytes: &[u8]) -> Result<()> {
        let (base, record) = read_pass_payload::<ComputePassRecord>(bytes)?;
        self.base = base;
        self.material_asset_id = record.material_asset_id;
        self.material_technique_id = record.material_technique_id;
        self.thread_group_count = record.thread_group_count;
        Ok(())
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        write_pass_payload(writer, &self.base, &ComputePassRecord {
            material_asset_id: self.material_asset_id,
            material_technique_id: self.material_technique_id,
            thread_group_count: self.thread_group_count,
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct ComputeInstancePass {
    material_asset_id: AssetId,
    material_technique_id: StringId,
    thread_group_count: [u32; 3],
}

impl ComputeInstancePass {
    pub fn new(resource_pass: &ComputeResourcePass) -> Self {
        Self {
            material_asset_id: resource_pass.material_asset_id,
            material_technique_id: resource_pass.material_technique_id,
            thread_group_count: resource_pass.thread_group_count,
        }
    }
}

impl CompositorInstancePass for ComputeInstancePass {
    fn on_fill_command_buffer(
        &mut self,
        render_target: Option<&Arc<dyn RenderTarget>>,
        _context: &mut CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        let thread_group_count = match (self.thread_group_count, render_target) {
            ([0, 0, 0], Some(render_target)) => [
                render_target.width().div_ceil(COMPUTE_THREAD_GROUP_SIZE),
                render_target.height().div_ceil(COMPUTE_THREAD_GROUP_SIZE),
                1,
            ],
            (thread_group_count, _) => thread_group_count,
        };
        command_buffer.push(Command::DispatchCompute {
            material_asset_id: self.material_asset_id,
            material_technique_id: self.material_technique_id,
            thread_group_count,
        });
        Ok(())
    }
}
