/// Copy pass: copies one render target texture into another.

use std::any::Any;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use crate::error::Result;
use crate::engine_err;
use crate::compositor_workspace::CompositorContextData;
use crate::graphics_device::{Command, CommandBuffer, RenderTarget, Texture};
use crate::resource::{AssetId, INVALID_ASSET_ID};
use crate::utils::{string_id, BinaryWriter};
use super::{
    read_pass_payload, write_pass_payload, CompositorInstancePass, CompositorPassTypeId,
    CompositorResourcePass, CompositorResourcePassBase,
};

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct CopyPassRecord {
    destination_texture_asset_id: u32,
    source_texture_asset_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyResourcePass {
    pub base: CompositorResourcePassBase,
    pub destination_texture_asset_id: AssetId,
    pub source_texture_asset_id: AssetId,
}

impl CopyResourcePass {
    pub const TYPE_ID: CompositorPassTypeId = string_id("Copy");
}

impl Default for CopyResourcePass {
    fn default() -> Self {
        Self {
            base: CompositorResourcePassBase::default(),
            destination_texture_asset_id: INVALID_ASSET_ID,
            source_texture_asset_id: INVALID_ASSET_ID,
        }
    }
}

impl CompositorResourcePass for CopyResourcePass {
    fn compositor_pass_type_id(&self) -> CompositorPassTypeId {
        Self::TYPE_ID
    }

    fn base(&self) -> &CompositorResourcePassBase {
        &self.base
    }

    fn deserialize(&mut self, bytes: &[u8]) -> Result<()> {
        let (base, record) = read_pass_payload::<CopyPassRecord>(bytes)?;
        self.base = base;
        self.destination_texture_asset_id = record.destination_texture_asset_id;
        self.source_texture_asset_id = record.source_texture_asset_id;
        Ok(())
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        write_pass_payload(writer, &self.base, &CopyPassRecord {
            destination_texture_asset_id: self.destination_texture_asset_id,
            source_texture_asset_id: self.source_texture_asset_id,
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Created render target texture of `asset_id`, or an error naming the pass
pub(crate) fn texture_of_pass(
    context: &CompositorContextData<'_>,
    pass_name: &str,
    asset_id: AssetId,
) -> Result<Arc<dyn Texture>> {
    context.render_target_texture_manager.texture_by_asset_id(asset_id)
        .cloned()
        .ok_or_else(|| engine_err!("nebula::CompositorInstancePass",
            "Pass '{}' uses render target texture {:#010x} which does not exist", pass_name, asset_id))
}

pub struct CopyInstancePass {
    name: String,
    destination_texture_asset_id: AssetId,
    source_texture_asset_id: AssetId,
}

impl CopyInstancePass {
    pub fn new(resource_pass: &CopyResourcePass) -> Self {
        Self {
            name: resource_pass.base.name.clone(),
            destination_texture_asset_id: resource_pass.destination_texture_asset_id,
            source_texture_asset_id: resource_pass.source_texture_asset_id,
        }
    }
}

impl CompositorInstancePass for CopyInstancePass {
    fn on_fill_command_buffer(
        &mut self,
        _render_target: Option<&Arc<dyn RenderTarget>>,
        context: &mut CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        let destination = texture_of_pass(context, &self.name, self.destination_texture_asset_id)?;
        let source = texture_of_pass(context, &self.name, self.source_texture_asset_id)?;
        command_buffer.push(Command::CopyResource { destination, source });
        Ok(())
    }
}
