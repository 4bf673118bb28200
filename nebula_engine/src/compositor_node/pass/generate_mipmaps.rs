/// Generate mipmaps pass: fills the mip chain of a render target texture.

use std::any::Any;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use crate::error::Result;
use crate::compositor_workspace::CompositorContextData;
use crate::graphics_device::{Command, CommandBuffer, RenderTarget};
use crate::resource::{AssetId, INVALID_ASSET_ID};
use crate::utils::{string_id, BinaryWriter};
use super::copy::texture_of_pass;
use super::{
    read_pass_payload, write_pass_payload, CompositorInstancePass, CompositorPassTypeId,
    CompositorResourcePass, CompositorResourcePassBase,
};

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GenerateMipmapsPassRecord {
    texture_asset_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateMipmapsResourcePass {
    pub base: CompositorResourcePassBase,
    pub texture_asset_id: AssetId,
}

impl GenerateMipmapsResourcePass {
    pub const TYPE_ID: CompositorPassTypeId = string_id("GenerateMipmaps");
}

impl Default for GenerateMipmapsResourcePass {
    fn default() -> Self {
        Self {
            base: CompositorResourcePassBase::default(),
            texture_asset_id: INVALID_ASSET_ID,
        }
    }
}

impl CompositorResourcePass for GenerateMipmapsResourcePass {
    fn compositor_pass_type_id(&self) -> CompositorPassTypeId {
        Self::TYPE_ID
    }

    fn base(&self) -> &CompositorResourcePassBase {
        &self.base
    }

    fn deserialize(&mut self, bytes: &[u8]) -> Result<()> {
        let (base, record) = read_pass_payload::<GenerateMipmapsPassRecord>(bytes)?;
        self.base = base;
        self.texture_asset_id = record.texture_asset_id;
        Ok(())
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        write_pass_payload(writer, &self.base, &GenerateMipmapsPassRecord {
            texture_asset_id: self.texture_asset_id,
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct GenerateMipmapsInstancePass {
    name: String,
    texture_asset_id: AssetId,
}

impl GenerateMipmapsInstancePass {
    pub fn new(resource_pass: &GenerateMipmapsResourcePass) -> Self {
        Self {
            name: resource_pass.base.name.clone(),
            texture_asset_id: resource_pass.texture_asset_id,
        }
    }
}

impl CompositorInstancePass for GenerateMipmapsInstancePass {
    fn on_fill_command_buffer(
        &mut self,
        _render_target: Option<&Arc<dyn RenderTarget>>,
        context: &mut CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        let texture = texture_of_pass(context, &self.name, self.texture_asset_id)?;
        command_buffer.push(Command::GenerateMipmaps(texture));
        Ok(())
    }
}
