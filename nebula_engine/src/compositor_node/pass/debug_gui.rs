/// Debug GUI pass: draws the debug GUI overlay into the bound render target.

use std::any::Any;
use std::sync::Arc;
use crate::error::{Error, Result};
use crate::engine_err;
use crate::compositor_workspace::CompositorContextData;
use crate::graphics_device::{Command, CommandBuffer, RenderTarget};
use crate::utils::{string_id, BinaryReader, BinaryWriter};
use super::{
    CompositorInstancePass, CompositorPassBaseRecord, CompositorPassTypeId,
    CompositorResourcePass, CompositorResourcePassBase,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugGuiResourcePass {
    pub base: CompositorResourcePassBase,
}

impl DebugGuiResourcePass {
    pub const TYPE_ID: CompositorPassTypeId = string_id("DebugGui");
}

impl CompositorResourcePass for DebugGuiResourcePass {
    fn compositor_pass_type_id(&self) -> CompositorPassTypeId {
        Self::TYPE_ID
    }

    fn base(&self) -> &CompositorResourcePassBase {
        &self.base
    }

    fn deserialize(&mut self, bytes: &[u8]) -> Result<()> {
        let mut reader = BinaryReader::new(bytes);
        let base = CompositorResourcePassBase::from_record(&reader.read::<CompositorPassBaseRecord>()?);
        if !reader.is_at_end() {
            return Err(Error::InvalidAsset(format!(
                "Debug GUI pass '{}' payload has {} trailing bytes", base.name, reader.remaining()
            )));
        }
        self.base = base;
        Ok(())
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write(&self.base.to_record());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct DebugGuiInstancePass {
    name: String,
}

impl DebugGuiInstancePass {
    pub fn new(resource_pass: &DebugGuiResourcePass) -> Self {
        Self {
            name: resource_pass.base.name.clone(),
        }
    }
}

impl CompositorInstancePass for DebugGuiInstancePass {
    fn on_fill_command_buffer(
        &mut self,
        render_target: Option<&Arc<dyn RenderTarget>>,
        _context: &mut CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        if render_target.is_none() {
            return Err(engine_err!("nebula::DebugGuiInstancePass",
                "Debug GUI pass '{}' has no render target", self.name));
        }
        command_buffer.push(Command::DrawDebugGui);
        Ok(())
    }
}
