/// Resolve multisample pass: resolves a multisampled framebuffer into the bound render target.

use std::any::Any;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use crate::error::Result;
use crate::engine_err;
use crate::compositor_workspace::CompositorContextData;
use crate::graphics_device::{Command, CommandBuffer, RenderTarget};
use crate::target::CompositorFramebufferId;
use crate::utils::{string_id, BinaryWriter};
use super::{
    read_pass_payload, write_pass_payload, CompositorInstancePass, CompositorPassTypeId,
    CompositorResourcePass, CompositorResourcePassBase,
};

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ResolveMultisamplePassRecord {
    source_multisample_compositor_framebuffer_id: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveMultisampleResourcePass {
    pub base: CompositorResourcePassBase,
    pub source_multisample_compositor_framebuffer_id: CompositorFramebufferId,
}

impl ResolveMultisampleResourcePass {
    pub const TYPE_ID: CompositorPassTypeId = string_id("ResolveMultisample");
}

impl CompositorResourcePass for ResolveMultisampleResourcePass {
    fn compositor_pass_type_id(&self) -> CompositorPassTypeId {
        Self::TYPE_ID
    }

    fn base(&self) -> &CompositorResourcePassBase {
        &self.base
    }

    fn deserialize(&mut self, bytes: &[u8]) -> Result<()> {
        let (base, record) = read_pass_payload::<ResolveMultisamplePassRecord>(bytes)?;
        self.base = base;
        self.source_multisample_compositor_framebuffer_id = record.source_multisample_compositor_framebuffer_id;
        Ok(())
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        write_pass_payload(writer, &self.base, &ResolveMultisamplePassRecord {
            source_multisample_compositor_framebuffer_id: self.source_multisample_compositor_framebuffer_id,
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct ResolveMultisampleInstancePass {
    name: String,
    source_multisample_compositor_framebuffer_id: CompositorFramebufferId,
}

impl ResolveMultisampleInstancePass {
    pub fn new(resource_pass: &ResolveMultisampleResourcePass) -> Self {
        Self {
            name: resource_pass.base.name.clone(),
            source_multisample_compositor_framebuffer_id: resource_pass.source_multisample_compositor_framebuffer_id,
        }
    }
}

impl CompositorInstancePass for ResolveMultisampleInstancePass {
    fn on_fill_command_buffer(
        &mut self,
        render_target: Option<&Arc<dyn RenderTarget>>,
        context: &mut CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        let destination = render_target.ok_or_else(|| {
            engine_err!("nebula::ResolveMultisampleInstancePass",
                "Resolve multisample pass '{}' has no render target", self.name)
        })?;
        let source = context.framebuffer_manager
            .get_framebuffer_by_compositor_framebuffer_id(self.source_multisample_compositor_framebuffer_id)?;
        command_buffer.push(Command::ResolveMultisampleFramebuffer {
            destination: destination.clone(),
            source,
        });
        Ok(())
    }
}
