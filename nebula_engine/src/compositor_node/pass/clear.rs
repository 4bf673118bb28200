/// Clear pass: clears the bound render target.

use std::any::Any;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use crate::error::{Error, Result};
use crate::engine_err;
use crate::compositor_workspace::CompositorContextData;
use crate::graphics_device::{ClearFlags, Command, CommandBuffer, RenderTarget};
use crate::utils::{string_id, BinaryWriter};
use super::{
    read_pass_payload, write_pass_payload, CompositorInstancePass, CompositorPassTypeId,
    CompositorResourcePass, CompositorResourcePassBase,
};

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ClearPassRecord {
    flags: u32,
    color: [f32; 4],
    depth: f32,
    stencil: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClearResourcePass {
    pub base: CompositorResourcePassBase,
    pub flags: ClearFlags,
    pub color: [f32; 4],
    pub depth: f32,
    pub stencil: u32,
}

impl ClearResourcePass {
    pub const TYPE_ID: CompositorPassTypeId = string_id("Clear");
}

impl Default for ClearResourcePass {
    fn default() -> Self {
        Self {
            base: CompositorResourcePassBase::default(),
            flags: ClearFlags::COLOR | ClearFlags::DEPTH,
            color: [0.0, 0.0, 0.0, 1.0],
            depth: 0.0,
            stencil: 0,
        }
    }
}

impl CompositorResourcePass for ClearResourcePass {
    fn compositor_pass_type_id(&self) -> CompositorPassTypeId {
        Self::TYPE_ID
    }

    fn base(&self) -> &CompositorResourcePassBase {
        &self.base
    }

    fn deserialize(&mut self, bytes: &[u8]) -> Result<()> {
        let (base, record) = read_pass_payload::<ClearPassRecord>(bytes)?;
        let flags = record.flags;
        self.flags = ClearFlags::from_bits(flags)
            .ok_or_else(|| Error::InvalidAsset(format!("Invalid clear flags {:#x}", flags)))?;
        self.base = base;
        self.color = record.color;
        self.depth = record.depth;
        self.stencil = record.stencil;
        Ok(())
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        write_pass_payload(writer, &self.base, &ClearPassRecord {
            flags: self.flags.bits(),
            color: self.color,
            depth: self.depth,
            stencil: self.stencil,
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct ClearInstancePass {
    name: String,
    flags: ClearFlags,
    color: [f32; 4],
    depth: f32,
    stencil: u32,
}

impl ClearInstancePass {
    pub fn new(resource_pass: &ClearResourcePass) -> Self {
        Self {
            name: resource_pass.base.name.clone(),
            flags: resource_pass.flags,
            color: resource_pass.color,
            depth: resource_pass.depth,
            stencil: resource_pass.stencil,
        }
    }
}

impl CompositorInstancePass for ClearInstancePass {
    fn on_fill_command_buffer(
        &mut self,
        render_target: Option<&Arc<dyn RenderTarget>>,
        _context: &mut CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        if render_target.is_none() {
            return Err(engine_err!("nebula::ClearInstancePass",
                "Clear pass '{}' has no render target", self.name));
        }
        command_buffer.push(Command::Clear {
            flags: self.flags,
            color: self.color,
            depth: self.depth,
            stencil: self.stencil,
        });
        Ok(())
    }
}
