//! Compositor passes
//!
//! A pass comes in two halves: an immutable resource pass deserialized from
//! the compositor node asset, and an instance pass created per workspace
//! instance that records commands every frame. Both are produced by a
//! `CompositorPassFactory` from the pass type id stored in the asset.

mod factory;
mod clear;
mod scene;
mod shadow_map;
mod resolve_multisample;
mod copy;
mod generate_mipmaps;
mod compute;
mod debug_gui;

use std::any::Any;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use crate::error::{Error, Result};
use crate::compositor_workspace::CompositorContextData;
use crate::graphics_device::{CommandBuffer, RenderTarget};
use crate::utils::{BinaryReader, BinaryWriter, StringId};

pub use factory::{CompositorPassFactory, DefaultCompositorPassFactory};
pub use clear::{ClearResourcePass, ClearInstancePass};
pub use scene::{SceneResourcePass, SceneInstancePass};
pub use shadow_map::{
    ShadowMapResourcePass, ShadowMapInstancePass, ShadowMapOutput,
    MAXIMUM_NUMBER_OF_SHADOW_CASCADES,
};
pub use resolve_multisample::{ResolveMultisampleResourcePass, ResolveMultisampleInstancePass};
pub use copy::{CopyResourcePass, CopyInstancePass};
pub use generate_mipmaps::{GenerateMipmapsResourcePass, GenerateMipmapsInstancePass};
pub use compute::{ComputeResourcePass, ComputeInstancePass};
pub use debug_gui::{DebugGuiResourcePass, DebugGuiInstancePass};

/// Pass type id (string id of the pass type name)
pub type CompositorPassTypeId = StringId;

/// Maximum pass name length in bytes, terminating zero included
pub const MAXIMUM_PASS_NAME_LENGTH: usize = 64;

/// `number_of_executions` value meaning "every frame"
pub const UNLIMITED_NUMBER_OF_EXECUTIONS: u32 = u32::MAX;

/// Fixed leading part of every pass payload
#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct CompositorPassBaseRecord {
    pub name: [u8; MAXIMUM_PASS_NAME_LENGTH],
    pub minimum_depth: f32,
    pub maximum_depth: f32,
    pub number_of_executions: u32,
    pub skip_first_execution: u8,
}

/// Settings shared by every pass kind
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorResourcePassBase {
    /// Shown in debug events
    pub name: String,
    /// Viewport depth range used when the pass switches render target
    pub minimum_depth: f32,
    pub maximum_depth: f32,
    /// `UNLIMITED_NUMBER_OF_EXECUTIONS` or the number of times the pass runs at all
    pub number_of_executions: u32,
    /// Skip the first execution request (e.g. a pass reading last frame's output)
    pub skip_first_execution: bool,
}

impl Default for CompositorResourcePassBase {
    fn default() -> Self {
        Self {
            name: String::new(),
            minimum_depth: 0.0,
            maximum_depth: 1.0,
            number_of_executions: UNLIMITED_NUMBER_OF_EXECUTIONS,
            skip_first_execution: false,
        }
    }
}

impl CompositorResourcePassBase {
    pub fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn from_record(record: &CompositorPassBaseRecord) -> Self {
        let name = record.name;
        let length = name.iter().position(|&byte| byte == 0).unwrap_or(MAXIMUM_PASS_NAME_LENGTH);
        Self {
            name: String::from_utf8_lossy(&name[..length]).into_owned(),
            minimum_depth: record.minimum_depth,
            maximum_depth: record.maximum_depth,
            number_of_executions: record.number_of_executions,
            skip_first_execution: record.skip_first_execution != 0,
        }
    }

    /// Names longer than 63 bytes are truncated
    pub fn to_record(&self) -> CompositorPassBaseRecord {
        let mut name = [0u8; MAXIMUM_PASS_NAME_LENGTH];
        let mut length = self.name.len().min(MAXIMUM_PASS_NAME_LENGTH - 1);
        while !self.name.is_char_boundary(length) {
            length -= 1;
        }
        name[..length].copy_from_slice(&self.name.as_bytes()[..length]);
        CompositorPassBaseRecord {
            name,
            minimum_depth: self.minimum_depth,
            maximum_depth: self.maximum_depth,
            number_of_executions: self.number_of_executions,
            skip_first_execution: self.skip_first_execution as u8,
        }
    }

    /// Whether the pass is allowed to run for its `execution_request`-th request (0 based)
    pub fn allows_execution(&self, execution_request: u32) -> bool {
        if self.skip_first_execution && execution_request == 0 {
            return false;
        }
        if self.number_of_executions == UNLIMITED_NUMBER_OF_EXECUTIONS {
            return true;
        }
        let executions_so_far = execution_request - self.skip_first_execution as u32;
        executions_so_far < self.number_of_executions
    }
}

/// Read a payload made of the base record followed by one pass specific record
pub(crate) fn read_pass_payload<T: Pod>(bytes: &[u8]) -> Result<(CompositorResourcePassBase, T)> {
    let mut reader = BinaryReader::new(bytes);
    let base = CompositorResourcePassBase::from_record(&reader.read::<CompositorPassBaseRecord>()?);
    let record = reader.read::<T>()?;
    if !reader.is_at_end() {
        return Err(Error::InvalidAsset(format!(
            "Pass '{}' payload has {} trailing bytes", base.name, reader.remaining()
        )));
    }
    Ok((base, record))
}

pub(crate) fn write_pass_payload<T: Pod>(writer: &mut BinaryWriter, base: &CompositorResourcePassBase, record: &T) {
    writer.write(&base.to_record());
    writer.write(record);
}

/// Deserialized description of one pass
pub trait CompositorResourcePass: Send + Sync {
    fn compositor_pass_type_id(&self) -> CompositorPassTypeId;

    fn base(&self) -> &CompositorResourcePassBase;

    /// Fill the pass from its asset payload (base record first)
    fn deserialize(&mut self, bytes: &[u8]) -> Result<()>;

    /// Write the asset payload read back by `deserialize`
    fn serialize(&self, writer: &mut BinaryWriter);

    /// Render queue indices drawn by this pass, scene passes only
    fn render_queue_index_range(&self) -> Option<(u8, u8)> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Per workspace instance half of a pass
pub trait CompositorInstancePass: Send + Sync {
    /// Record the pass commands
    ///
    /// `render_target` is the target bound for this pass, `None` for passes
    /// of a target bound to neither a channel nor a framebuffer.
    fn on_fill_command_buffer(
        &mut self,
        render_target: Option<&Arc<dyn RenderTarget>>,
        context: &mut CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()>;

    /// Release per-frame state once the command buffer was submitted
    fn on_post_command_buffer_dispatch(&mut self) {}

    fn as_shadow_map(&self) -> Option<&ShadowMapInstancePass> {
        None
    }
}

#[cfg(test)]
#[path = "pass_tests.rs"]
mod tests;
