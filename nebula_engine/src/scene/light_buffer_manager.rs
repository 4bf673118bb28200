/// Light buffer manager - uploads the frame's lights before passes run.

use crate::error::Result;
use crate::graphics_device::{CommandBuffer, RenderTarget};
use super::{CameraSceneItem, LightSceneItem};

/// Fills the GPU light buffer once per executed frame
///
/// Called after culling and scene item hooks, before any node fills the
/// command buffer; `on_post_command_buffer_dispatch` follows submission.
pub trait LightBufferManager: Send + Sync {
    fn fill_buffer(
        &mut self,
        render_target: &dyn RenderTarget,
        camera: &CameraSceneItem,
        light: Option<&LightSceneItem>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()>;

    /// Release per-frame state once the command buffer was submitted
    fn on_post_command_buffer_dispatch(&mut self);
}
