/// GraphicsDevice trait - factory for GPU objects and command submission

use std::sync::{Arc, Mutex, MutexGuard};
use crate::error::{Error, Result};
use crate::graphics_device::{
    Texture, TextureDesc,
    RenderPass, RenderPassDesc,
    RenderTarget, FramebufferDesc,
    CommandBuffer,
};

/// Hardware limits queried once by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Highest supported multisample count (power of two, at least 1)
    pub maximum_number_of_multisamples: u8,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            maximum_number_of_multisamples: 8,
        }
    }
}

/// Graphics device trait
///
/// Implemented by backend-specific devices. GPU objects are returned as
/// `Arc`s; the `Arc` strong count is the GPU-level reference count and the
/// object is destroyed when the last clone is dropped.
///
/// The device is shared as `Arc<Mutex<dyn GraphicsDevice>>` between the
/// render pass, render target texture and framebuffer managers.
pub trait GraphicsDevice: Send + Sync {
    /// Hardware limits
    fn capabilities(&self) -> &Capabilities;

    /// Create a texture (render target textures are never initialized with data)
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a render pass describing attachment formats and sample count
    fn create_render_pass(&mut self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>>;

    /// Create a framebuffer render target from texture attachments
    ///
    /// The returned framebuffer keeps its attachment textures alive.
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn RenderTarget>>;

    /// Submit a recorded command buffer for execution
    fn dispatch_command_buffer(&mut self, command_buffer: &CommandBuffer) -> Result<()>;

    /// Present a swapchain render target
    fn present(&mut self, render_target: &dyn RenderTarget) -> Result<()>;
}

/// Lock a shared device, mapping a poisoned lock to `Error::BackendError`
pub fn lock_device(
    device: &Arc<Mutex<dyn GraphicsDevice>>,
) -> Result<MutexGuard<'_, dyn GraphicsDevice + 'static>> {
    device.lock()
        .map_err(|_| Error::BackendError("GraphicsDevice lock poisoned".to_string()))
}
