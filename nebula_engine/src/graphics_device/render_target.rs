/// RenderTarget trait - something the compositor can render into
///
/// Either a swapchain image owned by the window layer, or a framebuffer
/// created from render target textures.

use std::sync::Arc;
use crate::graphics_device::{RenderPass, Texture};

/// Kind of render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTargetKind {
    /// Presentable swapchain image
    Swapchain,
    /// Offscreen framebuffer
    Framebuffer,
}

/// Render target trait
pub trait RenderTarget: Send + Sync {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Swapchain or framebuffer
    fn kind(&self) -> RenderTargetKind;
}

/// Identity comparison of two render targets (same GPU object)
pub fn is_same_render_target(a: &Arc<dyn RenderTarget>, b: &Arc<dyn RenderTarget>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// One texture view bound to a framebuffer slot
#[derive(Clone)]
pub struct FramebufferAttachment {
    pub texture: Arc<dyn Texture>,
    pub mipmap_index: u32,
    pub layer_index: u32,
}

/// Descriptor for creating a framebuffer
pub struct FramebufferDesc<'a> {
    /// The render pass this framebuffer is compatible with
    pub render_pass: &'a Arc<dyn RenderPass>,
    /// Color attachments, in attachment order
    pub color_attachments: Vec<FramebufferAttachment>,
    /// Optional depth/stencil attachment
    pub depth_stencil_attachment: Option<FramebufferAttachment>,
}

impl FramebufferDesc<'_> {
    /// Size of the framebuffer: the size of its first attachment at the bound mip level
    pub fn size(&self) -> (u32, u32) {
        self.color_attachments.first()
            .or(self.depth_stencil_attachment.as_ref())
            .map(|attachment| {
                let info = attachment.texture.info();
                (
                    (info.width >> attachment.mipmap_index).max(1),
                    (info.height >> attachment.mipmap_index).max(1),
                )
            })
            .unwrap_or((1, 1))
    }
}
