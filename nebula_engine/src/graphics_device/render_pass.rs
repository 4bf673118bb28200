/// RenderPass trait - attachment formats and sample count of a framebuffer

use crate::graphics_device::TextureFormat;

/// Render pass trait
///
/// Framebuffers are created against a render pass and are only compatible
/// with passes of identical formats and sample count.
pub trait RenderPass: Send + Sync {
    /// Description the pass was created from
    fn desc(&self) -> &RenderPassDesc;
}

/// Descriptor for creating a render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPassDesc {
    /// Color attachment formats, in attachment order
    pub color_formats: Vec<TextureFormat>,
    /// Optional depth/stencil attachment format
    pub depth_stencil_format: Option<TextureFormat>,
    /// Number of multisamples shared by every attachment (1 = no MSAA)
    pub number_of_multisamples: u8,
}
