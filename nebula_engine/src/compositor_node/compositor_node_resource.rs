/// Deserialized compositor node: channels, declared render target textures
/// and framebuffers, and the targets with their passes.

use crate::resource::AssetId;
use crate::target::{CompositorFramebufferId, FramebufferSignature, RenderTargetTextureSignature};
use super::{CompositorChannelId, CompositorTarget};

/// Render target texture declared by a node
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorRenderTargetTexture {
    pub asset_id: AssetId,
    pub signature: RenderTargetTextureSignature,
}

/// Framebuffer declared by a node
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorFramebuffer {
    pub compositor_framebuffer_id: CompositorFramebufferId,
    pub signature: FramebufferSignature,
}

/// Immutable once loaded; shared with node instances through an `Arc`
#[derive(Default)]
pub struct CompositorNodeResource {
    pub input_channels: Vec<CompositorChannelId>,
    pub render_target_textures: Vec<CompositorRenderTargetTexture>,
    pub framebuffers: Vec<CompositorFramebuffer>,
    pub targets: Vec<CompositorTarget>,
    pub output_channels: Vec<CompositorChannelId>,
}

impl CompositorNodeResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of passes over all targets
    pub fn number_of_passes(&self) -> usize {
        self.targets.iter().map(|target| target.passes().len()).sum()
    }

    /// Whether a declared framebuffer uses the render target texture `asset_id`
    pub fn is_render_target_texture_used_by_framebuffer(&self, asset_id: AssetId) -> bool {
        self.framebuffers.iter()
            .any(|framebuffer| framebuffer.signature.attachments().any(|attachment| attachment.texture_asset_id == asset_id))
    }
}
