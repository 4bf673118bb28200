//! Render target management of the compositor
//!
//! Framebuffers and render target textures are declared by compositor nodes
//! through structural signatures and shared by signature id: two nodes
//! declaring identical content get the same GPU object.

mod framebuffer_signature;
mod render_target_texture_signature;
mod render_pass_manager;
mod render_target_texture_manager;
mod framebuffer_manager;

pub use framebuffer_signature::{
    FramebufferSignature, FramebufferSignatureAttachment, FramebufferSignatureId,
    FramebufferSignatureRecord, MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS,
};
pub use render_target_texture_signature::{
    RenderTargetTextureSignature, RenderTargetTextureSignatureId,
    RenderTargetTextureSignatureRecord, RenderTargetTextureFlags,
};
pub use render_pass_manager::RenderPassManager;
pub use render_target_texture_manager::RenderTargetTextureManager;
pub use framebuffer_manager::{FramebufferManager, CompositorFramebufferId};
