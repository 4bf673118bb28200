/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Records every created texture, render pass and framebuffer, every
/// dispatched command buffer and every present, so managers and the
/// compositor can be tested without a graphics backend.

use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    GraphicsDevice, Capabilities,
    Texture, TextureDesc, TextureInfo,
    RenderPass, RenderPassDesc,
    RenderTarget, RenderTargetKind, FramebufferDesc, FramebufferAttachment,
    CommandBuffer,
};

// ============================================================================
// Mock Texture
// ============================================================================

pub struct MockTexture {
    pub info: TextureInfo,
    pub name: String,
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

// ============================================================================
// Mock RenderPass
// ============================================================================

pub struct MockRenderPass {
    pub desc: RenderPassDesc,
}

impl RenderPass for MockRenderPass {
    fn desc(&self) -> &RenderPassDesc {
        &self.desc
    }
}

// ============================================================================
// Mock RenderTarget
// ============================================================================

pub struct MockRenderTarget {
    pub width: u32,
    pub height: u32,
    pub kind: RenderTargetKind,
    /// Attachments kept alive by a mock framebuffer
    pub color_attachments: Vec<FramebufferAttachment>,
    pub depth_stencil_attachment: Option<FramebufferAttachment>,
}

impl MockRenderTarget {
    /// A swapchain image of the given size
    pub fn swapchain(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            kind: RenderTargetKind::Swapchain,
            color_attachments: Vec::new(),
            depth_stencil_attachment: None,
        }
    }
}

impl RenderTarget for MockRenderTarget {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn kind(&self) -> RenderTargetKind {
        self.kind
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Everything a mock device has been asked to do, shareable with the test
#[derive(Clone, Default)]
pub struct MockDeviceLog {
    pub created_textures: Arc<Mutex<Vec<TextureDesc>>>,
    pub created_render_passes: Arc<Mutex<Vec<RenderPassDesc>>>,
    /// (width, height) of each created framebuffer
    pub created_framebuffers: Arc<Mutex<Vec<(u32, u32)>>>,
    /// Command names of each dispatched command buffer
    pub dispatched_command_buffers: Arc<Mutex<Vec<Vec<&'static str>>>>,
    pub presented: Arc<Mutex<u32>>,
}

impl MockDeviceLog {
    pub fn texture_count(&self) -> usize {
        self.created_textures.lock().unwrap().len()
    }

    pub fn render_pass_count(&self) -> usize {
        self.created_render_passes.lock().unwrap().len()
    }

    pub fn framebuffer_count(&self) -> usize {
        self.created_framebuffers.lock().unwrap().len()
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatched_command_buffers.lock().unwrap().len()
    }

    pub fn present_count(&self) -> u32 {
        *self.presented.lock().unwrap()
    }

    pub fn last_texture(&self) -> Option<TextureDesc> {
        self.created_textures.lock().unwrap().last().cloned()
    }
}

/// Mock device that tracks created resources without GPU
pub struct MockGraphicsDevice {
    pub capabilities: Capabilities,
    pub log: MockDeviceLog,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            capabilities: Capabilities::default(),
            log: MockDeviceLog::default(),
        }
    }

    /// Build a shared device and keep a handle on its log
    pub fn shared() -> (Arc<Mutex<dyn GraphicsDevice>>, MockDeviceLog) {
        let device = Self::new();
        let log = device.log.clone();
        (Arc::new(Mutex::new(device)), log)
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture>> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!("nebula::mock", "create_texture: zero sized texture '{}'", desc.debug_name);
        }
        if desc.number_of_multisamples > self.capabilities.maximum_number_of_multisamples {
            engine_bail!("nebula::mock",
                "create_texture: {} multisamples above device maximum {}",
                desc.number_of_multisamples, self.capabilities.maximum_number_of_multisamples);
        }
        self.log.created_textures.lock().unwrap().push(desc.clone());
        Ok(Arc::new(MockTexture {
            info: TextureInfo {
                width: desc.width,
                height: desc.height,
                format: desc.format,
                usage: desc.usage,
                number_of_multisamples: desc.number_of_multisamples,
                mip_levels: desc.mip_levels,
            },
            name: desc.debug_name.clone(),
        }))
    }

    fn create_render_pass(&mut self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>> {
        self.log.created_render_passes.lock().unwrap().push(desc.clone());
        Ok(Arc::new(MockRenderPass { desc: desc.clone() }))
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn RenderTarget>> {
        let pass_desc = desc.render_pass.desc();
        if pass_desc.color_formats.len() != desc.color_attachments.len() {
            engine_bail!("nebula::mock",
                "create_framebuffer: {} color attachments for a render pass with {}",
                desc.color_attachments.len(), pass_desc.color_formats.len());
        }
        for attachment in desc.color_attachments.iter().chain(desc.depth_stencil_attachment.iter()) {
            let info = attachment.texture.info();
            if info.number_of_multisamples != pass_desc.number_of_multisamples {
                engine_bail!("nebula::mock",
                    "create_framebuffer: attachment with {} multisamples in a {} multisample render pass",
                    info.number_of_multisamples, pass_desc.number_of_multisamples);
            }
            if attachment.mipmap_index >= info.mip_levels {
                engine_bail!("nebula::mock",
                    "create_framebuffer: mip {} out of range (mip_levels = {})",
                    attachment.mipmap_index, info.mip_levels);
            }
        }
        let (width, height) = desc.size();
        self.log.created_framebuffers.lock().unwrap().push((width, height));
        Ok(Arc::new(MockRenderTarget {
            width,
            height,
            kind: RenderTargetKind::Framebuffer,
            color_attachments: desc.color_attachments.clone(),
            depth_stencil_attachment: desc.depth_stencil_attachment.clone(),
        }))
    }

    fn dispatch_command_buffer(&mut self, command_buffer: &CommandBuffer) -> Result<()> {
        self.log.dispatched_command_buffers.lock().unwrap().push(command_buffer.command_names());
        Ok(())
    }

    fn present(&mut self, render_target: &dyn RenderTarget) -> Result<()> {
        if render_target.kind() != RenderTargetKind::Swapchain {
            engine_bail!("nebula::mock", "present: render target is not a swapchain");
        }
        *self.log.presented.lock().unwrap() += 1;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
