/// Shared helpers for unit tests (test builds only)

use std::sync::{Arc, Mutex};
use crate::compositor_node::{
    ClearResourcePass, CompositorChannelId, CompositorFramebuffer, CompositorNodeResource,
    CompositorRenderTargetTexture, CompositorTarget, CompositorTargetBinding,
    DebugGuiResourcePass, SceneResourcePass,
};
use crate::compositor_workspace::CompositorContextData;
use crate::graphics_device::mock_graphics_device::{MockDeviceLog, MockGraphicsDevice, MockRenderTarget};
use crate::graphics_device::{RenderTarget, Texture, TextureFormat};
use crate::log::{Logger, LogEntry};
use crate::resource::AssetId;
use crate::scene::RenderQueueIndexRange;
use crate::target::{
    CompositorFramebufferId, FramebufferManager, FramebufferSignature, FramebufferSignatureAttachment,
    RenderPassManager, RenderTargetTextureFlags, RenderTargetTextureManager, RenderTargetTextureSignature,
};
use crate::utils::string_id;

/// Logger that keeps every entry it receives
pub struct CapturingLogger {
    pub entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CapturingLogger {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Entries logged under `source`, in order
    pub fn from_source(entries: &Arc<Mutex<Vec<LogEntry>>>, source: &str) -> Vec<LogEntry> {
        entries.lock().unwrap()
            .iter()
            .filter(|entry| entry.source == source)
            .cloned()
            .collect()
    }
}

impl Logger for CapturingLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

/// Managers and main render target needed to build a `CompositorContextData`
pub struct ContextFixture {
    pub main_render_target: Arc<dyn RenderTarget>,
    pub framebuffer_manager: FramebufferManager,
    pub render_target_texture_manager: RenderTargetTextureManager,
    pub render_pass_manager: RenderPassManager,
    pub render_queue_index_ranges: Vec<RenderQueueIndexRange>,
    pub log: MockDeviceLog,
}

impl ContextFixture {
    /// Empty managers on a mock device, main render target is a `width` x `height` swapchain
    pub fn new(width: u32, height: u32) -> Self {
        let (device, log) = MockGraphicsDevice::shared();
        Self {
            main_render_target: Arc::new(MockRenderTarget::swapchain(width, height)),
            framebuffer_manager: FramebufferManager::new(device.clone()),
            render_target_texture_manager: RenderTargetTextureManager::new(device.clone()),
            render_pass_manager: RenderPassManager::new(device),
            render_queue_index_ranges: Vec::new(),
            log,
        }
    }

    /// Announce the render target textures and framebuffers of a node
    pub fn declare(&mut self, resource: &CompositorNodeResource) {
        for render_target_texture in &resource.render_target_textures {
            self.render_target_texture_manager
                .add_render_target_texture(render_target_texture.asset_id, &render_target_texture.signature);
        }
        for framebuffer in &resource.framebuffers {
            self.framebuffer_manager.add_framebuffer(framebuffer.compositor_framebuffer_id, &framebuffer.signature).unwrap();
        }
    }

    /// Create the framebuffer declared under `compositor_framebuffer_id`
    pub fn materialize_framebuffer(&mut self, compositor_framebuffer_id: CompositorFramebufferId) -> Arc<dyn RenderTarget> {
        self.framebuffer_manager.get_framebuffer_by_compositor_framebuffer_id_mut(
            compositor_framebuffer_id,
            &mut self.render_target_texture_manager,
            &mut self.render_pass_manager,
            &*self.main_render_target,
            1,
            1.0,
        ).unwrap()
    }

    /// Create the render target texture declared under `asset_id`
    pub fn materialize_texture(&mut self, asset_id: AssetId) -> Arc<dyn Texture> {
        self.render_target_texture_manager
            .get_texture_by_asset_id(asset_id, &*self.main_render_target, 1, 1.0)
            .unwrap()
            .0
    }

    pub fn context(&self) -> CompositorContextData<'_> {
        CompositorContextData::new(
            &self.main_render_target,
            &self.framebuffer_manager,
            &self.render_target_texture_manager,
            &self.render_queue_index_ranges,
        )
    }
}

pub const MAIN_CHANNEL: CompositorChannelId = string_id("Main");
pub const FORWARD_COLOR: AssetId = string_id("ForwardColor");
pub const FORWARD_DEPTH: AssetId = string_id("ForwardDepth");
pub const FORWARD_FRAMEBUFFER: CompositorFramebufferId = string_id("ForwardFramebuffer");

/// Forward node: opaque geometry into a multisample capable framebuffer,
/// then transparent geometry and the debug GUI straight into the main channel
pub fn forward_node_resource() -> CompositorNodeResource {
    let multisampled_target = RenderTargetTextureFlags::RENDER_TARGET
        | RenderTargetTextureFlags::SHADER_RESOURCE
        | RenderTargetTextureFlags::ALLOW_MULTISAMPLE;

    let mut resource = CompositorNodeResource::new();
    resource.input_channels.push(MAIN_CHANNEL);
    resource.render_target_textures.push(CompositorRenderTargetTexture {
        asset_id: FORWARD_COLOR,
        signature: RenderTargetTextureSignature::relative(TextureFormat::R16G16B16A16_FLOAT, multisampled_target),
    });
    resource.render_target_textures.push(CompositorRenderTargetTexture {
        asset_id: FORWARD_DEPTH,
        signature: RenderTargetTextureSignature::relative(TextureFormat::D32_FLOAT, multisampled_target),
    });
    resource.framebuffers.push(CompositorFramebuffer {
        compositor_framebuffer_id: FORWARD_FRAMEBUFFER,
        signature: FramebufferSignature::new(
            &[FramebufferSignatureAttachment::new(FORWARD_COLOR)],
            Some(FramebufferSignatureAttachment::new(FORWARD_DEPTH)),
        ),
    });

    let mut offscreen = CompositorTarget::new(CompositorTargetBinding::Framebuffer(FORWARD_FRAMEBUFFER));
    offscreen.add_pass(Box::new(ClearResourcePass::default()));
    offscreen.add_pass(Box::new(SceneResourcePass::new("Opaque", 0, 127)));
    resource.targets.push(offscreen);

    let mut main = CompositorTarget::new(CompositorTargetBinding::Channel(MAIN_CHANNEL));
    let mut transparent = SceneResourcePass::new("Transparent", 128, 255);
    transparent.transparent_pass = true;
    main.add_pass(Box::new(transparent));
    main.add_pass(Box::new(DebugGuiResourcePass::default()));
    resource.targets.push(main);

    resource.output_channels.push(MAIN_CHANNEL);
    resource
}
