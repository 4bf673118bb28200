/// Per-frame execution context handed to every instance pass.

use std::sync::Arc;
use crate::compositor_node::ShadowMapOutput;
use crate::graphics_device::RenderTarget;
use crate::scene::{CameraSceneItem, LightSceneItem, RenderQueueIndexRange};
use crate::target::{FramebufferManager, RenderTargetTextureManager};

/// What passes may read while the workspace records a frame
///
/// Managers are read-only here: every framebuffer and render target texture
/// has been created before the first node fills the command buffer.
pub struct CompositorContextData<'a> {
    /// The render target given to `CompositorWorkspaceInstance::execute`
    pub main_render_target: &'a Arc<dyn RenderTarget>,
    pub framebuffer_manager: &'a FramebufferManager,
    pub render_target_texture_manager: &'a RenderTargetTextureManager,
    /// Merged ranges with this frame's culled renderable managers
    pub render_queue_index_ranges: &'a [RenderQueueIndexRange],
    pub camera: Option<&'a CameraSceneItem>,
    pub light: Option<&'a LightSceneItem>,
    pub single_pass_stereo_instancing: bool,
    /// Written by the shadow map pass, read by the passes after it
    pub shadow_map_output: Option<ShadowMapOutput>,
}

impl<'a> CompositorContextData<'a> {
    pub fn new(
        main_render_target: &'a Arc<dyn RenderTarget>,
        framebuffer_manager: &'a FramebufferManager,
        render_target_texture_manager: &'a RenderTargetTextureManager,
        render_queue_index_ranges: &'a [RenderQueueIndexRange],
    ) -> Self {
        Self {
            main_render_target,
            framebuffer_manager,
            render_target_texture_manager,
            render_queue_index_ranges,
            camera: None,
            light: None,
            single_pass_stereo_instancing: false,
            shadow_map_output: None,
        }
    }

    pub fn with_camera(mut self, camera: Option<&'a CameraSceneItem>) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_light(mut self, light: Option<&'a LightSceneItem>) -> Self {
        self.light = light;
        self
    }

    pub fn with_single_pass_stereo_instancing(mut self, single_pass_stereo_instancing: bool) -> Self {
        self.single_pass_stereo_instancing = single_pass_stereo_instancing;
        self
    }
}
