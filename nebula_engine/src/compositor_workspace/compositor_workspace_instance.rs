/// Compositor workspace instance - executes a workspace once per frame.
///
/// The node graph is (re)built whenever the workspace resource, or one of
/// its node resources, finished loading with new content. Until then
/// `execute` records nothing and returns `Ok(())`.
///
/// The instance owns the render pass, render target texture and framebuffer
/// managers shared by all of its nodes. Framebuffers and render target
/// textures are created lazily and recreated when the scaled main render
/// target size or the multisample count change.

use std::sync::{Arc, Mutex, MutexGuard};
use crate::error::{Error, Result};
use crate::{engine_bail, engine_debug, engine_error, engine_info};
use crate::compositor_node::{
    CompositorNodeInstance, CompositorNodeResource, CompositorNodeResourceId,
    CompositorNodeResourceManager, ShadowMapOutput,
};
use crate::graphics_device::{lock_device, CommandBuffer, GraphicsDevice, RenderTarget, RenderTargetKind};
use crate::material::{MaterialProperties, MaterialPropertyValue, GLOBAL_NUMBER_OF_MULTISAMPLES};
use crate::resource::LoadingState;
use crate::scene::{
    merge_render_queue_index_ranges, CameraSceneItem, LightBufferManager, LightSceneItem,
    RenderQueueIndexRange, SceneItem,
};
use crate::target::{FramebufferManager, RenderPassManager, RenderTargetTextureManager};
use super::{CompositorContextData, CompositorWorkspaceResourceId, CompositorWorkspaceResourceManager};

fn lock<'a, T: ?Sized>(mutex: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| Error::BackendError(format!("{} lock poisoned", name)))
}

/// Loading generations the current graph was built from
#[derive(Debug, Clone, PartialEq, Eq)]
struct GraphGenerations {
    compositor_workspace: u32,
    compositor_nodes: Vec<(CompositorNodeResourceId, u32)>,
}

/// Location of the shadow map pass: node index, pass index inside the node
type ShadowMapPassLocation = (usize, usize);

pub struct CompositorWorkspaceInstance {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    compositor_workspace_resource_manager: Arc<Mutex<CompositorWorkspaceResourceManager>>,
    compositor_node_resource_manager: Arc<Mutex<CompositorNodeResourceManager>>,
    global_material_properties: Arc<Mutex<MaterialProperties>>,
    compositor_workspace_resource_id: CompositorWorkspaceResourceId,

    // Settings
    number_of_multisamples: u8,
    resolution_scale: f32,
    light_buffer_manager: Option<Arc<Mutex<dyn LightBufferManager>>>,

    // Shared by every node of the workspace
    render_pass_manager: RenderPassManager,
    render_target_texture_manager: RenderTargetTextureManager,
    framebuffer_manager: FramebufferManager,

    // Graph
    graph_generations: Option<GraphGenerations>,
    compositor_node_resources: Vec<Arc<CompositorNodeResource>>,
    sequential_compositor_node_instances: Vec<CompositorNodeInstance>,
    render_queue_index_ranges: Vec<RenderQueueIndexRange>,
    shadow_map_pass_location: Option<ShadowMapPassLocation>,

    // Per frame
    command_buffer: CommandBuffer,
    scene_items_to_run_this_frame: Vec<Arc<dyn SceneItem>>,
    /// Scaled main render target size and multisample count the GPU objects were created for
    used_size_and_multisamples: Option<(u32, u32, u8)>,
    framebuffers_created: bool,
}

impl CompositorWorkspaceInstance {
    /// Instance of the workspace behind `compositor_workspace_resource_id`
    ///
    /// The workspace resource may still be loading.
    pub fn new(
        device: Arc<Mutex<dyn GraphicsDevice>>,
        compositor_workspace_resource_manager: Arc<Mutex<CompositorWorkspaceResourceManager>>,
        compositor_node_resource_manager: Arc<Mutex<CompositorNodeResourceManager>>,
        global_material_properties: Arc<Mutex<MaterialProperties>>,
        compositor_workspace_resource_id: CompositorWorkspaceResourceId,
    ) -> Self {
        Self {
            render_pass_manager: RenderPassManager::new(device.clone()),
            render_target_texture_manager: RenderTargetTextureManager::new(device.clone()),
            framebuffer_manager: FramebufferManager::new(device.clone()),
            device,
            compositor_workspace_resource_manager,
            compositor_node_resource_manager,
            global_material_properties,
            compositor_workspace_resource_id,
            number_of_multisamples: 1,
            resolution_scale: 1.0,
            light_buffer_manager: None,
            graph_generations: None,
            compositor_node_resources: Vec::new(),
            sequential_compositor_node_instances: Vec::new(),
            render_queue_index_ranges: Vec::new(),
            shadow_map_pass_location: None,
            command_buffer: CommandBuffer::new(),
            scene_items_to_run_this_frame: Vec::new(),
            used_size_and_multisamples: None,
            framebuffers_created: false,
        }
    }

    // ===== SETTINGS =====

    pub fn number_of_multisamples(&self) -> u8 {
        self.number_of_multisamples
    }

    /// Set the multisample count of multisample capable render target textures
    ///
    /// Must be a power of two between 1 and the device maximum. Takes effect
    /// on the next `execute`, which recreates the GPU objects.
    pub fn set_number_of_multisamples(&mut self, number_of_multisamples: u8) -> Result<()> {
        let maximum = lock_device(&self.device)?.capabilities().maximum_number_of_multisamples;
        if !number_of_multisamples.is_power_of_two() || number_of_multisamples > maximum {
            return Err(Error::InvalidResource(format!(
                "Invalid number of multisamples {} (power of two up to {} expected)",
                number_of_multisamples, maximum
            )));
        }
        self.number_of_multisamples = number_of_multisamples;
        Ok(())
    }

    pub fn resolution_scale(&self) -> f32 {
        self.resolution_scale
    }

    /// Scale applied to the size of render target textures allowing it
    pub fn set_resolution_scale(&mut self, resolution_scale: f32) -> Result<()> {
        if !(resolution_scale.is_finite() && resolution_scale > 0.0) {
            return Err(Error::InvalidResource(format!("Invalid resolution scale {}", resolution_scale)));
        }
        self.resolution_scale = resolution_scale;
        Ok(())
    }

    pub fn set_light_buffer_manager(&mut self, light_buffer_manager: Option<Arc<Mutex<dyn LightBufferManager>>>) {
        self.light_buffer_manager = light_buffer_manager;
    }

    // ===== ACCESSORS =====

    pub fn compositor_workspace_resource_id(&self) -> CompositorWorkspaceResourceId {
        self.compositor_workspace_resource_id
    }

    pub fn render_pass_manager(&self) -> &RenderPassManager {
        &self.render_pass_manager
    }

    pub fn render_target_texture_manager(&self) -> &RenderTargetTextureManager {
        &self.render_target_texture_manager
    }

    pub fn framebuffer_manager(&self) -> &FramebufferManager {
        &self.framebuffer_manager
    }

    /// Commands recorded by the last `execute`
    pub fn command_buffer(&self) -> &CommandBuffer {
        &self.command_buffer
    }

    pub fn sequential_compositor_node_instances(&self) -> &[CompositorNodeInstance] {
        &self.sequential_compositor_node_instances
    }

    /// Merged render queue ranges drawn by the scene passes of every node
    pub fn render_queue_index_ranges(&self) -> &[RenderQueueIndexRange] {
        &self.render_queue_index_ranges
    }

    pub fn is_graph_built(&self) -> bool {
        self.graph_generations.is_some()
    }

    /// Cascades rendered by the shadow map pass of the workspace, if any ran
    pub fn shadow_map_output(&self) -> Option<&ShadowMapOutput> {
        let (node_index, pass_index) = self.shadow_map_pass_location?;
        self.sequential_compositor_node_instances.get(node_index)?
            .instance_passes()
            .nth(pass_index)?
            .as_shadow_map()?
            .shadow_map_output()
    }

    // ===== GRAPH =====

    /// Rebuild the graph if the workspace or one of its nodes has new content
    ///
    /// Returns false while the workspace resource is not loaded.
    fn update_graph(&mut self) -> Result<bool> {
        let (loading_state, compositor_workspace_generation) = {
            let manager = lock(&self.compositor_workspace_resource_manager, "CompositorWorkspaceResourceManager")?;
            (
                manager.loading_state(self.compositor_workspace_resource_id),
                manager.loading_generation(self.compositor_workspace_resource_id).unwrap_or(0),
            )
        };
        if loading_state != Some(LoadingState::Loaded) {
            return Ok(false);
        }

        let up_to_date = match &self.graph_generations {
            Some(generations) if generations.compositor_workspace == compositor_workspace_generation => {
                let manager = lock(&self.compositor_node_resource_manager, "CompositorNodeResourceManager")?;
                generations.compositor_nodes.iter()
                    .all(|&(id, generation)| manager.loading_generation(id) == Some(generation))
            }
            _ => false,
        };
        if !up_to_date {
            self.on_loading_state_change()?;
        }
        Ok(true)
    }

    /// Build the node instances of the loaded workspace resource
    ///
    /// Node resources are loaded synchronously. Their render target textures
    /// and framebuffers are announced to the shared managers, replacing the
    /// declarations of the previous graph.
    fn on_loading_state_change(&mut self) -> Result<()> {
        self.destroy_graph()?;

        let (compositor_workspace_resource, compositor_workspace_generation) = {
            let manager = lock(&self.compositor_workspace_resource_manager, "CompositorWorkspaceResourceManager")?;
            let resource = manager.try_get_by_id(self.compositor_workspace_resource_id).cloned()
                .ok_or_else(|| Error::InvalidResource("Compositor workspace resource is not loaded".to_string()))?;
            (resource, manager.loading_generation(self.compositor_workspace_resource_id).unwrap_or(0))
        };

        let mut compositor_nodes = Vec::with_capacity(compositor_workspace_resource.compositor_node_asset_ids.len());
        let compositor_pass_factory = {
            let mut manager = lock(&self.compositor_node_resource_manager, "CompositorNodeResourceManager")?;
            for &asset_id in &compositor_workspace_resource.compositor_node_asset_ids {
                let id = manager.load_compositor_node_resource_by_asset_id(asset_id)?;
                manager.enforce_fully_loaded(id)?;
                let resource = manager.try_get_by_id(id).cloned()
                    .ok_or_else(|| Error::InvalidResource(format!("Compositor node {:#010x} is not loaded", asset_id)))?;
                compositor_nodes.push((id, manager.loading_generation(id).unwrap_or(0), resource));
            }
            manager.compositor_pass_factory().clone()
        };

        let mut render_queue_index_ranges = Vec::new();
        for (node_index, (_, _, resource)) in compositor_nodes.iter().enumerate() {
            self.declare_compositor_node(resource)?;
            self.compositor_node_resources.push(resource.clone());

            render_queue_index_ranges.extend(resource.targets.iter()
                .flat_map(|target| target.passes())
                .filter_map(|pass| pass.render_queue_index_range()));

            let node_instance = CompositorNodeInstance::new(resource.clone(), compositor_pass_factory.as_ref());
            for (pass_index, instance_pass) in node_instance.instance_passes().enumerate() {
                if instance_pass.as_shadow_map().is_none() {
                    continue;
                }
                if let Some((previous_node_index, _)) = self.shadow_map_pass_location {
                    engine_bail!("nebula::CompositorWorkspaceInstance",
                        "Second shadow map pass in node {} (first one in node {})", node_index, previous_node_index);
                }
                self.shadow_map_pass_location = Some((node_index, pass_index));
            }
            self.sequential_compositor_node_instances.push(node_instance);
        }
        self.render_queue_index_ranges = merge_render_queue_index_ranges(&render_queue_index_ranges);

        self.graph_generations = Some(GraphGenerations {
            compositor_workspace: compositor_workspace_generation,
            compositor_nodes: compositor_nodes.iter().map(|&(id, generation, _)| (id, generation)).collect(),
        });
        engine_info!("nebula::CompositorWorkspaceInstance",
            "Graph built with {} nodes and {} render queue index ranges",
            self.sequential_compositor_node_instances.len(), self.render_queue_index_ranges.len());
        Ok(())
    }

    /// Drop the node instances and release every declaration of the current graph
    fn destroy_graph(&mut self) -> Result<()> {
        self.sequential_compositor_node_instances.clear();
        self.render_queue_index_ranges.clear();
        self.shadow_map_pass_location = None;
        self.graph_generations = None;
        self.framebuffers_created = false;

        for resource in std::mem::take(&mut self.compositor_node_resources) {
            self.release_compositor_node_declarations(&resource, resource.framebuffers.len())?;
        }
        Ok(())
    }

    /// Announce the render target textures and framebuffers of a node to the shared managers
    ///
    /// On a framebuffer conflict the declarations of this node are withdrawn again.
    fn declare_compositor_node(&mut self, resource: &CompositorNodeResource) -> Result<()> {
        for render_target_texture in &resource.render_target_textures {
            self.render_target_texture_manager
                .add_render_target_texture(render_target_texture.asset_id, &render_target_texture.signature);
        }
        for (number_of_declared_framebuffers, framebuffer) in resource.framebuffers.iter().enumerate() {
            if let Err(error) = self.framebuffer_manager
                .add_framebuffer(framebuffer.compositor_framebuffer_id, &framebuffer.signature)
            {
                self.release_compositor_node_declarations(resource, number_of_declared_framebuffers)?;
                return Err(error);
            }
        }
        Ok(())
    }

    /// Withdraw the first `number_of_framebuffers` framebuffers and every render target texture of a node
    fn release_compositor_node_declarations(&mut self, resource: &CompositorNodeResource, number_of_framebuffers: usize) -> Result<()> {
        for framebuffer in &resource.framebuffers[..number_of_framebuffers] {
            self.framebuffer_manager.release_framebuffer_by_signature(&framebuffer.signature)?;
        }
        for render_target_texture in &resource.render_target_textures {
            self.render_target_texture_manager
                .release_render_target_texture_by_signature(render_target_texture.asset_id, &render_target_texture.signature)?;
        }
        Ok(())
    }

    /// Create every declared framebuffer, and the render target textures no framebuffer uses
    fn create_framebuffers_and_render_target_textures(&mut self, render_target: &dyn RenderTarget) -> Result<()> {
        for resource in &self.compositor_node_resources {
            for framebuffer in &resource.framebuffers {
                self.framebuffer_manager.get_framebuffer_by_compositor_framebuffer_id_mut(
                    framebuffer.compositor_framebuffer_id,
                    &mut self.render_target_texture_manager,
                    &mut self.render_pass_manager,
                    render_target,
                    self.number_of_multisamples,
                    self.resolution_scale,
                )?;
            }
            for render_target_texture in &resource.render_target_textures {
                if !resource.is_render_target_texture_used_by_framebuffer(render_target_texture.asset_id) {
                    self.render_target_texture_manager.get_texture_by_asset_id(
                        render_target_texture.asset_id,
                        render_target,
                        self.number_of_multisamples,
                        self.resolution_scale,
                    )?;
                }
            }
        }
        self.framebuffers_created = true;
        engine_debug!("nebula::CompositorWorkspaceInstance",
            "{} framebuffers and {} render target textures created",
            self.framebuffer_manager.number_of_materialized_framebuffers(),
            self.render_target_texture_manager.number_of_materialized_textures());
        Ok(())
    }

    // ===== EXECUTION =====

    /// Record and submit one frame rendered into `render_target`
    ///
    /// Does nothing while the workspace resource is not loaded. Without a
    /// camera no culling runs and scene passes draw nothing. Swapchain render
    /// targets are presented after submission.
    pub fn execute(
        &mut self,
        render_target: &Arc<dyn RenderTarget>,
        camera: Option<&CameraSceneItem>,
        light: Option<&LightSceneItem>,
        single_pass_stereo_instancing: bool,
    ) -> Result<()> {
        // Per-frame state from the previous frame must not survive, loaded or not
        self.command_buffer.clear();
        for range in &mut self.render_queue_index_ranges {
            range.renderable_managers.clear();
        }
        self.scene_items_to_run_this_frame.clear();

        if !self.update_graph()? {
            return Ok(());
        }

        lock(&self.global_material_properties, "MaterialProperties")?.set_property_by_id(
            GLOBAL_NUMBER_OF_MULTISAMPLES,
            MaterialPropertyValue::Integer(self.number_of_multisamples as i32),
        );

        // Held until presentation
        let render_target = render_target.clone();

        let scaled_width = ((render_target.width() as f32 * self.resolution_scale).ceil() as u32).max(1);
        let scaled_height = ((render_target.height() as f32 * self.resolution_scale).ceil() as u32).max(1);
        let size_and_multisamples = (scaled_width, scaled_height, self.number_of_multisamples);
        if self.used_size_and_multisamples.is_some_and(|used| used != size_and_multisamples) {
            engine_info!("nebula::CompositorWorkspaceInstance",
                "Recreating framebuffers and render target textures for {}x{} with {} multisamples",
                scaled_width, scaled_height, self.number_of_multisamples);
            self.framebuffer_manager.clear_rhi_resources();
            self.render_target_texture_manager.clear_rhi_resources();
            self.framebuffers_created = false;
        }
        self.used_size_and_multisamples = Some(size_and_multisamples);

        if !self.framebuffers_created {
            self.create_framebuffers_and_render_target_textures(&*render_target)?;
        }

        if let Some(camera) = camera {
            if let Some(culling_manager) = &camera.culling_manager {
                lock(culling_manager, "SceneCullingManager")?.gather_render_queue_index_ranges_renderable_managers(
                    &*render_target,
                    camera,
                    &mut self.render_queue_index_ranges,
                    &mut self.scene_items_to_run_this_frame,
                );
            }
            for scene_item in &self.scene_items_to_run_this_frame {
                scene_item.on_execute_on_rendering(&*render_target, camera)?;
            }
            if let Some(light_buffer_manager) = &self.light_buffer_manager {
                lock(light_buffer_manager, "LightBufferManager")?
                    .fill_buffer(&*render_target, camera, light, &mut self.command_buffer)?;
            }
        }

        let mut context = CompositorContextData::new(
            &render_target,
            &self.framebuffer_manager,
            &self.render_target_texture_manager,
            &self.render_queue_index_ranges,
        )
        .with_camera(camera)
        .with_light(light)
        .with_single_pass_stereo_instancing(single_pass_stereo_instancing);
        let mut node_render_target = render_target.clone();
        for node_instance in &mut self.sequential_compositor_node_instances {
            node_render_target = node_instance.fill_command_buffer(&node_render_target, &mut context, &mut self.command_buffer)?;
        }

        lock_device(&self.device)?.dispatch_command_buffer(&self.command_buffer)?;
        for node_instance in &mut self.sequential_compositor_node_instances {
            node_instance.on_post_command_buffer_dispatch();
        }
        if let Some(light_buffer_manager) = &self.light_buffer_manager {
            lock(light_buffer_manager, "LightBufferManager")?.on_post_command_buffer_dispatch();
        }

        if render_target.kind() == RenderTargetKind::Swapchain {
            lock_device(&self.device)?.present(&*render_target)?;
        }
        Ok(())
    }
}

impl Drop for CompositorWorkspaceInstance {
    fn drop(&mut self) {
        if let Err(error) = self.destroy_graph() {
            engine_error!("nebula::CompositorWorkspaceInstance", "Releasing the graph failed: {}", error);
        }
    }
}

#[cfg(test)]
#[path = "compositor_workspace_instance_tests.rs"]
mod tests;
