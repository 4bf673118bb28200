/// Renderer runtime - owns everything compositor workspace instances share.
///
/// One graphics device, one resource streamer, one pass factory, the node
/// and workspace resource managers and the global material properties.
/// There is no process-wide instance: applications create and own a
/// `RendererRuntime` explicitly.

use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::{engine_debug, engine_info};
use crate::compositor_node::{CompositorNodeResourceManager, CompositorPassFactory, DefaultCompositorPassFactory};
use crate::compositor_workspace::{CompositorWorkspaceInstance, CompositorWorkspaceResourceManager};
use crate::graphics_device::{lock_device, GraphicsDevice};
use crate::material::MaterialProperties;
use crate::resource::{AssetId, AssetSource, ResourceStreamer};

/// Runtime configuration, applied to every new workspace instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Multisample count of multisample capable render target textures (1 = no MSAA)
    pub number_of_multisamples: u8,
    /// Scale of render target textures sized relative to the main render target
    pub resolution_scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_of_multisamples: 1,
            resolution_scale: 1.0,
        }
    }
}

pub struct RendererRuntime {
    config: Config,
    device: Arc<Mutex<dyn GraphicsDevice>>,
    compositor_pass_factory: Arc<dyn CompositorPassFactory>,
    compositor_node_resource_manager: Arc<Mutex<CompositorNodeResourceManager>>,
    compositor_workspace_resource_manager: Arc<Mutex<CompositorWorkspaceResourceManager>>,
    global_material_properties: Arc<Mutex<MaterialProperties>>,
}

impl RendererRuntime {
    /// Start the resource streamer over `asset_source` and set up the managers
    ///
    /// # Errors
    ///
    /// `Error::InitializationFailed` when `config` is not supported by the
    /// device or the streamer thread cannot be started.
    pub fn new(
        device: Arc<Mutex<dyn GraphicsDevice>>,
        asset_source: Arc<dyn AssetSource>,
        config: Config,
    ) -> Result<Self> {
        let maximum_number_of_multisamples = lock_device(&device)?.capabilities().maximum_number_of_multisamples;
        if !config.number_of_multisamples.is_power_of_two()
            || config.number_of_multisamples > maximum_number_of_multisamples
        {
            return Err(Error::InitializationFailed(format!(
                "Unsupported number of multisamples {} (device maximum {})",
                config.number_of_multisamples, maximum_number_of_multisamples
            )));
        }
        if !(config.resolution_scale.is_finite() && config.resolution_scale > 0.0) {
            return Err(Error::InitializationFailed(format!(
                "Invalid resolution scale {}", config.resolution_scale
            )));
        }

        let resource_streamer = Arc::new(ResourceStreamer::new(asset_source)?);
        let compositor_pass_factory: Arc<dyn CompositorPassFactory> = Arc::new(DefaultCompositorPassFactory::new());

        engine_info!("nebula::RendererRuntime",
            "Renderer runtime created ({} multisamples, resolution scale {})",
            config.number_of_multisamples, config.resolution_scale);

        Ok(Self {
            config,
            device,
            compositor_node_resource_manager: Arc::new(Mutex::new(CompositorNodeResourceManager::new(
                resource_streamer.clone(),
                compositor_pass_factory.clone(),
            ))),
            compositor_workspace_resource_manager: Arc::new(Mutex::new(
                CompositorWorkspaceResourceManager::new(resource_streamer),
            )),
            compositor_pass_factory,
            global_material_properties: Arc::new(Mutex::new(MaterialProperties::new())),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn device(&self) -> &Arc<Mutex<dyn GraphicsDevice>> {
        &self.device
    }

    pub fn compositor_pass_factory(&self) -> &Arc<dyn CompositorPassFactory> {
        &self.compositor_pass_factory
    }

    /// Install an application pass factory
    ///
    /// Already loaded compositor nodes are reloaded with it; workspace
    /// instances rebuild their graph once the reload finished.
    pub fn set_compositor_pass_factory(&mut self, compositor_pass_factory: Arc<dyn CompositorPassFactory>) -> Result<()> {
        self.compositor_pass_factory = compositor_pass_factory.clone();
        self.compositor_node_resource_manager.lock()
            .map_err(|_| Error::BackendError("CompositorNodeResourceManager lock poisoned".to_string()))?
            .set_compositor_pass_factory(compositor_pass_factory)
    }

    pub fn compositor_node_resource_manager(&self) -> &Arc<Mutex<CompositorNodeResourceManager>> {
        &self.compositor_node_resource_manager
    }

    pub fn compositor_workspace_resource_manager(&self) -> &Arc<Mutex<CompositorWorkspaceResourceManager>> {
        &self.compositor_workspace_resource_manager
    }

    /// Properties visible to every material, e.g. `GLOBAL_NUMBER_OF_MULTISAMPLES`
    pub fn global_material_properties(&self) -> &Arc<Mutex<MaterialProperties>> {
        &self.global_material_properties
    }

    /// Apply finished loads without blocking; call once per frame
    ///
    /// Returns the number of loads applied.
    pub fn update(&self) -> Result<usize> {
        let nodes = self.compositor_node_resource_manager.lock()
            .map_err(|_| Error::BackendError("CompositorNodeResourceManager lock poisoned".to_string()))?
            .dispatch();
        let workspaces = self.compositor_workspace_resource_manager.lock()
            .map_err(|_| Error::BackendError("CompositorWorkspaceResourceManager lock poisoned".to_string()))?
            .dispatch();
        Ok(nodes + workspaces)
    }

    /// Block until no load is in flight anymore
    pub fn flush_all_queues(&self) -> Result<()> {
        loop {
            let mut finished = self.compositor_workspace_resource_manager.lock()
                .map_err(|_| Error::BackendError("CompositorWorkspaceResourceManager lock poisoned".to_string()))?
                .flush();
            finished += self.compositor_node_resource_manager.lock()
                .map_err(|_| Error::BackendError("CompositorNodeResourceManager lock poisoned".to_string()))?
                .flush();
            if finished == 0 {
                return Ok(());
            }
            engine_debug!("nebula::RendererRuntime", "Flushed {} loads", finished);
        }
    }

    /// Start loading the workspace asset and create an instance of it
    ///
    /// The instance renders nothing until the workspace finished loading
    /// (see `update` and `flush_all_queues`).
    pub fn create_compositor_workspace_instance(&self, asset_id: AssetId) -> Result<CompositorWorkspaceInstance> {
        let compositor_workspace_resource_id = self.compositor_workspace_resource_manager.lock()
            .map_err(|_| Error::BackendError("CompositorWorkspaceResourceManager lock poisoned".to_string()))?
            .load_compositor_workspace_resource_by_asset_id(asset_id)?;

        let mut instance = CompositorWorkspaceInstance::new(
            self.device.clone(),
            self.compositor_workspace_resource_manager.clone(),
            self.compositor_node_resource_manager.clone(),
            self.global_material_properties.clone(),
            compositor_workspace_resource_id,
        );
        instance.set_number_of_multisamples(self.config.number_of_multisamples)?;
        instance.set_resolution_scale(self.config.resolution_scale)?;
        Ok(instance)
    }
}

#[cfg(test)]
#[path = "renderer_runtime_tests.rs"]
mod tests;
