//! Compositor nodes
//!
//! A node declares the render target textures and framebuffers it renders
//! into and lists its targets, each a sequence of passes. Nodes are loaded
//! from assets as `CompositorNodeResource`s and instantiated per workspace
//! instance as `CompositorNodeInstance`s.

pub mod pass;
pub mod loader;
mod compositor_target;
mod compositor_node_resource;
mod compositor_node_resource_manager;
mod compositor_node_instance;

pub use compositor_target::{CompositorChannelId, CompositorTarget, CompositorTargetBinding};
pub use compositor_node_resource::{
    CompositorFramebuffer, CompositorNodeResource, CompositorRenderTargetTexture,
};
pub use compositor_node_resource_manager::{CompositorNodeResourceId, CompositorNodeResourceManager};
pub use compositor_node_instance::CompositorNodeInstance;
pub use loader::{read_compositor_node, write_compositor_node};
pub use pass::{
    CompositorInstancePass, CompositorPassFactory, CompositorPassTypeId, CompositorResourcePass,
    CompositorResourcePassBase, DefaultCompositorPassFactory,
    ClearResourcePass, ClearInstancePass,
    SceneResourcePass, SceneInstancePass,
    ShadowMapResourcePass, ShadowMapInstancePass, ShadowMapOutput,
    ResolveMultisampleResourcePass, ResolveMultisampleInstancePass,
    CopyResourcePass, CopyInstancePass,
    GenerateMipmapsResourcePass, GenerateMipmapsInstancePass,
    ComputeResourcePass, ComputeInstancePass,
    DebugGuiResourcePass, DebugGuiInstancePass,
    UNLIMITED_NUMBER_OF_EXECUTIONS,
};
