//! Compositor workspaces
//!
//! A workspace is a sequence of compositor nodes. Its instance owns the
//! managers shared by the nodes and executes them once per frame, each node
//! receiving the render target the previous one ended on.

pub mod loader;
mod compositor_context_data;
mod compositor_workspace_resource;
mod compositor_workspace_resource_manager;
mod compositor_workspace_instance;

pub use compositor_context_data::CompositorContextData;
pub use compositor_workspace_resource::CompositorWorkspaceResource;
pub use compositor_workspace_resource_manager::{
    CompositorWorkspaceResourceId, CompositorWorkspaceResourceManager,
};
pub use compositor_workspace_instance::CompositorWorkspaceInstance;
pub use loader::{read_compositor_workspace, write_compositor_workspace};
