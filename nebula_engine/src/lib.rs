/*!
# Nebula Engine

Data-driven render compositor built on an abstract graphics device.

A compositor workspace is a sequence of compositor nodes loaded from binary
assets. Each node declares render target textures and framebuffers by
structural signature, so identical declarations share GPU objects, and
lists targets whose passes record commands once per frame.

## Architecture

- **GraphicsDevice**: factory for textures, render passes and framebuffers, command submission
- **RenderPassManager / RenderTargetTextureManager / FramebufferManager**: signature keyed GPU object sharing
- **CompositorPassFactory**: pass type id to resource pass / instance pass constructors
- **CompositorNodeInstance**: records the passes of one node
- **CompositorWorkspaceInstance**: builds the node graph and executes it every frame
- **RendererRuntime**: device, resource streaming and pass factory shared by workspace instances

Graphics backends implement the `graphics_device` traits.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod utils;
pub mod graphics_device;
pub mod scene;
pub mod material;
pub mod resource;
pub mod target;
pub mod compositor_node;
pub mod compositor_workspace;
mod renderer_runtime;

#[cfg(test)]
mod test_support;

// Main nebula namespace module
pub mod nebula {
    // Error types
    pub use crate::error::{Error, Result};

    // Process-wide logger slot
    pub use crate::engine::Engine;

    // Runtime
    pub use crate::renderer_runtime::{Config, RendererRuntime};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Graphics device contract
    pub mod render {
        pub use crate::graphics_device::*;
    }

    // Shared render targets
    pub mod target {
        pub use crate::target::*;
    }

    // Compositor nodes, passes and workspaces
    pub mod compositor {
        pub use crate::compositor_node::*;
        pub use crate::compositor_workspace::*;
    }

    // Resource streaming
    pub mod resource {
        pub use crate::resource::*;
    }

    // Scene collaborators
    pub mod scene {
        pub use crate::scene::*;
    }

    // Global material properties
    pub mod material {
        pub use crate::material::*;
    }

    pub mod utils {
        pub use crate::utils::*;
    }
}

// Re-export math library at crate root
pub use glam;
