/// Backend-agnostic command buffer filled by compositor passes
///
/// The compositor records high level commands; turning `DrawRenderables`
/// into individual draw calls is the backend's job.

use std::sync::Arc;
use bitflags::bitflags;
use glam::Mat4;
use crate::graphics_device::{RenderTarget, Texture};
use crate::scene::RenderableManagerKey;

/// Viewport for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// 2D rectangle (for scissor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

bitflags! {
    /// Buffers touched by a clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// One recorded command
#[derive(Clone)]
pub enum Command {
    /// Bind a render target for the following draws and clears
    SetGraphicsRenderTarget(Arc<dyn RenderTarget>),
    SetViewport(Viewport),
    SetScissor(Rect2D),
    /// Clear the bound render target
    Clear {
        flags: ClearFlags,
        color: [f32; 4],
        depth: f32,
        stencil: u32,
    },
    /// Resolve a multisampled framebuffer into a single sampled one
    ResolveMultisampleFramebuffer {
        destination: Arc<dyn RenderTarget>,
        source: Arc<dyn RenderTarget>,
    },
    /// Copy a whole texture
    CopyResource {
        destination: Arc<dyn Texture>,
        source: Arc<dyn Texture>,
    },
    /// Fill the mip chain of a texture from mip 0
    GenerateMipmaps(Arc<dyn Texture>),
    /// Run a compute material
    DispatchCompute {
        material_asset_id: u32,
        material_technique_id: u32,
        thread_group_count: [u32; 3],
    },
    /// Draw the renderables gathered for a render queue range
    DrawRenderables {
        minimum_render_queue_index: u8,
        maximum_render_queue_index: u8,
        transparent_pass: bool,
        material_technique_id: u32,
        renderable_managers: Vec<RenderableManagerKey>,
        world_space_to_clip_space: Mat4,
        single_pass_stereo_instancing: bool,
    },
    /// Render the debug GUI overlay
    DrawDebugGui,
    BeginDebugEvent(String),
    EndDebugEvent,
    SetDebugMarker(String),
}

impl Command {
    /// Short command name (for logs and GPU debuggers)
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetGraphicsRenderTarget(_) => "SetGraphicsRenderTarget",
            Command::SetViewport(_) => "SetViewport",
            Command::SetScissor(_) => "SetScissor",
            Command::Clear { .. } => "Clear",
            Command::ResolveMultisampleFramebuffer { .. } => "ResolveMultisampleFramebuffer",
            Command::CopyResource { .. } => "CopyResource",
            Command::GenerateMipmaps(_) => "GenerateMipmaps",
            Command::DispatchCompute { .. } => "DispatchCompute",
            Command::DrawRenderables { .. } => "DrawRenderables",
            Command::DrawDebugGui => "DrawDebugGui",
            Command::BeginDebugEvent(_) => "BeginDebugEvent",
            Command::EndDebugEvent => "EndDebugEvent",
            Command::SetDebugMarker(_) => "SetDebugMarker",
        }
    }
}

/// Ordered list of commands, reused every frame
#[derive(Default, Clone)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self { commands: Vec::new() }
    }

    /// Append a command
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Remove every command, keeping the allocation
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.commands.capacity()
    }

    /// Command names in recording order
    pub fn command_names(&self) -> Vec<&'static str> {
        self.commands.iter().map(Command::name).collect()
    }

    /// Open a named debug scope
    pub fn begin_debug_event(&mut self, name: &str) {
        self.push(Command::BeginDebugEvent(name.to_string()));
    }

    /// Close the innermost debug scope
    pub fn end_debug_event(&mut self) {
        self.push(Command::EndDebugEvent);
    }
}

#[cfg(test)]
#[path = "command_buffer_tests.rs"]
mod tests;
