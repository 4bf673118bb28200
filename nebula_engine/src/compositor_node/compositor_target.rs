/// A compositor target: where a list of passes renders to.

use crate::target::CompositorFramebufferId;
use crate::utils::StringId;
use super::pass::CompositorResourcePass;

/// Channel id (string id of the channel name)
pub type CompositorChannelId = StringId;

/// Binding of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositorTargetBinding {
    /// Renders into the workspace main render target
    Channel(CompositorChannelId),
    /// Renders into a framebuffer declared by the node
    Framebuffer(CompositorFramebufferId),
    /// Passes needing no bound render target (compute, copies)
    None,
}

/// Ordered passes sharing one binding
pub struct CompositorTarget {
    binding: CompositorTargetBinding,
    passes: Vec<Box<dyn CompositorResourcePass>>,
}

impl CompositorTarget {
    pub fn new(binding: CompositorTargetBinding) -> Self {
        Self {
            binding,
            passes: Vec::new(),
        }
    }

    pub fn binding(&self) -> CompositorTargetBinding {
        self.binding
    }

    pub fn compositor_channel_id(&self) -> Option<CompositorChannelId> {
        match self.binding {
            CompositorTargetBinding::Channel(id) => Some(id),
            _ => None,
        }
    }

    pub fn compositor_framebuffer_id(&self) -> Option<CompositorFramebufferId> {
        match self.binding {
            CompositorTargetBinding::Framebuffer(id) => Some(id),
            _ => None,
        }
    }

    pub fn add_pass(&mut self, pass: Box<dyn CompositorResourcePass>) {
        self.passes.push(pass);
    }

    /// Passes in execution order
    pub fn passes(&self) -> &[Box<dyn CompositorResourcePass>] {
        &self.passes
    }
}
