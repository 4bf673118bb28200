/// Per workspace instance of a compositor node: one instance pass per
/// resource pass, plus the execution bookkeeping of each pass.

use std::sync::Arc;
use crate::error::Result;
use crate::{engine_trace, engine_warn};
use crate::compositor_workspace::CompositorContextData;
use crate::graphics_device::{
    is_same_render_target, Command, CommandBuffer, Rect2D, RenderTarget, Viewport,
};
use super::pass::{CompositorInstancePass, CompositorPassFactory, CompositorResourcePassBase};
use super::{CompositorNodeResource, CompositorTargetBinding};

struct InstancePassSlot {
    base: CompositorResourcePassBase,
    instance_pass: Box<dyn CompositorInstancePass>,
    /// Saturates instead of wrapping
    number_of_execution_requests: u32,
}

struct InstanceTarget {
    binding: CompositorTargetBinding,
    passes: Vec<InstancePassSlot>,
}

pub struct CompositorNodeInstance {
    compositor_node_resource: Arc<CompositorNodeResource>,
    targets: Vec<InstanceTarget>,
}

impl CompositorNodeInstance {
    /// Create the instance passes of every target through `compositor_pass_factory`
    ///
    /// Resource passes the factory cannot instantiate are left out with a warning.
    pub fn new(
        compositor_node_resource: Arc<CompositorNodeResource>,
        compositor_pass_factory: &dyn CompositorPassFactory,
    ) -> Self {
        let targets = compositor_node_resource.targets.iter()
            .map(|target| InstanceTarget {
                binding: target.binding(),
                passes: target.passes().iter()
                    .filter_map(|resource_pass| {
                        let instance_pass = compositor_pass_factory.create_compositor_instance_pass(resource_pass.as_ref());
                        if instance_pass.is_none() {
                            engine_warn!("nebula::CompositorNodeInstance",
                                "No instance pass for pass '{}' of type {:#010x}",
                                resource_pass.base().name, resource_pass.compositor_pass_type_id());
                        }
                        instance_pass.map(|instance_pass| InstancePassSlot {
                            base: resource_pass.base().clone(),
                            instance_pass,
                            number_of_execution_requests: 0,
                        })
                    })
                    .collect(),
            })
            .collect();

        Self {
            compositor_node_resource,
            targets,
        }
    }

    pub fn compositor_node_resource(&self) -> &Arc<CompositorNodeResource> {
        &self.compositor_node_resource
    }

    /// Instance passes in execution order
    pub fn instance_passes(&self) -> impl Iterator<Item = &dyn CompositorInstancePass> {
        self.targets.iter()
            .flat_map(|target| target.passes.iter())
            .map(|slot| slot.instance_pass.as_ref())
    }

    pub fn number_of_instance_passes(&self) -> usize {
        self.targets.iter().map(|target| target.passes.len()).sum()
    }

    /// Record every pass allowed to run this frame
    ///
    /// Returns the render target bound last, which the next node receives as
    /// input, or `render_target` itself when no pass bound one.
    pub fn fill_command_buffer(
        &mut self,
        render_target: &Arc<dyn RenderTarget>,
        context: &mut CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<Arc<dyn RenderTarget>> {
        let mut current_render_target: Option<Arc<dyn RenderTarget>> = None;
        let mut current_depth_range: Option<(f32, f32)> = None;

        for target in &mut self.targets {
            for slot in &mut target.passes {
                let execution_request = slot.number_of_execution_requests;
                slot.number_of_execution_requests = execution_request.saturating_add(1);
                if !slot.base.allows_execution(execution_request) {
                    engine_trace!("nebula::CompositorNodeInstance",
                        "Pass '{}' skipped (request {})", slot.base.name, execution_request);
                    continue;
                }

                let pass_render_target = match target.binding {
                    CompositorTargetBinding::Channel(_) => Some(context.main_render_target.clone()),
                    CompositorTargetBinding::Framebuffer(compositor_framebuffer_id) => Some(
                        context.framebuffer_manager.get_framebuffer_by_compositor_framebuffer_id(compositor_framebuffer_id)?,
                    ),
                    CompositorTargetBinding::None => None,
                };

                if let Some(pass_render_target) = &pass_render_target {
                    let switched = !current_render_target.as_ref()
                        .is_some_and(|current| is_same_render_target(current, pass_render_target));
                    if switched {
                        command_buffer.push(Command::SetGraphicsRenderTarget(pass_render_target.clone()));
                        current_render_target = Some(pass_render_target.clone());
                    }
                    let depth_range = (slot.base.minimum_depth, slot.base.maximum_depth);
                    if switched || current_depth_range != Some(depth_range) {
                        push_viewport_and_scissor(command_buffer, &**pass_render_target, depth_range);
                        current_depth_range = Some(depth_range);
                    }
                }

                command_buffer.begin_debug_event(&slot.base.name);
                slot.instance_pass.on_fill_command_buffer(pass_render_target.as_ref(), context, command_buffer)?;
                command_buffer.end_debug_event();
            }
        }

        Ok(current_render_target.unwrap_or_else(|| render_target.clone()))
    }

    /// Forward to every instance pass once the command buffer was submitted
    pub fn on_post_command_buffer_dispatch(&mut self) {
        for slot in self.targets.iter_mut().flat_map(|target| target.passes.iter_mut()) {
            slot.instance_pass.on_post_command_buffer_dispatch();
        }
    }
}

fn push_viewport_and_scissor(command_buffer: &mut CommandBuffer, render_target: &dyn RenderTarget, depth_range: (f32, f32)) {
    let (width, height) = (render_target.width(), render_target.height());
    command_buffer.push(Command::SetViewport(Viewport {
        x: 0.0,
        y: 0.0,
        width: width as f32,
        height: height as f32,
        min_depth: depth_range.0,
        max_depth: depth_range.1,
    }));
    command_buffer.push(Command::SetScissor(Rect2D {
        x: 0,
        y: 0,
        width,
        height,
    }));
}

#[cfg(test)]
#[path = "compositor_node_instance_tests.rs"]
mod tests;
