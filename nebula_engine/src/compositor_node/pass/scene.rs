/// Scene pass: draws the renderables of a render queue index range.

use std::any::Any;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use crate::error::{Error, Result};
use crate::engine_err;
use crate::compositor_workspace::CompositorContextData;
use crate::graphics_device::{Command, CommandBuffer, RenderTarget};
use crate::scene::RenderableManagerKey;
use crate::utils::{string_id, BinaryWriter, StringId};
use super::{
    read_pass_payload, write_pass_payload, CompositorInstancePass, CompositorPassTypeId,
    CompositorResourcePass, CompositorResourcePassBase,
};

/// Material technique used when a scene pass names none
pub const DEFAULT_MATERIAL_TECHNIQUE_ID: StringId = string_id("Default");

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ScenePassRecord {
    minimum_render_queue_index: u8,
    maximum_render_queue_index: u8,
    transparent_pass: u8,
    material_technique_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneResourcePass {
    pub base: CompositorResourcePassBase,
    /// Inclusive render queue index range
    pub minimum_render_queue_index: u8,
    pub maximum_render_queue_index: u8,
    /// Transparent passes draw back to front
    pub transparent_pass: bool,
    pub material_technique_id: StringId,
}

impl SceneResourcePass {
    pub const TYPE_ID: CompositorPassTypeId = string_id("Scene");

    pub fn new(name: &str, minimum_render_queue_index: u8, maximum_render_queue_index: u8) -> Self {
        Self {
            base: CompositorResourcePassBase::with_name(name),
            minimum_render_queue_index,
            maximum_render_queue_index,
            ..Self::default()
        }
    }
}

impl Default for SceneResourcePass {
    fn default() -> Self {
        Self {
            base: CompositorResourcePassBase::default(),
            minimum_render_queue_index: 0,
            maximum_render_queue_index: 255,
            transparent_pass: false,
            material_technique_id: DEFAULT_MATERIAL_TECHNIQUE_ID,
        }
    }
}

impl CompositorResourcePass for SceneResourcePass {
    fn compositor_pass_type_id(&self) -> CompositorPassTypeId {
        Self::TYPE_ID
    }

    fn base(&self) -> &CompositorResourcePassBase {
        &self.base
    }

    fn deserialize(&mut self, bytes: &[u8]) -> Result<()> {
        let (base, record) = read_pass_payload::<ScenePassRecord>(bytes)?;
        if record.minimum_render_queue_index > record.maximum_render_queue_index {
            return Err(Error::InvalidAsset(format!(
                "Scene pass '{}' has an empty render queue index range {}..={}",
                base.name, record.minimum_render_queue_index, record.maximum_render_queue_index
            )));
        }
        self.base = base;
        self.minimum_render_queue_index = record.minimum_render_queue_index;
        self.maximum_render_queue_index = record.maximum_render_queue_index;
        self.transparent_pass = record.transparent_pass != 0;
        self.material_technique_id = record.material_technique_id;
        Ok(())
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        write_pass_payload(writer, &self.base, &ScenePassRecord {
            minimum_render_queue_index: self.minimum_render_queue_index,
            maximum_render_queue_index: self.maximum_render_queue_index,
            transparent_pass: self.transparent_pass as u8,
            material_technique_id: self.material_technique_id,
        });
    }

    fn render_queue_index_range(&self) -> Option<(u8, u8)> {
        Some((self.minimum_render_queue_index, self.maximum_render_queue_index))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Append the renderable managers culled into every merged range overlapping `[minimum, maximum]`
pub(crate) fn gather_renderable_managers(
    context: &CompositorContextData<'_>,
    minimum_render_queue_index: u8,
    maximum_render_queue_index: u8,
    renderable_managers: &mut Vec<RenderableManagerKey>,
) {
    for range in context.render_queue_index_ranges {
        if range.minimum_render_queue_index <= maximum_render_queue_index
            && range.maximum_render_queue_index >= minimum_render_queue_index
        {
            renderable_managers.extend_from_slice(&range.renderable_managers);
        }
    }
}

/// Aspect ratio of a render target, 1 for degenerate sizes
pub(crate) fn aspect_ratio(render_target: &dyn RenderTarget) -> f32 {
    if render_target.height() == 0 {
        1.0
    } else {
        render_target.width() as f32 / render_target.height() as f32
    }
}

pub struct SceneInstancePass {
    name: String,
    minimum_render_queue_index: u8,
    maximum_render_queue_index: u8,
    transparent_pass: bool,
    material_technique_id: StringId,
    /// Only valid until the command buffer was dispatched
    gathered_renderable_managers: Vec<RenderableManagerKey>,
}

impl SceneInstancePass {
    pub fn new(resource_pass: &SceneResourcePass) -> Self {
        Self {
            name: resource_pass.base.name.clone(),
            minimum_render_queue_index: resource_pass.minimum_render_queue_index,
            maximum_render_queue_index: resource_pass.maximum_render_queue_index,
            transparent_pass: resource_pass.transparent_pass,
            material_technique_id: resource_pass.material_technique_id,
            gathered_renderable_managers: Vec::new(),
        }
    }

    /// Renderable managers drawn this frame
    pub fn gathered_renderable_managers(&self) -> &[RenderableManagerKey] {
        &self.gathered_renderable_managers
    }
}

impl CompositorInstancePass for SceneInstancePass {
    fn on_fill_command_buffer(
        &mut self,
        render_target: Option<&Arc<dyn RenderTarget>>,
        context: &mut CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        // Gathered again every frame, also after a frame that failed before dispatch
        self.gathered_renderable_managers.clear();
        let render_target = render_target.ok_or_else(|| {
            engine_err!("nebula::SceneInstancePass", "Scene pass '{}' has no render target", self.name)
        })?;
        // Nothing to draw without a viewpoint
        let Some(camera) = context.camera else {
            return Ok(());
        };

        gather_renderable_managers(
            context,
            self.minimum_render_queue_index,
            self.maximum_render_queue_index,
            &mut self.gathered_renderable_managers,
        );
        command_buffer.push(Command::DrawRenderables {
            minimum_render_queue_index: self.minimum_render_queue_index,
            maximum_render_queue_index: self.maximum_render_queue_index,
            transparent_pass: self.transparent_pass,
            material_technique_id: self.material_technique_id,
            renderable_managers: self.gathered_renderable_managers.clone(),
            world_space_to_clip_space: camera.world_space_to_clip_space(aspect_ratio(&**render_target)),
            single_pass_stereo_instancing: context.single_pass_stereo_instancing,
        });
        Ok(())
    }

    fn on_post_command_buffer_dispatch(&mut self) {
        self.gathered_renderable_managers.clear();
    }
}
