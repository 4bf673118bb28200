/// Shadow map pass: renders the shadow casters of a directional light into
/// cascades laid out side by side in the bound render target.
///
/// Later passes of the frame read the cascade matrices and split distances
/// through `CompositorContextData::shadow_map_output`.

use std::any::Any;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use crate::error::{Error, Result};
use crate::engine_err;
use crate::compositor_workspace::CompositorContextData;
use crate::graphics_device::{Command, CommandBuffer, Rect2D, RenderTarget, Viewport};
use crate::resource::{AssetId, INVALID_ASSET_ID};
use crate::scene::{CameraSceneItem, LightType, RenderableManagerKey};
use crate::utils::{string_id, BinaryWriter, StringId};
use super::scene::{aspect_ratio, gather_renderable_managers, DEFAULT_MATERIAL_TECHNIQUE_ID};
use super::{
    read_pass_payload, write_pass_payload, CompositorInstancePass, CompositorPassTypeId,
    CompositorResourcePass, CompositorResourcePassBase,
};

pub const MAXIMUM_NUMBER_OF_SHADOW_CASCADES: u8 = 4;

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ShadowMapPassRecord {
    minimum_render_queue_index: u8,
    maximum_render_queue_index: u8,
    material_technique_id: u32,
    texture_asset_id: u32,
    number_of_shadow_cascades: u8,
    cascade_split_lambda: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowMapResourcePass {
    pub base: CompositorResourcePassBase,
    pub minimum_render_queue_index: u8,
    pub maximum_render_queue_index: u8,
    pub material_technique_id: StringId,
    /// Render target texture holding the cascades
    pub texture_asset_id: AssetId,
    pub number_of_shadow_cascades: u8,
    /// Blend between uniform (0) and logarithmic (1) cascade splits
    pub cascade_split_lambda: f32,
}

impl ShadowMapResourcePass {
    pub const TYPE_ID: CompositorPassTypeId = string_id("ShadowMap");
}

impl Default for ShadowMapResourcePass {
    fn default() -> Self {
        Self {
            base: CompositorResourcePassBase::default(),
            minimum_render_queue_index: 0,
            maximum_render_queue_index: 255,
            material_technique_id: DEFAULT_MATERIAL_TECHNIQUE_ID,
            texture_asset_id: INVALID_ASSET_ID,
            number_of_shadow_cascades: MAXIMUM_NUMBER_OF_SHADOW_CASCADES,
            cascade_split_lambda: 0.99,
        }
    }
}

impl CompositorResourcePass for ShadowMapResourcePass {
    fn compositor_pass_type_id(&self) -> CompositorPassTypeId {
        Self::TYPE_ID
    }

    fn base(&self) -> &CompositorResourcePassBase {
        &self.base
    }

    fn deserialize(&mut self, bytes: &[u8]) -> Result<()> {
        let (base, record) = read_pass_payload::<ShadowMapPassRecord>(bytes)?;
        if record.number_of_shadow_cascades == 0 || record.number_of_shadow_cascades > MAXIMUM_NUMBER_OF_SHADOW_CASCADES {
            return Err(Error::InvalidAsset(format!(
                "Shadow map pass '{}' has {} cascades, expected 1 to {}",
                base.name, record.number_of_shadow_cascades, MAXIMUM_NUMBER_OF_SHADOW_CASCADES
            )));
        }
        if record.minimum_render_queue_index > record.maximum_render_queue_index {
            return Err(Error::InvalidAsset(format!(
                "Shadow map pass '{}' has an empty render queue index range", base.name
            )));
        }
        self.base = base;
        self.minimum_render_queue_index = record.minimum_render_queue_index;
        self.maximum_render_queue_index = record.maximum_render_queue_index;
        self.material_technique_id = record.material_technique_id;
        self.texture_asset_id = record.texture_asset_id;
        self.number_of_shadow_cascades = record.number_of_shadow_cascades;
        self.cascade_split_lambda = record.cascade_split_lambda.clamp(0.0, 1.0);
        Ok(())
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        write_pass_payload(writer, &self.base, &ShadowMapPassRecord {
            minimum_render_queue_index: self.minimum_render_queue_index,
            maximum_render_queue_index: self.maximum_render_queue_index,
            material_technique_id: self.material_technique_id,
            texture_asset_id: self.texture_asset_id,
            number_of_shadow_cascades: self.number_of_shadow_cascades,
            cascade_split_lambda: self.cascade_split_lambda,
        });
    }

    fn render_queue_index_range(&self) -> Option<(u8, u8)> {
        Some((self.minimum_render_queue_index, self.maximum_render_queue_index))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// What a shadow map pass produced this frame
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowMapOutput {
    pub texture_asset_id: AssetId,
    /// View space far distance of each cascade
    pub cascade_split_distances: Vec<f32>,
    /// World space to light clip space of each cascade
    pub world_space_to_clip_space: Vec<Mat4>,
}

/// Far distance of every cascade, blending uniform and logarithmic splits
pub fn compute_cascade_split_distances(near_z: f32, far_z: f32, number_of_cascades: u8, lambda: f32) -> Vec<f32> {
    let near_z = near_z.max(f32::EPSILON);
    (1..=number_of_cascades)
        .map(|cascade| {
            let p = cascade as f32 / number_of_cascades as f32;
            let logarithmic = near_z * (far_z / near_z).powf(p);
            let uniform = near_z + (far_z - near_z) * p;
            lambda * logarithmic + (1.0 - lambda) * uniform
        })
        .collect()
}

/// Orthographic light matrix enclosing the camera frustum slice `[near_z, far_z]`
fn cascade_world_space_to_clip_space(
    camera: &CameraSceneItem,
    aspect_ratio: f32,
    near_z: f32,
    far_z: f32,
    light_direction: Vec3,
) -> Mat4 {
    let slice = Mat4::perspective_rh(camera.fov_y, aspect_ratio, near_z, far_z) * camera.view_matrix();
    let clip_space_to_world_space = slice.inverse();

    let mut corners = [Vec3::ZERO; 8];
    for (index, corner) in corners.iter_mut().enumerate() {
        let x = if index & 1 == 0 { -1.0 } else { 1.0 };
        let y = if index & 2 == 0 { -1.0 } else { 1.0 };
        let z = if index & 4 == 0 { 0.0 } else { 1.0 };
        let world = clip_space_to_world_space * Vec4::new(x, y, z, 1.0);
        *corner = world.truncate() / world.w;
    }

    // Bounding sphere keeps the cascade size stable under camera rotation
    let center = corners.iter().copied().sum::<Vec3>() / corners.len() as f32;
    let radius = corners.iter()
        .map(|corner| corner.distance(center))
        .fold(0.0f32, f32::max)
        .max(f32::EPSILON);

    let up = if light_direction.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
    let view = Mat4::look_at_rh(center - light_direction * radius, center, up);
    let projection = Mat4::orthographic_rh(-radius, radius, -radius, radius, 0.0, 2.0 * radius);
    projection * view
}

pub struct ShadowMapInstancePass {
    name: String,
    /// Depth range of the full target viewport restored after the cascades
    depth_range: (f32, f32),
    minimum_render_queue_index: u8,
    maximum_render_queue_index: u8,
    material_technique_id: StringId,
    texture_asset_id: AssetId,
    number_of_shadow_cascades: u8,
    cascade_split_lambda: f32,
    gathered_renderable_managers: Vec<RenderableManagerKey>,
    shadow_map_output: Option<ShadowMapOutput>,
}

impl ShadowMapInstancePass {
    pub fn new(resource_pass: &ShadowMapResourcePass) -> Self {
        Self {
            name: resource_pass.base.name.clone(),
            depth_range: (resource_pass.base.minimum_depth, resource_pass.base.maximum_depth),
            minimum_render_queue_index: resource_pass.minimum_render_queue_index,
            maximum_render_queue_index: resource_pass.maximum_render_queue_index,
            material_technique_id: resource_pass.material_technique_id,
            texture_asset_id: resource_pass.texture_asset_id,
            number_of_shadow_cascades: resource_pass.number_of_shadow_cascades,
            cascade_split_lambda: resource_pass.cascade_split_lambda,
            gathered_renderable_managers: Vec::new(),
            shadow_map_output: None,
        }
    }

    /// Output of the last frame this pass rendered, `None` without camera or directional light
    pub fn shadow_map_output(&self) -> Option<&ShadowMapOutput> {
        self.shadow_map_output.as_ref()
    }
}

impl CompositorInstancePass for ShadowMapInstancePass {
    fn on_fill_command_buffer(
        &mut self,
        render_target: Option<&Arc<dyn RenderTarget>>,
        context: &mut CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        self.gathered_renderable_managers.clear();
        self.shadow_map_output = None;
        let render_target = render_target.ok_or_else(|| {
            engine_err!("nebula::ShadowMapInstancePass", "Shadow map pass '{}' has no render target", self.name)
        })?;
        let (Some(camera), Some(light)) = (context.camera, context.light) else {
            return Ok(());
        };
        if light.light_type != LightType::Directional {
            return Ok(());
        }

        gather_renderable_managers(
            context,
            self.minimum_render_queue_index,
            self.maximum_render_queue_index,
            &mut self.gathered_renderable_managers,
        );

        let camera_aspect_ratio = aspect_ratio(&**context.main_render_target);
        let cascade_split_distances = compute_cascade_split_distances(
            camera.near_z,
            camera.far_z,
            self.number_of_shadow_cascades,
            self.cascade_split_lambda,
        );
        let cascade_width = (render_target.width() / self.number_of_shadow_cascades as u32).max(1);
        let height = render_target.height();

        let mut world_space_to_clip_space = Vec::with_capacity(cascade_split_distances.len());
        let mut cascade_near_z = camera.near_z;
        for (cascade, &cascade_far_z) in cascade_split_distances.iter().enumerate() {
            let matrix = cascade_world_space_to_clip_space(
                camera,
                camera_aspect_ratio,
                cascade_near_z,
                cascade_far_z,
                light.direction,
            );
            let x = cascade as u32 * cascade_width;
            command_buffer.push(Command::SetViewport(Viewport {
                x: x as f32,
                y: 0.0,
                width: cascade_width as f32,
                height: height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            }));
            command_buffer.push(Command::SetScissor(Rect2D {
                x: x as i32,
                y: 0,
                width: cascade_width,
                height,
            }));
            command_buffer.push(Command::DrawRenderables {
                minimum_render_queue_index: self.minimum_render_queue_index,
                maximum_render_queue_index: self.maximum_render_queue_index,
                transparent_pass: false,
                material_technique_id: self.material_technique_id,
                renderable_managers: self.gathered_renderable_managers.clone(),
                world_space_to_clip_space: matrix,
                single_pass_stereo_instancing: false,
            });
            world_space_to_clip_space.push(matrix);
            cascade_near_z = cascade_far_z;
        }

        // Following passes on this target expect the whole target
        command_buffer.push(Command::SetViewport(Viewport {
            x: 0.0,
            y: 0.0,
            width: render_target.width() as f32,
            height: height as f32,
            min_depth: self.depth_range.0,
            max_depth: self.depth_range.1,
        }));
        command_buffer.push(Command::SetScissor(Rect2D {
            x: 0,
            y: 0,
            width: render_target.width(),
            height,
        }));

        let output = ShadowMapOutput {
            texture_asset_id: self.texture_asset_id,
            cascade_split_distances,
            world_space_to_clip_space,
        };
        context.shadow_map_output = Some(output.clone());
        self.shadow_map_output = Some(output);
        Ok(())
    }

    fn on_post_command_buffer_dispatch(&mut self) {
        self.gathered_renderable_managers.clear();
    }

    fn as_shadow_map(&self) -> Option<&ShadowMapInstancePass> {
        Some(self)
    }
}

#[cfg(test)]
#[path = "shadow_map_tests.rs"]
mod tests;
