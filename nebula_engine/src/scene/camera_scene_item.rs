/// Camera scene item - viewpoint handed to `CompositorWorkspaceInstance::execute`.

use std::sync::{Arc, Mutex};
use glam::{Mat4, Quat, Vec3};
use super::SceneCullingManager;

/// Perspective camera placed in the scene
///
/// The culling manager is optional: without one, scene passes draw nothing
/// but the rest of the compositor graph still runs.
#[derive(Clone)]
pub struct CameraSceneItem {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near_z: f32,
    pub far_z: f32,
    pub culling_manager: Option<Arc<Mutex<dyn SceneCullingManager>>>,
}

impl Default for CameraSceneItem {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: std::f32::consts::FRAC_PI_4,
            near_z: 0.1,
            far_z: 500.0,
            culling_manager: None,
        }
    }
}

impl CameraSceneItem {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Self::default()
        }
    }

    pub fn with_culling_manager(mut self, culling_manager: Arc<Mutex<dyn SceneCullingManager>>) -> Self {
        self.culling_manager = Some(culling_manager);
        self
    }

    /// Viewing direction (-Z in camera space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// World space to view space
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// View space to clip space for the given width/height ratio
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect_ratio, self.near_z, self.far_z)
    }

    /// Combined view-projection matrix (projection * view)
    pub fn world_space_to_clip_space(&self, aspect_ratio: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio) * self.view_matrix()
    }
}

#[cfg(test)]
#[path = "camera_scene_item_tests.rs"]
mod tests;
