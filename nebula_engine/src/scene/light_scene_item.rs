/// Light scene item - the main light handed to `CompositorWorkspaceInstance::execute`.

use glam::Vec3;

/// Kind of light source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightSceneItem {
    pub light_type: LightType,
    pub position: Vec3,
    /// Normalized direction the light travels (directional and spot lights)
    pub direction: Vec3,
    pub color: Vec3,
    /// Influence radius (point and spot lights)
    pub radius: f32,
}

impl LightSceneItem {
    /// A directional light such as the sun
    pub fn directional(direction: Vec3, color: Vec3) -> Self {
        Self {
            light_type: LightType::Directional,
            position: Vec3::ZERO,
            direction: direction.normalize_or_zero(),
            color,
            radius: 0.0,
        }
    }
}
