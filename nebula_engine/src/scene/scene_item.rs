/// Scene items with a per-frame hook run before the compositor records passes.

use crate::error::Result;
use crate::graphics_device::RenderTarget;
use super::CameraSceneItem;

/// An item of the scene that needs to run logic on frames where it is rendered
///
/// Culling managers collect the items to run; the workspace calls
/// `on_execute_on_rendering` once per collected item before filling passes.
/// Implementations use interior mutability for per-frame state.
pub trait SceneItem: Send + Sync {
    fn on_execute_on_rendering(
        &self,
        render_target: &dyn RenderTarget,
        camera: &CameraSceneItem,
    ) -> Result<()>;
}
