//! Scene collaborators of the compositor
//!
//! The compositor does not own a scene graph. It talks to one through these
//! contracts: culling into render queue index ranges, per-frame scene item
//! hooks, cameras, lights and the light buffer.

mod render_queue;
mod scene_item;
mod scene_culling_manager;
mod camera_scene_item;
mod light_scene_item;
mod light_buffer_manager;

pub use render_queue::{RenderableManagerKey, RenderQueueIndexRange, merge_render_queue_index_ranges};
pub use scene_item::SceneItem;
pub use scene_culling_manager::{SceneCullingManager, BruteForceCullingManager};
pub use camera_scene_item::CameraSceneItem;
pub use light_scene_item::{LightSceneItem, LightType};
pub use light_buffer_manager::LightBufferManager;
