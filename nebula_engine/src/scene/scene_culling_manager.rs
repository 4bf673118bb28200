/// Culling into render queue index ranges.
///
/// A SceneCullingManager decides which renderable managers each scene pass
/// draws this frame, bucketed by the workspace's merged render queue ranges.

use std::sync::Arc;
use slotmap::SlotMap;
use crate::graphics_device::RenderTarget;
use super::{CameraSceneItem, RenderQueueIndexRange, RenderableManagerKey, SceneItem};

/// Strategy for gathering visible renderable managers
///
/// `&mut self` allows stateful implementations (e.g. caching)
/// to maintain state across frames.
pub trait SceneCullingManager: Send + Sync {
    /// Append visible renderable managers to every range containing their
    /// render queue index, and collect the scene items to run this frame.
    ///
    /// Ranges arrive with empty renderable lists.
    fn gather_render_queue_index_ranges_renderable_managers(
        &mut self,
        render_target: &dyn RenderTarget,
        camera: &CameraSceneItem,
        render_queue_index_ranges: &mut [RenderQueueIndexRange],
        scene_items_to_run_this_frame: &mut Vec<Arc<dyn SceneItem>>,
    );
}

/// Brute-force culling manager - every registered renderable manager is visible.
///
/// Suitable for small scenes or as a baseline for comparison.
#[derive(Default)]
pub struct BruteForceCullingManager {
    renderable_managers: SlotMap<RenderableManagerKey, u8>,
    scene_items: Vec<Arc<dyn SceneItem>>,
}

impl BruteForceCullingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a renderable manager drawn at `render_queue_index`
    pub fn add_renderable_manager(&mut self, render_queue_index: u8) -> RenderableManagerKey {
        self.renderable_managers.insert(render_queue_index)
    }

    /// Unregister a renderable manager. Returns false if the key is stale.
    pub fn remove_renderable_manager(&mut self, key: RenderableManagerKey) -> bool {
        self.renderable_managers.remove(key).is_some()
    }

    /// Register an item to run every rendered frame
    pub fn add_scene_item(&mut self, scene_item: Arc<dyn SceneItem>) {
        self.scene_items.push(scene_item);
    }

    pub fn renderable_manager_count(&self) -> usize {
        self.renderable_managers.len()
    }
}

impl SceneCullingManager for BruteForceCullingManager {
    fn gather_render_queue_index_ranges_renderable_managers(
        &mut self,
        _render_target: &dyn RenderTarget,
        _camera: &CameraSceneItem,
        render_queue_index_ranges: &mut [RenderQueueIndexRange],
        scene_items_to_run_this_frame: &mut Vec<Arc<dyn SceneItem>>,
    ) {
        for (key, &render_queue_index) in &self.renderable_managers {
            for range in render_queue_index_ranges.iter_mut() {
                if range.contains(render_queue_index) {
                    range.renderable_managers.push(key);
                }
            }
        }
        scene_items_to_run_this_frame.extend(self.scene_items.iter().cloned());
    }
}

#[cfg(test)]
#[path = "scene_culling_manager_tests.rs"]
mod tests;
