/// Cache of render passes keyed by attachment formats and sample count.
///
/// Render passes are cheap and few, so they are never evicted: they live
/// until `clear()` or the manager is dropped.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_debug;
use crate::graphics_device::{lock_device, GraphicsDevice, RenderPass, RenderPassDesc, TextureFormat};
use crate::utils::{fnv1a_32, FNV1A_32_INITIAL_HASH};

/// Hashed in place of an absent depth/stencil format
const NO_DEPTH_STENCIL_FORMAT: u8 = 0xFF;

pub struct RenderPassManager {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    render_passes: FxHashMap<u32, Arc<dyn RenderPass>>,
}

impl RenderPassManager {
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>) -> Self {
        Self {
            device,
            render_passes: FxHashMap::default(),
        }
    }

    /// Return the cached render pass matching the arguments, creating it on first use
    pub fn get_or_create_render_pass(
        &mut self,
        color_formats: &[TextureFormat],
        depth_stencil_format: Option<TextureFormat>,
        number_of_multisamples: u8,
    ) -> Result<Arc<dyn RenderPass>> {
        let signature = Self::render_pass_signature(color_formats, depth_stencil_format, number_of_multisamples);
        if let Some(render_pass) = self.render_passes.get(&signature) {
            return Ok(render_pass.clone());
        }

        let desc = RenderPassDesc {
            color_formats: color_formats.to_vec(),
            depth_stencil_format,
            number_of_multisamples,
        };
        let render_pass = lock_device(&self.device)?.create_render_pass(&desc)?;
        engine_debug!("nebula::RenderPassManager",
            "Created render pass {:#010x} ({} color attachments, {} multisamples)",
            signature, color_formats.len(), number_of_multisamples);
        self.render_passes.insert(signature, render_pass.clone());
        Ok(render_pass)
    }

    fn render_pass_signature(
        color_formats: &[TextureFormat],
        depth_stencil_format: Option<TextureFormat>,
        number_of_multisamples: u8,
    ) -> u32 {
        let mut hash = fnv1a_32(&(color_formats.len() as u32).to_le_bytes(), FNV1A_32_INITIAL_HASH);
        for format in color_formats {
            hash = fnv1a_32(&[*format as u8], hash);
        }
        let depth_stencil = depth_stencil_format.map_or(NO_DEPTH_STENCIL_FORMAT, |format| format as u8);
        fnv1a_32(&[depth_stencil, number_of_multisamples], hash)
    }

    /// Number of cached render passes
    pub fn len(&self) -> usize {
        self.render_passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.render_passes.is_empty()
    }

    /// Drop every cached render pass
    pub fn clear(&mut self) {
        self.render_passes.clear();
    }
}

#[cfg(test)]
#[path = "render_pass_manager_tests.rs"]
mod tests;
