/// Framebuffers declared by compositor nodes, shared by signature.
///
/// Nodes refer to framebuffers through compositor framebuffer ids; several
/// ids may alias one signature, and identical signatures share one element
/// and one GPU framebuffer.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::{engine_bail, engine_debug, engine_err};
use crate::graphics_device::{
    lock_device, FramebufferAttachment, FramebufferDesc, GraphicsDevice, RenderTarget,
};
use crate::utils::StringId;
use super::{
    FramebufferSignature, FramebufferSignatureAttachment, FramebufferSignatureId,
    RenderPassManager, RenderTargetTextureManager,
};

/// Id under which a compositor node declares a framebuffer (string id of its name)
pub type CompositorFramebufferId = StringId;

struct FramebufferElement {
    signature: FramebufferSignature,
    /// `None` until first use, and again after `clear_rhi_resources`
    framebuffer: Option<Arc<dyn RenderTarget>>,
    number_of_references: u32,
}

pub struct FramebufferManager {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    /// Sorted by signature id
    elements: Vec<FramebufferElement>,
    compositor_framebuffer_id_to_signature_id: FxHashMap<CompositorFramebufferId, FramebufferSignatureId>,
}

impl FramebufferManager {
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>) -> Self {
        Self {
            device,
            elements: Vec::new(),
            compositor_framebuffer_id_to_signature_id: FxHashMap::default(),
        }
    }

    fn find(&self, signature_id: FramebufferSignatureId) -> std::result::Result<usize, usize> {
        self.elements.binary_search_by_key(&signature_id, |element| element.signature.signature_id())
    }

    fn index_by_compositor_framebuffer_id(&self, compositor_framebuffer_id: CompositorFramebufferId) -> Result<usize> {
        self.compositor_framebuffer_id_to_signature_id.get(&compositor_framebuffer_id)
            .and_then(|&signature_id| self.find(signature_id).ok())
            .ok_or_else(|| engine_err!("nebula::FramebufferManager",
                "Unknown compositor framebuffer {:#010x}", compositor_framebuffer_id))
    }

    /// Declare a framebuffer under `compositor_framebuffer_id`
    ///
    /// An identical signature takes one more reference on the existing element.
    /// Redeclaring an id with another signature fails and changes nothing.
    pub fn add_framebuffer(&mut self, compositor_framebuffer_id: CompositorFramebufferId, signature: &FramebufferSignature) -> Result<()> {
        if let Some(&declared_signature_id) = self.compositor_framebuffer_id_to_signature_id.get(&compositor_framebuffer_id) {
            if declared_signature_id != signature.signature_id() {
                engine_bail!("nebula::FramebufferManager",
                    "Compositor framebuffer {:#010x} already declared with signature {:#010x}, redeclared with {:#010x}",
                    compositor_framebuffer_id, declared_signature_id, signature.signature_id());
            }
        }
        let index = match self.find(signature.signature_id()) {
            Ok(index) => index,
            Err(index) => {
                self.elements.insert(index, FramebufferElement {
                    signature: signature.clone(),
                    framebuffer: None,
                    number_of_references: 0,
                });
                index
            }
        };
        self.elements[index].number_of_references += 1;
        self.compositor_framebuffer_id_to_signature_id.insert(compositor_framebuffer_id, signature.signature_id());
        Ok(())
    }

    /// Already created framebuffer of `compositor_framebuffer_id`
    ///
    /// Fails if the id is unknown or its framebuffer was not created yet.
    pub fn get_framebuffer_by_compositor_framebuffer_id(
        &self,
        compositor_framebuffer_id: CompositorFramebufferId,
    ) -> Result<Arc<dyn RenderTarget>> {
        let index = self.index_by_compositor_framebuffer_id(compositor_framebuffer_id)?;
        self.elements[index].framebuffer.clone().ok_or_else(|| {
            engine_err!("nebula::FramebufferManager",
                "Compositor framebuffer {:#010x} has not been created", compositor_framebuffer_id)
        })
    }

    /// Framebuffer of `compositor_framebuffer_id`, created on first use
    ///
    /// Attachment textures are resolved through `render_target_texture_manager`
    /// and the render pass through `render_pass_manager`. All attachments must
    /// agree on the multisample policy when `number_of_multisamples` > 1.
    pub fn get_framebuffer_by_compositor_framebuffer_id_mut(
        &mut self,
        compositor_framebuffer_id: CompositorFramebufferId,
        render_target_texture_manager: &mut RenderTargetTextureManager,
        render_pass_manager: &mut RenderPassManager,
        main_render_target: &dyn RenderTarget,
        number_of_multisamples: u8,
        resolution_scale: f32,
    ) -> Result<Arc<dyn RenderTarget>> {
        let index = self.index_by_compositor_framebuffer_id(compositor_framebuffer_id)?;
        if let Some(framebuffer) = &self.elements[index].framebuffer {
            return Ok(framebuffer.clone());
        }

        let signature = self.elements[index].signature.clone();
        let mut any_multisample_allowed = false;
        let mut any_multisample_disallowed = false;
        let mut resolve = |attachment: &FramebufferSignatureAttachment| -> Result<FramebufferAttachment> {
            let (texture, texture_signature) = render_target_texture_manager.get_texture_by_asset_id(
                attachment.texture_asset_id,
                main_render_target,
                number_of_multisamples,
                resolution_scale,
            )?;
            if texture_signature.allow_multisample() {
                any_multisample_allowed = true;
            } else {
                any_multisample_disallowed = true;
            }
            Ok(FramebufferAttachment {
                texture,
                mipmap_index: attachment.mipmap_index,
                layer_index: attachment.layer_index,
            })
        };

        let color_attachments = signature.color_attachments().iter()
            .map(&mut resolve)
            .collect::<Result<Vec<_>>>()?;
        let depth_stencil_attachment = signature.depth_stencil_attachment()
            .map(&mut resolve)
            .transpose()?;

        if number_of_multisamples > 1 && any_multisample_allowed && any_multisample_disallowed {
            engine_bail!("nebula::FramebufferManager",
                "Compositor framebuffer {:#010x} mixes attachments with and without multisampling",
                compositor_framebuffer_id);
        }
        let effective_number_of_multisamples = if any_multisample_disallowed { 1 } else { number_of_multisamples.max(1) };

        let color_formats: Vec<_> = color_attachments.iter()
            .map(|attachment| attachment.texture.info().format)
            .collect();
        let depth_stencil_format = depth_stencil_attachment.as_ref()
            .map(|attachment| attachment.texture.info().format);
        let render_pass = render_pass_manager.get_or_create_render_pass(
            &color_formats,
            depth_stencil_format,
            effective_number_of_multisamples,
        )?;

        let desc = FramebufferDesc {
            render_pass: &render_pass,
            color_attachments,
            depth_stencil_attachment,
        };
        let framebuffer = lock_device(&self.device)?.create_framebuffer(&desc)?;
        engine_debug!("nebula::FramebufferManager",
            "Created framebuffer {:#010x} for compositor framebuffer {:#010x} ({}x{}, {} multisamples)",
            signature.signature_id(), compositor_framebuffer_id,
            framebuffer.width(), framebuffer.height(), effective_number_of_multisamples);

        self.elements[index].framebuffer = Some(framebuffer.clone());
        Ok(framebuffer)
    }

    /// Drop one reference; the element, its framebuffer and its id aliases go away with the last one
    pub fn release_framebuffer_by_signature(&mut self, signature: &FramebufferSignature) -> Result<()> {
        let signature_id = signature.signature_id();
        let index = self.find(signature_id).map_err(|_| {
            Error::InvalidResource(format!("Release of unknown framebuffer signature {:#010x}", signature_id))
        })?;

        let element = &mut self.elements[index];
        element.number_of_references -= 1;
        if element.number_of_references == 0 {
            self.elements.remove(index);
            self.compositor_framebuffer_id_to_signature_id.retain(|_, id| *id != signature_id);
        }
        Ok(())
    }

    /// Logical references on a signature (0 if unknown)
    pub fn number_of_references(&self, signature: &FramebufferSignature) -> u32 {
        self.find(signature.signature_id())
            .map_or(0, |index| self.elements[index].number_of_references)
    }

    /// Number of distinct signatures
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements with a created GPU framebuffer
    pub fn number_of_materialized_framebuffers(&self) -> usize {
        self.elements.iter().filter(|element| element.framebuffer.is_some()).count()
    }

    /// Forget every declaration and framebuffer
    pub fn clear(&mut self) {
        self.elements.clear();
        self.compositor_framebuffer_id_to_signature_id.clear();
    }

    /// Drop the GPU framebuffers only; declarations and aliases are kept
    pub fn clear_rhi_resources(&mut self) {
        for element in &mut self.elements {
            element.framebuffer = None;
        }
    }
}

#[cfg(test)]
#[path = "framebuffer_manager_tests.rs"]
mod tests;
