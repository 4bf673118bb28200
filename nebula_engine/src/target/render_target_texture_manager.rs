/// Render target textures declared by compositor nodes.
///
/// Declarations are cheap: `add_render_target_texture` only records the
/// signature. The GPU texture is created on first use, sized against the
/// main render target, and can be dropped again by `clear_rhi_resources`
/// while the declarations and their reference counts survive.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::{engine_debug, engine_err};
use crate::graphics_device::{
    full_mip_chain_length, lock_device, GraphicsDevice, RenderTarget,
    Texture, TextureDesc, TextureUsage,
};
use crate::resource::AssetId;
use super::{RenderTargetTextureFlags, RenderTargetTextureSignature, RenderTargetTextureSignatureId};

struct RenderTargetTextureElement {
    asset_id: AssetId,
    signature: RenderTargetTextureSignature,
    /// `None` until first use, and again after `clear_rhi_resources`
    texture: Option<Arc<dyn Texture>>,
    number_of_references: u32,
}

impl RenderTargetTextureElement {
    fn key(&self) -> (AssetId, RenderTargetTextureSignatureId) {
        (self.asset_id, self.signature.signature_id())
    }
}

pub struct RenderTargetTextureManager {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    /// Sorted by (asset id, signature id)
    elements: Vec<RenderTargetTextureElement>,
    /// Signature currently used for each asset id
    asset_id_to_signature_id: FxHashMap<AssetId, RenderTargetTextureSignatureId>,
}

impl RenderTargetTextureManager {
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>) -> Self {
        Self {
            device,
            elements: Vec::new(),
            asset_id_to_signature_id: FxHashMap::default(),
        }
    }

    fn find(&self, asset_id: AssetId, signature_id: RenderTargetTextureSignatureId) -> std::result::Result<usize, usize> {
        self.elements.binary_search_by_key(&(asset_id, signature_id), RenderTargetTextureElement::key)
    }

    fn index_by_asset_id(&self, asset_id: AssetId) -> Option<usize> {
        let signature_id = *self.asset_id_to_signature_id.get(&asset_id)?;
        self.find(asset_id, signature_id).ok()
    }

    /// Declare a render target texture, or take one more reference on an identical declaration
    ///
    /// No GPU memory is allocated here.
    pub fn add_render_target_texture(&mut self, asset_id: AssetId, signature: &RenderTargetTextureSignature) {
        let index = match self.find(asset_id, signature.signature_id()) {
            Ok(index) => index,
            Err(index) => {
                self.elements.insert(index, RenderTargetTextureElement {
                    asset_id,
                    signature: *signature,
                    texture: None,
                    number_of_references: 0,
                });
                index
            }
        };
        self.elements[index].number_of_references += 1;
        self.asset_id_to_signature_id.insert(asset_id, signature.signature_id());
    }

    /// Resolve the texture declared for `asset_id`, creating it if needed
    ///
    /// Returns the signature used so callers can see the effective
    /// multisample policy.
    pub fn get_texture_by_asset_id(
        &mut self,
        asset_id: AssetId,
        main_render_target: &dyn RenderTarget,
        number_of_multisamples: u8,
        resolution_scale: f32,
    ) -> Result<(Arc<dyn Texture>, RenderTargetTextureSignature)> {
        let index = self.index_by_asset_id(asset_id).ok_or_else(|| {
            engine_err!("nebula::RenderTargetTextureManager",
                "Unknown render target texture asset {:#010x}", asset_id)
        })?;

        if let Some(texture) = &self.elements[index].texture {
            return Ok((texture.clone(), self.elements[index].signature));
        }

        let signature = self.elements[index].signature;
        let desc = Self::texture_desc(asset_id, &signature, main_render_target, number_of_multisamples, resolution_scale);
        let texture = lock_device(&self.device)?.create_texture(&desc)?;
        engine_debug!("nebula::RenderTargetTextureManager",
            "Created render target texture {:#010x} ({}x{}, {:?}, {} multisamples)",
            asset_id, desc.width, desc.height, desc.format, desc.number_of_multisamples);
        self.elements[index].texture = Some(texture.clone());
        Ok((texture, signature))
    }

    fn texture_desc(
        asset_id: AssetId,
        signature: &RenderTargetTextureSignature,
        main_render_target: &dyn RenderTarget,
        number_of_multisamples: u8,
        resolution_scale: f32,
    ) -> TextureDesc {
        let (width, height) = signature.resolve_size(
            main_render_target.width(),
            main_render_target.height(),
            resolution_scale,
        );
        let flags = signature.flags();
        let format = signature.texture_format();

        let mut usage = TextureUsage::empty();
        if flags.contains(RenderTargetTextureFlags::SHADER_RESOURCE) {
            usage |= TextureUsage::SHADER_RESOURCE;
        }
        if flags.contains(RenderTargetTextureFlags::RENDER_TARGET) {
            usage |= if format.is_depth() { TextureUsage::DEPTH_STENCIL } else { TextureUsage::RENDER_TARGET };
        }
        if flags.contains(RenderTargetTextureFlags::UNORDERED_ACCESS) {
            usage |= TextureUsage::UNORDERED_ACCESS;
        }
        let mip_levels = if flags.contains(RenderTargetTextureFlags::GENERATE_MIPMAPS) {
            usage |= TextureUsage::GENERATE_MIPMAPS;
            full_mip_chain_length(width, height)
        } else {
            1
        };

        TextureDesc {
            width,
            height,
            format,
            usage,
            number_of_multisamples: if signature.allow_multisample() { number_of_multisamples.max(1) } else { 1 },
            mip_levels,
            debug_name: format!("Compositor render target texture {:#010x}", asset_id),
        }
    }

    /// The already created texture of `asset_id`, if any
    pub fn texture_by_asset_id(&self, asset_id: AssetId) -> Option<&Arc<dyn Texture>> {
        self.index_by_asset_id(asset_id)
            .and_then(|index| self.elements[index].texture.as_ref())
    }

    /// The signature currently declared for `asset_id`
    pub fn signature_by_asset_id(&self, asset_id: AssetId) -> Option<&RenderTargetTextureSignature> {
        self.index_by_asset_id(asset_id).map(|index| &self.elements[index].signature)
    }

    /// Drop one reference; the declaration and its texture go away with the last one
    pub fn release_render_target_texture_by_signature(
        &mut self,
        asset_id: AssetId,
        signature: &RenderTargetTextureSignature,
    ) -> Result<()> {
        let index = self.find(asset_id, signature.signature_id()).map_err(|_| {
            Error::InvalidResource(format!(
                "Release of unknown render target texture {:#010x} (signature {:#010x})",
                asset_id, signature.signature_id()
            ))
        })?;

        let element = &mut self.elements[index];
        element.number_of_references -= 1;
        if element.number_of_references > 0 {
            return Ok(());
        }
        self.elements.remove(index);

        // Keep the asset id resolvable while another signature is still declared for it
        if self.asset_id_to_signature_id.get(&asset_id) == Some(&signature.signature_id()) {
            match self.elements.iter().find(|element| element.asset_id == asset_id) {
                Some(other) => {
                    self.asset_id_to_signature_id.insert(asset_id, other.signature.signature_id());
                }
                None => {
                    self.asset_id_to_signature_id.remove(&asset_id);
                }
            }
        }
        Ok(())
    }

    /// Logical references on a declaration (0 if unknown)
    pub fn number_of_references(&self, asset_id: AssetId, signature: &RenderTargetTextureSignature) -> u32 {
        self.find(asset_id, signature.signature_id())
            .map_or(0, |index| self.elements[index].number_of_references)
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of declarations with a created GPU texture
    pub fn number_of_materialized_textures(&self) -> usize {
        self.elements.iter().filter(|element| element.texture.is_some()).count()
    }

    /// Forget every declaration and texture
    pub fn clear(&mut self) {
        self.elements.clear();
        self.asset_id_to_signature_id.clear();
    }

    /// Drop the GPU textures only; declarations are kept and textures recreated on next use
    pub fn clear_rhi_resources(&mut self) {
        for element in &mut self.elements {
            element.texture = None;
        }
    }
}

#[cfg(test)]
#[path = "render_target_texture_manager_tests.rs"]
mod tests;
