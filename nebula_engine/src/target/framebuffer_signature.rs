/// Structural description of a framebuffer's attachment set.
///
/// The signature id is an FNV-1a hash of the content only, so identical
/// declarations coming from different compositor nodes share one framebuffer.

use bytemuck::{Pod, Zeroable};
use crate::error::{Error, Result};
use crate::resource::{AssetId, INVALID_ASSET_ID};
use crate::utils::{fnv1a_32, FNV1A_32_INITIAL_HASH};

/// Maximum number of color attachments of a framebuffer
pub const MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS: usize = 8;

/// Framebuffer signature id (FNV-1a of the signature content)
pub type FramebufferSignatureId = u32;

/// One attachment slot: a render target texture asset at a mip and layer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct FramebufferSignatureAttachment {
    pub texture_asset_id: AssetId,
    pub mipmap_index: u32,
    pub layer_index: u32,
}

impl FramebufferSignatureAttachment {
    /// Marker stored in unused slots
    pub const UNUSED: Self = Self {
        texture_asset_id: INVALID_ASSET_ID,
        mipmap_index: 0,
        layer_index: 0,
    };

    /// Mip 0, layer 0 of a texture asset
    pub fn new(texture_asset_id: AssetId) -> Self {
        Self {
            texture_asset_id,
            mipmap_index: 0,
            layer_index: 0,
        }
    }

    pub fn is_used(&self) -> bool {
        self.texture_asset_id != INVALID_ASSET_ID
    }
}

/// Serialized form of a `FramebufferSignature` inside compositor node assets
#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct FramebufferSignatureRecord {
    pub number_of_color_attachments: u32,
    pub color_attachments: [FramebufferSignatureAttachment; MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS],
    pub depth_stencil_attachment: FramebufferSignatureAttachment,
}

/// Immutable framebuffer signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferSignature {
    number_of_color_attachments: u8,
    color_attachments: [FramebufferSignatureAttachment; MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS],
    depth_stencil_attachment: FramebufferSignatureAttachment,
    signature_id: FramebufferSignatureId,
}

impl FramebufferSignature {
    /// Build a signature and derive its id
    ///
    /// # Panics
    ///
    /// Panics with more than `MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS` color attachments.
    pub fn new(
        color_attachments: &[FramebufferSignatureAttachment],
        depth_stencil_attachment: Option<FramebufferSignatureAttachment>,
    ) -> Self {
        assert!(
            color_attachments.len() <= MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS,
            "Invalid number of color attachments: {}", color_attachments.len()
        );

        let mut slots = [FramebufferSignatureAttachment::UNUSED; MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS];
        slots[..color_attachments.len()].copy_from_slice(color_attachments);
        let depth_stencil_attachment = depth_stencil_attachment.unwrap_or(FramebufferSignatureAttachment::UNUSED);

        let mut signature_id = fnv1a_32(&(color_attachments.len() as u32).to_le_bytes(), FNV1A_32_INITIAL_HASH);
        for attachment in color_attachments {
            signature_id = fnv1a_32(bytemuck::bytes_of(attachment), signature_id);
        }
        signature_id = fnv1a_32(bytemuck::bytes_of(&depth_stencil_attachment), signature_id);

        Self {
            number_of_color_attachments: color_attachments.len() as u8,
            color_attachments: slots,
            depth_stencil_attachment,
            signature_id,
        }
    }

    /// Decode a serialized signature, recomputing its id
    pub fn from_record(record: &FramebufferSignatureRecord) -> Result<Self> {
        let number_of_color_attachments = record.number_of_color_attachments as usize;
        if number_of_color_attachments > MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS {
            return Err(Error::InvalidAsset(format!(
                "Invalid number of color attachments: {}", number_of_color_attachments
            )));
        }
        let color_attachments = record.color_attachments;
        let depth_stencil_attachment = record.depth_stencil_attachment;
        Ok(Self::new(
            &color_attachments[..number_of_color_attachments],
            depth_stencil_attachment.is_used().then_some(depth_stencil_attachment),
        ))
    }

    pub fn to_record(&self) -> FramebufferSignatureRecord {
        FramebufferSignatureRecord {
            number_of_color_attachments: self.number_of_color_attachments as u32,
            color_attachments: self.color_attachments,
            depth_stencil_attachment: self.depth_stencil_attachment,
        }
    }

    pub fn number_of_color_attachments(&self) -> u8 {
        self.number_of_color_attachments
    }

    /// Active color attachments, in attachment order
    pub fn color_attachments(&self) -> &[FramebufferSignatureAttachment] {
        &self.color_attachments[..self.number_of_color_attachments as usize]
    }

    pub fn depth_stencil_attachment(&self) -> Option<&FramebufferSignatureAttachment> {
        self.depth_stencil_attachment.is_used().then_some(&self.depth_stencil_attachment)
    }

    /// Every used attachment: colors first, then depth/stencil
    pub fn attachments(&self) -> impl Iterator<Item = &FramebufferSignatureAttachment> {
        self.color_attachments().iter().chain(self.depth_stencil_attachment())
    }

    pub fn signature_id(&self) -> FramebufferSignatureId {
        self.signature_id
    }
}

#[cfg(test)]
#[path = "framebuffer_signature_tests.rs"]
mod tests;
