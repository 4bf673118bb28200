/// Structural description of one render target texture.

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use crate::error::{Error, Result};
use crate::graphics_device::TextureFormat;
use crate::utils::{fnv1a_32, FNV1A_32_INITIAL_HASH};

/// Render target texture signature id (FNV-1a of the signature content)
pub type RenderTargetTextureSignatureId = u32;

bitflags! {
    /// Render target texture creation flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderTargetTextureFlags: u8 {
        /// Readable from shaders
        const SHADER_RESOURCE = 1 << 0;
        /// Bindable as color or depth/stencil attachment
        const RENDER_TARGET = 1 << 1;
        /// Writable from compute shaders
        const UNORDERED_ACCESS = 1 << 2;
        /// Follows the workspace multisample count (1 sample otherwise)
        const ALLOW_MULTISAMPLE = 1 << 3;
        /// Allocated with a full mip chain
        const GENERATE_MIPMAPS = 1 << 4;
        /// Relative sizes follow the workspace resolution scale
        const ALLOW_RESOLUTION_SCALE = 1 << 5;
    }
}

/// Serialized form of a `RenderTargetTextureSignature` inside compositor node assets
#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct RenderTargetTextureSignatureRecord {
    pub width: u32,
    pub height: u32,
    pub texture_format: u8,
    pub flags: u8,
    pub width_scale: f32,
}

/// Immutable render target texture signature
///
/// A width or height of 0 means "relative to the main render target".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTargetTextureSignature {
    width: u32,
    height: u32,
    texture_format: TextureFormat,
    flags: RenderTargetTextureFlags,
    /// Extra horizontal scale of relative widths (2 for side by side stereo)
    width_scale: f32,
    signature_id: RenderTargetTextureSignatureId,
}

impl RenderTargetTextureSignature {
    pub fn new(
        width: u32,
        height: u32,
        texture_format: TextureFormat,
        flags: RenderTargetTextureFlags,
        width_scale: f32,
    ) -> Self {
        let record = RenderTargetTextureSignatureRecord {
            width,
            height,
            texture_format: texture_format as u8,
            flags: flags.bits(),
            width_scale,
        };
        Self {
            width,
            height,
            texture_format,
            flags,
            width_scale,
            signature_id: fnv1a_32(bytemuck::bytes_of(&record), FNV1A_32_INITIAL_HASH),
        }
    }

    /// Size relative to the main render target, scale 1
    pub fn relative(texture_format: TextureFormat, flags: RenderTargetTextureFlags) -> Self {
        Self::new(0, 0, texture_format, flags, 1.0)
    }

    /// Decode a serialized signature, recomputing its id
    pub fn from_record(record: &RenderTargetTextureSignatureRecord) -> Result<Self> {
        let texture_format = TextureFormat::from_u8(record.texture_format).ok_or_else(|| {
            Error::InvalidAsset(format!("Invalid texture format {}", record.texture_format))
        })?;
        let flags = RenderTargetTextureFlags::from_bits(record.flags).ok_or_else(|| {
            Error::InvalidAsset(format!("Invalid render target texture flags {:#04x}", record.flags))
        })?;
        let width_scale = record.width_scale;
        if !(width_scale > 0.0) {
            return Err(Error::InvalidAsset(format!("Invalid width scale {}", width_scale)));
        }
        Ok(Self::new(record.width, record.height, texture_format, flags, width_scale))
    }

    pub fn to_record(&self) -> RenderTargetTextureSignatureRecord {
        RenderTargetTextureSignatureRecord {
            width: self.width,
            height: self.height,
            texture_format: self.texture_format as u8,
            flags: self.flags.bits(),
            width_scale: self.width_scale,
        }
    }

    /// Texture size for a main render target of `main_width` x `main_height`
    ///
    /// Relative dimensions are scaled by `resolution_scale` when
    /// `ALLOW_RESOLUTION_SCALE` is set, widths additionally by the width scale.
    /// Never returns a zero dimension.
    pub fn resolve_size(&self, main_width: u32, main_height: u32, resolution_scale: f32) -> (u32, u32) {
        let resolution_scale = if self.flags.contains(RenderTargetTextureFlags::ALLOW_RESOLUTION_SCALE) {
            resolution_scale
        } else {
            1.0
        };
        let width = if self.width == 0 {
            (main_width as f32 * resolution_scale * self.width_scale).ceil() as u32
        } else {
            self.width
        };
        let height = if self.height == 0 {
            (main_height as f32 * resolution_scale).ceil() as u32
        } else {
            self.height
        };
        (width.max(1), height.max(1))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texture_format(&self) -> TextureFormat {
        self.texture_format
    }

    pub fn flags(&self) -> RenderTargetTextureFlags {
        self.flags
    }

    pub fn allow_multisample(&self) -> bool {
        self.flags.contains(RenderTargetTextureFlags::ALLOW_MULTISAMPLE)
    }

    pub fn width_scale(&self) -> f32 {
        self.width_scale
    }

    pub fn signature_id(&self) -> RenderTargetTextureSignatureId {
        self.signature_id
    }
}

#[cfg(test)]
#[path = "render_target_texture_signature_tests.rs"]
mod tests;
