/// Texture trait, texture descriptor, and texture info

use bitflags::bitflags;

/// Texture format
///
/// Stored as a single byte in render target texture signatures.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_UNORM = 0,
    R8G8B8A8_SRGB = 1,
    B8G8R8A8_UNORM = 2,
    B8G8R8A8_SRGB = 3,
    R11G11B10_FLOAT = 4,
    R16G16B16A16_FLOAT = 5,
    R32G32B32A32_FLOAT = 6,
    R32_FLOAT = 7,
    D16_UNORM = 8,
    D32_FLOAT = 9,
    D24_UNORM_S8_UINT = 10,
}

impl TextureFormat {
    /// Decode a serialized format byte
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::R8G8B8A8_UNORM,
            1 => Self::R8G8B8A8_SRGB,
            2 => Self::B8G8R8A8_UNORM,
            3 => Self::B8G8R8A8_SRGB,
            4 => Self::R11G11B10_FLOAT,
            5 => Self::R16G16B16A16_FLOAT,
            6 => Self::R32G32B32A32_FLOAT,
            7 => Self::R32_FLOAT,
            8 => Self::D16_UNORM,
            9 => Self::D32_FLOAT,
            10 => Self::D24_UNORM_S8_UINT,
            _ => return None,
        })
    }

    /// Whether this is a depth (or depth/stencil) format
    pub fn is_depth(&self) -> bool {
        matches!(self, Self::D16_UNORM | Self::D32_FLOAT | Self::D24_UNORM_S8_UINT)
    }
}

bitflags! {
    /// Texture usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be sampled in shaders
        const SHADER_RESOURCE = 1 << 0;
        /// Texture can be used as color render target
        const RENDER_TARGET = 1 << 1;
        /// Texture can be used as depth/stencil attachment
        const DEPTH_STENCIL = 1 << 2;
        /// Texture can be written from compute shaders
        const UNORDERED_ACCESS = 1 << 3;
        /// Texture has a full mip chain filled by the GPU
        const GENERATE_MIPMAPS = 1 << 4;
    }
}

/// Number of mip levels of a full chain down to 1x1
pub fn full_mip_chain_length(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
    /// Number of multisamples (1 = no MSAA)
    pub number_of_multisamples: u8,
    /// Number of mip levels (1 = no mipmaps)
    pub mip_levels: u32,
    /// Name shown in GPU debuggers
    pub debug_name: String,
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture.
///
/// Returned by `Texture::info()` to query texture properties
/// without exposing backend-specific details.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    pub number_of_multisamples: u8,
    pub mip_levels: u32,
}

impl TextureInfo {
    /// Returns true if this texture is multisampled
    pub fn is_multisampled(&self) -> bool {
        self.number_of_multisamples > 1
    }
}

// ===== TEXTURE TRAIT =====

/// Texture resource trait
///
/// Implemented by backend-specific texture types.
/// The texture is destroyed when the last `Arc` is dropped.
pub trait Texture: Send + Sync {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}
