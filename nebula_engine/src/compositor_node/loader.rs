/// Compositor node asset format
///
/// An LZ4 memory file of type `CompositorNode`, version 9, holding:
/// header, input channel ids, render target texture declarations,
/// framebuffer declarations, targets (each followed by its passes, every pass
/// prefixed by its type id and payload size), output channel ids.

use bytemuck::{Pod, Zeroable};
use crate::error::{Error, Result};
use crate::engine_warn;
use crate::resource::MemoryFile;
use crate::target::{
    FramebufferSignature, FramebufferSignatureRecord,
    RenderTargetTextureSignature, RenderTargetTextureSignatureRecord,
};
use crate::utils::{string_id, BinaryWriter};
use super::pass::CompositorPassFactory;
use super::{
    CompositorFramebuffer, CompositorNodeResource, CompositorRenderTargetTexture,
    CompositorTarget, CompositorTargetBinding,
};

pub const COMPOSITOR_NODE_FORMAT_TYPE: u32 = string_id("CompositorNode");
pub const COMPOSITOR_NODE_FORMAT_VERSION: u32 = 9;

/// Stored in place of an absent channel or framebuffer id
const UNUSED_ID: u32 = u32::MAX;

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct CompositorNodeHeader {
    number_of_input_channels: u32,
    number_of_render_target_textures: u32,
    number_of_framebuffers: u32,
    number_of_targets: u32,
    number_of_output_channels: u32,
}

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct RenderTargetTextureRecord {
    asset_id: u32,
    signature: RenderTargetTextureSignatureRecord,
}

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct FramebufferRecord {
    compositor_framebuffer_id: u32,
    signature: FramebufferSignatureRecord,
}

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct TargetRecord {
    compositor_channel_id: u32,
    compositor_framebuffer_id: u32,
    number_of_passes: u32,
}

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct PassHeader {
    compositor_pass_type_id: u32,
    number_of_bytes: u32,
}

/// Decode a compositor node asset
///
/// Passes of a type unknown to `compositor_pass_factory` are skipped with a warning.
pub fn read_compositor_node(
    bytes: &[u8],
    compositor_pass_factory: &dyn CompositorPassFactory,
) -> Result<CompositorNodeResource> {
    let memory_file = MemoryFile::from_bytes(bytes)?;
    memory_file.validate(COMPOSITOR_NODE_FORMAT_TYPE, COMPOSITOR_NODE_FORMAT_VERSION)?;
    let mut reader = memory_file.reader();

    let header = reader.read::<CompositorNodeHeader>()?;
    let mut resource = CompositorNodeResource::new();

    resource.input_channels = reader.read_vec::<u32>(header.number_of_input_channels as usize)?;

    for record in reader.read_vec::<RenderTargetTextureRecord>(header.number_of_render_target_textures as usize)? {
        resource.render_target_textures.push(CompositorRenderTargetTexture {
            asset_id: record.asset_id,
            signature: RenderTargetTextureSignature::from_record(&record.signature)?,
        });
    }

    for record in reader.read_vec::<FramebufferRecord>(header.number_of_framebuffers as usize)? {
        resource.framebuffers.push(CompositorFramebuffer {
            compositor_framebuffer_id: record.compositor_framebuffer_id,
            signature: FramebufferSignature::from_record(&record.signature)?,
        });
    }

    for _ in 0..header.number_of_targets {
        let target_record = reader.read::<TargetRecord>()?;
        let binding = match (target_record.compositor_channel_id, target_record.compositor_framebuffer_id) {
            (UNUSED_ID, UNUSED_ID) => CompositorTargetBinding::None,
            (channel_id, UNUSED_ID) => CompositorTargetBinding::Channel(channel_id),
            (UNUSED_ID, framebuffer_id) => CompositorTargetBinding::Framebuffer(framebuffer_id),
            (channel_id, framebuffer_id) => {
                return Err(Error::InvalidAsset(format!(
                    "Compositor target bound to both channel {:#010x} and framebuffer {:#010x}",
                    channel_id, framebuffer_id
                )));
            }
        };

        let mut target = CompositorTarget::new(binding);
        for _ in 0..target_record.number_of_passes {
            let pass_header = reader.read::<PassHeader>()?;
            let compositor_pass_type_id = pass_header.compositor_pass_type_id;
            let payload = reader.read_bytes(pass_header.number_of_bytes as usize)?;
            match compositor_pass_factory.create_compositor_resource_pass(compositor_pass_type_id) {
                Some(mut pass) => {
                    pass.deserialize(payload)?;
                    target.add_pass(pass);
                }
                None => {
                    engine_warn!("nebula::CompositorNodeLoader",
                        "Skipping pass of unknown type {:#010x} ({} bytes)",
                        compositor_pass_type_id, payload.len());
                }
            }
        }
        resource.targets.push(target);
    }

    resource.output_channels = reader.read_vec::<u32>(header.number_of_output_channels as usize)?;

    if !reader.is_at_end() {
        return Err(Error::InvalidAsset(format!(
            "Compositor node has {} trailing bytes", reader.remaining()
        )));
    }
    Ok(resource)
}

/// Encode a compositor node asset
pub fn write_compositor_node(resource: &CompositorNodeResource) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    writer.write(&CompositorNodeHeader {
        number_of_input_channels: resource.input_channels.len() as u32,
        number_of_render_target_textures: resource.render_target_textures.len() as u32,
        number_of_framebuffers: resource.framebuffers.len() as u32,
        number_of_targets: resource.targets.len() as u32,
        number_of_output_channels: resource.output_channels.len() as u32,
    });

    writer.write_slice(&resource.input_channels);
    for render_target_texture in &resource.render_target_textures {
        writer.write(&RenderTargetTextureRecord {
            asset_id: render_target_texture.asset_id,
            signature: render_target_texture.signature.to_record(),
        });
    }
    for framebuffer in &resource.framebuffers {
        writer.write(&FramebufferRecord {
            compositor_framebuffer_id: framebuffer.compositor_framebuffer_id,
            signature: framebuffer.signature.to_record(),
        });
    }

    for target in &resource.targets {
        writer.write(&TargetRecord {
            compositor_channel_id: target.compositor_channel_id().unwrap_or(UNUSED_ID),
            compositor_framebuffer_id: target.compositor_framebuffer_id().unwrap_or(UNUSED_ID),
            number_of_passes: target.passes().len() as u32,
        });
        for pass in target.passes() {
            let mut payload = BinaryWriter::new();
            pass.serialize(&mut payload);
            writer.write(&PassHeader {
                compositor_pass_type_id: pass.compositor_pass_type_id(),
                number_of_bytes: payload.len() as u32,
            });
            writer.write_bytes(payload.as_bytes());
        }
    }
    writer.write_slice(&resource.output_channels);

    MemoryFile::new(COMPOSITOR_NODE_FORMAT_TYPE, COMPOSITOR_NODE_FORMAT_VERSION, writer.into_bytes()).to_bytes()
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
