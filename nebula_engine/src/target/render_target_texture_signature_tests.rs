use super::*;

fn color_flags() -> RenderTargetTextureFlags {
    RenderTargetTextureFlags::SHADER_RESOURCE | RenderTargetTextureFlags::RENDER_TARGET
}

#[test]
fn test_identical_content_gives_identical_id() {
    let a = RenderTargetTextureSignature::relative(TextureFormat::R11G11B10_FLOAT, color_flags());
    let b = RenderTargetTextureSignature::relative(TextureFormat::R11G11B10_FLOAT, color_flags());
    assert_eq!(a.signature_id(), b.signature_id());
}

#[test]
fn test_differing_fields_change_id() {
    let base = RenderTargetTextureSignature::relative(TextureFormat::R11G11B10_FLOAT, color_flags());
    let variants = [
        RenderTargetTextureSignature::relative(TextureFormat::R16G16B16A16_FLOAT, color_flags()),
        RenderTargetTextureSignature::relative(
            TextureFormat::R11G11B10_FLOAT,
            color_flags() | RenderTargetTextureFlags::ALLOW_MULTISAMPLE,
        ),
        RenderTargetTextureSignature::new(512, 0, TextureFormat::R11G11B10_FLOAT, color_flags(), 1.0),
        RenderTargetTextureSignature::new(0, 0, TextureFormat::R11G11B10_FLOAT, color_flags(), 2.0),
    ];
    for variant in &variants {
        assert_ne!(base.signature_id(), variant.signature_id());
    }
}

// ============================================================================
// Tests: resolve_size
// ============================================================================

#[test]
fn test_relative_size_follows_main_target() {
    let signature = RenderTargetTextureSignature::relative(TextureFormat::R8G8B8A8_UNORM, color_flags());
    assert_eq!(signature.resolve_size(1280, 720, 1.0), (1280, 720));
}

#[test]
fn test_resolution_scale_requires_flag() {
    let fixed = RenderTargetTextureSignature::relative(TextureFormat::R8G8B8A8_UNORM, color_flags());
    let scaled = RenderTargetTextureSignature::relative(
        TextureFormat::R8G8B8A8_UNORM,
        color_flags() | RenderTargetTextureFlags::ALLOW_RESOLUTION_SCALE,
    );

    assert_eq!(fixed.resolve_size(1280, 720, 0.5), (1280, 720));
    assert_eq!(scaled.resolve_size(1280, 720, 0.5), (640, 360));
}

#[test]
fn test_width_scale_only_affects_width() {
    let signature = RenderTargetTextureSignature::new(0, 0, TextureFormat::R8G8B8A8_UNORM, color_flags(), 2.0);
    assert_eq!(signature.resolve_size(640, 480, 1.0), (1280, 480));
}

#[test]
fn test_absolute_size_ignores_main_target() {
    let signature = RenderTargetTextureSignature::new(
        2048, 2048, TextureFormat::D32_FLOAT,
        RenderTargetTextureFlags::RENDER_TARGET | RenderTargetTextureFlags::ALLOW_RESOLUTION_SCALE,
        1.0,
    );
    assert_eq!(signature.resolve_size(1280, 720, 0.5), (2048, 2048));
}

#[test]
fn test_resolved_size_is_never_zero() {
    let signature = RenderTargetTextureSignature::relative(
        TextureFormat::R8G8B8A8_UNORM,
        RenderTargetTextureFlags::ALLOW_RESOLUTION_SCALE,
    );
    assert_eq!(signature.resolve_size(0, 0, 0.01), (1, 1));
}

// ============================================================================
// Tests: record
// ============================================================================

#[test]
fn test_record_keeps_content_and_id() {
    let signature = RenderTargetTextureSignature::new(
        0, 256, TextureFormat::R16G16B16A16_FLOAT,
        color_flags() | RenderTargetTextureFlags::GENERATE_MIPMAPS,
        1.0,
    );
    let decoded = RenderTargetTextureSignature::from_record(&signature.to_record()).unwrap();
    assert_eq!(decoded, signature);
    assert_eq!(std::mem::size_of::<RenderTargetTextureSignatureRecord>(), 14);
}

#[test]
fn test_record_with_unknown_format_is_invalid_asset() {
    let mut record = RenderTargetTextureSignature::relative(TextureFormat::R8G8B8A8_UNORM, color_flags()).to_record();
    record.texture_format = 99;
    assert!(matches!(RenderTargetTextureSignature::from_record(&record), Err(Error::InvalidAsset(_))));
}
