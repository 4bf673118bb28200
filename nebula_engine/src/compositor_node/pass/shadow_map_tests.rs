use super::*;
use glam::{Quat, Vec3};
use crate::scene::{LightSceneItem, RenderQueueIndexRange};
use crate::test_support::ContextFixture;

fn resource_pass(number_of_shadow_cascades: u8) -> ShadowMapResourcePass {
    ShadowMapResourcePass {
        base: CompositorResourcePassBase::with_name("Shadow map"),
        texture_asset_id: 42,
        number_of_shadow_cascades,
        ..ShadowMapResourcePass::default()
    }
}

#[test]
fn test_split_distances_are_increasing_and_end_at_far() {
    let splits = compute_cascade_split_distances(0.1, 100.0, 4, 0.5);
    assert_eq!(splits.len(), 4);
    assert!(splits.windows(2).all(|pair| pair[0] < pair[1]));
    assert!((splits[3] - 100.0).abs() < 1e-3);
}

#[test]
fn test_uniform_splits_with_zero_lambda() {
    let splits = compute_cascade_split_distances(0.0, 100.0, 4, 0.0);
    for (split, expected) in splits.iter().zip([25.0, 50.0, 75.0, 100.0]) {
        assert!((split - expected).abs() < 1e-2);
    }
}

#[test]
fn test_cascade_count_is_validated() {
    let mut writer = BinaryWriter::new();
    resource_pass(MAXIMUM_NUMBER_OF_SHADOW_CASCADES + 1).serialize(&mut writer);
    assert!(ShadowMapResourcePass::default().deserialize(writer.as_bytes()).is_err());

    let mut writer = BinaryWriter::new();
    resource_pass(2).serialize(&mut writer);
    let mut decoded = ShadowMapResourcePass::default();
    decoded.deserialize(writer.as_bytes()).unwrap();
    assert_eq!(decoded.number_of_shadow_cascades, 2);
    assert_eq!(decoded.texture_asset_id, 42);
}

#[test]
fn test_without_light_nothing_is_rendered() {
    let fixture = ContextFixture::new(1024, 256);
    let camera = CameraSceneItem::default();
    let mut context = fixture.context().with_camera(Some(&camera));
    let mut command_buffer = CommandBuffer::new();
    let mut pass = ShadowMapInstancePass::new(&resource_pass(4));

    pass.on_fill_command_buffer(Some(&fixture.main_render_target), &mut context, &mut command_buffer).unwrap();

    assert!(command_buffer.is_empty());
    assert!(pass.shadow_map_output().is_none());
    assert!(context.shadow_map_output.is_none());
}

#[test]
fn test_cascades_are_rendered_side_by_side_and_published() {
    let mut fixture = ContextFixture::new(1024, 256);
    fixture.render_queue_index_ranges = vec![RenderQueueIndexRange::new(0, 255)];
    let camera = CameraSceneItem::new(Vec3::new(0.0, 2.0, 10.0), Quat::IDENTITY);
    let light = LightSceneItem::directional(Vec3::new(-1.0, -1.0, 0.0), Vec3::ONE);
    let mut context = fixture.context().with_camera(Some(&camera)).with_light(Some(&light));
    let mut command_buffer = CommandBuffer::new();
    let mut pass = ShadowMapInstancePass::new(&resource_pass(4));

    pass.on_fill_command_buffer(Some(&fixture.main_render_target), &mut context, &mut command_buffer).unwrap();

    let draws = command_buffer.command_names().iter().filter(|name| **name == "DrawRenderables").count();
    assert_eq!(draws, 4);
    let viewports: Vec<(f32, f32)> = command_buffer.commands().iter()
        .filter_map(|command| match command {
            Command::SetViewport(viewport) => Some((viewport.x, viewport.width)),
            _ => None,
        })
        .collect();
    // Four cascades side by side, then the whole target again for the passes that follow
    assert_eq!(viewports, vec![(0.0, 256.0), (256.0, 256.0), (512.0, 256.0), (768.0, 256.0), (0.0, 1024.0)]);
    assert!(matches!(
        command_buffer.commands().last(),
        Some(Command::SetScissor(Rect2D { x: 0, y: 0, width: 1024, height: 256 }))
    ));

    let output = context.shadow_map_output.as_ref().unwrap();
    assert_eq!(output.texture_asset_id, 42);
    assert_eq!(output.world_space_to_clip_space.len(), 4);
    assert_eq!(Some(output), pass.shadow_map_output());
}

#[test]
fn test_cascade_matrix_contains_camera_slice() {
    let camera = CameraSceneItem::new(Vec3::ZERO, Quat::IDENTITY);
    let light_direction = Vec3::new(0.0, -1.0, -1.0).normalize();
    let matrix = cascade_world_space_to_clip_space(&camera, 1.0, 1.0, 10.0, light_direction);

    // A point in the middle of the slice lands inside the light clip volume
    let clip = matrix * Vec4::new(0.0, 0.0, -5.0, 1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
    assert!((0.0..=1.0).contains(&ndc.z));
}
