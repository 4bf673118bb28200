use super::*;
use crate::compositor_node::{
    ClearResourcePass, CompositorTarget, DefaultCompositorPassFactory, UNLIMITED_NUMBER_OF_EXECUTIONS,
};
use crate::graphics_device::RenderTargetKind;
use crate::test_support::{forward_node_resource, ContextFixture, FORWARD_FRAMEBUFFER, MAIN_CHANNEL};

fn single_clear_node(skip_first_execution: bool, number_of_executions: u32) -> Arc<CompositorNodeResource> {
    let mut clear = ClearResourcePass::default();
    clear.base.name = "Clear".to_string();
    clear.base.skip_first_execution = skip_first_execution;
    clear.base.number_of_executions = number_of_executions;
    let mut target = CompositorTarget::new(CompositorTargetBinding::Channel(MAIN_CHANNEL));
    target.add_pass(Box::new(clear));
    let mut resource = CompositorNodeResource::new();
    resource.targets.push(target);
    Arc::new(resource)
}

fn count_clears(command_buffer: &CommandBuffer) -> usize {
    command_buffer.commands().iter().filter(|command| matches!(command, Command::Clear { .. })).count()
}

// ============================================================================
// Tests: execution requests
// ============================================================================

#[test]
fn test_skip_first_then_two_executions() {
    let fixture = ContextFixture::new(64, 64);
    let mut node = CompositorNodeInstance::new(single_clear_node(true, 2), &DefaultCompositorPassFactory::new());

    let mut ran = Vec::new();
    for _ in 0..4 {
        let mut command_buffer = CommandBuffer::new();
        let mut context = fixture.context();
        node.fill_command_buffer(&fixture.main_render_target, &mut context, &mut command_buffer).unwrap();
        ran.push(count_clears(&command_buffer) == 1);
    }

    assert_eq!(ran, vec![false, true, true, false]);
}

#[test]
fn test_unlimited_pass_runs_every_request() {
    let fixture = ContextFixture::new(64, 64);
    let mut node = CompositorNodeInstance::new(
        single_clear_node(false, UNLIMITED_NUMBER_OF_EXECUTIONS), &DefaultCompositorPassFactory::new());

    for _ in 0..5 {
        let mut command_buffer = CommandBuffer::new();
        let mut context = fixture.context();
        node.fill_command_buffer(&fixture.main_render_target, &mut context, &mut command_buffer).unwrap();
        assert_eq!(count_clears(&command_buffer), 1);
    }
}

#[test]
fn test_skipped_pass_records_nothing_and_returns_input() {
    let fixture = ContextFixture::new(64, 64);
    let mut node = CompositorNodeInstance::new(single_clear_node(true, 1), &DefaultCompositorPassFactory::new());
    let input: Arc<dyn RenderTarget> = Arc::new(crate::graphics_device::mock_graphics_device::MockRenderTarget::swapchain(8, 8));

    let mut command_buffer = CommandBuffer::new();
    let mut context = fixture.context();
    let output = node.fill_command_buffer(&input, &mut context, &mut command_buffer).unwrap();

    assert!(command_buffer.is_empty());
    assert!(is_same_render_target(&output, &input));
}

// ============================================================================
// Tests: render target switching
// ============================================================================

#[test]
fn test_forward_node_switches_render_target_once_per_target() {
    let resource = Arc::new(forward_node_resource());
    let mut fixture = ContextFixture::new(320, 200);
    fixture.declare(&resource);
    let framebuffer = fixture.materialize_framebuffer(FORWARD_FRAMEBUFFER);
    let mut node = CompositorNodeInstance::new(resource, &DefaultCompositorPassFactory::new());

    let mut command_buffer = CommandBuffer::new();
    let mut context = fixture.context();
    let output = node.fill_command_buffer(&fixture.main_render_target, &mut context, &mut command_buffer).unwrap();

    assert_eq!(command_buffer.command_names(), vec![
        "SetGraphicsRenderTarget", "SetViewport", "SetScissor",
        "BeginDebugEvent", "Clear", "EndDebugEvent",
        "BeginDebugEvent", "EndDebugEvent",
        "SetGraphicsRenderTarget", "SetViewport", "SetScissor",
        "BeginDebugEvent", "EndDebugEvent",
        "BeginDebugEvent", "DrawDebugGui", "EndDebugEvent",
    ]);
    match &command_buffer.commands()[0] {
        Command::SetGraphicsRenderTarget(bound) => assert!(is_same_render_target(bound, &framebuffer)),
        _ => panic!("expected a render target switch"),
    }
    // Channel bound passes render into the main render target
    assert!(is_same_render_target(&output, &fixture.main_render_target));
    assert_eq!(output.kind(), RenderTargetKind::Swapchain);
}

#[test]
fn test_viewport_uses_pass_depth_range_and_target_size() {
    let mut clear = ClearResourcePass::default();
    clear.base.minimum_depth = 0.5;
    clear.base.maximum_depth = 0.75;
    let mut target = CompositorTarget::new(CompositorTargetBinding::Channel(MAIN_CHANNEL));
    target.add_pass(Box::new(clear));
    let mut resource = CompositorNodeResource::new();
    resource.targets.push(target);

    let fixture = ContextFixture::new(640, 360);
    let mut node = CompositorNodeInstance::new(Arc::new(resource), &DefaultCompositorPassFactory::new());
    let mut command_buffer = CommandBuffer::new();
    let mut context = fixture.context();
    node.fill_command_buffer(&fixture.main_render_target, &mut context, &mut command_buffer).unwrap();

    match &command_buffer.commands()[1] {
        Command::SetViewport(viewport) => assert_eq!(*viewport, Viewport {
            x: 0.0,
            y: 0.0,
            width: 640.0,
            height: 360.0,
            min_depth: 0.5,
            max_depth: 0.75,
        }),
        _ => panic!("expected a viewport"),
    }
    match &command_buffer.commands()[2] {
        Command::SetScissor(scissor) => assert_eq!(*scissor, Rect2D { x: 0, y: 0, width: 640, height: 360 }),
        _ => panic!("expected a scissor"),
    }
}

#[test]
fn test_unmaterialized_framebuffer_is_an_error() {
    let resource = Arc::new(forward_node_resource());
    let mut fixture = ContextFixture::new(320, 200);
    fixture.declare(&resource);
    let mut node = CompositorNodeInstance::new(resource, &DefaultCompositorPassFactory::new());

    let mut command_buffer = CommandBuffer::new();
    let mut context = fixture.context();
    assert!(node.fill_command_buffer(&fixture.main_render_target, &mut context, &mut command_buffer).is_err());
}

#[test]
fn test_passes_missing_from_the_factory_are_left_out() {
    let node = CompositorNodeInstance::new(Arc::new(forward_node_resource()), &DefaultCompositorPassFactory::empty());
    assert_eq!(node.number_of_instance_passes(), 0);
    assert_eq!(node.compositor_node_resource().number_of_passes(), 4);
}

#[test]
fn test_pass_after_shadow_map_renders_into_the_whole_target() {
    use glam::{Quat, Vec3};
    use crate::compositor_node::{SceneResourcePass, ShadowMapResourcePass};
    use crate::scene::{CameraSceneItem, LightSceneItem, RenderQueueIndexRange};

    let mut target = CompositorTarget::new(CompositorTargetBinding::Channel(MAIN_CHANNEL));
    target.add_pass(Box::new(ShadowMapResourcePass {
        base: CompositorResourcePassBase::with_name("Shadow map"),
        number_of_shadow_cascades: 4,
        ..ShadowMapResourcePass::default()
    }));
    target.add_pass(Box::new(SceneResourcePass::new("Scene", 0, 127)));
    let mut resource = CompositorNodeResource::new();
    resource.targets.push(target);

    let mut fixture = ContextFixture::new(320, 200);
    fixture.render_queue_index_ranges = vec![RenderQueueIndexRange::new(0, 255)];
    let camera = CameraSceneItem::new(Vec3::new(0.0, 2.0, 10.0), Quat::IDENTITY);
    let light = LightSceneItem::directional(Vec3::new(-1.0, -1.0, 0.0), Vec3::ONE);
    let mut node = CompositorNodeInstance::new(Arc::new(resource), &DefaultCompositorPassFactory::new());
    let mut command_buffer = CommandBuffer::new();
    let mut context = fixture.context().with_camera(Some(&camera)).with_light(Some(&light));
    node.fill_command_buffer(&fixture.main_render_target, &mut context, &mut command_buffer).unwrap();

    // Viewport and scissor in effect at the last draw, the one of the scene pass
    let mut viewport = None;
    let mut scissor = None;
    for command in command_buffer.commands() {
        match command {
            Command::SetViewport(set) => viewport = Some(*set),
            Command::SetScissor(set) => scissor = Some(*set),
            _ => {}
        }
    }
    let draws = command_buffer.command_names().iter().filter(|name| **name == "DrawRenderables").count();
    assert_eq!(draws, 5);
    let viewport = viewport.unwrap();
    assert_eq!((viewport.x, viewport.width, viewport.height), (0.0, 320.0, 200.0));
    assert_eq!(scissor, Some(Rect2D { x: 0, y: 0, width: 320, height: 200 }));
}
