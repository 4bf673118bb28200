use super::*;
use crate::compositor_node::loader::write_compositor_node;
use crate::compositor_node::DefaultCompositorPassFactory;
use crate::error::Error;
use crate::resource::MemoryAssetSource;
use crate::test_support::{forward_node_resource, MAIN_CHANNEL};
use crate::utils::string_id;

const FORWARD_NODE: AssetId = string_id("ForwardNode");

fn setup(factory: Arc<dyn CompositorPassFactory>) -> (Arc<MemoryAssetSource>, CompositorNodeResourceManager) {
    let source = Arc::new(MemoryAssetSource::new());
    source.insert(FORWARD_NODE, write_compositor_node(&forward_node_resource())).unwrap();
    let streamer = Arc::new(ResourceStreamer::new(source.clone()).unwrap());
    (source, CompositorNodeResourceManager::new(streamer, factory))
}

#[test]
fn test_load_and_enforce_fully_loaded() {
    let (_source, mut manager) = setup(Arc::new(DefaultCompositorPassFactory::new()));

    let id = manager.load_compositor_node_resource_by_asset_id(FORWARD_NODE).unwrap();
    manager.enforce_fully_loaded(id).unwrap();

    let resource = manager.try_get_by_id(id).unwrap();
    assert_eq!(resource.output_channels, vec![MAIN_CHANNEL]);
    assert_eq!(resource.number_of_passes(), 4);
    assert_eq!(manager.loading_state(id), Some(LoadingState::Loaded));
    assert_eq!(manager.loading_generation(id), Some(1));
    assert_eq!(manager.id_by_asset_id(FORWARD_NODE), Some(id));
}

#[test]
fn test_same_asset_is_loaded_once() {
    let (_source, mut manager) = setup(Arc::new(DefaultCompositorPassFactory::new()));

    let a = manager.load_compositor_node_resource_by_asset_id(FORWARD_NODE).unwrap();
    let b = manager.load_compositor_node_resource_by_asset_id(FORWARD_NODE).unwrap();

    assert_eq!(a, b);
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_missing_asset_fails_to_load() {
    let (_source, mut manager) = setup(Arc::new(DefaultCompositorPassFactory::new()));

    let id = manager.load_compositor_node_resource_by_asset_id(string_id("Missing")).unwrap();

    assert!(matches!(manager.enforce_fully_loaded(id), Err(Error::InvalidAsset(_))));
    assert_eq!(manager.loading_state(id), Some(LoadingState::Failed));
    assert!(manager.try_get_by_id(id).is_none());
}

#[test]
fn test_flush_completes_every_load() {
    let (source, mut manager) = setup(Arc::new(DefaultCompositorPassFactory::new()));
    source.insert(string_id("Empty"), write_compositor_node(&CompositorNodeResource::new())).unwrap();

    let forward = manager.load_compositor_node_resource_by_asset_id(FORWARD_NODE).unwrap();
    let empty = manager.load_compositor_node_resource_by_asset_id(string_id("Empty")).unwrap();
    manager.flush();

    assert!(!manager.has_pending_loads());
    assert!(manager.try_get_by_id(forward).is_some());
    assert_eq!(manager.try_get_by_id(empty).map(|node| node.number_of_passes()), Some(0));
}

#[test]
fn test_replacing_the_factory_reloads_nodes() {
    let (_source, mut manager) = setup(Arc::new(DefaultCompositorPassFactory::empty()));
    let id = manager.load_compositor_node_resource_by_asset_id(FORWARD_NODE).unwrap();
    manager.enforce_fully_loaded(id).unwrap();
    assert_eq!(manager.try_get_by_id(id).unwrap().number_of_passes(), 0);

    manager.set_compositor_pass_factory(Arc::new(DefaultCompositorPassFactory::new())).unwrap();
    manager.enforce_fully_loaded(id).unwrap();

    assert_eq!(manager.try_get_by_id(id).unwrap().number_of_passes(), 4);
    assert_eq!(manager.loading_generation(id), Some(2));
}
