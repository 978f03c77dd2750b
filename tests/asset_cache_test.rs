use std::sync::Arc;

use blackvision::resources::{
    cache::AssetCache, load_gltf_blocking, resolve_relative,
};
use futures::executor::block_on;

mod common;
use common::test_utils::{BIN_PATH, MemorySource, SCENE_PATH, scene_json};

#[test]
fn parses_the_fixture() {
    let source = MemorySource::with_black_hole().into_arc();
    let scene = load_gltf_blocking(source, SCENE_PATH).unwrap();

    assert_eq!(scene.roots.len(), 1);
    let root = &scene.roots[0];
    assert_eq!(root.name.as_deref(), Some("root"));
    assert!(root.primitives.is_empty());
    assert_eq!(root.children.len(), 1);

    let disk = scene.node(1).unwrap();
    assert_eq!(disk.name.as_deref(), Some("disk"));
    assert_eq!(disk.transform.position, cgmath::Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(disk.primitives.len(), 1);
    let primitive = &disk.primitives[0];
    assert_eq!(primitive.material, None);
    assert_eq!(primitive.mesh.vertices.len(), 3);
    assert_eq!(primitive.mesh.indices, vec![0, 1, 2]);
    assert_eq!(primitive.mesh.vertices[1].position, [1.0, 0.0, 0.0]);

    assert_eq!(scene.nodes().count(), 2);
    assert_eq!(scene.clips.len(), 1);
    assert_eq!(scene.clips[0].name, "orbit");
    assert_eq!(scene.clips[0].duration(), 1.0);
}

#[test]
fn repeated_loads_share_one_fetch() {
    let source = MemorySource::with_black_hole().into_arc();
    let cache = AssetCache::new(source.clone());

    let first = block_on(cache.load(SCENE_PATH)).unwrap();
    let second = block_on(cache.load(SCENE_PATH)).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.fetches(SCENE_PATH), 1);
    assert_eq!(source.fetches(BIN_PATH), 1);
}

#[test]
fn preload_then_load_yields_the_same_scene() {
    let source = MemorySource::with_black_hole().into_arc();
    let cache = AssetCache::new(source.clone());

    // No runtime: the entry is registered and resolves on first load
    cache.preload(SCENE_PATH);
    assert!(cache.contains(SCENE_PATH));
    assert!(cache.peek(SCENE_PATH).is_none());

    let loaded = block_on(cache.load(SCENE_PATH)).unwrap();
    let peeked = cache.peek(SCENE_PATH).unwrap().unwrap();
    assert!(Arc::ptr_eq(&loaded, &peeked));
    assert_eq!(source.fetches(SCENE_PATH), 1);
}

#[test]
fn preload_runs_on_the_ambient_runtime() {
    let source = MemorySource::with_black_hole().into_arc();
    let cache = Arc::new(AssetCache::new(source.clone()));
    let runtime = tokio::runtime::Runtime::new().unwrap();

    {
        let _guard = runtime.enter();
        cache.preload(SCENE_PATH);
    }
    let loaded = runtime.block_on(cache.load(SCENE_PATH)).unwrap();
    let again = runtime.block_on(cache.load(SCENE_PATH)).unwrap();
    assert!(Arc::ptr_eq(&loaded, &again));
    assert_eq!(source.fetches(SCENE_PATH), 1);
}

#[test]
fn failures_are_shared_too() {
    let source = MemorySource::new().into_arc();
    let cache = AssetCache::new(source.clone());

    let first = block_on(cache.load(SCENE_PATH)).unwrap_err();
    let second = block_on(cache.load(SCENE_PATH)).unwrap_err();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.to_string().contains(SCENE_PATH));
    assert_eq!(source.fetches(SCENE_PATH), 1);
}

#[test]
fn missing_buffer_is_an_error() {
    let source = MemorySource::new()
        .with_file(SCENE_PATH, scene_json())
        .into_arc();
    assert!(load_gltf_blocking(source, SCENE_PATH).is_err());
}

#[test]
fn data_uris_are_rejected() {
    let json = scene_json().replace(
        "\"uri\": \"scene.bin\"",
        "\"uri\": \"data:application/octet-stream;base64,AAAA\"",
    );
    let source = MemorySource::new().with_file(SCENE_PATH, json).into_arc();
    let err = load_gltf_blocking(source, SCENE_PATH).unwrap_err();
    assert!(err.to_string().contains("data URIs"));
}

#[test]
fn relative_uris_resolve_next_to_the_gltf() {
    assert_eq!(resolve_relative("blackhole/scene.gltf", "scene.bin"), BIN_PATH);
    assert_eq!(
        resolve_relative("a/b/model.gltf", "textures/base.png"),
        "a/b/textures/base.png"
    );
    assert_eq!(resolve_relative("model.gltf", "model.bin"), "model.bin");
}
