#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use blackvision::resources::{AssetSource, SourceFuture};

pub const SCENE_PATH: &str = "blackhole/scene.gltf";
pub const BIN_PATH: &str = "blackhole/scene.bin";

/// Serves files from memory and counts how often each path was fetched.
#[derive(Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_string(), bytes.into());
        self
    }

    /// The fixture black hole: one triangle node below a root, animated by one clip.
    pub fn with_black_hole() -> Self {
        Self::new()
            .with_file(SCENE_PATH, scene_json())
            .with_file(BIN_PATH, scene_bin())
    }

    pub fn fetches(&self, path: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or_default()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, path: &str) -> SourceFuture {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default() += 1;
        let result = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{path} not found"));
        Box::pin(futures::future::ready(result))
    }
}

/// Positions of one triangle, two timestamps and two translations, all little endian f32.
pub fn scene_bin() -> Vec<u8> {
    let floats: [f32; 17] = [
        // positions
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, //
        // timestamps
        0.0, 1.0, //
        // translations
        0.0, 0.0, 0.0, 2.0, 0.0, 0.0,
    ];
    floats.iter().flat_map(|f| f.to_le_bytes()).collect()
}

pub fn scene_json() -> String {
    scene_json_with_clips(&["orbit"])
}

pub fn scene_json_with_clips(clip_names: &[&str]) -> String {
    r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [
    { "name": "root", "children": [1] },
    { "name": "disk", "mesh": 0, "translation": [0.0, 1.0, 0.0] }
  ],
  "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
  "buffers": [{ "uri": "scene.bin", "byteLength": 68 }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 8 },
    { "buffer": 0, "byteOffset": 44, "byteLength": 24 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5126, "count": 2, "type": "SCALAR",
      "min": [0.0], "max": [1.0] },
    { "bufferView": 2, "componentType": 5126, "count": 2, "type": "VEC3" }
  ],
  "animations": ANIMATIONS
}"#
    .replace("ANIMATIONS", &animations_json(clip_names))
}

/// One clip per name, each moving the disk node.
fn animations_json(clip_names: &[&str]) -> String {
    let clips = clip_names
        .iter()
        .map(|name| {
            format!(
                r#"{{
    "name": "{name}",
    "channels": [{{ "sampler": 0, "target": {{ "node": 1, "path": "translation" }} }}],
    "samplers": [{{ "input": 1, "output": 2, "interpolation": "LINEAR" }}]
  }}"#
            )
        })
        .collect::<Vec<_>>();
    format!("[{}]", clips.join(", "))
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
