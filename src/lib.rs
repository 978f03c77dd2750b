//! blackvision
//!
//! An interactive black hole scene rendered with wgpu on native targets and the web. An
//! animated glTF black hole sits in a starfield. Two buttons toggle a dotted
//! "dual-wavelength" overlay and switch it between a ring around the black hole and a
//! sphere off to the side.
//!
//! High-level modules
//! - `black_hole`: the animated model, uploaded once its asset resolves
//! - `camera`: orbit camera, projection and uniforms for view/projection
//! - `config`: every scene constant and its validation
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `controller`: overlay state and the button layout
//! - `data_structures`: meshes, instances, textures and the GPU scene graph
//! - `flow`: the winit event loop driving everything
//! - `overlay`: the dotted sphere or ring
//! - `pipelines`: definitions for the render pipelines (model, dot pattern, stars, lines, gui)
//! - `render`: render composition for efficient pipeline reuse
//! - `resources`: asset fetching, glTF parsing, caching and animation playback
//! - `scene`: the declarative scene composed from the overlay state
//!

pub mod black_hole;
pub mod camera;
pub mod config;
pub mod context;
pub mod controller;
pub mod data_structures;
pub mod flow;
pub mod overlay;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

pub use flow::run;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run().map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{e:#}")))
}
