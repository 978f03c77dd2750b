//! Scene data: geometry, models, textures, instances and the GPU scene graph.
//!
//! - `geometry` generates the sphere, torus, starfield and helper lines on the CPU
//! - `instance` holds per-node transforms and their GPU layout
//! - `model` contains mesh and material definitions, GPU resources for 3D models
//! - `scene_graph` turns a loaded glTF hierarchy into drawable nodes
//! - `texture` contains GPU texture wrapper and creation utilities

pub mod geometry;
pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
