//! Render pipelines and the GPU resources bound to them.
//!
//! - `basic`: the shared pipeline builder and the lit model pipeline
//! - `dot_pattern`: the dotted overlay surface shader
//! - `light`: ambient, point and directional light uniforms
//! - `stars`: the additive starfield sprites
//! - `lines`: axes and grid helpers
//! - `gui`: coloured button quads
//! - `text`: button captions (feature `ui`)

pub mod basic;
pub mod dot_pattern;
pub mod gui;
pub mod light;
pub mod lines;
pub mod stars;
#[cfg(feature = "ui")]
pub mod text;
