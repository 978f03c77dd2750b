//! The dotted two-tone surface shader of the overlay.
//!
//! The GPU version lives in `dot_pattern.wgsl`. The functions in this module compute the
//! same math on the CPU so the pattern can be reasoned about (and tested) without a GPU.
//!
//! Per vertex the position is wobbled by `sin(time + x * 5) * 0.05` along all three axes.
//! Per fragment the UV plane is cut into cells, every cell gets a pseudo random value that
//! drifts slowly with time, and cells above one half are painted red, the rest blue.

use anyhow::ensure;

use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{PipelineOptions, mk_render_pipeline},
};

pub const DEFAULT_DOT_SIZE: f32 = 0.02;
pub const RED: [f32; 3] = [1.0, 0.0, 0.0];
pub const BLUE: [f32; 3] = [0.0, 0.0, 1.0];

/// Inputs of the dot pattern. Construct through [`ShaderParameters::new`] to get a
/// validated `dot_size`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShaderParameters {
    pub color_red: [f32; 3],
    pub color_blue: [f32; 3],
    elapsed_time: f32,
    dot_size: f32,
}

impl ShaderParameters {
    pub fn new(color_red: [f32; 3], color_blue: [f32; 3], dot_size: f32) -> anyhow::Result<Self> {
        ensure!(
            dot_size.is_finite() && dot_size > 0.0,
            "dot size must be a positive number, got {dot_size}"
        );
        Ok(Self {
            color_red,
            color_blue,
            elapsed_time: 0.0,
            dot_size,
        })
    }

    pub fn dot_size(&self) -> f32 {
        self.dot_size
    }

    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    /// Advances the clock. Time never runs backwards, earlier values are ignored.
    pub fn set_elapsed_time(&mut self, seconds: f32) {
        if seconds.is_finite() {
            self.elapsed_time = self.elapsed_time.max(seconds);
        }
    }

    pub fn to_uniform(&self) -> DotPatternUniform {
        DotPatternUniform {
            color_red: self.color_red,
            time: self.elapsed_time,
            color_blue: self.color_blue,
            dot_size: self.dot_size,
        }
    }
}

impl Default for ShaderParameters {
    fn default() -> Self {
        Self {
            color_red: RED,
            color_blue: BLUE,
            elapsed_time: 0.0,
            dot_size: DEFAULT_DOT_SIZE,
        }
    }
}

/// GPU layout of [`ShaderParameters`]. The scalars fill the padding after each `vec3`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DotPatternUniform {
    pub color_red: [f32; 3],
    pub time: f32,
    pub color_blue: [f32; 3],
    pub dot_size: f32,
}

/// Colour and edge alpha of one fragment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    pub color: [f32; 3],
    pub alpha: f32,
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Vertex wobble: the same scalar offset is added to every component.
pub fn displace_vertex(position: [f32; 3], time: f32) -> [f32; 3] {
    let offset = (time + position[0] * 5.0).sin() * 0.05;
    position.map(|c| c + offset)
}

/// Cell a UV coordinate falls into.
///
/// The UV plane is scaled by `20 / dot_size` and then divided by `dot_size` once more.
pub fn cell_of(uv: [f32; 2], dot_size: f32) -> [f32; 2] {
    let scale = 1.0 / dot_size * 20.0;
    uv.map(|c| (c * scale / dot_size).floor())
}

/// Stable pseudo random value in `[0, 1)` for a cell.
pub fn cell_noise(cell: [f32; 2]) -> f32 {
    fract((cell[0] * 12.9898 + cell[1] * 78.233).sin() * 43758.5453)
}

/// 1 for a red cell, 0 for a blue one.
pub fn dot_mask(cell: [f32; 2], time: f32) -> f32 {
    let n = cell_noise(cell) + (time * 2.0 + cell[0] + cell[1]).sin() * 0.1;
    step(0.5, fract(n))
}

pub fn shade_fragment(uv: [f32; 2], params: &ShaderParameters) -> Fragment {
    let mask = dot_mask(cell_of(uv, params.dot_size), params.elapsed_time);
    Fragment {
        color: mix(params.color_blue, params.color_red, mask),
        alpha: smoothstep(0.4, 0.6, mask),
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("dot_pattern_bind_group_layout"),
    })
}

/// Pipeline for the overlay. Opaque: the computed alpha ends up in the target but nothing
/// behind the overlay shows through.
pub fn mk_dot_pattern_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    dot_pattern_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Dot Pattern Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout, dot_pattern_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Dot Pattern Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("dot_pattern.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        config.format,
        Some(wgpu::BlendState::REPLACE),
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
        PipelineOptions {
            // The wobble can expose inner faces of the torus
            cull_mode: None,
            ..Default::default()
        },
    )
}
