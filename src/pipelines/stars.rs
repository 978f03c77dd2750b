//! Starfield backdrop: one camera facing quad per star, blended additively.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{geometry::Star, texture::Texture},
    pipelines::basic::{PipelineOptions, mk_render_pipeline},
};

/// Vertices of the quad emitted per star instance.
pub const QUAD_VERTICES: u32 = 6;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StarsUniform {
    pub viewport: [f32; 2],
    pub time: f32,
    /// 1.0 for soft round stars, 0.0 for hard squares.
    pub fade: f32,
}

fn star_desc() -> wgpu::VertexBufferLayout<'static> {
    use std::mem;
    wgpu::VertexBufferLayout {
        array_stride: mem::size_of::<Star>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32,
            },
            wgpu::VertexAttribute {
                offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    }
}

/// Star instances plus the uniform animating them.
#[derive(Debug)]
pub struct StarsResources {
    pub uniform: StarsUniform,
    /// Multiplier applied to the scene clock.
    pub speed: f32,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub instances: wgpu::Buffer,
    pub amount: usize,
}

impl StarsResources {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stars: &[Star],
        fade: bool,
        speed: f32,
    ) -> Self {
        let uniform = StarsUniform {
            viewport: [1.0, 1.0],
            time: 0.0,
            fade: if fade { 1.0 } else { 0.0 },
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Stars Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("stars_bind_group"),
        });
        let instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Star Instance Buffer"),
            contents: bytemuck::cast_slice(stars),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            uniform,
            speed,
            buffer,
            bind_group,
            instances,
            amount: stars.len(),
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, elapsed: f32, viewport: [u32; 2]) {
        self.uniform.time = elapsed * self.speed;
        self.uniform.viewport = [viewport[0].max(1) as f32, viewport[1].max(1) as f32];
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
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
        label: Some("stars_bind_group_layout"),
    })
}

pub fn mk_stars_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    stars_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Stars Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout, stars_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Stars Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("stars.wgsl").into()),
    };
    let additive = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    };
    mk_render_pipeline(
        device,
        &layout,
        config.format,
        Some(wgpu::BlendState {
            color: additive,
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        }),
        Some(Texture::DEPTH_FORMAT),
        &[star_desc()],
        shader,
        PipelineOptions {
            cull_mode: None,
            depth_write: false,
            ..Default::default()
        },
    )
}
