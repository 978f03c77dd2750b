//! The black-vision overlay: a dotted sphere or ring.

use std::{collections::HashMap, f32::consts::FRAC_PI_2};

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        geometry::{self, MeshData},
        instance::Instance,
        model::Mesh,
    },
    pipelines::dot_pattern::ShaderParameters,
    render::{Dotted, Render},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Sphere,
    #[default]
    Ring,
}

impl ShapeKind {
    pub const SPHERE_RADIUS: f32 = 15.0;
    pub const SPHERE_SEGMENTS: u32 = 64;
    pub const RING_RADIUS: f32 = 10.0;
    pub const RING_TUBE: f32 = 1.0;
    pub const RING_RADIAL_SEGMENTS: u32 = 16;
    pub const RING_TUBULAR_SEGMENTS: u32 = 100;

    pub fn toggled(self) -> Self {
        match self {
            ShapeKind::Sphere => ShapeKind::Ring,
            ShapeKind::Ring => ShapeKind::Sphere,
        }
    }

    /// Where the shape sits in the scene.
    pub fn placement(self) -> Instance {
        match self {
            ShapeKind::Sphere => Instance::new().with_position([110.0, 0.0, 0.0]),
            ShapeKind::Ring => Instance::new()
                .with_euler(FRAC_PI_2, 0.0, 0.0)
                .with_uniform_scale(4.0),
        }
    }

    pub fn geometry(self) -> MeshData {
        match self {
            ShapeKind::Sphere => geometry::sphere(
                Self::SPHERE_RADIUS,
                Self::SPHERE_SEGMENTS,
                Self::SPHERE_SEGMENTS,
            ),
            ShapeKind::Ring => geometry::torus(
                Self::RING_RADIUS,
                Self::RING_TUBE,
                Self::RING_RADIAL_SEGMENTS,
                Self::RING_TUBULAR_SEGMENTS,
            ),
        }
    }
}

/// Uploaded geometry of one shape kind plus the instance buffer placing it.
#[derive(Debug)]
struct ShapeMesh {
    mesh: Mesh,
    instance: wgpu::Buffer,
    transform: Instance,
}

/// GPU state of the overlay. Meshes are built the first time a kind is shown and reused
/// afterwards.
#[derive(Debug)]
pub struct OverlayShape {
    params: ShaderParameters,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    meshes: HashMap<ShapeKind, ShapeMesh>,
}

impl OverlayShape {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        params: ShaderParameters,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Dot Pattern Uniform Buffer"),
            contents: bytemuck::cast_slice(&[params.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("dot_pattern_bind_group"),
        });
        Self {
            params,
            buffer,
            bind_group,
            meshes: HashMap::new(),
        }
    }

    /// Makes sure `kind` is uploaded and placed at `transform`.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        kind: ShapeKind,
        transform: Instance,
    ) {
        let shape = self.meshes.entry(kind).or_insert_with(|| {
            log::debug!("building {kind:?} overlay geometry");
            let data = kind.geometry();
            let mesh = Mesh::from_data(device, &format!("{kind:?} overlay"), &data, 0);
            let instance = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Overlay Instance Buffer"),
                contents: bytemuck::cast_slice(&[transform.to_raw()]),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
            ShapeMesh {
                mesh,
                instance,
                transform,
            }
        });
        if shape.transform != transform {
            shape.transform = transform;
            queue.write_buffer(&shape.instance, 0, bytemuck::cast_slice(&[transform.to_raw()]));
        }
    }

    /// Writes the frame time into the shader uniform. Call once per frame before drawing.
    pub fn on_frame(&mut self, queue: &wgpu::Queue, elapsed_seconds: f32) {
        self.params.set_elapsed_time(elapsed_seconds);
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::cast_slice(&[self.params.to_uniform()]),
        );
    }

    pub fn get_render(&self, kind: ShapeKind) -> Render<'_> {
        match self.meshes.get(&kind) {
            Some(shape) => Render::Dotted(Dotted {
                mesh: &shape.mesh,
                instance: &shape.instance,
                group: &self.bind_group,
            }),
            None => {
                log::warn!("{kind:?} overlay was not prepared before rendering");
                Render::None
            }
        }
    }
}
