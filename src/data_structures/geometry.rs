//! CPU-side geometry generators.
//!
//! The primitives follow the vertex order and UV conventions of the three.js geometries the
//! scene was designed with, so the dot pattern tiles the surfaces the same way:
//!
//! - [`sphere`] matches `SphereGeometry(radius, widthSegments, heightSegments)`
//! - [`torus`] matches `TorusGeometry(radius, tube, radialSegments, tubularSegments)`
//! - [`starfield`] matches drei's `<Stars />` distribution
//! - [`grid_lines`] and [`axes_lines`] match `GridHelper` and `AxesHelper`

use std::f32::consts::{PI, TAU};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::data_structures::model::ModelVertex;

/// Indexed triangle list ready to be uploaded with [`crate::data_structures::model::Mesh::from_data`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// UV sphere centered at the origin.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    let mut grid = Vec::with_capacity(height_segments as usize + 1);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        // Poles get their u shifted by half a segment so the texture doesn't pinch
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };
        let mut row = Vec::with_capacity(width_segments as usize + 1);
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let x = -radius * (u * TAU).cos() * (v * PI).sin();
            let y = radius * (v * PI).cos();
            let z = radius * (u * TAU).sin() * (v * PI).sin();
            let normal = cgmath::Vector3::new(x, y, z);
            let normal = if radius != 0.0 {
                normal / radius
            } else {
                cgmath::Vector3::unit_y()
            };
            row.push(vertices.len() as u32);
            vertices.push(ModelVertex {
                position: [x, y, z],
                tex_coords: [u + u_offset, 1.0 - v],
                normal: normal.into(),
                ..Default::default()
            });
        }
        grid.push(row);
    }

    let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    let mut mesh = MeshData { vertices, indices };
    compute_tangents(&mut mesh);
    mesh
}

/// Torus lying in the XY plane, centered at the origin.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let radial_segments = radial_segments.max(3);
    let tubular_segments = tubular_segments.max(3);

    let mut vertices =
        Vec::with_capacity(((radial_segments + 1) * (tubular_segments + 1)) as usize);
    for j in 0..=radial_segments {
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let v = j as f32 / radial_segments as f32 * TAU;

            let x = (radius + tube * v.cos()) * u.cos();
            let y = (radius + tube * v.cos()) * u.sin();
            let z = tube * v.sin();

            let center = cgmath::Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let normal = cgmath::Vector3::new(x, y, z) - center;
            let normal = if tube != 0.0 { normal / tube } else { normal };

            vertices.push(ModelVertex {
                position: [x, y, z],
                tex_coords: [
                    i as f32 / tubular_segments as f32,
                    j as f32 / radial_segments as f32,
                ],
                normal: normal.into(),
                ..Default::default()
            });
        }
    }

    let stride = tubular_segments + 1;
    let mut indices = Vec::with_capacity((radial_segments * tubular_segments * 6) as usize);
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    let mut mesh = MeshData { vertices, indices };
    compute_tangents(&mut mesh);
    mesh
}

/**
 * The generated primitives don't come with tangents and bitangents so they have to be
 * calculated for normal maps to work correctly. Triangles sharing a vertex are averaged.
 */
pub fn compute_tangents(mesh: &mut MeshData) {
    let vertices = &mut mesh.vertices;
    let mut triangles_included = vec![0u32; vertices.len()];

    for c in mesh.indices.chunks_exact(3) {
        let (i0, i1, i2) = (c[0] as usize, c[1] as usize, c[2] as usize);
        let v0 = vertices[i0];
        let v1 = vertices[i1];
        let v2 = vertices[i2];

        let pos0: cgmath::Vector3<_> = v0.position.into();
        let pos1: cgmath::Vector3<_> = v1.position.into();
        let pos2: cgmath::Vector3<_> = v2.position.into();

        let uv0: cgmath::Vector2<_> = v0.tex_coords.into();
        let uv1: cgmath::Vector2<_> = v1.tex_coords.into();
        let uv2: cgmath::Vector2<_> = v2.tex_coords.into();

        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        //     delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
        //     delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
        let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        // Degenerate UVs (the collapsed pole triangles) contribute nothing
        if det.abs() < f32::EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
        // Flipped to get right-handed normal maps with the wgpu texture coordinate system
        let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

        for i in [i0, i1, i2] {
            vertices[i].tangent = (tangent + cgmath::Vector3::from(vertices[i].tangent)).into();
            vertices[i].bitangent =
                (bitangent + cgmath::Vector3::from(vertices[i].bitangent)).into();
            triangles_included[i] += 1;
        }
    }

    for (v, n) in vertices.iter_mut().zip(triangles_included) {
        if n == 0 {
            continue;
        }
        let denom = 1.0 / n as f32;
        v.tangent = (cgmath::Vector3::from(v.tangent) * denom).into();
        v.bitangent = (cgmath::Vector3::from(v.bitangent) * denom).into();
    }
}

/// A single star of the backdrop.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Star {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
    pub _padding: f32,
}

/// Distributes `count` stars in a spherical shell between `radius` and `radius + depth`.
///
/// Each star is placed uniformly on a sphere whose radius shrinks by a random fraction of
/// `depth / count` per star. Colors walk the hue circle at fixed lightness 0.9 and the given
/// `saturation`. Sizes are `(0.5 + 0.5 * rand) * factor`. The output is deterministic for
/// a given `seed`.
pub fn starfield(
    count: u32,
    radius: f32,
    depth: f32,
    factor: f32,
    saturation: f32,
    seed: u64,
) -> Vec<Star> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut r = radius + depth;
    let increment = if count > 0 { depth / count as f32 } else { 0.0 };

    (0..count)
        .map(|i| {
            r -= increment * rng.r#gen::<f32>();
            let phi = (1.0 - rng.r#gen::<f32>() * 2.0).clamp(-1.0, 1.0).acos();
            let theta = rng.r#gen::<f32>() * TAU;
            let position = [
                r * phi.sin() * theta.sin(),
                r * phi.cos(),
                r * phi.sin() * theta.cos(),
            ];
            let color = hsl_to_rgb(i as f32 / count as f32, saturation, 0.9);
            Star {
                position,
                size: (0.5 + 0.5 * rng.r#gen::<f32>()) * factor,
                color,
                _padding: 0.0,
            }
        })
        .collect()
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [l, l, l];
    }
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let hue = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    };
    [hue(h + 1.0 / 3.0), hue(h), hue(h - 1.0 / 3.0)]
}

/// Endpoint of a helper line segment.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

const GRID_CENTER_COLOR: [f32; 3] = [0x44 as f32 / 255.0; 3];
const GRID_COLOR: [f32; 3] = [0x88 as f32 / 255.0; 3];

/// Square grid on the XZ plane as a line list. The two center lines use a darker color.
pub fn grid_lines(size: f32, divisions: u32) -> Vec<LineVertex> {
    let divisions = divisions.max(1);
    let center = divisions / 2;
    let step = size / divisions as f32;
    let half = size / 2.0;

    let mut vertices = Vec::with_capacity((divisions as usize + 1) * 4);
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if i == center {
            GRID_CENTER_COLOR
        } else {
            GRID_COLOR
        };
        vertices.push(LineVertex { position: [-half, 0.0, k], color });
        vertices.push(LineVertex { position: [half, 0.0, k], color });
        vertices.push(LineVertex { position: [k, 0.0, -half], color });
        vertices.push(LineVertex { position: [k, 0.0, half], color });
    }
    vertices
}

/// X (red), Y (green) and Z (blue) axes starting at the origin as a line list.
pub fn axes_lines(size: f32) -> Vec<LineVertex> {
    let axes = [
        ([size, 0.0, 0.0], [1.0, 0.0, 0.0]),
        ([0.0, size, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, size], [0.0, 0.0, 1.0]),
    ];
    axes.into_iter()
        .flat_map(|(end, color)| {
            [
                LineVertex { position: [0.0; 3], color },
                LineVertex { position: end, color },
            ]
        })
        .collect()
}
