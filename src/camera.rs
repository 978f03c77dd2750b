//! Orbit camera, projection and the camera uniform.
//!
//! The camera circles a target point. Its position is kept in spherical coordinates
//! (radius, azimuth around +Y starting at +Z, polar angle measured from +Y), which makes
//! rotating, zooming and clamping trivial. [`OrbitController`] turns mouse input into
//! damped changes of those coordinates.

use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};

use crate::config::CameraConfig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Keeps the polar angle away from the poles where the view matrix degenerates.
const POLAR_EPSILON: f32 = 1e-4;
const MIN_RADIUS: f32 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub target: Point3<f32>,
    pub radius: f32,
    pub azimuth: f32,
    pub polar: f32,
}

impl Camera {
    /// A camera at `position` looking at `target`.
    pub fn looking_at(position: Point3<f32>, target: Point3<f32>) -> Self {
        let offset = position - target;
        let radius = offset.magnitude().max(MIN_RADIUS);
        let azimuth = offset.x.atan2(offset.z);
        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        Self {
            target,
            radius,
            azimuth,
            polar: clamp_polar(polar),
        }
    }

    pub fn position(&self) -> Point3<f32> {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        self.target
            + self.radius
                * Vector3::new(sin_polar * sin_azimuth, cos_polar, sin_polar * cos_azimuth)
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }

    /// Camera space x and y axes in world coordinates.
    fn right_and_up(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = (self.target - self.position()).normalize();
        let right = forward.cross(Vector3::unit_y()).normalize();
        let up = right.cross(forward);
        (right, up)
    }
}

fn clamp_polar(polar: f32) -> f32 {
    polar.clamp(POLAR_EPSILON, PI - POLAR_EPSILON)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view: Matrix4::identity().into(),
            proj: Matrix4::identity().into(),
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position().to_homogeneous().into();
        let view = camera.calc_matrix();
        let proj = projection.calc_matrix();
        self.view = view.into();
        self.proj = proj.into();
        self.view_proj = (proj * view).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Damped orbit controls: left drag rotates, right drag pans, the wheel zooms.
///
/// Input accumulates into deltas. Every [`OrbitController::update`] applies `damping` of
/// the pending delta and decays the rest, so motion eases out over a few frames.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitController {
    pub enabled: bool,
    pub damping: f32,
    pub zoom_scale: f32,
    pub rotate_speed: f32,
    azimuth_delta: f32,
    polar_delta: f32,
    pan_offset: Vector3<f32>,
    scale: f32,
}

impl OrbitController {
    pub fn new(damping: f32, zoom_scale: f32) -> Self {
        Self {
            enabled: true,
            damping,
            zoom_scale,
            rotate_speed: 1.0,
            azimuth_delta: 0.0,
            polar_delta: 0.0,
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            scale: 1.0,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.damping, config.zoom_scale)
    }

    /// Mouse movement in pixels while rotating. A drag over the full viewport height is a
    /// full turn.
    pub fn rotate(&mut self, dx: f64, dy: f64, viewport_height: u32) {
        if !self.enabled {
            return;
        }
        let height = viewport_height.max(1) as f32;
        self.azimuth_delta -= TAU * dx as f32 / height * self.rotate_speed;
        self.polar_delta -= TAU * dy as f32 / height * self.rotate_speed;
    }

    /// Mouse movement in pixels while panning. The target follows the cursor at the depth
    /// of the target.
    pub fn pan(
        &mut self,
        camera: &Camera,
        projection: &Projection,
        dx: f64,
        dy: f64,
        viewport_height: u32,
    ) {
        if !self.enabled {
            return;
        }
        let height = viewport_height.max(1) as f32;
        let world_per_pixel = 2.0 * camera.radius * (projection.fovy().0 / 2.0).tan() / height;
        let (right, up) = camera.right_and_up();
        self.pan_offset += -right * dx as f32 * world_per_pixel + up * dy as f32 * world_per_pixel;
    }

    /// Positive steps move towards the target.
    pub fn zoom(&mut self, steps: f32) {
        if !self.enabled || steps == 0.0 {
            return;
        }
        self.scale *= self.zoom_scale.powf(steps);
    }

    pub fn is_idle(&self) -> bool {
        self.azimuth_delta.abs() < f32::EPSILON
            && self.polar_delta.abs() < f32::EPSILON
            && self.pan_offset.magnitude2() < f32::EPSILON
            && self.scale == 1.0
    }

    pub fn update(&mut self, camera: &mut Camera) {
        camera.azimuth += self.azimuth_delta * self.damping;
        camera.polar = clamp_polar(camera.polar + self.polar_delta * self.damping);
        camera.radius = (camera.radius * self.scale).max(MIN_RADIUS);
        camera.target += self.pan_offset * self.damping;

        let decay = 1.0 - self.damping;
        self.azimuth_delta *= decay;
        self.polar_delta *= decay;
        self.pan_offset *= decay;
        self.scale = 1.0;
    }
}

/// Camera state and the GPU resources it feeds.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}
