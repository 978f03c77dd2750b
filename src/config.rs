//! Scene constants.
//!
//! Everything the scene composer and the renderer need to know about the scene lives in
//! [`SceneConfig`]. The default is the stock black-hole scene; [`SceneConfig::validate`]
//! guards the values that would otherwise produce NaNs or an empty frame.

use anyhow::ensure;

use crate::pipelines::dot_pattern::ShaderParameters;

/// Logical path of the black hole asset below the asset root.
pub const BLACK_HOLE_ASSET: &str = "blackhole/scene.gltf";

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    /// Fraction of the remaining orbit motion applied per frame.
    pub damping: f32,
    /// Distance multiplier per wheel step towards the target.
    pub zoom_scale: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 150.0, 0.0],
            target: [0.0, 0.0, 0.0],
            fovy_degrees: 60.0,
            znear: 0.1,
            zfar: 10000.0,
            damping: 0.05,
            zoom_scale: 0.95,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightConfig {
    pub ambient_intensity: f32,
    pub point_position: [f32; 3],
    pub point_intensity: f32,
    pub directional_position: [f32; 3],
    pub directional_intensity: f32,
    pub color: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.6,
            point_position: [100.0, 100.0, 100.0],
            point_intensity: 1.5,
            directional_position: [-50.0, 50.0, 50.0],
            directional_intensity: 1.0,
            color: [1.0, 1.0, 1.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StarfieldConfig {
    pub radius: f32,
    pub depth: f32,
    pub count: u32,
    pub factor: f32,
    pub saturation: f32,
    pub fade: bool,
    pub speed: f32,
    pub seed: u64,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            radius: 300.0,
            depth: 60.0,
            count: 5000,
            factor: 4.0,
            saturation: 0.0,
            fade: true,
            speed: 1.0,
            seed: 0x5eed,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HelperConfig {
    pub axes_size: f32,
    pub grid_size: f32,
    pub grid_divisions: u32,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            axes_size: 100.0,
            grid_size: 500.0,
            grid_divisions: 50,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlackHoleConfig {
    pub asset: String,
    pub position: [f32; 3],
    pub scale: f32,
}

impl Default for BlackHoleConfig {
    fn default() -> Self {
        Self {
            asset: BLACK_HOLE_ASSET.to_string(),
            position: [0.0, 0.0, 0.0],
            scale: 50.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub lights: LightConfig,
    pub stars: StarfieldConfig,
    pub helpers: HelperConfig,
    pub black_hole: BlackHoleConfig,
    pub shader: ShaderParameters,
}

impl SceneConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let camera = &self.camera;
        ensure!(
            camera.fovy_degrees > 0.0 && camera.fovy_degrees < 180.0,
            "camera fov must be within (0, 180) degrees, got {}",
            camera.fovy_degrees
        );
        ensure!(
            camera.znear > 0.0 && camera.zfar > camera.znear,
            "camera clip planes must satisfy 0 < near < far, got {} and {}",
            camera.znear,
            camera.zfar
        );
        ensure!(
            camera.position != camera.target,
            "camera position and target must differ"
        );
        ensure!(
            (0.0..=1.0).contains(&camera.damping) && camera.damping > 0.0,
            "camera damping must be within (0, 1], got {}",
            camera.damping
        );
        ensure!(
            camera.zoom_scale > 0.0 && camera.zoom_scale < 1.0,
            "zoom scale must be within (0, 1), got {}",
            camera.zoom_scale
        );
        ensure!(self.stars.count > 0, "the starfield needs at least one star");
        ensure!(
            self.stars.radius > 0.0 && self.stars.depth >= 0.0,
            "starfield radius must be positive and depth non-negative"
        );
        ensure!(
            self.black_hole.scale > 0.0,
            "black hole scale must be positive, got {}",
            self.black_hole.scale
        );
        ensure!(
            !self.black_hole.asset.is_empty(),
            "black hole asset path is empty"
        );
        ShaderParameters::new(
            self.shader.color_red,
            self.shader.color_blue,
            self.shader.dot_size(),
        )?;
        Ok(())
    }
}

/// `0xRRGGBB` to sRGB components in `[0, 1]`.
pub fn hex_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Converts an sRGB colour to linear space, which is what sRGB render targets expect.
pub fn srgb_to_linear(rgb: [f32; 3]) -> [f32; 3] {
    rgb.map(|c| {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    })
}
