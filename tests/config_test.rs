use blackvision::{
    config::{BLACK_HOLE_ASSET, SceneConfig, hex_rgb, srgb_to_linear},
    pipelines::dot_pattern::{BLUE, RED, ShaderParameters},
};

mod common;
use common::test_utils::approx_eq;

#[test]
fn default_config_is_valid() {
    let config = SceneConfig::default();
    config.validate().unwrap();
    assert_eq!(config.camera.position, [0.0, 150.0, 0.0]);
    assert_eq!(config.camera.fovy_degrees, 60.0);
    assert_eq!(config.camera.zfar, 10000.0);
    assert_eq!(config.black_hole.asset, BLACK_HOLE_ASSET);
    assert_eq!(config.black_hole.scale, 50.0);
    assert_eq!(config.shader.dot_size(), 0.02);
}

#[test]
fn rejects_degenerate_values() {
    let mut config = SceneConfig::default();
    config.camera.fovy_degrees = 0.0;
    assert!(config.validate().is_err());

    let mut config = SceneConfig::default();
    config.camera.znear = 100.0;
    config.camera.zfar = 10.0;
    assert!(config.validate().is_err());

    let mut config = SceneConfig::default();
    config.camera.position = config.camera.target;
    assert!(config.validate().is_err());

    let mut config = SceneConfig::default();
    config.stars.count = 0;
    assert!(config.validate().is_err());

    let mut config = SceneConfig::default();
    config.black_hole.asset.clear();
    assert!(config.validate().is_err());

    let mut config = SceneConfig::default();
    config.shader = ShaderParameters::new(RED, BLUE, 0.5).unwrap();
    config.validate().unwrap();
}

#[test]
fn hex_colours_unpack() {
    assert_eq!(hex_rgb(0xffffff), [1.0, 1.0, 1.0]);
    assert_eq!(hex_rgb(0x000000), [0.0, 0.0, 0.0]);
    assert_eq!(hex_rgb(0xff0000), [1.0, 0.0, 0.0]);
    assert_eq!(hex_rgb(0x007bff)[1], 0x7b as f32 / 255.0);
}

#[test]
fn srgb_conversion_keeps_the_ends() {
    assert_eq!(srgb_to_linear([0.0, 1.0, 0.0]), [0.0, 1.0, 0.0]);
    let [mid, _, _] = srgb_to_linear([0.5, 0.0, 0.0]);
    assert!(approx_eq(mid, 0.21404));
}
