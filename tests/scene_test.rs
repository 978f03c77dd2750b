use std::f32::consts::FRAC_PI_2;

use blackvision::{
    config::SceneConfig,
    controller::{ButtonId, OverlayState, ViewportController},
    data_structures::instance::Instance,
    overlay::ShapeKind,
    scene::{NodeContent, compose},
};
use cgmath::{Rotation, Vector3};

mod common;
use common::test_utils::approx_eq;

fn hidden() -> OverlayState {
    OverlayState::default()
}

#[test]
fn always_contains_the_fixed_nodes() {
    let config = SceneConfig::default();
    let scene = compose(&hidden(), &config);

    assert_eq!(
        scene.find("ambient_light").unwrap().content,
        NodeContent::AmbientLight { intensity: 0.6 }
    );
    let point = scene.find("point_light").unwrap();
    assert_eq!(point.content, NodeContent::PointLight { intensity: 1.5 });
    assert_eq!(point.transform.position, Vector3::new(100.0, 100.0, 100.0));
    let directional = scene.find("directional_light").unwrap();
    assert_eq!(
        directional.content,
        NodeContent::DirectionalLight { intensity: 1.0 }
    );
    assert_eq!(
        directional.transform.position,
        Vector3::new(-50.0, 50.0, 50.0)
    );

    match &scene.find("stars").unwrap().content {
        NodeContent::Starfield(stars) => {
            assert_eq!(stars.count, 5000);
            assert_eq!(stars.radius, 300.0);
            assert_eq!(stars.depth, 60.0);
            assert_eq!(stars.factor, 4.0);
            assert_eq!(stars.saturation, 0.0);
            assert!(stars.fade);
            assert_eq!(stars.speed, 1.0);
        }
        other => panic!("unexpected star node {other:?}"),
    }

    let (asset, placement) = scene.black_hole().unwrap();
    assert_eq!(asset, "blackhole/scene.gltf");
    assert_eq!(placement.scale, Vector3::new(50.0, 50.0, 50.0));
    assert_eq!(placement.position, Vector3::new(0.0, 0.0, 0.0));

    assert_eq!(
        scene.find("axes_helper").unwrap().content,
        NodeContent::AxesHelper { size: 100.0 }
    );
    assert_eq!(
        scene.find("grid_helper").unwrap().content,
        NodeContent::GridHelper {
            size: 500.0,
            divisions: 50
        }
    );
    assert!(scene.has_orbit_controls());
    assert!(scene.overlay().is_none());
}

#[test]
fn overlay_follows_visibility_and_shape() {
    let config = SceneConfig::default();
    let ring = compose(
        &OverlayState {
            visible: true,
            shape: ShapeKind::Ring,
        },
        &config,
    );
    let (kind, transform) = ring.overlay().unwrap();
    assert_eq!(kind, ShapeKind::Ring);
    assert_eq!(transform.position, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(transform.scale, Vector3::new(4.0, 4.0, 4.0));
    // A quarter turn around X maps +Y onto +Z
    let rotated = transform.rotation.rotate_vector(Vector3::unit_y());
    assert!(approx_eq(rotated.z, 1.0) && approx_eq(rotated.y, 0.0));

    let sphere = compose(
        &OverlayState {
            visible: true,
            shape: ShapeKind::Sphere,
        },
        &config,
    );
    let (kind, transform) = sphere.overlay().unwrap();
    assert_eq!(kind, ShapeKind::Sphere);
    assert_eq!(transform, Instance::new().with_position([110.0, 0.0, 0.0]));
}

#[test]
fn hidden_shape_changes_do_not_change_the_scene() {
    let config = SceneConfig::default();
    let ring = compose(&hidden(), &config);
    let sphere = compose(
        &OverlayState {
            visible: false,
            shape: ShapeKind::Sphere,
        },
        &config,
    );
    assert_eq!(ring, sphere);
}

#[test]
fn button_scenario() {
    let config = SceneConfig::default();
    let mut controller = ViewportController::new();
    assert!(compose(&controller.state(), &config).overlay().is_none());

    controller.click(ButtonId::Blackvision);
    let scene = compose(&controller.state(), &config);
    assert_eq!(
        scene.overlay(),
        Some((ShapeKind::Ring, ShapeKind::Ring.placement()))
    );

    controller.click(ButtonId::Analysis);
    let scene = compose(&controller.state(), &config);
    let (kind, transform) = scene.overlay().unwrap();
    assert_eq!(kind, ShapeKind::Sphere);
    assert_eq!(transform.position, Vector3::new(110.0, 0.0, 0.0));
    assert_eq!(ShapeKind::SPHERE_RADIUS, 15.0);

    controller.click(ButtonId::Blackvision);
    let scene = compose(&controller.state(), &config);
    assert!(scene.overlay().is_none());
    assert!(scene.black_hole().is_some());
    assert!(scene.find("stars").is_some());
}

#[test]
fn lights_end_up_in_the_uniform() {
    let config = SceneConfig::default();
    let uniform = compose(&hidden(), &config).light_uniform([1.0, 1.0, 1.0]);
    assert_eq!(uniform.ambient_intensity, 0.6);
    assert_eq!(uniform.point_position, [100.0, 100.0, 100.0]);
    assert_eq!(uniform.point_intensity, 1.5);
    assert_eq!(uniform.directional_position, [-50.0, 50.0, 50.0]);
    assert_eq!(uniform.directional_intensity, 1.0);
    assert_eq!(uniform.color, [1.0, 1.0, 1.0]);
}

#[test]
fn composition_is_pure() {
    let config = SceneConfig::default();
    let state = OverlayState {
        visible: true,
        shape: ShapeKind::Sphere,
    };
    assert_eq!(compose(&state, &config), compose(&state, &config));
}
