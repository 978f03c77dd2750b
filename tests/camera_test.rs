use blackvision::{
    camera::{Camera, OrbitController, Projection},
    config::CameraConfig,
};
use cgmath::{Deg, EuclideanSpace, InnerSpace, Point3};

mod common;
use common::test_utils::approx_eq;

fn start_camera() -> Camera {
    Camera::looking_at(Point3::new(0.0, 150.0, 0.0), Point3::origin())
}

#[test]
fn looking_straight_down_stays_well_defined() {
    let camera = start_camera();
    assert!(approx_eq(camera.radius, 150.0));
    assert!(camera.polar > 0.0);
    let position = camera.position();
    assert!(approx_eq(position.y, 150.0));
    assert!(position.x.abs() < 0.1 && position.z.abs() < 0.1);
    let view = camera.calc_matrix();
    assert!(view.x.x.is_finite() && view.z.z.is_finite());
}

#[test]
fn zoom_scales_the_radius() {
    let mut camera = start_camera();
    let mut controller = OrbitController::from_config(&CameraConfig::default());
    controller.zoom(1.0);
    controller.update(&mut camera);
    assert!(approx_eq(camera.radius, 150.0 * 0.95));
    controller.zoom(-1.0);
    controller.update(&mut camera);
    assert!(approx_eq(camera.radius, 150.0));
}

#[test]
fn rotation_is_damped() {
    let mut camera = Camera::looking_at(Point3::new(0.0, 0.0, 10.0), Point3::origin());
    let mut controller = OrbitController::new(0.05, 0.95);
    controller.rotate(100.0, 0.0, 400);
    assert!(!controller.is_idle());

    let start = camera.azimuth;
    controller.update(&mut camera);
    let first_step = camera.azimuth - start;
    controller.update(&mut camera);
    let second_step = camera.azimuth - start - first_step;
    assert!(second_step.abs() < first_step.abs());

    for _ in 0..1000 {
        controller.update(&mut camera);
    }
    assert!(controller.is_idle());
    // A quarter of the viewport height is a quarter turn in total
    assert!((camera.azimuth - start + std::f32::consts::FRAC_PI_2).abs() < 1e-3);
}

#[test]
fn polar_angle_is_clamped() {
    let mut camera = Camera::looking_at(Point3::new(0.0, 0.0, 10.0), Point3::origin());
    let mut controller = OrbitController::new(1.0, 0.95);
    controller.rotate(0.0, 10_000.0, 100);
    controller.update(&mut camera);
    assert!(camera.polar > 0.0 && camera.polar < std::f32::consts::PI);
    assert!((camera.position() - Point3::origin()).magnitude() > 9.99);
}

#[test]
fn disabled_controls_ignore_input() {
    let mut camera = start_camera();
    let before = camera;
    let mut controller = OrbitController::new(0.05, 0.95);
    controller.enabled = false;
    controller.rotate(50.0, 50.0, 600);
    controller.zoom(3.0);
    controller.pan(&camera, &Projection::new(800, 600, Deg(60.0), 0.1, 100.0), 5.0, 5.0, 600);
    controller.update(&mut camera);
    assert_eq!(camera, before);
}

#[test]
fn panning_moves_the_target() {
    let mut camera = Camera::looking_at(Point3::new(0.0, 0.0, 10.0), Point3::origin());
    let projection = Projection::new(800, 600, Deg(60.0), 0.1, 100.0);
    let mut controller = OrbitController::new(1.0, 0.95);
    controller.pan(&camera, &projection, 30.0, 0.0, 600);
    controller.update(&mut camera);
    // Dragging right moves the scene right, so the target moves left
    assert!(camera.target.x < 0.0);
    assert!(approx_eq(camera.radius, 10.0));
}
