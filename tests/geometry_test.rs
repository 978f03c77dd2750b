use blackvision::{
    data_structures::geometry::{axes_lines, grid_lines, sphere, starfield, torus},
    overlay::ShapeKind,
};
use cgmath::InnerSpace;

mod common;
use common::test_utils::approx_eq;

#[test]
fn sphere_has_the_expected_topology() {
    let mesh = sphere(15.0, 64, 64);
    assert_eq!(mesh.vertices.len(), 65 * 65);
    // The pole rows contribute one triangle per segment
    assert_eq!(mesh.triangle_count(), 64 * 64 * 2 - 2 * 64);
    assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    for vertex in &mesh.vertices {
        let p: cgmath::Vector3<f32> = vertex.position.into();
        assert!(approx_eq(p.magnitude(), 15.0));
        assert!((0.0..=1.0).contains(&vertex.tex_coords[1]));
    }
}

#[test]
fn torus_has_the_expected_topology() {
    let mesh = torus(10.0, 1.0, 16, 100);
    assert_eq!(mesh.vertices.len(), 17 * 101);
    assert_eq!(mesh.triangle_count(), 16 * 100 * 2);
    for vertex in &mesh.vertices {
        let [x, y, z] = vertex.position;
        let ring_distance = (x * x + y * y).sqrt() - 10.0;
        let tube_distance = (ring_distance * ring_distance + z * z).sqrt();
        assert!(approx_eq(tube_distance, 1.0));
        let n: cgmath::Vector3<f32> = vertex.normal.into();
        assert!(approx_eq(n.magnitude(), 1.0));
    }
}

#[test]
fn shape_kinds_use_their_geometry() {
    assert_eq!(ShapeKind::Sphere.geometry(), sphere(15.0, 64, 64));
    assert_eq!(ShapeKind::Ring.geometry(), torus(10.0, 1.0, 16, 100));
    assert_eq!(ShapeKind::Ring.toggled(), ShapeKind::Sphere);
    assert_eq!(ShapeKind::default(), ShapeKind::Ring);
}

#[test]
fn starfield_is_seeded_and_bounded() {
    let stars = starfield(5000, 300.0, 60.0, 4.0, 0.0, 7);
    assert_eq!(stars.len(), 5000);
    assert_eq!(stars, starfield(5000, 300.0, 60.0, 4.0, 0.0, 7));
    assert_ne!(stars, starfield(5000, 300.0, 60.0, 4.0, 0.0, 8));
    for star in &stars {
        let p: cgmath::Vector3<f32> = star.position.into();
        let r = p.magnitude();
        assert!(r >= 300.0 - 1e-2 && r <= 360.0 + 1e-2, "radius {r}");
        assert!(star.size >= 2.0 && star.size <= 4.0);
        // Zero saturation yields grey stars
        assert_eq!(star.color[0], star.color[1]);
        assert_eq!(star.color[1], star.color[2]);
    }
}

#[test]
fn helpers_are_line_lists() {
    let grid = grid_lines(500.0, 50);
    assert_eq!(grid.len(), 51 * 4);
    assert!(grid.iter().all(|v| v.position[1] == 0.0));
    assert!(
        grid.iter()
            .all(|v| v.position[0].abs() <= 250.0 && v.position[2].abs() <= 250.0)
    );

    let axes = axes_lines(100.0);
    assert_eq!(axes.len(), 6);
    assert_eq!(axes[1].position, [100.0, 0.0, 0.0]);
    assert_eq!(axes[3].position, [0.0, 100.0, 0.0]);
    assert_eq!(axes[5].position, [0.0, 0.0, 100.0]);
}
