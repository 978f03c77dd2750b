use blackvision::pipelines::dot_pattern::{
    BLUE, DEFAULT_DOT_SIZE, RED, ShaderParameters, cell_noise, cell_of, displace_vertex,
    dot_mask, shade_fragment,
};

mod common;
use common::test_utils::approx_eq;

#[test]
fn rejects_non_positive_dot_size() {
    assert!(ShaderParameters::new(RED, BLUE, 0.0).is_err());
    assert!(ShaderParameters::new(RED, BLUE, -0.02).is_err());
    assert!(ShaderParameters::new(RED, BLUE, f32::NAN).is_err());
    assert!(ShaderParameters::new(RED, BLUE, f32::INFINITY).is_err());
    let params = ShaderParameters::new(RED, BLUE, DEFAULT_DOT_SIZE).unwrap();
    assert_eq!(params.dot_size(), DEFAULT_DOT_SIZE);
    assert_eq!(params.elapsed_time(), 0.0);
}

#[test]
fn default_parameters_are_red_and_blue() {
    let params = ShaderParameters::default();
    assert_eq!(params.color_red, [1.0, 0.0, 0.0]);
    assert_eq!(params.color_blue, [0.0, 0.0, 1.0]);
    assert_eq!(params.dot_size(), 0.02);
}

#[test]
fn elapsed_time_never_decreases() {
    let mut params = ShaderParameters::default();
    params.set_elapsed_time(2.5);
    params.set_elapsed_time(1.0);
    assert_eq!(params.elapsed_time(), 2.5);
    params.set_elapsed_time(f32::NAN);
    assert_eq!(params.elapsed_time(), 2.5);
    params.set_elapsed_time(3.0);
    assert_eq!(params.elapsed_time(), 3.0);
    assert_eq!(params.to_uniform().time, 3.0);
}

#[test]
fn mask_is_binary() {
    for x in -20..20 {
        for y in -20..20 {
            for t in [0.0, 0.37, 1.5, 100.0] {
                let mask = dot_mask([x as f32, y as f32], t);
                assert!(mask == 0.0 || mask == 1.0, "mask {mask} at ({x}, {y}, {t})");
            }
        }
    }
}

#[test]
fn mask_is_deterministic() {
    for (cell, t) in [([3.0, 7.0], 0.5), ([-12.0, 4.0], 9.25), ([0.0, 0.0], 0.0)] {
        assert_eq!(dot_mask(cell, t), dot_mask(cell, t));
        assert_eq!(cell_noise(cell), cell_noise(cell));
    }
}

#[test]
fn noise_stays_in_unit_interval() {
    for x in 0..50 {
        let n = cell_noise([x as f32, (x * 7) as f32]);
        assert!((0.0..1.0).contains(&n));
    }
}

#[test]
fn cells_follow_the_double_scaling() {
    // scale = 1 / 0.02 * 20 = 1000, then divided by 0.02 again
    let cell = cell_of([0.001, 0.0005], 0.02);
    assert_eq!(cell, [50.0, 25.0]);
    assert_eq!(cell_of([0.0, 0.0], 0.02), [0.0, 0.0]);
}

#[test]
fn fragments_are_either_colour() {
    let mut params = ShaderParameters::default();
    params.set_elapsed_time(4.0);
    let mut seen_red = false;
    let mut seen_blue = false;
    for i in 0..400 {
        let uv = [i as f32 * 0.00037, i as f32 * 0.00091];
        let fragment = shade_fragment(uv, &params);
        if fragment.color == RED {
            assert_eq!(fragment.alpha, 1.0);
            seen_red = true;
        } else {
            assert_eq!(fragment.color, BLUE);
            assert_eq!(fragment.alpha, 0.0);
            seen_blue = true;
        }
    }
    assert!(seen_red && seen_blue);
}

#[test]
fn vertex_wobble_is_uniform_across_axes() {
    let displaced = displace_vertex([1.0, 2.0, 3.0], 0.5);
    let offset = (0.5f32 + 5.0).sin() * 0.05;
    assert!(approx_eq(displaced[0], 1.0 + offset));
    assert!(approx_eq(displaced[1], 2.0 + offset));
    assert!(approx_eq(displaced[2], 3.0 + offset));

    for x in [-3.0, 0.0, 0.4, 10.0] {
        let p = displace_vertex([x, 0.0, 0.0], 1.0);
        assert!((p[0] - x).abs() <= 0.05 + 1e-6);
    }
}
