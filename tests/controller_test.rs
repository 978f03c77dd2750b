use blackvision::{
    controller::{
        BUTTON_BOTTOM, BUTTON_GAP, BUTTON_HEIGHT, BUTTON_WIDTH, ButtonId, DISABLED_OPACITY,
        OverlayState, ViewportController,
    },
    overlay::ShapeKind,
    pipelines::gui::tessellate,
};
use winit::dpi::PhysicalPosition;

const SURFACE: [u32; 2] = [1280, 720];

fn center_of(controller: &ViewportController, id: ButtonId, scale: f64) -> PhysicalPosition<f64> {
    let button = controller
        .buttons(SURFACE, scale)
        .into_iter()
        .find(|b| b.id == id)
        .unwrap();
    PhysicalPosition::new(
        (button.rect.origin[0] + button.rect.size[0] / 2.0) as f64,
        (button.rect.origin[1] + button.rect.size[1] / 2.0) as f64,
    )
}

#[test]
fn starts_hidden_with_the_ring() {
    let controller = ViewportController::new();
    assert_eq!(
        controller.state(),
        OverlayState {
            visible: false,
            shape: ShapeKind::Ring
        }
    );
    assert!(controller.is_enabled(ButtonId::Blackvision));
    assert!(!controller.is_enabled(ButtonId::Analysis));
}

#[test]
fn toggling_the_overlay_twice_restores_it() {
    let mut controller = ViewportController::new();
    let before = controller.state();
    controller.toggle_overlay();
    assert!(controller.state().visible);
    controller.toggle_overlay();
    assert_eq!(controller.state(), before);
}

#[test]
fn all_four_states_are_reachable() {
    let mut controller = ViewportController::new();
    let mut seen = vec![controller.state()];
    controller.toggle_overlay();
    seen.push(controller.state());
    controller.toggle_shape();
    seen.push(controller.state());
    controller.toggle_overlay();
    seen.push(controller.state());
    seen.sort_by_key(|s| (s.visible, s.shape == ShapeKind::Ring));
    seen.dedup();
    assert_eq!(seen.len(), 4);
}

#[test]
fn disabled_shape_button_ignores_clicks() {
    let mut controller = ViewportController::new();
    controller.take_dirty();
    assert!(!controller.click(ButtonId::Analysis));
    assert_eq!(controller.state().shape, ShapeKind::Ring);
    assert!(!controller.take_dirty());

    assert!(controller.click(ButtonId::Blackvision));
    assert!(controller.click(ButtonId::Analysis));
    assert_eq!(controller.state().shape, ShapeKind::Sphere);
}

#[test]
fn hidden_shape_toggle_is_remembered() {
    let mut controller = ViewportController::new();
    controller.toggle_shape();
    assert_eq!(
        controller.state(),
        OverlayState {
            visible: false,
            shape: ShapeKind::Sphere
        }
    );
    controller.toggle_overlay();
    assert_eq!(controller.state().shape, ShapeKind::Sphere);
}

#[test]
fn dirty_flag_is_taken_once() {
    let mut controller = ViewportController::new();
    assert!(controller.take_dirty());
    assert!(!controller.take_dirty());
    controller.toggle_overlay();
    assert!(controller.take_dirty());
    assert!(!controller.take_dirty());
}

#[test]
fn labels_and_colours_follow_the_state() {
    let mut controller = ViewportController::new();
    let buttons = controller.buttons(SURFACE, 1.0);
    assert_eq!(buttons[0].label, "Blackvision Off");
    assert_eq!(buttons[1].label, "Pre Analysis");
    assert!(!buttons[1].enabled);
    assert_eq!(buttons[1].opacity, DISABLED_OPACITY);
    let grey = [0x6c as f32 / 255.0, 0x75 as f32 / 255.0, 0x7d as f32 / 255.0];
    assert_eq!(buttons[0].color, grey);

    controller.click(ButtonId::Blackvision);
    let buttons = controller.buttons(SURFACE, 1.0);
    assert_eq!(buttons[0].label, "Blackvision On");
    assert_eq!(
        buttons[0].color,
        [0x28 as f32 / 255.0, 0xa7 as f32 / 255.0, 0x45 as f32 / 255.0]
    );
    assert_eq!(buttons[1].color, [0.0, 0x7b as f32 / 255.0, 1.0]);
    assert_eq!(buttons[1].opacity, 1.0);

    controller.click(ButtonId::Analysis);
    let buttons = controller.buttons(SURFACE, 1.0);
    assert_eq!(buttons[1].label, "After Analysis");
    assert_eq!(buttons[1].color, grey);
}

#[test]
fn buttons_sit_centered_above_the_bottom_edge() {
    let controller = ViewportController::new();
    for scale in [1.0, 2.0] {
        let s = scale as f32;
        let buttons = controller.buttons(SURFACE, scale);
        let left = buttons[0].rect;
        let right = buttons[1].rect;
        assert_eq!(left.size, [BUTTON_WIDTH * s, BUTTON_HEIGHT * s]);
        assert_eq!(right.origin[0] - (left.origin[0] + left.size[0]), BUTTON_GAP * s);
        assert_eq!(
            left.origin[1] + left.size[1],
            SURFACE[1] as f32 - BUTTON_BOTTOM * s
        );
        let span_center = (left.origin[0] + right.origin[0] + right.size[0]) / 2.0;
        assert_eq!(span_center, SURFACE[0] as f32 / 2.0);
    }
}

#[test]
fn hit_test_finds_buttons() {
    let controller = ViewportController::new();
    for scale in [1.0, 1.5] {
        let blackvision = center_of(&controller, ButtonId::Blackvision, scale);
        let analysis = center_of(&controller, ButtonId::Analysis, scale);
        assert_eq!(
            controller.hit_test(blackvision, SURFACE, scale),
            Some(ButtonId::Blackvision)
        );
        // Disabled buttons still swallow the press
        assert_eq!(
            controller.hit_test(analysis, SURFACE, scale),
            Some(ButtonId::Analysis)
        );
    }
    assert_eq!(
        controller.hit_test(PhysicalPosition::new(10.0, 10.0), SURFACE, 1.0),
        None
    );
}

#[test]
fn quads_carry_opacity() {
    let controller = ViewportController::new();
    let quads = controller.quads(SURFACE, 1.0);
    assert_eq!(quads.len(), 2);
    assert_eq!(quads[0].color[3], 1.0);
    assert_eq!(quads[1].color[3], DISABLED_OPACITY);
}

#[test]
fn tessellated_quads_cover_their_pixels_counter_clockwise() {
    let mut controller = ViewportController::new();
    controller.toggle_overlay();
    let quads = controller.quads(SURFACE, 1.5);
    let (vertices, indices) = tessellate(&quads, SURFACE);
    assert_eq!(vertices.len(), 8);
    assert_eq!(indices.len(), 12);

    let [width, height] = SURFACE.map(|v| v as f32);
    for (quad, corners) in quads.iter().zip(vertices.chunks(4)) {
        let left = quad.origin[0] / width * 2.0 - 1.0;
        let right = (quad.origin[0] + quad.size[0]) / width * 2.0 - 1.0;
        let top = 1.0 - quad.origin[1] / height * 2.0;
        let bottom = 1.0 - (quad.origin[1] + quad.size[1]) / height * 2.0;
        let xs: Vec<f32> = corners.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = corners.iter().map(|v| v.position[1]).collect();
        assert!(xs.iter().all(|&x| approx(x, left) || approx(x, right)));
        assert!(ys.iter().all(|&y| approx(y, top) || approx(y, bottom)));
        assert!(xs.iter().any(|&x| approx(x, left)) && xs.iter().any(|&x| approx(x, right)));
        assert!(ys.iter().any(|&y| approx(y, top)) && ys.iter().any(|&y| approx(y, bottom)));
        assert!(corners.iter().all(|v| v.color == quad.color));
    }

    for triangle in indices.chunks(3) {
        let [a, b, c] = [0, 1, 2].map(|i| vertices[triangle[i] as usize].position);
        let area = (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]);
        assert!(area > 0.0, "triangle {triangle:?} is not counter-clockwise");
    }
}

#[cfg(feature = "ui")]
#[test]
fn label_metrics_follow_the_scale_factor() {
    use blackvision::pipelines::text::{FONT_SIZE, LINE_HEIGHT};

    let controller = ViewportController::new();
    let labels = controller.labels(SURFACE, 2.0);
    assert_eq!(labels.len(), 2);
    for label in &labels {
        let metrics = label.metrics();
        assert!(approx(metrics.font_size, FONT_SIZE * 2.0));
        assert!(approx(metrics.line_height, LINE_HEIGHT * 2.0));
        assert!(metrics.line_height < label.size[1]);
    }
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}
