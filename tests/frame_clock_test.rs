use std::time::Duration;

use blackvision::flow::FrameClock;
use instant::Instant;

mod common;
use common::test_utils::approx_eq;

#[test]
fn ticks_report_frame_and_total_time() {
    let start = Instant::now();
    let mut clock = FrameClock::new(start);
    let (dt, elapsed) = clock.tick(start + Duration::from_millis(16));
    assert!(approx_eq(dt, 0.016));
    assert!(approx_eq(elapsed, 0.016));

    let (dt, elapsed) = clock.tick(start + Duration::from_millis(48));
    assert!(approx_eq(dt, 0.032));
    assert!(approx_eq(elapsed, 0.048));
}

#[test]
fn restart_drops_setup_time() {
    let start = Instant::now();
    let mut clock = FrameClock::new(start);
    let configured = start + Duration::from_secs(3);
    clock.restart(configured);

    let (dt, elapsed) = clock.tick(configured + Duration::from_millis(16));
    assert!(approx_eq(dt, 0.016));
    assert!(approx_eq(elapsed, 0.016));
}
