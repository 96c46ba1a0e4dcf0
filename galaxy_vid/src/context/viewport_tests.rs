use super::*;
use glam::Vec4;

#[test]
fn test_letterbox_same_aspect_fills_window() {
    let viewport = Viewport::letterbox(320, 240, 640, 480);
    assert_eq!(viewport, Viewport { x: 0, y: 0, width: 640, height: 480 });
}

#[test]
fn test_letterbox_wide_window_adds_side_bars() {
    let viewport = Viewport::letterbox(100, 100, 400, 200);
    assert_eq!(viewport, Viewport { x: 100, y: 0, width: 200, height: 200 });
}

#[test]
fn test_letterbox_tall_window_adds_top_bars() {
    let viewport = Viewport::letterbox(200, 100, 200, 400);
    assert_eq!(viewport, Viewport { x: 0, y: 150, width: 200, height: 100 });
}

#[test]
fn test_letterbox_zero_logical_size_uses_window() {
    let viewport = Viewport::letterbox(0, 100, 300, 200);
    assert_eq!(viewport, Viewport { x: 0, y: 0, width: 300, height: 200 });
}

#[test]
fn test_orthographic_projection_maps_corners() {
    let projection = orthographic_projection(200, 100, -100.0, 100.0);
    let corner = projection * Vec4::new(100.0, 50.0, 0.0, 1.0);
    assert!((corner.x - 1.0).abs() < 1e-6);
    assert!((corner.y - 1.0).abs() < 1e-6);
    let origin = projection * Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert!(origin.x.abs() < 1e-6 && origin.y.abs() < 1e-6);
}
