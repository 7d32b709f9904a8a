use super::*;

#[test]
fn frame_index_converts_to_sandbox_seconds() {
    assert_eq!(FrameIndex(0).as_secs(), 0.0);
    assert_eq!(FrameIndex(30).as_secs(), 0.5);
    assert_eq!(FrameIndex(60).as_secs(), 1.0);
    assert_eq!(FrameIndex(7).next(), FrameIndex(8));
}

#[test]
fn viewport_rejects_degenerate_dimensions() {
    assert!(Viewport::new(0, 400, 0.0).is_err());
    assert!(Viewport::new(600, 0, 0.0).is_err());
    assert!(Viewport::new(600, 400, -1.0).is_err());
    assert!(Viewport::new(600, 400, f64::NAN).is_err());
}

#[test]
fn viewport_rejects_padding_that_consumes_the_area() {
    assert!(Viewport::new(600, 400, 200.0).is_err());
    assert!(Viewport::new(600, 400, 300.0).is_err());
    assert!(Viewport::new(600, 400, 199.0).is_ok());
}

#[test]
fn viewport_available_area_excludes_padding() {
    let v = Viewport::new(600, 400, 32.0).unwrap();
    assert_eq!(v.available_width(), 536.0);
    assert_eq!(v.available_height(), 336.0);
    assert_eq!(v.center(), Point::new(300.0, 200.0));
    assert_eq!(v.rect(), Rect::new(0.0, 0.0, 600.0, 400.0));
}

#[test]
fn viewport_default_matches_the_standard_slot() {
    let v = Viewport::default();
    assert_eq!((v.width, v.height, v.padding), (600, 400, 32.0));
    Viewport::new(v.width, v.height, v.padding).unwrap();
}

#[test]
fn premultiply_scales_color_by_alpha() {
    let c = Rgba8Premul::from_straight_rgba(255, 255, 255, 128);
    assert_eq!(c, Rgba8Premul { r: 128, g: 128, b: 128, a: 128 });

    let opaque = Rgba8Premul::from_straight_rgba(10, 20, 30, 255);
    assert_eq!(opaque.to_bytes(), [10, 20, 30, 255]);
}

#[test]
fn with_opacity_scales_every_channel() {
    let c = Rgba8Premul::from_straight_rgba(255, 255, 255, 255).with_opacity(0.5);
    assert_eq!(c, Rgba8Premul { r: 128, g: 128, b: 128, a: 128 });

    let zero = Rgba8Premul::from_straight_rgba(200, 100, 50, 255).with_opacity(0.0);
    assert_eq!(zero, Rgba8Premul::transparent());

    let full = Rgba8Premul::from_straight_rgba(200, 100, 50, 255);
    assert_eq!(full.with_opacity(1.0), full);
}
