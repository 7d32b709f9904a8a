use super::*;
use crate::markup::fragment::parse_fragment;
use crate::sandbox::scene::Scene;

fn scene_of(markup: &str) -> Scene {
    Scene::build(&parse_fragment(markup), Viewport::default())
}

#[test]
fn capture_is_supersampled_png() {
    let scene = scene_of(r#"<div style="width: 100px; height: 50px"></div>"#);
    let snap = capture(
        &scene,
        0.0,
        FitTransform::IDENTITY,
        Viewport::default(),
        VisualTheme::Dark,
    )
    .unwrap();

    assert_eq!(snap.width, 600 * SUPERSAMPLE);
    assert_eq!(snap.height, 400 * SUPERSAMPLE);
    assert!(snap.data_url.starts_with("data:image/png;base64,"));

    let png = snap.png_bytes().unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (snap.width, snap.height));
}

#[test]
fn capture_is_deterministic() {
    let scene = scene_of(r#"<div class="a" style="width: 40px; height: 40px"></div>"#);
    let a = capture(
        &scene,
        0.5,
        FitTransform::IDENTITY,
        Viewport::default(),
        VisualTheme::Light,
    )
    .unwrap();
    let b = capture(
        &scene,
        0.5,
        FitTransform::IDENTITY,
        Viewport::default(),
        VisualTheme::Light,
    )
    .unwrap();
    assert_eq!(a, b);
}

#[test]
fn tainted_scene_refuses_capture() {
    let scene = scene_of(r#"<img src="https://example.com/a.png">"#);
    let err = capture(
        &scene,
        0.0,
        FitTransform::IDENTITY,
        Viewport::default(),
        VisualTheme::Dark,
    )
    .unwrap_err();
    assert!(matches!(err, VitrineError::Capture(_)), "{err}");
}

#[test]
fn empty_scene_still_captures_the_background() {
    let scene = scene_of("");
    let snap = capture(
        &scene,
        0.0,
        FitTransform::IDENTITY,
        Viewport::default(),
        VisualTheme::Light,
    )
    .unwrap();
    assert!(!snap.png_bytes().unwrap().is_empty());
}

#[test]
fn png_bytes_rejects_foreign_data_urls() {
    let snap = Snapshot {
        width: 1,
        height: 1,
        data_url: "data:image/webp;base64,AA==".to_string(),
    };
    assert!(snap.png_bytes().is_err());
}

#[test]
fn themed_backgrounds_produce_different_rasters() {
    let scene = scene_of("");
    let dark = capture(&scene, 0.0, FitTransform::IDENTITY, Viewport::default(), VisualTheme::Dark)
        .unwrap();
    let light =
        capture(&scene, 0.0, FitTransform::IDENTITY, Viewport::default(), VisualTheme::Light)
            .unwrap();
    assert_ne!(dark.data_url, light.data_url);
}
