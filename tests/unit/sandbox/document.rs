use super::*;

#[test]
fn document_is_self_contained() {
    let html = build_sandbox_document(
        "<div class=\"x\">hi</div>",
        FitMode::AutoFitAlways,
        VisualTheme::Dark,
        false,
    );
    assert!(html.starts_with("<!doctype html>"));
    assert!(html.contains(STYLING_CDN_URL));
    assert!(html.contains("<div class=\"x\">hi</div>"));
    assert!(html.contains(CENTER_WRAPPER_ID));
    assert!(html.contains(FIT_WRAPPER_ID));
}

#[test]
fn utility_keyframes_are_declared_locally() {
    let html = build_sandbox_document("<div></div>", FitMode::AutoFitAlways, VisualTheme::Dark, false);
    for name in ["spin", "ping", "pulse", "bounce"] {
        assert!(html.contains(&format!("@keyframes {name}")));
        assert!(html.contains(&format!(".animate-{name}")));
    }
}

#[test]
fn fit_mode_is_stamped_on_the_body() {
    let always = build_sandbox_document("<p>x</p>", FitMode::AutoFitAlways, VisualTheme::Dark, false);
    assert!(always.contains(r#"data-fit-mode="always""#));

    let idle = build_sandbox_document("<p>x</p>", FitMode::AutoFitWhenIdle, VisualTheme::Dark, false);
    assert!(idle.contains(r#"data-fit-mode="when-idle""#));
}

#[test]
fn theme_selects_the_background_gradient() {
    let dark = build_sandbox_document("<p>x</p>", FitMode::AutoFitAlways, VisualTheme::Dark, false);
    assert!(dark.contains("#0f172a"));

    let light = build_sandbox_document("<p>x</p>", FitMode::AutoFitAlways, VisualTheme::Light, false);
    assert!(light.contains("#f8fafc"));
    assert!(!light.contains("#0f172a"));
}

#[test]
fn fill_container_stretches_the_body() {
    let filled = build_sandbox_document("<p>x</p>", FitMode::AutoFitAlways, VisualTheme::Dark, true);
    assert!(filled.contains("width: 100%; height: 100%;"));

    let natural = build_sandbox_document("<p>x</p>", FitMode::AutoFitAlways, VisualTheme::Dark, false);
    assert!(natural.contains("min-height: 100%;"));
}

#[test]
fn background_stops_are_opaque() {
    for theme in [VisualTheme::Dark, VisualTheme::Light] {
        let (top, bottom) = theme.background_stops();
        assert_eq!(top.a, 255);
        assert_eq!(bottom.a, 255);
    }
}

#[test]
fn enums_serialize_snake_case() {
    assert_eq!(
        serde_json::to_string(&FitMode::AutoFitWhenIdle).unwrap(),
        r#""auto_fit_when_idle""#
    );
    assert_eq!(
        serde_json::to_string(&VisualTheme::Dark).unwrap(),
        r#""dark""#
    );
}
