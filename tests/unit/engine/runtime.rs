use super::*;
use crate::channel::endpoint_pair;
use crate::foundation::core::Rect;
use crate::markup::fragment::parse_fragment;

fn scene_of(markup: &str) -> Scene {
    Scene::build(&parse_fragment(markup), Viewport::default())
}

fn run(engine: &mut FitEngine, scene: &mut Scene, endpoint: &SandboxEndpoint, ticks: u32) {
    for _ in 0..ticks {
        engine.tick(scene, endpoint).unwrap();
    }
}

const SETTLED: u32 = SWEEP_WINDOW_FRAMES + 10;

#[test]
fn engine_starts_playing_with_an_identity_fit() {
    let engine = FitEngine::new(Viewport::default(), FitMode::AutoFitAlways, VisualTheme::Dark);
    assert_eq!(engine.playback_state(), PlaybackState::Playing);
    assert_eq!(engine.fit(), FitTransform::IDENTITY);
    assert!(!engine.content_hidden());
    assert_eq!(engine.frame(), FrameIndex(0));
}

#[test]
fn sweep_fits_static_content_without_scaling() {
    let mut scene = scene_of(r#"<div style="width: 100px; height: 60px"></div>"#);
    let mut engine =
        FitEngine::new(Viewport::default(), FitMode::AutoFitAlways, VisualTheme::Dark);
    let (_host, sandbox) = endpoint_pair();

    run(&mut engine, &mut scene, &sandbox, SETTLED);
    let fit = engine.fit();
    assert_eq!(fit.scale, 1.0);
    assert_eq!(fit.translate, kurbo::Vec2::new(250.0, 170.0));
    assert_eq!(engine.playback_state(), PlaybackState::Playing);
}

#[test]
fn sweep_covers_the_travel_of_animated_content() {
    // A wide spinning bar: its swept box is roughly its diagonal.
    let mut scene =
        scene_of(r#"<div class="animate-spin" style="width: 500px; height: 100px"></div>"#);
    let mut engine =
        FitEngine::new(Viewport::default(), FitMode::AutoFitAlways, VisualTheme::Dark);
    let (_host, sandbox) = endpoint_pair();

    run(&mut engine, &mut scene, &sandbox, SETTLED);
    let fit = engine.fit();
    assert!(fit.scale < 0.7, "scale {}", fit.scale);
    assert!(fit.scale > 0.6, "scale {}", fit.scale);
    assert!((fit.translate.x - 50.0).abs() < 1.0);
    assert!((fit.translate.y - 150.0).abs() < 1.0);
}

#[test]
fn idle_mode_captures_once_after_the_initial_fit_and_freezes() {
    let mut scene = scene_of(r#"<div style="width: 100px; height: 60px"></div>"#);
    let mut engine =
        FitEngine::new(Viewport::default(), FitMode::AutoFitWhenIdle, VisualTheme::Dark);
    let (host, sandbox) = endpoint_pair();

    run(&mut engine, &mut scene, &sandbox, SETTLED);
    assert_eq!(engine.playback_state(), PlaybackState::PausedWithSnapshot);
    assert!(engine.content_hidden());

    let reports = host.drain();
    assert_eq!(reports.len(), 1);
    let SandboxMessage::Snapshot { image } = &reports[0];
    assert_eq!(image.width, 600 * snapshot::SUPERSAMPLE);
}

#[test]
fn paused_engine_does_no_work_until_played() {
    let mut scene = scene_of(r#"<div style="width: 100px; height: 60px"></div>"#);
    let mut engine =
        FitEngine::new(Viewport::default(), FitMode::AutoFitWhenIdle, VisualTheme::Dark);
    let (host, sandbox) = endpoint_pair();
    run(&mut engine, &mut scene, &sandbox, SETTLED);
    host.drain();

    let frozen_fit = engine.fit();
    run(&mut engine, &mut scene, &sandbox, 100);
    assert_eq!(engine.fit(), frozen_fit);
    assert!(host.drain().is_empty());

    host.send(HostMessage::Play).unwrap();
    run(&mut engine, &mut scene, &sandbox, 1);
    assert_eq!(engine.playback_state(), PlaybackState::Playing);
    assert!(!engine.content_hidden());
    assert_eq!(engine.fit(), frozen_fit);
}

#[test]
fn wake_after_the_fallback_window_keeps_the_settled_fit() {
    let mut scene = scene_of(r#"<div style="width: 100px; height: 60px"></div>"#);
    let mut engine =
        FitEngine::new(Viewport::default(), FitMode::AutoFitWhenIdle, VisualTheme::Dark);
    let (host, sandbox) = endpoint_pair();
    run(&mut engine, &mut scene, &sandbox, SETTLED);
    host.drain();
    let settled = engine.fit();
    assert_eq!(settled.translate, kurbo::Vec2::new(250.0, 170.0));

    // Stay frozen well past the fallback re-fit frame, then wake. The
    // missed re-fit must not run: the content would otherwise show
    // unscaled and uncentered for a whole sweep window.
    run(&mut engine, &mut scene, &sandbox, REFIT_FALLBACK_FRAME as u32);
    host.send(HostMessage::Play).unwrap();
    run(&mut engine, &mut scene, &sandbox, 5);

    assert_eq!(engine.playback_state(), PlaybackState::Playing);
    assert_eq!(engine.fit(), settled);
    assert!(host.drain().is_empty());
}

#[test]
fn play_then_capture_in_one_tick_yields_exactly_one_snapshot() {
    let mut scene = scene_of(r#"<div style="width: 100px; height: 60px"></div>"#);
    let mut engine =
        FitEngine::new(Viewport::default(), FitMode::AutoFitWhenIdle, VisualTheme::Dark);
    let (host, sandbox) = endpoint_pair();
    run(&mut engine, &mut scene, &sandbox, SETTLED);
    host.drain();

    host.send(HostMessage::Play).unwrap();
    host.send(HostMessage::CaptureAndStop).unwrap();
    run(&mut engine, &mut scene, &sandbox, 1);

    assert_eq!(host.drain().len(), 1);
    assert_eq!(engine.playback_state(), PlaybackState::PausedWithSnapshot);
    assert!(engine.content_hidden());
}

#[test]
fn play_restarts_animation_timelines() {
    let mut scene =
        scene_of(r#"<div class="animate-spin" style="width: 100px; height: 100px"></div>"#);
    let mut engine =
        FitEngine::new(Viewport::default(), FitMode::AutoFitWhenIdle, VisualTheme::Dark);
    let (host, sandbox) = endpoint_pair();
    run(&mut engine, &mut scene, &sandbox, SETTLED);
    host.drain();

    host.send(HostMessage::Play).unwrap();
    run(&mut engine, &mut scene, &sandbox, 1);
    // The timeline restarted at the tick that processed the message.
    let local_zero = scene.rect_at(0, engine.frame().as_secs() - 1.0 / 60.0);
    let rest = Rect::new(0.0, 0.0, 100.0, 100.0);
    for (l, r) in [
        (local_zero.x0, rest.x0),
        (local_zero.y0, rest.y0),
        (local_zero.x1, rest.x1),
        (local_zero.y1, rest.y1),
    ] {
        assert!((l - r).abs() < 1e-6, "{local_zero:?}");
    }
}

#[test]
fn control_messages_are_ignored_outside_idle_mode() {
    let mut scene = scene_of(r#"<div style="width: 100px; height: 60px"></div>"#);
    let mut engine =
        FitEngine::new(Viewport::default(), FitMode::AutoFitAlways, VisualTheme::Dark);
    let (host, sandbox) = endpoint_pair();

    host.send(HostMessage::CaptureAndStop).unwrap();
    run(&mut engine, &mut scene, &sandbox, SETTLED);
    assert_eq!(engine.playback_state(), PlaybackState::Playing);
    assert!(host.drain().is_empty());
}

#[test]
fn failed_capture_still_pauses_and_hides() {
    let mut scene = scene_of(r#"<img src="https://example.com/x.png">"#);
    let mut engine =
        FitEngine::new(Viewport::default(), FitMode::AutoFitWhenIdle, VisualTheme::Dark);
    let (host, sandbox) = endpoint_pair();

    run(&mut engine, &mut scene, &sandbox, SETTLED);
    assert_eq!(engine.playback_state(), PlaybackState::PausedNoSnapshot);
    assert!(engine.content_hidden());
    assert!(host.drain().is_empty());
}

#[test]
fn fallback_refit_reruns_the_sweep() {
    let mut scene = scene_of(r#"<div style="width: 100px; height: 60px"></div>"#);
    let mut engine =
        FitEngine::new(Viewport::default(), FitMode::AutoFitAlways, VisualTheme::Dark);
    let (_host, sandbox) = endpoint_pair();

    // Past the fallback frame and the second sweep.
    let total = REFIT_FALLBACK_FRAME as u32 + SWEEP_WINDOW_FRAMES + 10;
    run(&mut engine, &mut scene, &sandbox, total);
    let fit = engine.fit();
    assert_eq!(fit.scale, 1.0);
    assert_eq!(fit.translate, kurbo::Vec2::new(250.0, 170.0));
}

#[test]
fn playback_re_centers_moving_content_every_frame() {
    let mut scene =
        scene_of(r#"<div class="animate-bounce" style="width: 100px; height: 100px"></div>"#);
    let mut engine =
        FitEngine::new(Viewport::default(), FitMode::AutoFitAlways, VisualTheme::Dark);
    let (_host, sandbox) = endpoint_pair();

    run(&mut engine, &mut scene, &sandbox, SETTLED);
    let a = engine.fit().translate;
    run(&mut engine, &mut scene, &sandbox, 15);
    let b = engine.fit().translate;
    assert_ne!(a.y, b.y);
}
