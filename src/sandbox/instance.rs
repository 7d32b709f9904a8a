//! One isolated rendering surface per snippet-render request.
//!
//! An instance owns everything on the sandbox side of the isolation
//! boundary: the assembled document, the measured scene, the fit engine, and
//! the sandbox end of the control channel. It is created when a snippet is
//! rendered and destroyed (never patched) whenever the snippet or its
//! configuration changes; dropping it stops the loop and drops the message
//! queues, so any in-flight response is simply ignored.

use crate::channel::{HostEndpoint, SandboxEndpoint, endpoint_pair};
use crate::engine::fit::FitTransform;
use crate::engine::runtime::{FitEngine, PlaybackState};
use crate::foundation::core::{FrameIndex, Viewport};
use crate::foundation::error::VitrineResult;
use crate::markup::fragment::parse_fragment;
use crate::markup::normalize::normalize_markup;
use crate::sandbox::document::{FitMode, VisualTheme, build_sandbox_document};
use crate::sandbox::scene::Scene;

/// A mounted sandbox: document, scene, engine, and control endpoint.
#[derive(Debug)]
pub struct SandboxInstance {
    document_html: String,
    scene: Scene,
    engine: FitEngine,
    endpoint: SandboxEndpoint,
}

impl SandboxInstance {
    /// Normalize `markup`, assemble the sandbox document, lay out the scene,
    /// and start the engine. Returns the instance and the host's end of its
    /// control channel.
    pub fn mount(
        markup: &str,
        fit_mode: FitMode,
        theme: VisualTheme,
        fill_container: bool,
        viewport: Viewport,
    ) -> VitrineResult<(Self, HostEndpoint)> {
        let viewport = Viewport::new(viewport.width, viewport.height, viewport.padding)?;
        let fragment = normalize_markup(markup);
        let document_html = build_sandbox_document(&fragment, fit_mode, theme, fill_container);
        let scene = Scene::build(&parse_fragment(&fragment), viewport);
        tracing::debug!(boxes = scene.len(), tainted = scene.is_tainted(), "sandbox mounted");

        let (host, sandbox) = endpoint_pair();
        Ok((
            Self {
                document_html,
                scene,
                engine: FitEngine::new(viewport, fit_mode, theme),
                endpoint: sandbox,
            },
            host,
        ))
    }

    /// Advance the sandbox by one frame.
    pub fn tick(&mut self) -> VitrineResult<()> {
        self.engine.tick(&mut self.scene, &self.endpoint)
    }

    /// The assembled document this instance renders.
    pub fn document_html(&self) -> &str {
        &self.document_html
    }

    /// Current playback state.
    pub fn playback_state(&self) -> PlaybackState {
        self.engine.playback_state()
    }

    /// The engine's current fit.
    pub fn fit(&self) -> FitTransform {
        self.engine.fit()
    }

    /// Whether the live content is hidden behind a snapshot.
    pub fn content_hidden(&self) -> bool {
        self.engine.content_hidden()
    }

    /// Frames elapsed since mount.
    pub fn frame(&self) -> FrameIndex {
        self.engine.frame()
    }

    /// The measured scene (parents before children).
    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}
