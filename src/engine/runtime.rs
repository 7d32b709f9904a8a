//! The fit-and-center engine's per-frame runtime.
//!
//! One engine runs inside each sandbox instance, driven by the instance's
//! tick. It owns the Playback State machine, the initial swept fit pass, the
//! per-frame re-centering loop, and the capture/suppress handling for the
//! host's control messages. While not Playing the loop keeps polling for a
//! `PLAY` but does no measuring, transforming, or drawing; that idle
//! suppression is what lets a page full of mounted previews cost nothing.

use crate::channel::{HostMessage, SandboxEndpoint, SandboxMessage};
use crate::engine::fit::FitTransform;
use crate::engine::measure::{BoundsAccumulator, measure_scene};
use crate::engine::snapshot;
use crate::foundation::core::{FrameIndex, Viewport};
use crate::foundation::error::VitrineResult;
use crate::sandbox::document::{FitMode, VisualTheme};
use crate::sandbox::scene::Scene;

/// Frames sampled by the initial fit pass, enough to see the extremes an
/// animating snippet sweeps through (1.2 s at the nominal tick rate).
pub const SWEEP_WINDOW_FRAMES: u32 = 72;

/// Frame at which the fallback re-fit runs, tolerating late-loading fonts
/// and styles. Skipped if playback has already been suppressed by then.
pub const REFIT_FALLBACK_FRAME: u64 = 150;

/// Whether the sandbox is animating or frozen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Animations run; the engine re-centers every frame.
    Playing,
    /// Frozen behind a captured snapshot.
    PausedWithSnapshot,
    /// Frozen with no usable snapshot (capture failed); the live content is
    /// still hidden, leaving a blank slot rather than a broken one.
    PausedNoSnapshot,
}

/// The initial (or fallback) fit pass in progress.
#[derive(Clone, Copy, Debug)]
struct SweepPass {
    /// One frame of identity transform before sampling starts, so the reset
    /// has actually been applied when the first sample is read.
    warmup: bool,
    acc: BoundsAccumulator,
    remaining: u32,
}

impl SweepPass {
    fn new() -> Self {
        Self {
            warmup: true,
            acc: BoundsAccumulator::new(),
            remaining: SWEEP_WINDOW_FRAMES,
        }
    }
}

/// The sandbox-internal engine: one per instance, destroyed with it.
#[derive(Debug)]
pub struct FitEngine {
    viewport: Viewport,
    fit_mode: FitMode,
    theme: VisualTheme,
    frame: FrameIndex,
    fit: FitTransform,
    state: PlaybackState,
    sweep: Option<SweepPass>,
    refit_pending: bool,
    content_hidden: bool,
    initial_capture_pending: bool,
}

impl FitEngine {
    /// A freshly mounted engine: playing, un-fitted, sweep scheduled.
    pub fn new(viewport: Viewport, fit_mode: FitMode, theme: VisualTheme) -> Self {
        Self {
            viewport,
            fit_mode,
            theme,
            frame: FrameIndex(0),
            fit: FitTransform::IDENTITY,
            state: PlaybackState::Playing,
            sweep: Some(SweepPass::new()),
            refit_pending: true,
            content_hidden: false,
            initial_capture_pending: fit_mode == FitMode::AutoFitWhenIdle,
        }
    }

    /// Current playback state.
    pub fn playback_state(&self) -> PlaybackState {
        self.state
    }

    /// The fit computed by the most recent fit pass, re-centered per frame.
    pub fn fit(&self) -> FitTransform {
        self.fit
    }

    /// Whether the live content is visually hidden behind the snapshot.
    pub fn content_hidden(&self) -> bool {
        self.content_hidden
    }

    /// Frames elapsed on this instance's clock.
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Run one frame: process queued control messages, then advance the
    /// sweep or the re-centering loop.
    pub fn tick(&mut self, scene: &mut Scene, endpoint: &SandboxEndpoint) -> VitrineResult<()> {
        let now = self.frame.as_secs();
        for msg in endpoint.drain() {
            self.handle_message(msg, scene, endpoint, now)?;
        }

        self.frame = self.frame.next();
        let now = self.frame.as_secs();

        if self.state != PlaybackState::Playing {
            // Idle suppression: keep polling, do no work. A fallback re-fit
            // whose frame passes while suppressed is forfeited, not deferred;
            // waking later must keep the settled fit.
            if self.refit_pending && self.frame.0 >= REFIT_FALLBACK_FRAME {
                self.refit_pending = false;
            }
            return Ok(());
        }

        if let Some(mut sweep) = self.sweep.take() {
            if sweep.warmup {
                // Transform was reset to identity; sample from next frame.
                sweep.warmup = false;
                self.sweep = Some(sweep);
                return Ok(());
            }
            if let Some(bounds) = measure_scene(scene, now) {
                sweep.acc.include(bounds);
            }
            sweep.remaining -= 1;
            if sweep.remaining > 0 {
                self.sweep = Some(sweep);
                return Ok(());
            }
            self.fit = FitTransform::fit(sweep.acc.finish(), self.viewport);
            tracing::debug!(scale = self.fit.scale, "fit pass complete");
            if self.initial_capture_pending {
                // Idle mode always captures right after the first fit so the
                // idle state has something to show, then freezes.
                self.initial_capture_pending = false;
                self.capture_and_stop(scene, endpoint, now)?;
            }
            return Ok(());
        }

        if self.refit_pending && self.frame.0 >= REFIT_FALLBACK_FRAME {
            self.refit_pending = false;
            self.fit = FitTransform::IDENTITY;
            self.sweep = Some(SweepPass::new());
            return Ok(());
        }

        // Continuous re-centering: track the instantaneous center only;
        // scale stays fixed until the next fit pass.
        self.fit = self.fit.recentered(measure_scene(scene, now), self.viewport);
        Ok(())
    }

    fn handle_message(
        &mut self,
        msg: HostMessage,
        scene: &mut Scene,
        endpoint: &SandboxEndpoint,
        now: f64,
    ) -> VitrineResult<()> {
        if self.fit_mode != FitMode::AutoFitWhenIdle {
            tracing::debug!(?msg, "control message outside auto-fit-when-idle, ignoring");
            return Ok(());
        }
        match msg {
            HostMessage::Play => {
                scene.restart_animations(now);
                self.content_hidden = false;
                self.state = PlaybackState::Playing;
            }
            HostMessage::CaptureAndStop => self.capture_and_stop(scene, endpoint, now)?,
        }
        Ok(())
    }

    /// Rasterize, report, then suppress. Capture failures are logged and
    /// still end in a paused, content-hidden state.
    fn capture_and_stop(
        &mut self,
        scene: &Scene,
        endpoint: &SandboxEndpoint,
        now: f64,
    ) -> VitrineResult<()> {
        match snapshot::capture(scene, now, self.fit, self.viewport, self.theme) {
            Ok(image) => {
                endpoint.send(&SandboxMessage::Snapshot { image })?;
                self.state = PlaybackState::PausedWithSnapshot;
            }
            Err(err) => {
                tracing::warn!(%err, "snapshot capture failed");
                self.state = PlaybackState::PausedNoSnapshot;
            }
        }
        self.content_hidden = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/runtime.rs"]
mod tests;
