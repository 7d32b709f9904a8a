//! A preview slot on the hosting page.
//!
//! The slot decides what the page actually shows (live sandbox, cached
//! snapshot, or loading placeholder) from two external signals: whether the
//! slot is near the viewport (gates mounting) and whether the pointer hovers
//! it (drives the play/freeze protocol). Snapshots follow "last one wins":
//! a stale response arriving after the hover state moved on just refreshes
//! the cache, and a response arriving after a rebuild died with the old
//! channel.

use xxhash_rust::xxh3::Xxh3;

use crate::channel::{HostEndpoint, HostMessage, SandboxMessage};
use crate::engine::snapshot::Snapshot;
use crate::foundation::core::Viewport;
use crate::foundation::error::VitrineResult;
use crate::sandbox::document::{FitMode, VisualTheme};
use crate::sandbox::instance::SandboxInstance;

/// Everything needed to render one snippet preview.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PreviewRequest {
    /// Raw snippet source; normalized before rendering.
    pub markup: String,
    /// Fit/freeze behavior.
    pub fit_mode: FitMode,
    /// Sandbox background treatment.
    pub visual_theme: VisualTheme,
    /// Whether the snippet stretches to the sandbox body.
    pub fill_container: bool,
    /// Slot viewport and fit padding.
    pub viewport: Viewport,
}

impl PreviewRequest {
    /// Fingerprint of everything that invalidates a mounted sandbox.
    ///
    /// Equal fingerprints make a rebuild request a no-op; anything else
    /// tears the instance down and rebuilds from scratch.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Xxh3::new();
        h.update(self.markup.as_bytes());
        h.update(&[
            matches!(self.fit_mode, FitMode::AutoFitWhenIdle) as u8,
            matches!(self.visual_theme, VisualTheme::Light) as u8,
            self.fill_container as u8,
        ]);
        h.update(&self.viewport.width.to_le_bytes());
        h.update(&self.viewport.height.to_le_bytes());
        h.update(&self.viewport.padding.to_le_bytes());
        h.digest()
    }
}

/// What the surrounding page should composite into the slot right now.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DisplayState<'a> {
    /// Neutral loading placeholder (not yet mounted, or no snapshot yet).
    Placeholder,
    /// The live sandbox surface.
    Live,
    /// The cached snapshot masking the hidden live surface.
    Frozen(&'a Snapshot),
}

#[derive(Debug)]
struct Mounted {
    instance: SandboxInstance,
    endpoint: HostEndpoint,
    snapshot: Option<Snapshot>,
    /// Live content stays visible after unhover until a fresher snapshot
    /// arrives to mask it.
    showing_live: bool,
}

/// One on-screen preview slot.
#[derive(Debug)]
pub struct Preview {
    request: PreviewRequest,
    fingerprint: u64,
    hovered: bool,
    mounted: Option<Mounted>,
}

impl Preview {
    /// Create an unmounted slot. The sandbox is only constructed once
    /// [`Preview::set_near_viewport`] reports proximity.
    pub fn new(request: PreviewRequest) -> VitrineResult<Self> {
        // Validate the viewport up front so a bad slot fails at creation,
        // not at first scroll.
        Viewport::new(
            request.viewport.width,
            request.viewport.height,
            request.viewport.padding,
        )?;
        let fingerprint = request.fingerprint();
        Ok(Self {
            request,
            fingerprint,
            hovered: false,
            mounted: None,
        })
    }

    /// Whether a sandbox instance is currently mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Feed the external proximity signal. The first `true` mounts the
    /// sandbox; it is never re-virtualized away afterwards, so repeated
    /// scrolling cannot thrash animations with mount/unmount cycles.
    pub fn set_near_viewport(&mut self, near: bool) -> VitrineResult<()> {
        if near && self.mounted.is_none() {
            self.mount()?;
        }
        Ok(())
    }

    /// Feed the pointer-hover signal, driving the play/freeze protocol when
    /// the fit mode freezes idle previews.
    pub fn set_hovered(&mut self, hovered: bool) -> VitrineResult<()> {
        if hovered == self.hovered {
            return Ok(());
        }
        self.hovered = hovered;
        if self.request.fit_mode != FitMode::AutoFitWhenIdle {
            return Ok(());
        }
        if let Some(mounted) = &mut self.mounted {
            if hovered {
                mounted.endpoint.send(HostMessage::Play)?;
                mounted.showing_live = true;
            } else {
                mounted.endpoint.send(HostMessage::CaptureAndStop)?;
            }
        }
        Ok(())
    }

    /// Swap in a new request. Returns whether a rebuild actually happened;
    /// an identical fingerprint is a no-op.
    pub fn update_request(&mut self, request: PreviewRequest) -> VitrineResult<bool> {
        let fingerprint = request.fingerprint();
        if fingerprint == self.fingerprint {
            return Ok(false);
        }
        Viewport::new(
            request.viewport.width,
            request.viewport.height,
            request.viewport.padding,
        )?;
        self.request = request;
        self.fingerprint = fingerprint;
        if self.mounted.is_some() {
            tracing::debug!("preview configuration changed, rebuilding sandbox");
            self.mount()?;
        }
        Ok(true)
    }

    /// Replace the snippet markup (full rebuild if it changed).
    pub fn set_markup(&mut self, markup: impl Into<String>) -> VitrineResult<bool> {
        let mut request = self.request.clone();
        request.markup = markup.into();
        self.update_request(request)
    }

    /// Change the fit mode (full rebuild if it changed).
    pub fn set_fit_mode(&mut self, fit_mode: FitMode) -> VitrineResult<bool> {
        let mut request = self.request.clone();
        request.fit_mode = fit_mode;
        self.update_request(request)
    }

    /// Change the visual theme (full rebuild if it changed).
    pub fn set_visual_theme(&mut self, theme: VisualTheme) -> VitrineResult<bool> {
        let mut request = self.request.clone();
        request.visual_theme = theme;
        self.update_request(request)
    }

    /// Drive the slot by one frame: tick the sandbox, then absorb whatever
    /// it reported.
    pub fn tick(&mut self) -> VitrineResult<()> {
        let Some(mounted) = &mut self.mounted else {
            return Ok(());
        };
        mounted.instance.tick()?;
        for msg in mounted.endpoint.drain() {
            match msg {
                SandboxMessage::Snapshot { image } => {
                    mounted.snapshot = Some(image);
                    if self.hovered && self.request.fit_mode == FitMode::AutoFitWhenIdle {
                        // The sandbox froze itself (initial idle capture)
                        // while the pointer was already here; wake it back
                        // up rather than freezing under the cursor.
                        mounted.endpoint.send(HostMessage::Play)?;
                        mounted.showing_live = true;
                    } else {
                        mounted.showing_live = false;
                    }
                }
            }
        }
        Ok(())
    }

    /// What the page should show in this slot right now.
    pub fn display(&self) -> DisplayState<'_> {
        let Some(mounted) = &self.mounted else {
            return DisplayState::Placeholder;
        };
        if self.request.fit_mode == FitMode::AutoFitAlways {
            return DisplayState::Live;
        }
        if self.hovered || mounted.showing_live {
            return DisplayState::Live;
        }
        match &mounted.snapshot {
            Some(snapshot) => DisplayState::Frozen(snapshot),
            None => DisplayState::Placeholder,
        }
    }

    /// The mounted sandbox, if any.
    pub fn instance(&self) -> Option<&SandboxInstance> {
        self.mounted.as_ref().map(|m| &m.instance)
    }

    /// The latest cached snapshot, if any.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.mounted.as_ref().and_then(|m| m.snapshot.as_ref())
    }

    /// (Re)build the sandbox instance from the current request. The old
    /// instance and its channel are dropped wholesale; a new sandbox starts
    /// Playing with a clean identity transform.
    fn mount(&mut self) -> VitrineResult<()> {
        let (instance, endpoint) = SandboxInstance::mount(
            &self.request.markup,
            self.request.fit_mode,
            self.request.visual_theme,
            self.request.fill_container,
            self.request.viewport,
        )?;
        self.mounted = Some(Mounted {
            instance,
            endpoint,
            snapshot: None,
            showing_live: self.hovered,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/preview.rs"]
mod tests;
