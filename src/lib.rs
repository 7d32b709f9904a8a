//! Vitrine renders untrusted markup snippets in an isolated, auto-fitting
//! preview sandbox.
//!
//! A [`Preview`] slot owns at most one sandbox instance at a time. The
//! instance embeds the snippet in a self-contained document, measures the
//! rendered tree every frame, and keeps it centered and fully contained in
//! the slot's viewport no matter what the snippet animates to. Host and
//! sandbox communicate only through a JSON control channel:
//!
//! - Host → sandbox: `PLAY`, `CAPTURE_AND_STOP`
//! - Sandbox → host: `SNAPSHOT { image }`
//!
//! The usual flow:
//!
//! - Build a [`PreviewRequest`] from raw snippet source
//! - Mount it in a [`Preview`] and drive [`Preview::tick`] once per frame
//! - Feed hover and viewport-proximity signals in; read [`Preview::display`]
//!   out
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Control channel between host and sandbox.
pub mod channel;
/// Fit-and-center engine: measurement, fit math, snapshots, playback.
pub mod engine;
/// Preview host: slots, display decisions, visibility gating.
pub mod host;
/// Best-effort markup normalization and fragment scanning.
pub mod markup;
/// Sandbox instances: document assembly, scene tree, utility animations.
pub mod sandbox;

pub use crate::foundation::core::{Affine, FrameIndex, Point, Rect, Rgba8Premul, Vec2, Viewport};
pub use crate::foundation::error::{VitrineError, VitrineResult};

pub use crate::channel::{HostMessage, SandboxMessage};
pub use crate::engine::fit::FitTransform;
pub use crate::engine::runtime::PlaybackState;
pub use crate::engine::snapshot::Snapshot;
pub use crate::host::preview::{DisplayState, Preview, PreviewRequest};
pub use crate::markup::normalize::normalize_markup;
pub use crate::sandbox::document::{FitMode, VisualTheme};
pub use crate::sandbox::instance::SandboxInstance;
