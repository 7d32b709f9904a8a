//! Assembly of the self-contained document a sandbox instance renders.
//!
//! The document embeds everything the snippet needs and nothing of the
//! hosting page: a minimal shell, the remote utility-styling engine (loss of
//! which degrades to an unstyled render, never an error), locally re-declared
//! keyframes for the utility animations, the two fit wrapper elements, and
//! the snippet fragment itself. A new document is built for every change of
//! snippet or configuration; it is never patched in place.

use crate::foundation::core::Rgba8Premul;

/// The remote utility-styling engine every sandbox document references.
pub const STYLING_CDN_URL: &str = "https://cdn.tailwindcss.com";

/// Id of the outer wrapper that receives the centering translation.
pub const CENTER_WRAPPER_ID: &str = "vitrine-center";
/// Id of the inner wrapper that receives the fit scale.
pub const FIT_WRAPPER_ID: &str = "vitrine-fit";

/// When the fit engine runs and when content freezes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Fit and re-center continuously; never freeze.
    AutoFitAlways,
    /// Fit once, then freeze behind a snapshot until hovered.
    AutoFitWhenIdle,
}

/// Background treatment of the sandbox document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualTheme {
    /// Dark gradient backdrop.
    Dark,
    /// Light backdrop.
    Light,
}

impl VisualTheme {
    /// Top and bottom stops of the background gradient, premultiplied.
    pub fn background_stops(self) -> (Rgba8Premul, Rgba8Premul) {
        match self {
            Self::Dark => (
                Rgba8Premul::from_straight_rgba(15, 23, 42, 255),
                Rgba8Premul::from_straight_rgba(2, 6, 23, 255),
            ),
            Self::Light => (
                Rgba8Premul::from_straight_rgba(248, 250, 252, 255),
                Rgba8Premul::from_straight_rgba(226, 232, 240, 255),
            ),
        }
    }

    fn background_css(self) -> &'static str {
        match self {
            Self::Dark => "linear-gradient(180deg, #0f172a 0%, #020617 100%)",
            Self::Light => "linear-gradient(180deg, #f8fafc 0%, #e2e8f0 100%)",
        }
    }
}

/// Keyframes for the utility animations, re-declared locally because the
/// remote styling engine does not guarantee runtime keyframe availability
/// inside an isolated document.
const UTILITY_KEYFRAMES: &str = "\
@keyframes spin { to { transform: rotate(360deg); } }\n\
@keyframes ping { 75%, 100% { transform: scale(2); opacity: 0; } }\n\
@keyframes pulse { 50% { opacity: .5; } }\n\
@keyframes bounce {\n\
  0%, 100% { transform: translateY(-25%); animation-timing-function: cubic-bezier(0.8, 0, 1, 1); }\n\
  50% { transform: none; animation-timing-function: cubic-bezier(0, 0, 0.2, 1); }\n\
}\n\
.animate-spin { animation: spin 1s linear infinite; }\n\
.animate-ping { animation: ping 1s cubic-bezier(0, 0, 0.2, 1) infinite; }\n\
.animate-pulse { animation: pulse 2s cubic-bezier(0.4, 0, 0.6, 1) infinite; }\n\
.animate-bounce { animation: bounce 1s infinite; }";

/// Build the complete sandbox document for one snippet render.
pub fn build_sandbox_document(
    fragment: &str,
    fit_mode: FitMode,
    theme: VisualTheme,
    fill_container: bool,
) -> String {
    let fit_mode_attr = match fit_mode {
        FitMode::AutoFitAlways => "always",
        FitMode::AutoFitWhenIdle => "when-idle",
    };
    let body_sizing = if fill_container {
        "width: 100%; height: 100%;"
    } else {
        "min-height: 100%;"
    };

    format!(
        "<!doctype html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <script src=\"{STYLING_CDN_URL}\"></script>\n\
         <style>\n\
         html, body {{ margin: 0; padding: 0; overflow: hidden; }}\n\
         body {{ {body_sizing} background: {background}; }}\n\
         {UTILITY_KEYFRAMES}\n\
         </style>\n\
         </head>\n\
         <body data-fit-mode=\"{fit_mode_attr}\">\n\
         <div id=\"{CENTER_WRAPPER_ID}\">\n\
         <div id=\"{FIT_WRAPPER_ID}\">\n\
         {fragment}\n\
         </div>\n\
         </div>\n\
         </body>\n\
         </html>\n",
        background = theme.background_css(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/sandbox/document.rs"]
mod tests;
