//! # Fude
//!
//! Handwriting-style text reveal for Rust.
//!
//! ## Overview
//!
//! `Fude` turns a line of text into the strokes of a pen and plays them back:
//! glyph outlines are split into contours, laid out, and revealed one stroke at
//! a time while the glyph fill follows the pen through a mask. The entry point
//! is [`HandwritingText`], which owns the font, the compiled paths and the
//! running animation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Instant;
//! use fude::{HandwritingConfig, HandwritingText};
//!
//! // 1. Configure the element and start loading its font
//! let mut text = HandwritingText::new(HandwritingConfig {
//!     text: "We're getting\nmarried!".to_string(),
//!     font_url: "assets/DancingScript-Regular.ttf".to_string(),
//!     ..HandwritingConfig::default()
//! });
//!
//! // 2. Tick once per frame and draw the current state
//! loop {
//!     let outcome = text.tick(Instant::now());
//!     if let Some(pixmap) = text.render_pixmap(1.0) {
//!         // upload or save `pixmap`
//!     }
//!     # break;
//! }
//! ```
//!
//! ## Features
//!
//! *   **Font Loading**: Files or (with the `http` feature) URLs, fetched off-thread, with HTML error pages rejected.
//! *   **Stroke Layout**: Multi-line text with alignment, letter and word spacing, split into per-contour paths.
//! *   **Reveal Animation**: Sequential, length-proportional stroke timing with a pen tip and reduced-motion support.
//! *   **Output**: RGBA pixmaps via `tiny-skia`, or standalone SVG documents.

/// Error types.
pub mod error;
/// Parsed fonts.
pub mod font_handle;
/// Fetching and asynchronous loading of fonts.
pub mod font_loader;
/// The handwriting text element and its configuration.
pub mod handwriting;
/// Reduced-motion preference.
pub mod motion;
/// Glyph outline commands and the glyph source abstraction.
pub mod outline;
/// Contour paths and geometry helpers.
pub mod path;
/// Output surfaces.
pub mod renderer;
/// Reveal scheduling and animation.
pub mod reveal;
/// Text layout and path compilation.
pub mod text;

#[cfg(test)]
mod test_font;

// common re-exports
pub use error::{ConfigError, FontLoadError, FontParseError};
pub use font_handle::FontHandle;
pub use font_loader::{FontFetcher, FontLoader};
pub use handwriting::{HandwritingConfig, HandwritingText};
pub use outline::{GlyphSource, OutlineCommand};
pub use path::{ContourPath, GlyphFillPath};
pub use renderer::{CpuRenderer, RevealStyle, StrokeWidth, SvgRenderer};
pub use reveal::{FrameLoop, Pacing, RevealAnimator, RevealFrame, RevealPhase, TickOutcome};
pub use text::{CompiledText, HorizontalAlign, LayoutSpec, Viewport};

// re-export dependencies
pub use fontdb;
pub use fontdue;
pub use palette;
pub use parking_lot;
pub use tiny_skia;
