/// Text-to-path compilation: line layout, glyph placement and contour extraction.
pub mod layout;

pub use layout::{CompiledText, HorizontalAlign, LayoutSpec, LineMetrics, Viewport};
