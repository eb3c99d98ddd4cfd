use std::fmt::Write;

use crate::{
    path::push_number,
    renderer::{RevealStyle, hex_color, pen_tip, revealed_contours},
    reveal::RevealFrame,
    text::CompiledText,
};

/// Renders a reveal frame as a standalone SVG document.
///
/// The fill is masked by white mask strokes whose visible length is driven by
/// `stroke-dashoffset` on a normalized `pathLength`, which is the same
/// technique a browser animation of the document would use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SvgRenderer {
    id_prefix: String,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new("fude")
    }
}

impl SvgRenderer {
    /// `id_prefix` keeps element ids unique when several documents are
    /// inlined in one page.
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
        }
    }

    /// Renders `frame` of `compiled` as a standalone SVG document.
    pub fn render(
        &self,
        compiled: &CompiledText,
        frame: Option<&RevealFrame>,
        style: &RevealStyle,
    ) -> String {
        let viewport = compiled.viewport;
        let mut svg = String::new();

        svg.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox=""#);
        push_numbers(&mut svg, &viewport.view_box());
        svg.push_str(r#"" width=""#);
        push_number(&mut svg, viewport.width());
        svg.push_str(r#"" height=""#);
        push_number(&mut svg, viewport.height());
        svg.push_str(r#"" role="img">"#);
        svg.push('\n');

        if compiled.is_empty() {
            svg.push_str("</svg>\n");
            return svg;
        }

        let fully_revealed = frame.is_some_and(|f| f.fully_revealed);
        let mask_id = format!("{}-reveal", self.id_prefix);

        if let Some(fill_color) = style.fill_color {
            if !fully_revealed {
                self.push_mask(&mut svg, &mask_id, compiled, frame, style);
            }

            let _ = write!(svg, r#"  <g fill="{}""#, hex_color(fill_color));
            if !fully_revealed {
                let _ = write!(svg, r#" mask="url(#{})""#, mask_id);
            }
            svg.push_str(">\n");
            for fill in &compiled.fills {
                let _ = writeln!(svg, r#"    <path d="{}"/>"#, fill.to_svg_data());
            }
            svg.push_str("  </g>\n");
        }

        if style.outline_width > 0.0 {
            svg.push_str(r#"  <g fill="none" stroke=""#);
            svg.push_str(&hex_color(style.stroke_color));
            svg.push_str(r#"" stroke-width=""#);
            push_number(&mut svg, style.outline_width);
            svg.push_str(r#"" stroke-linecap="round" stroke-linejoin="round">"#);
            svg.push('\n');
            if fully_revealed {
                for contour in &compiled.contours {
                    let _ = writeln!(svg, r#"    <path d="{}"/>"#, contour.to_svg_data());
                }
            } else {
                for (contour, progress) in revealed_contours(&compiled.contours, frame) {
                    push_dashed_path(&mut svg, &contour.to_svg_data(), progress);
                }
            }
            svg.push_str("  </g>\n");
        }

        if let Some(pen) = pen_tip(frame, style) {
            svg.push_str(r#"  <circle cx=""#);
            push_number(&mut svg, pen.x);
            svg.push_str(r#"" cy=""#);
            push_number(&mut svg, pen.y);
            svg.push_str(r#"" r=""#);
            push_number(&mut svg, style.pen_radius);
            let _ = writeln!(svg, r#"" fill="{}"/>"#, hex_color(style.stroke_color));
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn push_mask(
        &self,
        svg: &mut String,
        mask_id: &str,
        compiled: &CompiledText,
        frame: Option<&RevealFrame>,
        style: &RevealStyle,
    ) {
        let [x, y, width, height] = compiled.viewport.view_box();
        let mut bounds = String::new();
        for (name, value) in [("x", x), ("y", y), ("width", width), ("height", height)] {
            let _ = write!(bounds, r#" {}=""#, name);
            push_number(&mut bounds, value);
            bounds.push('"');
        }

        svg.push_str("  <defs>\n");
        let _ = writeln!(
            svg,
            r#"    <mask id="{}" maskUnits="userSpaceOnUse"{}>"#,
            mask_id, bounds
        );
        let _ = writeln!(svg, r#"      <rect{} fill="black"/>"#, bounds);

        svg.push_str(r#"      <g fill="none" stroke="white" stroke-width=""#);
        push_number(svg, style.brush_width);
        svg.push_str(r#"" stroke-linecap="round" stroke-linejoin="round">"#);
        svg.push('\n');
        for (contour, progress) in revealed_contours(&compiled.contours, frame) {
            svg.push_str("  ");
            push_dashed_path(svg, &contour.to_svg_data(), progress);
        }
        svg.push_str("      </g>\n    </mask>\n  </defs>\n");
    }
}

/// A path whose visible length is `progress` of its total length.
fn push_dashed_path(svg: &mut String, d: &str, progress: f32) {
    let _ = write!(
        svg,
        r#"    <path d="{}" pathLength="1" stroke-dasharray="1 1" stroke-dashoffset=""#,
        d
    );
    push_number(svg, 1.0 - progress.clamp(0.0, 1.0));
    svg.push_str("\"/>\n");
}

fn push_numbers(out: &mut String, values: &[f32]) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        push_number(out, *value);
    }
}
