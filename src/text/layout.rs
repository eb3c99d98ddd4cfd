use std::{str::FromStr, sync::Arc};

use euclid::default::{Point2D, Rect, Size2D};

use crate::{
    error::ConfigError,
    outline::{GlyphOutline, GlyphSource, Point},
    path::{ContourPath, GlyphFillPath, split_contours},
};

/// Horizontal margin on each side of the viewport, relative to the widest line.
const VIEWPORT_MARGIN_X: f32 = 0.06;
/// Space reserved above the first line, relative to the font size.
const VIEWPORT_MARGIN_TOP: f32 = 0.35;
/// Minimum text block height, relative to the font size.
const MIN_BLOCK_HEIGHT: f32 = 1.4;
/// Total horizontal growth of the viewport (both margins).
const VIEWPORT_GROW_X: f32 = 1.12;
/// Vertical growth of the viewport so descenders of the last line fit.
const VIEWPORT_GROW_Y: f32 = 1.25;

/// Everything that decides where glyphs land.
///
/// Line breaks are explicit (`\n`); nothing is wrapped automatically.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSpec {
    pub text: String,
    /// Font size in pixels. Must be positive.
    pub font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Extra advance after every glyph, in pixels.
    pub letter_spacing: f32,
    /// Advance of a space character, in pixels.
    pub word_spacing: f32,
    pub align: HorizontalAlign,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 86.0,
            line_height: 1.18,
            letter_spacing: 0.0,
            word_spacing: 14.0,
            align: HorizontalAlign::Center,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Horizontal justification of each line relative to the widest line.
pub enum HorizontalAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl FromStr for HorizontalAlign {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(ConfigError::InvalidValue {
                option: "align".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Coordinate space of the rendered text: `(min_x, min_y, width, height)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub rect: Rect<f32>,
}

impl Viewport {
    /// Creates a viewport from its SVG `viewBox` components.
    pub fn new(min_x: f32, min_y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(Point2D::new(min_x, min_y), Size2D::new(width, height)),
        }
    }

    /// Viewport around a text block of the given size, with margins so glyph
    /// overshoot and antialiasing are never clipped.
    pub fn for_text_block(max_line_width: f32, block_height: f32, font_size: f32) -> Self {
        let width = max_line_width.max(1.0);
        let height = block_height.max(font_size * MIN_BLOCK_HEIGHT);

        Self::new(
            -(width * VIEWPORT_MARGIN_X).ceil(),
            -(font_size * VIEWPORT_MARGIN_TOP).ceil(),
            (width * VIEWPORT_GROW_X).ceil(),
            (height * VIEWPORT_GROW_Y).ceil(),
        )
    }

    /// Left edge.
    pub fn min_x(&self) -> f32 {
        self.rect.origin.x
    }

    /// Top edge.
    pub fn min_y(&self) -> f32 {
        self.rect.origin.y
    }

    /// Horizontal extent.
    pub fn width(&self) -> f32 {
        self.rect.size.width
    }

    /// Vertical extent.
    pub fn height(&self) -> f32 {
        self.rect.size.height
    }

    /// `[min_x, min_y, width, height]`, the order of an SVG `viewBox`.
    pub fn view_box(&self) -> [f32; 4] {
        [self.min_x(), self.min_y(), self.width(), self.height()]
    }
}

/// Placement of a single line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineMetrics {
    /// Total advance of the line including spacing.
    pub width: f32,
    /// X of the pen at the start of the line, after alignment.
    pub start_x: f32,
    /// Y of the baseline (Y axis down).
    pub baseline: f32,
}

/// Output of [`LayoutSpec::compile`].
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledText {
    /// Stroke contours in reading order.
    pub contours: Vec<ContourPath>,
    /// One fill path per drawn glyph, in reading order.
    pub fills: Vec<GlyphFillPath>,
    pub viewport: Viewport,
    pub lines: Vec<LineMetrics>,
    pub total_width: f32,
    pub total_height: f32,
}

impl CompiledText {
    /// Layout that reserves the space of `spec` without drawing anything.
    ///
    /// Used while no font is available (still loading, or failed to load).
    pub fn reserved(spec: &LayoutSpec) -> Self {
        let line_gap = spec.line_gap();
        let lines: Vec<LineMetrics> = spec
            .lines()
            .enumerate()
            .map(|(row, _)| LineMetrics {
                width: 0.0,
                start_x: 0.0,
                baseline: (row + 1) as f32 * line_gap,
            })
            .collect();
        let total_height = lines.len() as f32 * line_gap;

        Self {
            contours: Vec::new(),
            fills: Vec::new(),
            viewport: Viewport::for_text_block(0.0, total_height, spec.font_size),
            lines,
            total_width: 0.0,
            total_height,
        }
    }

    /// `true` when nothing would be drawn.
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty() && self.fills.is_empty()
    }

    /// Sum of all estimated contour lengths.
    pub fn total_length(&self) -> f32 {
        self.contours.iter().map(|c| c.length).sum()
    }
}

/// Glyph measured during the first stage, relative to its line start.
struct GlyphFragment {
    ch: char,
    outline: Option<Arc<GlyphOutline>>,
    offset_x: f32,
}

/// Intermediate storage for one line before alignment.
struct LineRecord {
    width: f32,
    glyphs: Vec<GlyphFragment>,
}

impl LayoutSpec {
    /// Lines of the text. A trailing `\r` of CRLF input is dropped.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }

    /// Distance between consecutive baselines, in pixels.
    pub fn line_gap(&self) -> f32 {
        self.font_size * self.line_height
    }

    /// Computes the size that [`Self::compile`] would produce as `[width, height]`.
    pub fn measure<S: GlyphSource + ?Sized>(&self, source: &S) -> [f32; 2] {
        let compiled = self.compile(source);
        [compiled.total_width, compiled.total_height]
    }

    /// Lays out the text and decomposes every glyph into contours and fills.
    ///
    /// The implementation follows a two-stage pipeline:
    /// 1. Each line is walked left to right and every character is measured
    ///    into a line record; the widest line decides the block width.
    /// 2. Line records are placed on their baselines with alignment offsets
    ///    applied, and glyph outlines are transformed into viewport space.
    ///
    /// The result is a pure function of `source` and `self`.
    pub fn compile<S: GlyphSource + ?Sized>(&self, source: &S) -> CompiledText {
        let units_per_em = source.units_per_em();
        let scale = self.font_size / units_per_em;
        if !scale.is_finite() || scale <= 0.0 {
            log::warn!(
                "Cannot lay out text with font size {} and {} units per em.",
                self.font_size,
                units_per_em
            );
            return CompiledText::reserved(self);
        }

        // Stage 1: measure.
        let records: Vec<LineRecord> = self
            .lines()
            .map(|line| self.measure_line(line, source, scale))
            .collect();

        let max_line_width = records.iter().map(|r| r.width).fold(0.0f32, f32::max);
        let line_gap = self.line_gap();

        // Stage 2: place.
        let mut contours = Vec::new();
        let mut fills = Vec::new();
        let mut lines = Vec::with_capacity(records.len());

        for (row, record) in records.into_iter().enumerate() {
            let start_x = match self.align {
                HorizontalAlign::Left => 0.0,
                HorizontalAlign::Center => (max_line_width - record.width) / 2.0,
                HorizontalAlign::Right => max_line_width - record.width,
            };
            let baseline = (row + 1) as f32 * line_gap;

            for glyph in record.glyphs {
                let Some(outline) = glyph.outline else {
                    continue;
                };
                if outline.is_empty() {
                    continue;
                }

                let pen_x = start_x + glyph.offset_x;
                // Font units are Y-up; the viewport is Y-down.
                let placed: Vec<_> = outline
                    .commands
                    .iter()
                    .map(|c| {
                        c.map_points(|p| Point::new(pen_x + p.x * scale, baseline - p.y * scale))
                    })
                    .collect();

                let glyph_index = fills.len();
                for contour in split_contours(&placed) {
                    contours.push(ContourPath::new(contour, glyph_index, row));
                }
                fills.push(GlyphFillPath {
                    ch: glyph.ch,
                    line: row,
                    commands: placed,
                });
            }

            lines.push(LineMetrics {
                width: record.width,
                start_x,
                baseline,
            });
        }

        let total_height = lines.len() as f32 * line_gap;

        CompiledText {
            contours,
            fills,
            viewport: Viewport::for_text_block(max_line_width, total_height, self.font_size),
            lines,
            total_width: max_line_width,
            total_height,
        }
    }

    /// Measures one line. Spaces advance by the word spacing and produce no
    /// glyph; unmapped characters advance by the measured fallback width.
    fn measure_line<S: GlyphSource + ?Sized>(
        &self,
        line: &str,
        source: &S,
        scale: f32,
    ) -> LineRecord {
        let mut cursor = 0.0f32;
        let mut glyphs = Vec::new();

        for ch in line.chars() {
            if ch == ' ' {
                cursor += self.word_spacing;
                continue;
            }

            let outline = source.glyph_outline(ch);
            let native = outline
                .as_ref()
                .and_then(|o| o.advance_width)
                .map(|advance| advance * scale)
                .filter(|advance| advance.is_finite());
            let advance = native.unwrap_or_else(|| {
                if outline.is_none() {
                    log::trace!("No glyph for {:?}; using measured advance.", ch);
                }
                source.measured_advance(ch, self.font_size)
            });

            glyphs.push(GlyphFragment {
                ch,
                outline,
                offset_x: cursor,
            });
            cursor += advance + self.letter_spacing;
        }

        LineRecord {
            width: cursor,
            glyphs,
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{outline::OutlineCommand, test_font::StubFont};

    fn spec(text: &str, align: HorizontalAlign) -> LayoutSpec {
        LayoutSpec {
            text: text.to_string(),
            font_size: 100.0,
            line_height: 1.25,
            letter_spacing: 0.0,
            word_spacing: 14.0,
            align,
        }
    }

    fn first_x(fill: &GlyphFillPath) -> f32 {
        match fill.commands[0] {
            OutlineCommand::MoveTo(p) => p.x,
            _ => panic!("fill must start with a move"),
        }
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{} != {}", a, b);
    }

    #[test]
    fn compiling_twice_is_identical() {
        let spec = spec("Hello\nWorld!", HorizontalAlign::Center);
        assert_eq!(spec.compile(&StubFont), spec.compile(&StubFont));
    }

    #[test]
    fn space_advances_by_word_spacing_only() {
        let mut spec = spec("A B", HorizontalAlign::Left);
        spec.letter_spacing = 2.0;
        let compiled = spec.compile(&StubFont);

        assert_eq!(compiled.fills.len(), 2);
        assert_eq!(compiled.fills[0].ch, 'A');
        assert_eq!(compiled.fills[1].ch, 'B');

        // A: 70px advance + 2px letter spacing, then 14px word spacing.
        // B's outline starts 5px right of its pen position.
        assert_close(first_x(&compiled.fills[0]), 0.0);
        assert_close(first_x(&compiled.fills[1]), 70.0 + 2.0 + 14.0 + 5.0);
        assert_close(compiled.lines[0].width, 70.0 + 2.0 + 14.0 + 70.0 + 2.0);
    }

    #[test]
    fn right_alignment_matches_right_edges() {
        let compiled = spec("Hi\nWorld", HorizontalAlign::Right).compile(&StubFont);
        let [hi, world] = [compiled.lines[0], compiled.lines[1]];

        assert_close(hi.width, 70.0 + 50.0);
        assert_close(world.width, 70.0 + 4.0 * 50.0);
        assert_close(world.start_x, 0.0);
        assert_close(hi.start_x + hi.width, world.start_x + world.width);
        assert_close(compiled.total_width, world.width);

        // 'H' of the short line starts 150px in (+5px outline inset).
        assert_close(first_x(&compiled.fills[0]), 150.0 + 5.0);
    }

    #[test]
    fn center_alignment_splits_the_slack() {
        let compiled = spec("Hi\nWorld", HorizontalAlign::Center).compile(&StubFont);
        assert_close(compiled.lines[0].start_x, 75.0);
        assert_close(compiled.lines[1].start_x, 0.0);
    }

    #[test]
    fn baselines_step_by_line_gap_and_flip_y() {
        let compiled = spec("H\nH", HorizontalAlign::Left).compile(&StubFont);
        assert_close(compiled.lines[0].baseline, 125.0);
        assert_close(compiled.lines[1].baseline, 250.0);
        assert_close(compiled.total_height, 250.0);

        // The rectangle of 'H' spans 0..700 font units upwards from the baseline.
        let ys: Vec<f32> = compiled.fills[1]
            .commands
            .iter()
            .filter_map(|c| c.end_point())
            .map(|p| p.y)
            .collect();
        let top = ys.iter().copied().fold(f32::INFINITY, f32::min);
        let bottom = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert_close(top, 250.0 - 70.0);
        assert_close(bottom, 250.0);
    }

    #[test]
    fn empty_text_reserves_minimum_height() {
        let compiled = spec("", HorizontalAlign::Center).compile(&StubFont);
        assert!(compiled.contours.is_empty());
        assert!(compiled.fills.is_empty());
        assert_eq!(compiled.lines.len(), 1);

        // max(1 * 125, 100 * 1.4) * 1.25
        assert_close(compiled.viewport.height(), 175.0);
        assert!(compiled.viewport.width() >= 1.0);
        assert_close(compiled.viewport.min_y(), -35.0);
    }

    #[test]
    fn viewport_has_margins_around_the_block() {
        let compiled = spec("World", HorizontalAlign::Left).compile(&StubFont);
        let viewport = compiled.viewport;
        assert_close(viewport.min_x(), -(270.0f32 * 0.06).ceil());
        assert_close(viewport.width(), (270.0f32 * 1.12).ceil());
        assert_eq!(viewport.view_box()[2], viewport.width());
    }

    #[test]
    fn unmapped_characters_advance_without_fill() {
        let compiled = spec("A\u{2603}B", HorizontalAlign::Left).compile(&StubFont);
        assert_eq!(compiled.fills.len(), 2);
        // snowman: measured fallback of 0.6em
        assert_close(first_x(&compiled.fills[1]), 70.0 + 60.0 + 5.0);
    }

    #[test]
    fn missing_native_advance_uses_measured_width() {
        let compiled = spec("xx", HorizontalAlign::Left).compile(&StubFont);
        assert_close(compiled.lines[0].width, 2.0 * 60.0);
    }

    #[test]
    fn empty_outlines_advance_without_fill() {
        let compiled = spec("a\tb", HorizontalAlign::Left).compile(&StubFont);
        assert_eq!(compiled.fills.len(), 2);
        assert_close(compiled.lines[0].width, 50.0 + 30.0 + 50.0);
    }

    #[test]
    fn contours_follow_reading_order() {
        let compiled = spec("Ai\ni!", HorizontalAlign::Left).compile(&StubFont);
        // A: outer + counter, i: stem + dot, i: 2, !: 2
        assert_eq!(compiled.contours.len(), 8);
        assert_eq!(compiled.fills.len(), 4);

        let glyphs: Vec<usize> = compiled.contours.iter().map(|c| c.glyph).collect();
        assert_eq!(glyphs, vec![0, 0, 1, 1, 2, 2, 3, 3]);
        let lines: Vec<usize> = compiled.contours.iter().map(|c| c.line).collect();
        assert_eq!(lines, vec![0, 0, 0, 0, 1, 1, 1, 1]);

        assert!(compiled.contours.iter().all(|c| c.length > 0.0));
    }

    #[test]
    fn fill_count_matches_drawn_characters() {
        let text = "We're getting\nmarried!";
        let compiled = spec(text, HorizontalAlign::Center).compile(&StubFont);
        // apostrophe is unmapped in the stub font
        let drawn = text
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\'')
            .count();
        assert_eq!(compiled.fills.len(), drawn);
    }

    #[test]
    fn crlf_input_is_split_like_lf() {
        let lf = spec("Hi\nWorld", HorizontalAlign::Right).compile(&StubFont);
        let crlf = spec("Hi\r\nWorld", HorizontalAlign::Right).compile(&StubFont);
        assert_eq!(lf, crlf);
    }

    #[test]
    fn invalid_font_size_reserves_space() {
        let mut spec = spec("Hi", HorizontalAlign::Left);
        spec.font_size = 0.0;
        let compiled = spec.compile(&StubFont);
        assert!(compiled.is_empty());
    }

    #[test]
    fn measure_matches_compile() {
        let spec = spec("Hi\nWorld", HorizontalAlign::Left);
        let [width, height] = spec.measure(&StubFont);
        assert_close(width, 270.0);
        assert_close(height, 250.0);
    }

    #[test]
    fn parses_alignment() {
        assert_eq!("Right".parse::<HorizontalAlign>(), Ok(HorizontalAlign::Right));
        assert_eq!(" left ".parse::<HorizontalAlign>(), Ok(HorizontalAlign::Left));
        assert!("justify".parse::<HorizontalAlign>().is_err());
    }
}
