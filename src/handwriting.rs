use std::{
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use palette::Srgb;
use tiny_skia::Pixmap;

use crate::{
    error::ConfigError,
    font_loader::{DefaultFetcher, FileFetcher, FontFetcher, FontLoader},
    motion::{EnvMotionQuery, MotionQuery},
    outline::GlyphSource,
    renderer::{CpuRenderer, DEFAULT_INK, RevealStyle, StrokeWidth, SvgRenderer},
    reveal::{
        CancelToken, FrameLoop, Pacing, RevealAnimator, RevealFrame, RevealOptions, RevealPhase,
        TickOutcome, schedule::pixels_per_second_for_factor,
    },
    text::{CompiledText, HorizontalAlign, LayoutSpec, Viewport},
};

/// Font shared between the component and its compiled layouts.
pub type SharedGlyphSource = Arc<dyn GlyphSource + Send + Sync>;

/// Options of a handwriting text element.
///
/// Every field except `text` has a sensible default. String-keyed updates go
/// through [`HandwritingConfig::set_option`].
#[derive(Clone, Debug, PartialEq)]
pub struct HandwritingConfig {
    /// Text to write. Line breaks are explicit.
    pub text: String,
    /// Locator of the font: a path, a `file://` URL or (with the `http`
    /// feature) an `http(s)://` URL.
    pub font_url: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    pub letter_spacing: f32,
    pub word_spacing: f32,
    pub align: HorizontalAlign,
    /// Total reveal time in seconds, ignored when `pen_speed` is set.
    pub duration: f32,
    /// Seconds before the reveal starts.
    pub delay: f32,
    /// Constant pen speed in pixels per second instead of a fixed duration.
    pub pen_speed: Option<f32>,
    /// `None` disables the fill.
    pub fill_color: Option<Srgb<u8>>,
    pub stroke_color: Srgb<u8>,
    /// Width of the reveal brush.
    pub stroke_width: StrokeWidth,
    /// Brush width relative to the font size when `stroke_width` is `Auto`.
    pub brush_width_factor: f32,
    /// Width of the visible outline; zero hides it.
    pub outline_width: f32,
    pub show_pen_tip: bool,
    pub pen_radius: f32,
}

impl Default for HandwritingConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_url: "/fonts/DancingScript-Regular.ttf".to_string(),
            font_size: 86.0,
            line_height: 1.18,
            letter_spacing: 0.0,
            word_spacing: 14.0,
            align: HorizontalAlign::Center,
            duration: 3.0,
            delay: 0.0,
            pen_speed: None,
            fill_color: Some(DEFAULT_INK),
            stroke_color: DEFAULT_INK,
            stroke_width: StrokeWidth::Auto,
            brush_width_factor: 0.5,
            outline_width: 0.0,
            show_pen_tip: true,
            pen_radius: 2.2,
        }
    }
}

impl HandwritingConfig {
    /// Applies one option given by its camelCase name.
    ///
    /// Invalid values are rejected and leave the config unchanged.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let result = self.apply_option(key, value);
        if let Err(e) = &result {
            log::warn!("Ignoring handwriting option {}: {}", key, e);
        }
        result
    }

    fn apply_option(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "text" => self.text = value.to_string(),
            "fontUrl" => self.font_url = value.trim().to_string(),
            "fontSize" => self.font_size = parse_positive(key, value)?,
            "lineHeight" => self.line_height = parse_positive(key, value)?,
            "letterSpacing" => self.letter_spacing = parse_finite(key, value)?,
            "wordSpacing" => self.word_spacing = parse_finite(key, value)?,
            "align" => self.align = value.parse()?,
            "duration" => self.duration = parse_positive(key, value)?,
            "delay" => self.delay = parse_non_negative(key, value)?,
            "penSpeed" => {
                self.pen_speed = match value.trim() {
                    "" | "none" | "auto" => None,
                    _ => Some(parse_positive(key, value)?),
                }
            }
            // relative factor: 1 = 600 px/s, larger is slower
            "speed" => {
                self.pen_speed = match value.trim() {
                    "" | "none" | "auto" => None,
                    _ => Some(pixels_per_second_for_factor(parse_non_negative(
                        key, value,
                    )?)),
                }
            }
            "color" | "fillColor" => self.fill_color = parse_color(key, value)?,
            "strokeColor" => {
                self.stroke_color =
                    parse_color(key, value)?.ok_or_else(|| invalid(key, value))?
            }
            "strokeWidth" => {
                self.stroke_width = match value.trim() {
                    "auto" => StrokeWidth::Auto,
                    _ => StrokeWidth::Px(parse_non_negative(key, value)?),
                }
            }
            "brushWidthFactor" => self.brush_width_factor = parse_non_negative(key, value)?,
            "outlineWidth" => self.outline_width = parse_non_negative(key, value)?,
            "showPenTip" | "showPen" => self.show_pen_tip = parse_bool(key, value)?,
            "penRadius" => self.pen_radius = parse_non_negative(key, value)?,
            _ => return Err(ConfigError::UnknownOption(key.to_string())),
        }
        Ok(())
    }

    /// Layout input for the compiler.
    pub fn layout_spec(&self) -> LayoutSpec {
        LayoutSpec {
            text: self.text.clone(),
            font_size: self.font_size,
            line_height: self.line_height,
            letter_spacing: self.letter_spacing,
            word_spacing: self.word_spacing,
            align: self.align,
        }
    }

    /// Reveal pacing: pen speed when set, total duration otherwise.
    pub fn pacing(&self) -> Pacing {
        match self.pen_speed {
            Some(pixels_per_second) => Pacing::PenSpeed { pixels_per_second },
            None => Pacing::TotalDuration {
                seconds: self.duration,
            },
        }
    }

    /// Colours and widths for the renderers.
    pub fn style(&self) -> RevealStyle {
        RevealStyle {
            fill_color: self.fill_color,
            stroke_color: self.stroke_color,
            brush_width: self
                .stroke_width
                .resolve(self.font_size, self.brush_width_factor),
            outline_width: self.outline_width,
            show_pen_tip: self.show_pen_tip,
            pen_radius: self.pen_radius,
        }
    }

    /// Reveal options for a run.
    pub fn reveal_options(&self, reduced_motion: bool) -> RevealOptions {
        RevealOptions {
            pacing: self.pacing(),
            delay: self.delay,
            show_pen_tip: self.show_pen_tip,
            reduced_motion,
        }
    }
}

fn invalid(option: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        option: option.to_string(),
        value: value.to_string(),
    }
}

fn parse_finite(option: &str, value: &str) -> Result<f32, ConfigError> {
    value
        .trim()
        .trim_end_matches("px")
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(option, value))
}

fn parse_positive(option: &str, value: &str) -> Result<f32, ConfigError> {
    let v = parse_finite(option, value)?;
    if v > 0.0 { Ok(v) } else { Err(invalid(option, value)) }
}

fn parse_non_negative(option: &str, value: &str) -> Result<f32, ConfigError> {
    let v = parse_finite(option, value)?;
    if v >= 0.0 { Ok(v) } else { Err(invalid(option, value)) }
}

fn parse_bool(option: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(option, value)),
    }
}

/// `#rgb`, `#rrggbb` or `none`.
fn parse_color(option: &str, value: &str) -> Result<Option<Srgb<u8>>, ConfigError> {
    let value_trimmed = value.trim();
    if value_trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Srgb::<u8>::from_str(value_trimmed)
        .map(Some)
        .map_err(|_| invalid(option, value))
}

/// A handwriting text element: owns the font, the compiled paths and the
/// current reveal run.
///
/// The element is driven by its owner: call [`tick`](Self::tick) once per
/// frame (or hand it to [`play`](Self::play)) and render the current frame
/// with [`render_pixmap`](Self::render_pixmap) or
/// [`render_svg`](Self::render_svg). Font loading never fails loudly; while no
/// font is available the element renders blank space of its layout size.
pub struct HandwritingText {
    config: HandwritingConfig,
    loader: FontLoader,
    font: Option<SharedGlyphSource>,
    compiled: CompiledText,
    options: RevealOptions,
    animator: RevealAnimator,
    motion: Box<dyn MotionQuery>,
    /// Set once the blank render warning was logged for the current load.
    blank_warned: AtomicBool,
}

impl HandwritingText {
    /// Creates the element and starts loading `config.font_url` from the
    /// filesystem (or the network with the `http` feature).
    pub fn new(config: HandwritingConfig) -> Self {
        let fetcher = Arc::new(DefaultFetcher::new(FileFetcher::new()));
        Self::with_fetcher(config, fetcher, Box::new(EnvMotionQuery::default()))
    }

    /// Creates the element and starts loading `config.font_url` through `fetcher`.
    pub fn with_fetcher(
        config: HandwritingConfig,
        fetcher: Arc<dyn FontFetcher>,
        motion: Box<dyn MotionQuery>,
    ) -> Self {
        let mut text = Self::unloaded(config, fetcher, motion);
        if !text.config.font_url.is_empty() {
            text.loader.request(text.config.font_url.clone());
        }
        text
    }

    /// Creates the element with an already available font. Later font URL
    /// changes are fetched with the default fetcher.
    pub fn with_font(
        config: HandwritingConfig,
        font: SharedGlyphSource,
        motion: Box<dyn MotionQuery>,
    ) -> Self {
        let fetcher = Arc::new(DefaultFetcher::new(FileFetcher::new()));
        let mut text = Self::unloaded(config, fetcher, motion);
        text.set_font(font);
        text
    }

    fn unloaded(
        config: HandwritingConfig,
        fetcher: Arc<dyn FontFetcher>,
        motion: Box<dyn MotionQuery>,
    ) -> Self {
        let compiled = CompiledText::reserved(&config.layout_spec());
        let options = config.reveal_options(false);
        Self {
            config,
            loader: FontLoader::new(fetcher),
            font: None,
            compiled,
            options,
            animator: RevealAnimator::new(),
            motion,
            blank_warned: AtomicBool::new(false),
        }
    }
}

/// configuration
impl HandwritingText {
    /// Current configuration.
    pub fn config(&self) -> &HandwritingConfig {
        &self.config
    }

    /// Replaces the configuration.
    ///
    /// A new font URL starts a load; the current font stays in use until the
    /// new one arrives. The reveal restarts only if the compiled paths or the
    /// reveal timing changed.
    pub fn set_config(&mut self, config: HandwritingConfig) {
        let font_changed = config.font_url != self.config.font_url;
        self.config = config;

        if font_changed {
            self.blank_warned.store(false, Ordering::Relaxed);
            if self.config.font_url.is_empty() {
                self.loader.abandon();
            } else {
                self.loader.request(self.config.font_url.clone());
            }
        }

        self.recompile();
    }

    /// Applies one camelCase option, see [`HandwritingConfig::set_option`].
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut config = self.config.clone();
        config.set_option(key, value)?;
        self.set_config(config);
        Ok(())
    }

    /// Replaces the text, keeping every other option.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let config = HandwritingConfig {
            text: text.into(),
            ..self.config.clone()
        };
        self.set_config(config);
    }

    /// Installs a font directly, abandoning any pending load.
    pub fn set_font(&mut self, font: SharedGlyphSource) {
        self.loader.abandon();
        self.font = Some(font);
        self.recompile();
    }
}

/// font loading
impl HandwritingText {
    /// Picks up a finished font load. Returns `true` if a new font was installed.
    ///
    /// A failed load keeps whatever font was shown before.
    pub fn poll(&mut self) -> bool {
        match self.loader.poll() {
            Some(Ok(font)) => {
                self.font = Some(font);
                self.recompile();
                true
            }
            // already logged by the loader
            Some(Err(_)) | None => false,
        }
    }

    /// Whether a font load is pending.
    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    /// The font in use, if one has loaded.
    pub fn font(&self) -> Option<&SharedGlyphSource> {
        self.font.as_ref()
    }

    fn recompile(&mut self) {
        let spec = self.config.layout_spec();
        let compiled = match &self.font {
            Some(font) => spec.compile(font.as_ref()),
            None => CompiledText::reserved(&spec),
        };
        let options = self.config.reveal_options(false);

        let unchanged = compiled == self.compiled && options == self.options;
        if unchanged && self.animator.run().is_some() {
            return;
        }

        self.compiled = compiled;
        self.options = options;
        let reduced_motion = self.motion.prefers_reduced_motion();
        self.animator
            .restart(&self.compiled, self.config.reveal_options(reduced_motion));
    }
}

/// animation
impl HandwritingText {
    /// Advances the element to `now`: picks up font loads and ticks the reveal.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        self.poll();
        self.animator.tick(now)
    }

    /// Drives the current reveal to its end on this thread, calling `on_frame`
    /// after every tick.
    pub fn play<F>(&mut self, frame_loop: &FrameLoop, mut on_frame: F) -> TickOutcome
    where
        F: FnMut(&CompiledText, &RevealFrame, TickOutcome),
    {
        self.poll();
        let compiled = &self.compiled;
        let Some(run) = self.animator.run_mut() else {
            return TickOutcome::Idle;
        };
        frame_loop.run(run, |frame, outcome| on_frame(compiled, frame, outcome))
    }

    /// Stops the current reveal. Nothing moves until the next input change.
    pub fn cancel(&mut self) {
        self.animator.cancel();
    }

    /// Phase of the current reveal.
    pub fn phase(&self) -> RevealPhase {
        self.animator.phase()
    }

    /// Latest frame of the current reveal.
    pub fn frame(&self) -> Option<&RevealFrame> {
        self.animator.frame()
    }

    /// Stop flag of the current run, usable from other threads.
    pub fn cancel_token(&self) -> Option<CancelToken> {
        self.animator.cancel_token()
    }
}

/// rendering
impl HandwritingText {
    /// Paths and layout of the current text.
    pub fn compiled(&self) -> &CompiledText {
        &self.compiled
    }

    /// Coordinate space of the rendered output.
    pub fn viewport(&self) -> Viewport {
        self.compiled.viewport
    }

    /// Style derived from the configuration.
    pub fn style(&self) -> RevealStyle {
        self.config.style()
    }

    /// Rasterizes the current frame at `scale` pixels per viewport unit.
    pub fn render_pixmap(&self, scale: f32) -> Option<Pixmap> {
        self.warn_if_blank();
        CpuRenderer::new(scale).render(&self.compiled, self.frame(), &self.style())
    }

    /// Renders the current frame as an SVG document.
    pub fn render_svg(&self) -> String {
        self.warn_if_blank();
        SvgRenderer::default().render(&self.compiled, self.frame(), &self.style())
    }

    fn warn_if_blank(&self) {
        if let Some(level) = self.blank_render_level() {
            log::log!(level, "Render called before a font was loaded.");
        }
    }

    /// Warns once per font load; renders while the load is pending or after
    /// the warning only log at debug level.
    fn blank_render_level(&self) -> Option<log::Level> {
        if self.font.is_some() {
            return None;
        }
        if self.is_loading() || self.blank_warned.swap(true, Ordering::Relaxed) {
            Some(log::Level::Debug)
        } else {
            Some(log::Level::Warn)
        }
    }
}

impl Drop for HandwritingText {
    fn drop(&mut self) {
        self.animator.cancel();
    }
}
