use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{
    error::FontParseError,
    outline::{GlyphOutline, GlyphSource, OutlineCollector},
};

/// A parsed font: glyph outlines, advances, and units-per-em.
///
/// Face discovery goes through `fontdb`, outlines and native advances come from
/// `ttf-parser`, and the measured fallback advance comes from `fontdue`. The
/// handle is immutable from the outside; outlines are extracted lazily and
/// memoized per character.
pub struct FontHandle {
    family: Option<String>,
    bytes: Arc<[u8]>,
    face_index: u32,
    units_per_em: f32,
    /// Only used for measured fallback advances.
    metrics: fontdue::Font,
    /// `None` entries remember characters the font does not map.
    outlines: Mutex<HashMap<char, Option<Arc<GlyphOutline>>, fxhash::FxBuildHasher>>,
}

impl std::fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontHandle")
            .field("family", &self.family)
            .field("face_index", &self.face_index)
            .field("units_per_em", &self.units_per_em)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl FontHandle {
    /// Parses font bytes. The first face of a collection is used.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Result<Self, FontParseError> {
        let mut font_db = fontdb::Database::new();
        font_db.load_font_data(data.into());

        let face = font_db.faces().next().ok_or(FontParseError::NoFace)?;
        let id = face.id;
        let family = face.families.first().map(|(name, _)| name.clone());

        let (bytes, face_index) = font_db
            .with_face_data(id, |data, index| (Arc::<[u8]>::from(data), index))
            .ok_or(FontParseError::NoFace)?;

        let units_per_em = ttf_parser::Face::parse(&bytes, face_index)?.units_per_em() as f32;

        let metrics = fontdue::Font::from_bytes(
            &bytes[..],
            fontdue::FontSettings {
                collection_index: face_index,
                scale: 40.0,
                load_substitutions: true,
            },
        )
        .map_err(FontParseError::Rasterizer)?;

        log::debug!(
            "Parsed font face {:?} (index: {}, units per em: {})",
            family,
            face_index,
            units_per_em
        );

        Ok(Self {
            family,
            bytes,
            face_index,
            units_per_em,
            metrics,
            outlines: Mutex::new(HashMap::with_hasher(fxhash::FxBuildHasher::default())),
        })
    }

    /// Family name reported by the font, if any.
    pub fn family_name(&self) -> Option<&str> {
        self.family.as_deref()
    }

    /// Index of the face within a font collection.
    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    /// Raw font file bytes.
    pub fn data(&self) -> &[u8] {
        &self.bytes
    }

    fn extract_outline(&self, ch: char) -> Option<Arc<GlyphOutline>> {
        // The face was parsed successfully in `from_bytes`; the bytes never change.
        let face = match ttf_parser::Face::parse(&self.bytes, self.face_index) {
            Ok(face) => face,
            Err(e) => {
                log::error!("Failed to re-parse font face: {}", e);
                return None;
            }
        };

        let glyph_id = face.glyph_index(ch)?;

        let mut collector = OutlineCollector::default();
        // `None` means the glyph exists but has no outline (e.g. whitespace).
        let _bbox = face.outline_glyph(glyph_id, &mut collector);

        Some(Arc::new(GlyphOutline {
            commands: collector.finish(),
            advance_width: face.glyph_hor_advance(glyph_id).map(f32::from),
        }))
    }
}

impl GlyphSource for FontHandle {
    fn units_per_em(&self) -> f32 {
        self.units_per_em
    }

    fn glyph_outline(&self, ch: char) -> Option<Arc<GlyphOutline>> {
        use std::collections::hash_map::Entry;

        let mut outlines = self.outlines.lock();
        match outlines.entry(ch) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => entry.insert(self.extract_outline(ch)).clone(),
        }
    }

    fn measured_advance(&self, ch: char, font_size: f32) -> f32 {
        let advance = self.metrics.metrics(ch, font_size).advance_width;
        if advance.is_finite() { advance } else { 0.0 }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{HorizontalAlign, LayoutSpec};

    /// First sans-serif system face that covers basic Latin, if the machine
    /// has one.
    fn system_font() -> Option<FontHandle> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        const FAMILIES: &[fontdb::Family<'_>] = &[fontdb::Family::SansSerif];
        let query = fontdb::Query {
            families: FAMILIES,
            weight: fontdb::Weight::NORMAL,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };
        let id = db.query(&query).or_else(|| db.faces().next().map(|face| face.id))?;
        db.with_face_data(id, |data, _| FontHandle::from_bytes(data.to_vec()))?
            .ok()
            .filter(|font| "HiorldW!".chars().all(|ch| font.glyph_outline(ch).is_some()))
    }

    #[test]
    fn rejects_html_bytes() {
        let html = b"<!DOCTYPE html><html><body>404</body></html>".to_vec();
        let err = FontHandle::from_bytes(html).unwrap_err();
        assert!(matches!(err, FontParseError::NoFace));
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(FontHandle::from_bytes(Vec::new()).is_err());
    }

    #[test]
    fn rejects_truncated_sfnt_header() {
        // TrueType magic followed by garbage.
        let mut bytes = vec![0x00, 0x01, 0x00, 0x00];
        bytes.extend(std::iter::repeat_n(0xAB, 64));
        assert!(FontHandle::from_bytes(bytes).is_err());
    }

    #[test]
    fn parses_system_font_outlines() {
        let Some(font) = system_font() else {
            return;
        };
        assert!(font.units_per_em() > 0.0);

        let outline = font.glyph_outline('H').unwrap();
        assert!(!outline.commands.is_empty());
        assert!(outline.advance_width.is_some());
        // memoized
        assert!(Arc::ptr_eq(&outline, &font.glyph_outline('H').unwrap()));

        assert!(font.glyph_outline('\u{10FFFD}').is_none());
        let fallback = font.measured_advance('\u{10FFFD}', 48.0);
        assert!(fallback.is_finite() && fallback >= 0.0);
        assert!(font.measured_advance('H', 48.0) > 0.0);
    }

    #[test]
    fn compiles_text_with_system_font() {
        let Some(font) = system_font() else {
            return;
        };
        let spec = LayoutSpec {
            text: "Hi o!\nWorld".to_string(),
            font_size: 48.0,
            align: HorizontalAlign::Right,
            ..LayoutSpec::default()
        };

        let compiled = spec.compile(&font);
        assert_eq!(compiled.fills.len(), 9);
        assert!(compiled.contours.len() >= compiled.fills.len());
        assert_eq!(compiled, spec.compile(&font));

        let right_edges: Vec<f32> = compiled
            .lines
            .iter()
            .map(|line| line.start_x + line.width)
            .collect();
        assert_eq!(right_edges.len(), 2);
        assert!((right_edges[0] - right_edges[1]).abs() < 1e-3);
    }
}
