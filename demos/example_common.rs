use std::sync::Arc;

use fude::{
    FontHandle, HandwritingConfig,
    fontdb::{self, Family, Query},
};

/// Loads the font given as the first command line argument, or the first
/// cursive/sans-serif system font when no path is given.
pub fn load_demo_font() -> Arc<FontHandle> {
    if let Some(path) = std::env::args().nth(1).filter(|arg| !arg.contains('=')) {
        let data = std::fs::read(&path).expect("failed to read font file");
        return Arc::new(FontHandle::from_bytes(data).expect("not a usable font"));
    }

    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    assert!(!db.is_empty(), "system fonts are required without a font path");

    const FAMILIES: &[Family<'_>] = &[Family::Cursive, Family::SansSerif];
    let query = Query {
        families: FAMILIES,
        weight: fontdb::Weight::NORMAL,
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    };
    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|face| face.id))
        .expect("no usable fonts registered");

    let font = db
        .with_face_data(id, |data, _index| FontHandle::from_bytes(data.to_vec()))
        .expect("face data unavailable")
        .expect("not a usable font");
    Arc::new(font)
}

/// Demo configuration; `key=value` arguments override options.
pub fn demo_config() -> HandwritingConfig {
    let mut config = HandwritingConfig {
        text: "We're getting\nmarried!".to_string(),
        font_size: 72.0,
        duration: 2.5,
        ..HandwritingConfig::default()
    };

    for arg in std::env::args().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // invalid options are logged and skipped
            let _ = config.set_option(key, value);
        }
    }

    config
}
