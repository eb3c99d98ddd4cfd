mod example_common;

use std::time::{Duration, Instant};

use fude::HandwritingText;

/// Writes the reveal at 25%, 50%, 75% and 100% as SVG documents.
#[allow(clippy::unwrap_used)]
fn main() {
    let font = example_common::load_demo_font();
    let config = example_common::demo_config();
    let duration = config.duration;
    let mut text = HandwritingText::with_font(config, font, Box::new(false));

    let out_dir = std::path::Path::new("target/handwriting_svg");
    std::fs::create_dir_all(out_dir).unwrap();

    let start = Instant::now();
    text.tick(start);
    for quarter in 1..=4u32 {
        let at = start + Duration::from_secs_f32(duration * quarter as f32 / 4.0);
        text.tick(at);

        let path = out_dir.join(format!("reveal_{:03}.svg", quarter * 25));
        std::fs::write(&path, text.render_svg()).unwrap();
        println!("{} ({:?})", path.display(), text.phase());
    }
}
