mod example_common;

use image::{Rgba, RgbaImage};
use fude::{
    HandwritingText, TickOutcome,
    motion::EnvMotionQuery,
    reveal::FrameLoop,
    tiny_skia::Pixmap,
};

fn to_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (pixel, out) in pixmap.pixels().iter().zip(image.pixels_mut()) {
        let c = pixel.demultiply();
        *out = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}

#[allow(clippy::unwrap_used)]
fn main() {
    let font = example_common::load_demo_font();
    let config = example_common::demo_config();
    let mut text = HandwritingText::with_font(config, font, Box::new(EnvMotionQuery::default()));

    let out_dir = std::path::Path::new("target/handwriting_frames");
    std::fs::create_dir_all(out_dir).unwrap();

    let style = text.style();
    let renderer = fude::CpuRenderer::new(1.0);
    let mut index = 0usize;

    let outcome = text.play(&FrameLoop::with_fps(30), |compiled, frame, _| {
        let Some(pixmap) = renderer.render(compiled, Some(frame), &style) else {
            return;
        };
        let path = out_dir.join(format!("frame_{index:04}.png"));
        to_image(&pixmap).save(&path).unwrap();
        index += 1;
    });

    match outcome {
        TickOutcome::Completed | TickOutcome::Finished => {
            println!("wrote {} frames to {}", index, out_dir.display())
        }
        other => println!("reveal ended early: {:?}", other),
    }
}
