//! Headless capture: PNG screenshots.

use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use motorola_6847::palette::to_rgb;

use crate::Mp1000;

/// Save the visible screen (borders included) as an RGB PNG.
pub fn save_screenshot(mp1000: &Mp1000, path: &Path) -> Result<(), Box<dyn Error>> {
    let info = mp1000.display_info();
    let screen = info.screen;
    let fb = mp1000.framebuffer();

    let file = fs::File::create(path)?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        u32::try_from(screen.width)?,
        u32::try_from(screen.height)?,
    );
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let mut rgb = Vec::with_capacity(screen.width * screen.height * 3);
    for y in screen.y..screen.y + screen.height {
        let row = y * info.width;
        for &index in &fb[row + screen.x..row + screen.x + screen.width] {
            rgb.extend_from_slice(&to_rgb(info.palette[usize::from(index)]));
        }
    }

    writer.write_image_data(&rgb)?;
    Ok(())
}

/// Run `num_frames` frames, saving each as a numbered PNG in `dir`.
pub fn save_frame_sequence(
    mp1000: &mut Mp1000,
    dir: &Path,
    num_frames: u32,
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;

    for i in 1..=num_frames {
        mp1000.run_frame();
        save_screenshot(mp1000, &dir.join(format!("{i:06}.png")))?;
    }

    Ok(())
}
