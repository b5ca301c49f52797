use std::path::Path;

use image::RgbaImage;

use crate::paint::Color;

use super::TextureError;

/// Decodes the image at `path` into straight-alpha RGBA8 pixels.
pub fn decode_rgba(path: &Path) -> Result<RgbaImage, TextureError> {
    let img = image::open(path).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgba8())
}

/// Makes every pixel whose RGB equals `key` fully transparent.
///
/// Returns the number of keyed pixels.
pub fn apply_color_key(image: &mut RgbaImage, key: Color) -> usize {
    let mut keyed = 0;
    for px in image.pixels_mut() {
        let [r, g, b, _] = px.0;
        if key.same_rgb(Color::rgb(r, g, b)) {
            px.0[3] = 0;
            keyed += 1;
        }
    }
    keyed
}
