//! Quantization of an image into threshold bands.

use image::GrayImage;

use crate::NGRAY;

/// Output level for every input level, or `None` where a pixel keeps its
/// value.
///
/// A level falls into band `i`, the index of the first threshold strictly
/// greater than it. In full mode level 255 is appended as an upper boundary;
/// in semi mode it is not, and levels at or above the highest threshold are
/// left unassigned. Band indices are spread over `0..=255`.
pub fn band_lut(thresholds: &[u8], semi: bool) -> [Option<u8>; NGRAY] {
    let mut bounds = thresholds.to_vec();
    if !semi {
        bounds.push((NGRAY - 1) as u8);
    }
    let steps = bounds.len().saturating_sub(1);

    std::array::from_fn(|level| {
        bounds
            .iter()
            .position(|&bound| level < bound as usize)
            .map(|band| match steps {
                0 => 0,
                _ => (band * (NGRAY - 1) / steps) as u8,
            })
    })
}

/// Rewrite `gray_img` in place so each pixel holds its rescaled band index.
///
/// `thresholds` must be ascending. See [`band_lut`] for the band rules.
pub fn segment(gray_img: &mut GrayImage, thresholds: &[u8], semi: bool) {
    let lut = band_lut(thresholds, semi);
    for pixel in gray_img.pixels_mut() {
        if let Some(value) = lut[pixel[0] as usize] {
            pixel[0] = value;
        }
    }
}
