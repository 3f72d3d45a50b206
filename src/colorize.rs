use image::{GrayImage, Rgb, RgbImage};
use rand::Rng;

use crate::NGRAY;

/// Paint every gray level with a random color.
///
/// One triple is drawn per level in level order, so the palette depends only
/// on the state of `rng`.
pub fn colorize<R: Rng + ?Sized>(gray_img: &GrayImage, rng: &mut R) -> RgbImage {
    let palette: [Rgb<u8>; NGRAY] = std::array::from_fn(|_| Rgb(rng.gen()));
    RgbImage::from_fn(gray_img.width(), gray_img.height(), |x, y| {
        palette[gray_img.get_pixel(x, y)[0] as usize]
    })
}
