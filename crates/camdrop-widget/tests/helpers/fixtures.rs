//! Test fixtures: small encoded images.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

fn encode(width: u32, height: u32, colour: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(colour));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, format)
        .expect("encode fixture image");
    out.into_inner()
}

/// 10x10 solid red JPEG.
pub fn red_jpeg() -> Vec<u8> {
    encode(10, 10, [255, 0, 0], ImageFormat::Jpeg)
}

/// 10x10 solid blue PNG.
pub fn blue_png() -> Vec<u8> {
    encode(10, 10, [0, 0, 255], ImageFormat::Png)
}

/// Bytes that are not an image in any format.
pub fn not_an_image() -> Vec<u8> {
    b"just some text, definitely not pixels".to_vec()
}

/// PNG of pseudo-random pixels, large enough to span many upload chunks.
pub fn noisy_png(width: u32, height: u32) -> Vec<u8> {
    let mut seed: u32 = 0x2545_F491;
    let img = RgbImage::from_fn(width, height, |_, _| {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let [r, g, b, _] = seed.to_le_bytes();
        Rgb([r, g, b])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode fixture image");
    out.into_inner()
}
