/* Copyright 2020 @TwoCookingMice */

use crate::math::spectrum::RGBSpectrum;

use exr::prelude::*;

/// Row-major RGB pixels read back from an EXR file.
#[derive(Debug)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<RGBSpectrum>,
}

// Read the first RGB(A) layer of an EXR file. Alpha is ignored.
pub fn read_exr_from_file(file_path: &str) -> exr::error::Result<RgbImage> {
    log::info!("Starting reading OpenEXR image from: {}.", file_path);

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .rgba_channels(
            |resolution, _| RgbImage {
                width: resolution.width(),
                height: resolution.height(),
                pixels: vec![RGBSpectrum::default(); resolution.width() * resolution.height()],
            },
            |image, position, (r, g, b, _a): (f32, f32, f32, f32)| {
                let idx = position.y() * image.width + position.x();
                image.pixels[idx] = RGBSpectrum::new(r, g, b);
            },
        )
        .first_valid_layer()
        .all_attributes()
        .from_file(file_path)?;

    let pixels = image.layer_data.channel_data.pixels;
    log::info!("OpenEXR loaded, width = {}, height = {}.", pixels.width, pixels.height);
    Ok(pixels)
}

// Write EXR Image to file
pub fn write_exr_to_file(image: &[RGBSpectrum],
                         width: usize,
                         height: usize,
                         file_path: &str) -> exr::error::UnitResult {
    log::info!("Starting writing openexr images: {}.", file_path);

    if image.len() != width * height {
        return Err(exr::error::Error::Invalid("pixel count does not match image size".into()));
    }

    write_rgb_file(file_path, width, height, |x, y| {
        let pixel = &image[y * width + x];
        (pixel.r(), pixel.g(), pixel.b())
    })?;
    log::info!("EXR written to: {}.", file_path);
    Ok(())
}
