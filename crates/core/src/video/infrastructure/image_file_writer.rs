use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbImage};

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Saves frames with the `image` crate; the format follows the extension.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_image(frame: &Frame) -> Result<DynamicImage, Box<dyn std::error::Error>> {
    let (w, h) = (frame.width(), frame.height());
    let data = frame.data().to_vec();
    let img = match frame.channels() {
        1 => GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
        n => return Err(format!("Unsupported channel count: {n}").into()),
    };
    img.ok_or_else(|| "Failed to create image from frame data".into())
}

impl ImageWriter for ImageFileWriter {
    fn write(
        &self,
        path: &Path,
        frame: &Frame,
        size: Option<(u32, u32)>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let img = to_image(frame)?;
        let img = match size {
            Some((w, h)) => {
                DynamicImage::from(imageops::resize(&img.to_rgb8(), w, h, FilterType::Triangle))
            }
            None => img,
        };

        img.save(path)?;
        Ok(())
    }
}
