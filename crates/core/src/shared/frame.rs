use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use ndarray::{s, ArrayView3, ArrayViewMut3, Axis};

use super::orientation::Orientation;

/// A single video frame: contiguous bytes in row-major order.
///
/// Display frames are RGB (3 channels); detection snapshots are grayscale
/// (1 channel). Format conversion happens at I/O boundaries only.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn from_rgb_image(img: RgbImage, index: usize) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Luma conversion (`0.299 R + 0.587 G + 0.114 B`). Grayscale frames are
    /// returned unchanged.
    pub fn to_grayscale(&self) -> Frame {
        if self.channels == 1 {
            return self.clone();
        }

        let luma: Vec<u8> = self
            .as_ndarray()
            .lanes(Axis(2))
            .into_iter()
            .map(|px| {
                let y = 0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64;
                y.round().min(255.0) as u8
            })
            .collect();
        Frame::new(luma, self.width, self.height, 1, self.index)
    }

    /// Bilinear resize by `scale`, keeping at least one pixel per axis.
    pub fn downscaled(&self, scale: f64) -> Result<Frame, Box<dyn std::error::Error>> {
        let width = ((self.width as f64 * scale).round() as u32).max(1);
        let height = ((self.height as f64 * scale).round() as u32).max(1);
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }

        let data = match self.channels {
            1 => {
                let img = GrayImage::from_raw(self.width, self.height, self.data.clone())
                    .ok_or("Failed to wrap grayscale frame")?;
                imageops::resize(&img, width, height, FilterType::Triangle).into_raw()
            }
            3 => {
                let img = RgbImage::from_raw(self.width, self.height, self.data.clone())
                    .ok_or("Failed to wrap RGB frame")?;
                imageops::resize(&img, width, height, FilterType::Triangle).into_raw()
            }
            n => return Err(format!("Unsupported channel count: {n}").into()),
        };
        Ok(Frame::new(data, width, height, self.channels, self.index))
    }

    /// Lays the frame out the way the detector expects it.
    ///
    /// `Rotated` transposes rows and columns, then flips the result
    /// vertically, so the output is `height` wide and `width` tall.
    pub fn oriented(&self, orientation: Orientation) -> Frame {
        match orientation {
            Orientation::Upright => self.clone(),
            Orientation::Rotated => {
                let transposed = self.as_ndarray().permuted_axes([1, 0, 2]);
                let flipped = transposed.slice(s![..;-1, .., ..]);
                let data: Vec<u8> = flipped.iter().copied().collect();
                Frame::new(data, self.height, self.width, self.channels, self.index)
            }
        }
    }

    /// Rotates the image 180° in place.
    pub fn rotate_half_turn(&mut self) {
        self.data.reverse();
        for pixel in self.data.chunks_exact_mut(self.channels as usize) {
            pixel.reverse();
        }
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
