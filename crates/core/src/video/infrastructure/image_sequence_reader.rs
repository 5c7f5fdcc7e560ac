use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::file_listing::list_files;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Reads a directory of still images as a frame sequence.
///
/// Files are ordered by name, so zero-padded numbering plays back in order.
/// Each image is decoded lazily when its frame is requested. All images must
/// share the first image's size; a differently sized image yields an error
/// item.
pub struct ImageSequenceReader {
    paths: Vec<PathBuf>,
    size: (u32, u32),
    opened: bool,
}

impl ImageSequenceReader {
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            size: (0, 0),
            opened: false,
        }
    }
}

impl Default for ImageSequenceReader {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(
    path: &Path,
    index: usize,
    (width, height): (u32, u32),
) -> Result<Frame, Box<dyn std::error::Error>> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to decode {}: {e}", path.display()))?
        .to_rgb8();
    if img.dimensions() != (width, height) {
        return Err(format!(
            "{} is {}x{}, expected {width}x{height}",
            path.display(),
            img.width(),
            img.height()
        )
        .into());
    }
    Ok(Frame::from_rgb_image(img, index))
}

impl VideoReader for ImageSequenceReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        let paths = list_files(path, IMAGE_EXTENSIONS)
            .map_err(|e| format!("Failed to read frame directory {}: {e}", path.display()))?;
        let first = paths
            .first()
            .ok_or_else(|| format!("No images found in {}", path.display()))?;
        let (width, height) = image::image_dimensions(first)
            .map_err(|e| format!("Failed to read {}: {e}", first.display()))?;

        let metadata = VideoMetadata {
            width,
            height,
            fps: 0.0,
            total_frames: paths.len(),
            source_path: Some(path.to_path_buf()),
        };
        log::info!(
            "Opened {} frames ({width}x{height}) from {}",
            paths.len(),
            path.display()
        );
        self.paths = paths;
        self.size = (width, height);
        self.opened = true;
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        if !self.opened {
            return Box::new(std::iter::once(Err(
                "ImageSequenceReader: not opened".into()
            )));
        }
        let size = self.size;
        Box::new(
            self.paths
                .iter()
                .enumerate()
                .map(move |(index, path)| decode(path, index, size)),
        )
    }

    fn close(&mut self) {
        self.paths.clear();
        self.opened = false;
    }
}
