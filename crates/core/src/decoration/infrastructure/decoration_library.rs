use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

use crate::decoration::domain::decoration_handle::DecorationHandle;
use crate::shared::constants::DECORATION_EXTENSIONS;
use crate::shared::file_listing::list_files;

#[derive(Error, Debug)]
pub enum DecorationLoadError {
    #[error("failed to read decoration directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode decoration {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no decorations found in {0}")]
    Empty(PathBuf),
}

/// Decoration images, loaded once and referenced by handle.
///
/// Handle `n` refers to the `n`-th image in load order.
pub struct DecorationLibrary {
    images: Vec<RgbaImage>,
    names: Vec<String>,
}

impl DecorationLibrary {
    pub fn from_images(images: Vec<RgbaImage>) -> Self {
        let names = (0..images.len()).map(|i| format!("decoration_{i}")).collect();
        Self { images, names }
    }

    pub fn handles(&self) -> Vec<DecorationHandle> {
        (0..self.images.len() as u32)
            .map(DecorationHandle::new)
            .collect()
    }

    pub fn get(&self, handle: DecorationHandle) -> Option<&RgbaImage> {
        self.images.get(handle.index())
    }

    pub fn name(&self, handle: DecorationHandle) -> Option<&str> {
        self.names.get(handle.index()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Loads every PNG in `dir`, sorted by file name, as RGBA.
pub fn load_decorations(dir: &Path) -> Result<DecorationLibrary, DecorationLoadError> {
    let paths = list_files(dir, DECORATION_EXTENSIONS).map_err(|source| {
        DecorationLoadError::ReadDir {
            path: dir.to_path_buf(),
            source,
        }
    })?;
    if paths.is_empty() {
        return Err(DecorationLoadError::Empty(dir.to_path_buf()));
    }

    let mut images = Vec::with_capacity(paths.len());
    let mut names = Vec::with_capacity(paths.len());
    for path in paths {
        let img = image::open(&path)
            .map_err(|source| DecorationLoadError::Decode {
                path: path.clone(),
                source,
            })?
            .to_rgba8();
        log::debug!(
            "Loaded decoration {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        names.push(
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        images.push(img);
    }

    log::info!("Loaded {} decorations from {}", images.len(), dir.display());
    Ok(DecorationLibrary { images, names })
}
