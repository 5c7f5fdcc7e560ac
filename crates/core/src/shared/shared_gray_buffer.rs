use std::sync::{Mutex, MutexGuard, PoisonError};

use super::frame::Frame;

/// A downscaled copy of the latest published frame.
#[derive(Clone, Debug)]
pub struct GraySnapshot {
    pub frame: Frame,
    /// Increments once per `publish`; 0 means nothing was ever published.
    pub generation: u64,
}

#[derive(Default)]
struct Latest {
    frame: Option<Frame>,
    generation: u64,
}

/// The single grayscale frame shared by the display and detection loops.
///
/// The display loop overwrites it every frame; the detection loop copies a
/// downscaled version out whenever it is ready for more work. The lock is
/// held only for the overwrite and for the resize.
#[derive(Default)]
pub struct SharedGrayBuffer {
    latest: Mutex<Latest>,
}

impl SharedGrayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored frame, converting to grayscale if needed.
    pub fn publish(&self, frame: &Frame) {
        let gray = frame.to_grayscale();
        let mut latest = self.lock();
        latest.frame = Some(gray);
        latest.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Downscaled copy of the stored frame if it is newer than `seen`.
    ///
    /// Returns `Ok(None)` when nothing was published since generation `seen`.
    pub fn downscaled_snapshot(
        &self,
        scale: f64,
        seen: u64,
    ) -> Result<Option<GraySnapshot>, Box<dyn std::error::Error>> {
        let latest = self.lock();
        if latest.generation <= seen {
            return Ok(None);
        }
        let Some(frame) = latest.frame.as_ref() else {
            return Ok(None);
        };
        Ok(Some(GraySnapshot {
            frame: frame.downscaled(scale)?,
            generation: latest.generation,
        }))
    }

    // A panic elsewhere cannot leave a plain image half-valid.
    fn lock(&self) -> MutexGuard<'_, Latest> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
