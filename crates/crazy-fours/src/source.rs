//! Frame acquisition.

use image::{ImageFormat, RgbImage};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// A decoded color frame, channels in RGB order.
pub type Frame = RgbImage;

/// Pull-based frame producer. `None` ends the stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn next_frame(&mut self) -> Option<Frame> {
        (**self).next_frame()
    }
}

/// Frames read from image files, in lexicographic path order.
///
/// A file that fails to decode ends the stream, the way a camera read
/// failure would.
#[derive(Debug, Clone)]
pub struct ImageSequence {
    pending: VecDeque<PathBuf>,
}

impl ImageSequence {
    /// Open a single image file, or every image file directly inside a
    /// directory. Files whose extension is not an image format are ignored.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            if !path.exists() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no such input: {}", path.display()),
                ));
            }
            return Ok(Self::from_paths(vec![path.to_path_buf()]));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let p = entry?.path();
            if p.is_file() && ImageFormat::from_path(&p).is_ok() {
                paths.push(p);
            }
        }
        paths.sort();
        log::info!("{} frames in {}", paths.len(), path.display());
        Ok(Self::from_paths(paths))
    }

    /// Use `paths` as given, without sorting or filtering.
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            pending: paths.into(),
        }
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Option<Frame> {
        let path = self.pending.pop_front()?;
        match image::open(&path) {
            Ok(img) => {
                log::debug!("read {}", path.display());
                Some(img.to_rgb8())
            }
            Err(e) => {
                log::warn!("cannot read {}: {e}; ending stream", path.display());
                self.pending.clear();
                None
            }
        }
    }
}
