//! Presentation of annotated frames.

use crate::RunError;
use crazy_fours_detect::FrameAnalysis;
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Consumer of annotated frames.
pub trait FrameSink {
    fn present(
        &mut self,
        index: usize,
        annotated: &RgbImage,
        analysis: &FrameAnalysis,
    ) -> Result<(), RunError>;
}

impl<K: FrameSink + ?Sized> FrameSink for &mut K {
    fn present(
        &mut self,
        index: usize,
        annotated: &RgbImage,
        analysis: &FrameAnalysis,
    ) -> Result<(), RunError> {
        (**self).present(index, annotated, analysis)
    }
}

impl<K: FrameSink + ?Sized> FrameSink for Box<K> {
    fn present(
        &mut self,
        index: usize,
        annotated: &RgbImage,
        analysis: &FrameAnalysis,
    ) -> Result<(), RunError> {
        (**self).present(index, annotated, analysis)
    }
}

/// Drops every frame. Used when only the report is wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _: usize, _: &RgbImage, _: &FrameAnalysis) -> Result<(), RunError> {
        Ok(())
    }
}

/// Writes each annotated frame as `frame_<index>.png` into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create the directory (and parents) if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, RunError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame_{index:05}.png"))
    }
}

impl FrameSink for DirectorySink {
    fn present(
        &mut self,
        index: usize,
        annotated: &RgbImage,
        _analysis: &FrameAnalysis,
    ) -> Result<(), RunError> {
        let path = self.frame_path(index);
        annotated.save(&path)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}
