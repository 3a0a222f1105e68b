//! Card classifier adapter.
//!
//! The pipeline only needs [`CardClassifier`]. [`VocabularyClassifier`] turns
//! any raw score model into one by taking the argmax over the 54 vocabulary
//! slots. `OnnxModel` (feature `onnx`) is the production score model.

use crate::segment::to_luma;
use crazy_fours_cards::{Card, VOCABULARY_LEN};
use image::imageops::{self, FilterType};
use image::RgbImage;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ClassifierError {
    #[error("failed to load model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },
    #[error("model emits {got} class scores, the card vocabulary has {expected}")]
    ClassCountMismatch { expected: usize, got: usize },
    #[error("input holds {got} values, a {size}x{size} image needs {expected}")]
    InputShape { expected: usize, got: usize, size: u32 },
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Single-channel classifier input in `[0, 1]`, laid out as a `[1, 1, size, size]` batch.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedImage {
    size: u32,
    data: Vec<f32>,
}

impl NormalizedImage {
    pub fn from_raw(size: u32, data: Vec<f32>) -> Result<Self, ClassifierError> {
        let expected = size as usize * size as usize;
        if data.len() != expected {
            return Err(ClassifierError::InputShape {
                expected,
                got: data.len(),
                size,
            });
        }
        Ok(Self { size, data })
    }

    pub fn zeros(size: u32) -> Self {
        Self {
            size,
            data: vec![0.0; size as usize * size as usize],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Tensor shape: batch, channels, height, width.
    pub fn shape(&self) -> [usize; 4] {
        let s = self.size as usize;
        [1, 1, s, s]
    }

    /// Row-major pixel values.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn mean(&self) -> f32 {
        self.data.iter().sum::<f32>() / self.data.len().max(1) as f32
    }
}

/// Luma, bilinear resize to `size x size`, scale to `[0, 1]`.
///
/// This must stay identical to the preprocessing the model was trained with.
pub fn preprocess(image: &RgbImage, size: u32) -> NormalizedImage {
    let gray = to_luma(image);
    let resized = imageops::resize(&gray, size, size, FilterType::Triangle);
    NormalizedImage {
        size,
        data: resized.as_raw().iter().map(|&v| v as f32 / 255.0).collect(),
    }
}

/// Raw score model: one score per class for a normalized image.
pub trait ScoreModel {
    fn num_classes(&self) -> usize;
    fn scores(&self, input: &NormalizedImage) -> Result<Vec<f32>, ClassifierError>;
}

/// Maps a normalized card image to a card label.
pub trait CardClassifier {
    fn classify(&self, input: &NormalizedImage) -> Result<Card, ClassifierError>;
}

impl<C: CardClassifier + ?Sized> CardClassifier for &C {
    fn classify(&self, input: &NormalizedImage) -> Result<Card, ClassifierError> {
        (**self).classify(input)
    }
}

impl<C: CardClassifier + ?Sized> CardClassifier for Box<C> {
    fn classify(&self, input: &NormalizedImage) -> Result<Card, ClassifierError> {
        (**self).classify(input)
    }
}

/// Index of the largest score. The first maximum wins; NaN never does.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if s.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

/// Argmax classifier over the fixed card vocabulary.
#[derive(Debug)]
pub struct VocabularyClassifier<M> {
    model: M,
}

impl<M: ScoreModel> VocabularyClassifier<M> {
    /// Wrap `model`, rejecting it unless it scores exactly the 54 vocabulary
    /// classes.
    pub fn new(model: M) -> Result<Self, ClassifierError> {
        let got = model.num_classes();
        if got != VOCABULARY_LEN {
            return Err(ClassifierError::ClassCountMismatch {
                expected: VOCABULARY_LEN,
                got,
            });
        }
        Ok(Self { model })
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

impl<M: ScoreModel> CardClassifier for VocabularyClassifier<M> {
    fn classify(&self, input: &NormalizedImage) -> Result<Card, ClassifierError> {
        let scores = self.model.scores(input)?;
        if scores.len() != VOCABULARY_LEN {
            return Err(ClassifierError::ClassCountMismatch {
                expected: VOCABULARY_LEN,
                got: scores.len(),
            });
        }
        argmax(&scores)
            .and_then(Card::from_index)
            .ok_or_else(|| ClassifierError::Inference("no finite class score".to_string()))
    }
}
