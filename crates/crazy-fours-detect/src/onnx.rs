//! ONNX score model backed by `tract-onnx`.

use crate::classifier::{ClassifierError, NormalizedImage, ScoreModel, VocabularyClassifier};
use std::path::Path;
use tract_onnx::prelude::*;

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// A card classifier exported to ONNX, taking a `[1, 1, size, size]` f32 input
/// and producing one score per vocabulary class.
///
/// Loaded once at startup; inference only borrows it.
pub struct OnnxModel {
    plan: Plan,
    input_size: u32,
    num_classes: usize,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("input_size", &self.input_size)
            .field("num_classes", &self.num_classes)
            .finish_non_exhaustive()
    }
}

impl OnnxModel {
    /// Load and optimize the model, then run one warm-up inference on a blank
    /// image to learn the output width.
    pub fn load(path: impl AsRef<Path>, input_size: u32) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let load_err = |e: TractError| ClassifierError::ModelLoad {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        };

        let s = input_size as usize;
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_err)?
            .with_input_fact(0, f32::fact([1, 1, s, s]).into())
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?
            .into_runnable()
            .map_err(load_err)?;

        let mut model = Self {
            plan,
            input_size,
            num_classes: 0,
        };
        let scores = model
            .run(&NormalizedImage::zeros(input_size))
            .map_err(|e| ClassifierError::ModelLoad {
                path: path.to_path_buf(),
                reason: format!("warm-up inference failed: {e}"),
            })?;
        model.num_classes = scores.len();
        log::info!(
            "loaded classifier {} ({}x{} input, {} classes)",
            path.display(),
            input_size,
            input_size,
            model.num_classes
        );
        Ok(model)
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    fn run(&self, input: &NormalizedImage) -> Result<Vec<f32>, ClassifierError> {
        if input.size() != self.input_size {
            return Err(ClassifierError::InputShape {
                expected: self.input_size as usize * self.input_size as usize,
                got: input.data().len(),
                size: self.input_size,
            });
        }
        let infer_err = |e: TractError| ClassifierError::Inference(format!("{e:#}"));
        let tensor = Tensor::from_shape(&input.shape(), input.data()).map_err(infer_err)?;
        let outputs = self.plan.run(tvec!(tensor.into())).map_err(infer_err)?;
        let scores = outputs
            .first()
            .ok_or_else(|| ClassifierError::Inference("model produced no outputs".to_string()))?
            .to_array_view::<f32>()
            .map_err(infer_err)?;
        Ok(scores.iter().copied().collect())
    }
}

impl ScoreModel for OnnxModel {
    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn scores(&self, input: &NormalizedImage) -> Result<Vec<f32>, ClassifierError> {
        self.run(input)
    }
}

/// Load an ONNX card model and check that it scores the full vocabulary.
pub fn load_classifier(
    path: impl AsRef<Path>,
    input_size: u32,
) -> Result<VocabularyClassifier<OnnxModel>, ClassifierError> {
    VocabularyClassifier::new(OnnxModel::load(path, input_size)?)
}
