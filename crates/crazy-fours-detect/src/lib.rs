//! Card detection for one video frame.
//!
//! [`CardDetector::analyze`] finds card-shaped quads, rectifies and classifies
//! them, then judges the hand against the leftmost card. [`RenderPlan`] turns
//! the result into overlays.
//!
//! ```no_run
//! # #[cfg(feature = "onnx")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use crazy_fours_detect::{annotate, load_classifier, CardDetector, DetectorParams, RenderPlan};
//!
//! let params = DetectorParams::default();
//! let classifier = load_classifier("cards.onnx", params.input_size)?;
//! let detector = CardDetector::new(params, classifier);
//!
//! let frame = image::open("table.png")?.to_rgb8();
//! let analysis = detector.analyze(&frame);
//! let annotated = annotate(&frame, &RenderPlan::from_analysis(&analysis, 2));
//! annotated.save("table_annotated.png")?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "onnx"))]
//! # fn main() {}
//! ```

mod classifier;
#[cfg(feature = "onnx")]
mod onnx;
mod params;
mod pipeline;
mod render;
pub mod segment;

pub use classifier::{
    argmax, preprocess, CardClassifier, ClassifierError, NormalizedImage, ScoreModel,
    VocabularyClassifier,
};
#[cfg(feature = "onnx")]
pub use onnx::{load_classifier, OnnxModel};
pub use params::{DetectorParams, SegmentParams};
pub use pipeline::{partition, CardDetector, DetectedCard, FrameAnalysis, HandCard};
pub use render::{
    annotate, OutlineStyle, Overlay, RenderPlan, TextLabel, PLAYABLE_COLOR, PLAY_PILE_CAPTION,
    PLAY_PILE_COLOR, RAINBOW, UNPLAYABLE_COLOR, WILD_LABEL_COLOR,
};
pub use segment::BoundingBox;
