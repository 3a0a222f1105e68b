//! Crazy Fours table assistant.
//!
//! Point a camera (or a directory of frames) at the table: the leftmost card
//! is the play pile, every other card is a hand card, outlined green when it
//! can be played, red when it cannot and in rainbow colors when it is a wild
//! four.
//!
//! ## Quickstart
//!
//! ```no_run
//! # #[cfg(feature = "onnx")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use crazy_fours::detect::{load_classifier, CardDetector, DetectorParams};
//! use crazy_fours::{run, DirectorySink, ImageSequence, RunOptions, StopFlag};
//!
//! let params = DetectorParams::default();
//! let classifier = load_classifier("cards.onnx", params.input_size)?;
//! let detector = CardDetector::new(params, classifier);
//!
//! let source = ImageSequence::open("frames/")?;
//! let sink = DirectorySink::create("annotated/")?;
//! let report = run(source, &detector, sink, &StopFlag::new(), RunOptions::default())?;
//! println!("{} frames", report.frames.len());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "onnx"))]
//! # fn main() {}
//! ```
//!
//! ## API map
//! - `crazy_fours::core`: quad ordering, homographies, rectification, logging.
//! - `crazy_fours::cards`: card labels, vocabulary and playability rules.
//! - `crazy_fours::detect`: segmentation, classifier adapter, per-frame pipeline, overlays.

pub use crazy_fours_cards as cards;
pub use crazy_fours_core as core;
pub use crazy_fours_detect as detect;

mod config;
mod run;
mod sink;
mod source;

pub use config::{CaptureRequest, ConfigError, RunConfig};
pub use run::{run, FrameReport, HandReport, RunError, RunOptions, RunReport, StopFlag};
pub use sink::{DirectorySink, FrameSink, NullSink};
pub use source::{Frame, FrameSource, ImageSequence};
