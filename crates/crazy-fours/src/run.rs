//! The frame loop: acquire, analyze, annotate, present.

use crate::config::ConfigError;
use crate::sink::FrameSink;
use crate::source::FrameSource;
use crazy_fours_cards::Card;
use crazy_fours_detect::{annotate, CardClassifier, CardDetector, FrameAnalysis, RenderPlan};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Cooperative cancellation, checked once per frame.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// A flag raised by Ctrl-C (SIGINT on unix). The frame in flight
    /// finishes before the run loop sees it.
    ///
    /// Only one handler can be installed per process.
    #[cfg(feature = "cli")]
    pub fn on_interrupt() -> Result<Self, ctrlc::Error> {
        let flag = Self::new();
        let raised = flag.clone();
        ctrlc::set_handler(move || {
            log::warn!("interrupt received, stopping after the current frame");
            raised.stop();
        })?;
        Ok(flag)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOptions {
    /// Stop after this many frames.
    pub max_frames: Option<usize>,
    pub outline_thickness: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_frames: None,
            outline_thickness: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandReport {
    pub card: Card,
    pub anchor: [i32; 2],
    pub playable: bool,
    pub wild: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub play_card: Option<Card>,
    pub hand: Vec<HandReport>,
}

impl FrameReport {
    pub fn new(index: usize, width: u32, height: u32, analysis: &FrameAnalysis) -> Self {
        Self {
            index,
            width,
            height,
            play_card: analysis.play_card.as_ref().map(|c| c.card),
            hand: analysis
                .hand
                .iter()
                .map(|h| HandReport {
                    card: h.detected.card,
                    anchor: h.detected.anchor,
                    playable: h.verdict.playable,
                    wild: h.verdict.wild,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub frames: Vec<FrameReport>,
    /// The stop flag ended the run before the source was exhausted.
    pub stopped: bool,
}

impl RunReport {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Process frames until the source ends, `stop` is raised or
/// `options.max_frames` frames have been handled.
///
/// Frames are independent; a frame without cards is presented unchanged.
pub fn run<S, C, K>(
    mut source: S,
    detector: &CardDetector<C>,
    mut sink: K,
    stop: &StopFlag,
    options: RunOptions,
) -> Result<RunReport, RunError>
where
    S: FrameSource,
    C: CardClassifier,
    K: FrameSink,
{
    let mut report = RunReport::default();
    loop {
        if stop.is_stopped() {
            log::info!("stop requested after {} frames", report.frames.len());
            report.stopped = true;
            break;
        }
        if options
            .max_frames
            .is_some_and(|max| report.frames.len() >= max)
        {
            log::info!("frame limit reached");
            break;
        }
        let Some(frame) = source.next_frame() else {
            break;
        };

        let index = report.frames.len();
        let analysis = detector.analyze(&frame);
        let plan = RenderPlan::from_analysis(&analysis, options.outline_thickness);
        let annotated = annotate(&frame, &plan);
        sink.present(index, &annotated, &analysis)?;

        report.frames.push(FrameReport::new(
            index,
            frame.width(),
            frame.height(),
            &analysis,
        ));
    }
    log::info!("processed {} frames", report.frames.len());
    Ok(report)
}
