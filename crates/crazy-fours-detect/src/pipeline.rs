//! Per-frame detection pipeline.
//!
//! `binarize -> find_card_quads -> rectify_quad -> preprocess -> classify`,
//! then a left-to-right sort that splits the play card from the hand.

use crate::classifier::{preprocess, CardClassifier};
use crate::segment::{binarize, find_card_quads, BoundingBox, CardQuad};
use crate::DetectorParams;
use crazy_fours_cards::{Card, Verdict, WildPolicy};
use crazy_fours_core::rectify_quad;
use image::RgbImage;
use nalgebra::Point2;
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One classified card in frame coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetectedCard {
    pub card: Card,
    /// Bounding-box top-left; labels are placed relative to it.
    pub anchor: [i32; 2],
    /// Corners ordered top-left, top-right, bottom-right, bottom-left.
    pub outline: [Point2<f32>; 4],
    pub bbox: BoundingBox,
    pub area: f64,
}

/// A hand card together with its verdict against the play card.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HandCard {
    pub detected: DetectedCard,
    pub verdict: Verdict,
}

/// Everything the pipeline learned from one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FrameAnalysis {
    /// Leftmost card, if any card was found.
    pub play_card: Option<DetectedCard>,
    /// Remaining cards, left to right.
    pub hand: Vec<HandCard>,
}

impl FrameAnalysis {
    pub fn card_count(&self) -> usize {
        self.play_card.iter().count() + self.hand.len()
    }

    pub fn playable_count(&self) -> usize {
        self.hand.iter().filter(|h| h.verdict.playable).count()
    }
}

/// Split cards already sorted by anchor x into play card and judged hand.
pub fn partition(cards: Vec<DetectedCard>, policy: WildPolicy) -> FrameAnalysis {
    let mut iter = cards.into_iter();
    let Some(play_card) = iter.next() else {
        return FrameAnalysis::default();
    };
    let hand = iter
        .map(|detected| {
            let verdict = policy.judge(detected.card, play_card.card);
            HandCard { detected, verdict }
        })
        .collect();
    FrameAnalysis {
        play_card: Some(play_card),
        hand,
    }
}

/// Card detector: segmentation parameters plus a classifier.
///
/// The classifier is borrowed immutably for every frame, so one detector can
/// serve an entire run.
#[derive(Debug)]
pub struct CardDetector<C> {
    params: DetectorParams,
    classifier: C,
}

impl<C: CardClassifier> CardDetector<C> {
    pub fn new(params: DetectorParams, classifier: C) -> Self {
        Self { params, classifier }
    }

    #[inline]
    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    #[inline]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Detect and classify every card in `frame`, sorted by anchor x.
    ///
    /// Quads that fail rectification or classification are skipped with a
    /// warning; a frame without cards yields an empty list.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(width = frame.width(), height = frame.height()))
    )]
    pub fn detect_cards(&self, frame: &RgbImage) -> Vec<DetectedCard> {
        let binary = binarize(frame, &self.params.segment);
        let quads = find_card_quads(&binary, &self.params.segment);
        log::debug!("{} card-shaped contours", quads.len());

        let mut cards: Vec<DetectedCard> = quads
            .into_iter()
            .filter_map(|quad| self.classify_quad(frame, quad))
            .collect();
        cards.sort_by_key(|c| c.anchor[0]);
        cards
    }

    fn classify_quad(&self, frame: &RgbImage, quad: CardQuad) -> Option<DetectedCard> {
        let anchor = [quad.bbox.x, quad.bbox.y];
        let rectified = match rectify_quad(frame, quad.corners, self.params.min_edge) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("skipping quad at {anchor:?}: {e}");
                return None;
            }
        };

        let input = preprocess(&rectified.image, self.params.input_size);
        let card = match self.classifier.classify(&input) {
            Ok(card) => card,
            Err(e) => {
                log::warn!("skipping quad at {anchor:?}: {e}");
                return None;
            }
        };
        log::debug!(
            "{card} at {anchor:?} ({}x{} rectified)",
            rectified.image.width(),
            rectified.image.height()
        );

        Some(DetectedCard {
            card,
            anchor,
            outline: rectified.corners,
            bbox: quad.bbox,
            area: quad.area,
        })
    }

    /// Full per-frame analysis: detection followed by play card / hand split.
    pub fn analyze(&self, frame: &RgbImage) -> FrameAnalysis {
        let analysis = partition(self.detect_cards(frame), self.params.wild_policy);
        if let Some(play) = &analysis.play_card {
            log::info!(
                "play card {}; {} of {} hand cards playable",
                play.card,
                analysis.playable_count(),
                analysis.hand.len()
            );
        } else {
            log::debug!("no cards in frame");
        }
        analysis
    }
}
