//! Overlay plan for an analyzed frame and its rasterization.
//!
//! The plan is plain data so presenters other than [`annotate`] (a GUI, a
//! report) can draw it however they like. `annotate` draws outlines only.

use crate::pipeline::{DetectedCard, FrameAnalysis};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use nalgebra::Point2;

pub const PLAY_PILE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const PLAYABLE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const UNPLAYABLE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const WILD_LABEL_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Red, orange, yellow, green, blue, indigo, violet.
pub const RAINBOW: [Rgb<u8>; 7] = [
    Rgb([255, 0, 0]),
    Rgb([255, 165, 0]),
    Rgb([255, 255, 0]),
    Rgb([0, 128, 0]),
    Rgb([0, 0, 255]),
    Rgb([75, 0, 130]),
    Rgb([238, 130, 238]),
];

pub const PLAY_PILE_CAPTION: &str = "Play Card Pile";

/// Label baseline sits this far above the card anchor.
const LABEL_RISE: i32 = 10;
/// Caption baseline sits this far below the bottom of the play card.
const CAPTION_DROP: i32 = 70;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutlineStyle {
    Solid(Rgb<u8>),
    /// Seven nested outlines, the i-th shifted by `i * thickness` in x and y.
    Rainbow,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub outline: [Point2<f32>; 4],
    pub style: OutlineStyle,
    pub thickness: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextLabel {
    pub text: String,
    /// Bottom-left of the text, in frame pixels.
    pub anchor: [i32; 2],
    pub color: Rgb<u8>,
}

/// Everything to draw on top of one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderPlan {
    pub outlines: Vec<Overlay>,
    pub labels: Vec<TextLabel>,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty() && self.labels.is_empty()
    }

    pub fn from_analysis(analysis: &FrameAnalysis, thickness: u32) -> Self {
        let mut plan = Self::default();
        let Some(play) = &analysis.play_card else {
            return plan;
        };

        plan.outline(play, OutlineStyle::Solid(PLAY_PILE_COLOR), thickness);
        plan.label_above(play, PLAY_PILE_COLOR);
        plan.labels.push(TextLabel {
            text: PLAY_PILE_CAPTION.to_string(),
            anchor: [
                play.anchor[0],
                play.anchor[1] + play.bbox.height as i32 + CAPTION_DROP,
            ],
            color: PLAY_PILE_COLOR,
        });

        for hand in &analysis.hand {
            let (style, label_color) = if hand.verdict.wild {
                (OutlineStyle::Rainbow, WILD_LABEL_COLOR)
            } else if hand.verdict.playable {
                (OutlineStyle::Solid(PLAYABLE_COLOR), PLAYABLE_COLOR)
            } else {
                (OutlineStyle::Solid(UNPLAYABLE_COLOR), UNPLAYABLE_COLOR)
            };
            plan.outline(&hand.detected, style, thickness);
            plan.label_above(&hand.detected, label_color);
        }
        plan
    }

    fn outline(&mut self, card: &DetectedCard, style: OutlineStyle, thickness: u32) {
        self.outlines.push(Overlay {
            outline: card.outline,
            style,
            thickness,
        });
    }

    fn label_above(&mut self, card: &DetectedCard, color: Rgb<u8>) {
        self.labels.push(TextLabel {
            text: card.card.to_string(),
            anchor: [card.anchor[0], card.anchor[1] - LABEL_RISE],
            color,
        });
    }
}

fn draw_polygon_thick(image: &mut RgbImage, corners: &[Point2<f32>; 4], color: Rgb<u8>, thickness: u32) {
    let t = thickness.max(1) as i32;
    let lo = -(t - 1) / 2;
    for dy in lo..lo + t {
        for dx in lo..lo + t {
            let (ox, oy) = (dx as f32, dy as f32);
            for i in 0..4 {
                let a = corners[i];
                let b = corners[(i + 1) % 4];
                draw_line_segment_mut(image, (a.x + ox, a.y + oy), (b.x + ox, b.y + oy), color);
            }
        }
    }
}

/// Draw the plan's outlines onto a copy of `frame`.
pub fn annotate(frame: &RgbImage, plan: &RenderPlan) -> RgbImage {
    let mut out = frame.clone();
    for overlay in &plan.outlines {
        match overlay.style {
            OutlineStyle::Solid(color) => {
                draw_polygon_thick(&mut out, &overlay.outline, color, overlay.thickness)
            }
            OutlineStyle::Rainbow => {
                for (i, color) in RAINBOW.iter().enumerate() {
                    let shift = (i as u32 * overlay.thickness) as f32;
                    let shifted = overlay.outline.map(|p| Point2::new(p.x + shift, p.y + shift));
                    draw_polygon_thick(&mut out, &shifted, *color, overlay.thickness);
                }
            }
        }
    }
    out
}
