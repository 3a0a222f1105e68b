use crazy_fours::cards::Card;
use crazy_fours::detect::{CardClassifier, CardDetector, ClassifierError, DetectorParams, NormalizedImage};
use crazy_fours::{run, DirectorySink, ImageSequence, RunOptions, RunReport, StopFlag};
use image::{Rgb, RgbImage};

/// Labels the printed card `Nine_C` and the blank one `Nine_H`.
struct ByBrightness;

impl CardClassifier for ByBrightness {
    fn classify(&self, input: &NormalizedImage) -> Result<Card, ClassifierError> {
        let label = if input.mean() < 0.65 { "Nine_C" } else { "Nine_H" };
        Ok(label.parse().expect("valid label"))
    }
}

fn inside(x: u32, y: u32, x0: u32, y0: u32, side: u32) -> bool {
    x >= x0 && x < x0 + side && y >= y0 && y < y0 + side
}

/// A printed card on the left, a blank card on the right.
fn table() -> RgbImage {
    RgbImage::from_fn(480, 280, |x, y| {
        if inside(x, y, 60, 80, 100) {
            Rgb([30, 30, 30])
        } else if inside(x, y, 40, 60, 140) || inside(x, y, 260, 60, 140) {
            Rgb([240, 240, 240])
        } else {
            Rgb([30, 30, 30])
        }
    })
}

#[test]
fn directory_run_writes_frames_and_report() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    table().save(input.path().join("000.png")).unwrap();
    RgbImage::from_pixel(64, 48, Rgb([30, 30, 30]))
        .save(input.path().join("001.png"))
        .unwrap();

    let detector = CardDetector::new(DetectorParams::default(), ByBrightness);
    let source = ImageSequence::open(input.path()).unwrap();
    let sink = DirectorySink::create(output.path().join("annotated")).unwrap();
    let report = run(
        source,
        &detector,
        sink,
        &StopFlag::new(),
        RunOptions::default(),
    )
    .unwrap();

    assert_eq!(report.frames.len(), 2);
    let first = &report.frames[0];
    assert_eq!(first.play_card.map(|c| c.to_string()).as_deref(), Some("Nine_C"));
    assert_eq!(first.hand.len(), 1);
    assert!(first.hand[0].playable);
    assert!(!first.hand[0].wild);
    assert!(report.frames[1].play_card.is_none());

    let annotated = output.path().join("annotated");
    let frame0 = image::open(annotated.join("frame_00000.png")).unwrap().to_rgb8();
    assert_ne!(frame0, table());
    let frame1 = image::open(annotated.join("frame_00001.png")).unwrap().to_rgb8();
    assert_eq!(frame1, RgbImage::from_pixel(64, 48, Rgb([30, 30, 30])));

    let report_path = output.path().join("report.json");
    report.write_json(&report_path).unwrap();
    let raw = std::fs::read_to_string(&report_path).unwrap();
    let back: RunReport = serde_json::from_str(&raw).unwrap();
    assert_eq!(back, report);
}
