use clap::{ArgAction, Parser, ValueEnum};
use crazy_fours::cards::WildPolicy;
use crazy_fours::detect::{load_classifier, CardDetector};
use crazy_fours::{
    run, DirectorySink, FrameSink, ImageSequence, NullSink, RunConfig, RunOptions, StopFlag,
};
use std::error::Error;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WildPolicyArg {
    /// Fours keep their rank/suit verdict and only get a rainbow outline.
    Cosmetic,
    /// Fours are playable on anything but a face-down card.
    AlwaysPlayable,
}

impl From<WildPolicyArg> for WildPolicy {
    fn from(arg: WildPolicyArg) -> Self {
        match arg {
            WildPolicyArg::Cosmetic => WildPolicy::Cosmetic,
            WildPolicyArg::AlwaysPlayable => WildPolicy::AlwaysPlayable,
        }
    }
}

/// Mark playable cards on a Crazy Fours table.
#[derive(Parser, Debug)]
#[command(name = "crazy-fours", version, about)]
struct Cli {
    /// JSON run config. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// ONNX card classifier.
    #[arg(long)]
    model: Option<PathBuf>,
    /// Image file or directory of frames.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Directory for annotated frames.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Path of the JSON run report.
    #[arg(long)]
    report: Option<PathBuf>,
    #[arg(long)]
    max_frames: Option<usize>,
    #[arg(long, value_enum)]
    wild_policy: Option<WildPolicyArg>,
    /// Write the effective config as JSON to this path and exit.
    #[arg(long)]
    dump_config: Option<PathBuf>,
    /// More output per occurrence (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Emit JSON tracing events instead of plain log lines.
    #[cfg(feature = "tracing")]
    #[arg(long)]
    log_json: bool,
}

fn resolve_config(cli: &Cli) -> Result<RunConfig, Box<dyn Error>> {
    let mut cfg = match &cli.config {
        Some(path) => RunConfig::load_json(path)?,
        None => {
            let model = cli
                .model
                .clone()
                .ok_or("--model is required without --config")?;
            let input = cli
                .input
                .clone()
                .ok_or("--input is required without --config")?;
            RunConfig::new(model, input)
        }
    };

    if let Some(model) = &cli.model {
        cfg.model_path = model.clone();
    }
    if let Some(input) = &cli.input {
        cfg.input = input.clone();
    }
    if cli.output.is_some() {
        cfg.output_dir = cli.output.clone();
    }
    if cli.report.is_some() {
        cfg.report_path = cli.report.clone();
    }
    if cli.max_frames.is_some() {
        cfg.max_frames = cli.max_frames;
    }
    if let Some(policy) = cli.wild_policy {
        cfg.detector.wild_policy = policy.into();
    }
    Ok(cfg)
}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "tracing")]
    {
        if cli.log_json || std::env::var_os("RUST_LOG").is_some() {
            crazy_fours::core::init_tracing(cli.log_json);
            return Ok(());
        }
    }
    crazy_fours::core::init_with_level(crazy_fours::core::level_from_verbosity(cli.verbose))?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let cfg = resolve_config(&cli)?;
    if let Some(path) = &cli.dump_config {
        cfg.write_json(path)?;
        return Ok(());
    }
    log::info!(
        "capture request {}x{} (frames are accepted at any size)",
        cfg.capture.width,
        cfg.capture.height
    );

    let classifier = load_classifier(&cfg.model_path, cfg.detector.input_size)
        .inspect_err(|e| log::error!("{e}"))?;
    let detector = CardDetector::new(cfg.detector.clone(), classifier);

    let source = ImageSequence::open(&cfg.input)?;
    let sink: Box<dyn FrameSink> = match &cfg.output_dir {
        Some(dir) => Box::new(DirectorySink::create(dir)?),
        None => Box::new(NullSink),
    };
    let options = RunOptions {
        max_frames: cfg.max_frames,
        outline_thickness: cfg.outline_thickness,
    };

    let stop = StopFlag::on_interrupt()?;
    let report = run(source, &detector, sink, &stop, options)?;
    if report.stopped {
        log::warn!("interrupted after {} frames", report.frames.len());
    }

    for frame in &report.frames {
        let play = frame
            .play_card
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let playable: Vec<String> = frame
            .hand
            .iter()
            .filter(|h| h.playable)
            .map(|h| h.card.to_string())
            .collect();
        println!(
            "frame {:>5}: play {play:<8} playable [{}]",
            frame.index,
            playable.join(", ")
        );
    }

    if let Some(path) = &cfg.report_path {
        report.write_json(path)?;
        log::info!("report written to {}", path.display());
    }
    Ok(())
}
