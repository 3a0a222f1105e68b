//! Stderr logging for the `crazy-fours` binary.
//!
//! Lines look like `[  1.234s  INFO detect::pipeline] message`. Records from
//! the workspace crates follow the requested level; records from dependencies
//! (tract, image decoders) are held at `warn` unless tracing everything.
//! Library crates only use the `log` macros; installing a logger is left to
//! the binary.

use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

const WORKSPACE_PREFIX: &str = "crazy_fours";

/// Default `EnvFilter` directives when `RUST_LOG` is unset.
#[cfg(feature = "tracing")]
const DEFAULT_DIRECTIVES: &str =
    "warn,crazy_fours=info,crazy_fours_core=info,crazy_fours_cards=info,crazy_fours_detect=info";

fn is_workspace_target(target: &str) -> bool {
    target
        .split("::")
        .next()
        .is_some_and(|krate| krate.starts_with(WORKSPACE_PREFIX))
}

/// Short form of a log target: `crazy_fours_detect::pipeline` becomes
/// `detect::pipeline`, a dependency keeps only its crate name.
fn display_target(target: &str) -> Cow<'_, str> {
    if !is_workspace_target(target) {
        return Cow::Borrowed(target.split("::").next().unwrap_or(target));
    }
    let mut segments = target.split("::");
    let krate = segments.next().unwrap_or(target);
    let krate = krate
        .strip_prefix("crazy_fours_")
        .unwrap_or(if krate == WORKSPACE_PREFIX { "run" } else { krate });
    match segments.last() {
        Some(module) => Cow::Owned(format!("{krate}::{module}")),
        None => Cow::Borrowed(krate),
    }
}

fn format_line(elapsed_secs: f64, level: Level, target: &str, args: &fmt::Arguments<'_>) -> String {
    format!(
        "[{:8.3}s {:>5} {}] {}",
        elapsed_secs,
        level,
        display_target(target),
        args
    )
}

struct StderrLogger {
    workspace: LevelFilter,
    dependencies: LevelFilter,
    started: Instant,
}

impl StderrLogger {
    fn new(level: LevelFilter) -> Self {
        let dependencies = if level == LevelFilter::Trace {
            level
        } else {
            level.min(LevelFilter::Warn)
        };
        Self {
            workspace: level,
            dependencies,
            started: Instant::now(),
        }
    }

    fn level_for(&self, target: &str) -> LevelFilter {
        if is_workspace_target(target) {
            self.workspace
        } else {
            self.dependencies
        }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Map a `-v` count to a level filter: 0 = warn, 1 = info, 2 = debug, 3+ = trace.
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger. Only the first call has an effect.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut installed_now = false;
    let logger = LOGGER.get_or_init(|| {
        installed_now = true;
        StderrLogger::new(level)
    });
    if installed_now {
        log::set_logger(logger)?;
        log::set_max_level(logger.workspace);
    }
    Ok(())
}

/// Install a `tracing` subscriber filtered by `RUST_LOG`, reporting span
/// close events so per-frame stage timings show up. Without `RUST_LOG` the
/// workspace crates log at `info` and dependencies at `warn`.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_from_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_from_verbosity(1), LevelFilter::Info);
        assert_eq!(level_from_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(9), LevelFilter::Trace);
    }

    #[test]
    fn targets_are_shortened() {
        assert_eq!(display_target("crazy_fours_detect::pipeline"), "detect::pipeline");
        assert_eq!(display_target("crazy_fours_core::rectify::warp"), "core::warp");
        assert_eq!(display_target("crazy_fours_cards"), "cards");
        assert_eq!(display_target("crazy_fours::run"), "run::run");
        assert_eq!(display_target("crazy_fours"), "run");
        assert_eq!(display_target("tract_core::model::typed"), "tract_core");
    }

    #[test]
    fn dependencies_are_held_at_warn_below_trace() {
        let logger = StderrLogger::new(LevelFilter::Debug);
        assert_eq!(logger.level_for("crazy_fours_detect::segment"), LevelFilter::Debug);
        assert_eq!(logger.level_for("tract_onnx::model"), LevelFilter::Warn);

        let quiet = StderrLogger::new(LevelFilter::Error);
        assert_eq!(quiet.level_for("tract_onnx::model"), LevelFilter::Error);

        let everything = StderrLogger::new(LevelFilter::Trace);
        assert_eq!(everything.level_for("tract_onnx::model"), LevelFilter::Trace);
    }

    #[test]
    fn enabled_follows_the_target() {
        let logger = StderrLogger::new(LevelFilter::Info);
        let own = Metadata::builder()
            .level(Level::Info)
            .target("crazy_fours_detect::pipeline")
            .build();
        let foreign = Metadata::builder()
            .level(Level::Info)
            .target("tract_core::plan")
            .build();
        assert!(logger.enabled(&own));
        assert!(!logger.enabled(&foreign));
    }

    #[test]
    fn line_layout() {
        let line = format_line(
            1.5,
            Level::Warn,
            "crazy_fours_detect::pipeline",
            &format_args!("skipped {} quads", 2),
        );
        assert_eq!(line, "[   1.500s  WARN detect::pipeline] skipped 2 quads");
    }
}
