//! Log setup for the sheet generator.
//!
//! Records from the `calib_sheets*` crates follow the requested level; records
//! from any other crate are capped at `Warn` so `-vv` stays readable. Lines go
//! to stderr as `[elapsed LEVEL crate] message`, keeping stdout free for the
//! CLI's page listing.

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

/// Target prefix shared by every crate of the workspace.
const OWN_TARGET: &str = "calib_sheets";

/// Level applied to `target` when the sheet crates log at `level`.
fn threshold(target: &str, level: LevelFilter) -> LevelFilter {
    if target.starts_with(OWN_TARGET) {
        level
    } else {
        level.min(LevelFilter::Warn)
    }
}

fn format_line(elapsed: f64, level: log::Level, target: &str, args: &fmt::Arguments<'_>) -> String {
    let krate = target.split("::").next().unwrap_or(target);
    format!("[{elapsed:7.3}s {level:>5} {krate}] {args}")
}

struct SheetLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for SheetLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= threshold(metadata.target(), self.level)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let line = format_line(
                self.started.elapsed().as_secs_f64(),
                record.level(),
                record.target(),
                record.args(),
            );
            let _ = writeln!(std::io::stderr().lock(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<SheetLogger> = OnceLock::new();

/// Install the stderr logger at `level`; later calls keep the first level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| SheetLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Map `-v` / `-q` counts onto a level filter, starting from `Info`.
pub fn level_from_verbosity(verbose: u8, quiet: u8) -> LevelFilter {
    const LEVELS: [LevelFilter; 6] = [
        LevelFilter::Off,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];
    let idx = 3i32 + i32::from(verbose) - i32::from(quiet);
    LEVELS[idx.clamp(0, LEVELS.len() as i32 - 1) as usize]
}

/// `EnvFilter` directives equivalent to [`threshold`] at `level`.
#[cfg(any(feature = "tracing", test))]
fn filter_directives(level: LevelFilter) -> String {
    let own = level.as_str().to_ascii_lowercase();
    let other = level.min(LevelFilter::Warn).as_str().to_ascii_lowercase();
    format!("{other},{OWN_TARGET}={own}")
}

/// Install a `tracing` subscriber on stderr (JSON lines when `json`).
///
/// `RUST_LOG` overrides `level` when set.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: LevelFilter, json: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}
