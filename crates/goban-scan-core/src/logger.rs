//! Logging backends for scan binaries.
//!
//! The pipeline only emits records through the `log` facade. A binary picks
//! one backend at startup: [`init_with_level`] prints plain lines to stderr,
//! tagged with the pipeline stage that produced them:
//!
//! ```text
//! [   0.004s DEBUG sampler] sampled 361 intersections, 0 without features
//! [   0.009s  INFO scan] board scanned: 40 black, 40 white, 281 empty, match 97.3
//! ```
//!
//! With the `tracing` feature, [`init_tracing`] installs a `tracing`
//! subscriber instead, which also receives `log` records.

use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, util::SubscriberInitExt, EnvFilter};

const CRATE_PREFIX: &str = "goban_scan_core::";

/// Parse a log level for command line flags.
///
/// Accepts the `log` level names in any case, `quiet` for
/// [`LevelFilter::Off`], and verbosity digits `0` (off) to `5` (trace).
pub fn parse_level(text: &str) -> Result<LevelFilter, String> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("quiet") {
        return Ok(LevelFilter::Off);
    }
    if let Ok(n) = text.parse::<usize>() {
        return LevelFilter::iter()
            .nth(n)
            .ok_or_else(|| format!("verbosity {n} is out of range 0..=5"));
    }
    text.parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level {text:?}"))
}

/// Pipeline stage named by a record target: `goban_scan_core::cluster`
/// becomes `cluster`; foreign targets are kept whole.
fn stage(target: &str) -> &str {
    target.strip_prefix(CRATE_PREFIX).unwrap_or(target)
}

fn format_line(elapsed: f64, level: Level, target: &str, message: &str) -> String {
    format!("[{elapsed:8.3}s {level:>5} {}] {message}", stage(target))
}

struct StageLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StageLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{}",
                format_line(
                    self.started.elapsed().as_secs_f64(),
                    record.level(),
                    record.target(),
                    &record.args().to_string(),
                )
            );
        }
    }

    fn flush(&self) {}
}

static STAGE_LOGGER: OnceLock<StageLogger> = OnceLock::new();

/// Install the stderr stage logger.
///
/// Only the first call installs anything; later calls keep the original
/// level and return `Ok`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if STAGE_LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = STAGE_LOGGER.get_or_init(|| StageLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Install a `tracing` subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise everything at `default_level` and
/// above is shown. `json` switches to one JSON object per event. Errors from
/// an already installed subscriber are ignored.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, default_level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string().to_lowercase()));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        let _ = builder
            .json()
            .with_current_span(true)
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = builder.with_target(true).compact().finish().try_init();
    }
}
