//! Stderr logging for the command-line front end, built on the `log`
//! facade so the library modules stay backend-agnostic.

use log::{LevelFilter, Log, Metadata, Record};

static LOGGER: StderrLogger = StderrLogger;

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Install the stderr logger. Warnings and errors always show; verbose
/// mode opens up the per-page allocator traces as well.
pub fn init(verbose: bool) {
    let level = if verbose { LevelFilter::Trace } else { LevelFilter::Warn };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
