//! Forward `log` records to defmt
//!
//! The driver and core crates log through the `log` facade so they stay
//! testable on the host. On target every record is re-emitted over RTT.

use defmt::Display2Format;
use log::{Level, LevelFilter, Log, Metadata, Record};

struct DefmtLogger;

static LOGGER: DefmtLogger = DefmtLogger;

impl Log for DefmtLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let args = Display2Format(record.args());
        match record.level() {
            Level::Error => defmt::error!("{}", args),
            Level::Warn => defmt::warn!("{}", args),
            Level::Info => defmt::info!("{}", args),
            Level::Debug => defmt::debug!("{}", args),
            Level::Trace => defmt::trace!("{}", args),
        }
    }

    fn flush(&self) {}
}

/// Install the bridge; call once before anything logs
pub fn init(level: LevelFilter) {
    // SAFETY: called once from `main` before the executor spawns anything,
    // so no other thread of execution can observe the logger being set.
    // thumbv6m has no compare-and-swap, which rules out `log::set_logger`.
    unsafe {
        let _ = log::set_logger_racy(&LOGGER);
        log::set_max_level_racy(level);
    }
}
