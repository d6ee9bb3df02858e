use log::{LevelFilter, Log, Metadata, Record};
use std::io::Write;

/// A logger that writes to stdout using println!
pub struct StdoutLogger;

impl Log for StdoutLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        println!("[{}] {} - {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {
        std::io::stdout().flush().ok();
    }
}

/// Initialize the global logger with StdoutLogger.
///
/// Debug builds log at Debug, release builds at Info. This can only be
/// called once per process; subsequent calls are silently ignored.
pub fn init_stdout_logger() {
    static LOGGER: StdoutLogger = StdoutLogger;

    let max_level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(max_level);
    }
}
