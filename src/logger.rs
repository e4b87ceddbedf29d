use std::io::Write;
use std::time::Instant;

use log::{Level, Log, Metadata, Record, SetLoggerError};
use parking_lot::Mutex;

struct IttLogger {
    file: Option<Mutex<std::fs::File>>,
    filter: log::LevelFilter,
    start: Instant,
}

/// Line ending for console output; raw mode needs an explicit carriage return.
fn line_ending() -> &'static str {
    if crossterm::terminal::is_raw_mode_enabled().unwrap_or(false) {
        "\r\n"
    } else {
        "\n"
    }
}

impl Log for IttLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.start.elapsed().as_secs_f64();
        let line = format!(
            "[{elapsed:.3}s] [{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        );

        let style = level_style(record.level());
        let _ = write!(
            std::io::stderr().lock(),
            "{style}{line}{style:#}{}",
            line_ending()
        );

        if let Some(ref file) = self.file {
            let _ = writeln!(file.lock(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(ref file) = self.file {
            let _ = file.lock().flush();
        }
    }
}

/// Initialize the global logger. The level comes from `RUST_LOG` and defaults to `warn`.
///
/// # Errors
///
/// Returns `SetLoggerError` if a logger is already installed.
pub fn init(log_file: Option<std::fs::File>) -> Result<(), SetLoggerError> {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(log::LevelFilter::Warn);

    let logger = IttLogger {
        file: log_file.map(Mutex::new),
        filter,
        start: Instant::now(),
    };

    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(filter);
    Ok(())
}

/// Console style for a log level.
#[must_use]
pub fn level_style(level: Level) -> anstyle::Style {
    let color = match level {
        Level::Error => anstyle::AnsiColor::Red,
        Level::Warn => anstyle::AnsiColor::Yellow,
        Level::Info => anstyle::AnsiColor::Blue,
        Level::Debug | Level::Trace => anstyle::AnsiColor::BrightBlack,
    };
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(color)))
}
