use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Timestamp layout for log lines; the harvester runs for days, so every line is dated.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Install the global logger. Dependencies log at Warn; this crate at Info, or Debug when `verbose`.
/// `RUST_LOG` still overrides both. Call once per process.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_CRATE_NAME"), level)
        .parse_default_env()
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            let ts = chrono::Local::now().format(TIME_FORMAT).to_string().dimmed();
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = match record.level() {
                        Level::Warn => "WARN".yellow(),
                        _ => "ERROR".red(),
                    };
                    let path = record.target().to_string().white();
                    format!("{ts} [{name} {level_str} {path}] {}", record.args())
                }
                Level::Debug | Level::Trace => {
                    format!("{ts} [{name} {}] {}", "DEBUG".blue(), record.args())
                }
                Level::Info => format!("{ts} [{name}] {}", record.args()),
            };
            writeln!(buf, "{line}")
        })
        .init();
}
