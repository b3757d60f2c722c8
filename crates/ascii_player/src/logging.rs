use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Crates whose messages are shown below `Trace`.
const OWN_TARGETS: &[&str] = &["ascii_video", "ascii_player"];

struct Logger {
    level: LevelFilter,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        if metadata.level() > self.level {
            return false;
        }
        self.level == LevelFilter::Trace
            || OWN_TARGETS.iter().any(|target| metadata.target().starts_with(target))
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut stderr = std::io::stderr().lock();
        let _ = match record.level() {
            Level::Info => writeln!(stderr, "{}", record.args()),
            level => writeln!(stderr, "[{level}] {}", record.args()),
        };
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// `Info` by default; each `-v` raises and each `-q` lowers it one step.
pub fn level_from_flags(verbose: u8, quiet: u8) -> LevelFilter {
    const LEVELS: [LevelFilter; 6] = [
        LevelFilter::Off,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];
    let index = (3 + i32::from(verbose) - i32::from(quiet)).clamp(0, 5);
    LEVELS[index as usize]
}

pub fn initialize(level: LevelFilter) {
    if log::set_boxed_logger(Box::new(Logger { level })).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_move_the_level() {
        assert_eq!(level_from_flags(0, 0), LevelFilter::Info);
        assert_eq!(level_from_flags(1, 0), LevelFilter::Debug);
        assert_eq!(level_from_flags(9, 0), LevelFilter::Trace);
        assert_eq!(level_from_flags(0, 1), LevelFilter::Warn);
        assert_eq!(level_from_flags(0, 7), LevelFilter::Off);
    }

    #[test]
    fn foreign_debug_output_is_hidden() {
        let logger = Logger { level: LevelFilter::Debug };
        let own = Metadata::builder().level(Level::Debug).target("ascii_video::playback").build();
        let foreign = Metadata::builder().level(Level::Debug).target("winit::platform").build();

        assert!(logger.enabled(&own));
        assert!(!logger.enabled(&foreign));
    }
}
