//! Logger setup for the binary

use std::io::Write;

use log::LevelFilter;

/// Maps the number of `-v` flags to a level filter
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs an `env_logger` backend writing `[LEVEL][target] message` to stderr
///
/// `RUST_LOG` overrides the level chosen by `verbosity`.
pub fn init_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::new()
        .filter_level(level_for_verbosity(verbosity))
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}][{}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
}
