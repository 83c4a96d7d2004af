pub mod config;

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use config::{LogConfig, LogLevel, LogName};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

pub fn init_logger(cfg: &LogConfig) -> Result<()> {
    let level = match cfg.level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warning => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
    };

    let (output, is_terminal): (fern::Output, bool) = match cfg.name {
        LogName::Stdout => (io::stdout().into(), io::stdout().is_terminal()),
        LogName::Stderr => (io::stderr().into(), io::stderr().is_terminal()),
        LogName::File => {
            let file = fern::log_file(&cfg.path)
                .with_context(|| format!("open log file '{}'", cfg.path))?;
            (file.into(), false)
        }
    };

    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .debug(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            if is_terminal {
                out.finish(format_args!(
                    "{} [{}] {}",
                    humantime::format_rfc3339_millis(std::time::SystemTime::now()),
                    colors.color(record.level()),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "{} [{}] {}",
                    humantime::format_rfc3339_millis(std::time::SystemTime::now()),
                    record.level(),
                    message
                ))
            }
        })
        .level(level)
        .chain(output)
        .apply()
        .context("init logger")?;

    Ok(())
}
