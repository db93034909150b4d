use std::fs::File;

use colored::Colorize;
use common::env_config::Config;

pub mod exchange;

pub fn setup(config: &Config) -> Result<(), fern::InitError> {
    File::create(&config.log_file).map_err(fern::InitError::Io)?;

    let level = if config.is_production() {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Debug
    };

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            let color = match record.level() {
                log::Level::Info => "green",
                log::Level::Warn => "yellow",
                log::Level::Error => "red",
                log::Level::Debug => "magenta",
                log::Level::Trace => "bright black",
            };
            out.finish(format_args!(
                "{} {:<5} {} {}",
                chrono::Local::now().format("%H:%M:%S").to_string().bright_black(),
                record.level().to_string().color(color),
                format!("[{}]", crate_of(record.target())).cyan(),
                message
            ))
        })
        .chain(std::io::stdout());

    // Full dates and targets in the file.
    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(fern::log_file(&config.log_file)?);

    fern::Dispatch::new()
        .level(level)
        .level_for("hyper", log::LevelFilter::Off)
        .level_for("hyper_util", log::LevelFilter::Off)
        .level_for("reqwest", log::LevelFilter::Warn)
        .chain(console)
        .chain(file)
        .apply()?;
    Ok(())
}

/// Leading crate name of a log target, `api_auth::client` -> `api_auth`.
fn crate_of(target: &str) -> &str {
    target.split("::").next().unwrap_or(target)
}
