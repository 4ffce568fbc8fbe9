//! Logging via `log` + `log4rs`: stderr console plus an optional rolling
//! file, with a whitelist so third-party crates stay quiet unless asked for.

use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::{
            policy::compound::{roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy},
            RollingFileAppender,
        },
    },
    config::{Appender, Logger, Root},
    encode::pattern::PatternEncoder,
    Config,
};
use std::io::IsTerminal;
use std::path::PathBuf;

const CONSOLE_APPENDER: &str = "stderr";
const FILE_APPENDER: &str = "log_file";
const LOG_FILE_NAME: &str = "conclave.log";
const LOG_FILE_MAX_SIZE: u64 = 10 * 1024 * 1024;
const LOG_FILE_MAX_ROLLS: u32 = 4;
const LOG_LINE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t}: {m}{n}";
const LOG_LINE_PATTERN_COLORED: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{h({l})}] {t}: {m}{n}";

const WHITELISTED_CRATES: &[&str] = &["conclave_core", "conclave_cli"];

/// Initialize the global logger.
///
/// `filters` accepts a bare level for our own crates (`"info"`, `"debug"`),
/// `module=level` opt-ins for third-party crates, and `root=level` to open
/// everything up. Repeated calls are ignored.
pub fn init_logger(log_dir: Option<&str>, filters: &str) {
    let app_level = parse_app_level(filters);
    let root_level = parse_root_override(filters).unwrap_or(LevelFilter::Off);
    let module_levels = parse_module_levels(filters);

    let console_pattern = if std::io::stderr().is_terminal() { LOG_LINE_PATTERN_COLORED } else { LOG_LINE_PATTERN };
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(console_pattern)))
        .build();

    let mut builder = Config::builder().appender(Appender::builder().build(CONSOLE_APPENDER, Box::new(console)));
    let mut appender_names: Vec<String> = vec![CONSOLE_APPENDER.to_string()];

    if let Some(dir) = log_dir.map(str::trim).filter(|s| !s.is_empty()) {
        let log_path = PathBuf::from(dir).join(LOG_FILE_NAME);
        let archive = PathBuf::from(dir).join(format!("{LOG_FILE_NAME}.{{}}.gz"));
        let roller = FixedWindowRoller::builder()
            .base(1)
            .build(archive.to_str().unwrap_or("conclave.log.{}.gz"), LOG_FILE_MAX_ROLLS);
        if let Ok(roller) = roller {
            let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(LOG_FILE_MAX_SIZE)), Box::new(roller));
            match RollingFileAppender::builder()
                .encoder(Box::new(PatternEncoder::new(LOG_LINE_PATTERN)))
                .build(log_path, Box::new(policy))
            {
                Ok(appender) => {
                    builder = builder.appender(Appender::builder().build(FILE_APPENDER, Box::new(appender)));
                    appender_names.push(FILE_APPENDER.to_string());
                }
                Err(err) => eprintln!("conclave: file logging disabled: {err}"),
            }
        }
    }

    for crate_name in WHITELISTED_CRATES {
        if !module_levels.iter().any(|(module, _)| module == crate_name) {
            builder = builder.logger(
                Logger::builder()
                    .appenders(appender_names.clone())
                    .additive(false)
                    .build(*crate_name, app_level),
            );
        }
    }

    for (module, level) in &module_levels {
        builder = builder.logger(
            Logger::builder()
                .appenders(appender_names.clone())
                .additive(false)
                .build(module, *level),
        );
    }

    if let Ok(config) = builder.build(Root::builder().appenders(appender_names).build(root_level)) {
        let _ = log4rs::init_config(config);
    }
}

fn parse_app_level(filters: &str) -> LevelFilter {
    filters
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty() && !part.contains('='))
        .find_map(|part| part.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

fn parse_root_override(filters: &str) -> Option<LevelFilter> {
    parse_module_pairs(filters).into_iter().find(|(module, _)| module == "root").map(|(_, level)| level)
}

fn parse_module_levels(filters: &str) -> Vec<(String, LevelFilter)> {
    parse_module_pairs(filters).into_iter().filter(|(module, _)| module != "root").collect()
}

fn parse_module_pairs(filters: &str) -> Vec<(String, LevelFilter)> {
    filters
        .split(',')
        .filter_map(|part| {
            let (module, level) = part.split_once('=')?;
            let module = module.trim();
            let level = level.trim().parse().ok()?;
            if module.is_empty() {
                return None;
            }
            Some((module.to_string(), level))
        })
        .collect()
}
