use std::str::FromStr;

use log::LevelFilter;
use log4rs::{
    append::{
        console::ConsoleAppender,
        rolling_file::{
            policy::compound::{
                roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy,
            },
            RollingFileAppender,
        },
    },
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config, Handle,
};

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} - {M} - {l} - {m}{n}";
const LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;
const LOG_FILE_WINDOW: u32 = 5;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: LevelFilter::Info, file: None }
    }
}

impl LogConfig {
    pub fn new(level: Option<&str>, file: Option<String>) -> Self {
        let level = level
            .and_then(|l| LevelFilter::from_str(l).ok())
            .unwrap_or(LevelFilter::Info);

        Self { level, file }
    }

    pub fn setup(&self) -> Handle {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();

        let mut config =
            Config::builder().appender(Appender::builder().build("stdout", Box::new(stdout)));
        let mut root = Root::builder().appender("stdout");

        if let Some(path) = &self.file {
            let roller = FixedWindowRoller::builder()
                .build(&format!("{}.{{}}", path), LOG_FILE_WINDOW)
                .unwrap();
            let policy =
                CompoundPolicy::new(Box::new(SizeTrigger::new(LOG_FILE_SIZE)), Box::new(roller));
            let logfile = RollingFileAppender::builder()
                .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                .build(path, Box::new(policy))
                .unwrap();

            config = config.appender(Appender::builder().build("logfile", Box::new(logfile)));
            root = root.appender("logfile");
        }

        let config = config.build(root.build(self.level)).unwrap();

        log4rs::init_config(config).unwrap()
    }
}
