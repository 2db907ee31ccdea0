use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: "./logs".to_string(),
        }
    }
}

impl From<&Config> for LogConfig {
    fn from(config: &Config) -> Self {
        Self {
            log_level: config.log_level.clone(),
            enable_file_logs: config.enable_file_logs,
            log_dir: config.log_dir.clone(),
        }
    }
}

fn file_appender(log_dir: &str) -> Option<RollingFileAppender> {
    match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("gesture-backend")
        .filename_suffix("log")
        .max_log_files(14)
        .build(log_dir)
    {
        Ok(appender) => Some(appender),
        Err(e) => {
            // subscriber 尚未初始化，只能写 stderr
            eprintln!("file logging disabled, cannot open {log_dir}: {e}");
            None
        }
    }
}

pub fn init_tracing(config: &LogConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let stdout_layer = fmt::layer().with_target(true).with_thread_ids(false);

    let registry = Registry::default().with(env_filter).with(stdout_layer);

    let appender = if config.enable_file_logs {
        file_appender(&config.log_dir)
    } else {
        None
    };

    // 全局 subscriber 已设置（如测试环境）时 try_init 会失败，忽略即可
    let result = match appender {
        Some(appender) => {
            let file_layer = fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .json();
            registry.with(file_layer).try_init()
        }
        None => registry.try_init(),
    };

    if let Err(e) = result {
        let msg = e.to_string();
        if !msg.contains("already been set") {
            eprintln!("failed to initialize tracing: {e}");
        }
    }
}
