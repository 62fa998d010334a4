use std::sync::OnceLock;

use anyhow::anyhow;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::{env_is_true, env_or_default};

// 文件写入线程的 guard，进程结束前不能释放
static FILE_GUARDS: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

#[derive(Debug, Clone, PartialEq)]
struct LogConfig {
    app_env: String,
    level: String,
    dir: String,
    rotation: Rotation,
    file_prefix: String,
    console: bool,
}

impl LogConfig {
    fn from_env() -> Self {
        Self {
            app_env: env_or_default("APP_ENV", "local"),
            level: env_or_default("LOG_LEVEL", "info"),
            dir: env_or_default("LOG_DIR", "log_files"),
            rotation: parse_rotation(&env_or_default("LOG_ROTATION", "daily")),
            file_prefix: env_or_default("LOG_FILE_PREFIX", "sentiment"),
            console: env_is_true("ENABLE_CONSOLE_LOGGING", true),
        }
    }

    fn is_local(&self) -> bool {
        self.app_env == "local"
    }

    /// (全量日志, 仅错误日志) 文件名
    fn file_names(&self) -> (String, String) {
        (
            format!("{}.log", self.file_prefix),
            format!("{}-error.log", self.file_prefix),
        )
    }
}

// 解析时间轮转策略，未知值按天
fn parse_rotation(s: &str) -> Rotation {
    match s.trim().to_lowercase().as_str() {
        "minutely" | "minute" | "min" => Rotation::MINUTELY,
        "hourly" | "hour" | "hr" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn text_layer<W>(writer: W, ansi: bool, filter: EnvFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_ansi(ansi)
        .with_target(false)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(writer)
        .with_filter(filter)
        .boxed()
}

/// 初始化全局日志
///
/// `APP_ENV=local` 只输出到 stderr；其他环境写入滚动日志文件
/// （全量 + 仅错误两份），`ENABLE_CONSOLE_LOGGING` 控制是否同时输出到 stderr。
/// 级别由 `LOG_LEVEL` 决定，支持 `EnvFilter` 语法。
pub fn setup_logging() -> anyhow::Result<()> {
    let config = LogConfig::from_env();

    if config.is_local() {
        let subscriber = Registry::default().with(text_layer(
            std::io::stderr,
            true,
            EnvFilter::try_new(&config.level)?,
        ));
        tracing::subscriber::set_global_default(subscriber)?;
        info!("日志初始化完成: env={}, level={}", config.app_env, config.level);
        return Ok(());
    }

    std::fs::create_dir_all(&config.dir).map_err(|e| anyhow!("创建日志目录 '{}' 失败: {}", config.dir, e))?;
    let (all_name, error_name) = config.file_names();
    let (all_writer, all_guard) =
        tracing_appender::non_blocking(RollingFileAppender::new(config.rotation.clone(), &config.dir, all_name));
    let (error_writer, error_guard) =
        tracing_appender::non_blocking(RollingFileAppender::new(config.rotation.clone(), &config.dir, error_name));
    FILE_GUARDS
        .set(vec![all_guard, error_guard])
        .map_err(|_| anyhow!("日志已初始化"))?;

    let mut layers = vec![
        text_layer(all_writer, false, EnvFilter::try_new(&config.level)?),
        text_layer(error_writer, false, EnvFilter::new("error")),
    ];
    if config.console {
        layers.push(text_layer(std::io::stderr, true, EnvFilter::try_new(&config.level)?));
    }

    let subscriber = Registry::default().with(layers);
    tracing::subscriber::set_global_default(subscriber)?;

    info!(
        "日志初始化完成: env={}, level={}, dir={}, console={}",
        config.app_env, config.level, config.dir, config.console
    );
    Ok(())
}
