//! `tracing` setup for the `linkup` binary and the integration tests.
//!
//! Events go to a daily rolling file named `<app>.log.<YYYY-MM-DD>` and can be
//! mirrored to stderr. The first [`init_logging`] call installs the global
//! subscriber; later calls return the path chosen by the first one.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Overrides the log directory when [`LogConfig::log_dir`] is unset.
pub const LOG_DIR_ENV: &str = "LINKUP_LOG_DIR";
/// `json` switches [`LogFormat::from_env`] to JSON lines.
pub const LOG_FORMAT_ENV: &str = "LINKUP_LOG_FORMAT";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON, everything else is text.
    pub fn from_env_value(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }

    /// Read [`LOG_FORMAT_ENV`]; text when unset.
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|raw| Self::from_env_value(&raw))
            .unwrap_or_default()
    }

    fn layer<W>(self, writer: W, ansi: bool) -> BoxedLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        match self {
            Self::Text => Box::new(fmt::layer().with_writer(writer).with_ansi(ansi)),
            Self::Json => Box::new(fmt::layer().json().with_writer(writer)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Prefix of the log file name and of the default log directory.
    pub app_name: &'static str,
    /// Explicit log directory; otherwise `LINKUP_LOG_DIR`, then
    /// `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Used when `RUST_LOG` is unset.
    pub default_filter: &'static str,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "linkup",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info",
        }
    }
}

/// Install the global subscriber and return today's log file.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let file_prefix = format!("{}.log", config.app_name);
    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &file_prefix));
    let _ = LOG_GUARD.set(guard);

    let mut layers: Vec<BoxedLayer> = vec![config.format.layer(writer, false)];
    if config.emit_stderr {
        layers.push(config.format.layer(std::io::stderr, true));
    }
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_filter));

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let path = log_file_for(&dir, &file_prefix, Utc::now());
    let _ = LOG_PATH.set(path.clone());
    Ok(path)
}

// rolling::daily stamps file names with the UTC date
fn log_file_for(dir: &Path, file_prefix: &str, now: DateTime<Utc>) -> PathBuf {
    dir.join(format!("{file_prefix}.{}", now.format("%Y-%m-%d")))
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    let configured = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(LOG_DIR_ENV).map(PathBuf::from));
    match (configured, std::env::var_os("HOME")) {
        (Some(dir), home) => match (dir.strip_prefix("~"), home) {
            (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
            _ => dir,
        },
        (None, Some(home)) => PathBuf::from(home).join(".local/share").join(app_name),
        (None, None) => PathBuf::from(app_name),
    }
}
