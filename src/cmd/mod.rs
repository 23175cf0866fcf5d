use std::{path::Path, str::FromStr};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::LevelFilter;
use logforth::{
    append::{
        self,
        rolling_file::{self, RollingFile, RollingFileWriter, Rotation},
    },
    non_blocking::WorkerGuard,
};

mod monitor;
pub use monitor::*;
mod notify;
pub use notify::*;

use crate::{conf, get_env_or_default};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dry notification mode
    #[arg(short = 'd', long, default_value_t = get_env_or_default("MONLITE_DRY", "false") == "true")]
    dry_notify: bool,

    /// Configuration file
    #[arg(short = 'f', long = "config", default_value_t = get_env_or_default("MONLITE_CONFIG", "monlite.yaml"))]
    yaml_file: String,

    /// Log level for stderr, overrides the configuration file
    #[arg(short = 'v', long)]
    level: Option<String>,

    /// File to log to, overrides the configuration file
    #[arg(short = 'l', long)]
    log: Option<String>,

    /// Show JSON schema
    #[arg(short = 'j', long, default_value_t = false)]
    json_schema: bool,
}

fn parse_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level).map_err(|_| anyhow!("invalid log level {}", level))
}

fn file_writer(file: &str) -> Result<RollingFileWriter> {
    let path = Path::new(file);
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let prefix = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("invalid log file {}", file))?;
    let suffix = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
    RollingFileWriter::builder()
        .rotation(Rotation::Daily)
        .filename_prefix(prefix)
        .filename_suffix(suffix)
        .build(dir)
        .with_context(|| format!("failed to open log file {}", file))
}

// The returned guard flushes the file appender when dropped.
fn setup_logging(log: &conf::LogSettings) -> Result<Option<WorkerGuard>> {
    let level = parse_level(&log.level)?;
    let mut builder =
        logforth::builder().dispatch(|d| d.filter(level).append(append::Stderr::default()));

    let mut guard = None;
    if let Some(file) = log.file.as_deref().filter(|f| !f.is_empty()) {
        let file_level = parse_level(log.file_level.as_deref().unwrap_or(&log.level))?;
        let (writer, g) = rolling_file::non_blocking(file_writer(file)?).finish();
        builder = builder.dispatch(|d| d.filter(file_level).append(RollingFile::new(writer)));
        guard = Some(g);
    }
    builder.apply();
    Ok(guard)
}

async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;
    Ok(())
}

pub async fn start() -> Result<()> {
    let args = Args::parse();
    if args.json_schema {
        println!("{}", conf::json_schema()?);
        return Ok(());
    }

    let mut c = conf::Conf::load(&args.yaml_file)?;
    if let Some(level) = args.level {
        c.settings.log.level = level;
    }
    if let Some(file) = args.log {
        c.settings.log.file = Some(file);
    }
    let _guard = setup_logging(&c.settings.log)?;

    log::info!("Starting {}...", c.settings.name);

    c.settings.notify.dry = c.settings.notify.dry || args.dry_notify;
    let registry = config_notifiers(std::mem::take(&mut c.notify), &c.settings.notify)?;
    let mut fleet = build_fleet(&c, &registry)?;
    if fleet.is_empty() {
        log::warn!("No monitor configured in {}", args.yaml_file);
    }

    fleet.start().await?;
    log::info!("Monitors ok!");

    wait_for_signal().await?;

    log::info!("Stop monitors...");
    fleet.stop().await?;
    log::info!("End.");
    Ok(())
}
