//! Snapbook 入口：解析命令行、初始化日志、组装端口并驱动 500ms 派发节拍。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sb_app::{CaptureCoordinator, CloseOutcome, CommandDispatcher, DocumentStore};
use sb_core::decision::CaptureMode;
use sb_core::ports::ScratchPort;
use sb_infra::{JsonPackage, ScratchDir, Settings, SettingsStore, StdFilesystem, SystemClock};
use sb_platform::{
    ConsoleDialogs, HeadlessOverlay, LineRouter, StdinTriggerSource, TriggerBridge, XcapCapture,
};

/// Accumulates screen captures into one mergeable document.
#[derive(Debug, Parser)]
#[command(name = "snapbook", version, about)]
struct Cli {
    /// Document to open, created when missing. Bare file names land in the
    /// configured documents directory.
    document: Option<PathBuf>,

    /// Commit captures with a timestamp caption instead of prompting.
    #[arg(long)]
    auto: bool,

    /// Settings file to use instead of the per-user default.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings_store = match &cli.config {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::new(SettingsStore::default_path()),
    };
    let mut settings = settings_store.load_or_init().context("load settings")?;
    if cli.auto {
        settings.capture.mode = CaptureMode::Auto;
    }

    init_logging(&settings.general.log_filter);
    info!(path = %settings_store.path().display(), mode = ?settings.capture.mode, "Settings loaded");

    run(cli, settings)
}

/// `RUST_LOG` wins; the settings file supplies the fallback directive.
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Bare names are a convenience for the common "one notebook" case; any
/// explicit path is taken as-is.
fn resolve_document_path(document: Option<PathBuf>, settings: &Settings) -> PathBuf {
    let raw = document.unwrap_or_else(|| PathBuf::from("snapbook.sbk"));
    let bare = raw.parent().map_or(true, |p| p.as_os_str().is_empty());
    if raw.is_absolute() || !bare {
        return raw;
    }
    settings.document.directory_or_default().join(raw)
}

fn document_title(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Snapbook")
        .to_string()
}

#[tokio::main(flavor = "current_thread")]
async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let router = Arc::new(LineRouter::new());
    let dialogs = Arc::new(ConsoleDialogs::new(router.clone()));
    let scratch = Arc::new(ScratchDir::in_os_temp());
    let clock = Arc::new(SystemClock);

    let mut store = DocumentStore::new(
        Arc::new(JsonPackage::new(settings.document.image_width_hint)),
        Arc::new(StdFilesystem),
        scratch.clone(),
        dialogs.clone(),
        clock.clone(),
    );
    let mut coordinator = CaptureCoordinator::new(
        Arc::new(XcapCapture),
        Arc::new(HeadlessOverlay::new(true)),
        dialogs,
        scratch.clone(),
        clock,
        settings.capture.mode,
    );
    let bridge = Arc::new(TriggerBridge::new(Arc::new(StdinTriggerSource::new(
        router,
    ))));
    let dispatcher = CommandDispatcher::new(bridge.clone());

    let path = resolve_document_path(cli.document, &settings);
    if path.exists() {
        store
            .open(&path)
            .with_context(|| format!("open document {}", path.display()))?;
    } else {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create document directory {}", parent.display()))?;
        }
        store
            .create(&path, &document_title(&path))
            .with_context(|| format!("create document {}", path.display()))?;
    }
    info!(path = %path.display(), "Document ready");
    info!(path = %scratch.root().display(), "Scratch directory ready");

    bridge.register().context("register trigger hook")?;

    let mut tick = tokio::time::interval(Duration::from_millis(500));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = tick.tick() => {
                dispatcher.tick(&mut coordinator, &mut store);
            }
            result = &mut shutdown => {
                result.context("ctrl-c handler")?;
                info!("Shutdown requested");
                break;
            }
        }
    }

    bridge.unregister();
    match store.close(true) {
        Ok(CloseOutcome::Saved) => info!("Document saved on close"),
        Ok(CloseOutcome::Clean) => info!("Document closed"),
        Ok(CloseOutcome::Discarded) => warn!("Unsaved changes discarded on close"),
        Ok(CloseOutcome::KeptOpen) => warn!("Close cancelled; exiting with unsaved changes"),
        Err(err) => warn!(%err, "Close failed; unsaved content may be lost"),
    }
    info!(
        captures = coordinator.session_captures(),
        "Session finished"
    );
    scratch.purge();
    Ok(())
}
