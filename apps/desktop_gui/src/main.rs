use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod config;
mod controller;
mod ui;

use anyhow::anyhow;
use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use lwv_client_core::{
    EngineBridge, HttpBridge, MissingEngineBridge, SessionStore, WorkflowController,
};
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::{commands::BackendCommand, prompt::RfdPrompt, runtime};
use crate::config::{load_config, AppConfig, ConfigOverrides};
use crate::controller::events::UiEvent;
use crate::ui::LwvApp;

#[derive(Debug, Parser)]
#[command(name = "lwv-desktop", about = "Trace width variation viewer")]
struct Args {
    /// Config file; defaults to ./lwv.toml or the per-user config directory.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base URL of the analysis engine.
    #[arg(long)]
    engine_url: Option<String>,
    #[arg(long)]
    min_zoom: Option<f64>,
    #[arg(long)]
    max_zoom: Option<f64>,
    /// Tracing filter used when RUST_LOG is unset.
    #[arg(long)]
    log_filter: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            engine_url: self.engine_url.clone(),
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            log_filter: self.log_filter.clone(),
        }
    }
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn engine_bridge(config: &AppConfig) -> anyhow::Result<Arc<dyn EngineBridge>> {
    match &config.engine_url {
        Some(url) => {
            let bridge = HttpBridge::new(url, RfdPrompt)?;
            tracing::info!(engine = %bridge.base_url(), "using engine");
            Ok(Arc::new(bridge))
        }
        None => {
            tracing::warn!("no engine url configured; engine calls will fail");
            Ok(Arc::new(MissingEngineBridge))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref(), &args.overrides())?;
    init_logging(&config);
    config.validate_zoom_limits();

    let controller = WorkflowController::new(engine_bridge(&config)?, SessionStore::default());

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    runtime::launch(controller.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Line Width Variator")
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([960.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Line Width Variator",
        options,
        Box::new(move |_cc| Ok(Box::new(LwvApp::new(controller, cmd_tx, ui_rx, &config)))),
    )
    .map_err(|err| anyhow!("desktop ui exited with error: {err}"))
}
