mod app;
mod config;
mod domain;
mod infra;
mod ui;
mod usecase;

#[cfg(test)]
mod tests;

use app::{App, AppServices};
use config::{ensure_webview_data_dir, load_config};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run() {
        tracing::error!(error = %err, "failed to start");
        eprintln!("steward: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = load_config()?;
    let webview_data_dir = ensure_webview_data_dir(&config.data_dir)?;
    let services = AppServices::from_config(&config)?;

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("Steward"))
                .with_data_directory(webview_data_dir),
        )
        .with_context(services)
        .launch(App);
    Ok(())
}
