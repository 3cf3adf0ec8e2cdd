//! Native desktop entry point.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use gpuviz_core::config::AppConfig;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match std::env::var_os("GPUVIZ_CONFIG") {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config {}", path.to_string_lossy()))?;
            AppConfig::from_json(&json)
                .with_context(|| format!("invalid config {}", path.to_string_lossy()))?
        }
        None => AppConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("gpuviz")
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };
    tracing::info!(initial_view = %config.initial_view, "starting gpuviz");
    eframe::run_native(
        "gpuviz",
        options,
        Box::new(move |cc| Ok(Box::new(gpuviz_ui::GpuVizApp::new(cc, &config)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe failed: {e}"))
}

#[cfg(target_arch = "wasm32")]
fn main() {}
