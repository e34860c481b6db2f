//! Strataview — 3-D squarified-treemap disk space analyser.
//!
//! Thin binary entry point. All logic lives in the `strataview-core` and
//! `strataview-gui` crates.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Strataview starting");

    let icon = strataview_gui::icon::generate_icon(64);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("Strataview -- 3-D Disk Space Analyser")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 500.0])
            .with_icon(icon),
        ..Default::default()
    };

    eframe::run_native(
        "Strataview",
        options,
        Box::new(|cc| Ok(Box::new(strataview_gui::StrataviewApp::new(cc)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    Ok(())
}
