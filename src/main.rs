use anyhow::Result;
use clap::Parser;
use eframe::egui;
use std::path::PathBuf;

use para_sayaci::config::{
    DEFAULT_CONFIDENCE, DEFAULT_IOU, DEFAULT_MODEL_PATH, WINDOW_SIZE, WINDOW_TITLE,
};
use para_sayaci::{AppConfig, DetectorApp, Detector, YoloDetector};

#[derive(Parser)]
#[command(name = "para-sayaci")]
#[command(about = "Detect and count banknotes in a picture")]
struct Cli {
    /// ONNX export of the trained YOLO model
    #[arg(long, value_name = "PATH", default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Minimum class score for a detection
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    conf: f32,

    /// IoU above which overlapping boxes of one class are merged
    #[arg(long, default_value_t = DEFAULT_IOU)]
    iou: f32,

    /// TTF/OTF font for box labels (defaults to the built-in UI font)
    #[arg(long, value_name = "PATH")]
    font: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Cli::parse();

    let config = AppConfig::default()
        .with_model_path(args.model)
        .with_thresholds(args.conf, args.iou)
        .with_font_path(args.font);

    // a failed load still opens the window; the app reports it and disables Test
    let detector = YoloDetector::load(&config).map(|d| Box::new(d) as Box<dyn Detector>);
    if let Err(e) = &detector {
        log::error!("model load failed: {e}");
    }
    let app = DetectorApp::new(detector, &config.model_path);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(WINDOW_SIZE),
        ..Default::default()
    };
    eframe::run_native(WINDOW_TITLE, native_options, Box::new(move |cc| {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        Box::new(app)
    }))
    .map_err(|e| anyhow::anyhow!("ui: {e}"))?;

    Ok(())
}
