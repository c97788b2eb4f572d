use std::path::PathBuf;

pub const WINDOW_TITLE: &str = "YOLOv8 Nesne Tespiti - USD/TL Sayacı";
pub const WINDOW_SIZE: [f32; 2] = [1200.0, 700.0];
// fixed footprint of each image panel
pub const PANEL_SIZE: [usize; 2] = [550, 500];
pub const DEFAULT_SAVE_NAME: &str = "sonuc.jpg";

pub const DEFAULT_MODEL_PATH: &str = "best.onnx";
pub const DEFAULT_CONFIDENCE: f32 = 0.25;
pub const DEFAULT_IOU: f32 = 0.7;
pub const MAX_DETECTIONS: usize = 300;

/// Runtime settings; every field has a default so the app runs with no arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub confidence: f32,
    pub iou_threshold: f32,
    pub font_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            confidence: DEFAULT_CONFIDENCE,
            iou_threshold: DEFAULT_IOU,
            font_path: None,
        }
    }
}

impl AppConfig {
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    // thresholds outside 0..=1 make no sense for sigmoid scores / IoU
    pub fn with_thresholds(mut self, confidence: f32, iou_threshold: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self.iou_threshold = iou_threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_font_path(mut self, path: Option<PathBuf>) -> Self {
        self.font_path = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_behavior() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.model_path, PathBuf::from("best.onnx"));
        assert_eq!(cfg.confidence, 0.25);
        assert_eq!(cfg.iou_threshold, 0.7);
        assert!(cfg.font_path.is_none());
    }

    #[test]
    fn thresholds_are_clamped() {
        let cfg = AppConfig::default().with_thresholds(1.5, -0.2);
        assert_eq!(cfg.confidence, 1.0);
        assert_eq!(cfg.iou_threshold, 0.0);
    }
}
