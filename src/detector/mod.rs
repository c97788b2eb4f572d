pub mod annotate;
pub mod yolo;

use image::RgbImage;
use std::path::Path;

use crate::error::DetectError;

pub use annotate::Annotator;
pub use yolo::YoloDetector;

/// Axis-aligned box in original image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn iou(&self, other: &BBox) -> f32 {
        let ix = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let iy = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let inter = ix * iy;
        let union = self.area() + other.area() - inter;
        if union <= 0.0 { 0.0 } else { inter / union }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub label: String,
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: BBox,
}

/// What one detection request hands back to the shell.
#[derive(Clone, Debug)]
pub struct DetectionOutput {
    pub annotated: RgbImage,
    pub detections: Vec<Detection>,
}

impl DetectionOutput {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.detections.iter().map(|d| d.label.as_str())
    }
}

/// The model capability the shell depends on. Blocking; callers guard against
/// missing input.
pub trait Detector {
    fn detect(&mut self, image_path: &Path) -> Result<DetectionOutput, DetectError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bb(x1: f32, y1: f32, x2: f32, y2: f32) -> BBox {
        BBox { x1, y1, x2, y2 }
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = bb(10.0, 10.0, 20.0, 30.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        assert_eq!(bb(0.0, 0.0, 1.0, 1.0).iou(&bb(2.0, 2.0, 3.0, 3.0)), 0.0);
    }

    #[test]
    fn iou_half_overlap() {
        // 10x10 boxes shifted by 5 -> inter 50, union 150
        let v = bb(0.0, 0.0, 10.0, 10.0).iou(&bb(5.0, 0.0, 15.0, 10.0));
        assert!((v - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_box_has_no_area() {
        let b = bb(5.0, 5.0, 4.0, 9.0);
        assert_eq!(b.width(), 0.0);
        assert_eq!(b.area(), 0.0);
        assert_eq!(b.iou(&b), 0.0);
    }
}
