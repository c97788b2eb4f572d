//! YOLOv8 detector backed by ONNX Runtime.
//!
//! Expects an Ultralytics ONNX export (`yolo export model=best.pt format=onnx`);
//! class names and input size come from the export's custom metadata.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use ndarray::Array4;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;
use std::collections::HashMap;
use std::path::Path;

use super::{Annotator, BBox, Detection, DetectionOutput, Detector};
use crate::config::{AppConfig, MAX_DETECTIONS};
use crate::error::DetectError;
use crate::loader;

const DEFAULT_IMGSZ: (u32, u32) = (640, 640);
const PAD_VALUE: u8 = 114;

fn load_err(e: impl std::fmt::Display) -> DetectError {
    DetectError::ModelLoad(e.to_string())
}

fn infer_err(e: impl std::fmt::Display) -> DetectError {
    DetectError::Inference(e.to_string())
}

pub struct YoloDetector {
    session: Session,
    input_name: String,
    output_name: String,
    names: HashMap<usize, String>,
    // (height, width)
    imgsz: (u32, u32),
    confidence: f32,
    iou_threshold: f32,
    annotator: Annotator,
}

impl YoloDetector {
    pub fn load(config: &AppConfig) -> Result<Self, DetectError> {
        let path = config.model_path.as_path();
        if !path.exists() {
            return Err(DetectError::ModelNotFound(path.to_path_buf()));
        }
        log::info!("loading model from {}", path.display());

        let session = Session::builder()
            .map_err(load_err)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(load_err)?
            .commit_from_file(path)
            .map_err(load_err)?;

        let (names, imgsz) = {
            let meta = session.metadata().map_err(load_err)?;
            let names = match meta.custom("names") {
                Ok(Some(v)) => parse_names(&v),
                _ => HashMap::new(),
            };
            let imgsz = match meta.custom("imgsz") {
                Ok(Some(v)) => parse_imgsz(&v).unwrap_or(DEFAULT_IMGSZ),
                _ => DEFAULT_IMGSZ,
            };
            (names, imgsz)
        };
        if names.is_empty() {
            log::warn!("model carries no class names, labels fall back to class ids");
        }

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "images".to_owned());
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "output0".to_owned());

        log::info!(
            "model ready: {} classes, input {}x{}",
            names.len(),
            imgsz.1,
            imgsz.0
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            names,
            imgsz,
            confidence: config.confidence,
            iou_threshold: config.iou_threshold,
            annotator: Annotator::new(config.font_path.as_deref()),
        })
    }

    fn label_for(&self, class_id: usize) -> String {
        self.names
            .get(&class_id)
            .cloned()
            .unwrap_or_else(|| format!("class{class_id}"))
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<(Vec<f32>, Vec<usize>), DetectError> {
        let input = input.as_standard_layout();
        let tensor = TensorRef::from_array_view(&input).map_err(infer_err)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(infer_err)?;
        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| DetectError::Output(format!("missing output '{}'", self.output_name)))?;
        let (shape, data) = output.try_extract_tensor::<f32>().map_err(infer_err)?;
        let shape: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        Ok((data.to_vec(), shape))
    }
}

impl Detector for YoloDetector {
    fn detect(&mut self, image_path: &Path) -> Result<DetectionOutput, DetectError> {
        let mut image = loader::open(image_path)?.to_rgb8();
        let (input, lb) = letterbox(&image, self.imgsz);
        let (data, shape) = self.infer(&input)?;

        let candidates = decode(&data, &shape, &lb, image.dimensions(), self.confidence)?;
        let kept = non_max_suppression(candidates, self.iou_threshold, MAX_DETECTIONS);
        let detections: Vec<Detection> = kept
            .into_iter()
            .map(|c| Detection {
                label: self.label_for(c.class_id),
                class_id: c.class_id,
                confidence: c.confidence,
                bbox: c.bbox,
            })
            .collect();
        log::info!("{}: {} detections", image_path.display(), detections.len());

        self.annotator.draw(&mut image, &detections);
        Ok(DetectionOutput { annotated: image, detections })
    }
}

/// Parses Ultralytics' `names` metadata, e.g. `{0: 'USD', 1: 'TL'}`.
pub(crate) fn parse_names(raw: &str) -> HashMap<usize, String> {
    let body = raw.trim().trim_start_matches('{').trim_end_matches('}');
    split_unquoted(body, ',')
        .into_iter()
        .filter_map(|entry| {
            // ids are bare integers, so the first ':' is always the key separator
            let (id, name) = entry.split_once(':')?;
            let id = id.trim().parse::<usize>().ok()?;
            Some((id, unquote(name.trim()).to_owned()))
        })
        .collect()
}

/// Splits on `sep` wherever it is outside a '...' or "..." literal.
fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == sep => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            None => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn unquote(s: &str) -> &str {
    ['\'', '"']
        .iter()
        .find_map(|&q| s.strip_prefix(q)?.strip_suffix(q))
        .unwrap_or(s)
}

/// Parses `imgsz` metadata (`[640, 640]` or `640`) into (height, width).
pub(crate) fn parse_imgsz(raw: &str) -> Option<(u32, u32)> {
    let dims: Vec<u32> = raw
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|d| d.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .ok()?;
    match dims.as_slice() {
        [s] if *s > 0 => Some((*s, *s)),
        [h, w] if *h > 0 && *w > 0 => Some((*h, *w)),
        _ => None,
    }
}

/// Mapping from network input space back to the source image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl Letterbox {
    fn unmap(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Aspect-preserving resize into `target` (h, w), centered on gray padding,
/// returned as a 0..1 NCHW tensor.
pub(crate) fn letterbox(image: &RgbImage, target: (u32, u32)) -> (Array4<f32>, Letterbox) {
    let (th, tw) = target;
    let (w, h) = image.dimensions();
    let scale = (tw as f32 / w as f32).min(th as f32 / h as f32);
    let nw = ((w as f32 * scale).round() as u32).clamp(1, tw);
    let nh = ((h as f32 * scale).round() as u32).clamp(1, th);
    let (px, py) = ((tw - nw) / 2, (th - nh) / 2);

    let resized = imageops::resize(image, nw, nh, FilterType::Triangle);
    let mut canvas = RgbImage::from_pixel(tw, th, Rgb([PAD_VALUE; 3]));
    imageops::overlay(&mut canvas, &resized, px as i64, py as i64);

    let mut tensor = Array4::<f32>::zeros((1, 3, th as usize, tw as usize));
    for (x, y, p) in canvas.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = p[c] as f32 / 255.0;
        }
    }
    (tensor, Letterbox { scale, pad_x: px as f32, pad_y: py as f32 })
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Candidate {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: BBox,
}

/// Decodes a `[1, 4 + nc, anchors]` (or transposed) head into boxes in source pixels.
pub(crate) fn decode(
    data: &[f32],
    shape: &[usize],
    lb: &Letterbox,
    source: (u32, u32),
    confidence: f32,
) -> Result<Vec<Candidate>, DetectError> {
    let [batch, d1, d2] = shape else {
        return Err(DetectError::Output(format!("expected 3 dims, got {shape:?}")));
    };
    if *batch != 1 {
        return Err(DetectError::Output(format!("expected batch of 1, got {batch}")));
    }
    // channels-first unless the anchor axis is the shorter one
    let channels_first = d1 <= d2;
    let (channels, anchors) = if channels_first { (*d1, *d2) } else { (*d2, *d1) };
    if channels <= 4 {
        return Err(DetectError::Output(format!("no class scores in shape {shape:?}")));
    }
    if data.len() < channels * anchors {
        return Err(DetectError::Output(format!(
            "{} values for shape {shape:?}",
            data.len()
        )));
    }
    let at = |c: usize, a: usize| {
        if channels_first { data[c * anchors + a] } else { data[a * channels + c] }
    };

    let (sw, sh) = (source.0 as f32, source.1 as f32);
    let mut out = Vec::new();
    for a in 0..anchors {
        let (class_id, score) = (4..channels)
            .map(|c| (c - 4, at(c, a)))
            .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });
        // strictly above the threshold, as Ultralytics filters
        if score <= confidence {
            continue;
        }
        let (cx, cy, w, h) = (at(0, a), at(1, a), at(2, a), at(3, a));
        let (x1, y1) = lb.unmap(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = lb.unmap(cx + w / 2.0, cy + h / 2.0);
        out.push(Candidate {
            class_id,
            confidence: score,
            bbox: BBox {
                x1: x1.clamp(0.0, sw),
                y1: y1.clamp(0.0, sh),
                x2: x2.clamp(0.0, sw),
                y2: y2.clamp(0.0, sh),
            },
        });
    }
    Ok(out)
}

/// Greedy per-class NMS; result is ordered by descending confidence.
pub(crate) fn non_max_suppression(
    mut candidates: Vec<Candidate>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut kept: Vec<Candidate> = Vec::new();
    for cand in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == cand.class_id && k.bbox.iou(&cand.bbox) > iou_threshold);
        if !suppressed {
            kept.push(cand);
        }
    }
    kept
}
