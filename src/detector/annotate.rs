use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::Path;

use super::Detection;

// Ultralytics default palette, indexed by class id
const PALETTE: [[u8; 3]; 20] = [
    [0xFF, 0x38, 0x38], [0xFF, 0x9D, 0x97], [0xFF, 0x70, 0x1F], [0xFF, 0xB2, 0x1D],
    [0xCF, 0xD2, 0x31], [0x48, 0xF9, 0x0A], [0x92, 0xCC, 0x17], [0x3D, 0xDB, 0x86],
    [0x1A, 0x93, 0x34], [0x00, 0xD4, 0xBB], [0x2C, 0x99, 0xA8], [0x00, 0xC2, 0xFF],
    [0x34, 0x45, 0x93], [0x64, 0x73, 0xFF], [0x00, 0x18, 0xEC], [0x84, 0x38, 0xFF],
    [0x52, 0x00, 0x85], [0xCB, 0x38, 0xFF], [0xFF, 0x95, 0xC8], [0xFF, 0x37, 0xC7],
];

pub fn class_color(class_id: usize) -> Rgb<u8> {
    Rgb(PALETTE[class_id % PALETTE.len()])
}

fn text_color(bg: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b] = bg.0;
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 160.0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
}

fn line_width(image: &RgbImage) -> u32 {
    let mean_side = (image.width() + image.height()) as f32 / 2.0;
    ((mean_side * 0.003).round() as u32).max(2)
}

fn font_scale(image: &RgbImage) -> PxScale {
    let mean_side = (image.width() + image.height()) as f32 / 2.0;
    PxScale::from((mean_side * 0.035).round().max(12.0))
}

/// Burns boxes and `label conf` tabs into an image.
pub struct Annotator {
    font: Option<FontVec>,
}

impl Annotator {
    /// Uses the font at `font_path` if given, else egui's bundled proportional face.
    /// Without any usable font only the boxes are drawn.
    pub fn new(font_path: Option<&Path>) -> Self {
        let font = match font_path {
            Some(p) => match std::fs::read(p).map_err(|e| e.to_string()).and_then(|bytes| {
                FontVec::try_from_vec(bytes).map_err(|e| e.to_string())
            }) {
                Ok(f) => Some(f),
                Err(e) => {
                    log::warn!(
                        "label font {} unusable ({e}), falling back to built-in",
                        p.display()
                    );
                    Self::bundled_font()
                }
            },
            None => Self::bundled_font(),
        };
        if font.is_none() {
            log::warn!("no label font available, drawing boxes only");
        }
        Self { font }
    }

    pub fn without_labels() -> Self {
        Self { font: None }
    }

    fn bundled_font() -> Option<FontVec> {
        let mut defs = egui::FontDefinitions::default();
        let data = defs.font_data.remove("Ubuntu-Light")?;
        FontVec::try_from_vec(data.font.into_owned()).ok()
    }

    pub fn has_labels(&self) -> bool {
        self.font.is_some()
    }

    pub fn draw(&self, image: &mut RgbImage, detections: &[Detection]) {
        let (iw, ih) = image.dimensions();
        if iw == 0 || ih == 0 {
            return;
        }
        let lw = line_width(image);
        let scale = font_scale(image);

        for det in detections {
            let color = class_color(det.class_id);
            let x1 = (det.bbox.x1.max(0.0) as u32).min(iw - 1);
            let y1 = (det.bbox.y1.max(0.0) as u32).min(ih - 1);
            let x2 = (det.bbox.x2.max(0.0) as u32).clamp(x1 + 1, iw);
            let y2 = (det.bbox.y2.max(0.0) as u32).clamp(y1 + 1, ih);

            // thick outline as nested one-pixel rectangles
            for i in 0..lw {
                let (w, h) = ((x2 - x1).saturating_sub(2 * i), (y2 - y1).saturating_sub(2 * i));
                if w == 0 || h == 0 {
                    break;
                }
                let r = Rect::at((x1 + i) as i32, (y1 + i) as i32).of_size(w, h);
                draw_hollow_rect_mut(image, r, color);
            }

            let Some(font) = &self.font else { continue };
            let text = format!("{} {:.2}", det.label, det.confidence);
            let (tw, th) = text_size(scale, font, &text);
            let pad = lw;
            let (tab_w, tab_h) = (tw + 2 * pad, th + 2 * pad);
            // above the box, or inside it when there's no room
            let ty = if y1 >= tab_h { y1 - tab_h } else { y1 };
            let tab = Rect::at(x1 as i32, ty as i32).of_size(tab_w, tab_h);
            draw_filled_rect_mut(image, tab, color);
            draw_text_mut(
                image,
                text_color(color),
                (x1 + pad) as i32,
                (ty + pad) as i32,
                scale,
                font,
                &text,
            );
        }
    }
}
