use eframe::egui;
use egui::{
    Align2, Color32, FontId, Pos2, Rect, RichText, Sense, Shape, Stroke, TextureHandle, Vec2,
};
use image::DynamicImage;
use std::path::Path;

use crate::config::PANEL_SIZE;
use crate::detector::Detector;
use crate::dialogs;
use crate::display;
use crate::error::DetectError;
use crate::loader;
use crate::shell::{Notice, Session};

const ORIGINAL_PLACEHOLDER: &str = "Original Image Paneli\n(Resim Seçilmedi)";
const TAGGED_PLACEHOLDER: &str = "Tagged Image Paneli\n(Sonuç Burada Görünecek)";

const PANEL_BG: Color32 = Color32::from_rgb(0xe8, 0xe8, 0xe8);
const SELECT_COLOR: Color32 = Color32::from_rgb(0x34, 0x98, 0xdb);
const TEST_COLOR: Color32 = Color32::from_rgb(0x27, 0xae, 0x60);
const SAVE_COLOR: Color32 = Color32::from_rgb(0xe6, 0x7e, 0x22);
const BUTTON_HEIGHT: f32 = 40.0;

pub struct DetectorApp {
    session: Session,
    // None when the model failed to load; the Test button stays disabled then
    detector: Option<Box<dyn Detector>>,
    original: Option<TextureHandle>,
    tagged: Option<TextureHandle>,
    pending: Vec<Notice>,
}

impl DetectorApp {
    pub fn new(detector: Result<Box<dyn Detector>, DetectError>, model_path: &Path) -> Self {
        let mut pending = vec![];
        let detector = match detector {
            Ok(d) => Some(d),
            Err(e) => {
                pending.push(Notice::model_load_failed(model_path, &e));
                None
            }
        };
        Self {
            session: Session::default(),
            detector,
            original: None,
            tagged: None,
            pending,
        }
    }

    fn on_select(&mut self, ctx: &egui::Context) {
        let Some(path) = dialogs::pick_image() else { return };
        if !loader::is_supported(&path) {
            log::info!("{} has no image extension, decoding by content", path.display());
        }
        self.session = std::mem::take(&mut self.session).select(path.clone());
        self.tagged = None;
        match loader::open(&path) {
            Ok(img) => {
                let shown = display::render(&img, PANEL_SIZE);
                let texture = ctx.load_texture("original", shown, egui::TextureOptions::LINEAR);
                self.original = Some(texture);
            }
            Err(e) => {
                log::warn!("cannot display {}: {e}", path.display());
                self.original = None;
                dialogs::show(&Notice::failure(&e));
            }
        }
    }

    fn on_detect(&mut self, ctx: &egui::Context) {
        let (session, notice) =
            std::mem::take(&mut self.session).detect(self.detector.as_deref_mut());
        self.session = session;
        if let Some(annotated) = self.session.annotated() {
            let shown = display::render(&DynamicImage::ImageRgb8(annotated.clone()), PANEL_SIZE);
            self.tagged = Some(ctx.load_texture("tagged", shown, egui::TextureOptions::LINEAR));
        }
        dialogs::show(&notice);
    }

    fn on_save(&mut self) {
        if !self.session.can_save() {
            return;
        }
        let Some(path) = dialogs::pick_save_path() else { return };
        let (session, notice) = std::mem::take(&mut self.session).save(&path);
        self.session = session;
        if let Some(n) = notice {
            dialogs::show(&n);
        }
    }
}

fn image_panel(ui: &mut egui::Ui, texture: Option<&TextureHandle>, placeholder: &str) {
    let size = Vec2::new(PANEL_SIZE[0] as f32, PANEL_SIZE[1] as f32);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, PANEL_BG);
    match texture {
        Some(tex) => {
            let img_rect = Rect::from_center_size(rect.center(), tex.size_vec2());
            let uv = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0));
            painter.image(tex.id(), img_rect, uv, Color32::WHITE);
        }
        None => {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                placeholder,
                FontId::proportional(14.0),
                Color32::from_gray(60),
            );
        }
    }
    // dashed border, inset so the stroke isn't clipped
    let r = rect.shrink(1.0);
    let outline = [r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom(), r.left_top()];
    painter.extend(Shape::dashed_line(&outline, Stroke::new(2.0, Color32::GRAY), 6.0, 4.0));
}

fn action_button(text: &str, fill: Color32) -> impl egui::Widget {
    egui::Button::new(RichText::new(text).size(14.0).color(Color32::WHITE)).fill(fill)
}

impl eframe::App for DetectorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut select = false;
        let mut test = false;
        let mut save = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                image_panel(ui, self.original.as_ref(), ORIGINAL_PLACEHOLDER);
                image_panel(ui, self.tagged.as_ref(), TAGGED_PLACEHOLDER);
            });
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                let w = (ui.available_width() - 2.0 * ui.spacing().item_spacing.x) / 3.0;
                let size = [w, BUTTON_HEIGHT];
                select = ui
                    .add_sized(size, action_button("Select Image (Resim Seç)", SELECT_COLOR))
                    .clicked();
                test = ui
                    .add_enabled_ui(self.detector.is_some(), |ui| {
                        ui.add_sized(size, action_button("Test Image (Tespiti Başlat)", TEST_COLOR))
                    })
                    .inner
                    .clicked();
                save = ui
                    .add_enabled_ui(self.session.can_save(), |ui| {
                        ui.add_sized(size, action_button("Save Image (Kaydet)", SAVE_COLOR))
                    })
                    .inner
                    .clicked();
            });

            ui.add_space(10.0);
            ui.vertical_centered(|ui| {
                let status = RichText::new(self.session.status())
                    .size(16.0)
                    .strong()
                    .color(Color32::from_gray(0x33));
                ui.label(status);
            });
        });

        // actions run after layout so handlers can take the session by value
        if select {
            self.on_select(ctx);
        }
        if test {
            self.on_detect(ctx);
        }
        if save {
            self.on_save();
        }

        for notice in std::mem::take(&mut self.pending) {
            dialogs::show(&notice);
        }
    }
}
