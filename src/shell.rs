//! Session state and the handlers behind the three buttons.
//!
//! Handlers consume the current [`Session`] and hand back the next one together
//! with the notice the UI should show. Failures are only turned into notices
//! here; everything below returns `Result`.

use image::RgbImage;
use std::path::{Path, PathBuf};

use crate::detector::{DetectionOutput, Detector};
use crate::error::ShellError;
use crate::loader;
use crate::tally::Tally;

pub const STATUS_IDLE: &str = "Sonuçlar: Henüz işlem yapılmadı.";
pub const STATUS_LOADED: &str = "Sonuçlar: Resim yüklendi, tespiti başlatabilirsiniz.";

const TITLE_ERROR: &str = "Hata";
const TITLE_WARNING: &str = "Uyarı";
const TITLE_DONE: &str = "İşlem Tamam";
const TITLE_SAVED: &str = "Başarılı";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    NoImage,
    ImageSelected,
    Detected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for a modal dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, title: title.into(), message: message.into() }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, title: title.into(), message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, title: TITLE_ERROR.into(), message: message.into() }
    }

    pub fn failure(err: &dyn std::error::Error) -> Self {
        Self::error(format!("İşlem sırasında hata oluştu!\nHata: {err}"))
    }

    pub fn model_load_failed(model_path: &Path, err: &dyn std::error::Error) -> Self {
        Self::error(format!(
            "Model yüklenirken hata oluştu!\n'{}' dosyasının bu klasörde olduğundan emin olun.\nHata: {err}",
            model_path.display()
        ))
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    image_path: Option<PathBuf>,
    annotated: Option<RgbImage>,
    tally: Option<Tally>,
    status: String,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            image_path: None,
            annotated: None,
            tally: None,
            status: STATUS_IDLE.to_owned(),
        }
    }
}

impl Session {
    pub fn stage(&self) -> Stage {
        match (&self.image_path, &self.annotated) {
            (None, _) => Stage::NoImage,
            (Some(_), None) => Stage::ImageSelected,
            (Some(_), Some(_)) => Stage::Detected,
        }
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    pub fn annotated(&self) -> Option<&RgbImage> {
        self.annotated.as_ref()
    }

    pub fn tally(&self) -> Option<&Tally> {
        self.tally.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    // save is offered exactly when there is something to save
    pub fn can_save(&self) -> bool {
        self.annotated.is_some()
    }

    /// Any state -> ImageSelected; drops the previous result.
    pub fn select(self, path: PathBuf) -> Self {
        log::info!("selected {}", path.display());
        Self {
            image_path: Some(path),
            annotated: None,
            tally: None,
            status: STATUS_LOADED.to_owned(),
        }
    }

    /// ImageSelected/Detected -> Detected. Without an image this only warns and
    /// never touches the detector.
    pub fn detect<D>(self, detector: Option<&mut D>) -> (Self, Notice)
    where
        D: Detector + ?Sized,
    {
        let Some(path) = self.image_path.clone() else {
            log::warn!("detection requested with no image selected");
            return (self, Notice::warning(TITLE_WARNING, "Lütfen önce bir resim seçin!"));
        };

        match run_detection(&path, detector) {
            Ok(output) => {
                let tally = Tally::aggregate(output.labels());
                let status = tally.status_line();
                log::info!("{} objects, {} classes", tally.total(), tally.len());
                let notice =
                    Notice::info(TITLE_DONE, format!("Nesne tespiti tamamlandı!\n{status}"));
                let next = Self {
                    image_path: Some(path),
                    annotated: Some(output.annotated),
                    tally: Some(tally),
                    status,
                };
                (next, notice)
            }
            Err(e) => {
                log::error!("detection on {} failed: {e}", path.display());
                (self, Notice::failure(&e))
            }
        }
    }

    /// Writes the annotated image. A no-op (no notice) when nothing was detected yet.
    pub fn save(self, path: &Path) -> (Self, Option<Notice>) {
        let Some(annotated) = &self.annotated else {
            return (self, None);
        };
        let result = write_annotated(annotated, path);
        match result {
            Ok(written) => {
                log::info!("saved {}", written.display());
                (self, Some(Notice::info(TITLE_SAVED, "Görüntü başarıyla kaydedildi.")))
            }
            Err(e) => {
                log::error!("{e}");
                (self, Some(Notice::failure(&e)))
            }
        }
    }
}

fn run_detection<D>(path: &Path, detector: Option<&mut D>) -> Result<DetectionOutput, ShellError>
where
    D: Detector + ?Sized,
{
    let detector = detector.ok_or(ShellError::NoModel)?;
    Ok(detector.detect(path)?)
}

fn write_annotated(image: &RgbImage, path: &Path) -> Result<PathBuf, ShellError> {
    let path = loader::output_path(path);
    loader::save(image, &path).map_err(|source| ShellError::Save { path: path.clone(), source })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{BBox, Detection};
    use crate::error::DetectError;

    struct Fixed(Vec<&'static str>);

    impl Detector for Fixed {
        fn detect(&mut self, _: &Path) -> Result<DetectionOutput, DetectError> {
            let detections = self
                .0
                .iter()
                .map(|l| Detection {
                    label: l.to_string(),
                    class_id: 0,
                    confidence: 0.9,
                    bbox: BBox { x1: 0.0, y1: 0.0, x2: 1.0, y2: 1.0 },
                })
                .collect();
            Ok(DetectionOutput { annotated: RgbImage::new(4, 4), detections })
        }
    }

    #[test]
    fn starts_empty() {
        let s = Session::default();
        assert_eq!(s.stage(), Stage::NoImage);
        assert!(!s.can_save());
        assert_eq!(s.status(), STATUS_IDLE);
    }

    #[test]
    fn detect_then_reselect_disables_save() {
        let mut det = Fixed(vec!["USD", "TL", "USD"]);
        let (s, notice) = Session::default()
            .select(PathBuf::from("a.jpg"))
            .detect(Some(&mut det));
        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(s.stage(), Stage::Detected);
        assert!(s.can_save());
        assert_eq!(s.status(), "TESPİT SONUÇLARI:  [USD: 2 adet]   [TL: 1 adet]   ");

        let s = s.select(PathBuf::from("b.jpg"));
        assert_eq!(s.stage(), Stage::ImageSelected);
        assert!(!s.can_save());
        assert!(s.tally().is_none());
        assert_eq!(s.image_path(), Some(Path::new("b.jpg")));
    }

    #[test]
    fn detect_without_model_is_an_error() {
        let (s, notice) = Session::default()
            .select(PathBuf::from("a.jpg"))
            .detect(None::<&mut dyn Detector>);
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(s.stage(), Stage::ImageSelected);
    }

    #[test]
    fn save_without_result_is_silent() {
        let (s, notice) = Session::default().save(Path::new("x.jpg"));
        assert!(notice.is_none());
        assert_eq!(s.stage(), Stage::NoImage);
    }

    #[test]
    fn model_load_message_names_the_file() {
        let err = DetectError::ModelNotFound(PathBuf::from("best.onnx"));
        let n = Notice::model_load_failed(Path::new("best.onnx"), &err);
        assert_eq!(n.title, "Hata");
        assert!(n.message.contains("'best.onnx' dosyasının"));
        assert!(n.message.ends_with("model file not found: best.onnx"));
    }
}
