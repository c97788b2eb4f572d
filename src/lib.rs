pub mod app;
pub mod config;
pub mod detector;
pub mod dialogs;
pub mod display;
pub mod error;
pub mod loader;
pub mod shell;
pub mod tally;

pub use app::DetectorApp;
pub use config::AppConfig;
pub use detector::{Detection, DetectionOutput, Detector, YoloDetector};
pub use error::{DetectError, ShellError};
pub use shell::{Notice, NoticeLevel, Session, Stage};
pub use tally::Tally;
