use std::path::PathBuf;

use thiserror::Error;

/// Failures of the detection capability (model load or inference).
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),
    #[error("failed to load model: {0}")]
    ModelLoad(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    #[error("unexpected model output: {0}")]
    Output(String),
}

/// Failures raised by shell handlers before they are turned into dialogs.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("no detection model is loaded")]
    NoModel,
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error("could not write {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
