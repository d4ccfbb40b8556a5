mod locator;
mod rustface_backend;
pub mod types;

pub use locator::{expand_and_clamp, FaceCrop, FaceLocator};
pub use rustface_backend::RustfaceDetector;
pub use types::{BoundingBox, Detection, FaceDetector, PerformanceMode};

use anyhow::Result;
use std::path::Path;

/// Create the default face detector (SeetaFace)
pub fn create_default_detector<P: AsRef<Path>>(
    model_path: P,
    mode: PerformanceMode,
) -> Result<Box<dyn FaceDetector>> {
    let detector = RustfaceDetector::new(model_path, mode)?;
    Ok(Box::new(detector))
}
