use super::types::{BoundingBox, Detection, FaceDetector, PerformanceMode};
use anyhow::{Context, Result};
use image::{imageops, RgbImage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The model file is read once on construction; each call builds a
/// lightweight detector around a clone of it.
pub struct RustfaceDetector {
    model: rustface::Model,
    mode: PerformanceMode,
}

impl RustfaceDetector {
    pub fn new<P: AsRef<Path>>(model_path: P, mode: PerformanceMode) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading SeetaFace model from {}", path.display());

        let file = File::open(path)
            .with_context(|| format!("Failed to open face model at {}", path.display()))?;
        let model = rustface::read_model(BufReader::new(file))
            .with_context(|| format!("Failed to read face model from {}", path.display()))?;

        tracing::info!("Face detector ready ({:?} mode)", mode);

        Ok(Self { model, mode })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>> {
        let _span = tracing::debug_span!("rustface_detect").entered();

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        match self.mode {
            PerformanceMode::Fast => {
                detector.set_min_face_size(40);
                detector.set_slide_window_step(4, 4);
            }
            PerformanceMode::Accurate => {
                detector.set_min_face_size(20);
                detector.set_slide_window_step(2, 2);
            }
        }

        let gray = imageops::grayscale(frame);
        let (width, height) = gray.dimensions();
        let image = rustface::ImageData::new(gray.as_raw(), width, height);

        let faces = detector.detect(&image);

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                let left = bbox.x();
                let top = bbox.y();
                Detection {
                    bbox: BoundingBox::new(
                        left,
                        top,
                        left + bbox.width() as i32,
                        top + bbox.height() as i32,
                    ),
                    score: face.score(),
                }
            })
            .collect())
    }
}
