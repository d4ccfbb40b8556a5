use super::state::SharedState;
use crate::detection::{FaceDetector, FaceLocator};
use crate::estimation::{aggregate, AgeModel, Prediction, Preprocessor};
use image::RgbImage;
use std::sync::Arc;

/// How a single Detect -> Preprocess -> Infer -> Aggregate pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No usable face; face-found was cleared
    NoFace,
    /// A new prediction was published
    Published(Prediction),
    /// The model call failed; previous prediction retained
    InferenceFailed,
    /// The model returned empty or non-finite scores; previous prediction retained
    MalformedOutput,
}

/// One frame's worth of work. Owns the detector, preprocessor and model.
pub struct InferenceCycle<D, M> {
    locator: FaceLocator<D>,
    preprocessor: Preprocessor,
    model: M,
    state: Arc<SharedState>,
}

impl<D: FaceDetector, M: AgeModel> InferenceCycle<D, M> {
    pub fn new(
        locator: FaceLocator<D>,
        preprocessor: Preprocessor,
        model: M,
        state: Arc<SharedState>,
    ) -> Self {
        Self {
            locator,
            preprocessor,
            model,
            state,
        }
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    pub fn run(&mut self, frame: &RgbImage) -> CycleOutcome {
        let _span = tracing::debug_span!("cycle").entered();

        let Some(face) = self.locator.locate(frame) else {
            self.state.publish_face_found(false);
            tracing::debug!("No face found");
            return CycleOutcome::NoFace;
        };
        self.state.publish_face_found(true);

        let tensor = self.preprocessor.preprocess(&face.image);

        let logits = match self.model.infer(&tensor) {
            Ok(logits) => logits,
            Err(e) => {
                tracing::warn!("Inference failed: {:#}", e);
                return CycleOutcome::InferenceFailed;
            }
        };

        let distribution = match aggregate(&logits) {
            Ok(distribution) => distribution,
            Err(e) => {
                tracing::error!("Malformed model output ({} classes): {}", logits.len(), e);
                return CycleOutcome::MalformedOutput;
            }
        };

        let prediction = distribution.prediction();
        tracing::debug!(
            "Age: {} (expected {:.2} over {} classes)",
            prediction.age,
            distribution.expected_age,
            distribution.probabilities.len()
        );

        self.state.publish_prediction(prediction);
        CycleOutcome::Published(prediction)
    }
}
