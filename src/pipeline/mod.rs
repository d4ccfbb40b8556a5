mod clock;
mod controller;
mod cycle;
mod gate;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{Admission, PipelineController};
pub use cycle::{CycleOutcome, InferenceCycle};
pub use gate::ThrottleGate;
pub use state::{PublishedState, SharedState};

use crate::config::PipelineConfig;
use crate::detection::{FaceDetector, FaceLocator};
use crate::estimation::{AgeModel, Preprocessor};
use anyhow::Result;
use std::sync::Arc;

/// Wire a detector and a model into a cycle using `config`
pub fn build_cycle<D, M>(detector: D, model: M, config: &PipelineConfig) -> Result<InferenceCycle<D, M>>
where
    D: FaceDetector,
    M: AgeModel,
{
    config.validate()?;

    let locator = FaceLocator::new(detector, config.margin);
    let preprocessor = Preprocessor::new(config.input_size, config.input_size, config.resize_filter);

    if model.input_size() != preprocessor.target_size() {
        tracing::warn!(
            "Model expects {:?} input but preprocessor produces {:?}",
            model.input_size(),
            preprocessor.target_size()
        );
    }

    Ok(InferenceCycle::new(
        locator,
        preprocessor,
        model,
        Arc::new(SharedState::new()),
    ))
}
