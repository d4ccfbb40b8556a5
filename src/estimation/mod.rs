mod onnx;
mod preprocess;
pub mod scores;
pub mod types;

pub use onnx::OnnxAgeModel;
pub use preprocess::Preprocessor;
pub use scores::{aggregate, softmax, AgeDistribution};
pub use types::{AgeModel, InputTensor, Logits, Prediction};

use anyhow::Result;
use std::path::Path;

/// Create the default age model (ONNX Runtime)
pub fn create_default_model<P: AsRef<Path>>(
    model_path: P,
    input_size: u32,
) -> Result<Box<dyn AgeModel>> {
    let model = OnnxAgeModel::new(model_path, input_size)?;
    Ok(Box::new(model))
}
