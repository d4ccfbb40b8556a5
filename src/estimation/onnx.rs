use super::types::{AgeModel, InputTensor, Logits};
use crate::error::EstimateError;
use anyhow::{Context, Result};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

/// Age classifier exported to ONNX
///
/// Expects a [1, 3, 224, 224] float input of raw 0-255 pixel values and
/// emits one logit per age class.
pub struct OnnxAgeModel {
    session: Session,
    width: u32,
    height: u32,
}

impl OnnxAgeModel {
    /// Load the model once; the session is reused for every inference
    pub fn new<P: AsRef<Path>>(model_path: P, input_size: u32) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading age model from {}", path.display());

        let builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?;

        #[cfg(feature = "cuda")]
        let builder = builder
            .with_execution_providers([
                ort::execution_providers::CUDAExecutionProvider::default().build()
            ])
            .context("Failed to register CUDA execution provider")?;

        #[cfg(feature = "tensorrt")]
        let builder = builder
            .with_execution_providers([
                ort::execution_providers::TensorRTExecutionProvider::default().build()
            ])
            .context("Failed to register TensorRT execution provider")?;

        let session = builder
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        tracing::info!("Age model loaded successfully");

        Ok(Self {
            session,
            width: input_size,
            height: input_size,
        })
    }
}

impl AgeModel for OnnxAgeModel {
    fn infer(&mut self, tensor: &InputTensor) -> Result<Logits> {
        let _span = tracing::debug_span!("inference").entered();

        let expected = [1, 3, self.height as usize, self.width as usize];
        if tensor.shape() != &expected[..] {
            return Err(EstimateError::TensorShape {
                expected,
                actual: tensor.shape().to_vec(),
            }
            .into());
        }

        let data = planar_buffer(tensor);
        let input = Tensor::from_array((expected, data.into_boxed_slice()))
            .context("Failed to create input tensor")?;

        let outputs = self
            .session
            .run(ort::inputs![input])
            .context("Failed to run inference")?;

        let (_name, logits) = outputs
            .iter()
            .next()
            .context("Age model produced no outputs")?;
        let (_shape, data) = logits
            .try_extract_tensor::<f32>()
            .context("Failed to extract logits")?;

        Ok(data.to_vec())
    }

    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Flat channel-planar copy of `tensor`, in logical NCHW order
fn planar_buffer(tensor: &InputTensor) -> Vec<f32> {
    // Standard layout is already the channel-planar buffer
    tensor
        .as_slice()
        .map(<[f32]>::to_vec)
        .unwrap_or_else(|| tensor.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array4, ShapeBuilder};

    #[test]
    fn standard_layout_is_copied_as_is() {
        let tensor = Array4::from_shape_fn((1, 3, 2, 2), |(_, c, y, x)| (c * 100 + y * 10 + x) as f32);
        assert_eq!(
            planar_buffer(&tensor),
            vec![0.0, 1.0, 10.0, 11.0, 100.0, 101.0, 110.0, 111.0, 200.0, 201.0, 210.0, 211.0]
        );
    }

    #[test]
    fn other_layouts_are_reordered() {
        let standard = Array4::from_shape_fn((1, 3, 2, 2), |(_, c, y, x)| (c * 100 + y * 10 + x) as f32);
        let mut fortran = Array4::<f32>::zeros((1, 3, 2, 2).f());
        fortran.assign(&standard);
        assert!(fortran.as_slice().is_none());

        assert_eq!(planar_buffer(&fortran), planar_buffer(&standard));
    }
}
