use anyhow::Result;
use ndarray::Array4;

/// Model input: batch of one RGB image in NCHW layout, shape [1, 3, H, W].
///
/// In standard layout the flat buffer is channel-planar: every red value in
/// row-major pixel order, then every green, then every blue.
pub type InputTensor = Array4<f32>;

/// Raw per-class scores; index `i` is age class `i`
pub type Logits = Vec<f32>;

/// Scalar age estimate published by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub age: u32,
}

/// Trait for age classification models
/// Allows swapping the ONNX backend for another runtime or a test double
pub trait AgeModel: Send {
    /// Run the classifier on one preprocessed face
    ///
    /// # Returns
    /// * One logit per age class, length defined by the model
    fn infer(&mut self, tensor: &InputTensor) -> Result<Logits>;

    /// Get the model's expected input dimensions
    ///
    /// Returns (width, height)
    fn input_size(&self) -> (u32, u32) {
        (224, 224)
    }
}

impl<M: AgeModel + ?Sized> AgeModel for Box<M> {
    fn infer(&mut self, tensor: &InputTensor) -> Result<Logits> {
        (**self).infer(tensor)
    }

    fn input_size(&self) -> (u32, u32) {
        (**self).input_size()
    }
}
