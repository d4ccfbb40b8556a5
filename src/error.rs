use thiserror::Error;

/// Contract violations in the estimation core.
///
/// These indicate a broken model or pipeline contract rather than a
/// transient runtime condition, so they are reported loudly.
#[derive(Debug, Error, PartialEq)]
pub enum EstimateError {
    #[error("model produced an empty logit vector")]
    EmptyLogits,

    #[error("softmax produced a non-finite probability at class {index}")]
    NonFiniteProbability { index: usize },

    #[error("expected input tensor of shape {expected:?}, got {actual:?}")]
    TensorShape {
        expected: [usize; 4],
        actual: Vec<usize>,
    },

    #[error("margin must be a finite, non-negative fraction, got {0}")]
    InvalidMargin(f32),

    #[error("model input size must be > 0")]
    InvalidInputSize,
}
