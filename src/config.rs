use crate::detection::PerformanceMode;
use crate::error::EstimateError;
use image::imageops::FilterType;
use std::time::Duration;

/// Minimum time between two processed frames (about 4 frames per second).
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(250);

/// Context added around a detected face, as a fraction of the box size per side.
pub const DEFAULT_MARGIN: f32 = 0.4;

/// Side length of the square model input.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Tunables for the frame-to-age pipeline
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub min_interval: Duration,
    pub margin: f32,
    pub input_size: u32,
    pub resize_filter: FilterType,
    pub detector_mode: PerformanceMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            margin: DEFAULT_MARGIN,
            input_size: DEFAULT_INPUT_SIZE,
            // Bilinear, the filter used by platform bitmap scaling
            resize_filter: FilterType::Triangle,
            detector_mode: PerformanceMode::Fast,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), EstimateError> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(EstimateError::InvalidMargin(self.margin));
        }
        if self.input_size == 0 {
            return Err(EstimateError::InvalidInputSize);
        }
        Ok(())
    }
}
