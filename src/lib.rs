//! Live age estimation: find a face in a camera frame, crop it with
//! context, run it through an age classifier and publish the expected age.

pub mod capture;
pub mod config;
pub mod detection;
pub mod error;
pub mod estimation;
pub mod output;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::EstimateError;
