mod still_image;
mod v4l_capture;

pub use still_image::StillImageSource;
pub use v4l_capture::WebcamCapture;

use anyhow::Result;
use image::RgbImage;

/// Trait for frame sources
pub trait CaptureSource {
    /// Capture a single frame
    ///
    /// The returned image owns its pixels; any device buffer behind it has
    /// already been handed back to the source.
    fn capture_frame(&mut self) -> Result<RgbImage>;

    /// Get the resolution of captured frames
    fn resolution(&self) -> (u32, u32);
}
