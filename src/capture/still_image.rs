use super::CaptureSource;
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::Path;

/// Replays one image file as an endless stream of identical frames
pub struct StillImageSource {
    image: RgbImage,
}

impl StillImageSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Using still image {} as frame source", path.display());

        let image = image::open(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?
            .to_rgb8();

        Ok(Self::from_image(image))
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }
}

impl CaptureSource for StillImageSource {
    fn capture_frame(&mut self) -> Result<RgbImage> {
        Ok(self.image.clone())
    }

    fn resolution(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_the_same_frame() {
        let image = RgbImage::from_fn(8, 4, |x, y| image::Rgb([x as u8, y as u8, 9]));
        let mut source = StillImageSource::from_image(image.clone());

        assert_eq!(source.resolution(), (8, 4));
        assert_eq!(source.capture_frame().unwrap(), image);
        assert_eq!(source.capture_frame().unwrap(), image);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(StillImageSource::open("/nonexistent/face.png").is_err());
    }
}
