use super::types::InputTensor;
use image::{imageops, RgbImage};
use ndarray::Array4;

/// Preprocessor for converting face crops to model input tensors
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
    filter: imageops::FilterType,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32, filter: imageops::FilterType) -> Self {
        Self {
            target_width,
            target_height,
            filter,
        }
    }

    pub fn target_size(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    /// Preprocess an RGB image into an NCHW tensor
    ///
    /// Steps:
    /// 1. Resize to target dimensions
    /// 2. Write each channel as its own plane, pixels in row-major order
    ///
    /// Values stay raw 0-255 intensities; the age model was exported
    /// without input normalization.
    ///
    /// Returns: Array4<f32> with shape [1, 3, height, width]
    pub fn preprocess(&self, image: &RgbImage) -> InputTensor {
        let _span = tracing::debug_span!("preprocess").entered();

        // Resize if needed
        let resized;
        let source = if image.dimensions() != (self.target_width, self.target_height) {
            resized = imageops::resize(image, self.target_width, self.target_height, self.filter);
            &resized
        } else {
            image
        };

        let (width, height) = source.dimensions();
        let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

        for (x, y, pixel) in source.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            tensor[[0, 0, y, x]] = pixel[0] as f32;
            tensor[[0, 1, y, x]] = pixel[1] as f32;
            tensor[[0, 2, y, x]] = pixel[2] as f32;
        }

        tensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn preprocessor() -> Preprocessor {
        Preprocessor::new(224, 224, imageops::FilterType::Triangle)
    }

    #[test]
    fn black_image_gives_zero_tensor() {
        let tensor = preprocessor().preprocess(&RgbImage::new(224, 224));
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
        assert_eq!(tensor.len(), 150_528);
        assert!(tensor.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn layout_is_channel_planar() {
        let image = RgbImage::from_fn(224, 224, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 200])
        });
        let tensor = preprocessor().preprocess(&image);
        let flat = tensor.as_slice().expect("standard layout");
        let plane = 224 * 224;

        // pixel (x=5, y=7)
        let offset = 7 * 224 + 5;
        assert_eq!(flat[offset], 5.0);
        assert_eq!(flat[plane + offset], 7.0);
        assert_eq!(flat[2 * plane + offset], 200.0);

        // last pixel of each plane
        assert_eq!(flat[plane - 1], 223.0);
        assert_eq!(flat[2 * plane - 1], 223.0);
        assert_eq!(flat[3 * plane - 1], 200.0);
    }

    #[test]
    fn values_are_not_rescaled() {
        let image = RgbImage::from_pixel(224, 224, Rgb([255, 128, 1]));
        let tensor = preprocessor().preprocess(&image);
        assert_eq!(tensor[[0, 0, 100, 100]], 255.0);
        assert_eq!(tensor[[0, 1, 100, 100]], 128.0);
        assert_eq!(tensor[[0, 2, 100, 100]], 1.0);
    }

    #[test]
    fn resizes_arbitrary_input() {
        let image = RgbImage::from_pixel(97, 341, Rgb([40, 80, 120]));
        let tensor = preprocessor().preprocess(&image);
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
        // a uniform image stays uniform under interpolation
        assert!(tensor.iter().all(|&v| v == 40.0 || v == 80.0 || v == 120.0));
    }

    #[test]
    fn deterministic_for_same_input() {
        let image = RgbImage::from_fn(150, 90, |x, y| Rgb([x as u8, y as u8, (x ^ y) as u8]));
        let p = preprocessor();
        assert_eq!(p.preprocess(&image), p.preprocess(&image));
    }
}
