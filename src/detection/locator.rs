use super::types::{BoundingBox, FaceDetector};
use image::{imageops, RgbImage};
use std::panic::{self, AssertUnwindSafe};

/// Face region cut out of a frame, margin included
#[derive(Debug, Clone)]
pub struct FaceCrop {
    /// Crop rectangle in source frame coordinates
    pub region: BoundingBox,
    pub image: RgbImage,
}

/// Finds the first face in a frame and crops it with surrounding context.
///
/// Detector errors are never surfaced: every failure, panics inside the
/// backend included, reads as "no face".
pub struct FaceLocator<D> {
    detector: D,
    margin: f32,
}

impl<D: FaceDetector> FaceLocator<D> {
    pub fn new(detector: D, margin: f32) -> Self {
        Self { detector, margin }
    }

    pub fn locate(&mut self, frame: &RgbImage) -> Option<FaceCrop> {
        let _span = tracing::debug_span!("locate_face").entered();

        let detector = &mut self.detector;
        let detections = match panic::catch_unwind(AssertUnwindSafe(|| detector.detect(frame))) {
            Ok(Ok(detections)) => detections,
            Ok(Err(e)) => {
                tracing::debug!("Face detection failed, treating as no face: {:#}", e);
                return None;
            }
            Err(_) => {
                tracing::warn!("Face detector panicked, treating as no face");
                return None;
            }
        };

        // First detection wins, in backend order
        let face = detections.first()?;
        tracing::debug!(
            "{} face(s) detected, using {:?}",
            detections.len(),
            face.bbox
        );

        let (width, height) = frame.dimensions();
        let region = expand_and_clamp(face.bbox, self.margin, width, height);
        if region.is_empty() {
            tracing::debug!("Face box {:?} lies outside the frame", face.bbox);
            return None;
        }

        let image = imageops::crop_imm(
            frame,
            region.left as u32,
            region.top as u32,
            region.width() as u32,
            region.height() as u32,
        )
        .to_image();

        Some(FaceCrop { region, image })
    }
}

/// Grow `bbox` by `margin` of its own width/height on each side, then clamp
/// it to a `frame_width` x `frame_height` frame.
///
/// Margins are truncated toward zero. The result may be empty when the
/// source box lies entirely outside the frame.
pub fn expand_and_clamp(
    bbox: BoundingBox,
    margin: f32,
    frame_width: u32,
    frame_height: u32,
) -> BoundingBox {
    let margin_w = (bbox.width() as f32 * margin) as i32;
    let margin_h = (bbox.height() as f32 * margin) as i32;

    let max_x = frame_width.min(i32::MAX as u32) as i32;
    let max_y = frame_height.min(i32::MAX as u32) as i32;

    BoundingBox {
        left: bbox.left.saturating_sub(margin_w).clamp(0, max_x),
        top: bbox.top.saturating_sub(margin_h).clamp(0, max_y),
        right: bbox.right.saturating_add(margin_w).clamp(0, max_x),
        bottom: bbox.bottom.saturating_add(margin_h).clamp(0, max_y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Detection;
    use anyhow::{bail, Result};

    struct FixedDetector(Vec<BoundingBox>);

    impl FaceDetector for FixedDetector {
        fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>> {
            Ok(self
                .0
                .iter()
                .map(|&bbox| Detection { bbox, score: 1.0 })
                .collect())
        }
    }

    struct FailingDetector;

    impl FaceDetector for FailingDetector {
        fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>> {
            bail!("detector timed out")
        }
    }

    struct PanickingDetector;

    impl FaceDetector for PanickingDetector {
        fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<Detection>> {
            panic!("backend bug")
        }
    }

    #[test]
    fn margin_without_clamping() {
        let expanded = expand_and_clamp(BoundingBox::new(100, 100, 200, 200), 0.4, 640, 480);
        assert_eq!(expanded, BoundingBox::new(60, 60, 240, 240));
    }

    #[test]
    fn margin_clamped_to_frame() {
        // margin 16 on each side gives (-6, -6, 66, 66) before clamping
        let expanded = expand_and_clamp(BoundingBox::new(10, 10, 50, 50), 0.4, 30, 30);
        assert_eq!(expanded, BoundingBox::new(0, 0, 30, 30));
    }

    #[test]
    fn margin_is_truncated() {
        // 0.4 * 33 = 13.2 and 0.4 * 19 = 7.6, both truncate
        let expanded = expand_and_clamp(BoundingBox::new(100, 100, 133, 119), 0.4, 640, 480);
        assert_eq!(expanded, BoundingBox::new(87, 93, 146, 126));
    }

    #[test]
    fn extreme_box_saturates_instead_of_overflowing() {
        let bbox = BoundingBox::new(-2_000_000_000, 0, 2_000_000_000, 10);
        assert_eq!(bbox.width(), i32::MAX);

        let expanded = expand_and_clamp(bbox, 0.4, 64, 64);
        assert_eq!(expanded, BoundingBox::new(0, 0, 64, 14));
    }

    #[test]
    fn extreme_box_is_cropped_to_frame() {
        let frame = RgbImage::new(64, 64);
        let mut locator = FaceLocator::new(
            FixedDetector(vec![BoundingBox::new(-2_000_000_000, 0, 2_000_000_000, 10)]),
            0.4,
        );

        let crop = locator.locate(&frame).expect("clamped crop");
        assert_eq!(crop.region, BoundingBox::new(0, 0, 64, 14));
        assert_eq!(crop.image.dimensions(), (64, 14));
    }

    #[test]
    fn box_outside_frame_is_empty() {
        let expanded = expand_and_clamp(BoundingBox::new(700, 10, 720, 30), 0.4, 640, 480);
        assert!(expanded.is_empty());
    }

    #[test]
    fn crops_first_detection() {
        let frame = RgbImage::from_fn(640, 480, |x, _| image::Rgb([(x % 256) as u8, 0, 0]));
        let mut locator = FaceLocator::new(
            FixedDetector(vec![
                BoundingBox::new(100, 100, 200, 200),
                BoundingBox::new(300, 300, 320, 320),
            ]),
            0.4,
        );

        let crop = locator.locate(&frame).expect("face should be found");
        assert_eq!(crop.region, BoundingBox::new(60, 60, 240, 240));
        assert_eq!(crop.image.dimensions(), (180, 180));
        assert_eq!(crop.image.get_pixel(0, 0)[0], 60);
    }

    #[test]
    fn no_detections_is_no_face() {
        let frame = RgbImage::new(64, 64);
        let mut locator = FaceLocator::new(FixedDetector(Vec::new()), 0.4);
        assert!(locator.locate(&frame).is_none());
    }

    #[test]
    fn detector_error_is_no_face() {
        let frame = RgbImage::new(64, 64);
        let mut locator = FaceLocator::new(FailingDetector, 0.4);
        assert!(locator.locate(&frame).is_none());
    }

    #[test]
    fn detector_panic_is_no_face() {
        let frame = RgbImage::new(64, 64);
        let mut locator = FaceLocator::new(PanickingDetector, 0.4);
        assert!(locator.locate(&frame).is_none());
    }
}
