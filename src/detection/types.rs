use anyhow::Result;
use image::RgbImage;

/// Axis-aligned box in frame pixel coordinates.
///
/// `right` and `bottom` are exclusive, so `width = right - left`, saturating
/// at the `i32` range for boxes with extreme coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

/// A single face reported by a detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub score: f64,
}

/// Speed/quality trade-off requested from the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PerformanceMode {
    #[default]
    Fast,
    Accurate,
}

/// Trait for face detection backends
/// Allows swapping the SeetaFace engine for another detector or a test double
pub trait FaceDetector: Send {
    /// Detect faces in a frame
    ///
    /// # Returns
    /// * Detections in the order the backend reports them, possibly empty
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>>;
}

impl<D: FaceDetector + ?Sized> FaceDetector for Box<D> {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>> {
        (**self).detect(frame)
    }
}
