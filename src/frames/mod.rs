//! Frame-level capabilities behind the engine's [`PageProbe`](crate::align::PageProbe).
//!
//! - `normalize`: map a raw frame of either theme to a comparable form.
//! - `similarity`: structural similarity of two normalized frames.
//! - `regions`: bounding boxes of areas where two raw frames agree.
//! - `probe`: loads page frames and wires the three together.

pub mod normalize;
pub mod probe;
pub mod regions;
pub mod similarity;

pub use normalize::ThemeNormalizer;
pub use probe::ImageProbe;
pub use regions::{AgreementRegionCounter, DifferenceMap};
pub use similarity::SsimOracle;

use std::path::Path;

use image::RgbImage;

use crate::core::error::{AlignError, AlignResult};
use crate::core::model::StreamRole;

/// Decoded page frame without alpha.
pub type Frame = RgbImage;

pub trait FrameNormalizer {
    fn normalize(&self, frame: &Frame, role: StreamRole) -> Frame;
}

pub trait SimilarityOracle {
    /// Score in `[0, 1]`.
    fn similarity(&self, a: &Frame, b: &Frame) -> Result<f64, String>;
}

pub trait RegionCounter {
    fn difference_regions(&self, a: &Frame, b: &Frame) -> Result<DifferenceMap, String>;
}

pub fn load_frame(path: &Path) -> AlignResult<Frame> {
    let image = image::open(path).map_err(|e| AlignError::image(path, e))?;
    Ok(image.to_rgb8())
}
