use image::imageops::{self, FilterType};
use image_compare::Algorithm;

use crate::frames::{Frame, SimilarityOracle};

/// Mean SSIM of the grayscale frames. The second frame is resized to the
/// first one's dimensions when they differ.
#[derive(Debug, Clone, Copy, Default)]
pub struct SsimOracle;

impl SimilarityOracle for SsimOracle {
    fn similarity(&self, a: &Frame, b: &Frame) -> Result<f64, String> {
        if a.width() == 0 || a.height() == 0 {
            return Err("empty frame".to_string());
        }
        let gray_a = imageops::grayscale(a);
        let mut gray_b = imageops::grayscale(b);
        if gray_b.dimensions() != gray_a.dimensions() {
            gray_b = imageops::resize(&gray_b, a.width(), a.height(), FilterType::Triangle);
        }
        let result =
            image_compare::gray_similarity_structure(&Algorithm::MSSIMSimple, &gray_a, &gray_b)
                .map_err(|e| format!("SSIM calculation failed: {e:?}"))?;
        Ok(result.score.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn striped(width: u32, height: u32, period: u32) -> Frame {
        Frame::from_fn(width, height, |x, _| {
            if (x / period) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    #[test]
    fn identical_frames_score_one() {
        let frame = striped(64, 64, 4);
        let score = SsimOracle.similarity(&frame, &frame).unwrap();
        assert!(score > 0.99, "score {score}");
    }

    #[test]
    fn different_frames_score_low() {
        let a = striped(64, 64, 4);
        let b = Frame::from_fn(64, 64, |_, y| {
            if (y / 4) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let score = SsimOracle.similarity(&a, &b).unwrap();
        assert!(score < 0.9, "score {score}");
    }

    #[test]
    fn resizes_mismatched_frames() {
        let a = Frame::from_pixel(64, 64, Rgb([10, 10, 10]));
        let b = Frame::from_pixel(32, 32, Rgb([10, 10, 10]));
        let score = SsimOracle.similarity(&a, &b).unwrap();
        assert!(score > 0.99, "score {score}");
    }
}
