use image::imageops;

use crate::core::model::StreamRole;
use crate::frames::{Frame, FrameNormalizer};

/// Maps a light-theme primary and a dark-theme secondary onto the same
/// polarity: the primary is inverted, the secondary gets a levels
/// correction that stretches `0..=level_high` onto `0..=255`.
#[derive(Debug, Clone, Copy)]
pub struct ThemeNormalizer {
    level_high: u8,
}

impl Default for ThemeNormalizer {
    fn default() -> Self {
        Self { level_high: 255 }
    }
}

impl ThemeNormalizer {
    pub fn new(level_high: u8) -> Self {
        Self {
            level_high: level_high.max(1),
        }
    }
}

impl FrameNormalizer for ThemeNormalizer {
    fn normalize(&self, frame: &Frame, role: StreamRole) -> Frame {
        let mut out = frame.clone();
        match role {
            StreamRole::Primary => imageops::invert(&mut out),
            StreamRole::Secondary if self.level_high < 255 => {
                let scale = 255.0 / self.level_high as f32;
                for px in out.pixels_mut() {
                    for channel in px.0.iter_mut() {
                        *channel = (*channel as f32 * scale).round().min(255.0) as u8;
                    }
                }
            }
            StreamRole::Secondary => {}
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn inverts_primary() {
        let frame = Frame::from_pixel(2, 2, Rgb([255, 200, 0]));
        let out = ThemeNormalizer::default().normalize(&frame, StreamRole::Primary);
        assert_eq!(*out.get_pixel(1, 1), Rgb([0, 55, 255]));
    }

    #[test]
    fn levels_secondary() {
        let frame = Frame::from_pixel(1, 1, Rgb([170, 85, 200]));
        let out = ThemeNormalizer::new(170).normalize(&frame, StreamRole::Secondary);
        assert_eq!(*out.get_pixel(0, 0), Rgb([255, 128, 255]));

        let untouched = ThemeNormalizer::default().normalize(&frame, StreamRole::Secondary);
        assert_eq!(untouched, frame);
    }
}
