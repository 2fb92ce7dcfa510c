use std::path::PathBuf;

use log::warn;

use crate::align::PageProbe;
use crate::core::error::{AlignError, AlignResult};
use crate::core::geometry::Region;
use crate::core::model::{Page, StreamRole};
use crate::export::artifacts::{ArtifactWriter, ComparisonFrames};
use crate::frames::{
    load_frame, AgreementRegionCounter, Frame, FrameNormalizer, RegionCounter, SimilarityOracle,
    SsimOracle, ThemeNormalizer,
};

struct CachedFrame {
    path: PathBuf,
    raw: Frame,
    normalized: Frame,
}

/// [`PageProbe`] over decoded page images.
///
/// The last frame of each role is kept decoded: the engine probes the same
/// primary page against several candidates in a row.
pub struct ImageProbe<N = ThemeNormalizer, O = SsimOracle, R = AgreementRegionCounter> {
    normalizer: N,
    oracle: O,
    counter: R,
    artifacts: Option<ArtifactWriter>,
    primary: Option<CachedFrame>,
    secondary: Option<CachedFrame>,
}

impl Default for ImageProbe {
    fn default() -> Self {
        Self::new(
            ThemeNormalizer::default(),
            SsimOracle,
            AgreementRegionCounter::default(),
        )
    }
}

impl<N, O, R> ImageProbe<N, O, R>
where
    N: FrameNormalizer,
    O: SimilarityOracle,
    R: RegionCounter,
{
    pub fn new(normalizer: N, oracle: O, counter: R) -> Self {
        Self {
            normalizer,
            oracle,
            counter,
            artifacts: None,
            primary: None,
            secondary: None,
        }
    }

    pub fn with_artifacts(mut self, writer: ArtifactWriter) -> Self {
        self.artifacts = Some(writer);
        self
    }
}

impl<N, O, R> PageProbe for ImageProbe<N, O, R>
where
    N: FrameNormalizer,
    O: SimilarityOracle,
    R: RegionCounter,
{
    fn similarity(&mut self, primary: &Page, secondary: &Page) -> AlignResult<f64> {
        let p = refresh(&mut self.primary, &self.normalizer, primary, StreamRole::Primary)?;
        let s = refresh(&mut self.secondary, &self.normalizer, secondary, StreamRole::Secondary)?;
        self.oracle
            .similarity(&p.normalized, &s.normalized)
            .map_err(|reason| capability_error("similarity", primary, secondary, reason))
    }

    fn difference_regions(&mut self, primary: &Page, secondary: &Page) -> AlignResult<Vec<Region>> {
        let p = refresh(&mut self.primary, &self.normalizer, primary, StreamRole::Primary)?;
        let s = refresh(&mut self.secondary, &self.normalizer, secondary, StreamRole::Secondary)?;
        let map = self
            .counter
            .difference_regions(&p.raw, &s.raw)
            .map_err(|reason| capability_error("difference_regions", primary, secondary, reason))?;

        if let Some(writer) = &self.artifacts {
            let frames = ComparisonFrames {
                primary_raw: &p.raw,
                primary_normalized: &p.normalized,
                secondary_normalized: &s.normalized,
                agreement_mask: &map.mask,
                regions: &map.regions,
            };
            if let Err(err) = writer.write_comparison(primary, secondary, &frames) {
                warn!("failed to write artifacts for {}: {err}", primary.name);
            }
        }

        Ok(map.regions)
    }
}

/// Frame of `page`, decoding it unless `slot` already holds the same file.
fn refresh<'a, N: FrameNormalizer>(
    slot: &'a mut Option<CachedFrame>,
    normalizer: &N,
    page: &Page,
    role: StreamRole,
) -> AlignResult<&'a CachedFrame> {
    let cached = match slot.take() {
        Some(cached) if cached.path == page.path => cached,
        _ => {
            let raw = load_frame(&page.path)?;
            let normalized = normalizer.normalize(&raw, role);
            CachedFrame {
                path: page.path.clone(),
                raw,
                normalized,
            }
        }
    };
    Ok(slot.insert(cached))
}

fn capability_error(
    capability: &'static str,
    primary: &Page,
    secondary: &Page,
    reason: String,
) -> AlignError {
    AlignError::Capability {
        capability,
        primary: primary.index,
        secondary: secondary.index,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let mut out = std::env::temp_dir();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        out.push(format!("{prefix}-{}-{now}", std::process::id()));
        fs::create_dir_all(&out).unwrap();
        out
    }

    fn write_page(dir: &Path, index: usize, name: &str, frame: &Frame) -> Page {
        let path = dir.join(name);
        frame.save(&path).unwrap();
        Page {
            index,
            page_number: index as u32 + 1,
            name: name.to_string(),
            path,
        }
    }

    /// Dark text on white, or the same glyphs light on black.
    fn themed_page(dark_theme: bool) -> Frame {
        Frame::from_fn(64, 64, |x, y| {
            let ink = (x / 4 + y / 8) % 3 == 0;
            let value = match (ink, dark_theme) {
                (true, false) | (false, true) => 0,
                _ => 255,
            };
            Rgb([value, value, value])
        })
    }

    #[test]
    fn theme_variants_of_the_same_page_are_similar() {
        let dir = temp_dir("pagesync-probe");
        let white = write_page(&dir, 0, "0001-w.png", &themed_page(false));
        let black = write_page(&dir, 0, "0001-b.png", &themed_page(true));

        let mut probe = ImageProbe::default();
        let score = probe.similarity(&white, &black).unwrap();
        assert!(score > 0.99, "score {score}");

        let _ = fs::remove_dir_all(&dir);
    }

    fn stripes(vertical: bool, dark_theme: bool) -> Frame {
        Frame::from_fn(64, 64, |x, y| {
            let ink = if vertical { x / 4 % 2 == 0 } else { y / 4 % 2 == 0 };
            let value = if ink != dark_theme { 0 } else { 255 };
            Rgb([value, value, value])
        })
    }

    #[test]
    fn cached_frames_are_replaced_for_another_book() {
        let book_a = temp_dir("pagesync-probe-book-a");
        let book_b = temp_dir("pagesync-probe-book-b");
        let a_white = write_page(&book_a, 0, "0001-w.png", &stripes(true, false));
        let a_black = write_page(&book_a, 0, "0001-b.png", &stripes(true, true));
        let b_white = write_page(&book_b, 0, "0001-w.png", &stripes(false, false));
        let b_black = write_page(&book_b, 0, "0001-b.png", &stripes(true, true));

        let mut probe = ImageProbe::default();
        let first = probe.similarity(&a_white, &a_black).unwrap();
        let reused = probe.similarity(&b_white, &b_black).unwrap();
        let fresh = ImageProbe::default().similarity(&b_white, &b_black).unwrap();

        assert!(first > 0.99, "book a {first}");
        assert!(reused < 0.5, "book b {reused}");
        assert!((reused - fresh).abs() < 1e-9, "reused {reused} vs fresh {fresh}");

        let _ = fs::remove_dir_all(&book_a);
        let _ = fs::remove_dir_all(&book_b);
    }

    #[test]
    fn unreadable_frame_is_an_error() {
        let dir = temp_dir("pagesync-probe-bad");
        let path = dir.join("0001-w.png");
        fs::write(&path, b"not a png").unwrap();
        let page = Page {
            index: 0,
            page_number: 1,
            name: "0001-w.png".to_string(),
            path,
        };

        let err = ImageProbe::default().similarity(&page, &page).unwrap_err();
        assert!(matches!(err, AlignError::Image { .. }));

        let _ = fs::remove_dir_all(&dir);
    }
}
