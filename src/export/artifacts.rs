use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, GrayImage};
use log::debug;

use crate::core::error::{AlignError, AlignResult};
use crate::core::geometry::Region;
use crate::core::model::Page;
use crate::frames::Frame;

/// Frames of one sub-threshold comparison.
pub struct ComparisonFrames<'a> {
    pub primary_raw: &'a Frame,
    pub primary_normalized: &'a Frame,
    pub secondary_normalized: &'a Frame,
    pub agreement_mask: &'a GrayImage,
    pub regions: &'a [Region],
}

/// Writes diagnostic images next to the page files.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    min_region_width: u32,
    min_region_height: u32,
}

impl ArtifactWriter {
    pub fn new(min_region_width: u32, min_region_height: u32) -> Self {
        Self {
            min_region_width,
            min_region_height,
        }
    }

    /// Returns the number of files written.
    pub fn write_comparison(
        &self,
        primary: &Page,
        secondary: &Page,
        frames: &ComparisonFrames<'_>,
    ) -> AlignResult<usize> {
        let mut written = 0;

        save(frames.primary_normalized, &artifact_path(&primary.path, "inv.png"))?;
        save(frames.secondary_normalized, &artifact_path(&secondary.path, "leveled.png"))?;
        let diff_path = artifact_path(&primary.path, "diff.png");
        frames
            .agreement_mask
            .save(&diff_path)
            .map_err(|e| AlignError::image(&diff_path, e))?;
        written += 3;

        let (w, h) = frames.primary_raw.dimensions();
        for region in frames.regions {
            if region.is_small(self.min_region_width, self.min_region_height) {
                continue;
            }
            let Some(region) = region.clamp_to(w, h) else {
                continue;
            };
            let crop = imageops::crop_imm(
                frames.primary_raw,
                region.x,
                region.y,
                region.width,
                region.height,
            )
            .to_image();
            let path = artifact_path(&primary.path, &format!("{}.crop.png", region.tag()));
            save(&crop, &path)?;
            written += 1;
        }

        debug!("wrote {written} artifacts for {}", primary.name);
        Ok(written)
    }
}

/// `0001-page.png` + `diff.png` -> `0001-page.diff.png`.
pub fn artifact_path(page_path: &Path, suffix: &str) -> PathBuf {
    let stem = page_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    page_path.with_file_name(format!("{stem}.{suffix}"))
}

/// Delete the given artifact files; returns how many were removed.
pub fn remove_artifacts(paths: &[PathBuf]) -> AlignResult<usize> {
    for path in paths {
        fs::remove_file(path).map_err(|e| AlignError::io(path, e))?;
    }
    Ok(paths.len())
}

fn save(frame: &Frame, path: &Path) -> AlignResult<()> {
    frame.save(path).map_err(|e| AlignError::image(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn derives_artifact_names() {
        let path = Path::new("out/book/pages/white/0007-x.png");
        assert_eq!(
            artifact_path(path, "inv.png"),
            PathBuf::from("out/book/pages/white/0007-x.inv.png")
        );
        assert_eq!(
            artifact_path(path, "1x2+30+40.crop.png"),
            PathBuf::from("out/book/pages/white/0007-x.1x2+30+40.crop.png")
        );
    }

    #[test]
    fn writes_crops_for_significant_regions_only() {
        let mut dir = std::env::temp_dir();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!("pagesync-artifacts-{}-{now}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let page = |index: usize, name: &str| Page {
            index,
            page_number: 1,
            name: name.to_string(),
            path: dir.join(name),
        };
        let primary = page(0, "0001-w.png");
        let secondary = page(0, "0001-b.png");
        let frame = Frame::from_pixel(80, 80, Rgb([200, 200, 200]));
        let mask = GrayImage::from_pixel(80, 80, Luma([255]));
        let regions = [Region::new(0, 0, 5, 5), Region::new(10, 10, 40, 40)];

        let written = ArtifactWriter::new(30, 30)
            .write_comparison(
                &primary,
                &secondary,
                &ComparisonFrames {
                    primary_raw: &frame,
                    primary_normalized: &frame,
                    secondary_normalized: &frame,
                    agreement_mask: &mask,
                    regions: &regions,
                },
            )
            .unwrap();

        assert_eq!(written, 4);
        assert!(dir.join("0001-w.10x10+40+40.crop.png").exists());
        assert!(dir.join("0001-b.leveled.png").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
