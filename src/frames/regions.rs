//! Agreement mask and connected-component boxes for two raw frames.
//!
//! Pixels on which both themes agree (within a per-channel tolerance) are
//! foreground. Embedded pictures survive a theme switch unchanged and show
//! up as large components; a mismatched page pair produces many tiny
//! coincidental ones.

use std::collections::BTreeMap;

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};

use crate::core::geometry::Region;
use crate::frames::{Frame, RegionCounter};

#[derive(Debug, Clone)]
pub struct DifferenceMap {
    /// 255 where the frames agree, 0 elsewhere.
    pub mask: GrayImage,
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, Copy)]
pub struct AgreementRegionCounter {
    tolerance: u8,
}

impl Default for AgreementRegionCounter {
    fn default() -> Self {
        Self { tolerance: 16 }
    }
}

impl AgreementRegionCounter {
    pub fn new(tolerance: u8) -> Self {
        Self { tolerance }
    }

    pub fn agreement_mask(&self, a: &Frame, b: &Frame) -> GrayImage {
        let resized;
        let b = if b.dimensions() != a.dimensions() {
            resized = imageops::resize(b, a.width(), a.height(), FilterType::Triangle);
            &resized
        } else {
            b
        };
        GrayImage::from_fn(a.width(), a.height(), |x, y| {
            let pa = a.get_pixel(x, y).0;
            let pb = b.get_pixel(x, y).0;
            let agrees = pa
                .iter()
                .zip(pb.iter())
                .all(|(ca, cb)| ca.abs_diff(*cb) <= self.tolerance);
            Luma([if agrees { 255 } else { 0 }])
        })
    }
}

impl RegionCounter for AgreementRegionCounter {
    fn difference_regions(&self, a: &Frame, b: &Frame) -> Result<DifferenceMap, String> {
        if a.width() == 0 || a.height() == 0 {
            return Err("empty frame".to_string());
        }
        let mask = self.agreement_mask(a, b);
        let regions = component_boxes(&mask);
        Ok(DifferenceMap { mask, regions })
    }
}

struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new() -> Self {
        // label 0 is background
        Self { parent: vec![0] }
    }

    fn make(&mut self) -> u32 {
        let label = self.parent.len() as u32;
        self.parent.push(label);
        label
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grand = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grand;
            x = grand;
        }
        x
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi as usize] = lo;
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Extent {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl Extent {
    fn at(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn merge(&mut self, other: &Extent) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    fn region(&self) -> Region {
        Region::new(
            self.min_x,
            self.min_y,
            self.max_x - self.min_x + 1,
            self.max_y - self.min_y + 1,
        )
    }
}

/// Bounding boxes of the 8-connected foreground components, ordered top
/// to bottom then left to right.
pub fn component_boxes(mask: &GrayImage) -> Vec<Region> {
    let (w, h) = mask.dimensions();
    let mut labels = vec![0u32; (w as usize) * (h as usize)];
    let mut uf = UnionFind::new();
    let mut extents: BTreeMap<u32, Extent> = BTreeMap::new();
    let at = |x: u32, y: u32| (y as usize) * (w as usize) + x as usize;

    // First pass: provisional labels from the already visited neighbours.
    for y in 0..h {
        for x in 0..w {
            if mask.get_pixel(x, y).0[0] == 0 {
                continue;
            }
            let mut neighbours = [0u32; 4];
            if x > 0 {
                neighbours[0] = labels[at(x - 1, y)];
            }
            if y > 0 {
                neighbours[1] = labels[at(x, y - 1)];
                if x > 0 {
                    neighbours[2] = labels[at(x - 1, y - 1)];
                }
                if x + 1 < w {
                    neighbours[3] = labels[at(x + 1, y - 1)];
                }
            }
            let label = match neighbours.iter().copied().filter(|&l| l != 0).min() {
                Some(min) => {
                    for &other in neighbours.iter().filter(|&&l| l != 0 && l != min) {
                        uf.union(min, other);
                    }
                    if let Some(extent) = extents.get_mut(&min) {
                        extent.add(x, y);
                    }
                    min
                }
                None => {
                    let label = uf.make();
                    extents.insert(label, Extent::at(x, y));
                    label
                }
            };
            labels[at(x, y)] = label;
        }
    }

    // Second pass: fold provisional extents into their roots.
    let mut roots: BTreeMap<u32, Extent> = BTreeMap::new();
    for (label, extent) in extents {
        let root = uf.find(label);
        roots
            .entry(root)
            .and_modify(|e| e.merge(&extent))
            .or_insert(extent);
    }

    let mut regions: Vec<Region> = roots.values().map(Extent::region).collect();
    regions.sort_by_key(|r| (r.y, r.x));
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use pretty_assertions::assert_eq;

    fn mask_from(rows: &[&str]) -> GrayImage {
        let h = rows.len() as u32;
        let w = rows[0].len() as u32;
        GrayImage::from_fn(w, h, |x, y| {
            let on = rows[y as usize].as_bytes()[x as usize] == b'#';
            Luma([if on { 255 } else { 0 }])
        })
    }

    #[test]
    fn boxes_separate_components() {
        let mask = mask_from(&[
            "##....#",
            "##....#",
            ".......",
            "...###.",
        ]);
        assert_eq!(
            component_boxes(&mask),
            vec![
                Region::new(0, 0, 2, 2),
                Region::new(6, 0, 1, 2),
                Region::new(3, 3, 3, 1),
            ]
        );
    }

    #[test]
    fn joins_diagonal_and_u_shapes() {
        let mask = mask_from(&[
            "#...#",
            ".#..#",
            "..###",
        ]);
        assert_eq!(component_boxes(&mask), vec![Region::new(0, 0, 5, 3)]);
    }

    #[test]
    fn agreement_marks_shared_pixels() {
        let a = Frame::from_fn(4, 1, |x, _| {
            if x < 2 {
                Rgb([10, 10, 10])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let b = Frame::from_pixel(4, 1, Rgb([12, 8, 10]));
        let map = AgreementRegionCounter::default().difference_regions(&a, &b).unwrap();
        assert_eq!(map.regions, vec![Region::new(0, 0, 2, 1)]);
        assert_eq!(map.mask.get_pixel(3, 0).0[0], 0);
    }
}
