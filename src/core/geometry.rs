use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle reported by a region counter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smaller than the minimum in either dimension.
    pub fn is_small(&self, min_width: u32, min_height: u32) -> bool {
        self.width < min_width || self.height < min_height
    }

    /// Clamp to a `frame_width` x `frame_height` frame. `None` when nothing is left.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<Self> {
        if self.x >= frame_width || self.y >= frame_height {
            return None;
        }
        let width = self.width.min(frame_width - self.x);
        let height = self.height.min(frame_height - self.y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self::new(self.x, self.y, width, height))
    }

    /// Geometry tag used in artifact file names, e.g. `12x40+100+30`.
    pub fn tag(&self) -> String {
        format!("{}x{}+{}+{}", self.x, self.y, self.width, self.height)
    }
}

pub fn count_small_regions(regions: &[Region], min_width: u32, min_height: u32) -> usize {
    regions
        .iter()
        .filter(|region| region.is_small(min_width, min_height))
        .count()
}
