//! Tunables for one alignment run.
//!
//! `AlignConfig` bundles every threshold the engine consults so that
//! separate runs (and tests) never share hidden constants.

use serde::{Deserialize, Serialize};

use crate::core::error::{AlignError, AlignResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Minimum oracle score for an exact match.
    pub similarity_threshold: f64,
    pub min_region_width: u32,
    pub min_region_height: u32,
    /// Soft matches are accepted up to this many small regions.
    pub max_small_region_count: usize,
    /// Steps allowed since the last match before backtracking.
    pub max_backtrack_distance: usize,
    /// Also evaluate the final primary index.
    pub evaluate_last_page: bool,
    /// Reset the search radius on soft matches too.
    pub reset_radius_on_soft_match: bool,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.9,
            min_region_width: 30,
            min_region_height: 30,
            max_small_region_count: 10,
            max_backtrack_distance: 5,
            evaluate_last_page: false,
            reset_radius_on_soft_match: false,
        }
    }
}

impl AlignConfig {
    pub fn builder() -> AlignConfigBuilder {
        AlignConfigBuilder {
            inner: AlignConfig::default(),
        }
    }

    pub fn validate(&self) -> AlignResult<()> {
        if !self.similarity_threshold.is_finite()
            || self.similarity_threshold < 0.0
            || self.similarity_threshold > 1.0
        {
            return Err(AlignError::config(format!(
                "similarity_threshold must be in [0.0, 1.0] and finite (got {})",
                self.similarity_threshold
            )));
        }
        ensure_non_zero(self.min_region_width, "min_region_width")?;
        ensure_non_zero(self.min_region_height, "min_region_height")?;
        Ok(())
    }
}

fn ensure_non_zero(value: u32, field: &'static str) -> AlignResult<()> {
    if value == 0 {
        return Err(AlignError::config(format!(
            "{field} must be greater than zero (got {value})"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct AlignConfigBuilder {
    inner: AlignConfig,
}

impl AlignConfigBuilder {
    pub fn similarity_threshold(mut self, value: f64) -> Self {
        self.inner.similarity_threshold = value;
        self
    }

    pub fn min_region_size(mut self, width: u32, height: u32) -> Self {
        self.inner.min_region_width = width;
        self.inner.min_region_height = height;
        self
    }

    pub fn max_small_region_count(mut self, value: usize) -> Self {
        self.inner.max_small_region_count = value;
        self
    }

    pub fn max_backtrack_distance(mut self, value: usize) -> Self {
        self.inner.max_backtrack_distance = value;
        self
    }

    pub fn evaluate_last_page(mut self, value: bool) -> Self {
        self.inner.evaluate_last_page = value;
        self
    }

    pub fn reset_radius_on_soft_match(mut self, value: bool) -> Self {
        self.inner.reset_radius_on_soft_match = value;
        self
    }

    pub fn build(self) -> AlignResult<AlignConfig> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}
