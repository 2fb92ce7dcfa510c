//! Scan state of one alignment run and the pure transitions over it.
//!
//! Nothing here touches a frame: the engine feeds capability results in
//! and reads the next [`ScanPhase`] out, so every transition can be
//! exercised without images.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::core::config::AlignConfig;
use crate::core::model::MatchKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Probing offset `delta` of the current window.
    Scanning(i64),
    Matched {
        secondary_index: usize,
        delta: i64,
        kind: MatchKind,
    },
    /// Rewind to the last match and widen the window.
    Backtracking,
    /// Window exhausted; leave the primary page unmatched.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Exact,
    Soft,
    Mismatch,
}

impl Verdict {
    /// `None` means the score alone cannot accept the pair and the
    /// difference regions have to be consulted.
    pub fn from_score(score: f64, config: &AlignConfig) -> Option<Verdict> {
        (score >= config.similarity_threshold).then_some(Verdict::Exact)
    }

    pub fn from_small_regions(small_regions: usize, config: &AlignConfig) -> Verdict {
        if small_regions <= config.max_small_region_count {
            Verdict::Soft
        } else {
            Verdict::Mismatch
        }
    }

    pub fn match_kind(self) -> Option<MatchKind> {
        match self {
            Verdict::Exact => Some(MatchKind::Exact),
            Verdict::Soft => Some(MatchKind::Soft),
            Verdict::Mismatch => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentState {
    /// Estimate of `secondary_index - primary_index` for unseen pages.
    pub search_offset: i64,
    pub search_radius: usize,
    /// `-1` until the first match.
    pub last_match_primary_index: i64,
    pub last_match_page_number: Option<u32>,
    pub last_match_secondary_index: Option<usize>,
    consumed: BTreeSet<usize>,
}

impl Default for AlignmentState {
    fn default() -> Self {
        Self::new()
    }
}

impl AlignmentState {
    pub fn new() -> Self {
        Self {
            search_offset: 0,
            search_radius: 0,
            last_match_primary_index: -1,
            last_match_page_number: None,
            last_match_secondary_index: None,
            consumed: BTreeSet::new(),
        }
    }

    /// Offsets of the current window, in ascending order.
    pub fn window(&self) -> RangeInclusive<i64> {
        let radius = self.search_radius as i64;
        -radius..=radius
    }

    pub fn is_consumed(&self, secondary_index: usize) -> bool {
        self.consumed.contains(&secondary_index)
    }

    /// Secondary index probed for `primary_index` at `delta`, or `None` when
    /// it is out of bounds, consumed, or would cross an earlier match.
    pub fn candidate(&self, primary_index: usize, delta: i64, secondary_len: usize) -> Option<usize> {
        let target = primary_index as i64 + self.search_offset + delta;
        if target < 0 || target >= secondary_len as i64 {
            return None;
        }
        let target = target as usize;
        if self.is_consumed(target) {
            return None;
        }
        if self
            .last_match_secondary_index
            .is_some_and(|last| target <= last)
        {
            return None;
        }
        Some(target)
    }

    pub fn commit(
        &mut self,
        primary_index: usize,
        page_number: u32,
        secondary_index: usize,
        delta: i64,
        kind: MatchKind,
        config: &AlignConfig,
    ) {
        self.consumed.insert(secondary_index);
        self.last_match_primary_index = primary_index as i64;
        self.last_match_page_number = Some(page_number);
        self.last_match_secondary_index = Some(secondary_index);
        if delta != 0 {
            self.search_offset += delta;
            if kind == MatchKind::Exact || config.reset_radius_on_soft_match {
                self.search_radius = 0;
            }
        }
    }

    /// Phase that follows a window with no acceptable candidate.
    ///
    /// Backtracking stops once every primary page from the resume point up
    /// to `primary_index` already sees every open secondary page: the
    /// rescan would repeat the same comparisons.
    pub fn after_window(
        &self,
        primary_index: usize,
        config: &AlignConfig,
        secondary_len: usize,
    ) -> ScanPhase {
        let distance = primary_index as i64 - self.last_match_primary_index;
        if distance > config.max_backtrack_distance as i64
            && self.can_widen(primary_index, secondary_len)
        {
            ScanPhase::Backtracking
        } else {
            ScanPhase::Skipped
        }
    }

    fn can_widen(&self, primary_index: usize, secondary_len: usize) -> bool {
        let first_open = self.last_match_secondary_index.map_or(0, |last| last as i64 + 1);
        let last_open = secondary_len as i64 - 1;
        if first_open > last_open {
            return false;
        }
        let radius = self.search_radius as i64;
        let resume_at = self.last_match_primary_index + 1;
        let reaches_first = primary_index as i64 + self.search_offset - radius <= first_open;
        let reaches_last = resume_at + self.search_offset + radius >= last_open;
        !(reaches_first && reaches_last)
    }

    /// Widen the window and return the cursor to resume from; the next
    /// outer step examines the page right after the last match.
    pub fn backtrack(&mut self) -> i64 {
        self.search_radius += 1;
        self.last_match_primary_index
    }
}
