use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::error::{AlignError, AlignResult};

/// Which of the two themed renderings a page belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StreamRole {
    Primary,
    Secondary,
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamRole::Primary => write!(f, "primary"),
            StreamRole::Secondary => write!(f, "secondary"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub page_number: u32,
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSequence {
    pub role: StreamRole,
    pages: Vec<Page>,
}

impl PageSequence {
    /// Every page's `index` must equal its position in `pages`.
    pub fn new(role: StreamRole, pages: Vec<Page>) -> AlignResult<Self> {
        for (position, page) in pages.iter().enumerate() {
            if page.index != position {
                return Err(AlignError::config(format!(
                    "{role} page '{}' has index {} at position {position}",
                    page.name, page.index
                )));
            }
        }
        Ok(Self { role, pages })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_number_range(&self) -> Option<(u32, u32)> {
        let min = self.pages.iter().map(|page| page.page_number).min()?;
        let max = self.pages.iter().map(|page| page.page_number).max()?;
        Some((min, max))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Soft,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchPair {
    pub primary_index: usize,
    pub secondary_index: usize,
    pub kind: MatchKind,
}

impl MatchPair {
    pub fn indices(&self) -> (usize, usize) {
        (self.primary_index, self.secondary_index)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    ExtraPrimary,
    ExtraSecondary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GapEntry {
    pub kind: GapKind,
    pub index: usize,
}

/// One decision of the alignment engine, in the order it was taken.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AlignmentEvent {
    Matched {
        primary_index: usize,
        secondary_index: usize,
        kind: MatchKind,
        search_offset: i64,
        search_radius: usize,
    },
    Skipped {
        primary_index: usize,
        search_offset: i64,
        search_radius: usize,
    },
    Backtracked {
        primary_index: usize,
        resume_at: usize,
        last_match_page_number: Option<u32>,
        search_radius: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub primary_len: usize,
    pub secondary_len: usize,
    /// File names by index, for display.
    pub primary_pages: Vec<String>,
    pub secondary_pages: Vec<String>,
    pub matches: Vec<MatchPair>,
    pub gaps: Vec<GapEntry>,
    pub unmatched_primary: Vec<usize>,
    pub unmatched_secondary: Vec<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub trace: Vec<AlignmentEvent>,
}

impl AlignmentReport {
    pub fn primary_name(&self, index: usize) -> &str {
        self.primary_pages.get(index).map_or("?", String::as_str)
    }

    pub fn secondary_name(&self, index: usize) -> &str {
        self.secondary_pages.get(index).map_or("?", String::as_str)
    }

    pub fn extra_pages(&self, kind: GapKind) -> impl Iterator<Item = usize> + '_ {
        self.gaps
            .iter()
            .filter(move |gap| gap.kind == kind)
            .map(|gap| gap.index)
    }
}
