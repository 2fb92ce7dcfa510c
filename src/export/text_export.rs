use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::align::gaps;
use crate::core::model::{AlignmentReport, GapKind, MatchKind, MatchPair};
use crate::export::Exporter;

pub const DEFAULT_DISPLAY_WINDOW: usize = 10;

#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
    display_window: usize,
}

impl TextExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            out_dir,
            display_window: DEFAULT_DISPLAY_WINDOW,
        }
    }

    pub fn with_display_window(mut self, display_window: usize) -> Self {
        self.display_window = display_window;
        self
    }

    /// Recent matches with the extra pages between them, then totals.
    pub fn render(&self, report: &AlignmentReport) -> String {
        let mut out = String::new();
        let start = report.matches.len().saturating_sub(self.display_window);
        let recent = &report.matches[start..];

        out.push_str(&format!("last {} matches:\n", recent.len()));
        let mut previous: Option<&MatchPair> = None;
        for pair in recent {
            if let Some(prev) = previous {
                for index in prev.primary_index + 1..pair.primary_index {
                    out.push_str(&format!(
                        "  extra primary page: {index} {}\n",
                        report.primary_name(index)
                    ));
                }
                for index in prev.secondary_index + 1..pair.secondary_index {
                    out.push_str(&format!(
                        "  extra secondary page: {index} {}\n",
                        report.secondary_name(index)
                    ));
                }
            }
            let tag = match pair.kind {
                MatchKind::Exact => "match",
                MatchKind::Soft => "soft match",
            };
            out.push_str(&format!(
                "  {tag} {} {} {} {}\n",
                pair.primary_index,
                pair.secondary_index,
                report.primary_name(pair.primary_index),
                report.secondary_name(pair.secondary_index)
            ));
            previous = Some(pair);
        }

        let soft = report
            .matches
            .iter()
            .filter(|m| m.kind == MatchKind::Soft)
            .count();
        let recent_gaps = gaps::report_window(
            &report.matches,
            self.display_window,
            report.primary_len,
            report.secondary_len,
        );
        out.push('\n');
        out.push_str(&format!(
            "{} matches ({} soft) over {} primary / {} secondary pages\n",
            report.matches.len(),
            soft,
            report.primary_len,
            report.secondary_len
        ));
        out.push_str(&format!(
            "extra pages: {} primary, {} secondary ({} in the displayed window)\n",
            report.extra_pages(GapKind::ExtraPrimary).count(),
            report.extra_pages(GapKind::ExtraSecondary).count(),
            recent_gaps.len()
        ));
        out.push_str(&format!(
            "unmatched: {} primary, {} secondary\n",
            report.unmatched_primary.len(),
            report.unmatched_secondary.len()
        ));
        out
    }
}

impl Exporter for TextExporter {
    fn export(&self, report: &AlignmentReport) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        fs::write(self.out_dir.join("alignment.txt"), self.render(report))?;
        Ok(())
    }
}
