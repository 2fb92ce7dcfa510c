pub mod engine;
pub mod gaps;
pub mod state;

pub use engine::{AlignmentEngine, AlignmentOutcome};
pub use state::{AlignmentState, ScanPhase, Verdict};

use crate::core::error::AlignResult;
use crate::core::geometry::Region;
use crate::core::model::{AlignmentReport, Page, PageSequence};

/// Content comparison the engine consults for each candidate pair.
pub trait PageProbe {
    /// Score in `[0, 1]` of the normalized frames; higher is more alike.
    fn similarity(&mut self, primary: &Page, secondary: &Page) -> AlignResult<f64>;

    /// Regions of visual difference between the raw frames.
    fn difference_regions(&mut self, primary: &Page, secondary: &Page) -> AlignResult<Vec<Region>>;
}

impl<P: PageProbe + ?Sized> PageProbe for &mut P {
    fn similarity(&mut self, primary: &Page, secondary: &Page) -> AlignResult<f64> {
        (**self).similarity(primary, secondary)
    }

    fn difference_regions(&mut self, primary: &Page, secondary: &Page) -> AlignResult<Vec<Region>> {
        (**self).difference_regions(primary, secondary)
    }
}

impl AlignmentOutcome {
    pub fn into_report(self, primary: &PageSequence, secondary: &PageSequence) -> AlignmentReport {
        let (primary_len, secondary_len) = (primary.len(), secondary.len());
        let gaps = gaps::report(&self.matches, primary_len, secondary_len);
        let unmatched_primary = gaps::unmatched(&self.matches, primary_len, |m| m.primary_index);
        let unmatched_secondary =
            gaps::unmatched(&self.matches, secondary_len, |m| m.secondary_index);
        AlignmentReport {
            primary_len,
            secondary_len,
            primary_pages: primary.pages().iter().map(|p| p.name.clone()).collect(),
            secondary_pages: secondary.pages().iter().map(|p| p.name.clone()).collect(),
            matches: self.matches,
            gaps,
            unmatched_primary,
            unmatched_secondary,
            trace: self.trace,
        }
    }
}
