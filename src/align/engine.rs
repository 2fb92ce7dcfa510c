use log::{debug, info, warn};

use crate::align::state::{AlignmentState, ScanPhase, Verdict};
use crate::align::PageProbe;
use crate::core::config::AlignConfig;
use crate::core::error::{AlignError, AlignResult};
use crate::core::geometry::count_small_regions;
use crate::core::model::{AlignmentEvent, MatchPair, Page, PageSequence};

#[derive(Debug, Clone)]
pub struct AlignmentOutcome {
    pub matches: Vec<MatchPair>,
    pub trace: Vec<AlignmentEvent>,
    pub final_state: AlignmentState,
}

/// Online matcher walking both sequences in lockstep.
///
/// The scan state is created fresh for every [`align`](Self::align) call,
/// so one engine can serve several document pairs.
#[derive(Debug)]
pub struct AlignmentEngine<P> {
    config: AlignConfig,
    probe: P,
}

impl<P: PageProbe> AlignmentEngine<P> {
    pub fn new(config: AlignConfig, probe: P) -> Self {
        Self { config, probe }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn align(
        &mut self,
        primary: &PageSequence,
        secondary: &PageSequence,
    ) -> AlignResult<AlignmentOutcome> {
        self.config.validate()?;

        let mut state = AlignmentState::new();
        let mut matches = Vec::new();
        let mut trace = Vec::new();

        let Some(last_index) = self.last_evaluated_index(primary.len()) else {
            return Ok(AlignmentOutcome {
                matches,
                trace,
                final_state: state,
            });
        };

        let mut cursor: i64 = -1;
        while cursor < last_index as i64 {
            cursor += 1;
            let primary_index = cursor as usize;
            let page = page_at(primary, primary_index)?;
            debug!(
                "primary {primary_index} ({}) search_offset {} search_radius {}",
                page.name, state.search_offset, state.search_radius
            );

            let radius = state.search_radius as i64;
            let mut phase = ScanPhase::Scanning(-radius);
            loop {
                phase = match phase {
                    ScanPhase::Scanning(delta) if delta > radius => {
                        state.after_window(primary_index, &self.config, secondary.len())
                    }
                    ScanPhase::Scanning(delta) => {
                        match state.candidate(primary_index, delta, secondary.len()) {
                            Some(secondary_index) => {
                                let candidate = page_at(secondary, secondary_index)?;
                                match self.judge(page, candidate)?.match_kind() {
                                    Some(kind) => ScanPhase::Matched {
                                        secondary_index,
                                        delta,
                                        kind,
                                    },
                                    None => ScanPhase::Scanning(delta + 1),
                                }
                            }
                            None => {
                                debug!("delta {delta}: no candidate");
                                ScanPhase::Scanning(delta + 1)
                            }
                        }
                    }
                    ScanPhase::Matched {
                        secondary_index,
                        delta,
                        kind,
                    } => {
                        state.commit(
                            primary_index,
                            page.page_number,
                            secondary_index,
                            delta,
                            kind,
                            &self.config,
                        );
                        info!(
                            "{kind:?} match: primary {primary_index} secondary {secondary_index} (offset {})",
                            state.search_offset
                        );
                        matches.push(MatchPair {
                            primary_index,
                            secondary_index,
                            kind,
                        });
                        trace.push(AlignmentEvent::Matched {
                            primary_index,
                            secondary_index,
                            kind,
                            search_offset: state.search_offset,
                            search_radius: state.search_radius,
                        });
                        break;
                    }
                    ScanPhase::Backtracking => {
                        cursor = state.backtrack();
                        let resume_at = (cursor + 1) as usize;
                        warn!(
                            "no match within {} pages: seeking back to primary {resume_at} (page {}) with search radius {}",
                            self.config.max_backtrack_distance,
                            state
                                .last_match_page_number
                                .map_or_else(|| "-".to_string(), |n| n.to_string()),
                            state.search_radius
                        );
                        trace.push(AlignmentEvent::Backtracked {
                            primary_index,
                            resume_at,
                            last_match_page_number: state.last_match_page_number,
                            search_radius: state.search_radius,
                        });
                        break;
                    }
                    ScanPhase::Skipped => {
                        debug!("primary {primary_index} left unmatched");
                        trace.push(AlignmentEvent::Skipped {
                            primary_index,
                            search_offset: state.search_offset,
                            search_radius: state.search_radius,
                        });
                        break;
                    }
                };
            }
        }

        Ok(AlignmentOutcome {
            matches,
            trace,
            final_state: state,
        })
    }

    fn last_evaluated_index(&self, primary_len: usize) -> Option<usize> {
        if self.config.evaluate_last_page {
            primary_len.checked_sub(1)
        } else {
            primary_len.checked_sub(2)
        }
    }

    fn judge(&mut self, primary: &Page, secondary: &Page) -> AlignResult<Verdict> {
        let score = self.probe.similarity(primary, secondary)?;
        if let Some(verdict) = Verdict::from_score(score, &self.config) {
            debug!(
                "similarity {score:.2}: {} ~ {}",
                primary.name, secondary.name
            );
            return Ok(verdict);
        }

        let regions = self.probe.difference_regions(primary, secondary)?;
        let small = count_small_regions(
            &regions,
            self.config.min_region_width,
            self.config.min_region_height,
        );
        let verdict = Verdict::from_small_regions(small, &self.config);
        debug!(
            "similarity {score:.2}, {small} small regions of {}: {} vs {} -> {verdict:?}",
            regions.len(),
            primary.name,
            secondary.name
        );
        Ok(verdict)
    }
}

fn page_at(sequence: &PageSequence, index: usize) -> AlignResult<&Page> {
    sequence.get(index).ok_or_else(|| {
        AlignError::config(format!(
            "{} sequence has no page at index {index}",
            sequence.role
        ))
    })
}
