use crate::core::model::{GapEntry, GapKind, MatchPair};

/// Extra pages between consecutive matches over the whole match list.
/// Pages before the first and after the last match are not gaps.
pub fn report(matches: &[MatchPair], primary_len: usize, secondary_len: usize) -> Vec<GapEntry> {
    let mut gaps = Vec::new();
    for pair in matches.windows(2) {
        let (p1, s1) = pair[0].indices();
        let (p2, s2) = pair[1].indices();
        gaps.extend(
            (p1 + 1..p2.min(primary_len)).map(|index| GapEntry {
                kind: GapKind::ExtraPrimary,
                index,
            }),
        );
        gaps.extend(
            (s1 + 1..s2.min(secondary_len)).map(|index| GapEntry {
                kind: GapKind::ExtraSecondary,
                index,
            }),
        );
    }
    gaps
}

/// Gaps among the last `window` matches only, for display.
pub fn report_window(
    matches: &[MatchPair],
    window: usize,
    primary_len: usize,
    secondary_len: usize,
) -> Vec<GapEntry> {
    let start = matches.len().saturating_sub(window);
    report(&matches[start..], primary_len, secondary_len)
}

/// Indices of `len` that no match covers.
pub fn unmatched<F>(matches: &[MatchPair], len: usize, project: F) -> Vec<usize>
where
    F: Fn(&MatchPair) -> usize,
{
    let mut covered = vec![false; len];
    for pair in matches {
        if let Some(slot) = covered.get_mut(project(pair)) {
            *slot = true;
        }
    }
    covered
        .iter()
        .enumerate()
        .filter(|(_, hit)| !**hit)
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::MatchKind;
    use pretty_assertions::assert_eq;

    fn pairs(indices: &[(usize, usize)]) -> Vec<MatchPair> {
        indices
            .iter()
            .map(|&(p, s)| MatchPair {
                primary_index: p,
                secondary_index: s,
                kind: MatchKind::Exact,
            })
            .collect()
    }

    #[test]
    fn lockstep_has_no_gaps() {
        let matches = pairs(&[(0, 0), (1, 1), (2, 2)]);
        assert!(report(&matches, 4, 4).is_empty());
    }

    #[test]
    fn reports_both_kinds_in_order() {
        let matches = pairs(&[(0, 0), (1, 3), (4, 4)]);
        let gaps = report(&matches, 5, 5);
        assert_eq!(
            gaps,
            vec![
                GapEntry { kind: GapKind::ExtraSecondary, index: 1 },
                GapEntry { kind: GapKind::ExtraSecondary, index: 2 },
                GapEntry { kind: GapKind::ExtraPrimary, index: 2 },
                GapEntry { kind: GapKind::ExtraPrimary, index: 3 },
            ]
        );
    }

    #[test]
    fn ignores_leading_and_trailing_pages() {
        let matches = pairs(&[(2, 3), (3, 4)]);
        assert!(report(&matches, 8, 8).is_empty());
    }

    #[test]
    fn window_limits_to_recent_matches() {
        let matches = pairs(&[(0, 0), (2, 2), (3, 3), (4, 4)]);
        assert_eq!(report(&matches, 5, 5).len(), 1);
        assert!(report_window(&matches, 3, 5, 5).is_empty());
        assert_eq!(report_window(&matches, 10, 5, 5).len(), 1);
    }

    #[test]
    fn collects_unmatched_indices() {
        let matches = pairs(&[(1, 0), (2, 2)]);
        assert_eq!(unmatched(&matches, 4, |m| m.primary_index), vec![0, 3]);
        assert_eq!(unmatched(&matches, 3, |m| m.secondary_index), vec![1]);
    }
}
