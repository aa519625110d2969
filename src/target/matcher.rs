// Candidate selection against target sites
//
// One predicate serves every data source:
// 1. chromosome equality
// 2. transposon identity (exact, prefix, or not checked)
// 3. position: reference calls must contain the target; non-reference
//    calls and single alignments must lie within a source-specific window

use log::debug;

use crate::error::Error;
use crate::io::{AlignmentRecord, InsertionCall};
use crate::target::catalog::TargetSite;

/// How a candidate's transposon name is compared to the target's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMatch {
    /// candidate name starts with the target name
    #[default]
    Prefix,
    /// names are identical
    Exact,
    /// identity is not checked (sources that carry no transposon name)
    Any,
}

impl NameMatch {
    pub fn matches(&self, target_te: &str, candidate_te: Option<&str>) -> bool {
        match (self, candidate_te) {
            (NameMatch::Any, _) => true,
            (_, None) => false,
            (NameMatch::Prefix, Some(te)) => te.starts_with(target_te),
            (NameMatch::Exact, Some(te)) => te == target_te,
        }
    }
}

impl std::str::FromStr for NameMatch {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefix" => Ok(Self::Prefix),
            "exact" => Ok(Self::Exact),
            _ => Err(format!(
                "unknown transposon name match '{s}'; expected 'prefix' or 'exact'"
            )),
        }
    }
}

impl std::fmt::Display for NameMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prefix => write!(f, "prefix"),
            Self::Exact => write!(f, "exact"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// Where a candidate sits on its chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locus {
    /// A breakpoint call with both flanking positions
    Breakpoints {
        upstream: u64,
        downstream: u64,
        is_reference: bool,
    },
    /// A single alignment position
    Point(u64),
}

/// Anything that can be matched against a target site.
pub trait Candidate {
    fn chrom(&self) -> &str;
    fn te_name(&self) -> Option<&str>;
    fn locus(&self) -> Locus;
}

impl Candidate for InsertionCall {
    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn te_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn locus(&self) -> Locus {
        Locus::Breakpoints {
            upstream: self.upstream_pos,
            downstream: self.downstream_pos,
            is_reference: self.is_reference,
        }
    }
}

impl Candidate for AlignmentRecord {
    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn te_name(&self) -> Option<&str> {
        self.te_family()
    }

    fn locus(&self) -> Locus {
        Locus::Point(self.pos)
    }
}

/// Position test applied after the chromosome and identity filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionRule {
    /// Reference calls must contain the target; everything else must lie
    /// within `cutoff` bp of it.
    Window { cutoff: u64 },
    /// The candidate's upstream breakpoint (or point) equals the target.
    UpstreamBreakpoint,
}

/// Result of matching one target against a candidate set.
#[derive(Debug)]
pub enum MatchOutcome<'a, R> {
    Found(&'a R),
    /// The target has no evidence in this data source
    NotFound,
}

impl<'a, R> MatchOutcome<'a, R> {
    pub fn found(self) -> Option<&'a R> {
        match self {
            MatchOutcome::Found(r) => Some(r),
            MatchOutcome::NotFound => None,
        }
    }
}

/// Stateless matcher configured per data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateMatcher {
    pub name_match: NameMatch,
    pub position: PositionRule,
}

impl CandidateMatcher {
    /// Window matcher with a source-specific cutoff
    pub fn window(name_match: NameMatch, cutoff: u64) -> Self {
        Self {
            name_match,
            position: PositionRule::Window { cutoff },
        }
    }

    /// Matcher anchored on the exact upstream breakpoint
    pub fn upstream_breakpoint(name_match: NameMatch) -> Self {
        Self {
            name_match,
            position: PositionRule::UpstreamBreakpoint,
        }
    }

    /// Does one candidate pass all three filters for this target?
    pub fn accepts<R: Candidate>(&self, target: &TargetSite, candidate: &R) -> bool {
        candidate.chrom() == target.chrom
            && self.name_match.matches(&target.te_name, candidate.te_name())
            && self.position_matches(target.pos, candidate.locus())
    }

    fn position_matches(&self, pos: u64, locus: Locus) -> bool {
        match (self.position, locus) {
            (
                PositionRule::Window { .. },
                Locus::Breakpoints {
                    upstream,
                    downstream,
                    is_reference: true,
                },
            ) => (upstream..=downstream).contains(&pos),
            (
                PositionRule::Window { cutoff },
                Locus::Breakpoints {
                    upstream,
                    downstream,
                    is_reference: false,
                },
            ) => upstream.abs_diff(pos) <= cutoff || downstream.abs_diff(pos) <= cutoff,
            (PositionRule::Window { cutoff }, Locus::Point(p)) => p.abs_diff(pos) <= cutoff,
            (PositionRule::UpstreamBreakpoint, Locus::Breakpoints { upstream, .. }) => {
                upstream == pos
            }
            (PositionRule::UpstreamBreakpoint, Locus::Point(p)) => p == pos,
        }
    }

    /// All candidates passing the filters, in input order.
    pub fn filter<'a, R: Candidate>(
        &self,
        target: &TargetSite,
        candidates: &'a [R],
    ) -> Vec<&'a R> {
        candidates
            .iter()
            .filter(|c| self.accepts(target, *c))
            .collect()
    }

    /// The single candidate for this target.
    ///
    /// More than one passing candidate means the ground truth is ambiguous
    /// and is a fatal error.
    pub fn find<'a, R: Candidate>(
        &self,
        target: &TargetSite,
        candidates: &'a [R],
    ) -> Result<MatchOutcome<'a, R>, Error> {
        let passing = self.filter(target, candidates);
        match passing.as_slice() {
            [] => Ok(MatchOutcome::NotFound),
            [single] => {
                debug!("target {} matched", target.name);
                Ok(MatchOutcome::Found(*single))
            }
            many => Err(Error::AmbiguousTarget {
                target: target.name.clone(),
                count: many.len(),
            }),
        }
    }

    /// Like [`find`](Self::find), but a missing target is fatal too.
    pub fn find_required<'a, R: Candidate>(
        &self,
        target: &TargetSite,
        candidates: &'a [R],
    ) -> Result<&'a R, Error> {
        self.find(target, candidates)?
            .found()
            .ok_or_else(|| Error::TargetNotFound(target.name.clone()))
    }
}

/// Is an alignment position within `cutoff` of either breakpoint of a call?
pub fn near_breakpoints(call: &InsertionCall, pos: u64, cutoff: u64) -> bool {
    call.upstream_pos.abs_diff(pos) <= cutoff || call.downstream_pos.abs_diff(pos) <= cutoff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Orientation;

    fn call(name: &str, chrom: &str, up: u64, down: u64, is_reference: bool) -> InsertionCall {
        InsertionCall {
            is_reference,
            name: name.to_string(),
            chrom: chrom.to_string(),
            upstream_pos: up,
            downstream_pos: down,
            orientation: Orientation::PlusPlus,
            upstream_reads: vec![],
            downstream_reads: vec![],
        }
    }

    fn record(name: &str, chrom: &str, pos: u64) -> AlignmentRecord {
        let line = format!("{name}\t0\t{chrom}\t{pos}\t60\t100M50S");
        AlignmentRecord::parse(&line).unwrap()
    }

    #[test]
    fn test_reference_call_interval() {
        let matcher = CandidateMatcher::window(NameMatch::Exact, 500);
        let calls = vec![call("1360", "2L", 100, 200, true)];

        for (pos, expected) in [(150, true), (100, true), (200, true), (99, false), (201, false)] {
            let target = TargetSite::new("T", "1360", "2L", pos);
            assert_eq!(matcher.accepts(&target, &calls[0]), expected, "pos {pos}");
        }
    }

    #[test]
    fn test_non_reference_call_window() {
        let matcher = CandidateMatcher::window(NameMatch::Exact, 500);
        let novel = call("copia", "2R", 1000, 5000, false);

        let near_upstream = TargetSite::new("T", "copia", "2R", 900);
        assert!(matcher.accepts(&near_upstream, &novel));

        let near_downstream = TargetSite::new("T", "copia", "2R", 5500);
        assert!(matcher.accepts(&near_downstream, &novel));

        let too_far = TargetSite::new("T", "copia", "2R", 5600);
        assert!(!matcher.accepts(&too_far, &novel));

        // between the breakpoints but far from both
        let inside = TargetSite::new("T", "copia", "2R", 3000);
        assert!(!matcher.accepts(&inside, &novel));
    }

    #[test]
    fn test_chromosome_is_required() {
        let matcher = CandidateMatcher::window(NameMatch::Prefix, 20_000);
        let target = TargetSite::new("T", "copia", "2R", 1000);
        assert!(!matcher.accepts(&target, &call("copia", "2L", 1000, 1010, false)));
        assert!(!matcher.accepts(&target, &call("copia", "2r", 1000, 1010, false)));
    }

    #[test]
    fn test_name_match_modes() {
        let target = TargetSite::new("SX4Ch7", "1360", "2L", 150);
        let candidate = call("1360#DNA/P", "2L", 100, 200, true);

        assert!(CandidateMatcher::window(NameMatch::Prefix, 0).accepts(&target, &candidate));
        assert!(!CandidateMatcher::window(NameMatch::Exact, 0).accepts(&target, &candidate));

        let composite = TargetSite::new("SX4Ch7", "1360#DNA/P", "2L", 150);
        assert!(CandidateMatcher::window(NameMatch::Exact, 0).accepts(&composite, &candidate));

        assert!(NameMatch::Any.matches("copia", None));
        assert!(!NameMatch::Prefix.matches("copia", None));
        assert!(!NameMatch::Exact.matches("copia", None));
    }

    #[test]
    fn test_find_unique() {
        let matcher = CandidateMatcher::window(NameMatch::Prefix, 1000);
        let calls = vec![
            call("copia#LTR/Copia", "2R", 9_237_900, 9_243_100, false),
            call("copia#LTR/Copia", "3L", 9_237_900, 9_243_100, false),
            call("opus#LTR/Gypsy", "2R", 9_237_900, 9_243_100, false),
        ];
        let target = TargetSite::new("SX4Et51", "copia", "2R", 9_237_984);

        let found = matcher.find(&target, &calls).unwrap().found().unwrap();
        assert_eq!(found.chrom, "2R");
        assert_eq!(found.name, "copia#LTR/Copia");
    }

    #[test]
    fn test_find_ambiguous_is_fatal() {
        let matcher = CandidateMatcher::window(NameMatch::Prefix, 1000);
        let calls = vec![
            call("copia#LTR/Copia", "2R", 9_237_900, 9_243_100, false),
            call("copia#LTR/Copia", "2R", 9_238_500, 9_244_000, false),
        ];
        let target = TargetSite::new("SX4Et51", "copia", "2R", 9_237_984);

        let err = matcher.find(&target, &calls).unwrap_err();
        match err {
            Error::AmbiguousTarget { target, count } => {
                assert_eq!(target, "SX4Et51");
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_find_not_found_is_not_an_error() {
        let matcher = CandidateMatcher::window(NameMatch::Prefix, 1000);
        let calls = vec![call("opus", "3L", 100, 200, false)];
        let target = TargetSite::new("SX4Et51", "copia", "2R", 9_237_984);

        assert!(matches!(
            matcher.find(&target, &calls).unwrap(),
            MatchOutcome::NotFound
        ));
        let err = matcher.find_required(&target, &calls).unwrap_err();
        assert!(err.to_string().contains("SX4Et51"));
    }

    #[test]
    fn test_upstream_breakpoint_rule() {
        let matcher = CandidateMatcher::upstream_breakpoint(NameMatch::Prefix);
        let calls = vec![
            call("1360#DNA/P", "2L", 12_004_481, 12_007_889, false),
            call("1360#DNA/P", "2L", 12_004_482, 12_007_889, false),
        ];
        let target = TargetSite::new("SX4Ch7", "1360", "2L", 12_004_481);
        let found = matcher.find_required(&target, &calls).unwrap();
        assert_eq!(found.upstream_pos, 12_004_481);
    }

    #[test]
    fn test_alignment_records_use_point_window() {
        let target = TargetSite::new("SX4Et51", "copia", "2R", 9_237_984);
        let records = vec![
            record("r1", "2R", 9_237_500),
            record("r2", "2R", 9_237_483),
            record("r3|copia#LTR/Copia|50|100", "2R", 9_247_984),
            record("r4|copia#LTR/Copia|50|100", "2R", 9_247_985),
            record("r5|opus#LTR/Gypsy|50|100", "2R", 9_237_984),
        ];

        let genome_only = CandidateMatcher::window(NameMatch::Any, 500);
        let kept: Vec<_> = genome_only
            .filter(&target, &records)
            .into_iter()
            .map(|r| r.read_name.as_str())
            .collect();
        assert_eq!(kept, vec!["r1", "r5|opus#LTR/Gypsy|50|100"]);

        let te_mapped = CandidateMatcher::window(NameMatch::Prefix, 10_000);
        let kept: Vec<_> = te_mapped
            .filter(&target, &records)
            .into_iter()
            .map(|r| r.read_name.as_str())
            .collect();
        assert_eq!(kept, vec!["r3|copia#LTR/Copia|50|100"]);
    }

    #[test]
    fn test_near_breakpoints() {
        let c = call("copia", "2R", 1000, 5000, true);
        assert!(near_breakpoints(&c, 0, 1000));
        assert!(near_breakpoints(&c, 6000, 1000));
        assert!(!near_breakpoints(&c, 3000, 1000));
    }

    #[test]
    fn test_name_match_from_str() {
        assert_eq!("prefix".parse::<NameMatch>().unwrap(), NameMatch::Prefix);
        assert_eq!("exact".parse::<NameMatch>().unwrap(), NameMatch::Exact);
        assert!("any".parse::<NameMatch>().is_err());
    }
}
