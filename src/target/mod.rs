// Target sites and candidate matching

pub mod catalog;
pub mod matcher;

pub use catalog::{TargetCatalog, TargetSite};
pub use matcher::{
    near_breakpoints, Candidate, CandidateMatcher, Locus, MatchOutcome, NameMatch, PositionRule,
};
