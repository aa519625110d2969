// Projection of split lengths onto transposon/genome coordinate ranges

use serde::{Deserialize, Serialize};

use crate::io::sam::TeAlignment;
use crate::split::cigar::{SplitDirection, SplitRead};

/// How one supporting read divides between transposon and genome sequence.
///
/// Both ranges are 1-based and inclusive, in read coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitReadRange {
    pub te_range: (u64, u64),
    pub genome_range: (u64, u64),
}

impl SplitReadRange {
    /// Number of read bases on the transposon side
    pub fn te_len(&self) -> u64 {
        span_len(self.te_range)
    }

    /// Number of read bases on the genome side
    pub fn genome_len(&self) -> u64 {
        span_len(self.genome_range)
    }
}

/// Inclusive length; inverted ranges are empty and `(0, u64::MAX)` saturates.
fn span_len((start, end): (u64, u64)) -> u64 {
    if end < start {
        0
    } else {
        (end - start).saturating_add(1)
    }
}

/// Project a classified split read onto its coordinate ranges.
///
/// Upstream reads start with the genome-matched segment; downstream reads
/// start with the clipped transposon segment. `classify` only yields splits
/// whose total length fits in a `u64`.
pub fn project(split: &SplitRead) -> SplitReadRange {
    let m = split.match_len;
    let c = split.clip_len;
    match split.direction {
        SplitDirection::Upstream => SplitReadRange {
            genome_range: (1, m),
            te_range: (m + 1, m + c),
        },
        SplitDirection::Downstream => SplitReadRange {
            te_range: (1, c),
            genome_range: (c + 1, c + m),
        },
    }
}

/// Check that a genome-side split and the transposon-side alignment recorded
/// in the read identifier describe the same breakpoint event.
///
/// The bases matched to the genome must be exactly the bases clipped by the
/// transposon alignment, and vice versa.
pub fn is_consistent(genome: &SplitRead, te: &TeAlignment) -> bool {
    genome.match_len == te.clip_len && genome.clip_len == te.match_len
}
