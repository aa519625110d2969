/// CIGAR parsing and single-clip split classification
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref UPSTREAM_REGEX: Regex = Regex::new(r"^(\d+)M(\d+)[SH]$").unwrap();
    static ref DOWNSTREAM_REGEX: Regex = Regex::new(r"^(\d+)[SH](\d+)M$").unwrap();
}

/// CIGAR operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    /// M: match/mismatch
    Match(u64),
    /// =: exact match
    Equal(u64),
    /// X: mismatch
    Diff(u64),
    /// I: insertion to reference
    Ins(u64),
    /// D: deletion from reference
    Del(u64),
    /// N: skipped reference region
    RefSkip(u64),
    /// S: soft clip (clipped sequence present in read)
    SoftClip(u64),
    /// H: hard clip (clipped sequence not present)
    HardClip(u64),
}

impl CigarOp {
    fn from_parts(len: u64, op: u8) -> Option<Self> {
        Some(match op {
            b'M' => CigarOp::Match(len),
            b'=' => CigarOp::Equal(len),
            b'X' => CigarOp::Diff(len),
            b'I' => CigarOp::Ins(len),
            b'D' => CigarOp::Del(len),
            b'N' => CigarOp::RefSkip(len),
            b'S' => CigarOp::SoftClip(len),
            b'H' => CigarOp::HardClip(len),
            _ => return None,
        })
    }

    /// Get the operation character
    pub fn op_char(&self) -> char {
        match self {
            CigarOp::Match(_) => 'M',
            CigarOp::Equal(_) => '=',
            CigarOp::Diff(_) => 'X',
            CigarOp::Ins(_) => 'I',
            CigarOp::Del(_) => 'D',
            CigarOp::RefSkip(_) => 'N',
            CigarOp::SoftClip(_) => 'S',
            CigarOp::HardClip(_) => 'H',
        }
    }

    /// Get the operation length
    pub fn len(&self) -> u64 {
        match self {
            CigarOp::Match(n)
            | CigarOp::Equal(n)
            | CigarOp::Diff(n)
            | CigarOp::Ins(n)
            | CigarOp::Del(n)
            | CigarOp::RefSkip(n)
            | CigarOp::SoftClip(n)
            | CigarOp::HardClip(n) => *n,
        }
    }

    /// Check if operation is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len(), self.op_char())
    }
}

/// Parse the longest well-formed leading run of operations.
///
/// Returns the parsed operations and whether the whole string was consumed.
/// Parsing stops at the first character that does not continue a
/// `<len><op>` pair, or when a length overflows.
pub fn parse_cigar_prefix(cigar: &str) -> (Vec<CigarOp>, bool) {
    let mut ops = Vec::new();
    let mut len: Option<u64> = None;

    for &byte in cigar.as_bytes() {
        if byte.is_ascii_digit() {
            let digit = u64::from(byte - b'0');
            match len.unwrap_or(0).checked_mul(10).and_then(|n| n.checked_add(digit)) {
                Some(n) => len = Some(n),
                None => return (ops, false),
            }
            continue;
        }
        match len.take().and_then(|n| CigarOp::from_parts(n, byte)) {
            Some(op) => ops.push(op),
            None => return (ops, false),
        }
    }

    let consumed = len.is_none();
    (ops, consumed)
}

/// How strictly an operation string must match a single-clip split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CigarMode {
    /// The whole string must be `<m>M<c>(S|H)` or `<c>(S|H)<m>M`.
    #[default]
    Strict,
    /// Trailing non-operation text is ignored and adjacent runs of the
    /// same kind are merged before the one-match/one-clip test.
    Loose,
}

impl std::str::FromStr for CigarMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "loose" => Ok(Self::Loose),
            _ => Err(format!(
                "unknown CIGAR mode '{s}'; expected 'strict' or 'loose'"
            )),
        }
    }
}

impl fmt::Display for CigarMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Loose => write!(f, "loose"),
        }
    }
}

/// Which side of the breakpoint the matched segment lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitDirection {
    /// match-then-clip
    Upstream,
    /// clip-then-match
    Downstream,
}

impl fmt::Display for SplitDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upstream => write!(f, "Upstream"),
            Self::Downstream => write!(f, "Downstream"),
        }
    }
}

/// A read that splits cleanly into one matched and one clipped run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitRead {
    pub match_len: u64,
    pub clip_len: u64,
    pub direction: SplitDirection,
}

impl SplitRead {
    pub fn new(match_len: u64, clip_len: u64, direction: SplitDirection) -> Self {
        Self {
            match_len,
            clip_len,
            direction,
        }
    }
}

/// Classify an alignment-operation string as a single-clip split read.
///
/// Returns `None` for every other shape (multiple runs, indels, unclipped
/// alignments, zero-length runs, reads whose total length overflows,
/// unparseable text). Callers skip such records; a rejection is never an
/// error.
pub fn classify(cigar: &str, mode: CigarMode) -> Option<SplitRead> {
    let split = match mode {
        CigarMode::Strict => classify_strict(cigar),
        CigarMode::Loose => classify_loose(cigar),
    }?;
    split.match_len.checked_add(split.clip_len)?;
    (split.match_len > 0 && split.clip_len > 0).then_some(split)
}

fn classify_strict(cigar: &str) -> Option<SplitRead> {
    if let Some(caps) = UPSTREAM_REGEX.captures(cigar) {
        let match_len = caps[1].parse().ok()?;
        let clip_len = caps[2].parse().ok()?;
        return Some(SplitRead::new(match_len, clip_len, SplitDirection::Upstream));
    }

    let caps = DOWNSTREAM_REGEX.captures(cigar)?;
    let clip_len = caps[1].parse().ok()?;
    let match_len = caps[2].parse().ok()?;
    Some(SplitRead::new(
        match_len,
        clip_len,
        SplitDirection::Downstream,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    Match(u64),
    Clip(u64),
}

/// Collapse operations into match and clip runs; `None` on any
/// operation that is neither.
fn merge_runs(ops: &[CigarOp]) -> Option<Vec<Run>> {
    let mut runs: Vec<Run> = Vec::with_capacity(ops.len());
    for op in ops {
        let run = match op {
            CigarOp::Match(n) | CigarOp::Equal(n) | CigarOp::Diff(n) => Run::Match(*n),
            CigarOp::SoftClip(n) | CigarOp::HardClip(n) => Run::Clip(*n),
            CigarOp::Ins(_) | CigarOp::Del(_) | CigarOp::RefSkip(_) => return None,
        };
        match (runs.last_mut(), run) {
            (Some(Run::Match(total)), Run::Match(n)) | (Some(Run::Clip(total)), Run::Clip(n)) => {
                *total = total.checked_add(n)?;
            }
            _ => runs.push(run),
        }
    }
    Some(runs)
}

fn classify_loose(cigar: &str) -> Option<SplitRead> {
    let (ops, _) = parse_cigar_prefix(cigar.trim());
    match merge_runs(&ops)?.as_slice() {
        [Run::Match(m), Run::Clip(c)] => Some(SplitRead::new(*m, *c, SplitDirection::Upstream)),
        [Run::Clip(c), Run::Match(m)] => Some(SplitRead::new(*m, *c, SplitDirection::Downstream)),
        _ => None,
    }
}
