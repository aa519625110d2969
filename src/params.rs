use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::error::Error;
use crate::split::{CigarMode, SplitDirection};
use crate::target::NameMatch;

// ---------------------------------------------------------------------------
// Run mode enum
// ---------------------------------------------------------------------------

/// tesplit's `--run-mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Split-read table of breakpoint calls matched to targets
    CallTable,
    /// One diagram per target from its breakpoint call
    CallDiagrams,
    /// Genome-only alignments near each target
    SelectGenomeReads,
    /// Transposon-paired alignments near each target
    SelectTeReads,
    /// Split-read table of one target's selected reads
    ReadTable,
    /// Diagram of one target's selected reads
    ReadDiagram,
    /// Supporting read sequences across samples
    SequenceTable,
    /// Read depth of a FASTQ read set over a FASTA reference
    Coverage,
}

impl RunMode {
    pub const ALL: [RunMode; 8] = [
        RunMode::CallTable,
        RunMode::CallDiagrams,
        RunMode::SelectGenomeReads,
        RunMode::SelectTeReads,
        RunMode::ReadTable,
        RunMode::ReadDiagram,
        RunMode::SequenceTable,
        RunMode::Coverage,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::CallTable => "call-table",
            Self::CallDiagrams => "call-diagrams",
            Self::SelectGenomeReads => "select-genome-reads",
            Self::SelectTeReads => "select-te-reads",
            Self::ReadTable => "read-table",
            Self::ReadDiagram => "read-diagram",
            Self::SequenceTable => "sequence-table",
            Self::Coverage => "coverage",
        }
    }

    /// Whether the mode works on the target catalog
    pub fn uses_targets(&self) -> bool {
        *self != Self::Coverage
    }
}

impl std::str::FromStr for RunMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(RunMode::as_str).collect();
                format!("unknown run mode '{s}'; expected one of {}", names.join(", "))
            })
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Clip side
// ---------------------------------------------------------------------------

/// Which split directions a read selection keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipSide {
    #[default]
    Both,
    Upstream,
    Downstream,
}

impl ClipSide {
    pub fn keeps(&self, direction: SplitDirection) -> bool {
        match self {
            Self::Both => true,
            Self::Upstream => direction == SplitDirection::Upstream,
            Self::Downstream => direction == SplitDirection::Downstream,
        }
    }
}

impl std::str::FromStr for ClipSide {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" => Ok(Self::Both),
            "upstream" => Ok(Self::Upstream),
            "downstream" => Ok(Self::Downstream),
            _ => Err(format!(
                "unknown clip side '{s}'; expected 'both', 'upstream' or 'downstream'"
            )),
        }
    }
}

impl std::fmt::Display for ClipSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Both => write!(f, "both"),
            Self::Upstream => write!(f, "upstream"),
            Self::Downstream => write!(f, "downstream"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters struct
// ---------------------------------------------------------------------------

/// Default window around a target for breakpoint calls in `call-table`
pub const DEFAULT_CALL_CUTOFF: u64 = 20_000;
/// Default window around a call's breakpoints in `sequence-table`
pub const DEFAULT_SEQUENCE_CUTOFF: u64 = 1_000;

/// tesplit command-line parameters.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tesplit",
    about = "Classify transposon split reads and match them to known insertion sites",
    version
)]
pub struct Parameters {
    // ── Run ─────────────────────────────────────────────────────────────
    /// Run mode
    #[arg(long = "run-mode", default_value = "call-table")]
    pub run_mode: RunMode,

    // ── Targets ─────────────────────────────────────────────────────────
    /// Tab-separated target catalog: name, TE name, chromosome, position[, length]
    #[arg(long = "targets")]
    pub targets: Option<PathBuf>,

    /// Only process this target
    #[arg(long = "target-name")]
    pub target_name: Option<String>,

    // ── Inputs ──────────────────────────────────────────────────────────
    /// Breakpoint call JSON from the transposon mapper
    #[arg(long = "calls")]
    pub calls: Option<PathBuf>,

    /// Alignment text file, plain or gzip compressed
    #[arg(long = "alignments")]
    pub alignments: Option<PathBuf>,

    /// Sample directories with mapper output and genome alignments
    #[arg(long = "sample-dirs", num_args = 1..)]
    pub sample_dirs: Vec<PathBuf>,

    /// Appended to a sample directory name to label its rows
    #[arg(long = "sample-suffix", default_value = ".fastq")]
    pub sample_suffix: String,

    /// FASTQ reads for coverage, plain or gzip compressed; - for stdin
    #[arg(long = "reads")]
    pub reads: Option<PathBuf>,

    /// FASTA reference for coverage, plain or gzip compressed
    #[arg(long = "reference")]
    pub reference: Option<PathBuf>,

    // ── Output ──────────────────────────────────────────────────────────
    /// Prefix of every output file name
    #[arg(long = "out-prefix", default_value = "./")]
    pub out_prefix: PathBuf,

    // ── Matching ────────────────────────────────────────────────────────
    /// Transposon name comparison: prefix or exact
    #[arg(long = "te-name-match", default_value = "prefix")]
    pub te_name_match: NameMatch,

    /// Window (bp) for breakpoint calls [default: 20000, 1000 in sequence-table]
    #[arg(long = "call-cutoff")]
    pub call_cutoff: Option<u64>,

    /// Window (bp) for genome-only alignments
    #[arg(long = "genome-read-cutoff", default_value_t = 500)]
    pub genome_read_cutoff: u64,

    /// Window (bp) for transposon-paired alignments
    #[arg(long = "te-read-cutoff", default_value_t = 10_000)]
    pub te_read_cutoff: u64,

    // ── Split reads ─────────────────────────────────────────────────────
    /// CIGAR classification: strict or loose
    #[arg(long = "cigar-mode", default_value = "strict")]
    pub cigar_mode: CigarMode,

    /// Split directions kept by select-genome-reads, read-table and
    /// read-diagram: both, upstream or downstream (sequence-table always
    /// keeps both)
    #[arg(long = "clip-side", default_value = "both")]
    pub clip_side: ClipSide,

    /// Required read length in sequence-table; 0 disables the check
    #[arg(long = "read-length", default_value_t = 150)]
    pub read_length: u64,

    /// Insertion length (bp) drawn in read-diagram
    #[arg(long = "insertion-length")]
    pub insertion_length: Option<u64>,
}

impl Parameters {
    /// Breakpoint call window for the current run mode
    pub fn call_cutoff(&self) -> u64 {
        self.call_cutoff.unwrap_or(match self.run_mode {
            RunMode::SequenceTable => DEFAULT_SEQUENCE_CUTOFF,
            _ => DEFAULT_CALL_CUTOFF,
        })
    }

    /// `--out-prefix` followed by `file_name`
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        let mut path: OsString = self.out_prefix.clone().into_os_string();
        path.push(file_name);
        PathBuf::from(path)
    }

    /// Validate parameter combinations that clap alone cannot enforce.
    pub fn validate(&self) -> Result<(), Error> {
        if self.run_mode.uses_targets() && self.targets.is_none() {
            return Err(Error::Parameter(format!(
                "--targets is required when --run-mode {}",
                self.run_mode
            )));
        }

        match self.run_mode {
            RunMode::CallTable | RunMode::CallDiagrams if self.calls.is_none() => {
                return Err(Error::Parameter(format!(
                    "--calls is required when --run-mode {}",
                    self.run_mode
                )));
            }
            RunMode::SelectGenomeReads
            | RunMode::SelectTeReads
            | RunMode::ReadTable
            | RunMode::ReadDiagram
                if self.alignments.is_none() =>
            {
                return Err(Error::Parameter(format!(
                    "--alignments is required when --run-mode {}",
                    self.run_mode
                )));
            }
            RunMode::SequenceTable if self.sample_dirs.is_empty() => {
                return Err(Error::Parameter(
                    "--sample-dirs is required when --run-mode sequence-table".into(),
                ));
            }
            RunMode::Coverage if self.reads.is_none() || self.reference.is_none() => {
                return Err(Error::Parameter(
                    "--reads and --reference are required when --run-mode coverage".into(),
                ));
            }
            _ => {}
        }

        if self.run_mode == RunMode::ReadDiagram {
            match self.insertion_length {
                None => {
                    return Err(Error::Parameter(
                        "--insertion-length is required when --run-mode read-diagram".into(),
                    ))
                }
                Some(0) => {
                    return Err(Error::Parameter(
                        "--insertion-length must be >= 1".into(),
                    ))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
