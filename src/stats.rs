/// Scan and match statistics tracking and reporting
use log::info;
use std::fmt;

/// Tracks what happened to each line of an alignment scan
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ScanStats {
    /// Lines read, including headers
    pub lines: u64,
    /// Header lines skipped
    pub headers: u64,
    /// Lines with too few fields or an unparseable position
    pub malformed: u64,
    /// Records whose CIGAR is not a single-clip split
    pub rejected_cigar: u64,
    /// Records whose genome and transposon alignments disagree
    pub inconsistent: u64,
    /// Records whose sequence is not the expected read length
    pub wrong_length: u64,
    /// Records kept for output
    pub kept: u64,
}

impl ScanStats {
    /// Create new statistics tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of alignment records (non-header, well-formed lines)
    pub fn records(&self) -> u64 {
        self.lines.saturating_sub(self.headers + self.malformed)
    }

    /// Print summary statistics to log
    pub fn print_summary(&self, label: &str) {
        if self.lines == 0 {
            info!("{label}: no lines read");
            return;
        }

        info!("=== {label} ===");
        info!("Lines read: {}", self.lines);
        info!("Header lines: {}", self.headers);
        if self.malformed > 0 {
            info!("Malformed records skipped: {}", self.malformed);
        }
        if self.rejected_cigar > 0 {
            info!("Records without a single-clip split: {}", self.rejected_cigar);
        }
        if self.inconsistent > 0 {
            info!(
                "Records with inconsistent transposon alignment: {}",
                self.inconsistent
            );
        }
        if self.wrong_length > 0 {
            info!("Records with unexpected read length: {}", self.wrong_length);
        }
        info!(
            "Records kept: {} ({:.2}% of {} records)",
            self.kept,
            self.kept_percent(),
            self.records()
        );
    }

    /// Percentage of records kept
    pub fn kept_percent(&self) -> f64 {
        let records = self.records();
        if records == 0 {
            0.0
        } else {
            100.0 * self.kept as f64 / records as f64
        }
    }
}

/// Per-source count of targets with and without evidence
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct MatchSummary {
    pub matched: u64,
    pub missing: Vec<String>,
}

impl MatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_match(&mut self) {
        self.matched += 1;
    }

    pub fn record_missing(&mut self, target: &str) {
        info!("target {target} has no matching insertion call");
        self.missing.push(target.to_string());
    }

    pub fn print_summary(&self, source: &str) {
        info!(
            "{}: {} of {} targets matched",
            source,
            self.matched,
            self.matched + self.missing.len() as u64
        );
        if !self.missing.is_empty() {
            info!("{}: missing {}", source, self.missing.join(", "));
        }
    }
}

/// Sequencing depth of a read set over a reference
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageReport {
    pub reference_nt: u64,
    pub reads_nt: u64,
}

impl CoverageReport {
    /// Read bases per reference base; `None` for an empty reference
    pub fn depth(&self) -> Option<f64> {
        (self.reference_nt > 0).then(|| self.reads_nt as f64 / self.reference_nt as f64)
    }

    pub fn print_summary(&self) {
        info!("Reference bases: {}", self.reference_nt);
        info!("Read bases: {}", self.reads_nt);
        if let Some(depth) = self.depth() {
            info!("Coverage: {depth:.2}x");
        }
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "reference nt: {}", self.reference_nt)?;
        writeln!(f, "reads nt: {}", self.reads_nt)?;
        match self.depth() {
            Some(depth) => writeln!(f, "coverage: {depth}x"),
            None => writeln!(f, "coverage: NA"),
        }
    }
}
