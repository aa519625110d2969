/// Tab-delimited alignment reader (plain or gzip compressed)
use crate::error::Error;
use crate::io::open_input;
use crate::stats::ScanStats;
use log::debug;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Transposon-side alignment encoded in a composite read identifier:
/// `{query}|{te_family}|{te_match_len}|{te_clip_len}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeAlignment {
    pub query: String,
    pub family: String,
    pub match_len: u64,
    pub clip_len: u64,
}

impl TeAlignment {
    /// Parse a composite read identifier; `None` for plain identifiers.
    pub fn parse(read_name: &str) -> Option<Self> {
        let mut fields = read_name.split('|');
        let query = fields.next()?;
        let family = fields.next()?;
        let match_len = fields.next()?.parse().ok()?;
        let clip_len = fields.next()?.parse().ok()?;
        if fields.next().is_some() || family.is_empty() {
            return None;
        }
        Some(Self {
            query: query.to_string(),
            family: family.to_string(),
            match_len,
            clip_len,
        })
    }
}

/// One alignment line
#[derive(Debug, Clone)]
pub struct AlignmentRecord {
    /// Read identifier (field 0)
    pub read_name: String,
    /// Reference name (field 2)
    pub chrom: String,
    /// 1-based leftmost mapping position (field 3)
    pub pos: u64,
    /// Alignment-operation string (field 5)
    pub cigar: String,
    /// Read sequence (field 9), if present
    pub sequence: Option<String>,
    /// Transposon alignment from a composite read identifier
    pub te: Option<TeAlignment>,
    /// The line as read, without its line terminator
    pub line: String,
}

impl AlignmentRecord {
    /// Parse one non-header line; `None` when the line is malformed.
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 6 {
            return None;
        }
        let pos = fields[3].trim().parse().ok()?;
        let sequence = fields
            .get(9)
            .map(|s| s.trim_end())
            .filter(|s| !s.is_empty() && *s != "*")
            .map(str::to_string);

        Some(Self {
            read_name: fields[0].to_string(),
            chrom: fields[2].to_string(),
            pos,
            cigar: fields[5].to_string(),
            sequence,
            te: TeAlignment::parse(fields[0]),
            line: line.to_string(),
        })
    }

    /// Transposon family from the composite identifier, if any
    pub fn te_family(&self) -> Option<&str> {
        self.te.as_ref().map(|te| te.family.as_str())
    }
}

/// Streaming reader over alignment records.
///
/// Header lines (starting with `@`) and malformed lines are skipped and
/// counted in [`ScanStats`].
pub struct AlignmentReader {
    inner: Box<dyn BufRead>,
    path: PathBuf,
    buf: String,
    stats: ScanStats,
}

impl AlignmentReader {
    /// Open an alignment file, decompressing `.gz`/`.gzip` by extension
    pub fn open(path: &Path) -> Result<Self, Error> {
        Ok(Self {
            inner: open_input(path)?,
            path: path.to_path_buf(),
            buf: String::new(),
            stats: ScanStats::new(),
        })
    }

    /// Read the next usable record, or `None` at end of file
    pub fn next_record(&mut self) -> Result<Option<AlignmentRecord>, Error> {
        loop {
            self.buf.clear();
            let n = self
                .inner
                .read_line(&mut self.buf)
                .map_err(|e| Error::io(e, &self.path))?;
            if n == 0 {
                return Ok(None);
            }
            self.stats.lines += 1;

            let line = self.buf.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }
            if line.starts_with('@') {
                self.stats.headers += 1;
                continue;
            }

            match AlignmentRecord::parse(line) {
                Some(record) => return Ok(Some(record)),
                None => {
                    self.stats.malformed += 1;
                    debug!(
                        "{}:{}: skipping malformed alignment line",
                        self.path.display(),
                        self.stats.lines
                    );
                }
            }
        }
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut ScanStats {
        &mut self.stats
    }
}

impl Iterator for AlignmentReader {
    type Item = Result<AlignmentRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
