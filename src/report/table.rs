/// Comma-separated report writers
///
/// Split-read table: one row per matched target followed by one row per
/// pair of supporting reads (upstream and downstream zipped, the shorter
/// side padded with empty fields). Every row has 15 columns:
/// 1. Name
/// 2. TE name
/// 3. Chromosome
/// 4. Upstream position
/// 5. Downstream position
/// 6. Orientation (+/+ or +/-)
/// 7. reference / non-reference
/// 8-11. Upstream read TE range start/end, genome range start/end
/// 12-15. Downstream read TE range start/end, genome range start/end
use crate::error::Error;
use crate::io::InsertionCall;
use crate::split::{SplitDirection, SplitReadRange};
use crate::target::TargetSite;
use csv::{Terminator, WriterBuilder};
use std::fs::File;
use std::path::{Path, PathBuf};

const SUMMARY_COLUMNS: usize = 7;
const COLUMNS: usize = SUMMARY_COLUMNS + 8;

pub const SPLIT_READ_HEADER: [&str; COLUMNS] = [
    "Name",
    "TE Name",
    "Chromosome",
    "Upstream Position",
    "Downstream Position",
    "Orientation",
    "Reference?",
    "Upstream Reads (TE Range)",
    "",
    "Upstream Reads (Genome Range)",
    "",
    "Downstream Reads (TE Range)",
    "",
    "Downstream Reads (Genome Range)",
    "",
];

pub const SEQUENCE_HEADER: [&str; 5] = [
    "FASTQ File Name",
    "Insertion Line Name",
    "Natural TE",
    "Match End",
    "Sequence",
];

/// CSV file writer with `\n` line endings and quoting only where needed
struct CsvFile {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl CsvFile {
    fn create(path: &Path) -> Result<Self, Error> {
        let writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_path(path)
            .map_err(|source| Error::Csv {
                source,
                path: path.to_path_buf(),
            })?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
        })
    }

    fn write_row<I, T>(&mut self, fields: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(fields)
            .map_err(|source| Error::Csv {
                source,
                path: self.path.clone(),
            })
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush().map_err(|e| Error::io(e, &self.path))
    }
}

/// One matched insertion as it appears in the split-read table
#[derive(Debug, Clone)]
pub struct TableEntry<'a> {
    pub target: &'a str,
    pub te_name: &'a str,
    pub chrom: &'a str,
    pub upstream_pos: Option<u64>,
    pub downstream_pos: Option<u64>,
    pub orientation: &'static str,
    pub is_reference: bool,
    pub upstream_reads: &'a [SplitReadRange],
    pub downstream_reads: &'a [SplitReadRange],
}

impl<'a> TableEntry<'a> {
    /// Entry for a target matched to a breakpoint call
    pub fn from_call(target: &'a TargetSite, call: &'a InsertionCall) -> Self {
        Self {
            target: &target.name,
            te_name: &call.name,
            chrom: &call.chrom,
            upstream_pos: Some(call.upstream_pos),
            downstream_pos: Some(call.downstream_pos),
            orientation: call.orientation.symbol(),
            is_reference: call.is_reference,
            upstream_reads: &call.upstream_reads,
            downstream_reads: &call.downstream_reads,
        }
    }

    /// Entry for a target's own split reads: the target position fills the
    /// upstream column and the orientation is assumed `+/+`.
    pub fn from_target(
        target: &'a TargetSite,
        upstream_reads: &'a [SplitReadRange],
        downstream_reads: &'a [SplitReadRange],
    ) -> Self {
        Self {
            target: &target.name,
            te_name: &target.te_name,
            chrom: &target.chrom,
            upstream_pos: Some(target.pos),
            downstream_pos: None,
            orientation: "+/+",
            is_reference: false,
            upstream_reads,
            downstream_reads,
        }
    }

    fn summary_fields(&self) -> Vec<String> {
        vec![
            self.target.to_string(),
            self.te_name.to_string(),
            self.chrom.to_string(),
            self.upstream_pos.map(|p| p.to_string()).unwrap_or_default(),
            self.downstream_pos.map(|p| p.to_string()).unwrap_or_default(),
            self.orientation.to_string(),
            if self.is_reference {
                "reference".to_string()
            } else {
                "non-reference".to_string()
            },
        ]
    }
}

fn range_fields(read: Option<&SplitReadRange>) -> [String; 4] {
    match read {
        Some(r) => [
            r.te_range.0.to_string(),
            r.te_range.1.to_string(),
            r.genome_range.0.to_string(),
            r.genome_range.1.to_string(),
        ],
        None => Default::default(),
    }
}

/// Writer for the split-read table
pub struct SplitReadTable {
    file: CsvFile,
}

impl SplitReadTable {
    /// Create the table file and write its header row
    pub fn create(path: &Path) -> Result<Self, Error> {
        let mut file = CsvFile::create(path)?;
        file.write_row(SPLIT_READ_HEADER)?;
        Ok(Self { file })
    }

    /// Write the summary row and the zipped supporting-read rows
    pub fn write_entry(&mut self, entry: &TableEntry<'_>) -> Result<(), Error> {
        let mut summary = entry.summary_fields();
        summary.resize(COLUMNS, String::new());
        self.file.write_row(&summary)?;

        let n_rows = entry.upstream_reads.len().max(entry.downstream_reads.len());
        for i in 0..n_rows {
            let mut fields = vec![String::new(); SUMMARY_COLUMNS];
            fields.extend(range_fields(entry.upstream_reads.get(i)));
            fields.extend(range_fields(entry.downstream_reads.get(i)));
            self.file.write_row(&fields)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.file.flush()
    }
}

/// One supporting read of the sequence table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRow {
    pub sample: String,
    pub insertion: String,
    pub natural_te: String,
    pub direction: SplitDirection,
    pub sequence: String,
}

/// Write the sequence table to `path`
pub fn write_sequence_table(path: &Path, rows: &[SequenceRow]) -> Result<(), Error> {
    let mut file = CsvFile::create(path)?;
    file.write_row(SEQUENCE_HEADER)?;
    for row in rows {
        let direction = row.direction.to_string();
        file.write_row([
            row.sample.as_str(),
            &row.insertion,
            &row.natural_te,
            &direction,
            &row.sequence,
        ])?;
    }
    file.flush()
}
