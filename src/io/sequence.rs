/// Base counting over FASTA references and FASTQ read sets
use crate::error::Error;
use crate::io::open_input;
use bio::io::{fasta, fastq};
use log::debug;
use std::path::Path;

/// Record layout of a sequence file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFormat {
    Fasta,
    Fastq,
}

/// Total number of bases over every record of `path`.
///
/// Plain and gzip-compressed files are accepted; `-` reads standard input.
pub fn count_bases(path: &Path, format: SequenceFormat) -> Result<u64, Error> {
    let input = open_input(path)?;
    let invalid = |message: String| Error::Sequence {
        message,
        path: path.to_path_buf(),
    };

    let mut records = 0u64;
    let mut bases = 0u64;
    match format {
        SequenceFormat::Fasta => {
            for record in fasta::Reader::new(input).records() {
                let record = record.map_err(|e| invalid(e.to_string()))?;
                record.check().map_err(|e| invalid(format!("{}: {e}", record.id())))?;
                bases += record.seq().len() as u64;
                records += 1;
            }
        }
        SequenceFormat::Fastq => {
            for record in fastq::Reader::new(input).records() {
                let record = record.map_err(|e| invalid(e.to_string()))?;
                bases += record.seq().len() as u64;
                records += 1;
            }
        }
    }

    debug!("{}: {records} records, {bases} bases", path.display());
    Ok(bases)
}
