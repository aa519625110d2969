/// Breakpoint call documents produced by the transposon mapper
use crate::error::Error;
use crate::split::SplitReadRange;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Insertion orientation relative to the reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Orientation {
    PlusPlus,
    /// Any other orientation label reported by the mapper
    Other(String),
}

impl Orientation {
    /// Strand pair symbol used in reports
    pub fn symbol(&self) -> &'static str {
        match self {
            Orientation::PlusPlus => "+/+",
            Orientation::Other(_) => "+/-",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for Orientation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(match label.as_str() {
            "PlusPlus" => Orientation::PlusPlus,
            _ => Orientation::Other(label),
        })
    }
}

/// A breakpoint call with its supporting split reads
#[derive(Debug, Clone, Deserialize)]
pub struct InsertionCall {
    /// Set from the sublist the call was read from, not from the record
    #[serde(skip)]
    pub is_reference: bool,
    /// Transposon name as reported by the mapper
    pub name: String,
    pub chrom: String,
    pub upstream_pos: u64,
    pub downstream_pos: u64,
    pub orientation: Orientation,
    pub upstream_reads: Vec<SplitReadRange>,
    pub downstream_reads: Vec<SplitReadRange>,
}

/// Calls for one chromosome
#[derive(Debug, Deserialize)]
struct ChromosomeCalls {
    #[serde(default)]
    reference: Vec<InsertionCall>,
    #[serde(default)]
    non_reference: Vec<InsertionCall>,
}

/// Flatten a call document, non-reference calls of each chromosome first.
fn flatten(chromosomes: Vec<ChromosomeCalls>) -> Vec<InsertionCall> {
    let mut calls = Vec::new();
    for chrom in chromosomes {
        calls.extend(chrom.non_reference.into_iter().map(|mut call| {
            call.is_reference = false;
            call
        }));
        calls.extend(chrom.reference.into_iter().map(|mut call| {
            call.is_reference = true;
            call
        }));
    }
    calls
}

/// Parse a call document from a string
pub fn parse_calls(json: &str) -> Result<Vec<InsertionCall>, serde_json::Error> {
    let chromosomes: Vec<ChromosomeCalls> = serde_json::from_str(json)?;
    Ok(flatten(chromosomes))
}

/// Load a call document from disk
pub fn load_calls(path: &Path) -> Result<Vec<InsertionCall>, Error> {
    let file = File::open(path).map_err(|e| Error::io(e, path))?;
    let chromosomes: Vec<ChromosomeCalls> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Calls {
            source,
            path: path.to_path_buf(),
        })?;
    Ok(flatten(chromosomes))
}
