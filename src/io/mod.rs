pub mod calls;
pub mod sam;
pub mod sequence;

pub use calls::{load_calls, InsertionCall, Orientation};
pub use sam::{AlignmentReader, AlignmentRecord, TeAlignment};
pub use sequence::{count_bases, SequenceFormat};

use crate::error::Error;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Open an input file, decompressing `.gz`/`.gzip` by extension.
/// `-` reads standard input.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>, Error> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }

    let file = File::open(path).map_err(|e| Error::io(e, path))?;

    let path_str = path.to_string_lossy();
    let is_gzipped = path_str.ends_with(".gz") || path_str.ends_with(".gzip");

    Ok(if is_gzipped {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    })
}
