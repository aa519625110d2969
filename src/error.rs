use std::path::PathBuf;

/// Errors that can occur in tesplit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    Parameter(String),

    #[error("I/O error: {source} ({path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("target catalog error: {0}")]
    Catalog(String),

    #[error("breakpoint call parsing error: {source} ({path})")]
    Calls {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[error("ambiguous target {target}: {count} candidates passed all filters")]
    AmbiguousTarget { target: String, count: usize },

    #[error("insertion {0} not found")]
    TargetNotFound(String),

    #[error("diagram error: {0}")]
    Diagram(String),

    #[error("image error: {source} ({path})")]
    Image {
        source: image::ImageError,
        path: PathBuf,
    },

    #[error("CSV error: {source} ({path})")]
    Csv { source: csv::Error, path: PathBuf },

    #[error("sequence file error: {message} ({path})")]
    Sequence { message: String, path: PathBuf },
}

impl Error {
    /// Convenience for wrapping an `io::Error` with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            source: err,
            path: PathBuf::from("<unknown>"),
        }
    }
}
