use std::path::PathBuf;

use thiserror::Error;

/// A scene document that could not be read into instances. Always fatal for
/// the whole file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{file}:{line}: attribute line has no preceding header")]
    OrphanAttribute { file: String, line: usize },

    #[error("{file}:{line}: unrecognized attribute text `{text}`")]
    Unrecognized {
        file: String,
        line: usize,
        text: String,
    },

    #[error("{file}:{line}: struct `{name}` is never closed")]
    UnclosedStruct {
        file: String,
        line: usize,
        name: String,
    },
}

impl ParseError {
    /// 1-based line the failure was detected on.
    pub fn line(&self) -> usize {
        match self {
            Self::OrphanAttribute { line, .. }
            | Self::Unrecognized { line, .. }
            | Self::UnclosedStruct { line, .. } => *line,
        }
    }

    pub fn file(&self) -> &str {
        match self {
            Self::OrphanAttribute { file, .. }
            | Self::Unrecognized { file, .. }
            | Self::UnclosedStruct { file, .. } => file,
        }
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
