use std::io;
use std::path::Path;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResubError>;

#[derive(Error, Debug)]
pub enum ResubError {
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("unknown encoding '{0}'")]
    UnknownEncoding(String),

    #[error("cannot decode {path} as {encoding}")]
    Decode { path: String, encoding: String },

    #[error("no candidate encoding could decode {path}")]
    NoEncodingMatched { path: String },

    #[error("content has characters not representable in {encoding}")]
    Unencodable { encoding: String },

    #[error("rule {index} ('{alias}') is invalid: {reason}")]
    InvalidRule {
        index: usize,
        alias: String,
        reason: String,
    },

    #[error("failed to parse rule file {path}: {reason}")]
    RuleParse { path: String, reason: String },

    #[error("staging area error: {0}")]
    Staging(#[source] io::Error),
}

impl ResubError {
    pub fn file_read(path: &Path, source: io::Error) -> Self {
        ResubError::FileRead {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn file_write(path: &Path, source: io::Error) -> Self {
        ResubError::FileWrite {
            path: path.display().to_string(),
            source,
        }
    }
}
