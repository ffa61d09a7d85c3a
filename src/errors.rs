use std::{path::PathBuf, time::Duration};
use thiserror::Error;

use crate::language::transformer::ConditionError;

/// Failures while loading the resources an [crate::Annotator] needs.
///
/// These are startup-fatal: an annotator is never constructed from
/// partially loaded data.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to open resource file: `{path}`\nreason: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to deserialize resource file: `{path}`\nreason: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no rows in particle catalog, is the file empty?\n         file: {0}")]
    EmptyCatalog(PathBuf),
    #[error("invalid deinflection rules: {0}")]
    Transforms(#[from] ConditionError),
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Raised by a [crate::dictionary::DictionaryIndex] backend. Fails the
/// whole request as [AnnotateError::Dictionary].
#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("dictionary index is unavailable: {0}")]
    Unavailable(String),
    #[error("prefix query `{prefix}` failed: {reason}")]
    Query { prefix: String, reason: String },
}

/// Raised by a [crate::dictionary::FuriganaDatabase] backend. Fails the
/// whole request as [AnnotateError::Furigana].
#[derive(Error, Debug)]
pub enum FuriganaError {
    #[error("furigana database is unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum KanjiError {
    #[error("kanji dictionary is unavailable: {0}")]
    Unavailable(String),
}

/// Per-request failure of either annotation entry point.
#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("(-)[<annotate::dictionary>] -> {0}")]
    Dictionary(#[from] DictionaryError),
    #[error("(-)[<annotate::furigana>] -> {0}")]
    Furigana(#[from] FuriganaError),
    #[error("(-)[<annotate::kanji>] -> {0}")]
    Kanji(#[from] KanjiError),
    #[error("sentence annotation exceeded its deadline of {deadline:?}")]
    DeadlineExceeded { deadline: Duration },
}
