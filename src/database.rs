use std::{fs, path::Path};

use serde::de::DeserializeOwned;

use crate::errors::LoadError;

pub mod dictionary_database;
pub mod furigana_database;
pub mod kanjidic_database;

/// Reads a whole JSON resource, tolerating a leading byte-order mark
/// (JmdictFurigana ships with one).
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    serde_json::from_str(text).map_err(|e| LoadError::json(path, e))
}
