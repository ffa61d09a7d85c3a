use std::{collections::HashMap, path::Path};

use crate::{
    database::read_json,
    dictionary::{FuriganaDatabase, FuriganaEntry},
    errors::{FuriganaError, LoadError},
};

/// JmdictFurigana loaded into memory, keyed by written form.
#[derive(Debug, Default)]
pub struct JmdictFuriganaDatabase {
    entries: HashMap<String, Vec<FuriganaEntry>>,
}

impl JmdictFuriganaDatabase {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let entries: Vec<FuriganaEntry> = read_json(path)?;
        log::info!("loaded {} furigana entries from {}", entries.len(), path.display());
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = FuriganaEntry>) -> Self {
        let mut map: HashMap<String, Vec<FuriganaEntry>> = HashMap::new();
        for entry in entries {
            map.entry(entry.text.clone()).or_default().push(entry);
        }
        Self { entries: map }
    }
}

impl FuriganaDatabase for JmdictFuriganaDatabase {
    fn lookup(&self, text: &str) -> Result<Vec<FuriganaEntry>, FuriganaError> {
        Ok(self.entries.get(text).cloned().unwrap_or_default())
    }
}
