use std::{collections::HashMap, path::Path, sync::Arc};

use serde::Deserialize;

use crate::{
    database::read_json,
    dictionary::{KanjiCharacter, KanjiDictionary},
    errors::{KanjiError, LoadError},
};

#[derive(Deserialize)]
struct KanjidicFile {
    #[serde(default)]
    version: String,
    characters: Vec<KanjiCharacter>,
}

/// KANJIDIC2 (JSON export) loaded into memory, keyed by character.
#[derive(Debug, Default)]
pub struct KanjidicDatabase {
    characters: HashMap<char, Arc<KanjiCharacter>>,
}

impl KanjidicDatabase {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file: KanjidicFile = read_json(path)?;
        log::info!(
            "loaded {} kanji (kanjidic {}) from {}",
            file.characters.len(),
            file.version,
            path.display()
        );
        Ok(Self::from_characters(file.characters))
    }

    /// Entries whose literal is not exactly one character are dropped.
    pub fn from_characters(characters: impl IntoIterator<Item = KanjiCharacter>) -> Self {
        let characters = characters
            .into_iter()
            .filter_map(|character| {
                let mut chars = character.literal.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some((c, Arc::new(character))),
                    _ => {
                        log::warn!("skipping kanjidic literal `{}`", character.literal);
                        None
                    }
                }
            })
            .collect();
        Self { characters }
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

impl KanjiDictionary for KanjidicDatabase {
    fn lookup_kanji(&self, literal: char) -> Result<Option<Arc<KanjiCharacter>>, KanjiError> {
        Ok(self.characters.get(&literal).cloned())
    }
}
