//! Entry types of the JMdict-simplified and KANJIDIC2 formats and the
//! contracts of the external lookup services the annotator consumes.

use std::{fmt, sync::Arc};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::errors::{DictionaryError, FuriganaError, KanjiError};

/// JMdict part-of-speech tag for particles.
pub const PARTICLE_POS_TAG: &str = "prt";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    #[serde(default)]
    pub kanji: Vec<Kanji>,
    #[serde(default)]
    pub kana: Vec<Kana>,
    #[serde(default)]
    pub sense: Vec<Sense>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kanji {
    #[serde(default)]
    pub common: bool,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kana {
    #[serde(default)]
    pub common: bool,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub applies_to_kanji: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sense {
    #[serde(default)]
    pub part_of_speech: Vec<String>,
    #[serde(default)]
    pub applies_to_kanji: Vec<String>,
    #[serde(default)]
    pub applies_to_kana: Vec<String>,
    #[serde(default)]
    pub related: Vec<Xref>,
    #[serde(default)]
    pub antonym: Vec<Xref>,
    #[serde(default)]
    pub field: Vec<String>,
    #[serde(default)]
    pub dialect: Vec<String>,
    #[serde(default)]
    pub misc: Vec<String>,
    #[serde(default)]
    pub info: Vec<String>,
    #[serde(default)]
    pub gloss: Vec<Gloss>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gloss {
    #[serde(default)]
    pub lang: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XrefPart {
    Text(String),
    SenseIndex(u32),
}

/// A "see also" pointer: `[kanji or kana]`, `[kanji or kana, sense]`,
/// `[kanji, kana]` or `[kanji, kana, sense]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Xref(pub Vec<XrefPart>);

impl Xref {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|part| match part {
            XrefPart::Text(text) => Some(text.as_str()),
            XrefPart::SenseIndex(_) => None,
        })
    }

    pub fn sense_index(&self) -> Option<u32> {
        self.0.iter().find_map(|part| match part {
            XrefPart::SenseIndex(index) => Some(*index),
            XrefPart::Text(_) => None,
        })
    }
}

/// `見る・みる・1`
impl fmt::Display for Xref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("・")?;
            }
            match part {
                XrefPart::Text(text) => f.write_str(text)?,
                XrefPart::SenseIndex(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}

impl Word {
    pub fn kanji_texts(&self) -> impl Iterator<Item = &str> {
        self.kanji.iter().map(|k| k.text.as_str())
    }

    pub fn kana_texts(&self) -> impl Iterator<Item = &str> {
        self.kana.iter().map(|k| k.text.as_str())
    }

    pub fn has_particle_sense(&self) -> bool {
        self.sense
            .iter()
            .any(|s| s.part_of_speech.iter().any(|pos| pos == PARTICLE_POS_TAG))
    }

    /// Every `related` cross-reference across all senses, first occurrence kept.
    pub fn related_xrefs(&self) -> IndexSet<&Xref> {
        self.sense.iter().flat_map(|s| s.related.iter()).collect()
    }

    /// Tag abbreviations used anywhere in the entry, in order of appearance.
    pub fn tags_used(&self) -> IndexSet<&str> {
        let kanji = self.kanji.iter().flat_map(|k| k.tags.iter());
        let kana = self.kana.iter().flat_map(|k| k.tags.iter());
        let senses = self.sense.iter().flat_map(|s| {
            s.part_of_speech
                .iter()
                .chain(&s.field)
                .chain(&s.dialect)
                .chain(&s.misc)
        });
        kanji
            .chain(kana)
            .chain(senses)
            .map(String::as_str)
            .collect()
    }
}

/// Prefix and id lookups over a JMdict-like dictionary.
///
/// Result order is the index's own; callers must not rely on it.
pub trait DictionaryIndex: Send + Sync {
    fn reading_beginning(&self, prefix: &str, limit: usize) -> Result<Vec<Arc<Word>>, DictionaryError>;
    fn kanji_beginning(&self, prefix: &str, limit: usize) -> Result<Vec<Arc<Word>>, DictionaryError>;
    fn ids_to_words(&self, ids: &[&str]) -> Result<Vec<Arc<Word>>, DictionaryError>;
    fn get_xrefs(&self, xref: &Xref) -> Result<Vec<Arc<Word>>, DictionaryError>;
    /// Tag abbreviation → description.
    fn tags(&self) -> &IndexMap<String, String>;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ruby {
    pub ruby: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rt: Option<String>,
}

impl Ruby {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            ruby: text.into(),
            rt: None,
        }
    }
}

pub type Furigana = Vec<Ruby>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuriganaEntry {
    pub text: String,
    pub reading: String,
    pub furigana: Furigana,
}

pub trait FuriganaDatabase: Send + Sync {
    fn lookup(&self, text: &str) -> Result<Vec<FuriganaEntry>, FuriganaError>;
}

/// The entry whose reading is `reading`, or else the first one.
pub fn pick_furigana<'a>(entries: &'a [FuriganaEntry], reading: &str) -> Option<&'a FuriganaEntry> {
    entries
        .iter()
        .find(|entry| entry.reading == reading)
        .or_else(|| entries.first())
}

/// KANJIDIC2 reading type for Sino-Japanese readings.
pub const ON_READING: &str = "ja_on";
/// KANJIDIC2 reading type for native Japanese readings.
pub const KUN_READING: &str = "ja_kun";

/// One character of the KANJIDIC2 JSON export.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanjiCharacter {
    pub literal: String,
    #[serde(default)]
    pub reading_meaning: Option<ReadingMeaning>,
    #[serde(default)]
    pub misc: KanjiMisc,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadingMeaning {
    #[serde(default)]
    pub groups: Vec<ReadingMeaningGroup>,
    #[serde(default)]
    pub nanori: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadingMeaningGroup {
    #[serde(default)]
    pub readings: Vec<KanjiReading>,
    #[serde(default)]
    pub meanings: Vec<KanjiMeaning>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanjiReading {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanjiMeaning {
    #[serde(default)]
    pub lang: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanjiMisc {
    #[serde(default)]
    pub grade: Option<u8>,
    #[serde(default)]
    pub stroke_counts: Vec<u8>,
    #[serde(default)]
    pub frequency: Option<u32>,
    #[serde(default)]
    pub jlpt_level: Option<u8>,
}

impl KanjiCharacter {
    fn groups(&self) -> impl Iterator<Item = &ReadingMeaningGroup> {
        self.reading_meaning.iter().flat_map(|rm| rm.groups.iter())
    }

    /// Readings of one KANJIDIC2 type (`ja_on`, `ja_kun`, ...).
    pub fn readings(&self, kind: &str) -> Vec<String> {
        self.groups()
            .flat_map(|g| g.readings.iter())
            .filter(|r| r.kind == kind)
            .map(|r| r.value.clone())
            .collect()
    }

    /// Meanings in `lang`; KANJIDIC2 leaves English ones untagged in some exports.
    pub fn meanings(&self, lang: &str) -> Vec<String> {
        self.groups()
            .flat_map(|g| g.meanings.iter())
            .filter(|m| m.lang == lang || (m.lang.is_empty() && lang == "en"))
            .map(|m| m.value.clone())
            .collect()
    }
}

/// Per-character lookups over KANJIDIC2.
pub trait KanjiDictionary: Send + Sync {
    fn lookup_kanji(&self, literal: char) -> Result<Option<Arc<KanjiCharacter>>, KanjiError>;
}
