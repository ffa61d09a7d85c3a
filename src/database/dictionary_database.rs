use std::{
    collections::{BTreeMap, HashMap},
    ops::Bound,
    path::Path,
    sync::Arc,
};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::{
    database::read_json,
    dictionary::{DictionaryIndex, Word, Xref},
    errors::{DictionaryError, LoadError},
    language::ja::japanese::convert_katakana_to_hiragana,
};

/// Top level of a JMdict-simplified JSON file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JmdictFile {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub dict_date: String,
    #[serde(default)]
    pub tags: IndexMap<String, String>,
    pub words: Vec<Word>,
}

/// Word position lists keyed by search form, kept sorted for prefix scans.
type PrefixIndex = BTreeMap<String, Vec<usize>>;

/// In-memory JMdict with ordered indexes over kana (hiragana-normalized) and
/// kanji forms.
pub struct JmdictDatabase {
    words: Vec<Arc<Word>>,
    ids: HashMap<String, usize>,
    reading_index: PrefixIndex,
    kanji_index: PrefixIndex,
    tags: IndexMap<String, String>,
}

impl JmdictDatabase {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file: JmdictFile = read_json(path)?;
        log::info!(
            "loaded {} JMdict entries (version {}) from {}",
            file.words.len(),
            file.version,
            path.display()
        );
        Ok(Self::from_file(file))
    }

    pub fn from_file(file: JmdictFile) -> Self {
        let mut ids = HashMap::with_capacity(file.words.len());
        let mut reading_index = PrefixIndex::new();
        let mut kanji_index = PrefixIndex::new();

        let words: Vec<Arc<Word>> = file.words.into_iter().map(Arc::new).collect();
        for (i, word) in words.iter().enumerate() {
            ids.insert(word.id.clone(), i);
            for kana in word.kana_texts() {
                push_unique(&mut reading_index, convert_katakana_to_hiragana(kana), i);
            }
            for kanji in word.kanji_texts() {
                push_unique(&mut kanji_index, kanji.to_string(), i);
            }
        }

        Self {
            words,
            ids,
            reading_index,
            kanji_index,
            tags: file.tags,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn prefix_scan(&self, index: &PrefixIndex, prefix: &str, limit: usize) -> Vec<Arc<Word>> {
        if prefix.is_empty() || limit == 0 {
            return Vec::new();
        }
        let mut found: IndexSet<usize> = IndexSet::new();
        let range = index.range::<str, _>((Bound::Included(prefix), Bound::Unbounded));
        'keys: for (key, positions) in range {
            if !key.starts_with(prefix) {
                break;
            }
            for &i in positions {
                found.insert(i);
                if found.len() >= limit {
                    break 'keys;
                }
            }
        }
        found.into_iter().map(|i| self.words[i].clone()).collect()
    }
}

fn exact<'a>(index: &'a PrefixIndex, key: &str) -> impl Iterator<Item = usize> + 'a {
    index.get(key).into_iter().flatten().copied()
}

fn push_unique(index: &mut PrefixIndex, key: String, position: usize) {
    let positions = index.entry(key).or_default();
    if !positions.contains(&position) {
        positions.push(position);
    }
}

impl DictionaryIndex for JmdictDatabase {
    fn reading_beginning(&self, prefix: &str, limit: usize) -> Result<Vec<Arc<Word>>, DictionaryError> {
        let prefix = convert_katakana_to_hiragana(prefix);
        Ok(self.prefix_scan(&self.reading_index, &prefix, limit))
    }

    fn kanji_beginning(&self, prefix: &str, limit: usize) -> Result<Vec<Arc<Word>>, DictionaryError> {
        Ok(self.prefix_scan(&self.kanji_index, prefix, limit))
    }

    fn ids_to_words(&self, ids: &[&str]) -> Result<Vec<Arc<Word>>, DictionaryError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.ids.get(*id))
            .map(|&i| self.words[i].clone())
            .collect())
    }

    /// Entries whose kanji or kana form is the first text of `xref`; a second
    /// text must then match one of the entry's kana forms.
    fn get_xrefs(&self, xref: &Xref) -> Result<Vec<Arc<Word>>, DictionaryError> {
        let mut texts = xref.texts();
        let Some(head) = texts.next() else {
            return Ok(Vec::new());
        };
        let reading = texts.next().map(convert_katakana_to_hiragana);

        let candidates: IndexSet<usize> = exact(&self.kanji_index, head)
            .chain(exact(&self.reading_index, &convert_katakana_to_hiragana(head)))
            .collect();
        Ok(candidates
            .into_iter()
            .map(|i| &self.words[i])
            .filter(|word| {
                reading.as_ref().map_or(true, |reading| {
                    word.kana_texts()
                        .any(|kana| convert_katakana_to_hiragana(kana) == *reading)
                })
            })
            .cloned()
            .collect())
    }

    fn tags(&self) -> &IndexMap<String, String> {
        &self.tags
    }
}

#[cfg(test)]
mod dictionary_database_tests {
    use super::*;
    use crate::dictionary::XrefPart;
    use crate::test_utils::TEST_DICTIONARY;
    use pretty_assertions::assert_eq;

    fn ids(words: &[Arc<Word>]) -> Vec<&str> {
        words.iter().map(|w| w.id.as_str()).collect()
    }

    #[test]
    fn reading_prefix() {
        let words = TEST_DICTIONARY.reading_beginning("でんわ", 20).unwrap();
        assert_eq!(ids(&words), ["1000", "1001"]);
        let capped = TEST_DICTIONARY.reading_beginning("でんわ", 1).unwrap();
        assert_eq!(ids(&capped), ["1000"]);
        assert!(TEST_DICTIONARY.reading_beginning("", 20).unwrap().is_empty());
    }

    #[test]
    fn kanji_prefix() {
        let words = TEST_DICTIONARY.kanji_beginning("彼", 20).unwrap();
        assert_eq!(ids(&words), ["1002", "1003"]);
        assert!(TEST_DICTIONARY.kanji_beginning("電話中", 20).unwrap().is_empty());
    }

    #[test]
    fn lookups_by_id_and_xref() {
        let words = TEST_DICTIONARY.ids_to_words(&["1008", "missing", "1000"]).unwrap();
        assert_eq!(ids(&words), ["1008", "1000"]);

        let xref = Xref(vec![XrefPart::Text("電話機".into())]);
        assert_eq!(ids(&TEST_DICTIONARY.get_xrefs(&xref).unwrap()), ["1001"]);

        let by_kana = Xref(vec![
            XrefPart::Text("荷".into()),
            XrefPart::Text("に".into()),
            XrefPart::SenseIndex(1),
        ]);
        assert_eq!(ids(&TEST_DICTIONARY.get_xrefs(&by_kana).unwrap()), ["1005"]);

        let wrong_kana = Xref(vec![XrefPart::Text("荷".into()), XrefPart::Text("か".into())]);
        assert!(TEST_DICTIONARY.get_xrefs(&wrong_kana).unwrap().is_empty());
    }

    #[test]
    fn tag_table_is_loaded() {
        assert_eq!(
            TEST_DICTIONARY.tags().get("prt").map(String::as_str),
            Some("particle")
        );
    }
}
