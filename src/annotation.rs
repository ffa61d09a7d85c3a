//! Structures returned by the two annotation entry points.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    context_cloze::ContextCloze,
    dictionary::{Furigana, KanjiCharacter, KUN_READING, ON_READING},
    morpheme::{Bunsetsu, Morpheme},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Reading,
    Kanji,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreHit {
    pub word_id: String,
    pub score: i64,
    /// Key that was searched; for cross-references, the reference itself.
    pub search: String,
    pub kind: SearchKind,
    /// JMdict tag abbreviation → description, for tags the entry uses.
    pub tags: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_xref: bool,
}

/// Hits for one run `[start_idx, end_idx)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHits {
    pub end_idx: usize,
    pub run: ContextCloze,
    pub results: Vec<ScoreHit>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreHits {
    pub start_idx: usize,
    /// Longest run first.
    pub results: Vec<RunHits>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Deconjugated {
    /// Inner transforms, stem first.
    pub auxiliaries: Vec<String>,
    /// Outermost transform, or `dictionary`.
    pub conjugation: String,
    pub result: Vec<String>,
}

impl Deconjugated {
    pub(crate) fn dedup_key(&self) -> String {
        format!(
            "{}/{}/{}",
            self.auxiliaries.join("+"),
            self.conjugation,
            self.result.join("")
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConjugatedPhrase {
    pub start_idx: usize,
    pub end_idx: usize,
    pub morphemes: Vec<Morpheme>,
    pub cloze: ContextCloze,
    /// Furigana of each morpheme's lemma.
    pub lemmas: Vec<Furigana>,
    pub deconj: Vec<Deconjugated>,
}

/// A particle catalog row: its index and every surface form it lists.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChinoMatch {
    pub index: usize,
    pub forms: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Particle {
    pub chino: Vec<ChinoMatch>,
    pub cloze: ContextCloze,
    pub start_idx: usize,
    pub end_idx: usize,
    /// One morpheme, or several for a fused compound particle.
    pub morphemes: Vec<Morpheme>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FillInTheBlanks {
    pub sentence: String,
    pub conjugated_phrases: Vec<ConjugatedPhrase>,
    pub particles: Vec<Particle>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceAnnotation {
    pub sentence: String,
    pub morphemes: Vec<Morpheme>,
    pub bunsetsus: Vec<Bunsetsu>,
    pub dictionary_hits: Vec<ScoreHits>,
    pub fill_in_the_blanks: FillInTheBlanks,
    /// Each distinct kanji of the sentence that KANJIDIC2 knows, in order of appearance.
    #[serde(default)]
    pub kanji: Vec<KanjiSummary>,
}

/// Study card for one character of the sentence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanjiSummary {
    pub literal: String,
    pub on: Vec<String>,
    pub kun: Vec<String>,
    pub meanings: Vec<String>,
    pub grade: Option<u8>,
    pub stroke_count: Option<u8>,
    pub jlpt_level: Option<u8>,
}

impl From<&KanjiCharacter> for KanjiSummary {
    fn from(character: &KanjiCharacter) -> Self {
        Self {
            literal: character.literal.clone(),
            on: character.readings(ON_READING),
            kun: character.readings(KUN_READING),
            meanings: character.meanings("en"),
            grade: character.misc.grade,
            stroke_count: character.misc.stroke_counts.first().copied(),
            jlpt_level: character.misc.jlpt_level,
        }
    }
}
