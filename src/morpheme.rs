use derive_more::{Deref, From};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::{
    dictionary::FuriganaDatabase,
    errors::FuriganaError,
    language::ja::japanese::{convert_katakana_to_hiragana, strip_lemma_gloss},
};

/// English part-of-speech, inflection-type and inflection-form tags as
/// produced by [crate::mecab_unidic].
pub mod tags {
    pub const PARTICLE: &str = "particle";
    pub const VERB: &str = "verb";
    pub const ADJECTIVE: &str = "adjective";
    pub const ADJECTIVAL_NOUN: &str = "adjectival_noun";
    pub const AUXILIARY_VERB: &str = "auxiliary_verb";
    pub const SUFFIX: &str = "suffix";
    pub const SUPPLEMENTARY_SYMBOL: &str = "supplementary_symbol";
    pub const SYMBOL: &str = "symbol";
    pub const BLANK: &str = "blank";
    pub const SURU_POSSIBLE: &str = "suru_possible";

    pub const CONCLUSIVE: &str = "conclusive";
    pub const ICHIDAN: &str = "ichidan";
    pub const COPULA_TYPES: [&str; 2] = ["da", "desu"];
}

/// One analyzer token. Never mutated after the analyzer hands it over.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Morpheme {
    pub literal: String,
    pub pronunciation: String,
    pub lemma_reading: String,
    pub lemma: String,
    /// General to specific, e.g. `["noun", "common", "suru_possible"]`.
    pub part_of_speech: Vec<String>,
    pub inflection_type: Option<Vec<String>>,
    pub inflection: Option<Vec<String>>,
}

impl Morpheme {
    pub fn pos0(&self) -> &str {
        self.part_of_speech.first().map_or("", String::as_str)
    }

    /// Lemma without the trailing English gloss UniDic attaches to loanwords.
    pub fn lemma_head(&self) -> &str {
        strip_lemma_gloss(&self.lemma)
    }

    /// Root tag `particle` with at least one refining sub-tag.
    pub fn is_particle(&self) -> bool {
        self.pos0() == tags::PARTICLE && self.part_of_speech.len() > 1
    }

    pub fn is_symbol(&self) -> bool {
        matches!(
            self.pos0(),
            tags::SUPPLEMENTARY_SYMBOL | tags::SYMBOL | tags::BLANK
        )
    }

    pub fn is_supplementary_or_auxiliary(&self) -> bool {
        let pos0 = self.pos0();
        pos0.starts_with("supplementary") || pos0.starts_with("auxiliary")
    }

    pub fn is_suffix(&self) -> bool {
        self.pos0() == tags::SUFFIX
    }

    /// Carries a conjugation type, or is a na-adjective stem that takes だ.
    pub fn inflects(&self) -> bool {
        self.inflection_type.is_some() || self.pos0() == tags::ADJECTIVAL_NOUN
    }

    pub fn is_suru_noun(&self) -> bool {
        self.part_of_speech
            .last()
            .is_some_and(|tag| tag == tags::SURU_POSSIBLE)
    }

    fn inflection_type_at(&self, index: usize) -> Option<&str> {
        self.inflection_type
            .as_ref()
            .and_then(|types| types.get(index))
            .map(String::as_str)
    }

    pub fn inflection_form(&self) -> Option<&str> {
        self.inflection
            .as_ref()
            .and_then(|forms| forms.first())
            .map(String::as_str)
    }

    pub fn is_ichidan(&self) -> bool {
        self.inflection_type_at(0)
            .is_some_and(|t| t.ends_with(tags::ICHIDAN))
    }

    pub fn is_i_adjective(&self) -> bool {
        self.pos0() == tags::ADJECTIVE || self.inflection_type_at(0) == Some(tags::ADJECTIVE)
    }

    /// An auxiliary conjugating like だ or です.
    pub fn is_copula(&self) -> bool {
        self.pos0() == tags::AUXILIARY_VERB
            && self
                .inflection_type_at(1)
                .is_some_and(|t| tags::COPULA_TYPES.contains(&t))
    }
}

/// A phrase chunk: consecutive morphemes, non-overlapping with its neighbours.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize, Deref, From)]
#[serde(transparent)]
pub struct Bunsetsu(pub Vec<Morpheme>);

/// One sentence as returned by the analyzer and chunker.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedSentence {
    pub morphemes: Vec<Morpheme>,
    pub bunsetsus: Vec<Bunsetsu>,
}

impl ParsedSentence {
    pub fn text(&self) -> String {
        self.morphemes.iter().map(|m| m.literal.as_str()).collect()
    }
}

/// A morpheme together with the strings worth searching for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatedMorpheme {
    pub morpheme: Morpheme,
    /// The literal, then the lemma unless the morpheme is a symbol.
    pub search_kanji: IndexSet<String>,
    /// The lemma reading in hiragana, then furigana readings of the literal.
    pub search_reading: IndexSet<String>,
}

impl AnnotatedMorpheme {
    pub fn new(morpheme: &Morpheme, furigana: &dyn FuriganaDatabase) -> Result<Self, FuriganaError> {
        let mut search_kanji = IndexSet::new();
        search_kanji.insert(morpheme.literal.clone());
        if !morpheme.is_symbol() {
            search_kanji.insert(morpheme.lemma_head().to_string());
        }

        let mut search_reading = IndexSet::new();
        if !morpheme.lemma_reading.is_empty() {
            search_reading.insert(convert_katakana_to_hiragana(&morpheme.lemma_reading));
        }
        for entry in furigana.lookup(&morpheme.literal)? {
            search_reading.insert(convert_katakana_to_hiragana(&entry.reading));
        }
        search_kanji.retain(|key| !key.is_empty());
        search_reading.retain(|key| !key.is_empty());

        Ok(Self {
            morpheme: morpheme.clone(),
            search_kanji,
            search_reading,
        })
    }
}
