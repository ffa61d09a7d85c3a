//! Learner annotations for Japanese sentences: ranked dictionary hits for
//! every run of morphemes, and fill-in-the-blank clozes for conjugated
//! phrases and particles.
//!
//! An [`Annotator`] holds every resource the two entry points read:
//! [`Annotator::enumerate_dictionary_hits`] and
//! [`Annotator::identify_fill_in_blanks`].

pub mod annotation;
pub mod context_cloze;
pub mod database;
pub mod deconjugation;
pub mod dictionary;
pub mod errors;
pub mod language;
pub mod mecab_unidic;
pub mod morpheme;
pub mod particles;
pub mod settings;
mod text_scanner;
mod translator;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use getset::Getters;
use indexmap::IndexMap;

pub use annotation::{
    ConjugatedPhrase, Deconjugated, FillInTheBlanks, KanjiSummary, Particle, ScoreHit,
    ScoreHits, SentenceAnnotation,
};
pub use context_cloze::ContextCloze;
pub use errors::{AnnotateError, LoadError};
pub use morpheme::{Bunsetsu, Morpheme, ParsedSentence};
pub use settings::{AnnotatorOptions, ResourcePaths};
pub use translator::{forking_paths, rank_hits};

use crate::{
    database::{
        dictionary_database::JmdictDatabase, furigana_database::JmdictFuriganaDatabase,
        kanjidic_database::KanjidicDatabase,
    },
    deconjugation::Deconjugator,
    dictionary::{DictionaryIndex, FuriganaDatabase, KanjiDictionary},
    errors::KanjiError,
    language::ja::japanese::is_kanji,
    particles::ParticleCatalog,
    translator::Deadline,
};

/// Read-only annotation context, shared freely between threads.
#[derive(Getters)]
pub struct Annotator {
    pub(crate) dictionary: Arc<dyn DictionaryIndex>,
    pub(crate) furigana: Arc<dyn FuriganaDatabase>,
    pub(crate) kanjidic: Arc<dyn KanjiDictionary>,
    #[getset(get = "pub")]
    pub(crate) particles: ParticleCatalog,
    pub(crate) deconjugator: Deconjugator,
    #[getset(get = "pub")]
    pub(crate) options: AnnotatorOptions,
}

impl Annotator {
    /// Builds an annotator over already loaded collaborators.
    pub fn new(
        dictionary: Arc<dyn DictionaryIndex>,
        furigana: Arc<dyn FuriganaDatabase>,
        kanjidic: Arc<dyn KanjiDictionary>,
        particles: ParticleCatalog,
        options: AnnotatorOptions,
    ) -> Result<Self, LoadError> {
        let deconjugator = Deconjugator::new(options.max_transform_results)?;
        Ok(Self {
            dictionary,
            furigana,
            kanjidic,
            particles,
            deconjugator,
            options,
        })
    }

    /// Loads JMdict, JmdictFurigana, KANJIDIC2 and the particle catalog from disk.
    ///
    /// Any missing or malformed file fails here, before a single sentence
    /// is annotated.
    pub fn open(paths: &ResourcePaths, options: AnnotatorOptions) -> Result<Self, LoadError> {
        let dictionary = JmdictDatabase::from_path(paths.jmdict())?;
        let furigana = JmdictFuriganaDatabase::from_path(paths.furigana())?;
        let kanjidic = KanjidicDatabase::from_path(paths.kanjidic())?;
        let particles = ParticleCatalog::from_path(paths.particles())?;
        Self::new(
            Arc::new(dictionary),
            Arc::new(furigana),
            Arc::new(kanjidic),
            particles,
            options,
        )
    }

    pub fn dictionary(&self) -> &dyn DictionaryIndex {
        self.dictionary.as_ref()
    }

    pub fn furigana(&self) -> &dyn FuriganaDatabase {
        self.furigana.as_ref()
    }

    pub fn kanjidic(&self) -> &dyn KanjiDictionary {
        self.kanjidic.as_ref()
    }

    /// One summary per distinct kanji of `text`, first occurrence first.
    /// Characters KANJIDIC2 lacks are left out.
    pub fn summarize_kanji(&self, text: &str) -> Result<Vec<KanjiSummary>, KanjiError> {
        let mut seen = std::collections::HashSet::new();
        let mut summaries = Vec::new();
        for c in text.chars().filter(|&c| is_kanji(c) && seen.insert(c)) {
            match self.kanjidic.lookup_kanji(c)? {
                Some(character) => summaries.push(KanjiSummary::from(character.as_ref())),
                None => log::debug!("{c} is not in kanjidic"),
            }
        }
        Ok(summaries)
    }

    /// Both annotations for one analyzed sentence, after replacing the
    /// morphemes named in `overrides` (keyed by position in the sentence).
    ///
    /// The sentence deadline, when configured, covers both stages.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(full)))]
    pub fn annotate(
        &self,
        sentence: &ParsedSentence,
        overrides: &IndexMap<usize, Morpheme>,
        full: bool,
        limit: Option<usize>,
    ) -> Result<SentenceAnnotation, AnnotateError> {
        let sentence = apply_overrides(sentence, overrides);
        let deadline = Deadline::start(self.options.sentence_deadline());
        let dictionary_hits =
            self.enumerate_dictionary_hits_until(&sentence.morphemes, full, limit, &deadline)?;
        let fill_in_the_blanks =
            self.identify_fill_in_blanks_until(&sentence.bunsetsus, false, &deadline)?;
        let text = sentence.text();
        let kanji = self.summarize_kanji(&text)?;
        Ok(SentenceAnnotation {
            sentence: text,
            morphemes: sentence.morphemes,
            bunsetsus: sentence.bunsetsus,
            dictionary_hits,
            fill_in_the_blanks,
            kanji,
        })
    }
}

fn apply_overrides(sentence: &ParsedSentence, overrides: &IndexMap<usize, Morpheme>) -> ParsedSentence {
    if overrides.is_empty() {
        return sentence.clone();
    }
    let replace = |i: usize, m: &Morpheme| overrides.get(&i).unwrap_or(m).clone();
    let morphemes = sentence
        .morphemes
        .iter()
        .enumerate()
        .map(|(i, m)| replace(i, m))
        .collect();
    let mut offset = 0;
    let bunsetsus = sentence
        .bunsetsus
        .iter()
        .map(|bunsetsu| {
            let chunk: Vec<Morpheme> = bunsetsu
                .iter()
                .enumerate()
                .map(|(i, m)| replace(offset + i, m))
                .collect();
            offset += chunk.len();
            Bunsetsu(chunk)
        })
        .collect();
    ParsedSentence {
        morphemes,
        bunsetsus,
    }
}

#[cfg(test)]
mod annotator_tests {
    use super::*;
    use crate::{
        mecab_unidic::parse_lattice,
        test_utils::{fixture_path, morpheme, read_fixture, TEST_ANNOTATOR},
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn opens_from_files() {
        let paths = ResourcePaths::new(
            fixture_path("jmdict-sample.json"),
            fixture_path("furigana-sample.json"),
            fixture_path("particles.txt"),
            fixture_path("kanjidic-sample.json"),
        );
        let annotator = Annotator::open(&paths, AnnotatorOptions::default()).unwrap();
        assert!(!annotator.particles().is_empty());
        assert!(annotator.kanjidic().lookup_kanji('話').unwrap().is_some());
        assert_eq!(annotator.options().max_run_length, 5);
    }

    #[test]
    fn missing_resource_is_fatal() {
        let paths = ResourcePaths::new(
            fixture_path("jmdict-sample.json"),
            fixture_path("furigana-sample.json"),
            fixture_path("no-such-catalog.txt"),
            fixture_path("kanjidic-sample.json"),
        );
        let err = Annotator::open(&paths, AnnotatorOptions::default()).err().unwrap();
        assert!(matches!(err, LoadError::Io { .. }), "{err}");
    }

    #[test]
    fn missing_kanjidic_is_fatal() {
        let paths = ResourcePaths::new(
            fixture_path("jmdict-sample.json"),
            fixture_path("furigana-sample.json"),
            fixture_path("particles.txt"),
            fixture_path("kanjidic2.json"),
        );
        match Annotator::open(&paths, AnnotatorOptions::default()) {
            Err(LoadError::Io { path, .. }) => assert_eq!(path, fixture_path("kanjidic2.json")),
            Err(err) => panic!("unexpected error: {err}"),
            Ok(_) => panic!("opened without kanjidic"),
        }
    }

    #[test]
    fn kanji_are_summarized_once_in_order() {
        let summaries = TEST_ANNOTATOR.summarize_kanji("昨日は日曜日でした").unwrap();
        let literals: Vec<&str> = summaries.iter().map(|k| k.literal.as_str()).collect();
        // 曜 is not in the sample
        assert_eq!(literals, ["昨", "日"]);
        assert_eq!(summaries[1].on, ["ニチ", "ジツ"]);
        assert_eq!(summaries[1].stroke_count, Some(4));
        assert!(TEST_ANNOTATOR.summarize_kanji("それは").unwrap().is_empty());
    }

    #[test]
    fn annotates_a_whole_sentence() {
        let sentence = parse_lattice(&read_fixture("denwa.lattice")).remove(0);
        let annotation = TEST_ANNOTATOR
            .annotate(&sentence, &IndexMap::new(), false, Some(10))
            .unwrap();
        assert_eq!(annotation.sentence, "彼に電話します");
        let starts: Vec<usize> = annotation.dictionary_hits.iter().map(|h| h.start_idx).collect();
        // ます is auxiliary and never starts a run
        assert_eq!(starts, [0, 1, 2, 3]);
        assert_eq!(annotation.fill_in_the_blanks.conjugated_phrases.len(), 1);
        let kanji: Vec<&str> = annotation.kanji.iter().map(|k| k.literal.as_str()).collect();
        assert_eq!(kanji, ["彼", "電", "話"]);
        assert_eq!(annotation.kanji[0].kun, ["かれ", "かの", "か.の"]);

        let json = serde_json::to_value(&annotation).unwrap();
        assert_eq!(json["fill_in_the_blanks"]["particles"][0]["cloze"]["cloze"], "に");
    }

    #[test]
    fn overrides_replace_morphemes() {
        let sentence = parse_lattice(&read_fixture("denwa.lattice")).remove(0);
        let overrides = IndexMap::from([(0, morpheme("彼女", "カノジョ", "彼女", "pronoun", "", ""))]);
        let annotation = TEST_ANNOTATOR
            .annotate(&sentence, &overrides, true, None)
            .unwrap();
        assert_eq!(annotation.sentence, "彼女に電話します");
        assert_eq!(annotation.bunsetsus[0][0].literal, "彼女");
        let first = &annotation.dictionary_hits[0].results;
        assert!(first
            .iter()
            .flat_map(|run| &run.results)
            .any(|hit| hit.word_id == "1003"));
    }
}
