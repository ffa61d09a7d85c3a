use std::{
    path::PathBuf,
    sync::{Arc, LazyLock},
};

use crate::{
    database::{
        dictionary_database::JmdictDatabase, furigana_database::JmdictFuriganaDatabase,
        kanjidic_database::KanjidicDatabase,
    },
    morpheme::Morpheme,
    particles::ParticleCatalog,
    settings::AnnotatorOptions,
    Annotator,
};

pub(crate) static TEST_PATHS: LazyLock<PathBuf> =
    LazyLock::new(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures"));

pub(crate) fn fixture_path(name: &str) -> PathBuf {
    TEST_PATHS.join(name)
}

pub(crate) fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {path:?}: {e}"))
}

pub(crate) static TEST_DICTIONARY: LazyLock<Arc<JmdictDatabase>> = LazyLock::new(|| {
    Arc::new(JmdictDatabase::from_path(fixture_path("jmdict-sample.json")).unwrap())
});

pub(crate) static TEST_FURIGANA: LazyLock<Arc<JmdictFuriganaDatabase>> = LazyLock::new(|| {
    Arc::new(JmdictFuriganaDatabase::from_path(fixture_path("furigana-sample.json")).unwrap())
});

pub(crate) static TEST_KANJIDIC: LazyLock<Arc<KanjidicDatabase>> = LazyLock::new(|| {
    Arc::new(KanjidicDatabase::from_path(fixture_path("kanjidic-sample.json")).unwrap())
});

pub(crate) static TEST_PARTICLES: LazyLock<ParticleCatalog> =
    LazyLock::new(|| ParticleCatalog::from_path(fixture_path("particles.txt")).unwrap());

pub(crate) static TEST_ANNOTATOR: LazyLock<Annotator> =
    LazyLock::new(|| annotator_with(AnnotatorOptions::default()));

pub(crate) fn annotator_with(options: AnnotatorOptions) -> Annotator {
    Annotator::new(
        TEST_DICTIONARY.clone(),
        TEST_FURIGANA.clone(),
        TEST_KANJIDIC.clone(),
        TEST_PARTICLES.clone(),
        options,
    )
    .unwrap()
}

/// A morpheme with hyphen-joined English tags; empty tag strings become `None`.
///
/// The pronunciation is taken to equal the lemma reading.
pub(crate) fn morpheme(
    literal: &str,
    lemma_reading: &str,
    lemma: &str,
    part_of_speech: &str,
    inflection_type: &str,
    inflection: &str,
) -> Morpheme {
    let tags = |joined: &str| -> Option<Vec<String>> {
        (!joined.is_empty()).then(|| joined.split('-').map(str::to_string).collect())
    };
    Morpheme {
        literal: literal.into(),
        pronunciation: lemma_reading.into(),
        lemma_reading: lemma_reading.into(),
        lemma: lemma.into(),
        part_of_speech: tags(part_of_speech).unwrap_or_default(),
        inflection_type: tags(inflection_type),
        inflection: tags(inflection),
    }
}
