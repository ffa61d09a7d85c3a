use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use better_default::Default;
use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::errors::LoadError;

/// Tuning values for [crate::Annotator].
///
/// All of these are empirical. They are exposed so callers can override
/// them from a JSON file; unknown fields are rejected, missing fields keep
/// their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotatorOptions {
    /// Longest run of morphemes considered for a dictionary lookup.
    #[default(5)]
    pub max_run_length: usize,
    /// Cap passed to every prefix query.
    #[default(20)]
    pub query_limit: usize,
    pub scoring: ScoringWeights,
    /// How many particle tokens ahead are considered for fusion.
    #[default(4)]
    pub particle_fusion_window: usize,
    /// Wall-clock budget for one sentence, in milliseconds.
    pub sentence_deadline_ms: Option<u64>,
    /// Upper bound on candidates the deinflection engine may produce for one surface.
    #[default(4096)]
    pub max_transform_results: usize,
}

impl AnnotatorOptions {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| LoadError::json(path, e))
    }

    pub fn sentence_deadline(&self) -> Option<Duration> {
        self.sentence_deadline_ms.map(Duration::from_millis)
    }
}

/// `score = overrun·Δ + literal_kanji·k₁ + lemma_kanji·k₂ + particle·p`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringWeights {
    #[default(10)]
    pub overrun: i64,
    #[default(2)]
    pub literal_kanji: i64,
    #[default(1)]
    pub lemma_kanji: i64,
    #[default(5)]
    pub particle: i64,
}

/// Locations of the prerequisite data files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Getters)]
#[getset(get = "pub")]
pub struct ResourcePaths {
    /// JMdict-simplified JSON.
    jmdict: PathBuf,
    /// JmdictFurigana JSON.
    furigana: PathBuf,
    /// Particle catalog, one `・`-separated row per line.
    particles: PathBuf,
    /// KANJIDIC2 JSON.
    kanjidic: PathBuf,
}

impl ResourcePaths {
    pub fn new(
        jmdict: impl Into<PathBuf>,
        furigana: impl Into<PathBuf>,
        particles: impl Into<PathBuf>,
        kanjidic: impl Into<PathBuf>,
    ) -> Self {
        Self {
            jmdict: jmdict.into(),
            furigana: furigana.into(),
            particles: particles.into(),
            kanjidic: kanjidic.into(),
        }
    }
}

#[cfg(test)]
mod settings_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults() {
        let opts = AnnotatorOptions::default();
        assert_eq!(opts.max_run_length, 5);
        assert_eq!(opts.query_limit, 20);
        assert_eq!(opts.particle_fusion_window, 4);
        assert_eq!(
            opts.scoring,
            ScoringWeights {
                overrun: 10,
                literal_kanji: 2,
                lemma_kanji: 1,
                particle: 5,
            }
        );
        assert_eq!(opts.sentence_deadline(), None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "query_limit": 50, "scoring": {{ "particle": 7 }}, "sentence_deadline_ms": 250 }}"#
        )
        .unwrap();
        let opts = AnnotatorOptions::from_path(file.path()).unwrap();
        assert_eq!(opts.query_limit, 50);
        assert_eq!(opts.max_run_length, 5);
        assert_eq!(opts.scoring.particle, 7);
        assert_eq!(opts.scoring.overrun, 10);
        assert_eq!(opts.sentence_deadline(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn unknown_field_is_a_load_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "window": 3 }}"#).unwrap();
        let err = AnnotatorOptions::from_path(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }), "{err}");
    }
}
