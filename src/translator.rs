//! Dictionary hits for every run of morphemes in a sentence.
//!
//! Each start index is tried with runs of decreasing length. Every run's
//! search keys are expanded into whole-run strings, queried against the
//! dictionary index and scored; a start index with no hits at all falls
//! back to substrings of its own morpheme.

use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;

use crate::{
    annotation::{RunHits, ScoreHit, ScoreHits, SearchKind},
    context_cloze::ContextCloze,
    dictionary::Word,
    errors::{AnnotateError, DictionaryError},
    language::{
        ja::japanese::{
            convert_katakana_to_hiragana, has_kanji, is_kanji, is_string_entirely_kana,
        },
        text_utilities::{all_substrings, intersection},
    },
    morpheme::{tags, AnnotatedMorpheme, Morpheme},
    Annotator,
};

/// Wall-clock budget for one sentence. Unbounded when no budget is set.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    pub(crate) fn start(budget: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    pub(crate) fn check(&self) -> Result<(), AnnotateError> {
        match self.budget {
            Some(deadline) if self.started.elapsed() >= deadline => {
                Err(AnnotateError::DeadlineExceeded { deadline })
            }
            _ => Ok(()),
        }
    }
}

/// Every string formed by picking one alternative per position, earlier
/// positions varying slowest.
///
/// `[["a", "b"], ["c"]]` → `["ac", "bc"]`.
pub fn forking_paths(positions: &[Vec<&str>]) -> Vec<String> {
    let mut paths = vec![String::new()];
    for alternatives in positions {
        paths = paths
            .iter()
            .flat_map(|prefix| {
                alternatives
                    .iter()
                    .map(move |alternative| format!("{prefix}{alternative}"))
            })
            .collect();
    }
    paths
}

type Query = (SearchKind, String);

impl Annotator {
    /// Ranked dictionary hits for every run of up to `max_run_length` morphemes.
    ///
    /// With `full == false`, runs starting on supplementary or auxiliary
    /// morphemes are skipped, as are single kana morphemes that are their own
    /// lemma. `limit` caps each run's hit list; `None` keeps everything.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(morphemes = morphemes.len(), full))
    )]
    pub fn enumerate_dictionary_hits(
        &self,
        morphemes: &[Morpheme],
        full: bool,
        limit: Option<usize>,
    ) -> Result<Vec<ScoreHits>, AnnotateError> {
        let deadline = Deadline::start(self.options.sentence_deadline());
        self.enumerate_dictionary_hits_until(morphemes, full, limit, &deadline)
    }

    pub(crate) fn enumerate_dictionary_hits_until(
        &self,
        morphemes: &[Morpheme],
        full: bool,
        limit: Option<usize>,
        deadline: &Deadline,
    ) -> Result<Vec<ScoreHits>, AnnotateError> {
        let annotated = morphemes
            .iter()
            .map(|m| AnnotatedMorpheme::new(m, self.furigana.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let pieces: Vec<&str> = morphemes.iter().map(|m| m.literal.as_str()).collect();
        let max_run_length = self.options.max_run_length.max(1);

        let mut hits = Vec::with_capacity(annotated.len());
        for start_idx in 0..annotated.len() {
            let lead = &annotated[start_idx].morpheme;
            if !full && lead.is_supplementary_or_auxiliary() {
                log::debug!("skipping runs from {start_idx}: {} is {}", lead.literal, lead.pos0());
                continue;
            }
            let is_function_word =
                is_string_entirely_kana(&lead.literal) && lead.literal == lead.lemma_head();

            let mut runs = Vec::new();
            let last_end = annotated.len().min(start_idx + max_run_length);
            for end_idx in (start_idx + 1..=last_end).rev() {
                if !full && end_idx == start_idx + 1 && is_function_word {
                    log::debug!("skipping single kana run {}", lead.literal);
                    continue;
                }
                let run = &annotated[start_idx..end_idx];
                deadline.check()?;
                let results = self.search_run(run, limit)?;
                deadline.check()?;
                if results.is_empty() {
                    continue;
                }
                runs.push(RunHits {
                    end_idx,
                    run: ContextCloze::from_pieces(&pieces, start_idx, end_idx),
                    results,
                });
            }

            // lone kana function words get no substring fallback unless `full`
            if runs.is_empty() && (full || !is_function_word) {
                log::debug!("no hits from {start_idx}, searching substrings of {}", lead.literal);
                let end_idx = start_idx + 1;
                let results = self.search_substrings(&annotated[start_idx], limit)?;
                deadline.check()?;
                if !results.is_empty() {
                    runs.push(RunHits {
                        end_idx,
                        run: ContextCloze::from_pieces(&pieces, start_idx, end_idx),
                        results,
                    });
                }
            }

            for run in &mut runs {
                self.append_xrefs(&mut run.results)?;
            }
            hits.push(ScoreHits {
                start_idx,
                results: runs,
            });
        }
        Ok(hits)
    }

    fn search_run(
        &self,
        run: &[AnnotatedMorpheme],
        limit: Option<usize>,
    ) -> Result<Vec<ScoreHit>, AnnotateError> {
        let readings: Vec<Vec<&str>> = run
            .iter()
            .map(|m| m.search_reading.iter().map(String::as_str).collect())
            .collect();
        let kanji: Vec<Vec<&str>> = run
            .iter()
            .map(|m| m.search_kanji.iter().map(String::as_str).collect())
            .collect();

        let queries: IndexSet<Query> = forking_paths(&readings)
            .into_iter()
            .map(|key| (SearchKind::Reading, key))
            .chain(
                forking_paths(&kanji)
                    .into_iter()
                    .filter(|key| has_kanji(key))
                    .map(|key| (SearchKind::Kanji, key)),
            )
            .collect();
        self.score_queries(queries, run, limit)
    }

    fn search_substrings(
        &self,
        morpheme: &AnnotatedMorpheme,
        limit: Option<usize>,
    ) -> Result<Vec<ScoreHit>, AnnotateError> {
        let readings = morpheme
            .search_reading
            .iter()
            .flat_map(all_substrings)
            .map(|key| (SearchKind::Reading, key));
        let kanji = morpheme
            .search_kanji
            .iter()
            .flat_map(all_substrings)
            .filter(|key| has_kanji(key))
            .map(|key| (SearchKind::Kanji, key));
        let queries: IndexSet<Query> = readings.chain(kanji).collect();
        self.score_queries(queries, std::slice::from_ref(morpheme), limit)
    }

    /// Issues every query in parallel, then scores and ranks the joined results
    /// in query order.
    fn score_queries(
        &self,
        queries: IndexSet<Query>,
        run: &[AnnotatedMorpheme],
        limit: Option<usize>,
    ) -> Result<Vec<ScoreHit>, AnnotateError> {
        let query_limit = self.options.query_limit;
        let queries: Vec<Query> = queries.into_iter().collect();
        let responses = queries
            .par_iter()
            .map(|(kind, key)| match kind {
                SearchKind::Reading => self.dictionary.reading_beginning(key, query_limit),
                SearchKind::Kanji => self.dictionary.kanji_beginning(key, query_limit),
            })
            .collect::<Result<Vec<_>, DictionaryError>>()?;

        let hits = queries
            .iter()
            .zip(responses)
            .flat_map(|((kind, key), words)| {
                words
                    .into_iter()
                    .map(move |word| self.score_hit(&word, key, *kind, run))
            })
            .collect();
        Ok(rank_hits(hits, limit))
    }

    /// `overrun·w + literal_kanji·w + lemma_kanji·w + particle·w`
    pub(crate) fn score_hit(
        &self,
        word: &Word,
        search: &str,
        kind: SearchKind,
        run: &[AnnotatedMorpheme],
    ) -> ScoreHit {
        let weights = &self.options.scoring;
        let targets: Vec<String> = match kind {
            SearchKind::Reading => word.kana_texts().map(convert_katakana_to_hiragana).collect(),
            SearchKind::Kanji => word.kanji_texts().map(str::to_string).collect(),
        };
        let overrun = overrun_penalty(search, &targets);

        let entry_kanji = kanji_set(word.kanji_texts());
        let literal_kanji = kanji_set(run.iter().map(|m| m.morpheme.literal.as_str()));
        let lemma_kanji = kanji_set(run.iter().map(|m| m.morpheme.lemma_head()));
        let literal_overlap = intersection(&literal_kanji, &entry_kanji).len() as i64;
        let lemma_overlap = intersection(&lemma_kanji, &entry_kanji).len() as i64;

        let is_particle_run = matches!(run, [only] if only.morpheme.pos0() == tags::PARTICLE);
        let particle = i64::from(is_particle_run && word.has_particle_sense());

        ScoreHit {
            word_id: word.id.clone(),
            score: weights.overrun * overrun
                + weights.literal_kanji * literal_overlap
                + weights.lemma_kanji * lemma_overlap
                + weights.particle * particle,
            search: search.to_string(),
            kind,
            tags: self.word_tags(word),
            is_xref: false,
        }
    }

    fn word_tags(&self, word: &Word) -> IndexMap<String, String> {
        let descriptions = self.dictionary.tags();
        word.tags_used()
            .into_iter()
            .filter_map(|tag| {
                descriptions
                    .get(tag)
                    .map(|description| (tag.to_string(), description.clone()))
            })
            .collect()
    }

    /// Appends a zero-score hit for every entry the run's hits cross-reference.
    fn append_xrefs(&self, hits: &mut Vec<ScoreHit>) -> Result<(), DictionaryError> {
        let ids: Vec<&str> = hits.iter().map(|hit| hit.word_id.as_str()).collect();
        if ids.is_empty() {
            return Ok(());
        }
        let words: Vec<Arc<Word>> = self.dictionary.ids_to_words(&ids)?;

        let mut appended = Vec::new();
        let mut seen = HashSet::new();
        for word in &words {
            let Some(kind) = hits.iter().find(|hit| hit.word_id == word.id).map(|hit| hit.kind)
            else {
                continue;
            };
            for xref in word.related_xrefs() {
                let search = xref.to_string();
                for target in self.dictionary.get_xrefs(xref)? {
                    if !seen.insert((target.id.clone(), search.clone())) {
                        continue;
                    }
                    appended.push(ScoreHit {
                        word_id: target.id.clone(),
                        score: 0,
                        search: search.clone(),
                        kind,
                        tags: self.word_tags(&target),
                        is_xref: true,
                    });
                }
            }
        }
        hits.extend(appended);
        Ok(())
    }
}

/// Stable sort by descending score, keep the first hit per entry, then cap.
pub fn rank_hits(mut hits: Vec<ScoreHit>, limit: Option<usize>) -> Vec<ScoreHit> {
    hits.sort_by(|a, b| b.score.cmp(&a.score));
    let mut seen = HashSet::new();
    hits.retain(|hit| seen.insert(hit.word_id.clone()));
    if let Some(limit) = limit {
        hits.truncate(limit);
    }
    hits
}

/// `min(0, |s| − |shortest target containing s|)` in characters.
///
/// Falls back to the shortest target when none contains `search`, and to `0`
/// when there are no targets.
fn overrun_penalty(search: &str, targets: &[String]) -> i64 {
    let containing = shortest(targets.iter().filter(|t| t.contains(search)));
    let Some(target_len) = containing.or_else(|| shortest(targets.iter())) else {
        return 0;
    };
    (search.chars().count() as i64 - target_len as i64).min(0)
}

fn shortest<'a>(texts: impl Iterator<Item = &'a String>) -> Option<usize> {
    texts.map(|text| text.chars().count()).min()
}

fn kanji_set<'a>(texts: impl Iterator<Item = &'a str>) -> IndexSet<char> {
    texts.flat_map(str::chars).filter(|&c| is_kanji(c)).collect()
}

#[cfg(test)]
mod translator_tests {
    use super::*;
    use crate::{
        dictionary::{DictionaryIndex, Xref},
        errors::DictionaryError,
        settings::AnnotatorOptions,
        test_utils::{
            annotator_with, morpheme, TEST_ANNOTATOR, TEST_FURIGANA, TEST_KANJIDIC, TEST_PARTICLES,
        },
    };
    use pretty_assertions::assert_eq;

    /// An index whose backend is down.
    #[derive(Default)]
    struct FailingIndex {
        tags: IndexMap<String, String>,
    }

    impl DictionaryIndex for FailingIndex {
        fn reading_beginning(&self, prefix: &str, _: usize) -> Result<Vec<Arc<Word>>, DictionaryError> {
            Err(DictionaryError::Query {
                prefix: prefix.into(),
                reason: "connection reset".into(),
            })
        }
        fn kanji_beginning(&self, _: &str, _: usize) -> Result<Vec<Arc<Word>>, DictionaryError> {
            Err(DictionaryError::Unavailable("offline".into()))
        }
        fn ids_to_words(&self, _: &[&str]) -> Result<Vec<Arc<Word>>, DictionaryError> {
            Err(DictionaryError::Unavailable("offline".into()))
        }
        fn get_xrefs(&self, _: &Xref) -> Result<Vec<Arc<Word>>, DictionaryError> {
            Err(DictionaryError::Unavailable("offline".into()))
        }
        fn tags(&self) -> &IndexMap<String, String> {
            &self.tags
        }
    }

    #[test]
    fn forking_paths_is_a_cartesian_product() {
        let paths = forking_paths(&[vec!["a", "b"], vec!["c"]]);
        assert_eq!(paths, ["ac", "bc"]);
        let paths = forking_paths(&[vec!["x", "y"], vec!["1", "2", "3"], vec!["!"]]);
        assert_eq!(paths.len(), 2 * 3);
        assert_eq!(paths[..3], ["x1!", "x2!", "x3!"]);
        assert!(forking_paths(&[vec!["a"], vec![]]).is_empty());
    }

    #[test]
    fn overrun() {
        let targets = ["でんわ".to_string(), "でんわき".to_string()];
        assert_eq!(overrun_penalty("でんわ", &targets), 0);
        assert_eq!(overrun_penalty("でん", &targets), -1);
        assert_eq!(overrun_penalty("かれ", &targets), -1);
        assert_eq!(overrun_penalty("かれ", &[]), 0);
    }

    #[test]
    fn exact_kana_match_scores_zero() {
        let sore = morpheme("それ", "ソレ", "それ", "pronoun", "", "");
        let run = [AnnotatedMorpheme::new(&sore, TEST_ANNOTATOR.furigana.as_ref()).unwrap()];
        let word = TEST_ANNOTATOR.dictionary.ids_to_words(&["1009"]).unwrap();
        let hit = TEST_ANNOTATOR.score_hit(&word[0], "それ", SearchKind::Reading, &run);
        assert_eq!(hit.score, 0);
    }

    #[test]
    fn particle_bonus_needs_a_particle_sense() {
        let ni = morpheme("に", "ニ", "に", "particle-case", "", "");
        let run = [AnnotatedMorpheme::new(&ni, TEST_ANNOTATOR.furigana.as_ref()).unwrap()];
        let words = TEST_ANNOTATOR.dictionary.ids_to_words(&["1004", "1005"]).unwrap();
        let particle = TEST_ANNOTATOR.score_hit(&words[0], "に", SearchKind::Reading, &run);
        let cargo = TEST_ANNOTATOR.score_hit(&words[1], "に", SearchKind::Reading, &run);
        assert_eq!(particle.score, 5);
        assert_eq!(cargo.score, 0);
        assert_eq!(particle.tags.get("prt").map(String::as_str), Some("particle"));
    }

    fn hit(id: &str, score: i64) -> ScoreHit {
        ScoreHit {
            word_id: id.into(),
            score,
            search: id.into(),
            kind: SearchKind::Reading,
            tags: IndexMap::new(),
            is_xref: false,
        }
    }

    #[test]
    fn ranking_is_stable_and_deduplicated() {
        let hits = vec![hit("a", 1), hit("b", 3), hit("c", 1), hit("b", 1), hit("d", 3)];
        let ranked = rank_hits(hits, None);
        let ids: Vec<_> = ranked.iter().map(|h| (h.word_id.as_str(), h.score)).collect();
        assert_eq!(ids, [("b", 3), ("d", 3), ("a", 1), ("c", 1)]);
        assert_eq!(rank_hits(ranked, Some(2)).len(), 2);
    }

    #[test]
    fn noun_run_hits_and_xrefs() {
        let morphemes = [morpheme("電話", "デンワ", "電話", "noun-common-suru_possible", "", "")];
        let hits = TEST_ANNOTATOR
            .enumerate_dictionary_hits(&morphemes, true, None)
            .unwrap();
        assert_eq!(hits.len(), 1);
        let run = &hits[0].results[0];
        assert_eq!(run.end_idx, 1);
        assert_eq!(run.run, ContextCloze::Bare("電話".into()));
        let ranked: Vec<_> = run
            .results
            .iter()
            .map(|h| (h.word_id.as_str(), h.score, h.is_xref))
            .collect();
        assert_eq!(
            ranked,
            [("1000", 6, false), ("1001", -4, false), ("1001", 0, true)]
        );
        assert_eq!(run.results[0].kind, SearchKind::Reading);
        assert_eq!(run.results[2].search, "電話機");
    }

    #[test]
    fn window_is_bounded() {
        let morphemes: Vec<Morpheme> = (0..8)
            .map(|_| morpheme("彼", "カレ", "彼", "pronoun", "", ""))
            .collect();
        let hits = TEST_ANNOTATOR
            .enumerate_dictionary_hits(&morphemes, true, Some(3))
            .unwrap();
        for start in &hits {
            for run in &start.results {
                assert!(run.end_idx - start.start_idx <= 5);
                assert!(run.results.len() <= 3 + run.results.iter().filter(|h| h.is_xref).count());
            }
        }
    }

    #[test]
    fn fallback_only_without_hits() {
        let morphemes = [
            morpheme("彼", "カレ", "彼", "pronoun", "", ""),
            morpheme("電話線", "デンワセン", "電話線", "noun-common-general", "", ""),
        ];
        let hits = TEST_ANNOTATOR
            .enumerate_dictionary_hits(&morphemes, true, None)
            .unwrap();
        let direct = &hits[0].results;
        assert!(direct
            .iter()
            .flat_map(|run| &run.results)
            .all(|h| h.search == "かれ" || h.search == "彼" || h.is_xref));

        let fallback = &hits[1].results;
        assert_eq!(fallback.len(), 1);
        assert_eq!(fallback[0].end_idx, 2);
        assert_eq!(fallback[0].run, ContextCloze::new("彼", "電話線", ""));
        let ids: IndexSet<_> = fallback[0].results.iter().map(|h| h.word_id.as_str()).collect();
        assert!(ids.contains("1000"));
    }

    #[test]
    fn function_words_are_skipped_unless_full() {
        let morphemes = [
            morpheme("彼", "カレ", "彼", "pronoun", "", ""),
            morpheme("に", "ニ", "に", "particle-case", "", ""),
        ];
        let partial = TEST_ANNOTATOR
            .enumerate_dictionary_hits(&morphemes, false, None)
            .unwrap();
        assert!(partial[1].results.is_empty());
        let full = TEST_ANNOTATOR
            .enumerate_dictionary_hits(&morphemes, true, None)
            .unwrap();
        assert_eq!(full[1].results[0].results[0].word_id, "1004");
    }

    #[test]
    fn katakana_reading_finds_a_kana_entry() {
        let morphemes = [morpheme("それ", "ソレ", "其れ", "pronoun", "", "")];
        let hits = TEST_ANNOTATOR
            .enumerate_dictionary_hits(&morphemes, false, None)
            .unwrap();
        let run = &hits[0].results[0];
        assert_eq!(run.end_idx, 1);
        let first = &run.results[0];
        assert_eq!(
            (first.word_id.as_str(), first.kind, first.search.as_str()),
            ("1009", SearchKind::Reading, "それ")
        );
    }

    #[test]
    fn index_failure_fails_the_request() {
        let annotator = Annotator::new(
            Arc::new(FailingIndex::default()),
            TEST_FURIGANA.clone(),
            TEST_KANJIDIC.clone(),
            TEST_PARTICLES.clone(),
            AnnotatorOptions::default(),
        )
        .unwrap();
        let morphemes = [morpheme("電話", "デンワ", "電話", "noun-common-suru_possible", "", "")];
        let err = annotator
            .enumerate_dictionary_hits(&morphemes, true, None)
            .unwrap_err();
        assert!(matches!(err, AnnotateError::Dictionary(_)), "{err}");
    }

    #[test]
    fn deadline_fails_the_request() {
        let annotator = annotator_with(AnnotatorOptions {
            sentence_deadline_ms: Some(0),
            ..AnnotatorOptions::default()
        });
        let morphemes = [morpheme("彼", "カレ", "彼", "pronoun", "", "")];
        let err = annotator
            .enumerate_dictionary_hits(&morphemes, true, None)
            .unwrap_err();
        assert!(matches!(err, AnnotateError::DeadlineExceeded { .. }), "{err}");
    }
}
