use crate::{
    annotation::{ConjugatedPhrase, FillInTheBlanks, Particle},
    context_cloze::ContextCloze,
    dictionary::{pick_furigana, Furigana, Ruby},
    errors::{AnnotateError, FuriganaError},
    language::ja::japanese::convert_katakana_to_hiragana,
    morpheme::{tags, Bunsetsu, Morpheme},
    translator::Deadline,
    Annotator,
};

/// Morphemes a conjugated phrase may start on.
///
/// A chunk whose first morpheme cannot start one (`こと` in `ことちゃった`)
/// is read from its first morpheme that can.
fn can_lead_phrase(morpheme: &Morpheme) -> bool {
    let pos0 = morpheme.pos0();
    pos0 == tags::VERB
        || pos0.ends_with("_verb")
        || pos0 == tags::ADJECTIVE
        || pos0 == tags::ADJECTIVAL_NOUN
        || morpheme.is_suru_noun()
}

/// Whether `slice`, led by its first morpheme, is worth deconjugating.
fn is_conjugatable(slice: &[Morpheme]) -> bool {
    let Some(lead) = slice.first() else {
        return false;
    };
    let pos0 = lead.pos0();
    let single = slice.len() == 1;
    (single && pos0 == tags::ADJECTIVE && lead.inflection_form() != Some(tags::CONCLUSIVE))
        || pos0 == tags::VERB
        || pos0.ends_with("_verb")
        || (pos0 == tags::ADJECTIVE && !single)
        || (lead.is_suru_noun() && !single)
        || pos0 == tags::ADJECTIVAL_NOUN
        || lead.is_copula()
}

impl Annotator {
    /// Conjugated phrases and particles of a sentence, as cloze candidates.
    ///
    /// `verbose` logs each phrase and particle decision at `info` instead of `debug`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(bunsetsus = bunsetsus.len(), verbose))
    )]
    pub fn identify_fill_in_blanks(
        &self,
        bunsetsus: &[Bunsetsu],
        verbose: bool,
    ) -> Result<FillInTheBlanks, AnnotateError> {
        let deadline = Deadline::start(self.options.sentence_deadline());
        self.identify_fill_in_blanks_until(bunsetsus, verbose, &deadline)
    }

    pub(crate) fn identify_fill_in_blanks_until(
        &self,
        bunsetsus: &[Bunsetsu],
        verbose: bool,
        deadline: &Deadline,
    ) -> Result<FillInTheBlanks, AnnotateError> {
        let level = if verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        };
        let pieces: Vec<&str> = bunsetsus
            .iter()
            .flat_map(|b| b.iter())
            .map(|m| m.literal.as_str())
            .collect();

        let mut conjugated_phrases = Vec::new();
        let mut particles = Vec::new();
        let mut offset = 0;
        for bunsetsu in bunsetsus {
            deadline.check()?;
            if let Some(anchor) = bunsetsu.iter().position(can_lead_phrase) {
                for end in anchor + 1..=bunsetsu.len() {
                    let slice = &bunsetsu[anchor..end];
                    if !is_conjugatable(slice) {
                        continue;
                    }
                    let (start_idx, end_idx) = (offset + anchor, offset + end);
                    let cloze = ContextCloze::from_pieces(&pieces, start_idx, end_idx);
                    let deconj = self.deconjugator.reconcile(slice, self.furigana.as_ref())?;
                    log::log!(
                        level,
                        "{}: {} deconjugation(s) for [{start_idx}, {end_idx})",
                        cloze.cloze(),
                        deconj.len()
                    );
                    if deconj.is_empty() {
                        continue;
                    }
                    conjugated_phrases.push(ConjugatedPhrase {
                        start_idx,
                        end_idx,
                        morphemes: slice.to_vec(),
                        cloze,
                        lemmas: slice
                            .iter()
                            .map(|m| self.lemma_furigana(m))
                            .collect::<Result<_, _>>()?,
                        deconj,
                    });
                }
            }

            for (i, morpheme) in bunsetsu.iter().enumerate() {
                if !morpheme.is_particle() {
                    continue;
                }
                let start_idx = offset + i;
                let chino = self.particles.lookup_particle(morpheme);
                log::log!(
                    level,
                    "particle {} at {start_idx}: {} catalog row(s)",
                    morpheme.literal,
                    chino.len()
                );
                particles.push(Particle {
                    chino,
                    cloze: ContextCloze::from_pieces(&pieces, start_idx, start_idx + 1),
                    start_idx,
                    end_idx: start_idx + 1,
                    morphemes: vec![morpheme.clone()],
                });
            }
            offset += bunsetsu.len();
        }

        let fused = self
            .particles
            .fuse(&particles, &pieces, self.options.particle_fusion_window);
        particles.extend(fused);
        particles.sort_by_key(|p| p.start_idx);

        Ok(FillInTheBlanks {
            sentence: pieces.concat(),
            conjugated_phrases,
            particles,
        })
    }

    /// Furigana of the lemma, or the bare lemma when the database has none.
    fn lemma_furigana(&self, morpheme: &Morpheme) -> Result<Furigana, FuriganaError> {
        let lemma = morpheme.lemma_head();
        let entries = self.furigana.lookup(lemma)?;
        let reading = convert_katakana_to_hiragana(&morpheme.lemma_reading);
        Ok(pick_furigana(&entries, &reading)
            .map(|entry| entry.furigana.clone())
            .unwrap_or_else(|| vec![Ruby::plain(lemma)]))
    }
}

#[cfg(test)]
mod text_scanner_tests {
    use super::*;
    use crate::{
        mecab_unidic::parse_lattice,
        test_utils::{morpheme, read_fixture, TEST_ANNOTATOR},
    };
    use pretty_assertions::assert_eq;

    fn blanks(lattice: &str) -> FillInTheBlanks {
        let sentence = parse_lattice(&read_fixture(lattice)).remove(0);
        TEST_ANNOTATOR
            .identify_fill_in_blanks(&sentence.bunsetsus, true)
            .unwrap()
    }

    #[test]
    fn chatta_is_deconjugated() {
        let blanks = blanks("chatta.lattice");
        assert_eq!(blanks.sentence, "それは昨日のことちゃった");
        let results: Vec<&str> = blanks
            .conjugated_phrases
            .iter()
            .flat_map(|p| &p.deconj)
            .flat_map(|d| &d.result)
            .map(String::as_str)
            .collect();
        assert!(results.iter().any(|r| r.contains("ちゃった")), "{results:?}");
        let phrase = &blanks.conjugated_phrases[0];
        assert_eq!(phrase.cloze, ContextCloze::new("それは昨日のこと", "ちゃった", ""));
        assert_eq!(phrase.deconj[0].conjugation, "-た");
    }

    #[test]
    fn suru_verb_phrase() {
        let blanks = blanks("denwa.lattice");
        assert_eq!(blanks.conjugated_phrases.len(), 1);
        let phrase = &blanks.conjugated_phrases[0];
        assert_eq!((phrase.start_idx, phrase.end_idx), (2, 5));
        assert_eq!(phrase.cloze, ContextCloze::new("彼に", "電話します", ""));
        assert!(!phrase.deconj.is_empty());
        assert_eq!(
            phrase.lemmas[0],
            [
                Ruby {
                    ruby: "電".into(),
                    rt: Some("でん".into()),
                },
                Ruby {
                    ruby: "話".into(),
                    rt: Some("わ".into()),
                },
            ]
        );

        assert_eq!(blanks.particles.len(), 1);
        let ni = &blanks.particles[0];
        assert_eq!(ni.cloze, ContextCloze::new("彼", "に", "電話します"));
        assert!(!ni.chino.is_empty());
    }

    #[test]
    fn particles_fuse_across_chunks() {
        let bunsetsus = [
            Bunsetsu(vec![
                morpheme("彼", "カレ", "彼", "pronoun", "", ""),
                morpheme("に", "ニ", "に", "particle-case", "", ""),
                morpheme("は", "ハ", "は", "particle-binding", "", ""),
            ]),
            Bunsetsu(vec![morpheme("本", "ホン", "本", "noun-common-general", "", "")]),
        ];
        let blanks = TEST_ANNOTATOR.identify_fill_in_blanks(&bunsetsus, false).unwrap();
        let spans: Vec<_> = blanks
            .particles
            .iter()
            .map(|p| (p.start_idx, p.end_idx, p.cloze.cloze().to_string()))
            .collect();
        assert_eq!(
            spans,
            [
                (1, 2, "に".to_string()),
                (1, 3, "には".to_string()),
                (2, 3, "は".to_string()),
            ]
        );
        assert!(blanks.conjugated_phrases.is_empty());
    }

    #[test]
    fn noun_with_nominal_suffix_is_not_a_phrase() {
        let bunsetsus = [Bunsetsu(vec![
            morpheme("電話", "デンワ", "電話", "noun-common-suru_possible", "", ""),
            morpheme("中", "チュウ", "中", "suffix-nominal", "", ""),
        ])];
        let blanks = TEST_ANNOTATOR.identify_fill_in_blanks(&bunsetsus, false).unwrap();
        assert_eq!(blanks.sentence, "電話中");
        assert!(blanks.conjugated_phrases.is_empty(), "{:?}", blanks.conjugated_phrases);
    }

    #[test]
    fn conclusive_adjective_alone_is_not_a_phrase() {
        let takai = morpheme("高い", "タカイ", "高い", "adjective-general", "adjective", "conclusive-general");
        assert!(!is_conjugatable(std::slice::from_ref(&takai)));
        let takaku = morpheme("高く", "タカイ", "高い", "adjective-general", "adjective", "continuative-general");
        assert!(is_conjugatable(std::slice::from_ref(&takaku)));
        let koto = morpheme("こと", "コト", "事", "noun-common-general", "", "");
        assert!(!can_lead_phrase(&koto));
    }
}
