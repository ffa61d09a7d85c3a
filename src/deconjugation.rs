//! Recovers dictionary forms and inflection paths for conjugated spans.

use indexmap::IndexMap;

use crate::{
    annotation::Deconjugated,
    dictionary::{pick_furigana, FuriganaDatabase},
    errors::FuriganaError,
    language::{
        ja::{
            japanese::{convert_katakana_to_hiragana, is_kanji, kanji_count},
            transforms::{
                COPULA, ICHIDAN_VERB_CONDITIONS, I_ADJECTIVE_CONDITIONS, JAPANESE_TRANSFORMS,
                NA_ADJECTIVE_CONDITIONS, OTHER_VERB_CONDITIONS,
            },
        },
        transformer::{ConditionError, LanguageTransformer},
    },
    morpheme::{tags, Morpheme},
};

/// Label used when the surface already is the dictionary form.
pub const DICTIONARY_FORM: &str = "dictionary";

/// Verb or adjective handling for a span, decided from one morpheme's tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handling {
    Verb { ichidan: bool },
    Adjective { i_adjective: bool },
}

impl Handling {
    pub fn of(morpheme: &Morpheme) -> Self {
        if morpheme.is_i_adjective() {
            return Self::Adjective { i_adjective: true };
        }
        if morpheme.pos0() == tags::ADJECTIVAL_NOUN || morpheme.is_copula() {
            return Self::Adjective { i_adjective: false };
        }
        Self::Verb {
            ichidan: morpheme.is_ichidan(),
        }
    }
}

pub struct Deconjugator {
    transformer: LanguageTransformer,
}

impl Deconjugator {
    pub fn new(max_results: usize) -> Result<Self, ConditionError> {
        Ok(Self {
            transformer: LanguageTransformer::new(&JAPANESE_TRANSFORMS, max_results)?,
        })
    }

    /// Every inflection path from `conjugated` back to `dictionary_form` as a verb.
    pub fn verb_deconjugate(
        &self,
        conjugated: &str,
        dictionary_form: &str,
        ichidan: bool,
    ) -> Vec<Deconjugated> {
        self.run(Handling::Verb { ichidan }, conjugated, dictionary_form, true)
    }

    /// Na-adjectives and the copula are matched against their stem plus `だ`.
    pub fn adj_deconjugate(
        &self,
        conjugated: &str,
        dictionary_form: &str,
        i_adjective: bool,
    ) -> Vec<Deconjugated> {
        self.run(Handling::Adjective { i_adjective }, conjugated, dictionary_form, true)
    }

    /// With `allow_identity` unset, an untransformed surface is not a match.
    fn run(
        &self,
        handling: Handling,
        conjugated: &str,
        dictionary_form: &str,
        allow_identity: bool,
    ) -> Vec<Deconjugated> {
        match handling {
            Handling::Verb { ichidan: true } => {
                self.deconjugate(conjugated, dictionary_form, ICHIDAN_VERB_CONDITIONS, allow_identity)
            }
            Handling::Verb { ichidan: false } => {
                self.deconjugate(conjugated, dictionary_form, OTHER_VERB_CONDITIONS, allow_identity)
            }
            Handling::Adjective { i_adjective: true } => {
                self.deconjugate(conjugated, dictionary_form, I_ADJECTIVE_CONDITIONS, allow_identity)
            }
            Handling::Adjective { i_adjective: false } => {
                let stem = dictionary_form
                    .strip_suffix("です")
                    .or_else(|| dictionary_form.strip_suffix(COPULA))
                    .unwrap_or(dictionary_form);
                let target = format!("{stem}{COPULA}");
                self.deconjugate(conjugated, &target, NA_ADJECTIVE_CONDITIONS, allow_identity)
            }
        }
    }

    fn deconjugate(
        &self,
        conjugated: &str,
        target: &str,
        conditions: &[&str],
        allow_identity: bool,
    ) -> Vec<Deconjugated> {
        let flags = self
            .transformer
            .get_condition_flags_from_condition_types(conditions);
        let mut found: IndexMap<String, Deconjugated> = IndexMap::new();
        for candidate in self.transformer.transform(conjugated) {
            if candidate.text != target
                || (candidate.trace.is_empty() && !allow_identity)
                || !LanguageTransformer::conditions_match(candidate.conditions, flags)
            {
                continue;
            }
            let mut reasons: Vec<String> = candidate
                .trace
                .iter()
                .map(|frame| frame.transform.to_string())
                .collect();
            let conjugation = reasons.pop().unwrap_or_else(|| DICTIONARY_FORM.to_string());
            let deconjugated = Deconjugated {
                auxiliaries: reasons,
                conjugation,
                result: vec![conjugated.to_string()],
            };
            found.entry(deconjugated.dedup_key()).or_insert(deconjugated);
        }
        found.into_values().collect()
    }

    /// Deconjugations of `span` in two passes, trailing suffixes merged first.
    ///
    /// Returns an empty list when neither pass nor either repair finds a path.
    pub fn reconcile(
        &self,
        span: &[Morpheme],
        furigana: &dyn FuriganaDatabase,
    ) -> Result<Vec<Deconjugated>, FuriganaError> {
        let Some(lead) = span.first() else {
            return Ok(Vec::new());
        };
        let cloze: String = span.iter().map(|m| m.literal.as_str()).collect();

        let mut passes = Vec::with_capacity(2);
        // A nominal suffix (電話中) has no conjugation to recover.
        if let Some(suffix_idx) = span
            .iter()
            .rposition(Morpheme::is_suffix)
            .filter(|&idx| span[idx].inflects())
        {
            let suffix = &span[suffix_idx];
            let head: String = span[..suffix_idx].iter().map(|m| m.literal.as_str()).collect();
            passes.push(Pass {
                anchor: suffix,
                handling: Handling::of(suffix),
                dictionary_form: format!("{head}{}", suffix.lemma_head()),
                allow_identity: true,
            });
        }
        let mut unmerged = lead.lemma_head().to_string();
        let suru_appended = lead.is_suru_noun() && span.len() > 1;
        if suru_appended {
            unmerged.push_str("する");
        }
        passes.push(Pass {
            anchor: lead,
            handling: Handling::of(lead),
            dictionary_form: unmerged,
            allow_identity: suru_appended || lead.inflects(),
        });

        let mut merged: IndexMap<String, Deconjugated> = IndexMap::new();
        for pass in passes {
            for deconjugated in self.reconcile_pass(&pass, &cloze, furigana)? {
                merged.entry(deconjugated.dedup_key()).or_insert(deconjugated);
            }
        }
        Ok(merged.into_values().collect())
    }

    fn reconcile_pass(
        &self,
        pass: &Pass<'_>,
        cloze: &str,
        furigana: &dyn FuriganaDatabase,
    ) -> Result<Vec<Deconjugated>, FuriganaError> {
        let mut dictionary_form = pass.dictionary_form.clone();
        if kanji_count(cloze) != kanji_count(&dictionary_form) {
            if let Some(repaired) =
                repair_with_furigana(&dictionary_form, pass.anchor, cloze, furigana)?
            {
                log::debug!("repaired dictionary form {dictionary_form} -> {repaired}");
                dictionary_form = repaired;
            }
        }

        let found = self.run(pass.handling, cloze, &dictionary_form, pass.allow_identity);
        if !found.is_empty() || kanji_count(cloze) != kanji_count(&dictionary_form) {
            return Ok(found);
        }
        let swapped = kanji_swaps(cloze, &dictionary_form)
            .find_map(|candidate| {
                let found = self.run(pass.handling, cloze, &candidate, pass.allow_identity);
                (!found.is_empty()).then(|| {
                    log::debug!("kanji swap {dictionary_form} -> {candidate} matched {cloze}");
                    found
                })
            })
            .unwrap_or_default();
        Ok(swapped)
    }
}

/// One reconciliation attempt anchored on a single morpheme of the span.
struct Pass<'a> {
    anchor: &'a Morpheme,
    handling: Handling,
    dictionary_form: String,
    allow_identity: bool,
}

/// Replaces the furigana parts of the anchor's lemma, wherever it sits inside
/// `dictionary_form`, whose kanji do not appear in `surface` by their readings.
fn repair_with_furigana(
    dictionary_form: &str,
    anchor: &Morpheme,
    surface: &str,
    furigana: &dyn FuriganaDatabase,
) -> Result<Option<String>, FuriganaError> {
    let lemma = anchor.lemma_head();
    let Some(at) = dictionary_form.find(lemma).filter(|_| !lemma.is_empty()) else {
        return Ok(None);
    };
    let (head, rest) = (&dictionary_form[..at], &dictionary_form[at + lemma.len()..]);
    let entries = furigana.lookup(lemma)?;
    let reading = convert_katakana_to_hiragana(&anchor.lemma_reading);
    let Some(entry) = pick_furigana(&entries, &reading) else {
        return Ok(None);
    };
    let mut repaired = String::with_capacity(dictionary_form.len());
    repaired.push_str(head);
    for ruby in &entry.furigana {
        match &ruby.rt {
            Some(rt) if !ruby.ruby.chars().all(|c| surface.contains(c)) => repaired.push_str(rt),
            _ => repaired.push_str(&ruby.ruby),
        }
    }
    repaired.push_str(rest);
    Ok(Some(repaired))
}

/// `dictionary_form` with its first 1, 2, … kanji replaced by those of `surface`.
fn kanji_swaps<'a>(surface: &'a str, dictionary_form: &'a str) -> impl Iterator<Item = String> + 'a {
    let surface_kanji: Vec<char> = surface.chars().filter(|&c| is_kanji(c)).collect();
    (1..=surface_kanji.len()).map(move |n| {
        let mut replaced = 0;
        dictionary_form
            .chars()
            .map(|c| {
                if is_kanji(c) && replaced < n {
                    replaced += 1;
                    surface_kanji[replaced - 1]
                } else {
                    c
                }
            })
            .collect()
    })
}
