//! Reader for MeCab (UniDic) morpheme lines grouped by CaboCha chunk headers.
//!
//! ```text
//! * 0 1D 0/1 0.0
//! 彼	カレ	カレ	彼	代名詞
//! に	ニ	ニ	に	助詞-格助詞
//! EOS
//! ```
//!
//! Morpheme lines carry `surface, pronunciation, lemma reading, lemma, POS,
//! inflection type, inflection form`, tab-separated. Tags are translated to
//! English so the rest of the crate never sees UniDic's Japanese tag names.

use unicode_normalization::UnicodeNormalization;
use wana_kana::ConvertJapanese;

use crate::{
    language::ja::japanese::is_kana,
    morpheme::{Bunsetsu, Morpheme, ParsedSentence},
};

const END_OF_SENTENCE: &str = "EOS";
const CHUNK_HEADER: &str = "* ";
const TAG_SEPARATOR: char = '-';
const EMPTY_FIELD: &str = "*";

#[rustfmt::skip]
const PART_OF_SPEECH_TAGS: &[(&str, &str)] = &[
    ("代名詞", "pronoun"),
    ("副詞", "adverb"),
    ("助動詞", "auxiliary_verb"),
    ("助詞", "particle"),
    ("係助詞", "binding"),
    ("副助詞", "adverbial"),
    ("格助詞", "case"),
    ("接続助詞", "conjunctive"),
    ("準体助詞", "nominal"),
    ("終助詞", "sentence_final"),
    ("動詞", "verb"),
    ("非自立可能", "non_independent"),
    ("名詞", "noun"),
    ("普通名詞", "common"),
    ("固有名詞", "proper"),
    ("人名", "personal_name"),
    ("地名", "place_name"),
    ("国", "country"),
    ("姓", "surname"),
    ("名", "given_name"),
    ("数詞", "numeral"),
    ("サ変可能", "suru_possible"),
    ("副詞可能", "adverbial_possible"),
    ("助数詞", "counter"),
    ("助数詞可能", "counter_possible"),
    ("形状詞可能", "adjectival_noun_possible"),
    ("サ変形状詞可能", "suru_adjectival_noun_possible"),
    ("形状詞", "adjectival_noun"),
    ("タリ", "taru"),
    ("形容詞", "adjective"),
    ("連体詞", "adnominal"),
    ("接続詞", "conjunction"),
    ("感動詞", "interjection"),
    ("フィラー", "filler"),
    ("接頭辞", "prefix"),
    ("接尾辞", "suffix"),
    ("名詞的", "nominal"),
    ("形容詞的", "adjectival"),
    ("動詞的", "verbal"),
    ("形状詞的", "adjectival_noun_like"),
    ("補助記号", "supplementary_symbol"),
    ("句点", "period"),
    ("読点", "comma"),
    ("括弧開", "bracket_open"),
    ("括弧閉", "bracket_close"),
    ("記号", "symbol"),
    ("文字", "character"),
    ("空白", "blank"),
    ("一般", "general"),
];

#[rustfmt::skip]
const INFLECTION_TYPE_TAGS: &[(&str, &str)] = &[
    ("五段", "godan"),
    ("上一段", "kamiichidan"),
    ("下一段", "shimoichidan"),
    ("サ行変格", "sa_irregular"),
    ("カ行変格", "ka_irregular"),
    ("形容詞", "adjective"),
    ("助動詞", "auxiliary"),
    ("文語", "classical"),
    ("ワア行", "wa_a"),
];

#[rustfmt::skip]
const INFLECTION_FORM_TAGS: &[(&str, &str)] = &[
    ("終止形", "conclusive"),
    ("連用形", "continuative"),
    ("連体形", "attributive"),
    ("未然形", "irrealis"),
    ("仮定形", "hypothetical"),
    ("命令形", "imperative"),
    ("已然形", "realis"),
    ("意志推量形", "volitional"),
    ("語幹", "stem"),
    ("ク語法", "ku_wording"),
    ("一般", "general"),
    ("促音便", "geminate"),
    ("撥音便", "nasal"),
    ("イ音便", "i_euphonic"),
    ("ウ音便", "u_euphonic"),
    ("融合", "fusional"),
    ("省略", "abbreviated"),
    ("補助", "auxiliary"),
];

fn lookup(table: &'static [(&'static str, &'static str)], tag: &str) -> Option<&'static str> {
    table.iter().find(|(ja, _)| *ja == tag).map(|(_, en)| *en)
}

/// Conjugation rows (`カ行`) and auxiliary names (`チャウ`) are romanized.
fn translate_inflection_type(component: &str) -> String {
    if let Some(en) = lookup(INFLECTION_TYPE_TAGS, component) {
        return en.to_string();
    }
    let kana = component.strip_suffix('行').unwrap_or(component);
    if !kana.is_empty() && kana.chars().all(is_kana) {
        return kana.to_romaji();
    }
    component.to_string()
}

fn translate(tag: &str, component: impl Fn(&str) -> String) -> Vec<String> {
    tag.split(TAG_SEPARATOR).map(component).collect()
}

fn translate_with(table: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> String {
    move |component: &str| lookup(table, component).map_or_else(|| component.to_string(), str::to_string)
}

fn optional_field(fields: &[String], index: usize) -> Option<&str> {
    fields
        .get(index)
        .map(String::as_str)
        .filter(|field| !field.is_empty() && *field != EMPTY_FIELD)
}

/// One morpheme line, or `None` when it lacks the required fields.
pub fn parse_morpheme(line: &str) -> Option<Morpheme> {
    let fields: Vec<String> = line.split('\t').map(|f| f.nfc().collect()).collect();
    if fields.len() < 5 || fields[0].is_empty() {
        return None;
    }
    Some(Morpheme {
        literal: fields[0].clone(),
        pronunciation: fields[1].clone(),
        lemma_reading: fields[2].clone(),
        lemma: fields[3].clone(),
        part_of_speech: translate(&fields[4], translate_with(PART_OF_SPEECH_TAGS)),
        inflection_type: optional_field(&fields, 5)
            .map(|tag| translate(tag, translate_inflection_type)),
        inflection: optional_field(&fields, 6)
            .map(|tag| translate(tag, translate_with(INFLECTION_FORM_TAGS))),
    })
}

#[derive(Default)]
struct SentenceBuilder {
    morphemes: Vec<Morpheme>,
    chunks: Vec<Vec<Morpheme>>,
}

impl SentenceBuilder {
    fn push(&mut self, morpheme: Morpheme) {
        if self.chunks.is_empty() {
            self.chunks.push(Vec::new());
        }
        if let Some(chunk) = self.chunks.last_mut() {
            chunk.push(morpheme.clone());
        }
        self.morphemes.push(morpheme);
    }

    fn finish(&mut self, sentences: &mut Vec<ParsedSentence>) {
        let SentenceBuilder { morphemes, chunks } = std::mem::take(self);
        if morphemes.is_empty() {
            return;
        }
        let bunsetsus = chunks
            .into_iter()
            .filter(|chunk| !chunk.is_empty())
            .map(Bunsetsu::from)
            .collect();
        sentences.push(ParsedSentence {
            morphemes,
            bunsetsus,
        });
    }
}

/// Every sentence in `text`. Malformed morpheme lines are logged and skipped.
pub fn parse_lattice(text: &str) -> Vec<ParsedSentence> {
    let mut sentences = Vec::new();
    let mut current = SentenceBuilder::default();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if line == END_OF_SENTENCE {
            current.finish(&mut sentences);
            continue;
        }
        if line.starts_with(CHUNK_HEADER) {
            current.chunks.push(Vec::new());
            continue;
        }
        match parse_morpheme(line) {
            Some(morpheme) => current.push(morpheme),
            None => log::warn!("skipping malformed analyzer line {}: {line:?}", number + 1),
        }
    }
    current.finish(&mut sentences);
    sentences
}
