//! Japanese deinflection rules.
//!
//! Verb rules are generated from a table of conjugation classes rather than
//! spelled out per ending: each class knows its dictionary ending and the
//! stems its inflections attach to.

use std::sync::LazyLock;

use crate::language::transformer::{
    suffix_inflection, Condition, LanguageTransformDescriptor, SuffixRule, Transform,
};

pub const ICHIDAN_VERB_CONDITIONS: &[&str] = &["v1"];
pub const OTHER_VERB_CONDITIONS: &[&str] = &["v5", "vk", "vs"];
pub const I_ADJECTIVE_CONDITIONS: &[&str] = &["adj-i"];
pub const NA_ADJECTIVE_CONDITIONS: &[&str] = &["adj-na"];

/// Dictionary ending every na-adjective and copula is compared with.
pub const COPULA: &str = "だ";

struct VerbClass {
    condition: &'static str,
    dictionary: String,
    irrealis: String,
    /// Stem taking the classical negative ず.
    irrealis_classical: String,
    continuative: String,
    te: String,
    ta: String,
    hypothetical: String,
    volitional: String,
    imperative: Vec<String>,
    passive: String,
    causative: String,
    potential: Vec<String>,
}

/// `[dictionary, a, i, e, o, te, ta]` per godan row.
#[rustfmt::skip]
const GODAN_ROWS: [[&str; 7]; 9] = [
    ["う", "わ", "い", "え", "お", "って", "った"],
    ["く", "か", "き", "け", "こ", "いて", "いた"],
    ["ぐ", "が", "ぎ", "げ", "ご", "いで", "いだ"],
    ["す", "さ", "し", "せ", "そ", "して", "した"],
    ["つ", "た", "ち", "て", "と", "って", "った"],
    ["ぬ", "な", "に", "ね", "の", "んで", "んだ"],
    ["ぶ", "ば", "び", "べ", "ぼ", "んで", "んだ"],
    ["む", "ま", "み", "め", "も", "んで", "んだ"],
    ["る", "ら", "り", "れ", "ろ", "って", "った"],
];

fn godan(prefix: &str, row: &[&str; 7], te: &str, ta: &str) -> VerbClass {
    let [u, a, i, e, o, ..] = (*row).map(|kana| format!("{prefix}{kana}"));
    VerbClass {
        condition: "v5",
        dictionary: u,
        irrealis: a.clone(),
        irrealis_classical: a.clone(),
        continuative: i,
        te: format!("{prefix}{te}"),
        ta: format!("{prefix}{ta}"),
        hypothetical: e.clone(),
        volitional: format!("{o}う"),
        imperative: vec![e.clone()],
        passive: format!("{a}れる"),
        causative: format!("{a}せる"),
        potential: vec![format!("{e}る")],
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

static VERB_CLASSES: LazyLock<Vec<VerbClass>> = LazyLock::new(|| {
    let mut classes: Vec<VerbClass> = GODAN_ROWS
        .iter()
        .map(|row| godan("", row, row[5], row[6]))
        .collect();
    // 行く is the one godan く verb with a geminate te-form.
    for iku in ["行", "い"] {
        classes.push(godan(iku, &GODAN_ROWS[1], "って", "った"));
    }
    classes.push(VerbClass {
        condition: "v1",
        dictionary: "る".into(),
        irrealis: "".into(),
        irrealis_classical: "".into(),
        continuative: "".into(),
        te: "て".into(),
        ta: "た".into(),
        hypothetical: "れ".into(),
        volitional: "よう".into(),
        imperative: strings(&["ろ", "よ"]),
        passive: "られる".into(),
        causative: "させる".into(),
        potential: strings(&["られる", "れる"]),
    });
    classes.push(VerbClass {
        condition: "vs",
        dictionary: "する".into(),
        irrealis: "し".into(),
        irrealis_classical: "せ".into(),
        continuative: "し".into(),
        te: "して".into(),
        ta: "した".into(),
        hypothetical: "すれ".into(),
        volitional: "しよう".into(),
        imperative: strings(&["しろ", "せよ"]),
        passive: "される".into(),
        causative: "させる".into(),
        potential: strings(&["できる"]),
    });
    for (ku, ko, ki) in [("く", "こ", "き"), ("来", "来", "来")] {
        classes.push(VerbClass {
            condition: "vk",
            dictionary: format!("{ku}る"),
            irrealis: ko.into(),
            irrealis_classical: ko.into(),
            continuative: ki.into(),
            te: format!("{ki}て"),
            ta: format!("{ki}た"),
            hypothetical: format!("{ku}れ"),
            volitional: format!("{ko}よう"),
            imperative: vec![format!("{ko}い")],
            passive: format!("{ko}られる"),
            causative: format!("{ko}させる"),
            potential: vec![format!("{ko}られる"), format!("{ko}れる")],
        });
    }
    classes
});

/// One rule per verb class per inflected form produced by `forms`.
fn verb_rules(
    conditions_in: &[&'static str],
    forms: impl Fn(&VerbClass) -> Vec<String>,
) -> Vec<SuffixRule> {
    let mut rules = Vec::new();
    for class in VERB_CLASSES.iter() {
        for inflected in forms(class) {
            rules.push(suffix_inflection(
                inflected,
                class.dictionary.clone(),
                conditions_in,
                &[class.condition],
            ));
        }
    }
    rules
}

/// `食べて` → `食べちゃ`, `読んで` → `読んじゃ`.
fn contract_te(te: &str) -> Option<String> {
    if let Some(stem) = te.strip_suffix('て') {
        return Some(format!("{stem}ちゃ"));
    }
    te.strip_suffix('で').map(|stem| format!("{stem}じゃ"))
}

fn transform(name: &'static str, description: &'static str, rules: Vec<SuffixRule>) -> Transform {
    Transform {
        name,
        description: Some(description),
        rules,
    }
}

fn with(mut rules: Vec<SuffixRule>, extra: impl IntoIterator<Item = SuffixRule>) -> Vec<SuffixRule> {
    rules.extend(extra);
    rules
}

fn condition(name: &'static str, is_dictionary_form: bool) -> Condition {
    Condition {
        name,
        is_dictionary_form,
        sub_conditions: &[],
    }
}

pub static JAPANESE_TRANSFORMS: LazyLock<LanguageTransformDescriptor> =
    LazyLock::new(|| LanguageTransformDescriptor {
        language: "ja",
        conditions: vec![
            (
                "v",
                Condition {
                    name: "Verb",
                    is_dictionary_form: false,
                    sub_conditions: &["v1", "v5", "vk", "vs"],
                },
            ),
            ("v1", condition("Ichidan verb", true)),
            ("v5", condition("Godan verb", true)),
            ("vk", condition("Kuru verb", true)),
            ("vs", condition("Suru verb", true)),
            ("adj-i", condition("Adjective with i ending", true)),
            ("adj-na", condition("Adjectival noun or copula", true)),
            ("-ます", condition("Polite -ます ending", false)),
            ("-ません", condition("Polite negative -ません ending", false)),
            ("-て", condition("Intermediate -て endings for progressive or perfect tense", false)),
        ],
        transforms: japanese_transforms(),
    });

fn japanese_transforms() -> Vec<Transform> {
    vec![
        transform(
            "-ば",
            "Conditional form; attach ば to the hypothetical form of verbs and i-adjectives.",
            with(
                verb_rules(&[], |c| vec![format!("{}ば", c.hypothetical)]),
                [
                    suffix_inflection("ければ", "い", &[], &["adj-i"]),
                    suffix_inflection("ならば", "だ", &[], &["adj-na"]),
                    suffix_inflection("なら", "だ", &[], &["adj-na"]),
                ],
            ),
        ),
        transform(
            "-ちゃ",
            "Contraction of -ては.",
            verb_rules(&[], |c| contract_te(&c.te).into_iter().collect()),
        ),
        transform(
            "-ちゃう",
            "Contraction of -てしまう.",
            verb_rules(&["v5"], |c| {
                contract_te(&c.te).map(|s| format!("{s}う")).into_iter().collect()
            }),
        ),
        transform(
            "-たい",
            "Expresses desire for the speaker to do something.",
            verb_rules(&["adj-i"], |c| vec![format!("{}たい", c.continuative)]),
        ),
        transform(
            "-ます",
            "Polite conjugation of verbs.",
            verb_rules(&["-ます"], |c| vec![format!("{}ます", c.continuative)]),
        ),
        transform(
            "negative",
            "Negative form of verbs, adjectives and the copula.",
            with(
                verb_rules(&["adj-i"], |c| vec![format!("{}ない", c.irrealis)]),
                [
                    suffix_inflection("くない", "い", &["adj-i"], &["adj-i"]),
                    suffix_inflection("じゃない", "だ", &["adj-i"], &["adj-na"]),
                    suffix_inflection("ではない", "だ", &["adj-i"], &["adj-na"]),
                    suffix_inflection("ません", "ます", &["-ません"], &["-ます"]),
                ],
            ),
        ),
        transform(
            "-ず",
            "Classical negative.",
            verb_rules(&[], |c| vec![format!("{}ず", c.irrealis_classical)]),
        ),
        transform(
            "-た",
            "Past tense.",
            with(
                verb_rules(&[], |c| vec![c.ta.clone()]),
                [
                    suffix_inflection("かった", "い", &[], &["adj-i"]),
                    suffix_inflection("だった", "だ", &[], &["adj-na"]),
                    suffix_inflection("でした", "だ", &[], &["adj-na"]),
                    suffix_inflection("ました", "ます", &[], &["-ます"]),
                    suffix_inflection("でした", "", &[], &["-ません"]),
                ],
            ),
        ),
        transform(
            "-て",
            "Conjunctive form.",
            with(
                verb_rules(&["-て"], |c| vec![c.te.clone()]),
                [
                    suffix_inflection("くて", "い", &["-て"], &["adj-i"]),
                    suffix_inflection("で", "だ", &["-て"], &["adj-na"]),
                    suffix_inflection("まして", "ます", &[], &["-ます"]),
                ],
            ),
        ),
        transform(
            "-たら",
            "Conditional past.",
            with(
                verb_rules(&[], |c| vec![format!("{}ら", c.ta)]),
                [
                    suffix_inflection("かったら", "い", &[], &["adj-i"]),
                    suffix_inflection("だったら", "だ", &[], &["adj-na"]),
                    suffix_inflection("ましたら", "ます", &[], &["-ます"]),
                ],
            ),
        ),
        transform(
            "-たり",
            "Lists representative actions.",
            with(
                verb_rules(&[], |c| vec![format!("{}り", c.ta)]),
                [
                    suffix_inflection("かったり", "い", &[], &["adj-i"]),
                    suffix_inflection("だったり", "だ", &[], &["adj-na"]),
                    suffix_inflection("ましたり", "ます", &[], &["-ます"]),
                ],
            ),
        ),
        transform(
            "volitional",
            "Expresses the speaker's will or a conjecture.",
            with(
                verb_rules(&[], |c| vec![c.volitional.clone()]),
                [
                    suffix_inflection("かろう", "い", &[], &["adj-i"]),
                    suffix_inflection("だろう", "だ", &[], &["adj-na"]),
                    suffix_inflection("でしょう", "だ", &[], &["adj-na"]),
                    suffix_inflection("ましょう", "ます", &[], &["-ます"]),
                ],
            ),
        ),
        transform(
            "imperative",
            "Command form.",
            verb_rules(&[], |c| c.imperative.clone()),
        ),
        transform(
            "-なさい",
            "Polite imperative.",
            verb_rules(&[], |c| vec![format!("{}なさい", c.continuative)]),
        ),
        transform(
            "passive",
            "Indicates an action received from an action performer.",
            verb_rules(&["v1"], |c| vec![c.passive.clone()]),
        ),
        transform(
            "potential",
            "Indicates a state of being able to do an action.",
            verb_rules(&["v1"], |c| c.potential.clone()),
        ),
        transform(
            "causative",
            "Describes the intention to make someone do something.",
            verb_rules(&["v1"], |c| vec![c.causative.clone()]),
        ),
        transform(
            "-そう",
            "Appearing that; looking like.",
            with(
                verb_rules(&[], |c| vec![format!("{}そう", c.continuative)]),
                [
                    suffix_inflection("そう", "い", &[], &["adj-i"]),
                    suffix_inflection("そう", "だ", &[], &["adj-na"]),
                ],
            ),
        ),
        transform(
            "-すぎる",
            "Shows something is in excess.",
            with(
                verb_rules(&["v1"], |c| {
                    vec![
                        format!("{}すぎる", c.continuative),
                        format!("{}過ぎる", c.continuative),
                    ]
                }),
                [
                    suffix_inflection("すぎる", "い", &["v1"], &["adj-i"]),
                    suffix_inflection("過ぎる", "い", &["v1"], &["adj-i"]),
                    suffix_inflection("すぎる", "だ", &["v1"], &["adj-na"]),
                ],
            ),
        ),
        transform(
            "-さ",
            "Nominalizes an adjective.",
            vec![suffix_inflection("さ", "い", &[], &["adj-i"])],
        ),
        transform(
            "-く",
            "Adverbial form of i-adjectives.",
            vec![suffix_inflection("く", "い", &[], &["adj-i"])],
        ),
        transform(
            "adverbial",
            "Adverbial form of na-adjectives.",
            vec![suffix_inflection("に", "だ", &[], &["adj-na"])],
        ),
        transform(
            "attributive",
            "Attributive form of na-adjectives.",
            vec![suffix_inflection("な", "だ", &[], &["adj-na"])],
        ),
        transform(
            "polite",
            "Polite copula.",
            vec![
                suffix_inflection("です", "だ", &[], &["adj-na"]),
                suffix_inflection("いです", "い", &[], &["adj-i"]),
            ],
        ),
        transform(
            "-しまう",
            "Shows completion or regret.",
            vec![
                suffix_inflection("てしまう", "て", &["v5"], &["-て"]),
                suffix_inflection("でしまう", "で", &["v5"], &["-て"]),
            ],
        ),
        transform(
            "-いる",
            "Progressive or perfect aspect.",
            vec![
                suffix_inflection("ている", "て", &["v1"], &["-て"]),
                suffix_inflection("でいる", "で", &["v1"], &["-て"]),
                suffix_inflection("てる", "て", &["v1"], &["-て"]),
                suffix_inflection("でる", "で", &["v1"], &["-て"]),
            ],
        ),
        transform(
            "-おく",
            "Doing something in preparation.",
            vec![
                suffix_inflection("ておく", "て", &["v5"], &["-て"]),
                suffix_inflection("でおく", "で", &["v5"], &["-て"]),
                suffix_inflection("とく", "て", &["v5"], &["-て"]),
                suffix_inflection("どく", "で", &["v5"], &["-て"]),
            ],
        ),
    ]
}
