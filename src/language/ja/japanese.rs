/// 1 - minInclusive
/// 2 - maxInclusive
pub type CodepointRange = (u32, u32);

pub const HIRAGANA_CONVERSION_RANGE: CodepointRange = (0x3041, 0x3096);
pub const KATAKANA_CONVERSION_RANGE: CodepointRange = (0x30a1, 0x30f6);

pub const HIRAGANA_RANGE: CodepointRange = (0x3040, 0x309f);
pub const KATAKANA_RANGE: CodepointRange = (0x30a0, 0x30ff);

pub const KANA_RANGES: &[CodepointRange] = &[HIRAGANA_RANGE, KATAKANA_RANGE];

pub const CJK_IDEOGRAPH_RANGES: &[CodepointRange] = &[
    (0x4e00, 0x9fff),   // CJK unified ideographs
    (0x3400, 0x4dbf),   // extension A
    (0x20000, 0x2a6df), // extension B
    (0x2a700, 0x2ebef), // extensions C-F
    (0xf900, 0xfaff),   // compatibility ideographs
];

/// Separates a UniDic lemma from its English gloss, as in `シャツ-shirt`.
pub const LEMMA_GLOSS_SEPARATOR: char = '-';

pub fn is_code_point_in_range(code_point: u32, (min, max): CodepointRange) -> bool {
    code_point >= min && code_point <= max
}

pub fn is_code_point_in_ranges(code_point: u32, ranges: &[CodepointRange]) -> bool {
    ranges
        .iter()
        .any(|&range| is_code_point_in_range(code_point, range))
}

pub fn is_kanji(c: char) -> bool {
    is_code_point_in_ranges(c as u32, CJK_IDEOGRAPH_RANGES)
}

pub fn is_kana(c: char) -> bool {
    is_code_point_in_ranges(c as u32, KANA_RANGES)
}

pub fn is_katakana(c: char) -> bool {
    is_code_point_in_range(c as u32, KATAKANA_RANGE)
}

pub fn has_kanji<T: AsRef<str>>(text: T) -> bool {
    text.as_ref().chars().any(is_kanji)
}

pub fn kanji_count<T: AsRef<str>>(text: T) -> usize {
    text.as_ref().chars().filter(|&c| is_kanji(c)).count()
}

pub fn is_string_entirely_kana<T: AsRef<str>>(text: T) -> bool {
    let text = text.as_ref();
    !text.is_empty() && text.chars().all(is_kana)
}

pub fn is_string_entirely_katakana<T: AsRef<str>>(text: T) -> bool {
    let text = text.as_ref();
    !text.is_empty() && text.chars().all(is_katakana)
}

/// Shifts katakana into the hiragana block. Prolonged sound marks and
/// the small ヵ/ヶ have no hiragana counterpart and are kept.
pub fn convert_katakana_to_hiragana<T: AsRef<str>>(text: T) -> String {
    let offset = KATAKANA_CONVERSION_RANGE.0 - HIRAGANA_CONVERSION_RANGE.0;
    text.as_ref()
        .chars()
        .map(|c| {
            let code_point = c as u32;
            match c {
                'ヵ' | 'ヶ' => c,
                _ if is_code_point_in_range(code_point, KATAKANA_CONVERSION_RANGE) => {
                    char::from_u32(code_point - offset).unwrap_or(c)
                }
                _ => c,
            }
        })
        .collect()
}

/// `シャツ-shirt` → `シャツ`. A lemma that is nothing but the separator is kept.
pub fn strip_lemma_gloss(lemma: &str) -> &str {
    match lemma.split_once(LEMMA_GLOSS_SEPARATOR) {
        Some((head, _)) if !head.is_empty() => head,
        _ => lemma,
    }
}
