use std::hash::Hash;

use indexmap::IndexSet;

/// Every contiguous, non-empty substring of `text`, ordered by start
/// position and then by length. Duplicates keep their first position.
pub fn all_substrings<T: AsRef<str>>(text: T) -> IndexSet<String> {
    let chars: Vec<char> = text.as_ref().chars().collect();
    let mut substrings = IndexSet::new();
    for start in 0..chars.len() {
        for end in start + 1..=chars.len() {
            substrings.insert(chars[start..end].iter().collect());
        }
    }
    substrings
}

/// Intersects two sets, always iterating over the smaller one and probing
/// the larger.
pub fn intersection<'a, T: Hash + Eq>(a: &'a IndexSet<T>, b: &'a IndexSet<T>) -> IndexSet<&'a T> {
    if a.len() > b.len() {
        return intersection(b, a);
    }
    a.iter().filter(|item| b.contains(*item)).collect()
}

#[cfg(test)]
mod text_utilities_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn substrings_of_three_chars() {
        let subs: Vec<String> = all_substrings("でんわ").into_iter().collect();
        assert_eq!(subs, ["で", "でん", "でんわ", "ん", "んわ", "わ"]);
    }

    #[test]
    fn substrings_dedupe() {
        assert_eq!(all_substrings("ああ").len(), 2);
        assert!(all_substrings("").is_empty());
    }

    #[test]
    fn intersection_is_symmetric() {
        let small: IndexSet<char> = "電話".chars().collect();
        let large: IndexSet<char> = "携帯電話機".chars().collect();
        assert_eq!(intersection(&small, &large).len(), 2);
        assert_eq!(intersection(&large, &small).len(), 2);
        assert!(intersection(&small, &IndexSet::new()).is_empty());
    }
}
