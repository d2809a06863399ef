// Lexical Metrics
// Surface-level statistics shared by scoring and convergence checks

use crate::models::LanguageProfile;
use crate::services::text_processor::{sentence_lengths, split_sentences, tokenize};
use std::collections::HashSet;

/// Distinct tokens over total tokens; 0 for text without tokens.
pub fn lexical_variety(text: &str, profile: &LanguageProfile) -> f64 {
    let tokens = tokenize(text, profile);
    if tokens.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
    unique.len() as f64 / tokens.len() as f64
}

/// Content-bearing tokens of a text, as a set.
pub fn keywords(text: &str, profile: &LanguageProfile) -> HashSet<String> {
    tokenize(text, profile)
        .into_iter()
        .filter(|t| {
            if profile.is_cjk() {
                t.chars().count() >= 2 || !profile.stopwords.contains(t)
            } else {
                t.chars().count() >= 3 && !profile.stopwords.contains(&t.to_lowercase())
            }
        })
        .collect()
}

/// Keyword-level meaning drift: `1 - Jaccard(keywords(a), keywords(b))`.
///
/// Both sides empty is no drift (0); exactly one side empty is 0.5.
pub fn semantic_shift(original: &str, rewritten: &str, profile: &LanguageProfile) -> f64 {
    let a = keywords(original, profile);
    let b = keywords(rewritten, profile);

    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 0.0,
        (true, false) | (false, true) => return 0.5,
        _ => {}
    }

    let intersection = a.intersection(&b).count() as f64;
    let union = a.union(&b).count() as f64;
    (1.0 - intersection / union).clamp(0.0, 1.0)
}

/// Population standard deviation of sentence character counts; 0 below two sentences.
pub fn sentence_length_variance(text: &str, profile: &LanguageProfile) -> f64 {
    let sentences = split_sentences(text, profile);
    std_dev(&sentence_lengths(&sentences))
}

fn std_dev(lengths: &[usize]) -> f64 {
    if lengths.len() < 2 {
        return 0.0;
    }
    let n = lengths.len() as f64;
    let mean = lengths.iter().sum::<usize>() as f64 / n;
    let variance = lengths
        .iter()
        .map(|&len| (len as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    variance.sqrt()
}

/// Number of distinct markers that occur in the text (case-insensitive substring).
pub fn marker_hits(text: &str, markers: &[String]) -> usize {
    let lower = text.to_lowercase();
    markers
        .iter()
        .filter(|m| !m.is_empty() && lower.contains(&m.to_lowercase()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::profiles::get_language_profile;

    #[test]
    fn test_lexical_variety() {
        let en = get_language_profile("en");
        assert_eq!(lexical_variety("", en), 0.0);
        assert_eq!(lexical_variety("go go go go", en), 0.25);
        assert_eq!(lexical_variety("one two three", en), 1.0);
    }

    #[test]
    fn test_keywords_english_filters_short_and_stopwords() {
        let en = get_language_profile("en");
        let kw = keywords("The cat is on the mat with a plan", en);
        let expected: HashSet<String> = ["cat", "mat", "plan"].iter().map(|s| s.to_string()).collect();
        assert_eq!(kw, expected);
    }

    #[test]
    fn test_keywords_chinese_keeps_pairs() {
        let zh = get_language_profile("zh-Hans");
        let kw = keywords("这是一个测试。", zh);
        assert!(kw.contains("这是"));
        assert!(kw.contains("测试"));

        // A lone stopword codepoint is dropped, a lone content codepoint is kept.
        assert!(keywords("的", zh).is_empty());
        assert!(keywords("猫", zh).contains("猫"));
    }

    #[test]
    fn test_keywords_deterministic() {
        let en = get_language_profile("en");
        let text = "Rust makes systems programming approachable.";
        assert_eq!(keywords(text, en), keywords(text, en));
    }

    #[test]
    fn test_semantic_shift_edges() {
        let en = get_language_profile("en");
        assert_eq!(semantic_shift("", "", en), 0.0);
        assert_eq!(semantic_shift("a an the", "is of", en), 0.0);
        assert_eq!(semantic_shift("meaningful words", "", en), 0.5);
        assert_eq!(semantic_shift("", "meaningful words", en), 0.5);
        assert_eq!(semantic_shift("same words here", "here same words", en), 0.0);
    }

    #[test]
    fn test_semantic_shift_partial_overlap() {
        let en = get_language_profile("en");
        // {apple, banana} vs {apple, cherry}: 1 shared of 3
        let shift = semantic_shift("apple banana", "apple cherry", en);
        assert!((shift - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_sentence_length_variance() {
        let en = get_language_profile("en");
        assert_eq!(sentence_length_variance("Only one sentence.", en), 0.0);
        assert_eq!(sentence_length_variance("Abc. Abc.", en), 0.0);
        // lengths 2 and 6 -> mean 4, population sd 2
        let sd = sentence_length_variance("A. Abcde.", en);
        assert!((sd - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_marker_hits_case_insensitive_distinct() {
        let en = get_language_profile("en");
        assert_eq!(marker_hits("HONESTLY, maybe. Maybe again.", &en.hedges), 2);
        assert_eq!(marker_hits("plain text", &en.hedges), 0);
    }
}
