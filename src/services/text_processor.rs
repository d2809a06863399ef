// Text Processing Service
// Whitespace normalization, language-aware tokenization and sentence splitting

use crate::models::{LanguageProfile, WordBoundary};
use regex::Regex;
use std::sync::OnceLock;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

fn cjk_punct_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"[，。！？、；：“”‘’（）【】《》\s,.!?;:()\[\]<>'"]+"#).expect("cjk punctuation regex")
    })
}

fn non_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("non-word regex"))
}

/// Collapse every whitespace run (including newlines) to a single space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    whitespace_re().replace_all(text, " ").trim().to_string()
}

/// Language-aware tokenization.
///
/// Character-pair scripts drop punctuation and whitespace and group the remaining
/// codepoints two at a time (the last unit may be a single codepoint). Whitespace
/// scripts are lowercased, stripped of non-word characters and split on whitespace.
pub fn tokenize(text: &str, profile: &LanguageProfile) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }

    match profile.word_boundary {
        WordBoundary::CharacterPairs => {
            let cleaned = cjk_punct_re().replace_all(text, " ");
            let chars: Vec<char> = cleaned.chars().filter(|c| !c.is_whitespace()).collect();
            chars.chunks(2).map(|pair| pair.iter().collect()).collect()
        }
        WordBoundary::Whitespace => {
            let lower = text.to_lowercase();
            non_word_re()
                .replace_all(&lower, " ")
                .split_whitespace()
                .map(|t| t.to_string())
                .collect()
        }
    }
}

/// Split text into sentences using the profile's sentence-ending punctuation.
///
/// A sentence is a run of non-ender characters closed by one or more enders.
/// Enders that open the text and a trailing run without an ender are dropped;
/// text with no closed sentence at all comes back whole.
pub fn split_sentences(text: &str, profile: &LanguageProfile) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return vec![];
    }

    let mut sentences = Vec::new();
    let mut buffer = String::new();
    let mut has_body = false;
    let mut in_enders = false;

    for ch in trimmed.chars() {
        if profile.is_ender(ch) {
            if has_body {
                buffer.push(ch);
                in_enders = true;
            }
            continue;
        }

        if in_enders {
            push_sentence(&mut sentences, &buffer);
            buffer.clear();
            in_enders = false;
        }
        buffer.push(ch);
        has_body = true;
    }

    // Last closed sentence; an unterminated tail is not a sentence
    if in_enders {
        push_sentence(&mut sentences, &buffer);
    }

    if sentences.is_empty() {
        return vec![trimmed.to_string()];
    }
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let s = raw.trim();
    if !s.is_empty() {
        sentences.push(s.to_string());
    }
}

/// Character count of each sentence.
pub fn sentence_lengths(sentences: &[String]) -> Vec<usize> {
    sentences.iter().map(|s| s.chars().count()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::profiles::get_language_profile;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Hello \n\t world  "), "Hello world");
        assert_eq!(normalize_whitespace("\u{3000}你好\u{00A0}世界"), "你好 世界");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn test_tokenize_english() {
        let en = get_language_profile("en");
        assert_eq!(
            tokenize("Hello, World! It's fine.", en),
            vec!["hello", "world", "it", "s", "fine"]
        );
        assert!(tokenize("", en).is_empty());
        assert!(tokenize("?!...", en).is_empty());
    }

    #[test]
    fn test_tokenize_chinese_pairs() {
        let zh = get_language_profile("zh-Hans");
        assert_eq!(tokenize("这是一个测试。", zh), vec!["这是", "一个", "测试"]);
        assert_eq!(tokenize("你好，世界！", zh), vec!["你好", "世界"]);
        assert_eq!(tokenize("一二三", zh), vec!["一二", "三"]);
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let en = get_language_profile("en");
        let text = "The quick brown fox. The quick brown fox!";
        assert_eq!(tokenize(text, en), tokenize(text, en));
    }

    #[test]
    fn test_split_sentences_english() {
        let en = get_language_profile("en");
        assert_eq!(
            split_sentences("First one. Second one!! Third?", en),
            vec!["First one.", "Second one!!", "Third?"]
        );
        assert_eq!(split_sentences("I think this is good.", en), vec!["I think this is good."]);
    }

    #[test]
    fn test_split_sentences_without_enders_returns_whole_text() {
        let en = get_language_profile("en");
        assert_eq!(split_sentences("  no punctuation here ", en), vec!["no punctuation here"]);
        assert_eq!(split_sentences("...", en), vec!["..."]);
        assert!(split_sentences("   ", en).is_empty());
    }

    #[test]
    fn test_split_sentences_drops_unterminated_tail() {
        let en = get_language_profile("en");
        assert_eq!(split_sentences("Done. and then", en), vec!["Done."]);
        assert_eq!(split_sentences("One! Two? three", en), vec!["One!", "Two?"]);
        assert_eq!(split_sentences("?? Hi.", en), vec!["Hi."]);
    }

    #[test]
    fn test_split_sentences_chinese() {
        let zh = get_language_profile("zh-Hans");
        assert_eq!(split_sentences("这是一个测试。", zh), vec!["这是一个测试。"]);
        assert_eq!(
            split_sentences("这是第一句。这是第二句！这是第三句？", zh),
            vec!["这是第一句。", "这是第二句！", "这是第三句？"]
        );
    }
}
