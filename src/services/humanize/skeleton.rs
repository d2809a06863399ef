// Semantic Skeleton
// Reduce each sentence to its core idea by peeling hedges, connectors and trailing enders

use crate::models::{LanguageProfile, Segment};

/// Strip `marker` from the start of `s` (case-insensitive), together with any
/// following whitespace and one optional comma.
///
/// For whitespace scripts the marker must end on a word boundary.
fn strip_leading_marker<'a>(s: &'a str, marker: &str, profile: &LanguageProfile) -> Option<&'a str> {
    if marker.is_empty() {
        return None;
    }

    let mut marker_chars = marker.chars();
    let mut end = 0usize;
    for (idx, ch) in s.char_indices() {
        match marker_chars.next() {
            Some(m) if ch.to_lowercase().eq(m.to_lowercase()) => end = idx + ch.len_utf8(),
            Some(_) => return None,
            None => break,
        }
    }
    if marker_chars.next().is_some() {
        return None;
    }

    let rest = &s[end..];
    if !profile.is_cjk() {
        let marker_ends_in_word = marker.chars().last().map_or(false, char::is_alphanumeric);
        let next_is_word = rest.chars().next().map_or(false, char::is_alphanumeric);
        if marker_ends_in_word && next_is_word {
            return None;
        }
    }

    let rest = rest.trim_start();
    let rest = rest
        .strip_prefix(',')
        .or_else(|| rest.strip_prefix('，'))
        .unwrap_or(rest);
    Some(rest.trim_start())
}

/// Apply each marker rule once, in list order.
fn strip_marker_rules<'a>(mut s: &'a str, markers: &[String], profile: &LanguageProfile) -> &'a str {
    for marker in markers {
        if let Some(rest) = strip_leading_marker(s, marker, profile) {
            s = rest;
        }
    }
    s
}

/// Core idea of one sentence: leading hedge and connector removed, trailing
/// sentence-ending punctuation stripped.
pub fn extract_core_idea(sentence: &str, profile: &LanguageProfile) -> String {
    let trimmed = sentence.trim();
    let core = strip_marker_rules(trimmed, &profile.hedges, profile);
    let core = strip_marker_rules(core, &profile.connectors, profile);

    let body = core.trim_end_matches(|c: char| profile.is_ender(c)).trim();

    if body.is_empty() {
        // Nothing left to rewrite; keep the sentence intact.
        return sentence.to_string();
    }
    body.to_string()
}

pub fn extract_semantic_skeleton(sentences: &[String], profile: &LanguageProfile) -> Vec<Segment> {
    sentences
        .iter()
        .map(|sentence| {
            Segment {
                original: sentence.clone(),
                core: extract_core_idea(sentence, profile),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::profiles::get_language_profile;

    #[test]
    fn test_strips_leading_hedge_and_enders() {
        let en = get_language_profile("en");
        assert_eq!(extract_core_idea("I think this is good.", en), "this is good");
        assert_eq!(extract_core_idea("I think, this is good.", en), "this is good");
        assert_eq!(extract_core_idea("i THINK this is good?!", en), "this is good");
    }

    #[test]
    fn test_hedge_then_connector() {
        let en = get_language_profile("en");
        assert_eq!(extract_core_idea("Honestly, but it works.", en), "it works");
        assert_eq!(extract_core_idea("However, the plan failed!", en), "the plan failed");
    }

    #[test]
    fn test_rules_apply_in_list_order() {
        let en = get_language_profile("en");
        // "I think" precedes "honestly" in the hedge list, so only "honestly" is peeled here.
        assert_eq!(extract_core_idea("Honestly, I think it works.", en), "I think it works");
        // Reverse order peels both.
        assert_eq!(extract_core_idea("I think honestly it works.", en), "it works");
    }

    #[test]
    fn test_marker_requires_word_boundary() {
        let en = get_language_profile("en");
        assert_eq!(extract_core_idea("Sometimes it rains.", en), "Sometimes it rains");
        assert_eq!(extract_core_idea("Butter is tasty.", en), "Butter is tasty");
        assert_eq!(extract_core_idea("So it rains.", en), "it rains");
    }

    #[test]
    fn test_overlapping_hedge_and_connector_lists() {
        // "actually" is both a hedge and a self-correction; as a hedge it is stripped
        // before the connector pass sees the sentence.
        let en = get_language_profile("en");
        assert_eq!(extract_core_idea("Actually, so we left.", en), "we left");
    }

    #[test]
    fn test_empty_core_keeps_original() {
        let en = get_language_profile("en");
        assert_eq!(extract_core_idea("Maybe.", en), "Maybe.");
        assert_eq!(extract_core_idea("...", en), "...");
    }

    #[test]
    fn test_chinese_hedge_and_connector() {
        let zh = get_language_profile("zh-Hans");
        assert_eq!(extract_core_idea("我觉得，但是这个方案不错。", zh), "这个方案不错");
        assert_eq!(extract_core_idea("这是一个测试。", zh), "这是一个测试");
    }

    #[test]
    fn test_skeleton_per_sentence() {
        let en = get_language_profile("en");
        let sentences = vec!["I think this is good.".to_string(), "And it ships!".to_string()];
        let segments = extract_semantic_skeleton(&sentences, en);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].original, "I think this is good.");
        assert_eq!(segments[0].core, "this is good");
        assert_eq!(segments[1].core, "it ships");
        assert_eq!(segments[1].original, "And it ships!");
    }
}
