// Candidate Generator
// Persona-shaped stochastic rewrites of the semantic skeleton

use crate::models::{Candidate, LanguageProfile, PersonaProfile, Segment};
use crate::services::randomness::RandomSource;

/// Style variants and their density multipliers, in generation order.
pub const VARIANT_CONSERVATIVE: (&str, f64) = ("conservative", 1.0);
pub const VARIANT_MESSY: (&str, f64) = ("messy", 1.4);
pub const VARIANT_MEDIUM: (&str, f64) = ("medium", 1.2);

/// Number of candidates produced for a skeleton of `segment_count` segments.
pub fn candidate_count(segment_count: usize) -> usize {
    if segment_count > 2 {
        3
    } else {
        2
    }
}

/// Shape every segment under one variant and join the results with single spaces.
///
/// Effects are independent draws composed as
/// hedge → connector → core → self-correction → emotion.
pub fn apply_persona_shaping(
    segments: &[Segment],
    persona: &PersonaProfile,
    profile: &LanguageProfile,
    multiplier: f64,
    rng: &mut dyn RandomSource,
) -> String {
    let sep = profile.clause_separator();
    let mut reshaped = Vec::with_capacity(segments.len());

    for (i, seg) in segments.iter().enumerate() {
        let mut sentence = seg.core.clone();

        if rng.chance(persona.hedge_density * multiplier) {
            if let Some(hedge) = rng.pick(&profile.hedges) {
                sentence = format!("{hedge}{sep}{sentence}");
            }
        }

        if i > 0 && rng.chance(persona.connector_density) {
            if let Some(connector) = rng.pick(&profile.connectors) {
                sentence = format!("{connector}{sep}{sentence}");
            }
        }

        if rng.chance(persona.self_correction_density * multiplier) {
            if let Some(correction) = rng.pick(&profile.self_corrections) {
                sentence = format!("{sentence} — {correction}{sep}{}", seg.core);
            }
        }

        if rng.chance(persona.emotional_marker_density * multiplier) {
            if let Some(emotion) = rng.pick(&profile.emotional) {
                sentence = format!("{sentence}{sep}{emotion}");
            }
        }

        reshaped.push(sentence);
    }

    reshaped.join(" ")
}

/// Produce the conservative and messy variants, plus medium for longer inputs.
pub fn generate_candidates(
    segments: &[Segment],
    persona: &PersonaProfile,
    profile: &LanguageProfile,
    rng: &mut dyn RandomSource,
) -> Vec<Candidate> {
    let mut variants = vec![VARIANT_CONSERVATIVE, VARIANT_MESSY];
    if segments.len() > 2 {
        variants.push(VARIANT_MEDIUM);
    }

    variants
        .into_iter()
        .map(|(variant, multiplier)| Candidate {
            text: apply_persona_shaping(segments, persona, profile, multiplier, rng),
            variant: variant.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::humanize::skeleton::extract_semantic_skeleton;
    use crate::services::profiles::{get_language_profile, get_persona_profile};
    use crate::services::randomness::{always, never, FixedRandom, RngSource};
    use crate::services::text_processor::split_sentences;

    fn segments(text: &str, lang: &str) -> Vec<Segment> {
        let profile = get_language_profile(lang);
        extract_semantic_skeleton(&split_sentences(text, profile), profile)
    }

    #[test]
    fn test_candidate_count_depends_on_segments() {
        let en = get_language_profile("en");
        let persona = get_persona_profile("casual_writer");
        let mut rng = RngSource::seeded(7);

        let two = generate_candidates(&segments("One here. Two here.", "en"), persona, en, &mut rng);
        assert_eq!(two.len(), 2);
        assert_eq!(two[0].variant, "conservative");
        assert_eq!(two[1].variant, "messy");

        let three = generate_candidates(&segments("One. Two. Three.", "en"), persona, en, &mut rng);
        assert_eq!(three.len(), 3);
        assert_eq!(three[2].variant, "medium");
        assert_eq!(candidate_count(3), 3);
        assert_eq!(candidate_count(0), 2);
    }

    #[test]
    fn test_no_effects_joins_cores() {
        let en = get_language_profile("en");
        let persona = get_persona_profile("casual_writer");
        let segs = segments("I think this is good. And it ships!", "en");
        let text = apply_persona_shaping(&segs, persona, en, 1.0, &mut never());
        assert_eq!(text, "this is good it ships");
    }

    #[test]
    fn test_variant_multipliers_scale_markers_but_not_connectors() {
        // casual_writer: hedge 0.15, connector 0.20, correction 0.08, emotion 0.12.
        // A draw of 0.19 clears hedge only at x1.4, and connector at every multiplier.
        let en = get_language_profile("en");
        let persona = get_persona_profile("casual_writer");
        let segs = segments("One. Two. Three.", "en");
        let out = generate_candidates(&segs, persona, en, &mut FixedRandom(0.19));

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].variant, "conservative");
        assert_eq!(out[0].text, "One and, Two and, Three");
        assert_eq!(out[1].variant, "messy");
        assert_eq!(
            out[1].text,
            "I feel like, One and, I feel like, Two and, I feel like, Three"
        );
        assert_eq!(out[2].variant, "medium");
        assert_eq!(out[2].text, "One and, Two and, Three");
    }

    #[test]
    fn test_all_effects_compose_in_order() {
        let en = get_language_profile("en");
        let persona = get_persona_profile("casual_writer");
        let segs = segments("This is good. It ships.", "en");
        let text = apply_persona_shaping(&segs, persona, en, 1.0, &mut always());
        assert_eq!(
            text,
            "I think, This is good — actually, This is good, wow \
             but, I think, It ships — actually, It ships, wow"
        );
    }

    #[test]
    fn test_chinese_uses_fullwidth_separator() {
        let zh = get_language_profile("zh-Hans");
        let persona = get_persona_profile("casual_writer");
        let segs = segments("这是一个测试。", "zh-Hans");
        let text = apply_persona_shaping(&segs, persona, zh, 1.0, &mut always());
        assert_eq!(text, "说实话，这是一个测试 — 不对，这是一个测试，哇");
    }

    #[test]
    fn test_empty_skeleton_yields_empty_candidates() {
        let en = get_language_profile("en");
        let persona = get_persona_profile("casual_writer");
        let out = generate_candidates(&[], persona, en, &mut always());
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|c| c.text.is_empty()));
    }
}
