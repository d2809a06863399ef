// Deformation
// Mutate candidates that miss the run's risk or shift ceilings

use crate::models::{Candidate, EngineMode, LanguageProfile, PersonaProfile, WordBoundary};
use crate::services::randomness::RandomSource;
use crate::services::text_processor::{split_sentences, tokenize};

const MERGE_PROBABILITY: f64 = 0.15;
const SPLIT_PROBABILITY: f64 = 0.25;
const SPLIT_MIN_CHARS: usize = 50;
const HEDGE_BOOST: f64 = 1.5;
const CORRECTION_BOOST: f64 = 1.5;
const EMOTION_BOOST: f64 = 1.3;
const CORRECTION_ECHO_UNITS: usize = 3;

/// Byte index of the space closest to the character midpoint (earlier space on ties).
fn nearest_space_to_midpoint(s: &str) -> Option<usize> {
    let mid = s.chars().count() / 2;
    s.char_indices()
        .enumerate()
        .filter(|(_, (_, c))| *c == ' ')
        .map(|(char_pos, (byte_idx, _))| (char_pos.abs_diff(mid), byte_idx))
        .filter(|&(_, byte_idx)| byte_idx > 0)
        .min_by_key(|&(distance, byte_idx)| (distance, byte_idx))
        .map(|(_, byte_idx)| byte_idx)
}

/// The first few units of a sentence at the language's own granularity:
/// whitespace words for spaced scripts, 2-codepoint units for CJK.
fn leading_units(sentence: &str, profile: &LanguageProfile, n: usize) -> String {
    match profile.word_boundary {
        WordBoundary::Whitespace => sentence.split_whitespace().take(n).collect::<Vec<_>>().join(" "),
        WordBoundary::CharacterPairs => tokenize(sentence, profile).into_iter().take(n).collect(),
    }
}

/// Restructure one candidate: merges, splits, and extra hedges, corrections
/// and emotional markers, all scaled by the mode's aggressiveness.
pub fn deform_candidate(
    candidate: &Candidate,
    persona: &PersonaProfile,
    profile: &LanguageProfile,
    mode: &EngineMode,
    rng: &mut dyn RandomSource,
) -> Candidate {
    let aggressiveness = mode.deformation_aggressiveness;
    let sep = profile.clause_separator();
    let sentences = split_sentences(&candidate.text, profile);
    let mut deformed: Vec<String> = Vec::with_capacity(sentences.len() + 2);

    let mut i = 0;
    while i < sentences.len() {
        let mut sentence = sentences[i].clone();

        if i + 1 < sentences.len() && rng.chance(MERGE_PROBABILITY * aggressiveness) {
            sentence = format!("{sentence} {}", sentences[i + 1]);
            i += 1;
        }

        // Length counts the whole sentence, enders included
        if sentence.chars().count() > SPLIT_MIN_CHARS && rng.chance(SPLIT_PROBABILITY * aggressiveness) {
            if let Some(at) = nearest_space_to_midpoint(&sentence) {
                deformed.push(sentence[..at].trim_end().to_string());
                sentence = sentence[at + 1..].trim_start().to_string();
            }
        }

        if rng.chance(persona.hedge_density * HEDGE_BOOST * aggressiveness) {
            if let Some(hedge) = rng.pick(&profile.hedges) {
                sentence = format!("{hedge}{sep}{sentence}");
            }
        }

        if rng.chance(persona.self_correction_density * CORRECTION_BOOST * aggressiveness) {
            if let Some(correction) = rng.pick(&profile.self_corrections) {
                let echo = leading_units(&sentence, profile, CORRECTION_ECHO_UNITS);
                sentence = format!("{sentence} — {correction}{sep}{echo}");
            }
        }

        if rng.chance(persona.emotional_marker_density * EMOTION_BOOST * aggressiveness) {
            if let Some(emotion) = rng.pick(&profile.emotional) {
                sentence = format!("{sentence}{sep}{emotion}");
            }
        }

        deformed.push(sentence);
        i += 1;
    }

    Candidate {
        text: deformed.join(" "),
        variant: format!("{}_deformed", candidate.variant),
    }
}
