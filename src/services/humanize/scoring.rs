// Candidate Scoring
// Human-likeness, persona fidelity, risk and semantic shift, fused into a final score
//
// All signals are rule-based surface heuristics. Scores are recomputed from
// scratch for every candidate on every iteration.

use crate::models::{Candidate, LanguageProfile, PersonaProfile, ScoreResult};
use crate::services::text_processor::split_sentences;

use super::metrics::{lexical_variety, marker_hits, semantic_shift, sentence_length_variance};

const HUMAN_BASE: f64 = 30.0;
const HUMAN_VARIANCE_CAP: f64 = 30.0;
const HUMAN_VARIETY_CAP: f64 = 25.0;
const HUMAN_IMPERFECTION_CAP: f64 = 15.0;

const W_HUMAN: f64 = 0.40;
const W_FIDELITY: f64 = 0.30;
const W_RISK: f64 = 0.20;
const W_SHIFT: f64 = 0.10;

/// Variance (in characters) at which sentence rhythm stops counting as uniform.
const UNIFORMITY_SPAN: f64 = 20.0;

/// Everything the scorer needs that stays fixed for one run.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub original_text: &'a str,
    pub persona: &'a PersonaProfile,
    pub profile: &'a LanguageProfile,
}

fn density_ratio(observed: f64, target: f64) -> f64 {
    (observed / target.max(0.01)).min(1.0)
}

/// How closely the text's markers track the persona's target densities, in [0, 1].
pub fn imperfection_score(text: &str, sentence_count: usize, ctx: &ScoringContext<'_>) -> f64 {
    let n = sentence_count.max(1) as f64;
    let hedge = marker_hits(text, &ctx.profile.hedges) as f64 / n;
    let correction = marker_hits(text, &ctx.profile.self_corrections) as f64 / n;
    let emotion = marker_hits(text, &ctx.profile.emotional) as f64 / n;

    let score = 0.4 * density_ratio(hedge, ctx.persona.hedge_density)
        + 0.3 * density_ratio(correction, ctx.persona.self_correction_density)
        + 0.3 * density_ratio(emotion, ctx.persona.emotional_marker_density);
    score.clamp(0.0, 1.0)
}

pub fn human_score(length_variance: f64, variety: f64, imperfection: f64) -> f64 {
    let score = HUMAN_BASE
        + (length_variance * 2.0).min(HUMAN_VARIANCE_CAP)
        + (variety * 50.0).min(HUMAN_VARIETY_CAP)
        + (imperfection * 50.0).min(HUMAN_IMPERFECTION_CAP);
    score.clamp(0.0, 100.0)
}

pub fn persona_fidelity(text: &str, sentences: &[String], ctx: &ScoringContext<'_>) -> f64 {
    let count = sentences.len();
    let total_chars: usize = sentences.iter().map(|s| s.chars().count()).sum();
    let avg_len = total_chars as f64 / count.max(1) as f64;

    let preferred = ctx.persona.preferred_length().unwrap_or(ctx.profile.default_sentence_length) as f64;
    let length_match = 1.0 - ((avg_len - preferred).abs() / preferred.max(1.0)).min(1.0);

    let hedges = marker_hits(text, &ctx.profile.hedges) as f64;
    let expected = (count as f64 * ctx.persona.hedge_density).ceil().max(1.0);
    let hedge_match = (hedges / expected).min(1.0);

    (0.6 * length_match + 0.4 * hedge_match).clamp(0.0, 1.0)
}

/// Uniformity and repetition risk in [0, 100]; lower reads as more natural.
pub fn risk_score(length_variance: f64, variety: f64) -> f64 {
    let uniformity = 1.0 - length_variance / UNIFORMITY_SPAN;
    let repetition = 1.0 - variety;
    (uniformity * 50.0 + repetition * 50.0).clamp(0.0, 100.0)
}

pub fn final_score(human: f64, fidelity: f64, risk: f64, shift: f64) -> f64 {
    let score = W_HUMAN * (human / 100.0)
        + W_FIDELITY * fidelity
        + W_RISK * (1.0 - risk / 100.0)
        + W_SHIFT * (1.0 - shift);
    score.clamp(0.0, 1.0)
}

pub fn score_candidate(candidate: &Candidate, ctx: &ScoringContext<'_>) -> ScoreResult {
    let text = candidate.text.as_str();
    let sentences = split_sentences(text, ctx.profile);
    let length_variance = sentence_length_variance(text, ctx.profile);
    let variety = lexical_variety(text, ctx.profile);
    let imperfection = imperfection_score(text, sentences.len(), ctx);

    let human = human_score(length_variance, variety, imperfection);
    let fidelity = persona_fidelity(text, &sentences, ctx);
    let risk = risk_score(length_variance, variety);
    let shift = semantic_shift(ctx.original_text, text, ctx.profile);

    ScoreResult {
        text: candidate.text.clone(),
        variant: candidate.variant.clone(),
        human_score: human,
        persona_fidelity: fidelity,
        risk_score: risk,
        semantic_shift: shift,
        final_score: final_score(human, fidelity, risk, shift),
    }
}

/// Highest final score wins; ties go to lower risk, then higher fidelity, then
/// the earliest candidate.
pub fn select_best(scored: &[ScoreResult]) -> Option<&ScoreResult> {
    let mut best: Option<&ScoreResult> = None;
    for candidate in scored {
        let Some(current) = best else {
            best = Some(candidate);
            continue;
        };
        let better = candidate.final_score > current.final_score
            || (candidate.final_score == current.final_score
                && (candidate.risk_score < current.risk_score
                    || (candidate.risk_score == current.risk_score
                        && candidate.persona_fidelity > current.persona_fidelity)));
        if better {
            best = Some(candidate);
        }
    }
    best
}
