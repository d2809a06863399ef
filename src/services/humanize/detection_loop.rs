// Detection Loop
// generate -> score -> (deform -> score)* until every candidate passes or the
// iteration cap is reached; the best candidate ever scored is returned.

use crate::models::{Candidate, EffectiveThresholds, EngineMode, LanguageProfile, PersonaProfile, ScoreResult, Segment};
use crate::services::pipeline::PipelineError;
use crate::services::randomness::RandomSource;
use crate::services::step_recorder::StepLog;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use super::candidates::generate_candidates;
use super::deformation::deform_candidate;
use super::scoring::{score_candidate, select_best, ScoringContext};

/// Fixed inputs of one loop run.
#[derive(Debug, Clone, Copy)]
pub struct LoopContext<'a> {
    pub original_text: &'a str,
    pub persona: &'a PersonaProfile,
    pub profile: &'a LanguageProfile,
    pub mode: &'a EngineMode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationSummary {
    pub iteration: u32,
    pub scores: Vec<ScoreResult>,
    pub iteration_best: f64,
    pub best_ever: f64,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    pub best: ScoreResult,
    pub converged: bool,
    pub thresholds: EffectiveThresholds,
    pub iterations: Vec<IterationSummary>,
}

fn ensure_finite(scored: &[ScoreResult]) -> Result<(), PipelineError> {
    for s in scored {
        let values = [s.human_score, s.persona_fidelity, s.risk_score, s.semantic_shift, s.final_score];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::Numeric(format!(
                "non-finite score for variant '{}'",
                s.variant
            )));
        }
    }
    Ok(())
}

/// Next round's candidates: passing ones carry through untouched, the rest are deformed.
pub fn advance_candidates(
    scored: &[ScoreResult],
    thresholds: &EffectiveThresholds,
    ctx: &LoopContext<'_>,
    rng: &mut dyn RandomSource,
) -> Vec<Candidate> {
    scored
        .iter()
        .map(|s| {
            if thresholds.accepts(s) {
                s.to_candidate()
            } else {
                deform_candidate(&s.to_candidate(), ctx.persona, ctx.profile, ctx.mode, rng)
            }
        })
        .collect()
}

pub fn run_detection_loop(
    segments: &[Segment],
    ctx: &LoopContext<'_>,
    rng: &mut dyn RandomSource,
    log: &mut StepLog<'_>,
) -> Result<DetectionOutcome, PipelineError> {
    let thresholds = EffectiveThresholds::derive(ctx.persona, ctx.mode);
    let scoring = ScoringContext {
        original_text: ctx.original_text,
        persona: ctx.persona,
        profile: ctx.profile,
    };

    let mut candidates = generate_candidates(segments, ctx.persona, ctx.profile, rng);
    let mut best_ever: Option<ScoreResult> = None;
    let mut iterations = Vec::new();
    let mut converged = false;

    for iteration in 1..=ctx.mode.max_detection_loops {
        let scored: Vec<ScoreResult> = candidates.iter().map(|c| score_candidate(c, &scoring)).collect();
        ensure_finite(&scored)?;

        let iteration_best = select_best(&scored)
            .cloned()
            .ok_or_else(|| PipelineError::Internal("no candidates to score".to_string()))?;

        if best_ever
            .as_ref()
            .map_or(true, |b| iteration_best.final_score > b.final_score)
        {
            best_ever = Some(iteration_best.clone());
        }
        let best_ever_score = best_ever.as_ref().map_or(0.0, |b| b.final_score);

        converged = scored.iter().all(|s| thresholds.accepts(s));

        log.record(
            "detection_loop",
            true,
            json!({
                "iteration": iteration,
                "candidateCount": scored.len(),
                "bestHumanScore": iteration_best.human_score,
                "bestRiskScore": iteration_best.risk_score,
                "bestSemanticShift": iteration_best.semantic_shift,
                "converged": converged,
            }),
        );
        debug!(
            trace_id = %log.trace_id(),
            iteration,
            candidates = scored.len(),
            best_final = iteration_best.final_score,
            best_risk = iteration_best.risk_score,
            converged,
            "[DETECTION_LOOP] iteration scored"
        );

        iterations.push(IterationSummary {
            iteration,
            scores: scored.clone(),
            iteration_best: iteration_best.final_score,
            best_ever: best_ever_score,
            converged,
        });

        if converged {
            break;
        }

        candidates = advance_candidates(&scored, &thresholds, ctx, rng);
    }

    let best = best_ever.ok_or_else(|| PipelineError::Internal("detection loop ran zero iterations".to_string()))?;

    Ok(DetectionOutcome {
        best,
        converged,
        thresholds,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::humanize::skeleton::extract_semantic_skeleton;
    use crate::services::profiles::{get_engine_mode, get_language_profile, get_persona_profile};
    use crate::services::randomness::{never, RngSource};
    use crate::services::step_recorder::{MemoryRecorder, NoopRecorder};
    use crate::services::text_processor::split_sentences;

    const TEXT: &str = "The system works well. The system works well. The system works well.";

    fn segments(text: &str) -> Vec<Segment> {
        let en = get_language_profile("en");
        extract_semantic_skeleton(&split_sentences(text, en), en)
    }

    fn ctx<'a>(persona: &'a PersonaProfile, mode: &'a EngineMode) -> LoopContext<'a> {
        LoopContext {
            original_text: TEXT,
            persona,
            profile: get_language_profile("en"),
            mode,
        }
    }

    #[test]
    fn test_non_converging_run_uses_full_cap_and_returns_best_ever() {
        let persona = get_persona_profile("casual_writer");
        let mode = get_engine_mode("balanced");
        let rec = NoopRecorder;
        let mut log = StepLog::new(&rec, "hl_test");

        // Identical sentences and no decoration: risk stays far above 35.
        let outcome = run_detection_loop(&segments(TEXT), &ctx(persona, mode), &mut never(), &mut log).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations.len(), 3);
        assert!(!outcome.best.text.is_empty());

        let best_seen = outcome
            .iterations
            .iter()
            .flat_map(|it| it.scores.iter())
            .map(|s| s.final_score)
            .fold(f64::MIN, f64::max);
        assert_eq!(outcome.best.final_score, best_seen);
        let found = outcome
            .iterations
            .iter()
            .flat_map(|it| it.scores.iter())
            .any(|s| s.text == outcome.best.text);
        assert!(found);
    }

    #[test]
    fn test_candidate_count_is_stable_and_scores_in_range() {
        let persona = get_persona_profile("creator_influencer");
        let mode = get_engine_mode("creative");
        let rec = NoopRecorder;
        for seed in 0..20u64 {
            let mut log = StepLog::new(&rec, "hl_test");
            let mut rng = RngSource::seeded(seed);
            let outcome = run_detection_loop(&segments(TEXT), &ctx(persona, mode), &mut rng, &mut log).unwrap();
            assert!(outcome.iterations.len() <= 2);

            let mut previous_best = f64::MIN;
            for it in &outcome.iterations {
                assert_eq!(it.scores.len(), 3);
                assert!(it.best_ever >= previous_best);
                previous_best = it.best_ever;
                for s in &it.scores {
                    assert!((0.0..=100.0).contains(&s.human_score));
                    assert!((0.0..=100.0).contains(&s.risk_score));
                    assert!((0.0..=1.0).contains(&s.persona_fidelity));
                    assert!((0.0..=1.0).contains(&s.semantic_shift));
                    assert!((0.0..=1.0).contains(&s.final_score));
                }
            }
        }
    }

    #[test]
    fn test_converges_immediately_when_thresholds_are_loose() {
        let mut persona = get_persona_profile("casual_writer").clone();
        persona.target_risk = 100.0;
        persona.max_semantic_shift = 1.0;
        let mut mode = get_engine_mode("balanced").clone();
        mode.global_target_risk = 100.0;
        mode.global_max_semantic_shift = 1.0;

        let rec = MemoryRecorder::new();
        let mut log = StepLog::new(&rec, "hl_test");
        let outcome = run_detection_loop(&segments(TEXT), &ctx(&persona, &mode), &mut never(), &mut log).unwrap();
        assert!(outcome.converged);
        assert_eq!(outcome.iterations.len(), 1);

        let steps = rec.steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].step_name, "detection_loop");
        assert_eq!(steps[0].detail["converged"], true);
    }

    #[test]
    fn test_effective_thresholds_reported() {
        let persona = get_persona_profile("professional_editor"); // risk 45, shift 0.05
        let mode = get_engine_mode("balanced"); // risk 38, shift 0.08
        let rec = NoopRecorder;
        let mut log = StepLog::new(&rec, "hl_test");
        let outcome = run_detection_loop(&segments(TEXT), &ctx(persona, mode), &mut never(), &mut log).unwrap();
        assert_eq!(outcome.thresholds.target_risk, 38.0);
        assert_eq!(outcome.thresholds.max_semantic_shift, 0.05);
    }

    fn scored(text: &str, variant: &str, risk: f64, shift: f64) -> ScoreResult {
        ScoreResult {
            text: text.to_string(),
            variant: variant.to_string(),
            human_score: 60.0,
            persona_fidelity: 0.5,
            risk_score: risk,
            semantic_shift: shift,
            final_score: 0.5,
        }
    }

    #[test]
    fn test_mixed_round_deforms_only_failing_candidates() {
        let persona = get_persona_profile("casual_writer");
        let mode = get_engine_mode("balanced");
        let ctx = ctx(persona, mode);
        let thresholds = EffectiveThresholds::derive(persona, mode); // risk 35, shift 0.08

        let round = vec![
            scored("Keep this one.", "conservative", 10.0, 0.0),
            scored("One here. Two there!", "messy", 90.0, 0.0),
            scored("Too far off.", "medium", 10.0, 0.5),
        ];
        let next = advance_candidates(&round, &thresholds, &ctx, &mut never());

        assert_eq!(next.len(), 3);
        assert_eq!(next[0].variant, "conservative");
        assert_eq!(next[0].text, "Keep this one.");
        assert_eq!(next[1].variant, "messy_deformed");
        assert_eq!(next[1].text, "One here. Two there!");
        assert_eq!(next[2].variant, "medium_deformed");
    }

    #[test]
    fn test_zero_iteration_cap_is_an_internal_fault() {
        let persona = get_persona_profile("casual_writer");
        let mut mode = get_engine_mode("balanced").clone();
        mode.max_detection_loops = 0;
        let rec = NoopRecorder;
        let mut log = StepLog::new(&rec, "hl_test");
        let err = run_detection_loop(&segments(TEXT), &ctx(persona, &mode), &mut never(), &mut log).unwrap_err();
        assert!(matches!(err, PipelineError::Internal(_)));
    }
}
