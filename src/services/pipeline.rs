// Humanize Pipeline
// preprocess -> skeleton -> persona -> detection loop, with a neutral fallback
// result whenever an internal fault interrupts a run

use crate::models::{EngineMode, PersonaProfile, PipelineRequest, PipelineResult, PipelineStep};
use crate::services::humanize::{extract_semantic_skeleton, run_detection_loop, LoopContext};
use crate::services::profiles::{
    resolve_language, validate_language, validate_mode, validate_persona, ProfileCatalog, DEFAULT_MODE,
    DEFAULT_PERSONA,
};
use crate::services::randomness::{RandomSource, RngSource};
use crate::services::step_recorder::{NoopRecorder, StepLog, StepRecorder};
use crate::services::text_processor::{normalize_whitespace, split_sentences};
use serde_json::json;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

const NEUTRAL_HUMAN_SCORE: u32 = 50;
const NEUTRAL_RISK_SCORE: u32 = 50;
const NEUTRAL_FIDELITY: f64 = 0.5;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    Input(String),
    #[error("malformed profile: {0}")]
    Profile(String),
    #[error("numeric fault: {0}")]
    Numeric(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Fresh correlation id for one run.
pub fn new_trace_id() -> String {
    format!("hl_{}", Uuid::new_v4().simple())
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "pipeline panicked".to_string()
    }
}

/// Profiles chosen for a run before any stage executes.
struct RunProfiles<'c> {
    persona_key: String,
    persona: &'c PersonaProfile,
    mode: &'c EngineMode,
    language: String,
}

/// Runs requests against one profile catalog and reports steps to one recorder.
pub struct Humanizer<'a> {
    catalog: &'a ProfileCatalog,
    recorder: &'a dyn StepRecorder,
}

impl<'a> Humanizer<'a> {
    pub fn new(catalog: &'a ProfileCatalog, recorder: &'a dyn StepRecorder) -> Self {
        Self { catalog, recorder }
    }

    /// Humanize `request.text`.
    ///
    /// Only empty or whitespace-only input is an error. Any fault after that
    /// point yields the original text with neutral scores and `degraded` set.
    pub fn run(
        &self,
        request: &PipelineRequest,
        rng: &mut dyn RandomSource,
    ) -> Result<PipelineResult, PipelineError> {
        if request.text.trim().is_empty() {
            return Err(PipelineError::Input("text must be a non-empty string".to_string()));
        }

        let trace_id = new_trace_id();
        let mut log = StepLog::new(self.recorder, &trace_id);

        // Unknown keys fall back inside the catalog; report what actually ran.
        let persona = self.catalog.persona(request.persona_key.as_deref().unwrap_or(DEFAULT_PERSONA));
        let run = RunProfiles {
            persona_key: persona.name.clone(),
            persona,
            mode: self.catalog.mode(request.mode.as_deref().unwrap_or(DEFAULT_MODE)),
            language: self
                .catalog
                .language(resolve_language(&request.text, request.language.as_deref()))
                .code
                .clone(),
        };

        info!(
            trace_id = %trace_id,
            chars = request.text.chars().count(),
            language = %run.language,
            persona = %run.persona_key,
            mode = %run.mode.name,
            "[PIPELINE] Starting humanize run"
        );

        let mut steps = Vec::new();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.run_stages(request, &run, rng, &mut log, &mut steps)
        }));

        let error = match outcome {
            Ok(Ok(result)) => {
                info!(
                    trace_id = %trace_id,
                    human_score = result.human_score,
                    risk_score = result.risk_score,
                    semantic_shift = result.semantic_shift,
                    "[PIPELINE] Run completed"
                );
                return Ok(result);
            }
            Ok(Err(e)) => e,
            Err(payload) => PipelineError::Internal(panic_message(payload.as_ref())),
        };

        warn!(trace_id = %trace_id, error = %error, "[PIPELINE] Run degraded, returning original text");
        let message = error.to_string();
        // The recorder may be what faulted
        let recorded = catch_unwind(AssertUnwindSafe(|| {
            log.record("pipeline_error", false, json!({ "error": message }));
        }));
        if recorded.is_err() {
            warn!(trace_id = %trace_id, "[PIPELINE] Step recorder panicked, pipeline_error step dropped");
        }
        steps.push(PipelineStep {
            name: "error".to_string(),
            ok: false,
            meta: Some(json!({ "message": message })),
        });

        Ok(PipelineResult {
            output_text: request.text.clone(),
            human_score: NEUTRAL_HUMAN_SCORE,
            persona_fidelity: NEUTRAL_FIDELITY,
            risk_score: NEUTRAL_RISK_SCORE,
            semantic_shift: 0.0,
            steps,
            language: run.language,
            persona: run.persona_key,
            mode: run.mode.name.clone(),
            trace_id,
            degraded: true,
        })
    }

    fn run_stages(
        &self,
        request: &PipelineRequest,
        run: &RunProfiles<'_>,
        rng: &mut dyn RandomSource,
        log: &mut StepLog<'_>,
        steps: &mut Vec<PipelineStep>,
    ) -> Result<PipelineResult, PipelineError> {
        // 1. Preprocess
        let normalized = normalize_whitespace(&request.text);
        let profile = self.catalog.language(&run.language);
        validate_language(profile).map_err(PipelineError::Profile)?;
        let sentences = split_sentences(&normalized, profile);
        let meta = json!({ "language": profile.code, "sentenceCount": sentences.len() });
        log.record("preprocess", true, meta.clone());
        steps.push(PipelineStep::ok("preprocess").with_meta(meta));

        // 2. Semantic skeleton
        let segments = extract_semantic_skeleton(&sentences, profile);
        let meta = json!({ "segmentCount": segments.len() });
        log.record("skeleton", true, meta.clone());
        steps.push(PipelineStep::ok("skeleton").with_meta(meta));

        // 3. Persona and mode
        validate_persona(run.persona).map_err(PipelineError::Profile)?;
        validate_mode(run.mode).map_err(PipelineError::Profile)?;
        let meta = json!({ "personaKey": run.persona_key, "mode": run.mode.name });
        log.record("persona", true, meta.clone());
        steps.push(PipelineStep::ok("persona").with_meta(meta));

        // 4. Detection loop
        let ctx = LoopContext {
            original_text: &normalized,
            persona: run.persona,
            profile,
            mode: run.mode,
        };
        let outcome = run_detection_loop(&segments, &ctx, rng, log)?;
        let best = outcome.best;

        if best.text.trim().is_empty() {
            return Err(PipelineError::Internal("pipeline produced empty output".to_string()));
        }

        steps.push(PipelineStep::ok("detection_loop").with_meta(json!({
            "iterations": outcome.iterations.len(),
            "converged": outcome.converged,
            "finalHumanScore": best.human_score,
            "finalRiskScore": best.risk_score,
            "finalSemanticShift": best.semantic_shift,
        })));

        Ok(PipelineResult {
            output_text: best.text,
            human_score: best.human_score.round() as u32,
            persona_fidelity: round_to(best.persona_fidelity, 2),
            risk_score: best.risk_score.round() as u32,
            semantic_shift: round_to(best.semantic_shift, 3),
            steps: std::mem::take(steps),
            language: profile.code.clone(),
            persona: run.persona_key.clone(),
            mode: run.mode.name.clone(),
            trace_id: log.trace_id().to_string(),
            degraded: false,
        })
    }
}

/// Run one request against the built-in profiles with entropy-seeded randomness
/// and no step recording.
pub fn run_pipeline(request: &PipelineRequest) -> Result<PipelineResult, PipelineError> {
    Humanizer::new(ProfileCatalog::builtin(), &NoopRecorder).run(request, &mut RngSource::from_entropy())
}
