// Humanize Module
// Rule-based rewriting core organized into specialized submodules:
// - metrics: lexical variety, keywords, semantic shift and marker counting
// - skeleton: strips discourse markers down to each sentence's core idea
// - candidates: persona-shaped candidate generation
// - scoring: human / fidelity / risk / shift scoring and best-candidate selection
// - deformation: restructures candidates that miss the run's thresholds
// - detection_loop: the bounded score-and-deform loop

pub mod metrics;
pub mod skeleton;
pub mod candidates;
pub mod scoring;
pub mod deformation;
pub mod detection_loop;

pub use metrics::{keywords, lexical_variety, marker_hits, semantic_shift, sentence_length_variance};
pub use skeleton::{extract_core_idea, extract_semantic_skeleton};
pub use candidates::{apply_persona_shaping, candidate_count, generate_candidates};
pub use scoring::{score_candidate, select_best, ScoringContext};
pub use deformation::deform_candidate;
pub use detection_loop::{advance_candidates, run_detection_loop, DetectionOutcome, IterationSummary, LoopContext};
