// HumanLiker Core Services

pub mod text_processor;
pub mod profiles;
pub mod config_store;
pub mod randomness;
pub mod step_recorder;
pub mod humanize;
pub mod pipeline;

pub use text_processor::*;
pub use profiles::*;
pub use config_store::*;
pub use randomness::*;
pub use step_recorder::*;
pub use pipeline::*;

// Re-export the humanize stages
pub use humanize::{
    extract_core_idea,
    extract_semantic_skeleton,
    generate_candidates,
    apply_persona_shaping,
    score_candidate,
    select_best,
    deform_candidate,
    run_detection_loop,
    advance_candidates,
    DetectionOutcome,
    IterationSummary,
    LoopContext,
    ScoringContext,
};
