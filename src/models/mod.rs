// HumanLiker Data Models
// Profiles, candidates, scores and pipeline request/response shapes

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============ Profiles ============

/// How a language's text is cut into word-like units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordBoundary {
    /// Space-delimited scripts (English, Spanish, French, ...).
    Whitespace,
    /// Scripts without spaces (Chinese); text is grouped into 2-codepoint units.
    CharacterPairs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageProfile {
    pub code: String,
    pub word_boundary: WordBoundary,
    pub hedges: Vec<String>,
    pub self_corrections: Vec<String>,
    pub emotional: Vec<String>,
    pub connectors: Vec<String>,
    pub sentence_enders: Vec<String>,
    pub stopwords: HashSet<String>,
    pub default_sentence_length: u32,
}

impl LanguageProfile {
    pub fn is_cjk(&self) -> bool {
        self.word_boundary == WordBoundary::CharacterPairs
    }

    /// Separator placed between a marker and the clause it decorates.
    pub fn clause_separator(&self) -> &'static str {
        if self.is_cjk() {
            "，"
        } else {
            ", "
        }
    }

    pub fn is_ender(&self, ch: char) -> bool {
        self.sentence_enders.iter().any(|e| e.contains(ch))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceLengthRange {
    pub min: u32,
    pub max: u32,
    pub preferred: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaProfile {
    #[serde(default)]
    pub name: String,
    pub sentence_length: SentenceLengthRange,
    pub hedge_density: f64,
    pub self_correction_density: f64,
    pub emotional_marker_density: f64,
    pub connector_density: f64,
    pub metaphor_intensity: f64,
    #[serde(default = "default_rhythm")]
    pub rhythm_variation: String,
    pub target_risk: f64,
    pub max_semantic_shift: f64,
}

impl PersonaProfile {
    /// First preferred sentence length, the persona's length anchor.
    pub fn preferred_length(&self) -> Option<u32> {
        self.sentence_length.preferred.first().copied()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineMode {
    #[serde(default)]
    pub name: String,
    pub global_target_risk: f64,
    pub global_max_semantic_shift: f64,
    #[serde(default = "default_max_loops")]
    pub max_detection_loops: u32,
    pub deformation_aggressiveness: f64,
}

/// Thresholds actually enforced for a run: the stricter of persona and mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveThresholds {
    pub target_risk: f64,
    pub max_semantic_shift: f64,
}

impl EffectiveThresholds {
    pub fn derive(persona: &PersonaProfile, mode: &EngineMode) -> Self {
        Self {
            target_risk: persona.target_risk.min(mode.global_target_risk),
            max_semantic_shift: persona.max_semantic_shift.min(mode.global_max_semantic_shift),
        }
    }

    pub fn accepts(&self, score: &ScoreResult) -> bool {
        score.risk_score <= self.target_risk && score.semantic_shift <= self.max_semantic_shift
    }
}

// ============ Working Data ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub original: String,
    pub core: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub variant: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub text: String,
    pub variant: String,
    pub human_score: f64,
    pub persona_fidelity: f64,
    pub risk_score: f64,
    pub semantic_shift: f64,
    pub final_score: f64,
}

impl ScoreResult {
    pub fn to_candidate(&self) -> Candidate {
        Candidate {
            text: self.text.clone(),
            variant: self.variant.clone(),
        }
    }
}

// ============ Pipeline Request / Response ============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRequest {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub persona_key: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

impl PipelineRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_persona(mut self, persona_key: impl Into<String>) -> Self {
        self.persona_key = Some(persona_key.into());
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStep {
    pub name: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl PipelineStep {
    pub fn ok(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ok: true,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub output_text: String,
    pub human_score: u32,
    pub persona_fidelity: f64,
    pub risk_score: u32,
    pub semantic_shift: f64,
    pub steps: Vec<PipelineStep>,
    pub language: String,
    pub persona: String,
    pub mode: String,
    pub trace_id: String,
    /// True when an internal fault forced the neutral fallback result.
    #[serde(default)]
    pub degraded: bool,
}

/// One entry handed to a step recorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub trace_id: String,
    pub step_order: u32,
    pub step_name: String,
    pub success: bool,
    pub detail: serde_json::Value,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

fn default_rhythm() -> String { "medium".to_string() }
fn default_max_loops() -> u32 { 3 }

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(target_risk: f64, max_shift: f64) -> PersonaProfile {
        PersonaProfile {
            name: "fixture".to_string(),
            sentence_length: SentenceLengthRange { min: 8, max: 30, preferred: vec![14] },
            hedge_density: 0.1,
            self_correction_density: 0.1,
            emotional_marker_density: 0.1,
            connector_density: 0.1,
            metaphor_intensity: 0.1,
            rhythm_variation: "medium".to_string(),
            target_risk,
            max_semantic_shift: max_shift,
        }
    }

    fn mode(global_risk: f64, global_shift: f64) -> EngineMode {
        EngineMode {
            name: "fixture".to_string(),
            global_target_risk: global_risk,
            global_max_semantic_shift: global_shift,
            max_detection_loops: 3,
            deformation_aggressiveness: 1.0,
        }
    }

    #[test]
    fn test_effective_thresholds_take_stricter_value() {
        let below = EffectiveThresholds::derive(&persona(30.0, 0.05), &mode(38.0, 0.08));
        assert_eq!(below.target_risk, 30.0);
        assert_eq!(below.max_semantic_shift, 0.05);

        let above = EffectiveThresholds::derive(&persona(45.0, 0.10), &mode(38.0, 0.08));
        assert_eq!(above.target_risk, 38.0);
        assert_eq!(above.max_semantic_shift, 0.08);
    }

    #[test]
    fn test_step_record_round_trips_timestamp() {
        let record = StepRecord {
            trace_id: "hl_abc".to_string(),
            step_order: 2,
            step_name: "skeleton".to_string(),
            success: true,
            detail: serde_json::json!({ "segmentCount": 3 }),
            recorded_at: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"recordedAt\""));
        let parsed: StepRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.recorded_at, record.recorded_at);
        assert_eq!(parsed.step_order, 2);
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let req: PipelineRequest =
            serde_json::from_str(r#"{"text":"hi","personaKey":"student","mode":"safe"}"#).unwrap();
        assert_eq!(req.persona_key.as_deref(), Some("student"));
        assert_eq!(req.mode.as_deref(), Some("safe"));
        assert!(req.language.is_none());
    }

    #[test]
    fn test_mode_defaults_loop_cap() {
        let m: EngineMode = serde_json::from_str(
            r#"{"name":"x","globalTargetRisk":40,"globalMaxSemanticShift":0.1,"deformationAggressiveness":1.0}"#,
        )
        .unwrap();
        assert_eq!(m.max_detection_loops, 3);
    }
}
