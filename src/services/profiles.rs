// Profile Catalog
// Language marker tables, persona profiles and engine modes, with total lookups

use crate::models::{EngineMode, LanguageProfile, PersonaProfile, SentenceLengthRange, WordBoundary};
use std::collections::HashMap;
use std::sync::OnceLock;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_PERSONA: &str = "casual_writer";
pub const DEFAULT_MODE: &str = "balanced";

/// Read-only lookup tables for one process (or one configured humanizer).
///
/// Every lookup is total: unknown keys resolve to the English profile,
/// the `casual_writer` persona and the `balanced` mode respectively.
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    languages: HashMap<String, LanguageProfile>,
    personas: HashMap<String, PersonaProfile>,
    modes: HashMap<String, EngineMode>,
}

impl ProfileCatalog {
    /// The built-in catalog, built once on first use.
    pub fn builtin() -> &'static ProfileCatalog {
        static CATALOG: OnceLock<ProfileCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| ProfileCatalog {
            languages: builtin_languages(),
            personas: builtin_personas(),
            modes: builtin_modes(),
        })
    }

    pub fn language(&self, code: &str) -> &LanguageProfile {
        let key = canonical_language_code(code);
        self.languages
            .get(key.as_str())
            .or_else(|| self.languages.get(DEFAULT_LANGUAGE))
            .unwrap_or_else(|| &Self::builtin().languages[DEFAULT_LANGUAGE])
    }

    pub fn persona(&self, key: &str) -> &PersonaProfile {
        self.personas
            .get(key.trim())
            .or_else(|| self.personas.get(DEFAULT_PERSONA))
            .unwrap_or_else(|| &Self::builtin().personas[DEFAULT_PERSONA])
    }

    pub fn mode(&self, key: &str) -> &EngineMode {
        self.modes
            .get(key.trim().to_lowercase().as_str())
            .or_else(|| self.modes.get(DEFAULT_MODE))
            .unwrap_or_else(|| &Self::builtin().modes[DEFAULT_MODE])
    }

    /// Register or replace a persona. The entry is not validated here;
    /// malformed values surface as pipeline faults when the persona is used.
    pub fn insert_persona(&mut self, persona: PersonaProfile) {
        self.personas.insert(persona.name.clone(), persona);
    }

    pub fn insert_mode(&mut self, mode: EngineMode) {
        self.modes.insert(mode.name.to_lowercase(), mode);
    }

    pub fn persona_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.personas.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn mode_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.modes.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn language_codes(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.languages.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

pub fn get_language_profile(code: &str) -> &'static LanguageProfile {
    ProfileCatalog::builtin().language(code)
}

pub fn get_persona_profile(key: &str) -> &'static PersonaProfile {
    ProfileCatalog::builtin().persona(key)
}

pub fn get_engine_mode(key: &str) -> &'static EngineMode {
    ProfileCatalog::builtin().mode(key)
}

/// Map a caller-supplied language code onto a catalog key.
fn canonical_language_code(code: &str) -> String {
    let lower = code.trim().to_ascii_lowercase().replace('_', "-");
    match lower.as_str() {
        "zh" | "zh-hans" | "zh-cn" | "zh-sg" => "zh-Hans".to_string(),
        "zh-hant" | "zh-tw" | "zh-hk" | "zh-mo" => "zh-Hant".to_string(),
        _ => lower,
    }
}

fn is_cjk_char(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}' | '\u{f900}'..='\u{faff}')
}

/// Heuristic language detection: any CJK ideograph means Simplified Chinese.
pub fn detect_language(text: &str) -> &'static str {
    if text.chars().any(is_cjk_char) {
        "zh-Hans"
    } else {
        DEFAULT_LANGUAGE
    }
}

/// Resolve the language for a run: an explicit hint wins over detection.
pub fn resolve_language<'a>(text: &str, hint: Option<&'a str>) -> &'a str {
    hint.map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| detect_language(text))
}

// ============================================================================
// Validation
// ============================================================================

fn check_unit(name: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(format!("{name} must be in [0, 1], got {value}"));
    }
    Ok(())
}

fn check_percent(name: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(format!("{name} must be in [0, 100], got {value}"));
    }
    Ok(())
}

pub fn validate_language(profile: &LanguageProfile) -> Result<(), String> {
    if profile.sentence_enders.is_empty() || profile.sentence_enders.iter().any(|e| e.is_empty()) {
        return Err(format!("language '{}' has no usable sentence enders", profile.code));
    }
    Ok(())
}

pub fn validate_persona(persona: &PersonaProfile) -> Result<(), String> {
    match persona.preferred_length() {
        Some(len) if len > 0 => {}
        _ => return Err(format!("persona '{}' has no preferred sentence length", persona.name)),
    }
    check_unit("hedgeDensity", persona.hedge_density)?;
    check_unit("selfCorrectionDensity", persona.self_correction_density)?;
    check_unit("emotionalMarkerDensity", persona.emotional_marker_density)?;
    check_unit("connectorDensity", persona.connector_density)?;
    check_unit("metaphorIntensity", persona.metaphor_intensity)?;
    check_unit("maxSemanticShift", persona.max_semantic_shift)?;
    check_percent("targetRisk", persona.target_risk)
}

pub fn validate_mode(mode: &EngineMode) -> Result<(), String> {
    if mode.max_detection_loops == 0 {
        return Err(format!("mode '{}' must allow at least one detection loop", mode.name));
    }
    if !mode.deformation_aggressiveness.is_finite() || mode.deformation_aggressiveness < 0.0 {
        return Err(format!(
            "deformationAggressiveness must be a non-negative number, got {}",
            mode.deformation_aggressiveness
        ));
    }
    check_unit("globalMaxSemanticShift", mode.global_max_semantic_shift)?;
    check_percent("globalTargetRisk", mode.global_target_risk)
}

// ============================================================================
// Built-in tables
// ============================================================================

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn language(
    code: &str,
    word_boundary: WordBoundary,
    hedges: &[&str],
    self_corrections: &[&str],
    emotional: &[&str],
    connectors: &[&str],
    sentence_enders: &[&str],
    stopwords: &[&str],
    default_sentence_length: u32,
) -> LanguageProfile {
    LanguageProfile {
        code: code.to_string(),
        word_boundary,
        hedges: strings(hedges),
        self_corrections: strings(self_corrections),
        emotional: strings(emotional),
        connectors: strings(connectors),
        sentence_enders: strings(sentence_enders),
        stopwords: stopwords.iter().map(|s| s.to_string()).collect(),
        default_sentence_length,
    }
}

fn builtin_languages() -> HashMap<String, LanguageProfile> {
    let profiles = vec![
        language(
            "en",
            WordBoundary::Whitespace,
            &["I think", "I feel like", "honestly", "actually", "kind of", "sort of", "maybe", "perhaps", "I guess", "probably"],
            &["actually", "wait,", "I mean", "or rather", "well,", "hmm,", "let me rephrase"],
            &["wow", "oh", "huh", "interesting", "fascinating", "hmm", "geez", "man"],
            &["but", "and", "so", "though", "however", "also", "plus", "besides", "meanwhile"],
            &[".", "!", "?"],
            &[
                "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
                "do", "does", "did", "will", "would", "could", "should", "can", "may", "might", "of", "in",
                "on", "at", "to", "for", "with", "from", "by", "about",
            ],
            18,
        ),
        language(
            "zh-Hans",
            WordBoundary::CharacterPairs,
            &["说实话", "老实讲", "我觉得", "可能", "也许", "大概", "感觉", "其实", "应该说", "我想"],
            &["不对", "等等", "我是说", "或者说", "嗯", "那个", "怎么说呢", "不不不"],
            &["哇", "哦", "嗯", "有意思", "有趣", "哈", "天哪", "真的吗"],
            &["但是", "而且", "所以", "不过", "然而", "另外", "还有", "同时", "因此"],
            &["。", "！", "？"],
            &[
                "的", "了", "在", "是", "我", "你", "他", "她", "它", "这", "那", "和", "与", "或", "但", "而",
                "也", "都", "就", "还", "又", "很", "最", "更", "只", "才", "已", "会", "能", "要", "可以",
                "应该", "必须", "有", "没", "到", "着", "过", "来", "去", "为", "从", "把", "被", "给",
            ],
            15,
        ),
        language(
            "zh-Hant",
            WordBoundary::CharacterPairs,
            &["說實話", "老實講", "我覺得", "可能", "也許", "大概", "感覺", "其實", "應該說", "我想"],
            &["不對", "等等", "我是說", "或者說", "嗯", "那個", "怎麼說呢", "不不不"],
            &["哇", "哦", "嗯", "有意思", "有趣", "哈", "天哪", "真的嗎"],
            &["但是", "而且", "所以", "不過", "然而", "另外", "還有", "同時", "因此"],
            &["。", "！", "？"],
            &[
                "的", "了", "在", "是", "我", "你", "他", "她", "它", "這", "那", "和", "與", "或", "但", "而",
                "也", "都", "就", "還", "又", "很", "最", "更", "只", "才", "已", "會", "能", "要", "可以",
                "應該", "必須", "有", "沒", "到", "著", "過", "來", "去", "為", "從", "把", "被", "給",
            ],
            15,
        ),
        language(
            "es",
            WordBoundary::Whitespace,
            &["honestamente", "creo que", "siento que", "tal vez", "quizás", "probablemente", "realmente", "supongo"],
            &["espera", "quiero decir", "o mejor", "bueno", "eh", "digo"],
            &["wow", "oh", "interesante", "fascinante", "hmm", "vaya", "dios mío"],
            &["pero", "y", "así que", "aunque", "sin embargo", "también", "además", "mientras"],
            &[".", "!", "?"],
            &[
                "el", "la", "los", "las", "un", "una", "es", "son", "de", "del", "en", "por", "para", "con",
                "sin", "que", "se", "lo", "al", "como", "más", "pero", "sus", "le", "ya", "o", "este", "sí",
                "mi", "su",
            ],
            18,
        ),
        language(
            "fr",
            WordBoundary::Whitespace,
            &["honnêtement", "je pense que", "je sens que", "peut-être", "probablement", "vraiment", "je suppose"],
            &["attends", "je veux dire", "ou plutôt", "eh bien", "euh", "enfin"],
            &["wow", "oh", "intéressant", "fascinant", "hmm", "mon dieu", "vraiment"],
            &["mais", "et", "donc", "bien que", "cependant", "aussi", "en plus", "pendant"],
            &[".", "!", "?"],
            &[
                "le", "la", "les", "un", "une", "de", "du", "des", "est", "sont", "dans", "pour", "par",
                "avec", "que", "se", "ce", "au", "plus", "mais", "ses", "ou", "et", "si", "mon", "son",
            ],
            18,
        ),
    ];

    profiles
        .into_iter()
        .map(|p| (p.code.clone(), p))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn persona(
    name: &str,
    (min, max, preferred): (u32, u32, &[u32]),
    hedge_density: f64,
    self_correction_density: f64,
    emotional_marker_density: f64,
    connector_density: f64,
    metaphor_intensity: f64,
    rhythm_variation: &str,
    target_risk: f64,
    max_semantic_shift: f64,
) -> PersonaProfile {
    PersonaProfile {
        name: name.to_string(),
        sentence_length: SentenceLengthRange {
            min,
            max,
            preferred: preferred.to_vec(),
        },
        hedge_density,
        self_correction_density,
        emotional_marker_density,
        connector_density,
        metaphor_intensity,
        rhythm_variation: rhythm_variation.to_string(),
        target_risk,
        max_semantic_shift,
    }
}

fn builtin_personas() -> HashMap<String, PersonaProfile> {
    let personas = vec![
        persona("casual_writer", (8, 35, &[12, 18, 25]), 0.15, 0.08, 0.12, 0.20, 0.10, "high", 35.0, 0.08),
        persona("student", (10, 30, &[14, 20]), 0.10, 0.05, 0.08, 0.15, 0.05, "medium", 40.0, 0.06),
        persona("creator_influencer", (6, 40, &[10, 18, 28]), 0.20, 0.12, 0.25, 0.25, 0.20, "very_high", 30.0, 0.10),
        persona("professional_editor", (12, 32, &[16, 22]), 0.05, 0.02, 0.03, 0.12, 0.08, "low", 45.0, 0.05),
        persona("introspective_thinker", (15, 45, &[20, 30, 8]), 0.18, 0.15, 0.10, 0.18, 0.15, "high", 38.0, 0.07),
    ];

    personas
        .into_iter()
        .map(|p| (p.name.clone(), p))
        .collect()
}

fn builtin_modes() -> HashMap<String, EngineMode> {
    let modes = vec![
        EngineMode {
            name: "safe".to_string(),
            global_target_risk: 45.0,
            global_max_semantic_shift: 0.05,
            max_detection_loops: 3,
            deformation_aggressiveness: 0.7,
        },
        EngineMode {
            name: "balanced".to_string(),
            global_target_risk: 38.0,
            global_max_semantic_shift: 0.08,
            max_detection_loops: 3,
            deformation_aggressiveness: 1.0,
        },
        EngineMode {
            name: "creative".to_string(),
            global_target_risk: 30.0,
            global_max_semantic_shift: 0.12,
            max_detection_loops: 2,
            deformation_aggressiveness: 1.3,
        },
    ];

    modes
        .into_iter()
        .map(|m| (m.name.clone(), m))
        .collect()
}
