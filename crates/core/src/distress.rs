//! Emotional distress screening of conversation transcripts.

use serde::{Deserialize, Serialize};

use crate::domain::situation::SituationCategory;
use crate::recommend::lexicon::lexicon_for;

const CRITICAL_PHRASES: &[&str] = &[
    "suicidarme",
    "matarme",
    "acabar con todo",
    "no quiero vivir",
    "mejor muerto",
    "terminar con mi vida",
    "no vale la pena vivir",
    "prefiero morir",
    "cortarme",
    "lastimarme",
    "hacerme daño",
    "autolesiones",
    "no hay salida",
    "es el fin",
    "todo está perdido",
    "no puedo más",
    "me voy a volver loco",
    "estoy acabado",
    "mi vida no vale nada",
    "drogas para olvidar",
    "emborracharme hasta morir",
    "pastillas para dormir forever",
    "cocaína para sentir",
    "marihuana todo el día",
];

const SEVERE_PHRASES: &[&str] = &[
    "desesperado",
    "desesperada",
    "sin esperanza",
    "perdido totalmente",
    "destruido",
    "devastado",
    "roto por dentro",
    "vacío total",
    "crisis total",
    "colapso",
    "me estoy hundiendo",
    "caída libre",
    "tocando fondo",
    "no puedo respirar",
    "me ahogo",
    "no rindo nada",
    "mi carrera está muerta",
    "perdí todo",
    "mi vida es un desastre",
    "soy un fracaso total",
    "estoy jodido",
    "la vida me tiene mamado",
    "estoy vuelto mierda",
    "me tiene hasta la madre",
    "estoy pal' carajo",
];

const MODERATE_PHRASES: &[&str] = &[
    "triste",
    "deprimido",
    "bajoneado",
    "desanimado",
    "preocupado",
    "estresado",
    "agobiado",
    "abrumado",
    "confundido",
    "perdido",
    "ansioso",
    "nervioso",
    "angustiado",
    "frustrado",
    "desalentado",
    "mamado",
    "cansado de todo",
    "harto",
    "aburrido de la vida",
];

const MILD_PHRASES: &[&str] = &[
    "un poco mal",
    "medio bajoneado",
    "no muy bien",
    "algo preocupado",
    "un toque estresado",
    "regular nomás",
    "así así",
    "no tan bien",
];

/// Phrases that should prompt a recommendation during a live chat.
const CHAT_TRIGGERS: &[&str] = &[
    "murió",
    "falleció",
    "muerte",
    "duelo",
    "funeral",
    "perdí",
    "terminamos",
    "ruptura",
    "separación",
    "ex",
    "dejó",
    "corazón roto",
    "despido",
    "despidieron",
    "sin trabajo",
    "deudas",
    "dinero",
    "crisis económica",
    "incapaz",
    "no puedo",
    "no sirvo",
    "incompetente",
    "perdido",
    "bloqueado",
    "deprimido",
    "triste",
    "ansiedad",
    "estresado",
    "agobiado",
    "mal",
    "ayuda",
    "no sé qué hacer",
    "me siento solo",
];

/// Transcripts longer than this escalate on a single severe phrase.
const LONG_TRANSCRIPT_CHARS: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    Critical,
}

impl Severity {
    pub fn alert_priority(self) -> AlertPriority {
        match self {
            Self::Critical => AlertPriority::Urgent,
            Self::Severe => AlertPriority::High,
            Self::Moderate => AlertPriority::Medium,
            Self::Mild => AlertPriority::Low,
        }
    }

    fn base_indicators(self) -> EmotionalIndicators {
        let (desperation, hopelessness, anxiety, depression, anger) = match self {
            Self::Critical => (85, 90, 80, 85, 70),
            Self::Severe => (70, 75, 70, 70, 60),
            Self::Moderate => (45, 50, 55, 50, 40),
            Self::Mild => (25, 20, 30, 25, 20),
        };
        EmotionalIndicators { desperation, hopelessness, anxiety, depression, anger }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Monitor,
    RecommendWellness,
    EscalateToHr,
    UrgentIntervention,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    SuicidalIdeation,
    SelfHarmRisk,
    CrisisState,
    SocialIsolation,
    FinancialStress,
    RelationshipIssues,
    HealthConcerns,
    WorkStress,
}

/// Indicator scores in the 0..=100 range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalIndicators {
    pub desperation: u8,
    pub hopelessness: u8,
    pub anxiety: u8,
    pub depression: u8,
    pub anger: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistressAnalysis {
    pub severity: Severity,
    pub confidence: f64,
    pub situation: Option<SituationCategory>,
    pub trigger_phrases: Vec<String>,
    pub risk_factors: Vec<RiskFactor>,
    pub needs_immediate_attention: bool,
    pub recommended_action: RecommendedAction,
    pub emotional_indicators: EmotionalIndicators,
}

impl DistressAnalysis {
    pub fn alert_priority(&self) -> AlertPriority {
        self.severity.alert_priority()
    }

    /// Severe and critical cases are raised to HR.
    pub fn warrants_alert(&self) -> bool {
        self.severity >= Severity::Severe
    }

    /// Short note for HR reviewers describing the case.
    pub fn reviewer_note(&self) -> String {
        let base = match self.severity {
            Severity::Critical => {
                "Critical emotional distress detected. This employee may need immediate \
                 professional support."
            }
            Severity::Severe => {
                "Severe emotional distress detected. Wellness intervention and HR attention \
                 are advised."
            }
            Severity::Moderate => {
                "Moderate emotional distress detected. Wellness support could prevent \
                 escalation."
            }
            Severity::Mild => "Mild emotional concerns detected. Monitor wellbeing.",
        };
        if self.risk_factors.is_empty() {
            return base.to_owned();
        }
        let factors: Vec<String> = self
            .risk_factors
            .iter()
            .filter_map(|factor| serde_json::to_value(factor).ok())
            .filter_map(|value| value.as_str().map(str::to_owned))
            .collect();
        format!("{base} Risk factors: {}.", factors.join(", "))
    }
}

/// Grades the distress expressed in a transcript.
///
/// Phrase banks are checked from most to least severe and the first bank
/// that fires decides the severity.
pub fn analyze_distress(transcript: &str) -> DistressAnalysis {
    let lowered = transcript.to_lowercase();

    let critical = matched(&lowered, CRITICAL_PHRASES);
    if !critical.is_empty() {
        return graded(
            &lowered,
            Severity::Critical,
            0.95,
            critical,
            vec![RiskFactor::SuicidalIdeation, RiskFactor::SelfHarmRisk, RiskFactor::CrisisState],
        );
    }

    let severe = matched(&lowered, SEVERE_PHRASES);
    if severe.len() >= 2
        || (!severe.is_empty() && transcript.chars().count() > LONG_TRANSCRIPT_CHARS)
    {
        let risks = risk_factors(&lowered);
        return graded(&lowered, Severity::Severe, 0.85, severe, risks);
    }

    let moderate = matched(&lowered, MODERATE_PHRASES);
    if moderate.len() >= 2 {
        let risks = risk_factors(&lowered);
        return graded(&lowered, Severity::Moderate, 0.75, moderate, risks);
    }

    let mild = matched(&lowered, MILD_PHRASES);
    if !mild.is_empty() {
        return graded(&lowered, Severity::Mild, 0.65, mild, Vec::new());
    }

    DistressAnalysis {
        severity: Severity::Mild,
        confidence: 0.3,
        situation: None,
        trigger_phrases: Vec::new(),
        risk_factors: Vec::new(),
        needs_immediate_attention: false,
        recommended_action: RecommendedAction::Monitor,
        emotional_indicators: EmotionalIndicators {
            desperation: 10,
            hopelessness: 10,
            anxiety: 15,
            depression: 10,
            anger: 10,
        },
    }
}

/// Cheap check for whether a chat message deserves a recommendation.
pub fn should_trigger_recommendation(message: &str) -> bool {
    let lowered = message.to_lowercase();
    CHAT_TRIGGERS.iter().any(|trigger| lowered.contains(trigger))
}

/// First category, in lexicon order, with at least two keyword hits.
pub fn detect_situation(lowered: &str) -> Option<SituationCategory> {
    SituationCategory::ALL
        .into_iter()
        .find(|category| lexicon_for(*category).matched_keywords(lowered).len() >= 2)
}

fn graded(
    lowered: &str,
    severity: Severity,
    confidence: f64,
    triggers: Vec<&'static str>,
    risk_factors: Vec<RiskFactor>,
) -> DistressAnalysis {
    let recommended_action = match severity {
        Severity::Critical => RecommendedAction::UrgentIntervention,
        Severity::Severe => RecommendedAction::EscalateToHr,
        Severity::Moderate => RecommendedAction::RecommendWellness,
        Severity::Mild => RecommendedAction::Monitor,
    };
    DistressAnalysis {
        severity,
        confidence,
        situation: detect_situation(lowered),
        trigger_phrases: triggers.into_iter().map(str::to_owned).collect(),
        risk_factors,
        needs_immediate_attention: severity >= Severity::Severe,
        recommended_action,
        emotional_indicators: indicators(lowered, severity),
    }
}

fn matched(lowered: &str, phrases: &[&'static str]) -> Vec<&'static str> {
    phrases.iter().copied().filter(|phrase| lowered.contains(phrase)).collect()
}

fn risk_factors(lowered: &str) -> Vec<RiskFactor> {
    let rules: [(RiskFactor, &[&str]); 5] = [
        (RiskFactor::SocialIsolation, &["solo", "nadie", "aislado"]),
        (RiskFactor::FinancialStress, &["dinero", "deudas", "trabajo"]),
        (RiskFactor::RelationshipIssues, &["ruptura", "pareja", "familia"]),
        (RiskFactor::HealthConcerns, &["enfermo", "salud", "dolor"]),
        (RiskFactor::WorkStress, &["jefe", "oficina", "trabajo"]),
    ];
    rules
        .into_iter()
        .filter(|(_, triggers)| triggers.iter().any(|trigger| lowered.contains(trigger)))
        .map(|(factor, _)| factor)
        .collect()
}

fn indicators(lowered: &str, severity: Severity) -> EmotionalIndicators {
    let mut scores = severity.base_indicators();
    let bump = |score: &mut u8, amount: u8, triggers: &[&str]| {
        if triggers.iter().any(|trigger| lowered.contains(trigger)) {
            *score = score.saturating_add(amount).min(100);
        }
    };
    bump(&mut scores.desperation, 15, &["desesperado", "no puedo más"]);
    bump(&mut scores.hopelessness, 20, &["sin esperanza", "no hay salida"]);
    bump(&mut scores.anxiety, 15, &["ansioso", "nervioso"]);
    bump(&mut scores.depression, 15, &["deprimido", "triste"]);
    bump(&mut scores.anger, 20, &["enojado", "furioso"]);
    scores
}

#[cfg(test)]
mod tests {
    use super::{
        analyze_distress, should_trigger_recommendation, AlertPriority, RecommendedAction,
        RiskFactor, Severity,
    };
    use crate::domain::situation::SituationCategory;

    #[test]
    fn critical_phrase_requires_urgent_intervention() {
        let analysis = analyze_distress("Ya no puedo más, no hay salida");

        assert_eq!(analysis.severity, Severity::Critical);
        assert_eq!(analysis.recommended_action, RecommendedAction::UrgentIntervention);
        assert!(analysis.needs_immediate_attention);
        assert_eq!(analysis.alert_priority(), AlertPriority::Urgent);
        assert_eq!(analysis.emotional_indicators.desperation, 100);
        assert_eq!(analysis.emotional_indicators.hopelessness, 100);
    }

    #[test]
    fn two_severe_phrases_escalate_to_hr() {
        let analysis =
            analyze_distress("Estoy desesperado y devastado, mi jefe me grita en la oficina");

        assert_eq!(analysis.severity, Severity::Severe);
        assert_eq!(analysis.recommended_action, RecommendedAction::EscalateToHr);
        assert_eq!(analysis.risk_factors, vec![RiskFactor::WorkStress]);
        assert!(analysis.warrants_alert());
    }

    #[test]
    fn single_severe_phrase_in_long_transcript_is_severe() {
        let transcript = format!("Me siento devastado. {}", "Hoy fue un día largo. ".repeat(10));
        assert_eq!(analyze_distress(&transcript).severity, Severity::Severe);
    }

    #[test]
    fn two_moderate_phrases_recommend_wellness() {
        let analysis = analyze_distress("Estoy triste y estresado porque mi abuelo murió");

        assert_eq!(analysis.severity, Severity::Moderate);
        assert_eq!(analysis.recommended_action, RecommendedAction::RecommendWellness);
        assert_eq!(analysis.situation, Some(SituationCategory::Bereavement));
        assert_eq!(analysis.emotional_indicators.depression, 65);
        assert!(!analysis.warrants_alert());
    }

    #[test]
    fn calm_transcript_is_low_confidence_mild() {
        let analysis = analyze_distress("Todo bien en la semana");

        assert_eq!(analysis.severity, Severity::Mild);
        assert_eq!(analysis.confidence, 0.3);
        assert_eq!(analysis.situation, None);
        assert_eq!(analysis.emotional_indicators.anxiety, 15);
    }

    #[test]
    fn reviewer_note_lists_risk_factors() {
        let analysis = analyze_distress("Estoy desesperado, sin esperanza, y con deudas");
        assert!(analysis.reviewer_note().contains("financial_stress"));
    }

    #[test]
    fn chat_trigger_detects_distress_words() {
        assert!(should_trigger_recommendation("Necesito AYUDA"));
        assert!(!should_trigger_recommendation("hola, buen día"));
    }
}
