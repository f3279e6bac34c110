//! Conversion of onboarding answers into a recommendation [`Profile`].

use serde::{Deserialize, Serialize};

use crate::domain::profile::{AgeBracket, Profile};

/// Raw answers collected by the onboarding flow.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingAnswers {
    pub user_id: String,
    pub human_name: String,
    /// Free text such as `"26-35"` or `"40 años"`.
    #[serde(default)]
    pub human_age: Option<String>,
    #[serde(default)]
    pub human_gender: Option<String>,
    #[serde(default)]
    pub life_axes: Vec<String>,
    #[serde(default)]
    pub short_term_goals: Vec<String>,
    #[serde(default)]
    pub ten_year_goals: Vec<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default)]
    pub emotional_history: Option<String>,
}

const GOAL_RULES: &[(&str, &[&str])] = &[
    ("familia", &["familia"]),
    ("amigos", &["amigo"]),
    ("bienes", &["bien", "dinero", "casa"]),
    ("carrera", &["carrera", "trabajo", "profesional"]),
    ("salud", &["salud", "ejercicio", "deporte"]),
    ("crecimiento_personal", &["personal", "crecer", "aprender"]),
    ("estabilidad", &["estabilidad", "seguridad"]),
];

const HOBBY_RULES: &[(&str, &[&str])] = &[
    ("tech", &["tech", "tecnología", "programar"]),
    ("musica", &["música", "music"]),
    ("deportes", &["deporte", "sport", "ejercicio"]),
    ("arte", &["arte", "pintar", "dibujar"]),
    ("lectura", &["leer", "lectura", "libro"]),
    ("cocina", &["cocina", "cocinar"]),
    ("viajes", &["viaje", "viajar", "travel"]),
    ("naturaleza", &["naturaleza", "aire libre", "outdoor"]),
    ("manualidades", &["manualidad", "craft", "diy"]),
    ("social", &["social", "amigos", "fiesta"]),
];

impl OnboardingAnswers {
    pub fn into_profile(self) -> Profile {
        let age = self.human_age.as_deref().and_then(parse_age);

        let mut goals: Vec<String> = Vec::new();
        for goal in self.life_axes.iter().chain(&self.short_term_goals).chain(&self.ten_year_goals)
        {
            let normalized = normalize_goal(goal);
            if !goals.contains(&normalized) {
                goals.push(normalized);
            }
        }

        Profile {
            user_id: self.user_id,
            name: self.human_name,
            age,
            age_bracket: age.map(AgeBracket::from_age),
            gender: self.human_gender,
            hobbies: self.hobbies.iter().map(|hobby| normalize_hobby(hobby)).collect(),
            goals,
            emotional_history: self.emotional_history.filter(|history| !history.is_empty()),
        }
    }
}

/// First run of digits in the answer, e.g. `"26-35"` gives 26.
pub fn parse_age(answer: &str) -> Option<u32> {
    let digits: String = answer
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

pub fn normalize_goal(goal: &str) -> String {
    normalize(goal, GOAL_RULES)
}

pub fn normalize_hobby(hobby: &str) -> String {
    normalize(hobby, HOBBY_RULES)
}

/// Maps free text onto the first vocabulary entry whose trigger it contains,
/// keeping the original text when nothing matches.
fn normalize(value: &str, rules: &[(&str, &[&str])]) -> String {
    let lowered = value.to_lowercase();
    rules
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|trigger| lowered.contains(trigger)))
        .map(|(tag, _)| (*tag).to_owned())
        .unwrap_or_else(|| value.to_owned())
}

#[cfg(test)]
mod tests {
    use super::{normalize_goal, normalize_hobby, parse_age, OnboardingAnswers};
    use crate::domain::profile::AgeBracket;

    #[test]
    fn age_is_first_number_in_answer() {
        assert_eq!(parse_age("26-35"), Some(26));
        assert_eq!(parse_age("tengo 52 años"), Some(52));
        assert_eq!(parse_age("prefiero no decir"), None);
    }

    #[test]
    fn goals_and_hobbies_map_onto_vocabulary() {
        assert_eq!(normalize_goal("Pasar tiempo en FAMILIA"), "familia");
        assert_eq!(normalize_goal("Comprar una casa"), "bienes");
        assert_eq!(normalize_goal("Viajar por el mundo"), "Viajar por el mundo");
        assert_eq!(normalize_hobby("Tocar música"), "musica");
        assert_eq!(normalize_hobby("Salir de fiesta"), "social");
        assert_eq!(normalize_hobby("Ajedrez"), "Ajedrez");
    }

    #[test]
    fn answers_become_a_profile_with_deduplicated_goals() {
        let answers = OnboardingAnswers {
            user_id: "u-1".to_owned(),
            human_name: "Daniela".to_owned(),
            human_age: Some("26-35".to_owned()),
            life_axes: vec!["Familia".to_owned(), "Salud".to_owned()],
            short_term_goals: vec!["Hacer ejercicio".to_owned()],
            ten_year_goals: vec!["Crecer como persona".to_owned()],
            hobbies: vec!["Programar".to_owned(), "Leer novelas".to_owned()],
            emotional_history: Some(String::new()),
            ..OnboardingAnswers::default()
        };

        let profile = answers.into_profile();

        assert_eq!(profile.age, Some(26));
        assert_eq!(profile.age_bracket, Some(AgeBracket::Young));
        assert_eq!(profile.goals, vec!["familia", "salud", "crecimiento_personal"]);
        assert_eq!(profile.hobbies, vec!["tech", "lectura"]);
        assert_eq!(profile.emotional_history, None);
    }
}
