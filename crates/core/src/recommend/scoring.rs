//! Scoring and ranking of catalog items against a situation and profile.

use rust_decimal::Decimal;

use crate::domain::catalog::CatalogItem;
use crate::domain::profile::Profile;
use crate::domain::recommendation::ScoredItem;
use crate::domain::situation::Situation;

use super::lexicon::lexicon_for;

/// Point values for each scoring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    /// Item is tagged for the detected situation (default: 40)
    pub situation_match: i32,
    /// Per beneficial tag, counted at most twice (default: 25)
    pub beneficial_tag: i32,
    /// Item targets the profile's age bracket (default: 20)
    pub age_bracket: i32,
    /// Item connects with a hobby (default: 20)
    pub hobby: i32,
    /// Item tags mention a goal (default: 15)
    pub goal: i32,
    /// Per situation keyword in the item text, counted at most twice (default: 10)
    pub keyword: i32,
    /// Subtracted when an item carries an avoid tag (default: 50)
    pub avoid_penalty: i32,
    /// Item has a low starting price (default: 10)
    pub affordable_price: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

/// Multi-factor scorer for catalog items.
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    weights: ScoringWeights,
    price_ceiling: Decimal,
}

impl ScoreCalculator {
    pub fn new() -> Self {
        Self::with_weights(ScoringWeights::default())
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights, price_ceiling: Decimal::from(super::AFFORDABLE_PRICE_CEILING) }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Scores one item. Rules are applied in a fixed order and the reasons
    /// list follows that order.
    pub fn score(&self, item: &CatalogItem, situation: &Situation, profile: &Profile) -> ScoredItem {
        let lexicon = lexicon_for(situation.category);
        let lowered_tags: Vec<String> = item.combined_tags().map(str::to_lowercase).collect();
        let text = item.search_text();

        let mut score = 0;
        let mut reasons = Vec::new();

        if item.is_tagged_for(situation.category) {
            score += self.weights.situation_match;
            reasons.push("Recomendado específicamente para tu situación".to_owned());
        }

        let beneficial: Vec<&str> = lexicon
            .beneficial_tags
            .iter()
            .copied()
            .filter(|wanted| lowered_tags.iter().any(|tag| tag == &wanted.to_lowercase()))
            .collect();
        if let Some(first) = beneficial.first() {
            score += self.weights.beneficial_tag * capped_hits(beneficial.len());
            reasons.push(format!("Actividad de tipo '{first}' ayuda en tu situación"));
        }

        if let Some(bracket) = profile.scoring_age_bracket() {
            if item.profile_tags.iter().any(|tag| tag == bracket.as_tag()) {
                score += self.weights.age_bracket;
                reasons.push("Adecuado para tu grupo de edad".to_owned());
            }
        }

        let hobby = profile.hobbies.iter().find(|hobby| {
            let lowered = hobby.to_lowercase();
            lowered_tags.iter().any(|tag| *tag == lowered) || text.contains(&lowered)
        });
        if let Some(hobby) = hobby {
            score += self.weights.hobby;
            reasons.push(format!("Conecta con tu interés en {hobby}"));
        }

        let goal = profile.goals.iter().find(|goal| {
            let lowered = goal.to_lowercase();
            lowered_tags.iter().any(|tag| tag.contains(&lowered))
        });
        if let Some(goal) = goal {
            score += self.weights.goal;
            reasons.push(format!("Alineado con tu meta de {goal}"));
        }

        let keyword_hits = lexicon.matched_keywords(&text).len();
        if keyword_hits > 0 {
            score += self.weights.keyword * capped_hits(keyword_hits);
        }

        if lexicon
            .avoid_tags
            .iter()
            .any(|avoid| lowered_tags.iter().any(|tag| tag.contains(&avoid.to_lowercase())))
        {
            score -= self.weights.avoid_penalty;
        }

        if item
            .starting_price
            .is_some_and(|price| price > Decimal::ZERO && price < self.price_ceiling)
        {
            score += self.weights.affordable_price;
            reasons.push("Precio accesible".to_owned());
        }

        ScoredItem { item: item.clone(), score, reasons }
    }

    /// Scores every item, drops non-positive scores and keeps the best
    /// `top_n`. Sorting is stable so equal scores keep catalog order.
    pub fn rank(
        &self,
        items: &[CatalogItem],
        situation: &Situation,
        profile: &Profile,
        top_n: usize,
    ) -> Vec<ScoredItem> {
        let mut scored: Vec<ScoredItem> = items
            .iter()
            .map(|item| self.score(item, situation, profile))
            .filter(|scored| scored.score > 0)
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(top_n);
        scored
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new()
    }
}

fn capped_hits(hits: usize) -> i32 {
    hits.min(2) as i32
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{ScoreCalculator, ScoringWeights};
    use crate::domain::catalog::CatalogItem;
    use crate::domain::profile::Profile;
    use crate::domain::situation::{Situation, SituationCategory};
    use crate::recommend::DEFAULT_WEIGHTS;

    fn situation(category: SituationCategory) -> Situation {
        Situation {
            category,
            subtype: Some("general".to_owned()),
            context: "Detectado: prueba".to_owned(),
            confidence: 1.0,
        }
    }

    fn item(id: &str, name: &str) -> CatalogItem {
        CatalogItem::new(id, name)
    }

    #[test]
    fn default_weights_match_contract() {
        assert_eq!(ScoringWeights::default(), DEFAULT_WEIGHTS);
        assert_eq!(DEFAULT_WEIGHTS.situation_match, 40);
        assert_eq!(DEFAULT_WEIGHTS.avoid_penalty, 50);
    }

    #[test]
    fn situation_tagged_item_scores_at_least_forty() {
        let mut candidate = item("c-1", "Caminata");
        candidate.situation_tags = vec!["muerte_familiar".to_owned()];

        let scored = ScoreCalculator::new().score(
            &candidate,
            &situation(SituationCategory::Bereavement),
            &Profile::new("u", "Ana"),
        );

        assert!(scored.score >= 40);
        assert_eq!(scored.reasons[0], "Recomendado específicamente para tu situación");
    }

    #[test]
    fn beneficial_tags_count_at_most_twice() {
        let mut candidate = item("c-2", "Retiro");
        candidate.profile_tags =
            vec!["Tranquilo".to_owned(), "naturaleza".to_owned(), "arte".to_owned()];

        let scored = ScoreCalculator::new().score(
            &candidate,
            &situation(SituationCategory::Bereavement),
            &Profile::new("u", "Ana"),
        );

        assert_eq!(scored.score, 50);
        assert_eq!(scored.reasons, vec!["Actividad de tipo 'tranquilo' ayuda en tu situación"]);
    }

    #[test]
    fn avoid_tag_costs_fifty_points() {
        let mut clean = item("c-3", "Torneo");
        clean.profile_tags = vec!["deportes".to_owned()];
        let mut penalized = clean.clone();
        penalized.profile_tags.push("competitivo_alto".to_owned());

        let calculator = ScoreCalculator::new();
        let situation = situation(SituationCategory::Bereavement);
        let profile = Profile::new("u", "Ana");

        let without = calculator.score(&clean, &situation, &profile).score;
        let with = calculator.score(&penalized, &situation, &profile).score;
        assert_eq!(without - with, 50);
    }

    #[test]
    fn avoid_tag_matches_regardless_of_case() {
        let mut lower = item("c-5", "Noche de karaoke");
        lower.profile_tags = vec!["fiesta".to_owned()];
        let mut capitalized = lower.clone();
        capitalized.profile_tags = vec!["Fiesta".to_owned()];

        let calculator = ScoreCalculator::new();
        let situation = situation(SituationCategory::Bereavement);
        let profile = Profile::new("u", "Ana");

        let lower_score = calculator.score(&lower, &situation, &profile).score;
        let capitalized_score = calculator.score(&capitalized, &situation, &profile).score;
        assert_eq!(capitalized_score, lower_score);
        assert!(capitalized_score < 0);
    }

    #[test]
    fn goal_substring_in_tags_adds_reason() {
        let mut candidate = item("c-4", "Chequeo");
        candidate.profile_tags = vec!["salud_mental".to_owned()];
        let profile = Profile::new("u", "Ana").with_goals(["salud"]);

        let scored = ScoreCalculator::new().score(
            &candidate,
            &situation(SituationCategory::EconomicHardship),
            &profile,
        );

        assert!(scored.reasons.iter().any(|reason| reason.contains("salud")));
        assert_eq!(scored.score, 15);
    }

    #[test]
    fn hobby_in_item_text_counts_once() {
        let mut candidate = item("c-5", "Clases de Guitarra");
        candidate.subcategory = "Musica".to_owned();
        let profile = Profile::new("u", "Ana").with_hobbies(["guitarra", "musica"]);

        let scored = ScoreCalculator::new().score(
            &candidate,
            &situation(SituationCategory::EconomicHardship),
            &profile,
        );

        assert_eq!(scored.score, 20);
        assert_eq!(scored.reasons, vec!["Conecta con tu interés en guitarra"]);
    }

    #[test]
    fn age_bracket_requires_profile_tag() {
        let mut candidate = item("c-6", "Tertulia");
        candidate.profile_tags = vec!["mayor".to_owned()];
        let calculator = ScoreCalculator::new();
        let situation = situation(SituationCategory::EconomicHardship);

        let senior = calculator.score(&candidate, &situation, &Profile::new("u", "Eva").with_age(61));
        let young = calculator.score(&candidate, &situation, &Profile::new("u", "Leo").with_age(22));
        assert_eq!(senior.score, 20);
        assert_eq!(young.score, 0);
    }

    #[test]
    fn keyword_hits_in_text_are_capped() {
        let mut candidate = item("c-7", "Duelo y luto");
        candidate.description = "Acompañamiento tras la muerte de un ser querido".to_owned();

        let scored = ScoreCalculator::new().score(
            &candidate,
            &situation(SituationCategory::Bereavement),
            &Profile::new("u", "Ana"),
        );

        assert_eq!(scored.score, 20);
        assert!(scored.reasons.is_empty());
    }

    #[test]
    fn affordable_price_bonus_needs_positive_price_below_ceiling() {
        let calculator = ScoreCalculator::new();
        let situation = situation(SituationCategory::EconomicHardship);
        let profile = Profile::new("u", "Ana");

        let mut cheap = item("c-8", "Taller");
        cheap.starting_price = Some(Decimal::new(45_000, 0));
        let mut expensive = cheap.clone();
        expensive.starting_price = Some(Decimal::new(100_000, 0));
        let mut free = cheap.clone();
        free.starting_price = Some(Decimal::ZERO);

        assert_eq!(calculator.score(&cheap, &situation, &profile).score, 10);
        assert_eq!(calculator.score(&expensive, &situation, &profile).score, 0);
        assert_eq!(calculator.score(&free, &situation, &profile).score, 0);
    }

    #[test]
    fn rank_orders_descending_and_drops_non_positive() {
        let situation = situation(SituationCategory::Bereavement);
        let profile = Profile::new("u", "Ana");

        let mut tagged = item("a", "Meditación");
        tagged.situation_tags = vec!["muerte_familiar".to_owned()];
        let mut calm = item("b", "Paseo");
        calm.profile_tags = vec!["tranquilo".to_owned()];
        let plain = item("c", "Curso de Excel");
        let mut party = item("d", "Fiesta");
        party.profile_tags = vec!["fiesta".to_owned()];

        let ranked =
            ScoreCalculator::new().rank(&[plain, calm, party, tagged], &situation, &profile, 4);

        let ids: Vec<&str> = ranked.iter().map(|scored| scored.item.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(ranked.windows(2).all(|pair| pair[0].score >= pair[1].score));
        assert!(ranked.iter().all(|scored| scored.score > 0));
    }

    #[test]
    fn rank_keeps_catalog_order_on_ties_and_respects_top_n() {
        let situation = situation(SituationCategory::Breakup);
        let profile = Profile::new("u", "Ana");
        let items: Vec<_> = (0..6)
            .map(|index| {
                let mut candidate = item(&format!("i-{index}"), "Salida grupal");
                candidate.profile_tags = vec!["social".to_owned()];
                candidate
            })
            .collect();

        let ranked = ScoreCalculator::new().rank(&items, &situation, &profile, 3);
        let ids: Vec<&str> = ranked.iter().map(|scored| scored.item.id.as_str()).collect();
        assert_eq!(ids, vec!["i-0", "i-1", "i-2"]);

        assert!(ScoreCalculator::new().rank(&items, &situation, &profile, 0).is_empty());
        assert!(ScoreCalculator::new().rank(&[], &situation, &profile, 4).is_empty());
    }
}
