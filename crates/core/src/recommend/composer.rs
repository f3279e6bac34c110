//! Empathic message composition.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::profile::Profile;
use crate::domain::recommendation::ScoredItem;
use crate::domain::situation::Situation;

use super::lexicon::{activity_benefit, lexicon_for};
use super::{GOAL_CLAUSE_LIMIT, MAX_MESSAGE_CHARS};

/// Sentence boundaries before this position are too early to cut at.
const MIN_SENTENCE_CUT: usize = 300;
const ELLIPSIS: &str = "...";

/// Builds the personalised message for the top recommendation.
///
/// The calming sentence is drawn from `rng`, so a seeded generator makes the
/// output reproducible. Without a top item a short holding message is
/// returned instead. The result never exceeds [`MAX_MESSAGE_CHARS`] chars.
pub fn compose_message<R>(
    profile: &Profile,
    situation: &Situation,
    top_item: Option<&ScoredItem>,
    rng: &mut R,
) -> String
where
    R: Rng + ?Sized,
{
    let Some(top) = top_item else {
        return format!(
            "{}, estamos buscando las mejores opciones para apoyarte en este momento.",
            profile.name
        );
    };

    let lexicon = lexicon_for(situation.category);
    let confrontation = lexicon.confrontation(situation.subtype_or_general());
    let calming = lexicon.calming_phrases.choose(rng).copied().unwrap_or_default();
    let hobby_phrase = hobby_connection(profile, top);

    let mut message = format!(
        "{}, sé que hoy te toca {confrontation}. {calming} Por eso, {hobby_phrase}",
        profile.name
    );

    match top.item.profile_tags.iter().find_map(|tag| activity_benefit(tag)) {
        Some(benefit) => {
            message.push_str(" — ");
            message.push_str(benefit);
            message.push('.');
        }
        None => message.push('.'),
    }

    if let Some(goal) = profile.goals.first() {
        if message.chars().count() < GOAL_CLAUSE_LIMIT {
            message.push_str(&format!(" Un paso hacia {}.", goal.to_lowercase()));
        }
    }

    bound_length(message)
}

fn hobby_connection(profile: &Profile, top: &ScoredItem) -> String {
    let name = &top.item.name;
    let headline = top.item.headline_text();

    let mut hobbies = profile.hobbies.iter().map(|hobby| hobby.to_lowercase());
    if let Some(hobby) = hobbies.clone().find(|hobby| headline.contains(hobby.as_str())) {
        return format!("aprovechando tu gusto por {hobby}, te recomendamos {name}");
    }
    match hobbies.next() {
        Some(hobby) => {
            format!("combinando tu interés en {hobby} con algo nuevo, te sugerimos {name}")
        }
        None => format!("te recomendamos {name}"),
    }
}

/// Cuts an overlong message at the last sentence end past
/// [`MIN_SENTENCE_CUT`], or hard-truncates with an ellipsis.
fn bound_length(message: String) -> String {
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return message;
    }

    let head: Vec<char> = message.chars().take(MAX_MESSAGE_CHARS - ELLIPSIS.len()).collect();
    match head.iter().rposition(|c| *c == '.') {
        Some(period) if period > MIN_SENTENCE_CUT => head[..=period].iter().collect(),
        _ => {
            let mut truncated: String = head.iter().collect();
            truncated.push_str(ELLIPSIS);
            truncated
        }
    }
}
