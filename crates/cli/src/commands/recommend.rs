use std::sync::Arc;

use behuman_core::config::MAX_TOP_N;
use behuman_core::{classify_situation, Profile, RecommendationEngine, RecommendationRequest};
use behuman_db::repositories::{SqlCatalogRepository, SqlWellnessRequestRepository};

use crate::commands::{open_database, prepare, CommandResult};

#[derive(Debug, Clone, Default)]
pub struct RecommendArgs {
    pub transcript: String,
    pub name: String,
    pub user_id: Option<String>,
    pub age: Option<u32>,
    pub hobbies: Vec<String>,
    pub goals: Vec<String>,
    pub top_n: Option<usize>,
    pub seed: Option<u64>,
}

/// Runs the recommendation pipeline in-process against the configured catalog.
/// Nothing is persisted for HR review.
pub fn run(args: RecommendArgs) -> CommandResult {
    if let Err(message) = validate(&args) {
        return CommandResult::failure("recommend", "invalid_input", message, 7);
    }

    let (config, runtime) = match prepare("recommend") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let top_n = args.top_n.unwrap_or(config.recommendation.top_n);
    let seed = args.seed.or(config.recommendation.rng_seed);

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;

        let catalog = Arc::new(SqlCatalogRepository::new(pool.clone()));
        let store = Arc::new(SqlWellnessRequestRepository::new(pool.clone()));
        let mut engine = RecommendationEngine::new(catalog, store);
        if let Some(seed) = seed {
            engine = engine.with_seed(seed);
        }

        let request = RecommendationRequest::new(profile(&args), classify_situation(&args.transcript))
            .with_transcript(args.transcript.as_str())
            .with_top_n(top_n)
            .with_persistence(false)
            .with_correlation_id("cli-recommend");
        let recommendation = engine.get_recommendations(request).await;

        pool.close().await;
        Ok::<_, crate::commands::StepError>(recommendation)
    });

    match result {
        Ok(recommendation) => {
            let message = format!(
                "{} recommendations for situation `{}`",
                recommendation.recommendations.len(),
                recommendation.situation.category
            );
            match serde_json::to_value(&recommendation) {
                Ok(data) => CommandResult::success_with_data("recommend", message, Some(data)),
                Err(error) => CommandResult::failure("recommend", "serialization", error.to_string(), 1),
            }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("recommend", error_class, message, exit_code)
        }
    }
}

fn validate(args: &RecommendArgs) -> Result<(), String> {
    if args.transcript.trim().is_empty() {
        return Err("--transcript must not be blank".to_string());
    }
    if args.name.trim().is_empty() {
        return Err("--name must not be blank".to_string());
    }
    if let Some(top_n) = args.top_n {
        if top_n == 0 || top_n > MAX_TOP_N {
            return Err(format!("--top-n must be between 1 and {MAX_TOP_N}, got {top_n}"));
        }
    }
    Ok(())
}

fn profile(args: &RecommendArgs) -> Profile {
    let user_id = args.user_id.clone().unwrap_or_else(|| "cli-operator".to_string());
    let mut profile = Profile::new(user_id, args.name.trim())
        .with_hobbies(args.hobbies.iter().cloned())
        .with_goals(args.goals.iter().cloned());
    if let Some(age) = args.age {
        profile = profile.with_age(age);
    }
    profile
}
