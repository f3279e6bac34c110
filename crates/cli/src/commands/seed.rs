use behuman_db::{CatalogSeedDataset, SeedResult};

use crate::commands::{open_database, prepare, CommandResult, StepError};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;

        let seeded = CatalogSeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = CatalogSeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let run_result: Result<SeedResult, StepError> = if verification.all_present {
            Ok(seeded)
        } else {
            let missing = verification
                .checks
                .iter()
                .filter_map(|(id, present)| (!present).then_some(*id))
                .collect::<Vec<_>>();
            Err(("seed_verification", verification_message(&missing), 6u8))
        };

        pool.close().await;
        run_result
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", summary(&seeded)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn summary(seeded: &SeedResult) -> String {
    let mut lines =
        vec![format!("wellness catalog seeded with {} activities", seeded.items_seeded)];
    for id in &seeded.inferred_tags {
        lines.push(format!("  - {id}: tags inferred"));
    }
    lines.join("\n")
}

fn verification_message(missing: &[&str]) -> String {
    if missing.is_empty() {
        "some catalog items failed to load".to_string()
    } else {
        format!("seed verification failed for items: {}", missing.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use behuman_db::SeedResult;

    use super::{summary, verification_message};

    #[test]
    fn verification_message_names_missing_items() {
        let message = verification_message(&["act-arteterapia", "act-club-running"]);
        assert_eq!(message, "seed verification failed for items: act-arteterapia, act-club-running");
    }

    #[test]
    fn verification_message_falls_back_to_generic_text() {
        assert_eq!(verification_message(&[]), "some catalog items failed to load");
    }

    #[test]
    fn summary_lists_items_with_inferred_tags() {
        let seeded = SeedResult { items_seeded: 3, inferred_tags: vec!["act-cocina-saludable"] };
        assert_eq!(
            summary(&seeded),
            "wellness catalog seeded with 3 activities\n  - act-cocina-saludable: tags inferred"
        );
    }
}
