use behuman_core::domain::catalog::CatalogItem;
use behuman_core::tagging::infer_tags;
use behuman_db::repositories::{CatalogRepository, SqlCatalogRepository};
use serde::Serialize;

use crate::commands::{open_database, prepare, CommandResult};

#[derive(Debug, PartialEq, Serialize)]
struct RetagChange {
    id: String,
    situation_tags: Vec<String>,
    profile_tags: Vec<String>,
}

/// Recomputes inferred tags for every catalog item. `dry_run` reports without writing.
pub fn run(dry_run: bool) -> CommandResult {
    let (config, runtime) = match prepare("retag") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let repo = SqlCatalogRepository::new(pool.clone());

        let items =
            repo.list_all().await.map_err(|error| ("retag_execution", error.to_string(), 5u8))?;
        let total = items.len();

        let mut changes = Vec::new();
        for item in items {
            let Some((updated, change)) = retagged(item) else {
                continue;
            };
            if !dry_run {
                repo.save(updated)
                    .await
                    .map_err(|error| ("retag_execution", error.to_string(), 5u8))?;
            }
            changes.push(change);
        }

        pool.close().await;
        Ok::<_, crate::commands::StepError>((total, changes))
    });

    match result {
        Ok((total, changes)) => {
            let verb = if dry_run { "would retag" } else { "retagged" };
            let message = format!("{verb} {} of {total} catalog items", changes.len());
            let data = serde_json::to_value(&changes).ok();
            CommandResult::success_with_data("retag", message, data)
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("retag", error_class, message, exit_code)
        }
    }
}

fn retagged(mut item: CatalogItem) -> Option<(CatalogItem, RetagChange)> {
    let inferred = infer_tags(&item);
    if inferred.situation_tags == item.situation_tags && inferred.profile_tags == item.profile_tags
    {
        return None;
    }

    item.situation_tags = inferred.situation_tags;
    item.profile_tags = inferred.profile_tags;
    let change = RetagChange {
        id: item.id.0.clone(),
        situation_tags: item.situation_tags.clone(),
        profile_tags: item.profile_tags.clone(),
    };
    Some((item, change))
}

#[cfg(test)]
mod tests {
    use behuman_core::domain::catalog::CatalogItem;
    use behuman_core::tagging::infer_tags;

    use super::retagged;

    fn finance_course() -> CatalogItem {
        let mut item = CatalogItem::new("act-finanzas", "Curso de finanzas personales");
        item.description = "Organiza tus deudas y aprende a ahorrar".to_string();
        item.category = "Educación".to_string();
        item
    }

    #[test]
    fn untagged_item_receives_inferred_tags() {
        let (updated, change) = retagged(finance_course()).expect("item should change");

        assert!(updated.situation_tags.iter().any(|tag| tag == "causa_economica"));
        assert_eq!(change.id, "act-finanzas");
        assert_eq!(change.situation_tags, updated.situation_tags);
    }

    #[test]
    fn item_already_matching_inference_is_skipped() {
        let mut item = finance_course();
        let inferred = infer_tags(&item);
        item.situation_tags = inferred.situation_tags;
        item.profile_tags = inferred.profile_tags;

        assert!(retagged(item).is_none());
    }
}
