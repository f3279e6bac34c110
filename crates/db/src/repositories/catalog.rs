use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use behuman_core::domain::catalog::{CatalogItem, CatalogItemId};
use behuman_core::errors::ApplicationError;
use behuman_core::recommend::CatalogSource;

use super::{CatalogRepository, RepositoryError};
use crate::DbPool;

const CATALOG_COLUMNS: &str = "id, name, description, starting_price, category, subcategory, url,
        profile_tags_json, situation_tags_json";

pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM catalog_item").fetch_one(&self.pool).await?;
        Ok(count)
    }
}

#[async_trait]
impl CatalogRepository for SqlCatalogRepository {
    async fn find_by_id(&self, id: &CatalogItemId) -> Result<Option<CatalogItem>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {CATALOG_COLUMNS} FROM catalog_item WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(item_from_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<CatalogItem>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {CATALOG_COLUMNS} FROM catalog_item ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn list_by_situation_tag(&self, tag: &str) -> Result<Vec<CatalogItem>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CATALOG_COLUMNS}
             FROM catalog_item
             WHERE EXISTS (
                 SELECT 1 FROM json_each(catalog_item.situation_tags_json)
                 WHERE json_each.value = ?
             )
             ORDER BY id"
        ))
        .bind(tag)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn save(&self, item: CatalogItem) -> Result<(), RepositoryError> {
        let profile_tags = encode_tags(&item.profile_tags)?;
        let situation_tags = encode_tags(&item.situation_tags)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO catalog_item (id, name, description, starting_price, category, subcategory,
                                       url, profile_tags_json, situation_tags_json,
                                       created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 description = excluded.description,
                 starting_price = excluded.starting_price,
                 category = excluded.category,
                 subcategory = excluded.subcategory,
                 url = excluded.url,
                 profile_tags_json = excluded.profile_tags_json,
                 situation_tags_json = excluded.situation_tags_json,
                 updated_at = excluded.updated_at",
        )
        .bind(&item.id.0)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.starting_price.map(|price| price.to_string()))
        .bind(&item.category)
        .bind(&item.subcategory)
        .bind(&item.url)
        .bind(profile_tags)
        .bind(situation_tags)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CatalogSource for SqlCatalogRepository {
    async fn items_by_situation_tag(
        &self,
        tag: &str,
    ) -> Result<Vec<CatalogItem>, ApplicationError> {
        Ok(self.list_by_situation_tag(tag).await?)
    }

    async fn all_items(&self) -> Result<Vec<CatalogItem>, ApplicationError> {
        Ok(self.list_all().await?)
    }
}

pub(crate) fn encode_tags(tags: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(tags).map_err(|e| RepositoryError::Decode(e.to_string()))
}

pub(crate) fn decode_price(raw: Option<String>) -> Result<Option<Decimal>, RepositoryError> {
    raw.filter(|value| !value.trim().is_empty())
        .map(|value| {
            Decimal::from_str(value.trim()).map_err(|e| {
                RepositoryError::Decode(format!("invalid starting price `{value}`: {e}"))
            })
        })
        .transpose()
}

fn item_from_row(row: &SqliteRow) -> Result<CatalogItem, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let description: String =
        row.try_get("description").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let starting_price: Option<String> =
        row.try_get("starting_price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let category: String =
        row.try_get("category").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let subcategory: String =
        row.try_get("subcategory").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let url: Option<String> =
        row.try_get("url").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let profile_tags_json: String =
        row.try_get("profile_tags_json").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let situation_tags_json: String =
        row.try_get("situation_tags_json").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let profile_tags: Vec<String> = serde_json::from_str(&profile_tags_json)
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let situation_tags: Vec<String> = serde_json::from_str(&situation_tags_json)
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(CatalogItem {
        id: CatalogItemId(id),
        name,
        description,
        starting_price: decode_price(starting_price)?,
        category,
        subcategory,
        url,
        profile_tags,
        situation_tags,
    })
}
