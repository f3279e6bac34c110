use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::situation::SituationCategory;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogItemId(pub String);

impl CatalogItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A wellness activity offered to employees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: CatalogItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub starting_price: Option<Decimal>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub profile_tags: Vec<String>,
    #[serde(default)]
    pub situation_tags: Vec<String>,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CatalogItemId(id.into()),
            name: name.into(),
            description: String::new(),
            starting_price: None,
            category: String::new(),
            subcategory: String::new(),
            url: None,
            profile_tags: Vec::new(),
            situation_tags: Vec::new(),
        }
    }

    /// Profile tags followed by situation tags.
    pub fn combined_tags(&self) -> impl Iterator<Item = &str> {
        self.profile_tags.iter().chain(self.situation_tags.iter()).map(String::as_str)
    }

    pub fn is_tagged_for(&self, category: SituationCategory) -> bool {
        self.situation_tags.iter().any(|tag| tag == category.as_tag())
    }

    /// Lowercased name, subcategory and description.
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.name, self.subcategory, self.description).to_lowercase()
    }

    /// Lowercased name and subcategory.
    pub fn headline_text(&self) -> String {
        format!("{} {}", self.name, self.subcategory).to_lowercase()
    }
}
