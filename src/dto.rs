use crate::options::{DuplicateSearchOptions, MatchType};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DataFile {
    pub bucket: String,
    pub key: String,
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    pub data: DataFile,
    #[serde(default)]
    pub options: DuplicateSearchOptions,
    /// Echo the full duplicate list in the response body, not only in the report file.
    #[serde(default)]
    pub include_duplicates: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Job {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Subcategory {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

pub type CategoryTree = Vec<Category>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Category,
    Subcategory,
    Job,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Category => "category",
            ItemType::Subcategory => "subcategory",
            ItemType::Job => "job",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateOccurrence {
    pub id: String,
    pub path: String,
    pub item_id: String,
    pub normalized_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory_name: Option<String>,
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateItem {
    pub id: String,
    pub text: String,
    pub match_type: MatchType,
    pub occurrences: Vec<DuplicateOccurrence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// One row of the CSV catalog format; blank subcategory/job columns mean
/// the row only introduces the levels above them.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CatalogRow {
    pub category_id: String,
    pub category_name: String,
    #[serde(default)]
    pub subcategory_id: Option<String>,
    #[serde(default)]
    pub subcategory_name: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub job_name: Option<String>,
}
