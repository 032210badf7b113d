use crate::dto::{CatalogRow, Category, CategoryTree, DuplicateOccurrence, ItemType, Job, Subcategory};
use crate::error::ServiceError;
use crate::normalize::normalize;
use crate::options::{DuplicateSearchOptions, SearchScope};
use csv::Reader;

/// A category, subcategory or job flattened out of the tree for one search call.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchableItem {
    pub id: String,
    pub text: String,
    pub normalized_text: String,
    pub path: String,
    pub item_type: ItemType,
    pub category_name: Option<String>,
    pub subcategory_name: Option<String>,
}

impl SearchableItem {
    /// Unique within a call even when ids repeat across tree levels.
    pub fn key(&self) -> String {
        format!("{}-{}", self.item_type.as_str(), self.id)
    }

    pub fn occurrence(&self) -> DuplicateOccurrence {
        DuplicateOccurrence {
            id: self.key(),
            path: self.path.clone(),
            item_id: self.id.clone(),
            normalized_name: self.normalized_text.clone(),
            category_name: self.category_name.clone(),
            subcategory_name: self.subcategory_name.clone(),
            item_type: self.item_type,
        }
    }
}

/// Flattens the tree depth-first in input order, keeping only the levels
/// selected by `search_scope`. Names that normalize to nothing are dropped.
pub fn flatten(tree: &[Category], options: &DuplicateSearchOptions) -> Vec<SearchableItem> {
    let wants = |item_type: ItemType| match options.search_scope {
        SearchScope::All => true,
        SearchScope::Categories => item_type == ItemType::Category,
        SearchScope::Subcategories => item_type == ItemType::Subcategory,
        SearchScope::Jobs => item_type == ItemType::Job,
    };
    let mut items = Vec::new();
    let mut push = |item: SearchableItem| {
        if !item.normalized_text.is_empty() {
            items.push(item);
        }
    };
    for category in tree {
        if wants(ItemType::Category) {
            push(SearchableItem {
                id: category.id.clone(),
                text: category.name.clone(),
                normalized_text: normalize(&category.name, options),
                path: category.name.clone(),
                item_type: ItemType::Category,
                category_name: None,
                subcategory_name: None,
            });
        }
        for subcategory in &category.subcategories {
            let sub_path = format!("{} > {}", category.name, subcategory.name);
            if wants(ItemType::Subcategory) {
                push(SearchableItem {
                    id: subcategory.id.clone(),
                    text: subcategory.name.clone(),
                    normalized_text: normalize(&subcategory.name, options),
                    path: sub_path.clone(),
                    item_type: ItemType::Subcategory,
                    category_name: Some(category.name.clone()),
                    subcategory_name: None,
                });
            }
            if !wants(ItemType::Job) {
                continue;
            }
            for job in &subcategory.jobs {
                push(SearchableItem {
                    id: job.id.clone(),
                    text: job.name.clone(),
                    normalized_text: normalize(&job.name, options),
                    path: format!("{} > {}", sub_path, job.name),
                    item_type: ItemType::Job,
                    category_name: Some(category.name.clone()),
                    subcategory_name: Some(subcategory.name.clone()),
                });
            }
        }
    }
    items
}

/// Decodes a catalog file. `.json` keys hold a serialized tree, anything
/// else is read as CSV rows (see [`CatalogRow`]).
pub fn parse_catalog(key: &str, bytes: &[u8]) -> Result<CategoryTree, ServiceError> {
    if key.to_ascii_lowercase().ends_with(".json") {
        return serde_json::from_slice(bytes).map_err(|err| {
            ServiceError::bad_request(format!("invalid category tree: {}", err))
        });
    }
    let mut reader = Reader::from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(ServiceError::internal_server_error)?
        .clone();
    let rows = reader
        .records()
        .map(|record| match record {
            Ok(rec) => rec.deserialize::<CatalogRow>(Some(&headers)).map_err(|_| {
                ServiceError::bad_request(
                    "file must contain columns 'category_id' and 'category_name'",
                )
            }),
            Err(err) => Err(ServiceError::internal_server_error(err)),
        })
        .collect::<Result<Vec<CatalogRow>, ServiceError>>()?;
    Ok(fold_rows(rows))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Rebuilds the tree from flat rows, first-seen order at every level.
fn fold_rows(rows: Vec<CatalogRow>) -> CategoryTree {
    let mut tree: CategoryTree = Vec::new();
    for row in rows {
        let category_idx = match tree.iter().position(|c| c.id == row.category_id) {
            Some(idx) => idx,
            None => {
                tree.push(Category {
                    id: row.category_id.clone(),
                    name: row.category_name.clone(),
                    description: None,
                    subcategories: Vec::new(),
                });
                tree.len() - 1
            }
        };
        let category = &mut tree[category_idx];
        let (Some(sub_id), Some(sub_name)) =
            (non_blank(row.subcategory_id), non_blank(row.subcategory_name))
        else {
            continue;
        };
        let sub_idx = match category.subcategories.iter().position(|s| s.id == sub_id) {
            Some(idx) => idx,
            None => {
                category.subcategories.push(Subcategory {
                    id: sub_id,
                    name: sub_name,
                    description: None,
                    jobs: Vec::new(),
                });
                category.subcategories.len() - 1
            }
        };
        if let (Some(job_id), Some(job_name)) = (non_blank(row.job_id), non_blank(row.job_name)) {
            let jobs = &mut category.subcategories[sub_idx].jobs;
            if !jobs.iter().any(|j| j.id == job_id) {
                jobs.push(Job {
                    id: job_id,
                    name: job_name,
                    description: None,
                });
            }
        }
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Status;

    fn sample_tree() -> CategoryTree {
        vec![Category {
            id: "1".into(),
            name: "Automotive".into(),
            description: Some("Vehicle services".into()),
            subcategories: vec![Subcategory {
                id: "1".into(),
                name: "Maintenance".into(),
                description: None,
                jobs: vec![
                    Job { id: "1".into(), name: "Oil Change!".into(), description: None },
                    Job { id: "2".into(), name: "???".into(), description: None },
                ],
            }],
        }]
    }

    #[test]
    fn flatten_builds_paths_and_context() {
        let items = flatten(&sample_tree(), &DuplicateSearchOptions::default());
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].path, "Automotive");
        assert_eq!(items[1].path, "Automotive > Maintenance");
        assert_eq!(items[1].category_name.as_deref(), Some("Automotive"));
        let job = &items[2];
        assert_eq!(job.path, "Automotive > Maintenance > Oil Change!");
        assert_eq!(job.normalized_text, "oil change");
        assert_eq!(job.subcategory_name.as_deref(), Some("Maintenance"));
        assert_eq!(job.key(), "job-1");
    }

    #[test]
    fn flatten_honours_scope() {
        let options = DuplicateSearchOptions {
            search_scope: SearchScope::Subcategories,
            ..Default::default()
        };
        let items = flatten(&sample_tree(), &options);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_type, ItemType::Subcategory);
    }

    #[test]
    fn parses_json_tree() {
        let json = serde_json::to_vec(&sample_tree()).unwrap();
        assert_eq!(parse_catalog("input/catalog.JSON", &json).unwrap(), sample_tree());
    }

    #[test]
    fn parses_csv_rows_into_tree() {
        let csv = "category_id,category_name,subcategory_id,subcategory_name,job_id,job_name\n\
                   1,Automotive,10,Maintenance,100,Oil Change\n\
                   1,Automotive,10,Maintenance,101,Tire Rotation\n\
                   1,Automotive,11,Detailing,,\n\
                   2,Fuel,,,,\n";
        let tree = parse_catalog("input/catalog.csv", csv.as_bytes()).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].subcategories.len(), 2);
        assert_eq!(tree[0].subcategories[0].jobs.len(), 2);
        assert_eq!(tree[0].subcategories[0].jobs[1].name, "Tire Rotation");
        assert!(tree[0].subcategories[1].jobs.is_empty());
        assert!(tree[1].subcategories.is_empty());
    }

    #[test]
    fn csv_without_required_columns_is_bad_request() {
        let csv = "id,text\n1,Oil Change\n";
        let err = parse_catalog("input/catalog.csv", csv.as_bytes()).unwrap_err();
        assert!(matches!(err.status, Status::BadRequest));
    }

    #[test]
    fn malformed_json_is_bad_request() {
        let err = parse_catalog("catalog.json", b"{not json").unwrap_err();
        assert!(matches!(err.status, Status::BadRequest));
    }
}
