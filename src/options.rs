use crate::error::ServiceError;
use serde::{Deserialize, Serialize};

/// Which level of the category tree takes part in a search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    #[default]
    All,
    Categories,
    Subcategories,
    Jobs,
}

/// Whether the item type participates in the exact-match grouping key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Name,
    Type,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    ExactWords,
    Similar,
    Partial,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::ExactWords => "exact_words",
            MatchType::Similar => "similar",
            MatchType::Partial => "partial",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DuplicateSearchOptions {
    pub exact_match: bool,
    pub exact_words: bool,
    pub similar_match: bool,
    pub partial_match: bool,
    /// Minimum similarity ratio (inclusive) for a pair to count as `similar`.
    pub similarity_threshold: f64,
    /// Words shorter than this (in chars) are ignored by word overlap matching.
    pub min_word_length: usize,
    pub ignore_case: bool,
    pub ignore_punctuation: bool,
    pub ignore_special_chars: bool,
    pub search_scope: SearchScope,
    pub group_by: GroupBy,
    pub min_group_size: usize,
    /// Informational only; the boolean flags above gate the passes.
    pub match_types: Vec<MatchType>,
}

impl Default for DuplicateSearchOptions {
    fn default() -> Self {
        Self {
            exact_match: true,
            exact_words: true,
            similar_match: true,
            partial_match: false,
            similarity_threshold: 0.8,
            min_word_length: 3,
            ignore_case: true,
            ignore_punctuation: true,
            ignore_special_chars: true,
            search_scope: SearchScope::All,
            group_by: GroupBy::Name,
            min_group_size: 2,
            match_types: vec![MatchType::Exact, MatchType::ExactWords, MatchType::Similar],
        }
    }
}

impl DuplicateSearchOptions {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ServiceError::bad_request(format!(
                "similarityThreshold must be between 0 and 1, got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options: DuplicateSearchOptions =
            serde_json::from_value(json!({ "partialMatch": true, "searchScope": "jobs" })).unwrap();
        assert!(options.partial_match);
        assert!(options.exact_match);
        assert_eq!(options.search_scope, SearchScope::Jobs);
        assert_eq!(options.similarity_threshold, 0.8);
        assert_eq!(options.min_group_size, 2);
    }

    #[test]
    fn match_types_use_snake_case_names() {
        let options: DuplicateSearchOptions =
            serde_json::from_value(json!({ "matchTypes": ["exact_words", "partial"] })).unwrap();
        assert_eq!(options.match_types, vec![MatchType::ExactWords, MatchType::Partial]);
    }

    #[test]
    fn threshold_outside_unit_range_is_rejected() {
        let options = DuplicateSearchOptions {
            similarity_threshold: 1.5,
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.msg.contains("similarityThreshold"));
        assert!(DuplicateSearchOptions::default().validate().is_ok());
    }
}
