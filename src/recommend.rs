use crate::dto::DuplicateItem;
use crate::options::MatchType;

pub const WELL_ORGANIZED: &str =
    "No duplicates found. Your service hierarchy appears to be well-organized.";

const REVIEW_PROMPT: &str =
    "Review each flagged entry before merging or deleting to make sure no scheduled work or pricing is lost.";

/// Human-readable guidance for a duplicate search result.
pub fn generate_duplicate_recommendations(duplicates: &[DuplicateItem]) -> Vec<String> {
    if duplicates.is_empty() {
        return vec![WELL_ORGANIZED.to_string()];
    }
    let count = |match_type: MatchType| {
        duplicates
            .iter()
            .filter(|d| d.match_type == match_type)
            .count()
    };
    let mut recommendations = Vec::new();
    let exact = count(MatchType::Exact);
    if exact > 0 {
        recommendations.push(format!(
            "Found {} exact duplicate group(s). Merge these entries or remove the redundant copies.",
            exact
        ));
    }
    let exact_words = count(MatchType::ExactWords);
    if exact_words > 0 {
        recommendations.push(format!(
            "Found {} group(s) of services sharing significant words. Check whether they describe the same work.",
            exact_words
        ));
    }
    let similar = count(MatchType::Similar);
    if similar > 0 {
        recommendations.push(format!(
            "Found {} similar pair(s). These may be spelling variations of the same service.",
            similar
        ));
    }
    let partial = count(MatchType::Partial);
    if partial > 0 {
        recommendations.push(format!(
            "Found {} partial match(es) where one name contains another. Consider consolidating them.",
            partial
        ));
    }
    recommendations.push(REVIEW_PROMPT.to_string());
    recommendations
}
