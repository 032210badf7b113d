use catalog_dedup_service::catalog::parse_catalog;
use catalog_dedup_service::dto::{CategoryTree, DataFile, DuplicateItem};
use catalog_dedup_service::error::ServiceError;
use catalog_dedup_service::util::{download_object_from_s3, upload_object_to_s3};
use csv::Writer;
use rusoto_s3::S3Client;

const REPORT_HEADER: [&str; 8] = [
    "duplicate_id",
    "match_type",
    "similarity",
    "occurrence_id",
    "item_id",
    "item_type",
    "path",
    "normalized_name",
];

pub async fn pull_catalog(client: &S3Client, data: &DataFile) -> Result<CategoryTree, ServiceError> {
    let bytes = download_object_from_s3(client, data.bucket.clone(), data.key.clone()).await?;
    parse_catalog(&data.key, &bytes)
}

pub async fn push_report(
    client: &S3Client,
    bucket: String,
    key: String,
    duplicates: &[DuplicateItem],
) -> Result<(), ServiceError> {
    let object = write_report(duplicates)?;
    upload_object_to_s3(client, object, bucket, key).await
}

/// One CSV row per occurrence, grouped under its duplicate id.
pub fn write_report(duplicates: &[DuplicateItem]) -> Result<Vec<u8>, ServiceError> {
    let mut writer = Writer::from_writer(vec![]);
    writer
        .write_record(REPORT_HEADER)
        .map_err(ServiceError::internal_server_error)?;
    for duplicate in duplicates {
        let similarity = duplicate
            .similarity
            .map(|s| format!("{:.4}", s))
            .unwrap_or_default();
        for occurrence in &duplicate.occurrences {
            writer
                .write_record([
                    duplicate.id.as_str(),
                    duplicate.match_type.as_str(),
                    similarity.as_str(),
                    occurrence.id.as_str(),
                    occurrence.item_id.as_str(),
                    occurrence.item_type.as_str(),
                    occurrence.path.as_str(),
                    occurrence.normalized_name.as_str(),
                ])
                .map_err(ServiceError::internal_server_error)?;
        }
    }
    writer
        .into_inner()
        .map_err(ServiceError::internal_server_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_dedup_service::dto::{DuplicateOccurrence, ItemType};
    use catalog_dedup_service::options::MatchType;

    fn occurrence(item_id: &str, path: &str) -> DuplicateOccurrence {
        DuplicateOccurrence {
            id: format!("job-{}", item_id),
            path: path.to_string(),
            item_id: item_id.to_string(),
            normalized_name: "oil change".to_string(),
            category_name: Some("Automotive".to_string()),
            subcategory_name: None,
            item_type: ItemType::Job,
        }
    }

    #[test]
    fn report_has_header_and_row_per_occurrence() {
        let duplicates = vec![DuplicateItem {
            id: "similar-job-1-job-2".to_string(),
            text: "Oil Change / Oil Changes".to_string(),
            match_type: MatchType::Similar,
            occurrences: vec![
                occurrence("1", "Automotive > Oil Change"),
                occurrence("2", "Automotive > Oil, Changes"),
            ],
            similarity: Some(10.0 / 11.0),
        }];
        let report = String::from_utf8(write_report(&duplicates).unwrap()).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], REPORT_HEADER.join(","));
        assert_eq!(
            lines[1],
            "similar-job-1-job-2,similar,0.9091,job-1,1,job,Automotive > Oil Change,oil change"
        );
        assert!(lines[2].contains("\"Automotive > Oil, Changes\""));
    }

    #[test]
    fn empty_report_is_header_only() {
        let report = String::from_utf8(write_report(&[]).unwrap()).unwrap();
        assert_eq!(report.lines().count(), 1);
    }
}
