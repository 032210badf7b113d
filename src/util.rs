use crate::error::ServiceError;
use crate::response::Status;
use futures::stream::TryStreamExt;
use rusoto_core::{Region, RusotoError};
use rusoto_s3::{GetObjectError, GetObjectRequest, PutObjectRequest, S3Client, S3};
use std::env;
use std::str::FromStr;

pub fn get_region() -> Result<Region, ServiceError> {
    match env::var("REGION") {
        Ok(val) => Region::from_str(val.as_str()).map_err(|_| ServiceError {
            msg: format!("Unable to parse region {}", val),
            status: Status::InternalServerError,
        }),
        _ => Err(ServiceError::internal_server_error(
            "Environment variable 'REGION' not found",
        )),
    }
}

/// Where the duplicate report for `key` is written: the first directory
/// segment named exactly `input` becomes `output`, and `-duplicates.csv` is
/// appended to the full file name so inputs differing only by extension
/// get separate reports.
pub fn report_key(key: &str) -> String {
    let mut segments: Vec<&str> = key.split('/').collect();
    let file = segments.pop().unwrap_or_default();
    if let Some(segment) = segments.iter_mut().find(|segment| **segment == "input") {
        *segment = "output";
    }
    segments.push(file);
    format!("{}-duplicates.csv", segments.join("/"))
}

pub async fn download_object_from_s3(
    client: &S3Client,
    bucket: String,
    key: String,
) -> Result<Vec<u8>, ServiceError> {
    let request = GetObjectRequest {
        bucket: bucket.clone(),
        key: key.clone(),
        ..Default::default()
    };
    let mut object = client.get_object(request).await.map_err(|err| match err {
        RusotoError::Service(GetObjectError::NoSuchKey(_)) => {
            ServiceError::not_found(format!("s3://{}/{} does not exist", bucket, key))
        }
        other => ServiceError::internal_server_error(other),
    })?;
    let body = object
        .body
        .take()
        .ok_or(ServiceError::internal_server_error(
            "Unable to extract body",
        ))?;
    body.map_ok(|b| b.to_vec())
        .try_concat()
        .await
        .map_err(ServiceError::internal_server_error)
}

pub async fn upload_object_to_s3(
    client: &S3Client,
    object: Vec<u8>,
    bucket: String,
    key: String,
) -> Result<(), ServiceError> {
    let request = PutObjectRequest {
        bucket,
        key,
        body: Some(object.into()),
        content_type: Some(String::from("text/csv")),
        ..Default::default()
    };
    client
        .put_object(request)
        .await
        .map(|_| ())
        .map_err(ServiceError::internal_server_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("input/catalog.json", "output/catalog.json-duplicates.csv")]
    #[case("tenants/42/input/services.csv", "tenants/42/output/services.csv-duplicates.csv")]
    #[case("catalog", "catalog-duplicates.csv")]
    #[case("myinput/x.csv", "myinput/x.csv-duplicates.csv")]
    #[case("input-data/input", "input-data/input-duplicates.csv")]
    #[case("a/input/b/input/x.csv", "a/output/b/input/x.csv-duplicates.csv")]
    fn derives_report_key(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(report_key(key), expected);
    }

    #[test]
    fn catalogs_differing_by_extension_get_separate_reports() {
        assert_ne!(report_key("input/catalog.json"), report_key("input/catalog.csv"));
    }
}
