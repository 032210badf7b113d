mod util;

use catalog_dedup_service::dto::SearchConfig;
use catalog_dedup_service::error::ServiceError;
use catalog_dedup_service::response::make_response_payload;
use catalog_dedup_service::util::{get_region, report_key};
use catalog_dedup_service::{find_service_duplicates, generate_duplicate_recommendations};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use lazy_static::lazy_static;
use rusoto_core::{Client, Region};
use rusoto_s3::S3Client;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

lazy_static! {
    // AWS Region
    static ref REGION: Region = get_region().unwrap();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .without_time()
        .init();
    run(service_fn(process)).await?;
    Ok(())
}

async fn process(event: LambdaEvent<SearchConfig>) -> Result<Value, Error> {
    let (config, _context) = event.into_parts();
    let result = search(config).await;
    match &result {
        Err(err) if err.is_client_error() => {
            info!(status = err.status.code(), "search rejected: {}", err.msg)
        }
        Err(err) => warn!(status = err.status.code(), "search failed: {}", err.msg),
        Ok(_) => {}
    }
    make_response_payload(result)
}

async fn search(config: SearchConfig) -> Result<Value, ServiceError> {
    config.options.validate()?;
    let start = Instant::now();
    let client = S3Client::new_with_client(Client::shared(), REGION.clone());
    let categories = util::pull_catalog(&client, &config.data).await?;
    info!(
        categories = categories.len(),
        "catalog downloaded in {:.4} secs",
        start.elapsed().as_secs_f64()
    );
    let start = Instant::now();
    let duplicates = find_service_duplicates(&categories, &config.options);
    let recommendations = generate_duplicate_recommendations(&duplicates);
    info!(
        duplicates = duplicates.len(),
        "duplicate search completed in {:.4} secs",
        start.elapsed().as_secs_f64()
    );
    let output_key = report_key(&config.data.key);
    util::push_report(
        &client,
        config.data.bucket.clone(),
        output_key.clone(),
        &duplicates,
    )
    .await?;
    let mut body = json!({
        "bucket": config.data.bucket,
        "key": output_key,
        "duplicateCount": duplicates.len(),
        "recommendations": recommendations,
    });
    if config.include_duplicates {
        body["duplicates"] =
            serde_json::to_value(&duplicates).map_err(ServiceError::internal_server_error)?;
    }
    Ok(body)
}
