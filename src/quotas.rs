//! SmartQuotas directory quotas.

use crate::error::{Error, Result};
use crate::ordered_values::OrderedValues;
use crate::rest_client::{Payload, RestClient};
use crate::types::Quota;
use reqwest::Method;
use serde::{Deserialize, Serialize};

pub const QUOTAS_PATH: &str = "/platform/1/quota/quotas";

#[derive(Debug, Default, Deserialize)]
struct QuotaListResponse {
    #[serde(default)]
    quotas: Vec<Quota>,
}

/// Thresholds sent on create/update. Unset thresholds go out as `null`.
#[derive(Debug, Serialize)]
struct ThresholdsRequest {
    advisory: Option<i64>,
    hard: Option<i64>,
    soft: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CreateQuotaRequest<'a> {
    enforced: bool,
    include_snapshots: bool,
    path: &'a str,
    container: bool,
    thresholds_include_overhead: bool,
    #[serde(rename = "type")]
    quota_type: &'a str,
    thresholds: ThresholdsRequest,
}

#[derive(Debug, Serialize)]
struct UpdateQuotaRequest {
    enforced: bool,
    thresholds_include_overhead: bool,
    thresholds: ThresholdsRequest,
}

fn hard_only(size: i64) -> ThresholdsRequest {
    ThresholdsRequest {
        advisory: None,
        hard: Some(size),
        soft: None,
    }
}

fn path_param(path: &str) -> OrderedValues {
    OrderedValues::from([("path", path)])
}

/// The quota whose path is exactly `path`.
pub async fn get_quota(client: &RestClient, path: &str) -> Result<Quota> {
    let resp: Option<QuotaListResponse> = client
        .get(QUOTAS_PATH, "", Some(&path_param(path)), &[])
        .await?;

    resp.unwrap_or_default()
        .quotas
        .into_iter()
        .find(|q| q.path == path)
        .ok_or_else(|| Error::NotFound(format!("Quota not found: {path}")))
}

/// Create an enforced directory quota with a hard threshold of `size` bytes.
pub async fn create_quota(client: &RestClient, path: &str, container: bool, size: i64) -> Result<()> {
    let req = CreateQuotaRequest {
        enforced: true,
        include_snapshots: false,
        path,
        container,
        thresholds_include_overhead: false,
        quota_type: "directory",
        thresholds: hard_only(size),
    };
    client
        .execute(Method::POST, QUOTAS_PATH, "", None, &[], Payload::json(&req)?)
        .await?;
    Ok(())
}

/// Put a hard threshold on `path` (a non-container create).
pub async fn set_quota_hard_threshold(client: &RestClient, path: &str, size: i64) -> Result<()> {
    create_quota(client, path, false, size).await
}

/// Change the hard threshold of the existing quota on `path`.
pub async fn update_quota_hard_threshold(client: &RestClient, path: &str, size: i64) -> Result<()> {
    let quota = get_quota(client, path).await?;
    let req = UpdateQuotaRequest {
        enforced: true,
        thresholds_include_overhead: false,
        thresholds: hard_only(size),
    };
    client
        .execute(
            Method::PUT,
            QUOTAS_PATH,
            &quota.id,
            None,
            &[],
            Payload::json(&req)?,
        )
        .await?;
    Ok(())
}

/// Remove the quota on `path`.
pub async fn delete_quota(client: &RestClient, path: &str) -> Result<()> {
    client
        .execute(
            Method::DELETE,
            QUOTAS_PATH,
            "",
            Some(&path_param(path)),
            &[],
            Payload::Empty,
        )
        .await?;
    Ok(())
}
