//! Client side of the query API: fetch readings and normalize them.
//!
//! Works against this crate's own server as well as any other deployment that
//! serves the same routes, including ones that encode measurements as strings.
use crate::{
    common::{LatestQuery, ReadingsQuery},
    config::api_url,
    error::ClientError,
    normalize::{normalize_all, NormalizedSensorData, RawSensorData},
};
use awc::Client;
use log::debug;
use serde::Serialize;

/// Upper bound on a response body; a full default range is roughly 8 MiB.
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;

async fn fetch<Q: Serialize>(
    client: &Client,
    url: &str,
    query: &Q,
) -> Result<Vec<NormalizedSensorData>, ClientError> {
    debug!("GET {}", url);
    let mut res = client
        .get(url)
        .query(query)
        .map_err(|e| ClientError::Send(e.to_string()))?
        .send()
        .await
        .map_err(|e| ClientError::Send(e.to_string()))?;

    if !res.status().is_success() {
        return Err(ClientError::Status(res.status().as_u16()));
    }

    let raw: Vec<RawSensorData> = res
        .json()
        .limit(MAX_RESPONSE_BYTES)
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))?;
    debug!("received {} records", raw.len());
    Ok(normalize_all(raw)?)
}

/// Newest `limit` readings (the server defaults to one when `None`).
pub async fn fetch_latest(
    client: &Client,
    base_url: &str,
    limit: Option<i64>,
) -> Result<Vec<NormalizedSensorData>, ClientError> {
    let url = api_url(base_url, "sensor-data/latest");
    let query = LatestQuery {
        limit: limit.map(|n| n.to_string()),
    };
    fetch(client, &url, &query).await
}

pub async fn fetch_range(
    client: &Client,
    base_url: &str,
    query: &ReadingsQuery,
) -> Result<Vec<NormalizedSensorData>, ClientError> {
    let url = api_url(base_url, "sensor-data");
    fetch(client, &url, query).await
}
