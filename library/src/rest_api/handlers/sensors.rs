use crate::{
    common::{effective_limit, LatestQuery, ReadingsQuery, SensorData, DEFAULT_LATEST_LIMIT},
    db::{
        actions::{self, DbPool},
        model::{DbReading, GetReadings, NewReading},
    },
    error::ApiError,
    reading::{ReadingForm, SensorReading},
};
use actix_web::{web, HttpResponse};
use log::{error, info, warn};
use serde_json::json;

/// Ingests one reading. The store is not retried here: on a 5xx the device is
/// expected to send the reading again.
pub async fn post_reading(
    web::Form(form): web::Form<ReadingForm>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let reading = SensorReading::try_from(form).map_err(|e| {
        warn!("rejected reading: {}", e);
        e
    })?;

    let location = reading.location.clone();
    let stored = web::block(move || -> Result<DbReading, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::insert_reading(&mut conn, &NewReading::from(&reading))?)
    })
    .await
    .map_err(|_| ApiError::Blocking)
    .and_then(|res| res)
    .map_err(|e| {
        error!("failed to store reading from {:?}: {}", location, e);
        e
    })?;

    info!(
        "stored reading {} from {:?} (indoorTd {:.2})",
        stored.id, stored.location, stored.indoor_td
    );
    Ok(HttpResponse::Created().json(json!({
        "message": "Sensor data inserted successfully",
        "id": stored.id,
    })))
}

async fn fetch(pool: web::Data<DbPool>, msg: GetReadings) -> Result<Vec<SensorData>, ApiError> {
    let rows = web::block(move || -> Result<Vec<DbReading>, ApiError> {
        let mut conn = pool.get()?;
        Ok(actions::load_readings(&mut conn, &msg)?)
    })
    .await
    .map_err(|_| ApiError::Blocking)
    .and_then(|res| res)
    .map_err(|e| {
        error!("failed to fetch sensor data: {}", e);
        e
    })?;
    Ok(rows.into_iter().map(SensorData::from).collect())
}

pub async fn get_readings(
    web::Query(query): web::Query<ReadingsQuery>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let msg = query.to_message().map_err(ApiError::BadQuery)?;
    info!(
        "fetching data with range {:?} to {:?}, limit {}",
        msg.start, msg.end, msg.limit
    );
    let data = fetch(pool, msg).await?;
    info!("returned {} records", data.len());
    Ok(HttpResponse::Ok().json(data))
}

pub async fn get_latest(
    web::Query(query): web::Query<LatestQuery>,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, ApiError> {
    let msg = GetReadings::latest(effective_limit(query.limit.as_deref(), DEFAULT_LATEST_LIMIT));
    let data = fetch(pool, msg).await?;
    Ok(HttpResponse::Ok().json(data))
}
