use crate::db::model::{DbReading, GetReadings};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RANGE_LIMIT: i64 = 15000;
pub const DEFAULT_LATEST_LIMIT: i64 = 1;

pub const HIGH_TEMPERATURE: f64 = 25.0;
pub const LOW_TEMPERATURE: f64 = 18.0;
pub const HIGH_CO2: f64 = 1000.0;

/// Format `recTime` is written in, matching the store's `CURRENT_TIMESTAMP`.
pub const REC_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Query string of `GET /api/sensor-data`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

/// Query string of `GET /api/sensor-data/latest`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LatestQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

/// Missing, blank, unparseable or non-positive limits fall back to `default`.
pub fn effective_limit(limit: Option<&str>, default: i64) -> i64 {
    match limit.map(|s| s.trim().parse::<i64>()) {
        Some(Ok(n)) if n > 0 => n,
        _ => default,
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or a bare
/// date (midnight). Offsets are converted to UTC, the store's time zone.
pub fn parse_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in [REC_TIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl ReadingsQuery {
    /// `Err` carries the name of the offending parameter.
    pub fn to_message(&self) -> Result<GetReadings, &'static str> {
        let bound = |value: &Option<String>, name: &'static str| match value.as_deref() {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_time(s).map(Some).ok_or(name),
        };
        Ok(GetReadings {
            start: bound(&self.start_date, "startDate")?,
            end: bound(&self.end_date, "endDate")?,
            limit: effective_limit(self.limit.as_deref(), DEFAULT_RANGE_LIMIT),
        })
    }
}

/// A stored reading as served by the query API.
///
/// `recTime` is the time the store accepted the row, in the store's own
/// format (UTC). `timestamp` is the same instant in RFC 3339.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    pub id: i64,
    pub location: String,
    #[serde(rename = "recTime")]
    pub rec_time: String,
    pub timestamp: String,
    pub temp: f64,
    #[serde(rename = "rH")]
    pub rh: f64,
    pub pmass1: f64,
    pub pmass25: f64,
    pub pmass4: f64,
    pub pmass10: f64,
    pub pcount1: f64,
    pub pcount25: f64,
    pub pcount4: f64,
    pub pcount10: f64,
    #[serde(rename = "typPartSize")]
    pub typ_part_size: f64,
    #[serde(rename = "HCHO")]
    pub hcho: f64,
    #[serde(rename = "CO2")]
    pub co2: f64,
    #[serde(rename = "indoorTd")]
    pub indoor_td: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

pub fn tags_for(temp: f64, co2: f64) -> Vec<String> {
    let mut tags = Vec::new();
    if temp > HIGH_TEMPERATURE {
        tags.push("high-temperature".to_owned());
    } else if temp < LOW_TEMPERATURE {
        tags.push("low-temperature".to_owned());
    }
    if co2 > HIGH_CO2 {
        tags.push("high-co2".to_owned());
    }
    tags
}

impl From<DbReading> for SensorData {
    fn from(rd: DbReading) -> Self {
        SensorData {
            id: rd.id,
            location: rd.location,
            rec_time: rd.rec_time.format(REC_TIME_FORMAT).to_string(),
            timestamp: rd
                .rec_time
                .and_utc()
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            temp: rd.temp,
            rh: rd.rh,
            pmass1: rd.pmass1,
            pmass25: rd.pmass25,
            pmass4: rd.pmass4,
            pmass10: rd.pmass10,
            pcount1: rd.pcount1,
            pcount25: rd.pcount25,
            pcount4: rd.pcount4,
            pcount10: rd.pcount10,
            typ_part_size: rd.typ_part_size,
            hcho: rd.hcho,
            co2: rd.co2,
            indoor_td: rd.indoor_td,
            tags: tags_for(rd.temp, rd.co2),
        }
    }
}
