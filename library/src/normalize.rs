//! Read-side conversion of API records into strictly typed readings.
//!
//! Upstream stores do not enforce column types uniformly, so a measurement can
//! arrive either as a JSON number or as a string holding one. [`RawSensorData`]
//! accepts both; [`NormalizedSensorData`] only holds finite `f64`s.
use crate::error::NormalizeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A measurement as found on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    pub fn to_f64(&self, field: &'static str) -> Result<f64, NormalizeError> {
        let v = match self {
            RawNumber::Number(v) => *v,
            RawNumber::Text(s) => {
                s.trim()
                    .parse::<f64>()
                    .map_err(|_| NormalizeError::NotNumeric {
                        field,
                        value: s.clone(),
                    })?
            }
        };
        if v.is_finite() {
            Ok(v)
        } else {
            Err(NormalizeError::NotFinite(field))
        }
    }
}

/// An API record as received, before any measurement is converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSensorData {
    pub id: i64,
    pub location: String,
    #[serde(rename = "recTime")]
    pub rec_time: String,
    pub timestamp: String,
    pub temp: RawNumber,
    #[serde(rename = "rH")]
    pub rh: RawNumber,
    #[serde(rename = "VOC", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub voc: Option<Option<RawNumber>>,
    #[serde(rename = "NOx", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub nox: Option<Option<RawNumber>>,
    pub pmass1: RawNumber,
    pub pmass25: RawNumber,
    pub pmass4: RawNumber,
    pub pmass10: RawNumber,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub pcount1: Option<Option<RawNumber>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub pcount25: Option<Option<RawNumber>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub pcount4: Option<Option<RawNumber>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub pcount10: Option<Option<RawNumber>>,
    #[serde(rename = "typPartSize", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub typ_part_size: Option<Option<RawNumber>>,
    #[serde(rename = "HCHO")]
    pub hcho: RawNumber,
    #[serde(rename = "CO2")]
    pub co2: RawNumber,
    #[serde(rename = "indoorTd")]
    pub indoor_td: RawNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Fields this crate does not know about, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An API record whose measurements are all finite `f64`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSensorData {
    pub id: i64,
    pub location: String,
    #[serde(rename = "recTime")]
    pub rec_time: String,
    pub timestamp: String,
    pub temp: f64,
    #[serde(rename = "rH")]
    pub rh: f64,
    #[serde(rename = "VOC", default, skip_serializing_if = "Option::is_none")]
    pub voc: Option<f64>,
    #[serde(rename = "NOx", default, skip_serializing_if = "Option::is_none")]
    pub nox: Option<f64>,
    pub pmass1: f64,
    pub pmass25: f64,
    pub pmass4: f64,
    pub pmass10: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcount1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcount25: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcount4: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcount10: Option<f64>,
    #[serde(rename = "typPartSize", default, skip_serializing_if = "Option::is_none")]
    pub typ_part_size: Option<f64>,
    #[serde(rename = "HCHO")]
    pub hcho: f64,
    #[serde(rename = "CO2")]
    pub co2: f64,
    #[serde(rename = "indoorTd")]
    pub indoor_td: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Marks a key that is present, so an explicit `null` is told apart from an absent key.
fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<RawNumber>>, D::Error> {
    Option::<RawNumber>::deserialize(d).map(Some)
}

fn optional(
    value: Option<Option<RawNumber>>,
    field: &'static str,
) -> Result<Option<f64>, NormalizeError> {
    match value {
        None => Ok(None),
        Some(None) => Err(NormalizeError::Null(field)),
        Some(Some(v)) => v.to_f64(field).map(Some),
    }
}

impl TryFrom<RawSensorData> for NormalizedSensorData {
    type Error = NormalizeError;

    fn try_from(raw: RawSensorData) -> Result<Self, Self::Error> {
        Ok(NormalizedSensorData {
            id: raw.id,
            location: raw.location,
            rec_time: raw.rec_time,
            timestamp: raw.timestamp,
            temp: raw.temp.to_f64("temp")?,
            rh: raw.rh.to_f64("rH")?,
            voc: optional(raw.voc, "VOC")?,
            nox: optional(raw.nox, "NOx")?,
            pmass1: raw.pmass1.to_f64("pmass1")?,
            pmass25: raw.pmass25.to_f64("pmass25")?,
            pmass4: raw.pmass4.to_f64("pmass4")?,
            pmass10: raw.pmass10.to_f64("pmass10")?,
            pcount1: optional(raw.pcount1, "pcount1")?,
            pcount25: optional(raw.pcount25, "pcount25")?,
            pcount4: optional(raw.pcount4, "pcount4")?,
            pcount10: optional(raw.pcount10, "pcount10")?,
            typ_part_size: optional(raw.typ_part_size, "typPartSize")?,
            hcho: raw.hcho.to_f64("HCHO")?,
            co2: raw.co2.to_f64("CO2")?,
            indoor_td: raw.indoor_td.to_f64("indoorTd")?,
            tags: raw.tags,
            extra: raw.extra,
        })
    }
}

pub fn normalize(raw: RawSensorData) -> Result<NormalizedSensorData, NormalizeError> {
    NormalizedSensorData::try_from(raw)
}

/// Normalizes a whole batch, failing on the first record that does not convert.
pub fn normalize_all(
    raw: impl IntoIterator<Item = RawSensorData>,
) -> Result<Vec<NormalizedSensorData>, NormalizeError> {
    raw.into_iter().map(normalize).collect()
}
