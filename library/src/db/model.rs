use crate::reading::SensorReading;
use crate::schema::iaq;
use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Insertable, Debug)]
#[diesel(table_name = iaq)]
pub struct NewReading<'a> {
    pub location: &'a str,
    pub temp: f64,
    pub rh: f64,
    pub pmass1: f64,
    pub pmass25: f64,
    pub pmass4: f64,
    pub pmass10: f64,
    pub pcount1: f64,
    pub pcount25: f64,
    pub pcount4: f64,
    pub pcount10: f64,
    pub typ_part_size: f64,
    pub hcho: f64,
    pub co2: f64,
    pub indoor_td: f64,
}

impl<'a> From<&'a SensorReading> for NewReading<'a> {
    fn from(rd: &'a SensorReading) -> Self {
        NewReading {
            location: &rd.location,
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
            // derived server side, never taken from the request
            indoor_td: rd.indoor_td(),
        }
    }
}

/// A stored row. `rec_time` is assigned by the store on insert (UTC).
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = iaq)]
pub struct DbReading {
    pub id: i64,
    pub location: String,
    pub rec_time: NaiveDateTime,
    pub temp: f64,
    pub rh: f64,
    pub pmass1: f64,
    pub pmass25: f64,
    pub pmass4: f64,
    pub pmass10: f64,
    pub pcount1: f64,
    pub pcount25: f64,
    pub pcount4: f64,
    pub pcount10: f64,
    pub typ_part_size: f64,
    pub hcho: f64,
    pub co2: f64,
    pub indoor_td: f64,
}

/// Bounds for a read against the `iaq` table.
#[derive(Clone, Debug, PartialEq)]
pub struct GetReadings {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub limit: i64,
}

impl GetReadings {
    pub fn latest(limit: i64) -> Self {
        GetReadings {
            start: None,
            end: None,
            limit,
        }
    }
}
