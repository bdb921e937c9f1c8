//! Parse-and-validate boundary for readings posted by the sensor units.
//!
//! The device sends every value as a form field. [`ReadingForm`] accepts the
//! fields exactly as they arrive and [`SensorReading`] is only obtainable
//! through `TryFrom`, so nothing unchecked ever reaches the store.
use crate::error::ReadingError;
use serde::Deserialize;

pub const RH_MIN: f64 = 0.0;
pub const RH_MAX: f64 = 100.0;

/// Raw form body as posted by the device.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReadingForm {
    pub location: Option<String>,
    pub temp: Option<String>,
    #[serde(rename = "rH")]
    pub rh: Option<String>,
    pub pmass1: Option<String>,
    pub pmass25: Option<String>,
    pub pmass4: Option<String>,
    pub pmass10: Option<String>,
    pub pcount1: Option<String>,
    pub pcount25: Option<String>,
    pub pcount4: Option<String>,
    pub pcount10: Option<String>,
    #[serde(rename = "typPartSize")]
    pub typ_part_size: Option<String>,
    #[serde(rename = "HCHO")]
    pub hcho: Option<String>,
    #[serde(rename = "CO2")]
    pub co2: Option<String>,
}

/// A validated reading from one sensor unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub location: String,
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
}

impl SensorReading {
    /// Approximate indoor dew point: `temp - (100 - rH) / 5`.
    pub fn indoor_td(&self) -> f64 {
        indoor_td(self.temp, self.rh)
    }
}

pub fn indoor_td(temp: f64, rh: f64) -> f64 {
    temp - ((100.0 - rh) / 5.0)
}

fn number(value: Option<String>, field: &'static str) -> Result<f64, ReadingError> {
    let raw = value.ok_or(ReadingError::Missing(field))?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ReadingError::NotNumeric(field)),
    }
}

impl TryFrom<ReadingForm> for SensorReading {
    type Error = ReadingError;

    fn try_from(form: ReadingForm) -> Result<Self, Self::Error> {
        let location = form.location.ok_or(ReadingError::Missing("location"))?;
        if location.trim().is_empty() {
            return Err(ReadingError::Empty("location"));
        }

        let rh = number(form.rh, "rH")?;
        if !(RH_MIN..=RH_MAX).contains(&rh) {
            return Err(ReadingError::OutOfRange {
                field: "rH",
                min: RH_MIN,
                max: RH_MAX,
            });
        }

        Ok(SensorReading {
            location,
            temp: number(form.temp, "temp")?,
            rh,
            pmass1: number(form.pmass1, "pmass1")?,
            pmass25: number(form.pmass25, "pmass25")?,
            pmass4: number(form.pmass4, "pmass4")?,
            pmass10: number(form.pmass10, "pmass10")?,
            pcount1: number(form.pcount1, "pcount1")?,
            pcount25: number(form.pcount25, "pcount25")?,
            pcount4: number(form.pcount4, "pcount4")?,
            pcount10: number(form.pcount10, "pcount10")?,
            typ_part_size: number(form.typ_part_size, "typPartSize")?,
            hcho: number(form.hcho, "HCHO")?,
            co2: number(form.co2, "CO2")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ReadingForm {
        let s = |v: &str| Some(v.to_owned());
        ReadingForm {
            location: s("3"),
            temp: s("22.5"),
            rh: s("40"),
            pmass1: s("1.2"),
            pmass25: s("2.4"),
            pmass4: s("3.1"),
            pmass10: s("3.3"),
            pcount1: s("10.5"),
            pcount25: s("11"),
            pcount4: s("11.2"),
            pcount10: s("11.3"),
            typ_part_size: s("0.61"),
            hcho: s("12"),
            co2: s("612"),
        }
    }

    #[test]
    fn parses_complete_form() {
        let rd = SensorReading::try_from(form()).unwrap();
        assert_eq!(rd.location, "3");
        assert_eq!(rd.rh, 40.0);
        assert_eq!(rd.typ_part_size, 0.61);
        assert_eq!(rd.co2, 612.0);
    }

    #[test]
    fn indoor_td_follows_formula() {
        let rd = SensorReading::try_from(form()).unwrap();
        assert!((rd.indoor_td() - 10.5).abs() < 1e-9);
        assert!((indoor_td(21.0, 100.0) - 21.0).abs() < 1e-9);
        assert!((indoor_td(21.0, 0.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn missing_field_is_named() {
        let mut f = form();
        f.hcho = None;
        assert_eq!(
            SensorReading::try_from(f),
            Err(ReadingError::Missing("HCHO"))
        );
    }

    #[test]
    fn rejects_garbage_and_non_finite_numbers() {
        for bad in ["", "abc", "12,5", "NaN", "inf", "-infinity"] {
            let mut f = form();
            f.temp = Some(bad.to_owned());
            assert_eq!(
                SensorReading::try_from(f),
                Err(ReadingError::NotNumeric("temp")),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let mut f = form();
        f.temp = Some(" 21.5\n".to_owned());
        assert_eq!(SensorReading::try_from(f).unwrap().temp, 21.5);
    }

    #[test]
    fn relative_humidity_bounds() {
        for (rh, ok) in [("0", true), ("100", true), ("-0.1", false), ("100.01", false)] {
            let mut f = form();
            f.rh = Some(rh.to_owned());
            let res = SensorReading::try_from(f);
            assert_eq!(res.is_ok(), ok, "rH={}", rh);
            if !ok {
                assert!(matches!(res, Err(ReadingError::OutOfRange { field: "rH", .. })));
            }
        }
    }

    #[test]
    fn blank_location_is_rejected() {
        let mut f = form();
        f.location = Some("  ".to_owned());
        assert_eq!(
            SensorReading::try_from(f),
            Err(ReadingError::Empty("location"))
        );
    }

    #[test]
    fn location_is_kept_verbatim() {
        let mut f = form();
        f.location = Some("O'Brien'; DROP TABLE IAQ;--".to_owned());
        let rd = SensorReading::try_from(f).unwrap();
        assert_eq!(rd.location, "O'Brien'; DROP TABLE IAQ;--");
    }
}
