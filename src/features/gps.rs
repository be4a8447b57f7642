use crate::features::coordinate::{Hemisphere, RawGeoValue, normalize};
use crate::features::error::GpsError;
use crate::features::metadata::TagMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const LATITUDE_TAG: &str = "GPSLatitude";
pub const LATITUDE_REF_TAG: &str = "GPSLatitudeRef";
pub const LONGITUDE_TAG: &str = "GPSLongitude";
pub const LONGITUDE_REF_TAG: &str = "GPSLongitudeRef";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    const fn tags(self) -> (&'static str, &'static str) {
        match self {
            Self::Latitude => (LATITUDE_TAG, LATITUDE_REF_TAG),
            Self::Longitude => (LONGITUDE_TAG, LONGITUDE_REF_TAG),
        }
    }

    const fn limit(self) -> f64 {
        match self {
            Self::Latitude => 90.0,
            Self::Longitude => 180.0,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latitude => f.write_str("Latitude"),
            Self::Longitude => f.write_str("Longitude"),
        }
    }
}

/// A position in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Reads and normalizes both GPS axes from a tag map.
///
/// Latitude and longitude are resolved independently. Either tag missing,
/// either value in an unreadable encoding, or either value outside the valid
/// range of its axis rejects the whole position.
pub fn get_coordinates(tags: &TagMap) -> Result<Coordinates, GpsError> {
    Ok(Coordinates {
        latitude: read_axis(tags, Axis::Latitude)?,
        longitude: read_axis(tags, Axis::Longitude)?,
    })
}

fn read_axis(tags: &TagMap, axis: Axis) -> Result<f64, GpsError> {
    let (value_tag, ref_tag) = axis.tags();
    let raw = tags
        .get(value_tag)
        .filter(|v| !v.is_null())
        .map(RawGeoValue::from)
        .ok_or(GpsError::MissingTag(value_tag))?;
    let hemisphere = tags
        .get(ref_tag)
        .and_then(Value::as_str)
        .and_then(Hemisphere::parse);

    let value = normalize(Some(&raw), hemisphere).ok_or(GpsError::Unrepresentable(axis))?;
    if value.abs() > axis.limit() {
        return Err(GpsError::OutOfRange { axis, value });
    }
    Ok(value)
}
