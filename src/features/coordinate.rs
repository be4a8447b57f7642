//! Normalization of GPS tag values into signed decimal degrees.
//!
//! Metadata writers disagree on how a coordinate is stored: some emit decimal
//! degrees, most emit a degrees/minutes/seconds list, and a few emit records
//! or other containers. [`RawGeoValue`] captures those shapes once, at the
//! extractor boundary, and [`normalize`] turns any of them into one `f64`.

use serde_json::Value;
use std::fmt;

/// One element of a multi-part coordinate as it was stored.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoComponent {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
    Other,
}

impl GeoComponent {
    /// Strictly numeric members only.
    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric-like coercion: numbers, text that reads as a number, booleans
    /// as 1 or 0, and null as 0.
    fn coerce(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Bool(b) => Some(f64::from(u8::from(*b))),
            Self::Null => Some(0.0),
            Self::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    Some(0.0)
                } else {
                    s.parse().ok()
                }
            }
            Self::Other => None,
        }
    }
}

impl From<&Value> for GeoComponent {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map_or(Self::Other, Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            Value::Bool(b) => Self::Bool(*b),
            Value::Null => Self::Null,
            _ => Self::Other,
        }
    }
}

/// A geo tag payload, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawGeoValue {
    /// Already in decimal degrees.
    Decimal(f64),
    /// Ordered degrees, minutes, seconds. Missing trailing parts count as zero.
    Triplet(Vec<GeoComponent>),
    /// A record. Members are read in enumeration order: array-index keys
    /// ascending, then the remaining keys in insertion order.
    Keyed(Vec<(String, GeoComponent)>),
    /// An enumerable container that is neither a list nor a record.
    Sequence(Vec<GeoComponent>),
    Unrecognized,
}

impl From<&Value> for RawGeoValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map_or(Self::Unrecognized, Self::Decimal),
            Value::Array(items) => Self::Triplet(items.iter().map(GeoComponent::from).collect()),
            Value::Object(map) => Self::Keyed(
                map.iter()
                    .map(|(key, v)| (key.clone(), GeoComponent::from(v)))
                    .collect(),
            ),
            _ => Self::Unrecognized,
        }
    }
}

/// Which side of the equator or prime meridian a magnitude lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Parses a reference letter such as `"N"` or `"w"`. Padding is ignored.
    pub fn parse(letter: &str) -> Option<Self> {
        match letter
            .trim_matches(|c: char| c.is_whitespace() || c == '\0')
            .to_ascii_uppercase()
            .as_str()
        {
            "N" => Some(Self::North),
            "S" => Some(Self::South),
            "E" => Some(Self::East),
            "W" => Some(Self::West),
            _ => None,
        }
    }

    pub const fn is_negative(self) -> bool {
        matches!(self, Self::South | Self::West)
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::North => "N",
            Self::South => "S",
            Self::East => "E",
            Self::West => "W",
        };
        f.write_str(letter)
    }
}

/// Converts a raw geo tag value into signed decimal degrees.
///
/// Returns `None` when the value is absent or its shape cannot be read as a
/// coordinate. The result is never range checked; callers decide what an
/// out-of-range value means. `South` and `West` negate the magnitude, any
/// other reference (or none) leaves it positive.
pub fn normalize(value: Option<&RawGeoValue>, hemisphere: Option<Hemisphere>) -> Option<f64> {
    let magnitude = match value? {
        RawGeoValue::Decimal(degrees) => Some(*degrees),
        RawGeoValue::Triplet(parts) => dms_from_components(parts),
        RawGeoValue::Keyed(members) => {
            let numeric: Vec<f64> = enumeration_order(members)
                .filter_map(|(_, c)| c.as_number())
                .collect();
            if numeric.len() >= 3 {
                Some(dms_to_decimal(numeric[0], numeric[1], numeric[2]))
            } else {
                array_like(members).and_then(|items| non_empty_sequence(&items))
            }
        }
        RawGeoValue::Sequence(items) => non_empty_sequence(items),
        RawGeoValue::Unrecognized => None,
    }?;

    if !magnitude.is_finite() {
        return None;
    }

    Some(if hemisphere.is_some_and(Hemisphere::is_negative) {
        -magnitude
    } else {
        magnitude
    })
}

fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

fn dms_from_components(parts: &[GeoComponent]) -> Option<f64> {
    let part = |i: usize| parts.get(i).map_or(Some(0.0), GeoComponent::coerce);
    Some(dms_to_decimal(part(0)?, part(1)?, part(2)?))
}

fn non_empty_sequence(items: &[GeoComponent]) -> Option<f64> {
    if items.is_empty() {
        None
    } else {
        dms_from_components(items)
    }
}

/// Parses a canonical array index: decimal, no leading zeros, below `u32::MAX`.
fn array_index(key: &str) -> Option<u32> {
    let index: u32 = key.parse().ok()?;
    (index < u32::MAX && index.to_string() == key).then_some(index)
}

/// Members with array-index keys first (ascending), then the rest as stored.
fn enumeration_order(
    members: &[(String, GeoComponent)],
) -> impl Iterator<Item = &(String, GeoComponent)> {
    let mut indexed: Vec<_> = members
        .iter()
        .filter_map(|member| array_index(&member.0).map(|index| (index, member)))
        .collect();
    indexed.sort_by_key(|(index, _)| *index);
    indexed
        .into_iter()
        .map(|(_, member)| member)
        .chain(members.iter().filter(|(key, _)| array_index(key).is_none()))
}

/// Reads a record through its `length` member as an indexed list.
///
/// The length is truncated toward zero; a missing or non-numeric length is
/// zero. Lengths past the largest array size are declined. Indices without a
/// member read as zero. Only the first three indices are materialized, which
/// is all a degree/minute/second composition reads.
fn array_like(members: &[(String, GeoComponent)]) -> Option<Vec<GeoComponent>> {
    let length = members
        .iter()
        .find(|(key, _)| key == "length")
        .and_then(|(_, c)| c.coerce())
        .filter(|n| !n.is_nan())
        .map_or(0.0, |n| n.trunc().max(0.0));
    if length > f64::from(u32::MAX) {
        return None;
    }

    let items = (0..(length as usize).min(3))
        .map(|index| {
            let key = index.to_string();
            members
                .iter()
                .find(|(k, _)| *k == key)
                .map_or(GeoComponent::Number(0.0), |(_, c)| c.clone())
        })
        .collect();
    Some(items)
}
