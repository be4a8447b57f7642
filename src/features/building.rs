use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// What the identification service had to say about a building.
///
/// Serializes as the parsed field set, or as `{"raw": "..."}` when the reply
/// could not be read as structured data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BuildingDescription {
    Details(BuildingDetails),
    Raw { raw: String },
}

/// The fields a reply is asked to carry. No value type is enforced: the
/// model may answer with text, numbers, lists or null for any of them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BuildingDetails {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub address: Option<Value>,
    #[serde(default, alias = "known_use", alias = "type")]
    pub building_type: Option<Value>,
    #[serde(default)]
    pub year_built: Option<Value>,
    #[serde(default)]
    pub architect: Option<Value>,
    #[serde(default, alias = "floors")]
    pub floor_count: Option<Value>,
    #[serde(default)]
    pub height: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub data_source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facts: Option<Value>,
    /// Keys the model added beyond the requested set.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BuildingDetails {
    /// Sorts an object's members into the known fields. Never fails: when
    /// the members cannot be sorted (a key given under two aliases, say)
    /// they are all kept in `extra`.
    pub fn from_object(object: Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(object.clone())).unwrap_or_else(|_| Self {
            extra: object,
            ..Self::default()
        })
    }

    /// The building name, when the model gave it as text.
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().and_then(Value::as_str)
    }
}

impl BuildingDescription {
    /// Interprets a free-text reply.
    ///
    /// Any JSON object is accepted as structured, whatever its members hold.
    /// A Markdown code fence around it is tolerated. Anything else is kept
    /// verbatim as [`BuildingDescription::Raw`].
    pub fn from_reply(reply: &str) -> Self {
        match serde_json::from_str::<Value>(strip_code_fence(reply.trim())) {
            Ok(Value::Object(object)) => Self::Details(BuildingDetails::from_object(object)),
            _ => Self::Raw {
                raw: reply.to_string(),
            },
        }
    }

    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Details(_))
    }
}

impl<'de> Deserialize<'de> for BuildingDescription {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Ok(match object.get("raw") {
            Some(Value::String(raw)) if object.len() == 1 => Self::Raw { raw: raw.clone() },
            _ => Self::Details(BuildingDetails::from_object(object)),
        })
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return text;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    inner
        .split_once('\n')
        .map_or(inner, |(_, body)| body)
        .trim()
}
