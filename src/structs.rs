use crate::error::{FailureKind, ScanError, ScanStage};
use crate::features::building::BuildingDescription;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScanSuccess {
    pub latitude: f64,
    pub longitude: f64,
    pub building: BuildingDescription,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScanFailure {
    pub stage: ScanStage,
    pub kind: FailureKind,
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<ScanError> for ScanFailure {
    fn from(error: ScanError) -> Self {
        Self {
            stage: error.stage(),
            kind: error.kind(),
            status: error.status(),
            message: error.to_string(),
            details: error.details(),
        }
    }
}

/// Result of one scan. Exactly one is produced per request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanOutcome {
    Success(ScanSuccess),
    Failure(ScanFailure),
}

impl ScanOutcome {
    pub const fn status(&self) -> u16 {
        match self {
            Self::Success(_) => 200,
            Self::Failure(failure) => failure.status,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<Result<ScanSuccess, ScanError>> for ScanOutcome {
    fn from(result: Result<ScanSuccess, ScanError>) -> Self {
        match result {
            Ok(success) => Self::Success(success),
            Err(error) => Self::Failure(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_round_trips_through_json() {
        let outcomes = [
            ScanOutcome::Success(ScanSuccess {
                latitude: 40.5,
                longitude: -73.25,
                building: BuildingDescription::Raw {
                    raw: "Unknown building".to_string(),
                },
            }),
            ScanOutcome::Success(ScanSuccess {
                latitude: 48.858_4,
                longitude: 2.294_5,
                building: BuildingDescription::from_reply(r#"{"name": "Eiffel Tower"}"#),
            }),
            ScanOutcome::from(Err(ScanError::UploadAbsent)),
        ];

        for outcome in outcomes {
            let value = serde_json::to_value(&outcome).unwrap();
            let parsed: ScanOutcome = serde_json::from_value(value).unwrap();
            assert_eq!(parsed, outcome);
        }
    }

    #[test]
    fn test_failure_serializes_flat_with_outcome_tag() {
        let value = serde_json::to_value(ScanOutcome::from(Err(ScanError::UploadAbsent))).unwrap();

        assert_eq!(value["outcome"], json!("failure"));
        assert_eq!(value["status"], json!(400));
        assert_eq!(value["stage"], json!("received"));
        assert!(value.get("details").is_none());
    }
}
