//! Transport-facing stack query.
//!
//! A [`StackQuery`] is built fresh from the selection for every retrieval
//! attempt and discarded afterwards. Frame rate is dropped entirely.

use serde::{Deserialize, Serialize};

use crate::selection::{Phase, SelectionCriteria};
use crate::types::{DeploymentId, Timestamp};

/// Capture window bounds. Absent bounds are omitted from the wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Timestamp>,
}

/// Query sent to the retrieval collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackQuery {
    pub deployment_id: Option<DeploymentId>,
    pub period: Period,
    /// Seconds between sampled frames.
    pub interval: u32,
    pub phase: Option<Phase>,
}

impl From<&SelectionCriteria> for StackQuery {
    fn from(criteria: &SelectionCriteria) -> Self {
        Self {
            deployment_id: criteria.deployment,
            period: Period {
                start: criteria.period_start,
                end: criteria.period_end,
            },
            interval: criteria.interval,
            phase: criteria.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionPatch;
    use chrono::TimeZone;

    fn selection() -> SelectionCriteria {
        let mut criteria = SelectionCriteria::default();
        criteria.apply(
            SelectionPatch::new()
                .with_deployment(7)
                .with_period(
                    chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                    chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
                )
                .with_interval(5)
                .with_phase(Phase::Day)
                .with_frame_rate(12.0),
        );
        criteria
    }

    #[test]
    fn maps_fields_directly() {
        let query = StackQuery::from(&selection());
        assert_eq!(query.deployment_id, Some(7));
        assert_eq!(query.interval, 5);
        assert_eq!(query.phase, Some(Phase::Day));
        assert!(query.period.start.is_some());
        assert!(query.period.end.is_some());
    }

    #[test]
    fn serializes_to_backend_shape() {
        let query = StackQuery::from(&selection());
        let json = serde_json::to_value(&query).expect("serialization should succeed");

        assert_eq!(
            json,
            serde_json::json!({
                "deployment_id": 7,
                "period": {
                    "start": "2024-01-01T00:00:00Z",
                    "end": "2024-01-02T00:00:00Z",
                },
                "interval": 5,
                "phase": "day",
            })
        );
    }

    #[test]
    fn frame_rate_is_not_serialized() {
        let json = serde_json::to_string(&StackQuery::from(&selection())).unwrap();
        assert!(!json.contains("frame_rate"));
    }

    #[test]
    fn absent_fields_follow_wire_conventions() {
        let query = StackQuery::from(&SelectionCriteria::default());
        let json = serde_json::to_value(&query).unwrap();

        assert!(json["deployment_id"].is_null());
        assert!(json["phase"].is_null());
        assert_eq!(json["period"], serde_json::json!({}));
        assert_eq!(json["interval"], 1);
    }
}
