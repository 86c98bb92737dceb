//! Call history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    #[default]
    Inbound,
    Outbound,
    Web,
}

impl std::fmt::Display for CallDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallDirection::Inbound => write!(f, "inbound"),
            CallDirection::Outbound => write!(f, "outbound"),
            CallDirection::Web => write!(f, "web"),
        }
    }
}

/// One completed or in-progress call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallLog {
    pub id: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub from_number: Option<String>,
    #[serde(default)]
    pub to_number: Option<String>,
    #[serde(default)]
    pub direction: CallDirection,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub duration_secs: Option<u64>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub recording_url: Option<String>,
}

impl CallLog {
    /// Duration as `m:ss`, or `-` when unknown.
    pub fn duration_display(&self) -> String {
        match self.duration_secs {
            Some(secs) => format!("{}:{:02}", secs / 60, secs % 60),
            None => "-".to_string(),
        }
    }

    /// The party on the other end of the call.
    pub fn counterpart(&self) -> &str {
        let number = match self.direction {
            CallDirection::Outbound => self.to_number.as_deref(),
            _ => self.from_number.as_deref(),
        };
        number.unwrap_or("unknown")
    }
}

/// Query for one page of `GET /call_logs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallLogQuery {
    pub page: u32,
    pub page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duration_display() {
        let mut log: CallLog = serde_json::from_value(json!({ "id": "c1" })).unwrap();
        assert_eq!(log.duration_display(), "-");
        log.duration_secs = Some(125);
        assert_eq!(log.duration_display(), "2:05");
    }

    #[test]
    fn test_counterpart_depends_on_direction() {
        let log: CallLog = serde_json::from_value(json!({
            "id": "c2",
            "direction": "outbound",
            "from_number": "+15550001111",
            "to_number": "+15550002222"
        }))
        .unwrap();
        assert_eq!(log.counterpart(), "+15550002222");
    }

    #[test]
    fn test_query_omits_missing_agent() {
        let query = CallLogQuery {
            page: 2,
            page_size: 20,
            agent_id: None,
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value, json!({ "page": 2, "page_size": 20 }));
    }
}
