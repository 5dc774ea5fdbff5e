//! API response types for the Jenkins REST endpoints we consume.

use chrono::{
    DateTime,
    Utc,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct JobDetails {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub buildable: bool,
    #[serde(rename = "lastBuild")]
    #[serde(default)]
    pub last_build: Option<BuildRef>,
}

#[derive(Debug, Deserialize)]
pub struct BuildRef {
    pub number: i64,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BuildDetails {
    pub number: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub building: bool,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub artifacts: Vec<ArtifactRef>,
}

impl BuildDetails {
    /// Build start time, from the millisecond epoch timestamp Jenkins
    /// reports.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Build end time. `None` while the build is still running.
    pub fn concluded_at(&self) -> Option<DateTime<Utc>> {
        if self.building || self.duration <= 0 {
            return None;
        }
        DateTime::from_timestamp_millis(self.timestamp + self.duration)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactRef {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "relativePath")]
    pub relative_path: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Crumb {
    pub crumb: String,
    #[serde(rename = "crumbRequestField")]
    pub crumb_request_field: String,
}

/// Reference to a queued build, parsed from the `Location` header
/// returned by a trigger request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRef {
    pub url: String,
    pub item_id: Option<u64>,
}

impl QueueRef {
    pub(crate) fn from_location(location: &str) -> Self {
        let item_id = location
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse().ok());
        Self {
            url: location.to_string(),
            item_id,
        }
    }
}

/// One poll of the progressive console log.
#[derive(Debug, Clone)]
pub struct LogChunk {
    pub text: String,
    /// Offset to pass to the next poll (`X-Text-Size`).
    pub next_start: u64,
    /// Whether the server expects more output (`X-More-Data`).
    pub more_data: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_ref_parses_item_id() {
        let queue = QueueRef::from_location("https://jenkins.example.com/queue/item/123/");
        assert_eq!(queue.item_id, Some(123));

        let queue = QueueRef::from_location("https://jenkins.example.com/queue/item/abc/");
        assert_eq!(queue.item_id, None);
    }

    #[test]
    fn test_build_timestamps() {
        let build: BuildDetails = serde_json::from_str(
            r#"{"number": 7, "timestamp": 1700000000000, "duration": 60000, "building": false}"#,
        )
        .unwrap();
        let started = build.started_at().unwrap();
        let concluded = build.concluded_at().unwrap();
        assert_eq!((concluded - started).num_seconds(), 60);
    }

    #[test]
    fn test_running_build_has_no_conclusion() {
        let build: BuildDetails = serde_json::from_str(
            r#"{"number": 7, "timestamp": 1700000000000, "duration": 0, "building": true}"#,
        )
        .unwrap();
        assert!(build.concluded_at().is_none());
    }
}
