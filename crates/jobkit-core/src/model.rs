//! Domain model shared by the provider crates.

use std::time::Duration;

use async_trait::async_trait;
use serde::{
    Deserialize,
    Serialize,
};

/// Jenkins' LogRotator treats any unset retention knob as `-1`.
const UNSET: i32 = -1;

/// Retention policy for old builds and their artifacts.
///
/// Maps onto the `hudson.tasks.LogRotator` section of a job's
/// `config.xml`. Values below `1` are normalized to `-1`, which is what
/// Jenkins stores when a field is left empty in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDiscarder {
    store_builds_days: i32,
    store_builds_total: i32,
    store_artifacts_days: i32,
    store_artifacts_total: i32,
}

impl Default for BuildDiscarder {
    fn default() -> Self {
        Self {
            store_builds_days: UNSET,
            store_builds_total: UNSET,
            store_artifacts_days: UNSET,
            store_artifacts_total: UNSET,
        }
    }
}

impl BuildDiscarder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep build records for at most this many days.
    pub fn with_store_builds_days(mut self, days: i32) -> Self {
        self.store_builds_days = normalize(days);
        self
    }

    /// Keep at most this many build records.
    pub fn with_store_builds_total(mut self, total: i32) -> Self {
        self.store_builds_total = normalize(total);
        self
    }

    /// Keep build artifacts for at most this many days.
    pub fn with_store_artifacts_days(mut self, days: i32) -> Self {
        self.store_artifacts_days = normalize(days);
        self
    }

    /// Keep artifacts for at most this many builds.
    pub fn with_store_artifacts_total(mut self, total: i32) -> Self {
        self.store_artifacts_total = normalize(total);
        self
    }

    pub fn store_builds_days(&self) -> i32 {
        self.store_builds_days
    }

    pub fn store_builds_total(&self) -> i32 {
        self.store_builds_total
    }

    pub fn store_artifacts_days(&self) -> i32 {
        self.store_artifacts_days
    }

    pub fn store_artifacts_total(&self) -> i32 {
        self.store_artifacts_total
    }
}

fn normalize(value: i32) -> i32 {
    if value < 1 {
        UNSET
    } else {
        value
    }
}

/// A parameter definition on a parameterized job.
///
/// Used when defining a job, not when passing values to a triggered
/// build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildParameter {
    name: String,
    description: String,
    default_value: String,
}

impl BuildParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            default_value: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn default_value(&self) -> &str {
        &self.default_value
    }
}

/// Knobs for progressive console-log streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogStreamingOptions {
    interval: Duration,
    timeout: Duration,
}

impl Default for LogStreamingOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(60 * 60),
        }
    }
}

impl LogStreamingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// How long to wait between two console-log polls.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Give up streaming after this much time, even if the build is
    /// still producing output.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Receiver of streamed console-log output.
#[async_trait]
pub trait LogStreamListener: Send + Sync {
    /// Called once per non-empty chunk of console text, in order.
    async fn on_data(&self, chunk: &str);

    /// Called once, after the last chunk has been delivered.
    async fn on_finished(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discarder_defaults_to_unset() {
        let discarder = BuildDiscarder::default();
        assert_eq!(discarder.store_builds_days(), -1);
        assert_eq!(discarder.store_builds_total(), -1);
        assert_eq!(discarder.store_artifacts_days(), -1);
        assert_eq!(discarder.store_artifacts_total(), -1);
    }

    #[test]
    fn test_discarder_normalizes_non_positive_values() {
        let discarder = BuildDiscarder::new()
            .with_store_artifacts_days(-4)
            .with_store_artifacts_total(5)
            .with_store_builds_days(1)
            .with_store_builds_total(0);

        assert_eq!(discarder.store_artifacts_days(), -1);
        assert_eq!(discarder.store_artifacts_total(), 5);
        assert_eq!(discarder.store_builds_days(), 1);
        assert_eq!(discarder.store_builds_total(), -1);
    }

    #[test]
    fn test_build_parameter_defaults_to_empty_strings() {
        let param = BuildParameter::new("RELEASE");
        assert_eq!(param.name(), "RELEASE");
        assert_eq!(param.description(), "");
        assert_eq!(param.default_value(), "");

        let param = param
            .with_description("Release build")
            .with_default_value("false");
        assert_eq!(param.description(), "Release build");
        assert_eq!(param.default_value(), "false");
    }

    #[test]
    fn test_streaming_options_defaults() {
        let options = LogStreamingOptions::default();
        assert_eq!(options.interval(), Duration::from_secs(5));
        assert_eq!(options.timeout(), Duration::from_secs(3600));
    }
}
