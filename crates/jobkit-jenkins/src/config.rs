//! Connection settings and job-path helpers.

use std::time::Duration;

/// Connection settings for a Jenkins server.
#[derive(Debug, Clone)]
pub struct JenkinsConfig {
    pub(crate) server_url: String,
    pub(crate) username: String,
    pub(crate) api_token: String,
    pub(crate) csrf_protection: bool,
    pub(crate) timeout: Duration,
    pub(crate) connect_timeout: Duration,
}

impl JenkinsConfig {
    /// `server_url` is the root of the Jenkins instance, e.g.
    /// `https://jenkins.example.com`. `api_token` is the user's API
    /// token (or password, on servers that still allow it).
    pub fn new(
        server_url: impl Into<String>, username: impl Into<String>, api_token: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            api_token: api_token.into(),
            csrf_protection: false,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Enable CSRF crumb handling. Required when the server has
    /// "Prevent Cross Site Request Forgery exploits" turned on.
    pub fn with_csrf_protection(mut self, enabled: bool) -> Self {
        self.csrf_protection = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

/// Encodes a possibly folder-qualified job name into URL path segments.
///
/// Jenkins nests folders as repeated `/job/` segments, so `a/b` becomes
/// `a/job/b`. Each segment is percent-encoded on its own.
pub(crate) fn encode_job_path(name: &str) -> String {
    name.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/job/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_trailing_slash() {
        let config = JenkinsConfig::new("https://jenkins.example.com/", "admin", "token");
        assert_eq!(config.server_url(), "https://jenkins.example.com");
    }

    #[test]
    fn test_encode_job_path() {
        assert_eq!(encode_job_path("simple"), "simple");
        assert_eq!(encode_job_path("folder/job"), "folder/job/job");
        assert_eq!(encode_job_path("my app"), "my%20app");
    }
}
