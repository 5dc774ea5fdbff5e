//! Artifact retrieval.

use jobkit_core::{
    ClientError,
    ClientResult,
};
use regex::Regex;
use tracing::debug;

use crate::client::JenkinsClient;
use crate::config::encode_job_path;
use crate::types::ArtifactRef;

/// A downloaded build artifact.
#[derive(Debug, Clone)]
pub struct FetchedArtifact {
    pub file_name: String,
    pub relative_path: String,
    pub data: Vec<u8>,
}

pub struct ArtifactService<'a> {
    client: &'a JenkinsClient,
}

impl<'a> ArtifactService<'a> {
    pub fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    /// Downloads the first artifact of a build whose file name matches
    /// `name_pattern` (a regex matched against the whole file name, not
    /// searched as a substring). `Ok(None)` when the build archived no
    /// matching artifact.
    pub async fn fetch(
        &self, job_name: &str, build_number: i64, name_pattern: &str,
    ) -> ClientResult<Option<FetchedArtifact>> {
        let pattern = full_match_regex(name_pattern)?;
        let build = self.client.get_build(job_name, build_number).await?;

        let build_url = match &build.url {
            Some(url) => url.clone(),
            None => format!(
                "{}/job/{}/{}",
                self.client.server_url(),
                encode_job_path(job_name),
                build_number
            ),
        };

        for artifact in &build.artifacts {
            if pattern.is_match(&artifact.file_name) {
                debug!(artifact = %artifact.file_name, "downloading matching artifact");
                let data = self
                    .client
                    .download_artifact(&build_url, &artifact.relative_path)
                    .await?;
                return Ok(Some(FetchedArtifact {
                    file_name: artifact.file_name.clone(),
                    relative_path: artifact.relative_path.clone(),
                    data,
                }));
            }
        }

        debug!(
            job = job_name,
            build = build_number,
            pattern = name_pattern,
            "no matching artifact"
        );
        Ok(None)
    }

    /// The build's artifact list, without downloading anything.
    pub async fn list(&self, job_name: &str, build_number: i64) -> ClientResult<Vec<ArtifactRef>> {
        let build = self.client.get_build(job_name, build_number).await?;
        Ok(build.artifacts)
    }
}

/// Anchors the pattern so it must match the whole file name.
fn full_match_regex(pattern: &str) -> ClientResult<Regex> {
    Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|e| ClientError::InvalidConfig(format!("Invalid artifact pattern: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_matches_whole_name() {
        let pattern = full_match_regex("app-.*\\.apk").unwrap();
        assert!(pattern.is_match("app-release.apk"));
        assert!(!pattern.is_match("app-release.apk.sha1"));
        assert!(!pattern.is_match("prefix-app-release.apk"));
    }

    #[test]
    fn test_literal_pattern() {
        let pattern = full_match_regex("output.zip").unwrap();
        assert!(pattern.is_match("output.zip"));
        // '.' is still a regex metacharacter
        assert!(pattern.is_match("outputazip"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(matches!(
            full_match_regex("("),
            Err(ClientError::InvalidConfig(_))
        ));
    }
}
