//! Low-level Jenkins REST plumbing.

use jobkit_core::{
    ClientError,
    ClientResult,
    RetryPolicy,
};
use reqwest::header::{
    HeaderMap,
    HeaderValue,
    AUTHORIZATION,
    CONTENT_TYPE,
};
use reqwest::{
    Response,
    StatusCode,
};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::{
    encode_job_path,
    JenkinsConfig,
};
use crate::types;

/// HTTP client for a single Jenkins server.
///
/// Wraps `reqwest` with preconfigured basic auth, request timeouts,
/// CSRF crumb handling and a retry policy for read operations. The
/// service layer (`JobService`, `BuildService`, ...) sits on top of
/// this.
pub struct JenkinsClient {
    http: reqwest::Client,
    server_url: String,
    csrf_protection: bool,
    crumb: RwLock<Option<types::Crumb>>,
    retry: RetryPolicy,
}

impl JenkinsClient {
    pub fn new(config: JenkinsConfig) -> ClientResult<Self> {
        let auth_value = format!("{}:{}", config.username, config.api_token);
        let auth_header = format!(
            "Basic {}",
            base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                auth_value.as_bytes()
            )
        );

        let mut headers = HeaderMap::new();
        let mut auth_header = HeaderValue::from_str(&auth_header)
            .map_err(|e| ClientError::InvalidConfig(format!("Invalid credentials: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClientError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            server_url: config.server_url,
            csrf_protection: config.csrf_protection,
            crumb: RwLock::new(None),
            retry: RetryPolicy::default(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Checks that the server is reachable and the credentials are
    /// accepted.
    pub async fn validate_connection(&self) -> ClientResult<()> {
        let url = format!("{}/api/json", self.server_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to connect: {e}")))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(ClientError::AuthenticationFailed(
                "Invalid Jenkins credentials".to_string(),
            ))
        } else {
            Err(ClientError::ApiError(format!("API error: {status}")))
        }
    }

    /// Fetches job details. `Ok(None)` when no job with that name
    /// exists.
    pub async fn get_job(&self, name: &str) -> ClientResult<Option<types::JobDetails>> {
        let name = name.to_string();
        self.retry
            .retry(|| async {
                let url = format!(
                    "{}/job/{}/api/json?tree=name,url,buildable,lastBuild[number,url]",
                    self.server_url,
                    encode_job_path(&name)
                );

                let response = self
                    .http
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| ClientError::NetworkError(format!("Failed to fetch job: {e}")))?;

                if response.status() == StatusCode::NOT_FOUND {
                    return Ok(None);
                }

                let response = self.checked(response, "fetch job").await?;
                let job = response.json().await.map_err(|e| {
                    ClientError::ApiError(format!("Failed to parse job {name}: {e}"))
                })?;
                Ok(Some(job))
            })
            .await
    }

    /// Creates a job from its `config.xml` document.
    pub async fn create_job(&self, name: &str, config_xml: &str) -> ClientResult<()> {
        let url = format!(
            "{}/createItem?name={}",
            self.server_url,
            urlencoding::encode(name)
        );
        debug!(job = name, "creating job");

        self.post_checked(&url, "create job", |request| {
            request
                .header(CONTENT_TYPE, "application/xml")
                .body(config_xml.to_string())
        })
        .await
        .map(|_| ())
    }

    /// Replaces a job's `config.xml`.
    pub async fn update_job(&self, name: &str, config_xml: &str) -> ClientResult<()> {
        let url = format!(
            "{}/job/{}/config.xml",
            self.server_url,
            encode_job_path(name)
        );
        debug!(job = name, "updating job config");

        self.post_checked(&url, "update job", |request| {
            request
                .header(CONTENT_TYPE, "application/xml")
                .body(config_xml.to_string())
        })
        .await
        .map(|_| ())
    }

    pub async fn delete_job(&self, name: &str) -> ClientResult<()> {
        let url = format!(
            "{}/job/{}/doDelete",
            self.server_url,
            encode_job_path(name)
        );
        debug!(job = name, "deleting job");

        self.post_checked(&url, "delete job", |request| request)
            .await
            .map(|_| ())
    }

    /// Stores a credential in the system credential store. `payload` is
    /// the JSON document the store endpoint expects, posted as the
    /// `json` form field.
    pub async fn create_credential(&self, payload: &serde_json::Value) -> ClientResult<()> {
        let url = format!(
            "{}/credentials/store/system/domain/_/createCredentials",
            self.server_url
        );

        self.post_checked(&url, "create credential", |request| {
            request.form(&[("json", payload.to_string())])
        })
        .await
        .map(|_| ())
    }

    pub async fn delete_credential(&self, id: &str) -> ClientResult<()> {
        let url = format!(
            "{}/credentials/store/system/domain/_/credential/{}/doDelete",
            self.server_url,
            urlencoding::encode(id)
        );
        debug!(credential = id, "deleting credential");

        self.post_checked(&url, "delete credential", |request| request)
            .await
            .map(|_| ())
    }

    /// Fetches build details, including the artifact list.
    pub async fn get_build(
        &self, job_path: &str, build_number: i64,
    ) -> ClientResult<types::BuildDetails> {
        let job_path = job_path.to_string();
        self.retry
            .retry(|| async {
                let url = format!(
                    "{}/job/{}/{}/api/json?tree=number,url,result,building,timestamp,duration,artifacts[fileName,relativePath]",
                    self.server_url,
                    encode_job_path(&job_path),
                    build_number
                );

                let response = self
                    .http
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| ClientError::NetworkError(format!("Failed to fetch build: {e}")))?;

                if response.status() == StatusCode::NOT_FOUND {
                    return Err(ClientError::BuildNotFound(format!(
                        "{job_path} #{build_number}"
                    )));
                }

                let response = self.checked(response, "fetch build").await?;
                response.json().await.map_err(|e| {
                    ClientError::ApiError(format!(
                        "Failed to parse build {job_path} #{build_number}: {e}"
                    ))
                })
            })
            .await
    }

    /// Downloads one archived artifact of a build.
    pub async fn download_artifact(
        &self, build_url: &str, relative_path: &str,
    ) -> ClientResult<Vec<u8>> {
        let base = build_url.trim_end_matches('/');
        let url = format!("{base}/artifact/{relative_path}");
        debug!(url = %url, "downloading artifact");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to download artifact: {e}")))?;

        let response = self.checked(response, "download artifact").await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to read artifact: {e}")))?;
        Ok(bytes.to_vec())
    }

    /// One poll of the progressive console log, starting at byte offset
    /// `start`.
    pub async fn progressive_log(
        &self, job_path: &str, build_number: i64, start: u64,
    ) -> ClientResult<types::LogChunk> {
        let url = format!(
            "{}/job/{}/{}/logText/progressiveText?start={}",
            self.server_url,
            encode_job_path(job_path),
            build_number,
            start
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to fetch console log: {e}")))?;

        let response = self.checked(response, "fetch console log").await?;

        let more_data = response
            .headers()
            .get("X-More-Data")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let next_start = response
            .headers()
            .get("X-Text-Size")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(start);

        let text = response
            .text()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to read console log: {e}")))?;

        Ok(types::LogChunk {
            text,
            next_start,
            more_data,
        })
    }

    /// Triggers a build and returns its queue reference.
    pub async fn trigger_build(
        &self, job_path: &str, params: &[(String, String)],
    ) -> ClientResult<types::QueueRef> {
        let encoded_path = encode_job_path(job_path);
        let url = if params.is_empty() {
            format!("{}/job/{}/build", self.server_url, encoded_path)
        } else {
            format!(
                "{}/job/{}/buildWithParameters",
                self.server_url, encoded_path
            )
        };
        debug!(job = job_path, params = params.len(), "triggering build");

        let response = self
            .post_checked(&url, "trigger build", |request| {
                if params.is_empty() {
                    request
                } else {
                    request.form(params)
                }
            })
            .await?;
        response
            .headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .map(types::QueueRef::from_location)
            .ok_or_else(|| {
                ClientError::ApiError("Trigger accepted but no queue location returned".to_string())
            })
    }

    /// Sends a POST request, attaching the CSRF crumb when the server
    /// requires one and checking the response status.
    ///
    /// A 403 on a request that carried a crumb usually means the cached
    /// crumb went stale with its session; the cache is cleared and the
    /// request retried once with a fresh crumb. A second 403 surfaces
    /// as an error.
    async fn post_checked<F>(&self, url: &str, action: &str, customize: F) -> ClientResult<Response>
    where
        F: Fn(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    {
        let mut refreshed = false;
        loop {
            let crumb = self.crumb_header().await?;
            let crumbed = crumb.is_some();
            let mut request = self.http.post(url);
            if let Some((field, value)) = crumb {
                request = request.header(field.as_str(), value);
            }

            let response = customize(request)
                .send()
                .await
                .map_err(|e| ClientError::NetworkError(format!("Failed to {action}: {e}")))?;

            if crumb_retry_needed(response.status(), crumbed, refreshed) {
                debug!("refreshing stale crumb");
                *self.crumb.write().await = None;
                refreshed = true;
                continue;
            }

            return self.checked(response, action).await;
        }
    }

    /// Returns the crumb header to attach to mutating requests,
    /// fetching it from the crumb issuer on first use.
    async fn crumb_header(&self) -> ClientResult<Option<(String, String)>> {
        if !self.csrf_protection {
            return Ok(None);
        }

        {
            let cached = self.crumb.read().await;
            if let Some(crumb) = cached.as_ref() {
                return Ok(Some((crumb.crumb_request_field.clone(), crumb.crumb.clone())));
            }
        }

        let url = format!("{}/crumbIssuer/api/json", self.server_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(format!("Failed to fetch crumb: {e}")))?;

        // A 404 here means CSRF protection is disabled server-side.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = self.checked(response, "fetch crumb").await?;
        let crumb: types::Crumb = response
            .json()
            .await
            .map_err(|e| ClientError::ApiError(format!("Failed to parse crumb: {e}")))?;

        let header = (crumb.crumb_request_field.clone(), crumb.crumb.clone());
        *self.crumb.write().await = Some(crumb);
        Ok(Some(header))
    }

    /// Maps non-success statuses to errors, keeping a short body
    /// preview for diagnostics. Redirects count as success: Jenkins
    /// answers several mutating endpoints with a 302.
    async fn checked(&self, response: Response, action: &str) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::AuthenticationFailed(format!(
                "Failed to {action}: HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let preview = if body.contains("<!DOCTYPE html>") || body.contains("<html") {
            "Jenkins returned an HTML error page".to_string()
        } else if body.chars().count() > 300 {
            format!("{}...", body.chars().take(300).collect::<String>())
        } else {
            body
        };

        Err(ClientError::ApiError(format!(
            "Failed to {action}: HTTP {status}: {preview}"
        )))
    }
}

/// A mutating request is retried with a fresh crumb exactly once, and
/// only when the rejected request actually carried one.
fn crumb_retry_needed(status: StatusCode, crumbed: bool, already_refreshed: bool) -> bool {
    crumbed && !already_refreshed && status == StatusCode::FORBIDDEN
}
