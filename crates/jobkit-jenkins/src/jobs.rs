//! Job lifecycle: create, update, delete.

use jobkit_core::{
    BuildDiscarder,
    BuildParameter,
    ClientError,
    ClientResult,
};
use tracing::warn;

use crate::client::JenkinsClient;
use crate::credentials::Credential;
use crate::template;
use crate::types::JobDetails;

/// Everything needed to define (or redefine) a job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    name: String,
    git_repo: String,
    git_branch: String,
    discarder: Option<BuildDiscarder>,
    credential: Option<Credential>,
    parameters: Vec<BuildParameter>,
}

impl JobRequest {
    /// `git_repo` is the full repository URL, e.g.
    /// `git@github.com:example/helloworld.git`; `git_branch` is the
    /// branch checked out at build time.
    pub fn new(
        name: impl Into<String>, git_repo: impl Into<String>, git_branch: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            git_repo: git_repo.into(),
            git_branch: git_branch.into(),
            discarder: None,
            credential: None,
            parameters: Vec::new(),
        }
    }

    /// Retention policy for old builds and artifacts. Without one,
    /// everything is kept (`BuildDiscarder::default()`).
    pub fn with_discarder(mut self, discarder: BuildDiscarder) -> Self {
        self.discarder = Some(discarder);
        self
    }

    /// Credential for checking out the source repository. Provisioned
    /// into the credential store as part of create/update.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn with_parameter(mut self, parameter: BuildParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_parameters(mut self, parameters: impl IntoIterator<Item = BuildParameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Create, update and delete jobs, provisioning their repository
/// credential along the way.
pub struct JobService<'a> {
    client: &'a JenkinsClient,
}

impl<'a> JobService<'a> {
    pub fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    /// Job details, or `None` when no job with that name exists.
    pub async fn get(&self, name: &str) -> ClientResult<Option<JobDetails>> {
        self.client.get_job(name).await
    }

    /// Provisions the credential (if any) and creates the job.
    pub async fn create(&self, request: &JobRequest) -> ClientResult<()> {
        let config_xml = self.prepare(request).await?;
        self.client.create_job(&request.name, &config_xml).await
    }

    /// Provisions the credential (if any) and replaces the job config.
    ///
    /// A credential supplied at create time must be supplied again
    /// here, otherwise the updated config drops it.
    pub async fn update(&self, request: &JobRequest) -> ClientResult<()> {
        let config_xml = self.prepare(request).await?;
        self.client.update_job(&request.name, &config_xml).await
    }

    /// Deletes the job and its associated credential.
    ///
    /// Pass the same `credential_id` that was set on the credential at
    /// create time, or `None` if the id was derived from the job name.
    pub async fn delete(&self, name: &str, credential_id: Option<&str>) -> ClientResult<()> {
        let credential_id = credential_id_for(name, credential_id);
        self.try_delete_credential(&credential_id).await;
        self.client.delete_job(name).await
    }

    /// Provisions the credential and renders the job config.
    ///
    /// The credential is deleted and recreated so a changed secret
    /// value takes effect; creation failure is fatal, deletion failure
    /// is not (the credential may simply not exist yet).
    async fn prepare(&self, request: &JobRequest) -> ClientResult<String> {
        let credentials_id = match &request.credential {
            Some(credential) => {
                let id = credential_id_for(&request.name, credential.id());
                self.try_delete_credential(&id).await;
                self.client
                    .create_credential(&credential.store_payload(&id))
                    .await
                    .map_err(|e| {
                        ClientError::ApiError(format!("Cannot create credential {id}: {e}"))
                    })?;
                Some(id)
            }
            None => None,
        };

        Ok(template::render_job_config(&template::JobConfig {
            git_repo: &request.git_repo,
            git_branch: &request.git_branch,
            discarder: request.discarder.unwrap_or_default(),
            parameters: &request.parameters,
            credentials_id: credentials_id.as_deref(),
        }))
    }

    async fn try_delete_credential(&self, id: &str) {
        if let Err(e) = self.client.delete_credential(id).await {
            warn!(credential = id, error = %e, "cannot delete credential, it might not exist");
        }
    }
}

/// The explicit id if one was given, otherwise an id derived from the
/// job name.
fn credential_id_for(job_name: &str, given_id: Option<&str>) -> String {
    match given_id {
        Some(id) => id.to_string(),
        None => format!("{job_name}-gitRepoCredential"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_id_derived_from_job_name() {
        assert_eq!(credential_id_for("app", None), "app-gitRepoCredential");
        assert_eq!(credential_id_for("app", Some("shared")), "shared");
    }

    #[test]
    fn test_request_builder_collects_parameters() {
        let request = JobRequest::new("app", "git@github.com:example/app.git", "main")
            .with_parameter(BuildParameter::new("RELEASE"))
            .with_parameters(vec![
                BuildParameter::new("TARGET"),
                BuildParameter::new("FLAVOR"),
            ]);
        assert_eq!(request.name(), "app");
        assert_eq!(request.parameters.len(), 3);
    }
}
