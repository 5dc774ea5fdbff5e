//! Build triggering and inspection.

use jobkit_core::ClientResult;

use crate::client::JenkinsClient;
use crate::types::{
    BuildDetails,
    QueueRef,
};

pub struct BuildService<'a> {
    client: &'a JenkinsClient,
}

impl<'a> BuildService<'a> {
    pub fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    /// Triggers a build. With parameters it goes through
    /// `buildWithParameters`, otherwise through plain `build`. Returns
    /// the queue reference Jenkins answers with; the build number is
    /// assigned later, once the item leaves the queue.
    pub async fn trigger(
        &self, job_name: &str, params: &[(String, String)],
    ) -> ClientResult<QueueRef> {
        self.client.trigger_build(job_name, params).await
    }

    /// Details of one build, including its artifact list.
    pub async fn get(&self, job_name: &str, build_number: i64) -> ClientResult<BuildDetails> {
        self.client.get_build(job_name, build_number).await
    }
}
