//! Jenkins job automation client
//!
//! This crate automates Jenkins CI server operations on top of plain
//! REST calls, allowing you to:
//! - Create, update and delete jobs from a rendered `config.xml`
//! - Provision repository credentials alongside the jobs that use them
//! - Trigger builds and fetch their archived artifacts
//! - Stream build console logs as they are produced
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//! - `client` - Jenkins REST plumbing (auth, CSRF crumb, retries)
//! - `config` - Connection settings
//! - `jobs` - Job lifecycle and credential sequencing
//! - `builds` - Build triggering and inspection
//! - `artifacts` - Artifact lookup and download
//! - `logs` - Progressive console-log streaming
//! - `template` - The `config.xml` renderer
//! - `types` - API response types
//!
//! # Example Usage
//!
//! ```no_run
//! use jobkit_core::BuildDiscarder;
//! use jobkit_jenkins::{Credential, JenkinsClient, JenkinsConfig, JobRequest, JobService};
//!
//! # async fn example() -> jobkit_core::ClientResult<()> {
//! let config = JenkinsConfig::new("https://jenkins.example.com", "admin", "api-token")
//!     .with_csrf_protection(true);
//! let client = JenkinsClient::new(config)?;
//!
//! let request = JobRequest::new("helloworld", "git@github.com:example/helloworld.git", "main")
//!     .with_discarder(BuildDiscarder::new().with_store_builds_total(20))
//!     .with_credential(Credential::new("builder", "s3cret"));
//!
//! JobService::new(&client).create(&request).await?;
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod builds;
pub mod client;
pub mod config;
pub mod credentials;
pub mod jobs;
pub mod logs;
mod template;
pub mod types;

pub use artifacts::{
    ArtifactService,
    FetchedArtifact,
};
pub use builds::BuildService;
pub use client::JenkinsClient;
pub use config::JenkinsConfig;
pub use credentials::Credential;
pub use jobs::{
    JobRequest,
    JobService,
};
pub use logs::LogService;
pub use types::{
    BuildDetails,
    JobDetails,
    QueueRef,
};
