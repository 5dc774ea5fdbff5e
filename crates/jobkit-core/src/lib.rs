//! Core types for jobkit
//!
//! Provider-agnostic building blocks shared by the jobkit crates: the
//! error type, the retry policy, the job-retention and build-parameter
//! model, and the console-log listener trait.

pub mod error;
pub mod logging;
pub mod model;
pub mod retry;

pub use error::{
    ClientError,
    ClientResult,
};
pub use model::{
    BuildDiscarder,
    BuildParameter,
    LogStreamListener,
    LogStreamingOptions,
};
pub use retry::RetryPolicy;
