//! Progressive console-log streaming.

use std::future::Future;

use jobkit_core::{
    ClientError,
    ClientResult,
    LogStreamListener,
    LogStreamingOptions,
};
use tokio::time::{
    sleep,
    Instant,
};
use tracing::debug;

use crate::client::JenkinsClient;
use crate::types::LogChunk;

pub struct LogService<'a> {
    client: &'a JenkinsClient,
}

impl<'a> LogService<'a> {
    pub fn new(client: &'a JenkinsClient) -> Self {
        Self { client }
    }

    /// Streams the console log of a build to `listener`.
    ///
    /// Polls `logText/progressiveText` at `options.interval()` until
    /// the server reports no more data, handing each non-empty chunk to
    /// the listener in order. `on_finished` is called exactly once,
    /// whether streaming completed or timed out; on timeout an error is
    /// returned afterwards.
    pub async fn stream(
        &self, job_name: &str, build_number: i64, options: &LogStreamingOptions,
        listener: &dyn LogStreamListener,
    ) -> ClientResult<()> {
        let context = format!("{job_name} #{build_number}");
        stream_with(
            |start| self.client.progressive_log(job_name, build_number, start),
            options,
            listener,
            &context,
        )
        .await
    }
}

/// The polling loop behind [`LogService::stream`], with the per-poll
/// request abstracted away so the loop's behavior stands on its own.
async fn stream_with<F, Fut>(
    poll: F, options: &LogStreamingOptions, listener: &dyn LogStreamListener, context: &str,
) -> ClientResult<()>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = ClientResult<LogChunk>>,
{
    let deadline = Instant::now() + options.timeout();
    let mut start = 0u64;

    loop {
        let chunk = poll(start).await?;

        if !chunk.text.is_empty() {
            listener.on_data(&chunk.text).await;
        }
        start = chunk.next_start;

        if !chunk.more_data {
            break;
        }

        if Instant::now() >= deadline {
            listener.on_finished().await;
            return Err(ClientError::Timeout(format!(
                "console log of {context} still streaming after {:?}",
                options.timeout()
            )));
        }

        sleep(options.interval()).await;
    }

    debug!(build = context, bytes = start, "console log complete");
    listener.on_finished().await;
    Ok(())
}
