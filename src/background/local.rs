//! In-process worker running passes on tokio's blocking pool.

use super::{handle_request, DispatchFuture, WorkerEndpoint, WorkerRequest, WorkerResponse};
use crate::core::Error;

/// Runs each request on `spawn_blocking` against a JSON copy of the request.
///
/// Nothing is shared with the caller: the request crosses as serialized text,
/// just like it would to an out-of-process worker.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalWorker;

impl LocalWorker {
    pub fn new() -> Self {
        Self
    }
}

impl WorkerEndpoint for LocalWorker {
    fn dispatch(&self, request: WorkerRequest) -> DispatchFuture<'_> {
        Box::pin(async move {
            let payload = serde_json::to_string(&request)?;

            let response = tokio::task::spawn_blocking(move || match serde_json::from_str::<WorkerRequest>(&payload) {
                Ok(request) => handle_request(request),
                Err(e) => WorkerResponse::error(format!("Invalid request: {}", e)),
            })
            .await
            .map_err(|e| Error::Worker(format!("Worker task failed: {}", e)))?;

            Ok(response)
        })
    }

    fn describe(&self) -> String {
        "local blocking pool".to_string()
    }
}
