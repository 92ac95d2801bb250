//! Background hash recalculation.
//!
//! Rehashing a large file can keep the server busy for a while. The worker
//! runs those requests on its own task so whatever asked can keep going; each
//! job gets its own reply channel and the worker holds no other state.

use crate::ApiHandle;
use crate::error::{ErrorKind, Result};
use filestation_integrity::ComputedHashes;
use tokio::sync::{mpsc, oneshot};
use tracing::instrument;

const QUEUE_DEPTH: usize = 16;

struct Job {
    path: String,
    reply: oneshot::Sender<Result<ComputedHashes>>,
}

/// Handle to a running hash worker.
///
/// Cheap to clone. The worker task exits once every handle has been dropped.
#[derive(Clone)]
pub struct HashWorker {
    sender: mpsc::Sender<Job>,
}
impl HashWorker {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(api: ApiHandle) -> Self {
        let (sender, mut receiver) = mpsc::channel::<Job>(QUEUE_DEPTH);
        tokio::spawn(async move {
            while let Some(Job { path, reply }) = receiver.recv().await {
                let result = api.recalculate_hashes(&path).await;
                if reply.send(result).is_err() {
                    tracing::debug!(path = %path, "Hash requester went away before the reply");
                }
            }
            tracing::debug!("Hash worker exiting");
        });
        Self { sender }
    }

    /// Queue a recalculation for `path` and wait for the answer.
    ///
    /// The server's own failure comes back as-is; [`WorkerGone`](ErrorKind::WorkerGone)
    /// means the worker task is no longer running.
    #[instrument(skip_all, fields(path = %path))]
    pub async fn recalculate(&self, path: &str) -> Result<ComputedHashes> {
        let (reply, response) = oneshot::channel();
        let job = Job {
            path: path.to_string(),
            reply,
        };
        if self.sender.send(job).await.is_err() {
            exn::bail!(ErrorKind::WorkerGone);
        }
        match response.await {
            Ok(result) => result,
            Err(_) => exn::bail!(ErrorKind::WorkerGone),
        }
    }
}
