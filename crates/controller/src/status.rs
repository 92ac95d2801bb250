use crate::error::{ErrorKind, Result};
use async_stream::stream;
use filestation_client::Api;
use filestation_integrity::{IntegrityPolicy, RowStatus};
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;

/// Metadata requests kept in flight at once by [`row_statuses`].
pub const MAX_STATUS_CONCURRENCY: usize = 8;

/// The status icon for one row of a listing, or why it couldn't be worked out.
#[derive(Debug)]
pub struct RowReport {
    pub path: String,
    pub status: Result<RowStatus>,
}

/// Fetch a file's record fresh and classify it.
pub async fn row_status(api: &dyn Api, policy: &IntegrityPolicy, path: &str) -> Result<RowStatus> {
    let record = api.file_metadata(path).await.map_err(ErrorKind::client)?;
    Ok(policy.row_status(path, &record))
}

/// Streams a [`RowReport`] for every path, in whatever order the requests
/// finish.
///
/// Up to [`MAX_STATUS_CONCURRENCY`] requests run at once. A failed request is
/// reported on its own row; the stream carries on with the rest.
pub fn row_statuses<'a>(
    api: &'a dyn Api,
    policy: &'a IntegrityPolicy,
    paths: impl IntoIterator<Item = String>,
) -> impl Stream<Item = RowReport> + 'a {
    let mut pending: VecDeque<String> = paths.into_iter().collect();
    stream!({
        let first = pending.len().min(MAX_STATUS_CONCURRENCY);
        let mut processing: FuturesUnordered<_> = pending.drain(..first).map(|path| report(api, policy, path)).collect();
        while let Some(row) = processing.next().await {
            if let Err(err) = &row.status {
                let kind: &ErrorKind = err;
                tracing::warn!(path = %row.path, error = %kind, "Row status unavailable");
            }
            yield row;
            // FIFO, so rows start in listing order.
            if let Some(path) = pending.pop_front() {
                processing.push(report(api, policy, path));
            }
        }
    })
}

async fn report(api: &dyn Api, policy: &IntegrityPolicy, path: String) -> RowReport {
    let status = row_status(api, policy, &path).await;
    RowReport { path, status }
}
