// Server-sent event streaming utilities
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use tokio::sync::watch;

/// Yield a snapshot now and again after every revision change.
///
/// Revisions published while a snapshot is being taken collapse into one.
pub fn revision_stream<T, F, Fut>(
    mut revisions: watch::Receiver<u64>,
    snapshot: F,
) -> impl Stream<Item = T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = T>,
{
    async_stream::stream! {
        revisions.borrow_and_update();
        loop {
            yield snapshot().await;
            if revisions.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Wrap a snapshot stream as JSON `event` messages.
pub fn sse_response<S, T>(
    event: &'static str,
    snapshots: S,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let events = snapshots.filter_map(move |snapshot| async move {
        match Event::default().event(event).json_data(&snapshot) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::error!("Event serialization error: {}", e);
                None
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
