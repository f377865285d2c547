use axum::{
    Router,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::{Stream, stream};

use crate::{
    error::{AppError, AppResult},
    realtime::{ChangeEvent, Delivery, FEED_TABLES, TableSubscription},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{table}", get(subscribe))
}

/// SSE event for one delivery. A lagged subscriber gets a `resync` event
/// telling it to reload the table.
fn to_event(delivery: Delivery) -> Result<Event, axum::Error> {
    match delivery {
        Delivery::Event(change) => Event::default().event(change.kind.as_str()).json_data(&change),
        Delivery::Missed(skipped) => Ok(Event::default()
            .event("resync")
            .data(skipped.to_string())),
    }
}

fn deliveries(sub: TableSubscription) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream::unfold(sub, |mut sub| async move {
        let delivery = sub.recv().await?;
        Some((to_event(delivery), sub))
    })
}

#[utoipa::path(
    get,
    path = "/api/realtime/{table}",
    params(("table" = String, Path, description = "Table to follow, e.g. orders")),
    responses(
        (status = 200, description = "Server-sent stream of row changes; event name is the change kind", body = ChangeEvent, content_type = "text/event-stream"),
        (status = 404, description = "Table does not publish changes"),
    ),
    tag = "Realtime"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    if !FEED_TABLES.contains(&table.as_str()) {
        return Err(AppError::NotFound);
    }
    tracing::debug!(table = %table, "realtime subscriber attached");
    let sub = state.feed.subscribe_to([table]);
    Ok(Sse::new(deliveries(sub)).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::ChangeFeed;
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn stream_yields_events_for_the_followed_table() {
        let feed = ChangeFeed::new(8);
        let mut events = Box::pin(deliveries(feed.subscribe_to(["zones"])));

        feed.inserted("orders", &json!({ "id": 1 }));
        feed.inserted("zones", &json!({ "id": 2 }));

        assert!(events.next().await.unwrap().is_ok());
        drop(feed);
        assert!(events.next().await.is_none());
    }
}
