//! In-process change notification, the server-side counterpart of a
//! row-level realtime channel: every write publishes a [`ChangeEvent`] and
//! subscribers filter by table name.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast::{self, error::RecvError};
use utoipa::ToSchema;

/// Tables that publish changes, plus the kitchen board's re-sort tick.
pub const FEED_TABLES: [&str; 11] = [
    "stations",
    "categories",
    "products",
    "zones",
    "tables",
    "table_sessions",
    "orders",
    "order_items",
    "cash_shifts",
    "cash_transactions",
    "kitchen_board",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    #[schema(value_type = Option<Object>)]
    pub old: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub new: Option<Value>,
    pub at: DateTime<Utc>,
}

/// What a subscriber receives: an event, or notice that it fell behind and
/// should reload from scratch.
#[derive(Debug, Clone)]
pub enum Delivery {
    Event(ChangeEvent),
    Missed(u64),
}

#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: ChangeEvent) {
        let table = event.table.clone();
        let kind = event.kind;
        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(table = %table, kind = kind.as_str(), receivers, "change published")
            }
            Err(_) => tracing::trace!(table = %table, "change dropped, no subscribers"),
        }
    }

    pub fn inserted<T: Serialize>(&self, table: &str, row: &T) {
        self.publish(ChangeEvent {
            table: table.to_string(),
            kind: ChangeKind::Insert,
            old: None,
            new: to_row(table, row),
            at: Utc::now(),
        });
    }

    pub fn updated<T: Serialize>(&self, table: &str, old: Option<&T>, new: &T) {
        self.publish(ChangeEvent {
            table: table.to_string(),
            kind: ChangeKind::Update,
            old: old.and_then(|row| to_row(table, row)),
            new: to_row(table, new),
            at: Utc::now(),
        });
    }

    pub fn deleted(&self, table: &str, old: Value) {
        self.publish(ChangeEvent {
            table: table.to_string(),
            kind: ChangeKind::Delete,
            old: Some(old),
            new: None,
            at: Utc::now(),
        });
    }

    pub fn subscribe_to<I, S>(&self, tables: I) -> TableSubscription
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TableSubscription {
            rx: self.tx.subscribe(),
            tables: tables.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

fn to_row<T: Serialize>(table: &str, row: &T) -> Option<Value> {
    match serde_json::to_value(row) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(table = %table, error = %err, "change payload not serializable");
            None
        }
    }
}

pub struct TableSubscription {
    rx: broadcast::Receiver<ChangeEvent>,
    tables: Vec<String>,
}

impl TableSubscription {
    /// Next delivery for the subscribed tables; `None` once the feed is gone.
    pub async fn recv(&mut self) -> Option<Delivery> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.tables.iter().any(|t| *t == event.table) => {
                    return Some(Delivery::Event(event));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, tables = ?self.tables, "change subscriber lagged");
                    return Some(Delivery::Missed(skipped));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn subscribers_only_see_their_tables() {
        let feed = ChangeFeed::new(16);
        let mut orders = feed.subscribe_to(["orders", "order_items"]);

        feed.inserted("tables", &json!({ "id": 1 }));
        feed.updated("order_items", None, &json!({ "id": 2, "status": "ready" }));

        match orders.recv().await {
            Some(Delivery::Event(event)) => {
                assert_eq!(event.table, "order_items");
                assert_eq!(event.kind, ChangeKind::Update);
                assert_eq!(event.new, Some(json!({ "id": 2, "status": "ready" })));
            }
            other => panic!("unexpected delivery: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_carries_the_old_row() {
        let feed = ChangeFeed::new(4);
        let mut zones = feed.subscribe_to(["zones"]);
        feed.deleted("zones", json!({ "id": "z1" }));
        let Some(Delivery::Event(event)) = zones.recv().await else {
            panic!("expected an event");
        };
        assert_eq!(event.kind, ChangeKind::Delete);
        assert_eq!(event.old, Some(json!({ "id": "z1" })));
        assert!(event.new.is_none());
    }

    #[tokio::test]
    async fn slow_subscriber_is_told_to_reload() {
        let feed = ChangeFeed::new(2);
        let mut sub = feed.subscribe_to(["orders"]);
        for i in 0..5 {
            feed.inserted("orders", &json!({ "n": i }));
        }
        assert!(matches!(sub.recv().await, Some(Delivery::Missed(3))));
    }

    #[tokio::test]
    async fn closed_feed_ends_the_subscription() {
        let feed = ChangeFeed::new(2);
        let mut sub = feed.subscribe_to(["orders"]);
        drop(feed);
        assert!(sub.recv().await.is_none());
    }
}
