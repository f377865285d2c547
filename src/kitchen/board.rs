use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{KitchenItem, KitchenOrder, KitchenOrderView, Priority, StationSelection, build_view, sort_orders};
use crate::{
    models::ItemStatus,
    realtime::{ChangeEvent, ChangeKind, Delivery},
    services::kitchen_service,
    state::AppState,
};

/// Tables whose changes invalidate the board.
pub const WATCHED_TABLES: [&str; 2] = ["orders", "order_items"];

/// Pseudo-table on the change feed announcing a periodic re-sort.
pub const BOARD_TICK_TABLE: &str = "kitchen_board";

/// Last successfully loaded set of active kitchen orders.
#[derive(Clone, Default)]
pub struct KitchenBoard {
    orders: Arc<RwLock<Vec<KitchenOrder>>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TierCounts {
    pub critical: usize,
    pub warning: usize,
    pub normal: usize,
}

impl KitchenBoard {
    pub fn cache(&self) -> &RwLock<Vec<KitchenOrder>> {
        &self.orders
    }

    pub fn replace(&self, orders: Vec<KitchenOrder>) {
        *self.orders.write() = orders;
    }

    pub fn snapshot(&self) -> Vec<KitchenOrder> {
        self.orders.read().clone()
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }

    pub fn view(&self, selection: StationSelection, now: DateTime<Utc>) -> Vec<KitchenOrderView> {
        build_view(selection, &self.orders.read(), now)
    }

    pub fn find_item(&self, item_id: Uuid) -> Option<KitchenItem> {
        self.orders
            .read()
            .iter()
            .flat_map(|order| order.items.iter())
            .find(|item| item.id == item_id)
            .cloned()
    }

    pub fn tiers(&self, now: DateTime<Utc>) -> TierCounts {
        count_tiers(&self.orders.read(), now)
    }

    /// Re-sort in place; priorities escalate with time even when no row changed.
    pub fn resort(&self, now: DateTime<Utc>) -> TierCounts {
        let mut orders = self.orders.write();
        sort_orders(&mut orders, now);
        count_tiers(&orders, now)
    }
}

fn count_tiers(orders: &[KitchenOrder], now: DateTime<Utc>) -> TierCounts {
    orders.iter().fold(TierCounts::default(), |mut counts, order| {
        match order.priority(now) {
            Priority::Critical => counts.critical += 1,
            Priority::Warning => counts.warning += 1,
            Priority::Normal => counts.normal += 1,
        }
        counts
    })
}

/// Patch the cached status of each listed item and return the matching undo.
///
/// Items not on the board are skipped. The undo restores only items that
/// still carry `status`, so a reload or a later write that landed in the
/// meantime is left alone.
pub fn set_item_statuses(
    orders: &mut [KitchenOrder],
    item_ids: &[Uuid],
    status: ItemStatus,
) -> impl FnOnce(&mut Vec<KitchenOrder>) + Send + 'static + use<> {
    let mut previous = Vec::with_capacity(item_ids.len());
    for &item_id in item_ids {
        if let Some(item) = orders.iter_mut().find_map(|order| order.item_mut(item_id)) {
            previous.push((item_id, item.status));
            item.status = status;
        }
    }

    move |orders: &mut Vec<KitchenOrder>| {
        for (item_id, before) in previous {
            if let Some(item) = orders.iter_mut().find_map(|order| order.item_mut(item_id)) {
                if item.status == status {
                    item.status = before;
                }
            }
        }
    }
}

/// Keep the board current: reload on every order or item change, re-sort on
/// a fixed interval.
pub fn spawn_refresher(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut changes = state.feed.subscribe_to(WATCHED_TABLES);
        let mut ticker = tokio::time::interval(state.config.kitchen_resort_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        reload(&state).await;

        loop {
            tokio::select! {
                delivery = changes.recv() => match delivery {
                    Some(Delivery::Event(event)) => {
                        tracing::debug!(table = %event.table, kind = event.kind.as_str(), "kitchen change");
                        reload(&state).await;
                    }
                    Some(Delivery::Missed(_)) => reload(&state).await,
                    None => break,
                },
                _ = ticker.tick() => {
                    let counts = state.board.resort(Utc::now());
                    tracing::debug!(?counts, "kitchen board re-sorted");
                    state.feed.publish(ChangeEvent {
                        table: BOARD_TICK_TABLE.to_string(),
                        kind: ChangeKind::Update,
                        old: None,
                        new: serde_json::to_value(counts).ok(),
                        at: Utc::now(),
                    });
                }
            }
        }

        tracing::info!("kitchen refresher stopped");
    })
}

async fn reload(state: &AppState) {
    match kitchen_service::load_active_orders(&state.orm).await {
        Ok(orders) => {
            tracing::debug!(count = orders.len(), "kitchen board reloaded");
            state.board.replace(orders);
        }
        Err(err) => {
            tracing::error!(error = %err, "kitchen board reload failed, keeping previous orders");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::OrderStatus, tentative::with_tentative};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap()
    }

    fn order(minutes_ago: i64, item_id: Uuid) -> KitchenOrder {
        KitchenOrder {
            id: Uuid::new_v4(),
            table_id: Uuid::nil(),
            table_number: Some("7".into()),
            status: OrderStatus::Pending,
            created_at: Some(now() - Duration::minutes(minutes_ago)),
            kitchen_started_at: None,
            estimated_total_time: Some(15),
            items: vec![KitchenItem {
                id: item_id,
                order_id: Uuid::nil(),
                product_id: Uuid::nil(),
                quantity: 1,
                unit_price: 900,
                notes: None,
                status: ItemStatus::Pending,
                started_at: None,
                finished_at: None,
                product: None,
            }],
        }
    }

    #[test]
    fn resort_escalates_without_new_data() {
        let board = KitchenBoard::default();
        let fresh = order(1, Uuid::new_v4());
        let aging = order(10, Uuid::new_v4());
        board.replace(vec![fresh.clone(), aging.clone()]);

        let counts = board.resort(now());
        assert_eq!(counts, TierCounts { critical: 0, warning: 0, normal: 2 });
        assert_eq!(board.snapshot()[0].id, aging.id);

        let later = now() + Duration::minutes(6);
        let counts = board.resort(later);
        assert_eq!(counts, TierCounts { critical: 1, warning: 0, normal: 1 });
        assert_eq!(board.view(StationSelection::All, later)[0].priority, Priority::Critical);
    }

    #[tokio::test]
    async fn failed_item_write_reverts_cached_status() {
        let board = KitchenBoard::default();
        let item_id = Uuid::new_v4();
        board.replace(vec![order(3, item_id)]);

        let result: Result<(), &str> = with_tentative(
            board.cache(),
            |orders| set_item_statuses(orders, &[item_id], ItemStatus::Ready),
            async { Err("write failed") },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(board.find_item(item_id).unwrap().status, ItemStatus::Pending);
    }

    #[tokio::test]
    async fn rollback_keeps_a_reload_that_landed_mid_write() {
        let board = KitchenBoard::default();
        let item_id = Uuid::new_v4();
        let cooking = order(3, item_id);
        board.replace(vec![cooking.clone()]);

        let newcomer = order(0, Uuid::new_v4());
        let result: Result<(), &str> = with_tentative(
            board.cache(),
            |orders| set_item_statuses(orders, &[item_id], ItemStatus::Ready),
            async {
                board.replace(vec![cooking.clone(), newcomer.clone()]);
                Err("write failed")
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(board.len(), 2);
        assert!(board.snapshot().iter().any(|o| o.id == newcomer.id));
        assert_eq!(board.find_item(item_id).unwrap().status, ItemStatus::Pending);
    }

    #[tokio::test]
    async fn rollback_leaves_items_changed_by_someone_else() {
        let board = KitchenBoard::default();
        let item_id = Uuid::new_v4();
        board.replace(vec![order(3, item_id)]);

        let result: Result<(), &str> = with_tentative(
            board.cache(),
            |orders| set_item_statuses(orders, &[item_id], ItemStatus::Ready),
            async {
                let undo = set_item_statuses(&mut board.cache().write(), &[item_id], ItemStatus::Preparing);
                drop(undo);
                Err("write failed")
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(board.find_item(item_id).unwrap().status, ItemStatus::Preparing);
    }
}
