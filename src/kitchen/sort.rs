use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::KitchenOrder;
use crate::models::OrderStatus;

/// Board order: most urgent first, then orders already being cooked, then FIFO.
pub fn compare_orders(a: &KitchenOrder, b: &KitchenOrder, now: DateTime<Utc>) -> Ordering {
    let weight_a = a.priority(now).weight();
    let weight_b = b.priority(now).weight();

    weight_b
        .cmp(&weight_a)
        .then_with(|| {
            let cooking_a = a.status == OrderStatus::InProgress;
            let cooking_b = b.status == OrderStatus::InProgress;
            cooking_b.cmp(&cooking_a)
        })
        .then_with(|| match (a.created_at, b.created_at) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Stable in-place sort; orders tying on every key keep their input order.
pub fn sort_orders(orders: &mut [KitchenOrder], now: DateTime<Utc>) {
    orders.sort_by(|a, b| compare_orders(a, b, now));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kitchen::Priority;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap()
    }

    fn order(minutes_ago: i64, estimate: i32, status: OrderStatus) -> KitchenOrder {
        KitchenOrder {
            id: Uuid::new_v4(),
            table_id: Uuid::nil(),
            table_number: None,
            status,
            created_at: Some(now() - Duration::minutes(minutes_ago)),
            kitchen_started_at: None,
            estimated_total_time: Some(estimate),
            items: Vec::new(),
        }
    }

    fn ids(orders: &[KitchenOrder]) -> Vec<Uuid> {
        orders.iter().map(|o| o.id).collect()
    }

    #[test]
    fn urgent_orders_jump_ahead_of_older_ones() {
        // Created at increasing timestamps: normal (oldest), critical, warning.
        let normal = order(30, 60, OrderStatus::Pending);
        let critical = order(20, 10, OrderStatus::Pending);
        let warning = order(10, 12, OrderStatus::Pending);
        assert_eq!(normal.priority(now()), Priority::Normal);
        assert_eq!(critical.priority(now()), Priority::Critical);
        assert_eq!(warning.priority(now()), Priority::Warning);

        let expected = vec![critical.id, warning.id, normal.id];
        for input in [
            vec![normal.clone(), critical.clone(), warning.clone()],
            vec![warning.clone(), normal.clone(), critical.clone()],
            vec![critical.clone(), normal.clone(), warning.clone()],
        ] {
            let mut input = input;
            sort_orders(&mut input, now());
            assert_eq!(ids(&input), expected);
        }
    }

    #[test]
    fn in_progress_wins_within_a_tier() {
        let pending = order(10, 60, OrderStatus::Pending);
        let cooking = order(2, 60, OrderStatus::InProgress);
        let mut orders = vec![pending.clone(), cooking.clone()];
        sort_orders(&mut orders, now());
        assert_eq!(ids(&orders), vec![cooking.id, pending.id]);
    }

    #[test]
    fn ties_fall_back_to_first_in_first_out() {
        let first = order(9, 60, OrderStatus::Pending);
        let second = order(3, 60, OrderStatus::Pending);
        let mut orders = vec![second.clone(), first.clone()];
        sort_orders(&mut orders, now());
        assert_eq!(ids(&orders), vec![first.id, second.id]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let a = order(5, 60, OrderStatus::Pending);
        let mut b = a.clone();
        b.id = Uuid::new_v4();
        let mut orders = vec![b.clone(), a.clone()];
        sort_orders(&mut orders, now());
        assert_eq!(ids(&orders), vec![b.id, a.id]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let mut orders = vec![
            order(1, 15, OrderStatus::Pending),
            order(12, 15, OrderStatus::InProgress),
            order(40, 15, OrderStatus::Pending),
            order(11, 15, OrderStatus::Pending),
            order(3, 15, OrderStatus::InProgress),
        ];
        sort_orders(&mut orders, now());
        let once = ids(&orders);
        sort_orders(&mut orders, now());
        assert_eq!(ids(&orders), once);
    }

    #[test]
    fn undated_orders_sort_last_in_their_tier() {
        let dated = order(1, 60, OrderStatus::Pending);
        let mut undated = order(1, 60, OrderStatus::Pending);
        undated.created_at = None;
        let mut orders = vec![undated.clone(), dated.clone()];
        sort_orders(&mut orders, now());
        assert_eq!(ids(&orders), vec![dated.id, undated.id]);
    }
}
