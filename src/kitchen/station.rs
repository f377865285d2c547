use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{KitchenItem, KitchenOrder};
use crate::models::ItemStatus;

/// Which preparation station a board is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StationSelection {
    #[default]
    All,
    Station(Uuid),
}

impl FromStr for StationSelection {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            return Ok(StationSelection::All);
        }
        Uuid::parse_str(value).map(StationSelection::Station)
    }
}

impl TryFrom<String> for StationSelection {
    type Error = uuid::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StationSelection> for String {
    fn from(selection: StationSelection) -> Self {
        selection.to_string()
    }
}

impl fmt::Display for StationSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationSelection::All => f.write_str("all"),
            StationSelection::Station(id) => write!(f, "{id}"),
        }
    }
}

/// Station an item is prepared at, derived through product -> category -> station.
pub fn item_station(item: &KitchenItem) -> Option<Uuid> {
    item.product
        .as_ref()
        .and_then(|product| product.categories.as_ref())
        .and_then(|link| link.station_id())
}

pub fn item_matches(selection: StationSelection, item: &KitchenItem) -> bool {
    match selection {
        StationSelection::All => true,
        StationSelection::Station(id) => item_station(item) == Some(id),
    }
}

/// Orders with at least one item for the selected station.
pub fn filter_orders(selection: StationSelection, orders: &[KitchenOrder]) -> Vec<KitchenOrder> {
    orders
        .iter()
        .filter(|order| {
            selection == StationSelection::All
                || order.items.iter().any(|item| item_matches(selection, item))
        })
        .cloned()
        .collect()
}

/// Items of `order` this station still has to finish.
pub fn pending_station_items(
    selection: StationSelection,
    order: &KitchenOrder,
) -> Vec<&KitchenItem> {
    order
        .items
        .iter()
        .filter(|item| item_matches(selection, item) && item.status != ItemStatus::Ready)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kitchen::{CategoryLink, CategoryRef, ProductRef};
    use crate::models::OrderStatus;

    fn item(station: Option<Uuid>, status: ItemStatus, as_list: bool) -> KitchenItem {
        let category = CategoryRef {
            station_id: station,
            name: Some("Drinks".into()),
        };
        let link = if as_list {
            CategoryLink::Many(vec![category])
        } else {
            CategoryLink::One(category)
        };
        KitchenItem {
            id: Uuid::new_v4(),
            order_id: Uuid::nil(),
            product_id: Uuid::new_v4(),
            quantity: 1,
            unit_price: 450,
            notes: None,
            status,
            started_at: None,
            finished_at: None,
            product: Some(ProductRef {
                name: "Lager".into(),
                categories: Some(link),
            }),
        }
    }

    fn order(items: Vec<KitchenItem>) -> KitchenOrder {
        KitchenOrder {
            id: Uuid::new_v4(),
            table_id: Uuid::nil(),
            table_number: Some("4".into()),
            status: OrderStatus::Pending,
            created_at: None,
            kitchen_started_at: None,
            estimated_total_time: None,
            items,
        }
    }

    #[test]
    fn selection_parses_all_sentinel_and_uuids() {
        assert_eq!("all".parse::<StationSelection>().unwrap(), StationSelection::All);
        assert_eq!("".parse::<StationSelection>().unwrap(), StationSelection::All);
        let id = Uuid::new_v4();
        assert_eq!(
            id.to_string().parse::<StationSelection>().unwrap(),
            StationSelection::Station(id)
        );
        assert!("bar".parse::<StationSelection>().is_err());
    }

    #[test]
    fn station_is_read_from_object_or_single_element_list() {
        let bar = Uuid::new_v4();
        assert_eq!(item_station(&item(Some(bar), ItemStatus::Pending, false)), Some(bar));
        assert_eq!(item_station(&item(Some(bar), ItemStatus::Pending, true)), Some(bar));
    }

    #[test]
    fn joined_category_deserializes_in_both_shapes() {
        let bar = Uuid::new_v4();
        let one: CategoryLink =
            serde_json::from_value(serde_json::json!({ "station_id": bar, "name": "Bar" })).unwrap();
        let many: CategoryLink =
            serde_json::from_value(serde_json::json!([{ "station_id": bar }])).unwrap();
        let empty: CategoryLink = serde_json::from_value(serde_json::json!([])).unwrap();
        assert_eq!(one.station_id(), Some(bar));
        assert_eq!(many.station_id(), Some(bar));
        assert_eq!(empty.station_id(), None);
    }

    #[test]
    fn all_matches_every_item_including_unlinked_ones() {
        let mut unlinked = item(None, ItemStatus::Pending, false);
        unlinked.product = None;
        assert!(item_matches(StationSelection::All, &unlinked));
        assert!(!item_matches(StationSelection::Station(Uuid::new_v4()), &unlinked));
    }

    #[test]
    fn filter_keeps_orders_with_one_matching_item() {
        let bar = Uuid::new_v4();
        let grill = Uuid::new_v4();
        let mixed = order(vec![
            item(Some(grill), ItemStatus::Pending, false),
            item(Some(bar), ItemStatus::Pending, true),
        ]);
        let grill_only = order(vec![item(Some(grill), ItemStatus::Pending, false)]);
        let orders = vec![mixed.clone(), grill_only.clone()];

        let at_bar = filter_orders(StationSelection::Station(bar), &orders);
        assert_eq!(at_bar.len(), 1);
        assert_eq!(at_bar[0].id, mixed.id);

        assert_eq!(filter_orders(StationSelection::All, &orders).len(), 2);
    }

    #[test]
    fn every_item_gets_exactly_one_outcome_per_station() {
        let bar = Uuid::new_v4();
        let items = [
            item(Some(bar), ItemStatus::Pending, false),
            item(Some(Uuid::new_v4()), ItemStatus::Pending, true),
            item(None, ItemStatus::Pending, false),
        ];
        let selection = StationSelection::Station(bar);
        let (matched, rest): (Vec<_>, Vec<_>) =
            items.iter().partition(|i| item_matches(selection, i));
        assert_eq!(matched.len() + rest.len(), items.len());
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn pending_station_items_skip_ready_ones() {
        let bar = Uuid::new_v4();
        let o = order(vec![
            item(Some(bar), ItemStatus::Ready, false),
            item(Some(bar), ItemStatus::Preparing, false),
            item(Some(Uuid::new_v4()), ItemStatus::Pending, false),
        ]);
        let pending = pending_station_items(StationSelection::Station(bar), &o);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].status, ItemStatus::Preparing);
    }
}
