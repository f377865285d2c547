use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Table id, or the table number printed on it.
    pub table: String,
    pub waiter_id: Option<Uuid>,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

/// An item of the table's running bill, with the product joined in.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionItem {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product_name: Option<String>,
    pub product_price: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PayOrderRequest {
    pub staff_id: Option<Uuid>,
}
