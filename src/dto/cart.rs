use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cart::{CartLine, CartTotals};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartLineRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitCartRequest {
    pub waiter_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub table_id: Uuid,
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}
