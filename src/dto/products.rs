use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    /// Empty string is treated as "no category".
    pub category_id: Option<String>,
    pub price: i64,
    pub cost: Option<i64>,
    pub stock: Option<i32>,
    pub is_available: Option<bool>,
    pub prep_time_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<i64>,
    pub cost: Option<i64>,
    pub stock: Option<i32>,
    pub is_available: Option<bool>,
    pub prep_time_minutes: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStationRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub icon: Option<String>,
    pub station_id: Option<Uuid>,
}
