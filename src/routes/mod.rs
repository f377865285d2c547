use axum::Router;

use crate::state::AppState;

pub mod cash;
pub mod catalog;
pub mod dashboard;
pub mod doc;
pub mod health;
pub mod kitchen;
pub mod orders;
pub mod params;
pub mod products;
pub mod realtime;
pub mod tables;
pub mod zones;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/stations", catalog::stations_router())
        .nest("/categories", catalog::categories_router())
        .nest("/products", products::router())
        .nest("/zones", zones::router())
        .nest("/tables", tables::router())
        .nest("/orders", orders::router())
        .nest("/kitchen", kitchen::router())
        .nest("/cash", cash::router())
        .nest("/dashboard", dashboard::router())
        .nest("/realtime", realtime::router())
}
