pub mod cart_service;
pub mod cash_service;
pub mod catalog_service;
pub mod dashboard_service;
pub mod kitchen_service;
pub mod order_service;
pub mod table_service;
pub mod zone_service;
