pub mod cart;
pub mod cash;
pub mod dashboard;
pub mod kitchen;
pub mod orders;
pub mod products;
pub mod tables;
