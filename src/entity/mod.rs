pub mod audit_logs;
pub mod cash_shifts;
pub mod cash_transactions;
pub mod categories;
pub mod dining_tables;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod stations;
pub mod table_sessions;
pub mod zones;

pub use audit_logs::Entity as AuditLogs;
pub use cash_shifts::Entity as CashShifts;
pub use cash_transactions::Entity as CashTransactions;
pub use categories::Entity as Categories;
pub use dining_tables::Entity as DiningTables;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use stations::Entity as Stations;
pub use table_sessions::Entity as TableSessions;
pub use zones::Entity as Zones;
