pub mod activity_logs;
pub mod categories;
pub mod products;
pub mod sale_items;
pub mod sales;
pub mod suppliers;
pub mod users;
