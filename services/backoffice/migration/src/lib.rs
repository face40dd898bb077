use sea_orm_migration::prelude::*;

mod m20260501_000001_create_users;
mod m20260501_000002_create_suppliers;
mod m20260501_000003_create_categories;
mod m20260501_000004_create_products;
mod m20260501_000005_create_sales;
mod m20260501_000006_create_sale_items;
mod m20260501_000007_create_activity_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260501_000001_create_users::Migration),
            Box::new(m20260501_000002_create_suppliers::Migration),
            Box::new(m20260501_000003_create_categories::Migration),
            Box::new(m20260501_000004_create_products::Migration),
            Box::new(m20260501_000005_create_sales::Migration),
            Box::new(m20260501_000006_create_sale_items::Migration),
            Box::new(m20260501_000007_create_activity_logs::Migration),
        ]
    }
}
