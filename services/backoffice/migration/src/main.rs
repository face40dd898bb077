use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(caisse_backoffice_migration::Migrator).await;
}
