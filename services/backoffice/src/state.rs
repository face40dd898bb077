use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbActivityLogRepository, DbCategoryRepository, DbEmployeeRepository, DbProductRepository,
    DbSaleRepository, DbSupplierRepository,
};
use crate::usecase::activity::ActivityRecorder;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn employee_repo(&self) -> DbEmployeeRepository {
        DbEmployeeRepository {
            db: self.db.clone(),
        }
    }

    pub fn supplier_repo(&self) -> DbSupplierRepository {
        DbSupplierRepository {
            db: self.db.clone(),
        }
    }

    pub fn category_repo(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.db.clone(),
        }
    }

    pub fn product_repo(&self) -> DbProductRepository {
        DbProductRepository {
            db: self.db.clone(),
        }
    }

    pub fn sale_repo(&self) -> DbSaleRepository {
        DbSaleRepository {
            db: self.db.clone(),
        }
    }

    pub fn activity(&self) -> ActivityRecorder<DbActivityLogRepository> {
        ActivityRecorder {
            repo: DbActivityLogRepository {
                db: self.db.clone(),
            },
        }
    }
}
