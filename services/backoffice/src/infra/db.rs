use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Statement, TransactionTrait,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use caisse_backoffice_schema::{
    activity_logs, categories, products, sale_items, sales, suppliers, users,
};
use caisse_domain::pagination::PageRequest;
use caisse_domain::user::UserRole;

use crate::domain::repository::{
    ActivityLogRepository, CategoryRepository, EmployeeRepository, ProductRepository,
    SaleRepository, SupplierRepository,
};
use crate::domain::types::{
    ActivityLog, Category, CategoryFilter, Employee, EmployeeCounts, EmployeeFilter, Product,
    ProductCounts, ProductFilter, ProductStatus, Sale, SaleFilter, SaleItemDraft, SaleItemLine,
    SaleStatus, SaleWithItems, Supplier, SupplierCounts, SupplierFilter, SupplierStatus,
};
use crate::error::BackofficeError;

fn like_pattern(term: &str) -> String {
    format!("%{term}%")
}

// ── Employee repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEmployeeRepository {
    pub db: DatabaseConnection,
}

/// Base query for the employee screens: the acting user's own row is
/// excluded at query level, then the filter composes AND across fields
/// with the free-text term matching first/last name or email (OR).
fn employee_query(acting_id: Uuid, filter: &EmployeeFilter) -> Select<users::Entity> {
    let mut query = users::Entity::find().filter(users::Column::Id.ne(acting_id));
    if let Some(term) = &filter.term {
        let pattern = like_pattern(term);
        query = query.filter(
            Condition::any()
                .add(Expr::col((users::Entity, users::Column::FirstName)).ilike(pattern.clone()))
                .add(Expr::col((users::Entity, users::Column::LastName)).ilike(pattern.clone()))
                .add(Expr::col((users::Entity, users::Column::Email)).ilike(pattern)),
        );
    }
    if let Some(role) = filter.role {
        query = query.filter(users::Column::Role.eq(role.as_str()));
    }
    if let Some(active) = filter.is_active {
        query = query.filter(users::Column::IsActive.eq(active));
    }
    query
}

fn employee_from_model(model: users::Model) -> Result<Employee, BackofficeError> {
    let role = UserRole::parse(&model.role)
        .ok_or_else(|| anyhow::anyhow!("unknown role {:?} for user {}", model.role, model.id))?;
    Ok(Employee {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        role,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

impl EmployeeRepository for DbEmployeeRepository {
    async fn list(
        &self,
        acting_id: Uuid,
        filter: &EmployeeFilter,
        page: PageRequest,
    ) -> Result<Vec<Employee>, BackofficeError> {
        let page = page.clamped();
        let models = employee_query(acting_id, filter)
            .order_by_desc(users::Column::CreatedAt)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list employees")?;
        models.into_iter().map(employee_from_model).collect()
    }

    async fn counts(
        &self,
        acting_id: Uuid,
        filter: &EmployeeFilter,
    ) -> Result<EmployeeCounts, BackofficeError> {
        let base = employee_query(acting_id, filter);
        let total = base
            .clone()
            .count(&self.db)
            .await
            .context("count employees")?;
        let active = base
            .clone()
            .filter(users::Column::IsActive.eq(true))
            .count(&self.db)
            .await
            .context("count active employees")?;
        let inactive = base
            .filter(users::Column::IsActive.eq(false))
            .count(&self.db)
            .await
            .context("count inactive employees")?;
        Ok(EmployeeCounts {
            total,
            active,
            inactive,
        })
    }

    async fn find_by_id(
        &self,
        acting_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Employee>, BackofficeError> {
        let model = users::Entity::find_by_id(id)
            .filter(users::Column::Id.ne(acting_id))
            .one(&self.db)
            .await
            .context("find employee by id")?;
        model.map(employee_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, BackofficeError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find employee by email")?;
        model.map(employee_from_model).transpose()
    }

    async fn exists(&self, id: Uuid) -> Result<bool, BackofficeError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("check employee exists")?;
        Ok(model.is_some())
    }

    async fn create(&self, employee: &Employee) -> Result<(), BackofficeError> {
        users::ActiveModel {
            id: Set(employee.id),
            first_name: Set(employee.first_name.clone()),
            last_name: Set(employee.last_name.clone()),
            email: Set(employee.email.clone()),
            role: Set(employee.role.as_str().to_owned()),
            is_active: Set(employee.is_active),
            created_at: Set(employee.created_at),
            updated_at: Set(employee.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create employee")?;
        Ok(())
    }

    async fn update(
        &self,
        acting_id: Uuid,
        employee: &Employee,
    ) -> Result<bool, BackofficeError> {
        // Single statement so the self-exclusion holds atomically.
        let result = users::Entity::update_many()
            .filter(users::Column::Id.eq(employee.id))
            .filter(users::Column::Id.ne(acting_id))
            .col_expr(
                users::Column::FirstName,
                Expr::value(employee.first_name.clone()),
            )
            .col_expr(
                users::Column::LastName,
                Expr::value(employee.last_name.clone()),
            )
            .col_expr(users::Column::Email, Expr::value(employee.email.clone()))
            .col_expr(users::Column::Role, Expr::value(employee.role.as_str()))
            .col_expr(users::Column::IsActive, Expr::value(employee.is_active))
            .col_expr(users::Column::UpdatedAt, Expr::value(employee.updated_at))
            .exec(&self.db)
            .await
            .context("update employee")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, acting_id: Uuid, id: Uuid) -> Result<bool, BackofficeError> {
        let result = users::Entity::delete_many()
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::Id.ne(acting_id))
            .exec(&self.db)
            .await
            .context("delete employee")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Supplier repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSupplierRepository {
    pub db: DatabaseConnection,
}

fn supplier_query(filter: &SupplierFilter) -> Select<suppliers::Entity> {
    let mut query = suppliers::Entity::find();
    if let Some(term) = &filter.term {
        query = query
            .filter(Expr::col((suppliers::Entity, suppliers::Column::Name)).ilike(like_pattern(term)));
    }
    if let Some(status) = filter.status {
        query = query.filter(suppliers::Column::Status.eq(status.as_str()));
    }
    query
}

fn supplier_from_model(model: suppliers::Model) -> Result<Supplier, BackofficeError> {
    let status = SupplierStatus::parse(&model.status).ok_or_else(|| {
        anyhow::anyhow!("unknown status {:?} for supplier {}", model.status, model.id)
    })?;
    Ok(Supplier {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        address: model.address,
        status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

impl SupplierRepository for DbSupplierRepository {
    async fn list(
        &self,
        filter: &SupplierFilter,
        page: PageRequest,
    ) -> Result<Vec<Supplier>, BackofficeError> {
        let page = page.clamped();
        let models = supplier_query(filter)
            .order_by_desc(suppliers::Column::CreatedAt)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list suppliers")?;
        models.into_iter().map(supplier_from_model).collect()
    }

    async fn counts(&self, filter: &SupplierFilter) -> Result<SupplierCounts, BackofficeError> {
        let base = supplier_query(filter);
        let count_status = |status: SupplierStatus| {
            base.clone()
                .filter(suppliers::Column::Status.eq(status.as_str()))
                .count(&self.db)
        };
        let total = base
            .clone()
            .count(&self.db)
            .await
            .context("count suppliers")?;
        let active = count_status(SupplierStatus::Active)
            .await
            .context("count active suppliers")?;
        let inactive = count_status(SupplierStatus::Inactive)
            .await
            .context("count inactive suppliers")?;
        let suspended = count_status(SupplierStatus::Suspended)
            .await
            .context("count suspended suppliers")?;
        Ok(SupplierCounts {
            total,
            active,
            inactive,
            suspended,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Supplier>, BackofficeError> {
        let model = suppliers::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find supplier by id")?;
        model.map(supplier_from_model).transpose()
    }

    async fn create(&self, supplier: &Supplier) -> Result<(), BackofficeError> {
        suppliers::ActiveModel {
            id: Set(supplier.id),
            name: Set(supplier.name.clone()),
            email: Set(supplier.email.clone()),
            phone: Set(supplier.phone.clone()),
            address: Set(supplier.address.clone()),
            status: Set(supplier.status.as_str().to_owned()),
            created_at: Set(supplier.created_at),
            updated_at: Set(supplier.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create supplier")?;
        Ok(())
    }

    async fn update(&self, supplier: &Supplier) -> Result<bool, BackofficeError> {
        let result = suppliers::Entity::update_many()
            .filter(suppliers::Column::Id.eq(supplier.id))
            .col_expr(suppliers::Column::Name, Expr::value(supplier.name.clone()))
            .col_expr(suppliers::Column::Email, Expr::value(supplier.email.clone()))
            .col_expr(suppliers::Column::Phone, Expr::value(supplier.phone.clone()))
            .col_expr(
                suppliers::Column::Address,
                Expr::value(supplier.address.clone()),
            )
            .col_expr(
                suppliers::Column::Status,
                Expr::value(supplier.status.as_str()),
            )
            .col_expr(
                suppliers::Column::UpdatedAt,
                Expr::value(supplier.updated_at),
            )
            .exec(&self.db)
            .await
            .context("update supplier")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, BackofficeError> {
        let result = suppliers::Entity::delete_many()
            .filter(suppliers::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("delete supplier")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Category repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: DatabaseConnection,
}

fn category_query(filter: &CategoryFilter) -> Select<categories::Entity> {
    let mut query = categories::Entity::find();
    if let Some(term) = &filter.term {
        query = query.filter(
            Expr::col((categories::Entity, categories::Column::Name)).ilike(like_pattern(term)),
        );
    }
    query
}

fn category_from_model(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

impl CategoryRepository for DbCategoryRepository {
    async fn list(
        &self,
        filter: &CategoryFilter,
        page: PageRequest,
    ) -> Result<Vec<Category>, BackofficeError> {
        let page = page.clamped();
        let models = category_query(filter)
            .order_by_asc(categories::Column::Name)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list categories")?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn count(&self, filter: &CategoryFilter) -> Result<u64, BackofficeError> {
        category_query(filter)
            .count(&self.db)
            .await
            .context("count categories")
            .map_err(Into::into)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, BackofficeError> {
        let model = categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find category by id")?;
        Ok(model.map(category_from_model))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, BackofficeError> {
        let model = categories::Entity::find()
            .filter(categories::Column::Name.eq(name))
            .one(&self.db)
            .await
            .context("find category by name")?;
        Ok(model.map(category_from_model))
    }

    async fn create(&self, category: &Category) -> Result<(), BackofficeError> {
        categories::ActiveModel {
            id: Set(category.id),
            name: Set(category.name.clone()),
            created_at: Set(category.created_at),
            updated_at: Set(category.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create category")?;
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<bool, BackofficeError> {
        let result = categories::Entity::update_many()
            .filter(categories::Column::Id.eq(category.id))
            .col_expr(categories::Column::Name, Expr::value(category.name.clone()))
            .col_expr(
                categories::Column::UpdatedAt,
                Expr::value(category.updated_at),
            )
            .exec(&self.db)
            .await
            .context("update category")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, BackofficeError> {
        let result = categories::Entity::delete_many()
            .filter(categories::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("delete category")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Product repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProductRepository {
    pub db: DatabaseConnection,
}

fn product_query(filter: &ProductFilter) -> Select<products::Entity> {
    let mut query = products::Entity::find();
    if let Some(term) = &filter.term {
        query = query
            .filter(Expr::col((products::Entity, products::Column::Name)).ilike(like_pattern(term)));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(products::Column::CategoryId.eq(category_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(products::Column::Status.eq(status.as_str()));
    }
    query
}

fn product_from_model(model: products::Model) -> Result<Product, BackofficeError> {
    let status = ProductStatus::parse(&model.status).ok_or_else(|| {
        anyhow::anyhow!("unknown status {:?} for product {}", model.status, model.id)
    })?;
    Ok(Product {
        id: model.id,
        name: model.name,
        category_id: model.category_id,
        unit_price_cents: model.unit_price_cents,
        status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

impl ProductRepository for DbProductRepository {
    async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Vec<Product>, BackofficeError> {
        let page = page.clamped();
        let models = product_query(filter)
            .order_by_desc(products::Column::CreatedAt)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list products")?;
        models.into_iter().map(product_from_model).collect()
    }

    async fn counts(&self, filter: &ProductFilter) -> Result<ProductCounts, BackofficeError> {
        let base = product_query(filter);
        let count_status = |status: ProductStatus| {
            base.clone()
                .filter(products::Column::Status.eq(status.as_str()))
                .count(&self.db)
        };
        let total = base
            .clone()
            .count(&self.db)
            .await
            .context("count products")?;
        let active = count_status(ProductStatus::Active)
            .await
            .context("count active products")?;
        let out_of_stock = count_status(ProductStatus::OutOfStock)
            .await
            .context("count out-of-stock products")?;
        let inactive = count_status(ProductStatus::Inactive)
            .await
            .context("count inactive products")?;
        Ok(ProductCounts {
            total,
            active,
            out_of_stock,
            inactive,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, BackofficeError> {
        let model = products::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find product by id")?;
        model.map(product_from_model).transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, BackofficeError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = products::Entity::find()
            .filter(products::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find products by ids")?;
        models.into_iter().map(product_from_model).collect()
    }

    async fn create(&self, product: &Product) -> Result<(), BackofficeError> {
        products::ActiveModel {
            id: Set(product.id),
            name: Set(product.name.clone()),
            category_id: Set(product.category_id),
            unit_price_cents: Set(product.unit_price_cents),
            status: Set(product.status.as_str().to_owned()),
            created_at: Set(product.created_at),
            updated_at: Set(product.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create product")?;
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, BackofficeError> {
        let result = products::Entity::update_many()
            .filter(products::Column::Id.eq(product.id))
            .col_expr(products::Column::Name, Expr::value(product.name.clone()))
            .col_expr(
                products::Column::CategoryId,
                Expr::value(product.category_id),
            )
            .col_expr(
                products::Column::UnitPriceCents,
                Expr::value(product.unit_price_cents),
            )
            .col_expr(
                products::Column::Status,
                Expr::value(product.status.as_str()),
            )
            .col_expr(products::Column::UpdatedAt, Expr::value(product.updated_at))
            .exec(&self.db)
            .await
            .context("update product")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_cascading(&self, id: Uuid) -> Result<bool, BackofficeError> {
        // Items go first, then the affected sale totals are rederived,
        // then the product row — all or nothing.
        let deleted = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    let product = products::Entity::find_by_id(id).one(txn).await?;
                    if product.is_none() {
                        return Ok(false);
                    }

                    let affected: Vec<Uuid> = sale_items::Entity::find()
                        .filter(sale_items::Column::ProductId.eq(id))
                        .select_only()
                        .column(sale_items::Column::SaleId)
                        .distinct()
                        .into_tuple()
                        .all(txn)
                        .await?;

                    sale_items::Entity::delete_many()
                        .filter(sale_items::Column::ProductId.eq(id))
                        .exec(txn)
                        .await?;

                    for sale_id in affected {
                        recompute_total(txn, sale_id).await?;
                    }

                    products::Entity::delete_many()
                        .filter(products::Column::Id.eq(id))
                        .exec(txn)
                        .await?;

                    Ok(true)
                })
            })
            .await
            .context("delete product with sale items")?;
        Ok(deleted)
    }
}

// ── Sale repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSaleRepository {
    pub db: DatabaseConnection,
}

fn sale_query(filter: &SaleFilter) -> Select<sales::Entity> {
    let mut query = sales::Entity::find();
    if let Some(product_name) = &filter.product_name {
        query = query
            .join(JoinType::InnerJoin, sales::Relation::SaleItems.def())
            .join(JoinType::InnerJoin, sale_items::Relation::Products.def())
            .filter(
                Expr::col((products::Entity, products::Column::Name))
                    .ilike(like_pattern(product_name)),
            )
            .distinct();
    }
    if let Some(invoice) = &filter.invoice_number {
        query = query.filter(
            Expr::col((sales::Entity, sales::Column::InvoiceNumber)).ilike(like_pattern(invoice)),
        );
    }
    if let Some(cashier_id) = filter.cashier_id {
        query = query.filter(sales::Column::CashierId.eq(cashier_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(sales::Column::Status.eq(status.as_str()));
    }
    if let Some(from) = filter.date_from {
        query = query.filter(sales::Column::Date.gte(from.and_time(chrono::NaiveTime::MIN).and_utc()));
    }
    if let Some(to) = filter.date_to {
        if let Some(next) = to.succ_opt() {
            query =
                query.filter(sales::Column::Date.lt(next.and_time(chrono::NaiveTime::MIN).and_utc()));
        }
    }
    query
}

fn sale_from_model(model: sales::Model) -> Result<Sale, BackofficeError> {
    let status = SaleStatus::parse(&model.status)
        .ok_or_else(|| anyhow::anyhow!("unknown status {:?} for sale {}", model.status, model.id))?;
    Ok(Sale {
        id: model.id,
        invoice_number: model.invoice_number,
        date: model.date,
        cashier_id: model.cashier_id,
        status,
        discount_cents: model.discount_cents,
        total_amount_cents: model.total_amount_cents,
        created_at: model.created_at,
    })
}

/// Rederive a sale's stored total from its current item rows. Runs
/// inside the caller's transaction; the stored value is never reused.
async fn recompute_total<C: ConnectionTrait>(conn: &C, sale_id: Uuid) -> Result<i64, DbErr> {
    #[derive(FromQueryResult)]
    struct TotalRow {
        total: i64,
    }

    let total = TotalRow::find_by_statement(Statement::from_sql_and_values(
        conn.get_database_backend(),
        r#"
        SELECT COALESCE(SUM(quantity * unit_price_cents), 0)::BIGINT AS total
        FROM sale_items
        WHERE sale_id = $1
        "#,
        [sale_id.into()],
    ))
    .one(conn)
    .await?
    .map(|row| row.total)
    .unwrap_or(0);

    sales::Entity::update_many()
        .filter(sales::Column::Id.eq(sale_id))
        .col_expr(sales::Column::TotalAmountCents, Expr::value(total))
        .exec(conn)
        .await?;

    Ok(total)
}

async fn insert_items<C: ConnectionTrait>(
    conn: &C,
    sale_id: Uuid,
    items: &[SaleItemDraft],
) -> Result<(), DbErr> {
    for (index, item) in items.iter().enumerate() {
        sale_items::ActiveModel {
            id: Set(Uuid::now_v7()),
            sale_id: Set(sale_id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            unit_price_cents: Set(item.unit_price_cents),
            position: Set(index as i32),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

impl SaleRepository for DbSaleRepository {
    async fn list(
        &self,
        filter: &SaleFilter,
        page: PageRequest,
    ) -> Result<Vec<Sale>, BackofficeError> {
        let page = page.clamped();
        let models = sale_query(filter)
            .order_by_desc(sales::Column::Date)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list sales")?;
        models.into_iter().map(sale_from_model).collect()
    }

    async fn count(&self, filter: &SaleFilter) -> Result<u64, BackofficeError> {
        sale_query(filter)
            .count(&self.db)
            .await
            .context("count sales")
            .map_err(Into::into)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Sale>, BackofficeError> {
        let model = sales::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find sale by id")?;
        model.map(sale_from_model).transpose()
    }

    async fn find_by_invoice_number(
        &self,
        invoice_number: &str,
    ) -> Result<Option<Sale>, BackofficeError> {
        let model = sales::Entity::find()
            .filter(sales::Column::InvoiceNumber.eq(invoice_number))
            .one(&self.db)
            .await
            .context("find sale by invoice number")?;
        model.map(sale_from_model).transpose()
    }

    async fn load_with_items(&self, id: Uuid) -> Result<Option<SaleWithItems>, BackofficeError> {
        let Some(model) = sales::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("load sale")?
        else {
            return Ok(None);
        };
        let sale = sale_from_model(model)?;

        let cashier = users::Entity::find_by_id(sale.cashier_id)
            .one(&self.db)
            .await
            .context("load sale cashier")?;
        let cashier_name = cashier
            .map(|user| format!("{} {}", user.first_name, user.last_name))
            .unwrap_or_default();

        let rows = sale_items::Entity::find()
            .filter(sale_items::Column::SaleId.eq(id))
            .order_by_asc(sale_items::Column::Position)
            .find_also_related(products::Entity)
            .all(&self.db)
            .await
            .context("load sale items")?;
        let items = rows
            .into_iter()
            .map(|(item, product)| SaleItemLine {
                product_name: product.map(|p| p.name).unwrap_or_default(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
            })
            .collect();

        Ok(Some(SaleWithItems {
            sale,
            cashier_name,
            items,
        }))
    }

    async fn create_with_items(
        &self,
        sale: &Sale,
        items: &[SaleItemDraft],
    ) -> Result<i64, BackofficeError> {
        // Header, then items, then the total derived from the rows just
        // written — one transaction, so no reader ever observes a total
        // computed from a partial item set.
        let total = self
            .db
            .transaction::<_, i64, DbErr>(|txn| {
                let sale = sale.clone();
                let items = items.to_vec();
                Box::pin(async move {
                    sales::ActiveModel {
                        id: Set(sale.id),
                        invoice_number: Set(sale.invoice_number.clone()),
                        date: Set(sale.date),
                        cashier_id: Set(sale.cashier_id),
                        status: Set(sale.status.as_str().to_owned()),
                        discount_cents: Set(sale.discount_cents),
                        total_amount_cents: Set(0),
                        created_at: Set(sale.created_at),
                    }
                    .insert(txn)
                    .await?;

                    insert_items(txn, sale.id, &items).await?;
                    recompute_total(txn, sale.id).await
                })
            })
            .await
            .context("create sale with items")?;
        Ok(total)
    }

    async fn update_with_items(
        &self,
        sale: &Sale,
        items: &[SaleItemDraft],
    ) -> Result<Option<i64>, BackofficeError> {
        let total = self
            .db
            .transaction::<_, Option<i64>, DbErr>(|txn| {
                let sale = sale.clone();
                let items = items.to_vec();
                Box::pin(async move {
                    if sales::Entity::find_by_id(sale.id).one(txn).await?.is_none() {
                        return Ok(None);
                    }

                    sales::Entity::update_many()
                        .filter(sales::Column::Id.eq(sale.id))
                        .col_expr(
                            sales::Column::InvoiceNumber,
                            Expr::value(sale.invoice_number.clone()),
                        )
                        .col_expr(sales::Column::Date, Expr::value(sale.date))
                        .col_expr(sales::Column::CashierId, Expr::value(sale.cashier_id))
                        .col_expr(sales::Column::Status, Expr::value(sale.status.as_str()))
                        .col_expr(
                            sales::Column::DiscountCents,
                            Expr::value(sale.discount_cents),
                        )
                        .exec(txn)
                        .await?;

                    // Formset semantics: the submitted items replace the
                    // stored set wholesale.
                    sale_items::Entity::delete_many()
                        .filter(sale_items::Column::SaleId.eq(sale.id))
                        .exec(txn)
                        .await?;
                    insert_items(txn, sale.id, &items).await?;

                    let total = recompute_total(txn, sale.id).await?;
                    Ok(Some(total))
                })
            })
            .await
            .context("update sale with items")?;
        Ok(total)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, BackofficeError> {
        let result = sales::Entity::delete_many()
            .filter(sales::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("delete sale")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, BackofficeError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sales::Entity::delete_many()
            .filter(sales::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .context("bulk delete sales")?;
        Ok(result.rows_affected)
    }

    async fn revenue_cents(&self) -> Result<i64, BackofficeError> {
        #[derive(FromQueryResult)]
        struct TotalRow {
            total: i64,
        }

        let total = TotalRow::find_by_statement(Statement::from_string(
            self.db.get_database_backend(),
            "SELECT COALESCE(SUM(total_amount_cents), 0)::BIGINT AS total FROM sales",
        ))
        .one(&self.db)
        .await
        .context("sum sale totals")?
        .map(|row| row.total)
        .unwrap_or(0);
        Ok(total)
    }
}

// ── Activity log repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbActivityLogRepository {
    pub db: DatabaseConnection,
}

impl ActivityLogRepository for DbActivityLogRepository {
    async fn append(&self, entry: &ActivityLog) -> Result<(), BackofficeError> {
        activity_logs::ActiveModel {
            id: Set(entry.id),
            user_id: Set(entry.user_id),
            verb: Set(entry.verb.clone()),
            level: Set(entry.level.as_str().to_owned()),
            icon: Set(entry.icon.clone()),
            created_at: Set(entry.created_at),
        }
        .insert(&self.db)
        .await
        .context("append activity log entry")?;
        Ok(())
    }
}
