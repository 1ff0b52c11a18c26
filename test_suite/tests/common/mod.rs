use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use findcrate::{ApiError, CriteriaRepository, FilterOptions};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use serde::{Deserialize, Serialize};

pub mod customer_entity;
pub mod device_entity;

pub use customer_entity::{
    CustomerNameRepository, CustomerRepository, Entity as CustomerEntity, Model as Customer,
    PlainCustomerRepository,
};
pub use device_entity::DeviceRepository;

#[allow(dead_code)]
pub const DEVICE_IDS: [&str; 2] = [
    "550e8400-e29b-41d4-a716-446655440000",
    "6fa459ea-ee8a-3ca4-894e-db77e160355e",
];

// (name, email, age, tier, deleted_at), inserted with ids 1..=6
const CUSTOMERS: [(&str, &str, i32, Option<&str>, Option<&str>); 6] = [
    ("Alice Smith", "alice@example.com", 34, Some("gold"), None),
    ("Bob Jones", "bob@example.com", 17, Some("silver"), None),
    ("Carol Smith", "carol@corp.test", 45, None, None),
    ("Dave Brown", "dave@corp.test", 65, Some("gold"), Some("2024-01-01")),
    ("Eve Adams", "eve@example.com", 18, Some("bronze"), None),
    ("Frank Smith", "frank@example.com", 29, Some("gold"), None),
];

#[allow(dead_code)]
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(CustomerEntity)))
        .await?;

    let rows = CUSTOMERS
        .iter()
        .map(|(name, email, age, tier, deleted_at)| customer_entity::ActiveModel {
            id: NotSet,
            name: Set((*name).to_string()),
            email: Set((*email).to_string()),
            age: Set(*age),
            tier: Set(tier.map(str::to_string)),
            deleted_at: Set(deleted_at.map(str::to_string)),
        });
    CustomerEntity::insert_many(rows).exec(&db).await?;

    Ok(db)
}

/// A `devices` table keyed by UUID, one row per entry of [`DEVICE_IDS`].
#[allow(dead_code)]
pub async fn setup_device_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(device_entity::Entity)))
        .await?;

    let rows = DEVICE_IDS.iter().enumerate().map(|(index, id)| device_entity::ActiveModel {
        id: Set(sea_orm::prelude::Uuid::parse_str(id).expect("valid uuid")),
        label: Set(format!("device-{index}")),
    });
    device_entity::Entity::insert_many(rows).exec(&db).await?;

    Ok(db)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerPage {
    pub items: Vec<Customer>,
    pub total: u64,
}

async fn list_customers(
    State(db): State<DatabaseConnection>,
    Query(params): Query<FilterOptions>,
) -> Result<Json<CustomerPage>, ApiError> {
    let query = params.to_list_query(CustomerRepository::DEFAULT_SEARCH_COMBINATOR)?;
    let (items, total) = CustomerRepository::list(&db, &query).await?;
    Ok(Json(CustomerPage { items, total }))
}

#[allow(dead_code)]
pub fn setup_test_app(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/customers", get(list_customers))
        .with_state(db)
}

/// Sorted ids of `customers`.
#[allow(dead_code)]
pub fn ids(customers: &[Customer]) -> Vec<i32> {
    let mut ids: Vec<i32> = customers.iter().map(|c| c.id).collect();
    ids.sort_unstable();
    ids
}
