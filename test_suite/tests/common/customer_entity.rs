use findcrate::CriteriaRepository;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub tier: Option<String>,
    pub deleted_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Searches name and email.
pub struct CustomerRepository;

impl CriteriaRepository for CustomerRepository {
    type EntityType = Entity;
    type ColumnType = Column;

    const ID_COLUMN: Self::ColumnType = Column::Id;

    fn search_columns() -> Vec<&'static str> {
        vec!["name", "email"]
    }
}

/// Searches name only, all terms required.
pub struct CustomerNameRepository;

impl CriteriaRepository for CustomerNameRepository {
    type EntityType = Entity;
    type ColumnType = Column;

    const ID_COLUMN: Self::ColumnType = Column::Id;
    const DEFAULT_SEARCH_COMBINATOR: findcrate::Combinator = findcrate::Combinator::And;

    fn search_columns() -> Vec<&'static str> {
        vec!["name"]
    }
}

/// No search columns.
pub struct PlainCustomerRepository;

impl CriteriaRepository for PlainCustomerRepository {
    type EntityType = Entity;
    type ColumnType = Column;

    const ID_COLUMN: Self::ColumnType = Column::Id;
}
