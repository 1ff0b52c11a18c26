use async_trait::async_trait;
use sea_orm::{
    DatabaseBackend, DatabaseConnection, EntityName, EntityTrait, PaginatorTrait, PrimaryKeyTrait,
    QueryOrder, QuerySelect, Select, entity::prelude::*,
};

use crate::criteria::{
    Combinator, Criteria, CriteriaCompiler, OrderBy, Parameters, SearchTermSet, apply_criteria,
    apply_order_by, apply_search_terms,
};
use crate::errors::{CriteriaError, RepositoryError};
use crate::models::ListQuery;

/// Primary key value of an entity, as returned by
/// [`CriteriaRepository::find_ids`].
pub type PrimaryKeyValue<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Criteria-driven reads for one entity.
///
/// Implementors only name the entity, its id column and (optionally) the
/// columns free-text search runs against; every query method has a default.
///
/// ```rust,ignore
/// struct CustomerRepository;
///
/// impl CriteriaRepository for CustomerRepository {
///     type EntityType = customer::Entity;
///     type ColumnType = customer::Column;
///
///     const ID_COLUMN: Self::ColumnType = customer::Column::Id;
///
///     fn search_columns() -> Vec<&'static str> {
///         vec!["name", "email"]
///     }
/// }
/// ```
#[async_trait]
pub trait CriteriaRepository: Sized + Send + Sync
where
    Self::EntityType: EntityTrait + Sync,
    <Self::EntityType as EntityTrait>::Model: Sync,
{
    type EntityType: EntityTrait + Sync;
    type ColumnType: ColumnTrait + std::fmt::Debug;

    const ID_COLUMN: Self::ColumnType;
    /// Joins search terms when a request does not say otherwise.
    const DEFAULT_SEARCH_COMBINATOR: Combinator = Combinator::Or;

    /// Qualifier for bare field names. Defaults to the entity's table name,
    /// which is what Sea-ORM selects from.
    #[must_use]
    fn alias() -> String {
        Self::EntityType::default().table_name().to_owned()
    }

    /// Columns free-text search matches against. No columns, no search.
    #[must_use]
    fn search_columns() -> Vec<&'static str> {
        Vec::new()
    }

    #[must_use]
    fn compiler(backend: DatabaseBackend) -> CriteriaCompiler {
        CriteriaCompiler::new(Self::alias(), backend)
    }

    /// The filtered `SELECT` every other method starts from: criteria first,
    /// then one AND-ed group per search set.
    ///
    /// # Errors
    ///
    /// [`CriteriaError`] when the tree does not compile. Nothing is bound in
    /// that case.
    fn select_with(
        backend: DatabaseBackend,
        criteria: &Criteria,
        search: &[SearchTermSet],
    ) -> Result<Select<Self::EntityType>, CriteriaError> {
        let compiler = Self::compiler(backend);
        let mut parameters = Parameters::new();
        let query = apply_criteria(Self::EntityType::find(), &compiler, &mut parameters, criteria)?;
        apply_search_terms(query, &compiler, &mut parameters, &Self::search_columns(), search)
    }

    /// Number of rows matching `criteria` and `search`.
    async fn count(
        db: &DatabaseConnection,
        criteria: &Criteria,
        search: &[SearchTermSet],
    ) -> Result<u64, RepositoryError> {
        let query = Self::select_with(db.get_database_backend(), criteria, search)?;
        Ok(query.count(db).await?)
    }

    /// Matching rows, ordered and windowed when asked to.
    async fn find_with_search(
        db: &DatabaseConnection,
        search: &[SearchTermSet],
        criteria: &Criteria,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<<Self::EntityType as EntityTrait>::Model>, RepositoryError> {
        let backend = db.get_database_backend();
        let mut query = Self::select_with(backend, criteria, search)?;

        if let Some(order_by) = order_by {
            query = apply_order_by(query, &Self::compiler(backend), order_by);
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        if let Some(offset) = offset {
            query = query.offset(offset);
        }

        Ok(query.all(db).await?)
    }

    /// Distinct ids of matching rows, ascending. Only the id column is read.
    async fn find_ids(
        db: &DatabaseConnection,
        criteria: &Criteria,
        search: &[SearchTermSet],
    ) -> Result<Vec<PrimaryKeyValue<Self::EntityType>>, RepositoryError> {
        let ids = Self::select_with(db.get_database_backend(), criteria, search)?
            .select_only()
            .column(Self::ID_COLUMN)
            .distinct()
            .order_by_asc(Self::ID_COLUMN)
            .into_tuple::<PrimaryKeyValue<Self::EntityType>>()
            .all(db)
            .await?;
        Ok(ids)
    }

    /// One page of a list request together with the unpaginated total.
    async fn list(
        db: &DatabaseConnection,
        query: &ListQuery,
    ) -> Result<(Vec<<Self::EntityType as EntityTrait>::Model>, u64), RepositoryError> {
        let total = Self::count(db, &query.criteria, &query.search).await?;
        let items = Self::find_with_search(
            db,
            &query.search,
            &query.criteria,
            Some(&query.order_by),
            query.limit,
            query.offset,
        )
        .await?;
        Ok((items, total))
    }
}
