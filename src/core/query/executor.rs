//! Query planning and execution

use super::filter::CompiledFilter;
use super::params::QueryParams;
use super::sort::SortKey;
use super::spec::QueryModel;
use crate::core::error::StoreError;
use crate::core::service::Queryable;

/// A query resolved against an entity's [`QuerySpec`](super::QuerySpec)
///
/// Holds the compiled filter, the selected sort key (if the requested name
/// is known) and the minimal set of load paths both need.
pub struct QueryPlan<'s, E> {
    filter: CompiledFilter<'s, E>,
    sort: Option<&'s SortKey<E>>,
    ascending: bool,
    includes: Vec<&'static str>,
}

impl<E: QueryModel> QueryPlan<'static, E> {
    /// Resolve raw parameters against `E`'s spec
    pub fn new(params: &QueryParams) -> Self {
        let spec = E::query_spec();
        let filter = spec.filters().compile(params);
        let sort = spec.sorts().select(params.sort_by.as_deref());

        let required = filter
            .required_paths()
            .chain(sort.into_iter().flat_map(|key| key.required_paths().iter().copied()));
        let includes = spec.loads().resolve(required);

        QueryPlan {
            filter,
            sort,
            ascending: params.ascending,
            includes,
        }
    }
}

impl<E: QueryModel> QueryPlan<'_, E> {
    /// Load paths the plan needs
    pub fn includes(&self) -> &[&'static str] {
        &self.includes
    }

    /// Names of the filters that narrow the result
    pub fn applied_filters(&self) -> Vec<&'static str> {
        self.filter.applied()
    }

    /// The sort key that will be applied, if any
    pub fn sort_key(&self) -> Option<&'static str> {
        self.sort.map(|key| key.name())
    }

    /// Narrow and order already-loaded rows
    pub fn apply(&self, rows: Vec<E>) -> Vec<E> {
        let mut rows: Vec<E> = rows
            .into_iter()
            .filter(|row| self.filter.matches(row))
            .collect();
        if let Some(key) = self.sort {
            key.apply(&mut rows, self.ascending);
        }
        rows
    }
}

/// Runs list queries: load → filter → sort → materialise
///
/// Stateless; every call produces a fresh result from the session it is given.
pub struct QueryExecutor;

impl QueryExecutor {
    /// Execute a list query for entity kind `E`.
    ///
    /// Malformed filter values and unknown sort keys degrade silently;
    /// store failures propagate as [`StoreError`].
    pub async fn execute<E, S>(session: &S, params: &QueryParams) -> Result<Vec<E>, StoreError>
    where
        E: QueryModel,
        S: Queryable<E> + ?Sized,
    {
        let plan = QueryPlan::<E>::new(params);

        tracing::debug!(
            entity = E::query_spec().entity_type(),
            filters = ?plan.applied_filters(),
            sort = ?plan.sort_key(),
            ascending = params.ascending,
            includes = ?plan.includes(),
            "executing query"
        );

        let rows = session.fetch(plan.includes()).await?;
        let loaded = rows.len();
        let rows = plan.apply(rows);

        tracing::debug!(
            entity = E::query_spec().entity_type(),
            loaded,
            returned = rows.len(),
            "query complete"
        );

        Ok(rows)
    }

    /// Like [`execute`](Self::execute), but abandons the query once `cancel`
    /// completes and reports [`StoreError::Cancelled`].
    ///
    /// The in-flight store access is dropped, releasing its session guard.
    pub async fn execute_until<E, S, C>(
        session: &S,
        params: &QueryParams,
        cancel: C,
    ) -> Result<Vec<E>, StoreError>
    where
        E: QueryModel,
        S: Queryable<E> + ?Sized,
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                tracing::debug!(entity = E::query_spec().entity_type(), "query cancelled");
                Err(StoreError::Cancelled {
                    operation: format!("{} query", E::query_spec().entity_type()),
                })
            }
            result = Self::execute::<E, S>(session, params) => result,
        }
    }

    /// Point lookup with every declared path loaded
    pub async fn find<E, S>(session: &S, id: i64) -> Result<Option<E>, StoreError>
    where
        E: QueryModel,
        S: Queryable<E> + ?Sized,
    {
        let includes = E::query_spec().loads().all();
        session.find(id, &includes).await
    }
}
