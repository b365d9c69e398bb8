use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{FromRow, Row, Sqlite};

use crate::database::manager::DatabaseError;
use crate::filter::{Filter, SqlParam};

/// Executes a [`Filter`] against the pool, binding its parameters in order.
pub struct QueryBuilder<T> {
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_all(&self, pool: &SqlitePool) -> Result<Vec<T>, DatabaseError> {
        let sql_result = self.filter.to_sql()?;
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        Ok(rows)
    }

    pub async fn select_optional(&self, pool: &SqlitePool) -> Result<Option<T>, DatabaseError> {
        let sql_result = self.filter.to_sql()?;
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_optional(pool).await?)
    }

    pub async fn count(&self, pool: &SqlitePool) -> Result<i64, DatabaseError> {
        let sql_result = self.filter.to_count_sql()?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    /// Total matching rows followed by one window of them
    pub async fn paginate(self, pool: &SqlitePool, limit: i64, offset: i64) -> Result<(Vec<T>, i64), DatabaseError> {
        let total = self.count(pool).await?;
        let page = Self::new(self.filter.limit(limit, Some(offset))?);
        let rows = page.select_all(pool).await?;
        Ok((rows, total))
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    v: &SqlParam,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match v {
        SqlParam::Null => q.bind(None::<String>),
        SqlParam::Integer(i) => q.bind(*i),
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Date(d) => q.bind(*d),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    v: &SqlParam,
) -> sqlx::query::QueryAs<'q, Sqlite, O, SqliteArguments<'q>>
where
    O: for<'r> FromRow<'r, SqliteRow>,
{
    match v {
        SqlParam::Null => q.bind(None::<String>),
        SqlParam::Integer(i) => q.bind(*i),
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Date(d) => q.bind(*d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterOrder, FilterWhere};
    use crate::database::models::{Employee, EmployeeSortField};
    use crate::testing::TestContext;

    #[tokio::test]
    async fn paginates_filtered_rows() {
        let ctx = TestContext::seeded().await;

        let mut w = FilterWhere::new();
        w.eq("department", "Engineering");
        let filter = Filter::new("*", "employees")
            .where_clause(w)
            .order(FilterOrder::resolve::<EmployeeSortField>(Some("salary"), Some("asc"), "id"));

        let (rows, total) = QueryBuilder::<Employee>::new(filter)
            .paginate(&ctx.pool, 3, 0)
            .await
            .unwrap();

        assert_eq!(total, 4);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|e| e.department == "Engineering"));
        let salaries: Vec<f64> = rows.iter().filter_map(|e| e.salary).collect();
        assert_eq!(salaries, vec![65000.0, 95000.0, 100000.0]);
    }

    #[tokio::test]
    async fn search_is_bound_not_interpolated() {
        let ctx = TestContext::seeded().await;

        let mut w = FilterWhere::new();
        w.contains_any(&["first_name", "last_name"], "' OR 1=1 --");
        let count = QueryBuilder::<Employee>::new(Filter::new("*", "employees").where_clause(w))
            .count(&ctx.pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
