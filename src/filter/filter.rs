use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOrderInfo, SqlResult};

/// A single-table (optionally joined) SELECT with a parameterized predicate,
/// allow-listed ordering and LIMIT/OFFSET paging.
///
/// `select` and `from` are static SQL fragments owned by the calling
/// service; only values supplied through [`FilterWhere`] are client data and
/// those are always bound.
pub struct Filter {
    select: &'static str,
    from: &'static str,
    where_data: FilterWhere,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(select: &'static str, from: &'static str) -> Self {
        Self {
            select,
            from,
            where_data: FilterWhere::new(),
            order_data: vec![],
            limit: None,
            offset: None,
        }
    }

    pub fn where_clause(mut self, conditions: FilterWhere) -> Self {
        self.where_data = conditions;
        self
    }

    pub fn order(mut self, order: Vec<FilterOrderInfo>) -> Self {
        self.order_data = order;
        self
    }

    pub fn limit(mut self, limit: i64, offset: Option<i64>) -> Result<Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }
        self.limit = Some(limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = self.where_data.generate()?;
        let order_clause = FilterOrder::generate(&self.order_data)?;
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {}", self.select),
            format!("FROM {}", self.from),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    /// Same predicate as [`Filter::to_sql`] without ordering or paging
    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = self.where_data.generate()?;
        let query = format!("SELECT COUNT(*) AS count FROM {} WHERE {}", self.from, where_clause);
        Ok(SqlResult { query, params })
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::{SortDirection, SqlParam};

    #[test]
    fn renders_full_select_and_matching_count() {
        let mut w = FilterWhere::new();
        w.eq("t.status", "pending");

        let filter = Filter::new("t.*", "tasks t LEFT JOIN employees e ON t.employee_id = e.id")
            .where_clause(w)
            .order(vec![FilterOrderInfo { column: "t.due_date", sort: SortDirection::Asc }])
            .limit(10, Some(20))
            .unwrap();

        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT t.* FROM tasks t LEFT JOIN employees e ON t.employee_id = e.id \
             WHERE t.status = ? ORDER BY t.due_date ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(sql.params, vec![SqlParam::Text("pending".into())]);

        let count = filter.to_count_sql().unwrap();
        assert_eq!(
            count.query,
            "SELECT COUNT(*) AS count FROM tasks t LEFT JOIN employees e ON t.employee_id = e.id WHERE t.status = ?"
        );
        assert_eq!(count.params, sql.params);
    }

    #[test]
    fn negative_paging_is_rejected() {
        assert!(Filter::new("*", "employees").limit(-1, None).is_err());
        assert!(Filter::new("*", "employees").limit(10, Some(-5)).is_err());
    }
}
