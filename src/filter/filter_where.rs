use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo, SqlParam};

/// Accumulates AND-joined predicates and renders them with `?` placeholders.
#[derive(Debug, Clone, Default)]
pub struct FilterWhere {
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Exact match. A `Null` value renders as `IS NULL`.
    pub fn eq(&mut self, column: &'static str, value: impl Into<SqlParam>) -> &mut Self {
        self.push(vec![column], FilterOp::Eq, value.into())
    }

    /// Inequality. A `Null` value renders as `IS NOT NULL`.
    pub fn neq(&mut self, column: &'static str, value: impl Into<SqlParam>) -> &mut Self {
        self.push(vec![column], FilterOp::Neq, value.into())
    }

    pub fn lt(&mut self, column: &'static str, value: impl Into<SqlParam>) -> &mut Self {
        self.push(vec![column], FilterOp::Lt, value.into())
    }

    pub fn gte(&mut self, column: &'static str, value: impl Into<SqlParam>) -> &mut Self {
        self.push(vec![column], FilterOp::Gte, value.into())
    }

    /// Substring match of `term` against any of `columns`. Blank terms add nothing.
    pub fn contains_any(&mut self, columns: &[&'static str], term: &str) -> &mut Self {
        if term.is_empty() || columns.is_empty() {
            return self;
        }
        self.push(columns.to_vec(), FilterOp::Contains, SqlParam::Text(format!("%{}%", term)))
    }

    fn push(&mut self, columns: Vec<&'static str>, operator: FilterOp, data: SqlParam) -> &mut Self {
        self.conditions.push(FilterWhereInfo { columns, operator, data });
        self
    }

    /// Render `(clause, params)`. An empty filter renders `1=1`.
    pub fn generate(&self) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut params = Vec::new();
        let mut sql_conditions = Vec::with_capacity(self.conditions.len());

        for condition in &self.conditions {
            for column in &condition.columns {
                validate_column(column)?;
            }
            sql_conditions.push(Self::build_sql_condition(condition, &mut params)?);
        }

        let where_clause = if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        Ok((where_clause, params))
    }

    fn build_sql_condition(condition: &FilterWhereInfo, params: &mut Vec<SqlParam>) -> Result<String, FilterError> {
        let column = condition.columns[0];
        let is_null = matches!(condition.data, SqlParam::Null);

        let sql = match condition.operator {
            FilterOp::Eq if is_null => format!("{} IS NULL", column),
            FilterOp::Neq if is_null => format!("{} IS NOT NULL", column),
            FilterOp::Lt | FilterOp::Gte if is_null => {
                return Err(FilterError::InvalidOperatorData(format!(
                    "range comparison on {} requires a value",
                    column
                )));
            }
            FilterOp::Eq => Self::binary(column, "=", &condition.data, params),
            FilterOp::Neq => Self::binary(column, "<>", &condition.data, params),
            FilterOp::Lt => Self::binary(column, "<", &condition.data, params),
            FilterOp::Gte => Self::binary(column, ">=", &condition.data, params),
            FilterOp::Contains => {
                let parts: Vec<String> = condition
                    .columns
                    .iter()
                    .map(|c| Self::binary(c, "LIKE", &condition.data, params))
                    .collect();
                format!("({})", parts.join(" OR "))
            }
        };
        Ok(sql)
    }

    fn binary(column: &str, op: &str, value: &SqlParam, params: &mut Vec<SqlParam>) -> String {
        params.push(value.clone());
        format!("{} {} ?", column, op)
    }
}

/// Column references are `name` or `alias.name` made of `[A-Za-z0-9_]`
pub(crate) fn validate_column(column: &str) -> Result<(), FilterError> {
    let valid_part = |p: &str| {
        !p.is_empty()
            && p.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !p.starts_with(|c: char| c.is_ascii_digit())
    };
    let mut parts = column.split('.');
    let ok = match (parts.next(), parts.next(), parts.next()) {
        (Some(name), None, None) => valid_part(name),
        (Some(alias), Some(name), None) => valid_part(alias) && valid_part(name),
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(FilterError::InvalidColumn(column.to_string()))
    }
}
