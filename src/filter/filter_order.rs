use super::error::FilterError;
use super::filter_where::validate_column;
use super::types::{FilterOrderInfo, SortDirection, SortField};

pub struct FilterOrder;

impl FilterOrder {
    /// Resolve client `sortBy`/`sortOrder` into order terms. The primary key
    /// follows in the same direction so rows with equal sort values keep a
    /// stable position across pages.
    pub fn resolve<F: SortField>(
        sort_by: Option<&str>,
        sort_order: Option<&str>,
        tiebreak: &'static str,
    ) -> Vec<FilterOrderInfo> {
        let field = F::parse_or_default(sort_by);
        let sort = SortDirection::parse(sort_order);
        let mut out = vec![FilterOrderInfo { column: field.column(), sort }];
        if field.column() != tiebreak {
            out.push(FilterOrderInfo { column: tiebreak, sort });
        }
        out
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> Result<String, FilterError> {
        if infos.is_empty() {
            return Ok(String::new());
        }
        let mut parts = Vec::with_capacity(infos.len());
        for info in infos {
            validate_column(info.column)?;
            parts.push(format!("{} {}", info.column, info.sort.to_sql()));
        }
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }
}
