use chrono::NaiveDate;

/// A bound SQL parameter. Values never get interpolated into SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Integer(i64),
    Text(String),
    Date(NaiveDate),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Integer(v)
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<NaiveDate> for SqlParam {
    fn from(v: NaiveDate) -> Self {
        SqlParam::Date(v)
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlParam::Null)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Eq,
    Neq,
    Lt,
    Gte,
    /// `LIKE '%term%'` against any one of several columns
    Contains,
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub columns: Vec<&'static str>,
    pub operator: FilterOp,
    pub data: SqlParam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// `ASC` in any case means ascending; anything else (including nothing) is descending
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some(v) if v.trim().eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }
}

/// An allow-listed sort key. Only the enumerated columns can ever reach ORDER BY.
pub trait SortField: Copy + Sized {
    /// Fallback when the requested key is missing or unknown
    const DEFAULT: Self;

    /// Qualified SQL column for this key
    fn column(self) -> &'static str;

    /// Match a client-supplied key against the allow-list
    fn from_key(key: &str) -> Option<Self>;

    /// Unknown keys fall back to `DEFAULT`
    fn parse_or_default(key: Option<&str>) -> Self {
        key.and_then(|k| Self::from_key(k.trim())).unwrap_or(Self::DEFAULT)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
