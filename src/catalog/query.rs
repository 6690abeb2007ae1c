use crate::common::error::{BackendError, Result};

/// The closed set of queryable catalog columns. Caller-supplied field names
/// are parsed against this enum and rejected otherwise; a raw string is
/// never interpolated into an identifier position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogColumn {
    Id,
    Code,
    Description,
    Category,
    SubCategory,
    Anatomy,
}

impl CatalogColumn {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "id" => Ok(Self::Id),
            "code" => Ok(Self::Code),
            "description" => Ok(Self::Description),
            "category" => Ok(Self::Category),
            "sub_category" => Ok(Self::SubCategory),
            "anatomy" => Ok(Self::Anatomy),
            other => Err(BackendError::Validation(format!(
                "Unknown catalog field: {other}"
            ))),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Code => "code",
            Self::Description => "description",
            Self::Category => "category",
            Self::SubCategory => "sub_category",
            Self::Anatomy => "anatomy",
        }
    }
}

/// Columns eligible for distinct-value facet counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetColumn {
    Category,
    SubCategory,
    Anatomy,
}

impl FacetColumn {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::SubCategory => "sub_category",
            Self::Anatomy => "anatomy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything that isn't `desc` (case-insensitive) sorts ascending.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One catalog query: optional field filter, optional free-text search,
/// sort column/direction, and 1-based pagination.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    /// Substring match on a single column.
    pub filter: Option<(CatalogColumn, String)>,
    /// Exact match on `code` OR substring match on `description`.
    pub search: Option<String>,
    /// Explicit sort column; defaults to the filter column, then `id`.
    pub order_by: Option<CatalogColumn>,
    pub sort: SortOrder,
    pub page: u64,
    pub page_size: u64,
}

/// Upper bound on `page` and `page_size`. Keeps `offset()` well inside
/// both `u64` and SQLite's signed 64-bit bind range even at the extremes.
const MAX_PAGE_INPUT: u64 = i32::MAX as u64;

impl QuerySpec {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            filter: None,
            search: None,
            order_by: None,
            sort: SortOrder::Asc,
            page: page.clamp(1, MAX_PAGE_INPUT),
            page_size: page_size.clamp(1, MAX_PAGE_INPUT),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    pub fn order_column(&self) -> CatalogColumn {
        self.order_by
            .or_else(|| self.filter.as_ref().map(|(col, _)| *col))
            .unwrap_or(CatalogColumn::Id)
    }
}

pub(crate) struct BuiltQuery {
    pub count_sql: String,
    pub fetch_sql: String,
    /// WHERE-clause bind values, shared by both statements. The fetch
    /// statement additionally binds LIMIT and OFFSET at the end.
    pub params: Vec<libsql::Value>,
}

/// Build the COUNT and SELECT statements for a [`QuerySpec`]. All
/// identifiers come from the column enums; all values are bound.
pub(crate) fn build_catalog_query(spec: &QuerySpec) -> BuiltQuery {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if let Some((col, value)) = &spec.filter {
        clauses.push(format!("{} LIKE ?", col.as_sql()));
        params.push(libsql::Value::from(format!("%{value}%")));
    }

    if let Some(query) = &spec.search {
        clauses.push("(code = ? OR description LIKE ?)".to_string());
        params.push(libsql::Value::from(query.clone()));
        params.push(libsql::Value::from(format!("%{query}%")));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) AS total FROM cpt_data{where_clause}");
    let fetch_sql = format!(
        "SELECT id, code, description, category, sub_category, anatomy \
         FROM cpt_data{where_clause} ORDER BY {} {} LIMIT ? OFFSET ?",
        spec.order_column().as_sql(),
        spec.sort.as_sql()
    );

    BuiltQuery {
        count_sql,
        fetch_sql,
        params,
    }
}

/// `ceil(total / page_size)` without floating point.
pub(crate) fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_columns() {
        assert_eq!(CatalogColumn::parse("category").unwrap(), CatalogColumn::Category);
        assert_eq!(
            CatalogColumn::parse("sub_category").unwrap(),
            CatalogColumn::SubCategory
        );
        assert_eq!(CatalogColumn::parse("anatomy").unwrap(), CatalogColumn::Anatomy);
    }

    #[test]
    fn parse_rejects_unknown_columns() {
        assert!(CatalogColumn::parse("category; DROP TABLE cpt_data").is_err());
        assert!(CatalogColumn::parse("Category").is_err());
        assert!(CatalogColumn::parse("").is_err());
    }

    #[test]
    fn sort_order_defaults_to_asc() {
        assert_eq!(SortOrder::parse("DESC"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("ASC"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("sideways"), SortOrder::Asc);
        assert_eq!(SortOrder::parse(""), SortOrder::Asc);
    }

    #[test]
    fn unfiltered_query_sorts_by_id() {
        let spec = QuerySpec::new(1, 10);
        let built = build_catalog_query(&spec);
        assert_eq!(built.count_sql, "SELECT COUNT(*) AS total FROM cpt_data");
        assert!(built.fetch_sql.contains("ORDER BY id ASC"));
        assert!(built.params.is_empty());
    }

    #[test]
    fn filter_sorts_by_the_filtered_column() {
        let mut spec = QuerySpec::new(2, 25);
        spec.filter = Some((CatalogColumn::Anatomy, "knee".to_string()));
        spec.sort = SortOrder::Desc;
        let built = build_catalog_query(&spec);
        assert!(built.count_sql.ends_with("WHERE anatomy LIKE ?"));
        assert!(built.fetch_sql.contains("WHERE anatomy LIKE ? ORDER BY anatomy DESC"));
        assert_eq!(built.params.len(), 1);
        assert_eq!(built.params[0], libsql::Value::from("%knee%".to_string()));
    }

    #[test]
    fn search_matches_code_exactly_or_description_substring() {
        let mut spec = QuerySpec::new(1, 10);
        spec.search = Some("29881".to_string());
        spec.order_by = Some(CatalogColumn::Code);
        let built = build_catalog_query(&spec);
        assert!(built
            .count_sql
            .ends_with("WHERE (code = ? OR description LIKE ?)"));
        assert!(built.fetch_sql.contains("ORDER BY code ASC"));
        assert_eq!(
            built.params,
            vec![
                libsql::Value::from("29881".to_string()),
                libsql::Value::from("%29881%".to_string()),
            ]
        );
    }

    #[test]
    fn filter_and_search_combine_with_and() {
        let mut spec = QuerySpec::new(1, 10);
        spec.filter = Some((CatalogColumn::Category, "Surgery".to_string()));
        spec.search = Some("knee".to_string());
        let built = build_catalog_query(&spec);
        assert!(built
            .count_sql
            .ends_with("WHERE category LIKE ? AND (code = ? OR description LIKE ?)"));
        assert_eq!(built.params.len(), 3);
    }

    #[test]
    fn page_and_page_size_are_clamped_to_one() {
        let spec = QuerySpec::new(0, 0);
        assert_eq!(spec.page, 1);
        assert_eq!(spec.page_size, 1);
        assert_eq!(spec.offset(), 0);
    }

    #[test]
    fn extreme_page_numbers_do_not_overflow_the_offset() {
        let spec = QuerySpec::new(u64::MAX, 10);
        assert_eq!(spec.page, MAX_PAGE_INPUT);
        assert_eq!(spec.offset(), (MAX_PAGE_INPUT - 1) * 10);
        assert!(spec.offset() <= i64::MAX as u64);

        let spec = QuerySpec::new(u64::MAX, u64::MAX);
        assert!(spec.offset() <= i64::MAX as u64);
    }

    #[test]
    fn total_pages_is_a_ceiling() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 10), 10);
    }
}
