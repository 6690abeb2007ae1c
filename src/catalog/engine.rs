use std::sync::Arc;

use tracing::debug;

use crate::catalog::query::{build_catalog_query, total_pages, FacetColumn, QuerySpec, SortOrder};
use crate::catalog::CatalogColumn;
use crate::common::error::Result;
use crate::db::{opt_text, DatabaseManager};
use crate::domain::{CptRecord, CptSummary, FacetCount, FacetCounts};

/// One page of query results. `Empty` replaces the legacy `data: null`
/// sentinel: no matching rows at the requested page, with the page count
/// for the overall match still reported.
#[derive(Debug, Clone, PartialEq)]
pub enum PageResult<T> {
    Found { rows: Vec<T>, total_pages: u64 },
    Empty { total_pages: u64 },
}

impl<T> PageResult<T> {
    pub fn total_pages(&self) -> u64 {
        match self {
            Self::Found { total_pages, .. } | Self::Empty { total_pages } => *total_pages,
        }
    }

    fn from_rows(rows: Vec<T>, total_pages: u64) -> Self {
        if rows.is_empty() {
            Self::Empty { total_pages }
        } else {
            Self::Found { rows, total_pages }
        }
    }
}

/// Paginated, filterable, searchable access to the CPT catalog, plus
/// distinct-value facet counts. Stateless: every call is fully determined
/// by its inputs and current table contents.
pub struct CatalogEngine {
    db: Arc<DatabaseManager>,
}

impl CatalogEngine {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// The canonical catalog query: filter and search compose with AND,
    /// results are sorted and paginated. The other fetch operations are
    /// special cases of this one.
    pub async fn fetch_data(&self, spec: &QuerySpec) -> Result<PageResult<CptRecord>> {
        let built = build_catalog_query(spec);
        let conn = self.db.get_connection().await?;

        let mut count_rows = conn
            .query(&built.count_sql, libsql::params_from_iter(built.params.clone()))
            .await?;
        let total = match count_rows.next().await? {
            Some(row) => row.get::<i64>(0)?.max(0) as u64,
            None => 0,
        };
        let total_pages = total_pages(total, spec.page_size);

        let mut params = built.params;
        params.push(libsql::Value::from(spec.page_size as i64));
        params.push(libsql::Value::from(spec.offset() as i64));

        let mut rows = conn
            .query(&built.fetch_sql, libsql::params_from_iter(params))
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(CptRecord {
                id: row.get::<i64>(0)?,
                code: row.get::<String>(1)?,
                description: row.get::<String>(2)?,
                category: opt_text(&row, 3)?,
                sub_category: opt_text(&row, 4)?,
                anatomy: opt_text(&row, 5)?,
            });
        }

        debug!(
            total,
            page = spec.page,
            page_size = spec.page_size,
            returned = records.len(),
            "catalog query"
        );

        Ok(PageResult::from_rows(records, total_pages))
    }

    /// Rows where `code` equals `query` exactly or `description` contains
    /// it, sorted by `code`.
    pub async fn search_code_or_description(
        &self,
        query: &str,
        page: u64,
        page_size: u64,
        sort: SortOrder,
    ) -> Result<PageResult<CptRecord>> {
        let mut spec = QuerySpec::new(page, page_size);
        spec.search = Some(query.to_string());
        spec.order_by = Some(CatalogColumn::Code);
        spec.sort = sort;
        self.fetch_data(&spec).await
    }

    /// Rows where `field` contains `value` as a substring, sorted by the
    /// field itself.
    pub async fn filter_by_field(
        &self,
        field: CatalogColumn,
        value: &str,
        sort: SortOrder,
        page: u64,
        page_size: u64,
    ) -> Result<PageResult<CptRecord>> {
        let mut spec = QuerySpec::new(page, page_size);
        spec.filter = Some((field, value.to_string()));
        spec.sort = sort;
        self.fetch_data(&spec).await
    }

    /// The `id, code, description` projection over the whole catalog.
    /// Sorted by `id` so pages are deterministic.
    pub async fn fetch_codes_and_description(
        &self,
        page: u64,
        page_size: u64,
    ) -> Result<PageResult<CptSummary>> {
        let spec = QuerySpec::new(page, page_size);
        let conn = self.db.get_connection().await?;

        let mut count_rows = conn
            .query("SELECT COUNT(*) AS total FROM cpt_data", ())
            .await?;
        let total = match count_rows.next().await? {
            Some(row) => row.get::<i64>(0)?.max(0) as u64,
            None => 0,
        };
        let total_pages = total_pages(total, spec.page_size);

        let mut rows = conn
            .query(
                "SELECT id, code, description FROM cpt_data ORDER BY id ASC LIMIT ? OFFSET ?",
                libsql::params![spec.page_size as i64, spec.offset() as i64],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(CptSummary {
                id: row.get::<i64>(0)?,
                code: row.get::<String>(1)?,
                description: row.get::<String>(2)?,
            });
        }

        Ok(PageResult::from_rows(records, total_pages))
    }

    /// Distinct non-null, non-blank values of a facet column with their
    /// occurrence counts, in storage grouping order.
    pub async fn fetch_distinct_values(&self, facet: FacetColumn) -> Result<Vec<FacetCount>> {
        let col = facet.as_sql();
        let sql = format!(
            "SELECT {col} AS value, COUNT({col}) AS count FROM cpt_data \
             WHERE {col} IS NOT NULL AND TRIM({col}) <> '' GROUP BY {col}"
        );

        let conn = self.db.get_connection().await?;
        let mut rows = conn.query(&sql, ()).await?;

        let mut counts = Vec::new();
        while let Some(row) = rows.next().await? {
            counts.push(FacetCount {
                value: row.get::<String>(0)?,
                count: row.get::<i64>(1)?,
            });
        }

        Ok(counts)
    }

    /// All three facet summaries, fetched concurrently.
    pub async fn fetch_facets(&self) -> Result<FacetCounts> {
        let (categories, sub_categories, anatomies) = tokio::try_join!(
            self.fetch_distinct_values(FacetColumn::Category),
            self.fetch_distinct_values(FacetColumn::SubCategory),
            self.fetch_distinct_values(FacetColumn::Anatomy),
        )?;

        Ok(FacetCounts {
            categories,
            sub_categories,
            anatomies,
        })
    }
}
