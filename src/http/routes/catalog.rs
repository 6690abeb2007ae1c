use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::catalog::{CatalogColumn, PageResult, QuerySpec, SortOrder};
use crate::http::error::ApiError;
use crate::http::routes::parse_or;
use crate::http::state::AppState;

/// Query strings arrive as text; numeric fields are parsed defensively
/// with fallbacks rather than rejected.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub q: Option<String>,
    #[serde(rename = "searchTerm")]
    pub search_term: Option<String>,
    #[serde(rename = "fieldName")]
    pub field_name: Option<String>,
    #[serde(rename = "fieldValue")]
    pub field_value: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

impl CatalogQuery {
    fn page(&self) -> u64 {
        parse_or(self.page.as_deref(), 1)
    }

    fn page_size(&self, default: u64) -> u64 {
        parse_or(self.page_size.as_deref(), default)
    }

    fn sort(&self) -> SortOrder {
        self.order
            .as_deref()
            .map(SortOrder::parse)
            .unwrap_or_default()
    }
}

pub async fn fetch_basic_cpt_data(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Response, ApiError> {
    let page = query.page();
    let page_size = query.page_size(state.config.catalog.page_size);

    let result = state
        .catalog
        .fetch_codes_and_description(page, page_size)
        .await
        .map_err(|e| ApiError::from_backend("Error fetching basic CPT data", e))?;

    match result {
        PageResult::Found { rows, total_pages } => Ok(Json(json!({
            "data": rows,
            "totalPages": total_pages,
            "message": "Basic CPT data fetched successfully.",
        }))
        .into_response()),
        PageResult::Empty { .. } => {
            Ok((StatusCode::NOT_FOUND, Json(json!({ "message": "No CPT data found." })))
                .into_response())
        }
    }
}

pub async fn search_cpt_data(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Response, ApiError> {
    let term = query.q.clone().unwrap_or_default();
    let page = query.page();
    let page_size = query.page_size(state.config.catalog.page_size);

    let result = state
        .catalog
        .search_code_or_description(&term, page, page_size, query.sort())
        .await
        .map_err(|e| ApiError::from_backend("Error searching CPT data", e))?;

    match result {
        PageResult::Found { rows, total_pages } => Ok(Json(json!({
            "data": rows,
            "totalPages": total_pages,
            "message": "CPT data fetched successfully.",
        }))
        .into_response()),
        PageResult::Empty { total_pages } => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "message": "No CPT data found for this query.",
                "totalPages": total_pages,
            })),
        )
            .into_response()),
    }
}

pub async fn filter_cpt_data(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Response, ApiError> {
    let field = CatalogColumn::parse(query.field_name.as_deref().unwrap_or(""))
        .map_err(|e| ApiError::from_backend("Error fetching category data", e))?;
    let value = query.field_value.clone().unwrap_or_default();
    let page = query.page();
    let page_size = query.page_size(state.config.catalog.page_size);

    let result = state
        .catalog
        .filter_by_field(field, &value, query.sort(), page, page_size)
        .await
        .map_err(|e| ApiError::from_backend("Error fetching category data", e))?;

    match result {
        PageResult::Found { rows, total_pages } => Ok(Json(json!({
            "data": rows,
            "totalPages": total_pages,
            "message": format!("CPT data filtered by {} fetched successfully.", field.as_sql()),
        }))
        .into_response()),
        PageResult::Empty { total_pages } => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "message": "No CPT data found for the specified category.",
                "totalPages": total_pages,
            })),
        )
            .into_response()),
    }
}

/// Build the combined query. A `fieldName` without a `fieldValue` only
/// picks the sort column; filtering on an empty value would turn into
/// `LIKE '%%'` and silently drop rows where the column is NULL.
fn general_query_spec(query: &CatalogQuery, default_page_size: u64) -> Result<QuerySpec, ApiError> {
    let mut spec = QuerySpec::new(query.page(), query.page_size(default_page_size));

    if let Some(name) = query.field_name.as_deref().filter(|n| !n.is_empty()) {
        let field = CatalogColumn::parse(name)
            .map_err(|e| ApiError::from_backend("Internal Server Error", e))?;
        spec.order_by = Some(field);
        if let Some(value) = query.field_value.clone().filter(|v| !v.is_empty()) {
            spec.filter = Some((field, value));
        }
    }
    if let Some(term) = query.search_term.clone().filter(|t| !t.is_empty()) {
        spec.search = Some(term);
    }
    spec.sort = query.sort();

    Ok(spec)
}

/// The combined filter+search endpoint: one page of rows together with the
/// distinct-value facet counts for the filter UI.
pub async fn fetch_general_cpt_data(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Response, ApiError> {
    let spec = general_query_spec(&query, state.config.catalog.page_size)?;

    let (result, counts) = tokio::try_join!(state.catalog.fetch_data(&spec), state.catalog.fetch_facets())
        .map_err(|e| ApiError::from_backend("Internal Server Error", e))?;

    match result {
        PageResult::Found { rows, total_pages } => Ok(Json(json!({
            "data": rows,
            "counts": counts,
            "totalPages": total_pages,
            "message": "CPT data fetched successfully.",
        }))
        .into_response()),
        PageResult::Empty { total_pages } => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "message": "No CPT data found.",
                "totalPages": total_pages,
            })),
        )
            .into_response()),
    }
}

/// Facet counts only, no rows.
pub async fn fetch_cpt_data(State(state): State<AppState>) -> Result<Response, ApiError> {
    let facets = state
        .catalog
        .fetch_facets()
        .await
        .map_err(|e| ApiError::from_backend("Error fetching distinct values", e))?;

    Ok(Json(json!({
        "categories": facets.categories,
        "subCategories": facets.sub_categories,
        "anatomies": facets.anatomies,
        "message": "Distinct values fetched successfully.",
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(field_name: Option<&str>, field_value: Option<&str>) -> CatalogQuery {
        CatalogQuery {
            q: None,
            search_term: None,
            field_name: field_name.map(str::to_string),
            field_value: field_value.map(str::to_string),
            order: None,
            page: None,
            page_size: None,
        }
    }

    #[test]
    fn field_name_without_a_value_only_sets_the_sort_column() {
        let spec = general_query_spec(&query(Some("category"), None), 10).unwrap();
        assert!(spec.filter.is_none());
        assert_eq!(spec.order_by, Some(CatalogColumn::Category));

        let spec = general_query_spec(&query(Some("category"), Some("")), 10).unwrap();
        assert!(spec.filter.is_none());
        assert_eq!(spec.order_by, Some(CatalogColumn::Category));
    }

    #[test]
    fn field_name_with_a_value_filters_and_sorts() {
        let spec = general_query_spec(&query(Some("anatomy"), Some("knee")), 10).unwrap();
        assert_eq!(
            spec.filter,
            Some((CatalogColumn::Anatomy, "knee".to_string()))
        );
        assert_eq!(spec.order_by, Some(CatalogColumn::Anatomy));
    }

    #[test]
    fn unknown_field_names_are_rejected() {
        assert!(general_query_spec(&query(Some("password"), Some("x")), 10).is_err());
    }

    #[test]
    fn search_term_defaults_and_paging_fall_back() {
        let mut q = query(None, None);
        q.search_term = Some("knee".to_string());
        q.page = Some("abc".to_string());
        let spec = general_query_spec(&q, 10).unwrap();
        assert_eq!(spec.search.as_deref(), Some("knee"));
        assert!(spec.filter.is_none());
        assert_eq!(spec.page, 1);
        assert_eq!(spec.page_size, 10);
    }
}
