use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::clients::filter_new_institutes;
use crate::http::error::ApiError;
use crate::http::extract::CurrentCustomer;
use crate::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NpiNumberQuery {
    #[serde(default)]
    pub number: String,
}

/// Raw registry passthrough for a single NPI number.
pub async fn get_data_using_npi(
    State(state): State<AppState>,
    Query(query): Query<NpiNumberQuery>,
) -> Result<Response, ApiError> {
    let payload = state
        .npi
        .lookup_number(&query.number)
        .await
        .map_err(|e| ApiError::from_backend("Error fetching data from NPI Registry", e))?;

    Ok(Json(payload).into_response())
}

#[derive(Debug, Deserialize)]
pub struct SearchDataQuery {
    pub npi: Option<String>,
    #[serde(rename = "instituteName")]
    pub institute_name: Option<String>,
    #[serde(rename = "postalCode")]
    pub postal_code: Option<String>,
}

/// Organization search: either by NPI number, or by name + postal code.
pub async fn search_data(
    State(state): State<AppState>,
    Query(query): Query<SearchDataQuery>,
) -> Result<Response, ApiError> {
    let payload = match (&query.npi, &query.institute_name, &query.postal_code) {
        (Some(npi), _, _) => state.npi.lookup_organization(npi).await,
        (None, Some(name), Some(postal)) => state.npi.search_by_name_and_postal(name, postal).await,
        _ => {
            return Err(ApiError::bad_request(
                "Please provide an NPI number or both institute name (as instituteName) and zipcode.",
            ))
        }
    }
    .map_err(|e| ApiError::from_backend("Error fetching data from NPI Registry", e))?;

    Ok(Json(payload).into_response())
}

#[derive(Debug, Deserialize)]
pub struct DefaultInstitutesRequest {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub taxonomy_description: String,
}

/// Registry institutes matching the customer's city and taxonomy, minus
/// the ones they already picked.
pub async fn get_default_institutes(
    State(state): State<AppState>,
    CurrentCustomer(customer_id): CurrentCustomer,
    Json(req): Json<DefaultInstitutesRequest>,
) -> Result<Response, ApiError> {
    if req.city.is_empty() || req.taxonomy_description.is_empty() {
        return Err(ApiError::bad_request(
            "'city' and 'taxonomy_description' fields are required and cannot be empty.",
        ));
    }

    let payload = state
        .npi
        .search_by_taxonomy_and_city(&req.taxonomy_description, &req.city)
        .await
        .map_err(|e| ApiError::from_backend("Error fetching data from NPI Registry", e))?;
    let fetched = payload
        .get("results")
        .and_then(|r| r.as_array())
        .cloned()
        .unwrap_or_default();

    let existing = state
        .institutes
        .npi_numbers(customer_id)
        .await
        .map_err(|e| ApiError::from_backend("Error fetching data from NPI Registry", e))?;

    Ok(Json(filter_new_institutes(fetched, &existing)).into_response())
}

/// The customer's saved institutes: registry details for the NPI-backed
/// ones, plus the manually entered ones.
pub async fn get_customer_institutes(
    State(state): State<AppState>,
    CurrentCustomer(customer_id): CurrentCustomer,
) -> Result<Response, ApiError> {
    let context = "Error fetching customer's institutes details";

    let npi_numbers = state
        .institutes
        .npi_numbers(customer_id)
        .await
        .map_err(|e| ApiError::from_backend(context, e))?;
    let npi_institutes = state
        .npi
        .org_details(&npi_numbers)
        .await
        .map_err(|e| ApiError::from_backend(context, e))?;
    let manual_institutes = state
        .manual_institutes
        .list(customer_id)
        .await
        .map_err(|e| ApiError::from_backend(context, e))?;

    Ok(Json(json!({
        "npiInstitutes": npi_institutes,
        "manualInstitutes": manual_institutes,
    }))
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct AddInstitutesRequest {
    #[serde(default, rename = "npiNumbers")]
    pub npi_numbers: Vec<String>,
}

pub async fn add_customer_institutes(
    State(state): State<AppState>,
    CurrentCustomer(customer_id): CurrentCustomer,
    Json(req): Json<AddInstitutesRequest>,
) -> Result<Response, ApiError> {
    let context = "Failed to update institutes or progress.";

    state
        .institutes
        .replace_all(customer_id, &req.npi_numbers)
        .await
        .map_err(|e| ApiError::from_backend(context, e))?;
    state
        .progress
        .set_step(customer_id, 2)
        .await
        .map_err(|e| ApiError::from_backend(context, e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Institutes and progress updated successfully." })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct AddManualInstituteRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub zipcode: String,
}

pub async fn add_manual_institute(
    State(state): State<AppState>,
    CurrentCustomer(customer_id): CurrentCustomer,
    Json(req): Json<AddManualInstituteRequest>,
) -> Result<Response, ApiError> {
    if req.name.is_empty() || req.zipcode.is_empty() {
        return Err(ApiError::bad_request(
            "Missing required fields: name and zipcode.",
        ));
    }

    let inserted = state
        .manual_institutes
        .add(customer_id, &req.name, &req.zipcode)
        .await
        .map_err(|e| ApiError::from_backend("Error adding manual institute", e))?;

    if inserted > 0 {
        Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "Manual institute added successfully." })),
        )
            .into_response())
    } else {
        Err(ApiError::bad_request("Failed to add the manual institute."))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateManualInstitutesRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

/// Delete the listed manual institutes, restricted to rows the customer
/// owns; ids belonging to someone else are silently skipped.
pub async fn update_manual_institutes(
    State(state): State<AppState>,
    CurrentCustomer(customer_id): CurrentCustomer,
    Json(req): Json<UpdateManualInstitutesRequest>,
) -> Result<Response, ApiError> {
    if req.ids.is_empty() {
        return Err(ApiError::bad_request(
            "Missing required fields: ids is empty.",
        ));
    }

    let deleted = state
        .manual_institutes
        .delete_by_ids(customer_id, &req.ids)
        .await
        .map_err(|e| ApiError::from_backend("Error updating manual institutes", e))?;

    if deleted > 0 {
        Ok(Json(json!({
            "message": format!("{deleted} manual institute(s) deleted successfully."),
        }))
        .into_response())
    } else {
        Err(ApiError::not_found(
            "No manual institutes found for the specified ids.",
        ))
    }
}
