use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::clients::CmsProcedure;
use crate::http::error::ApiError;
use crate::http::extract::CurrentCustomer;
use crate::http::state::AppState;
use crate::repos::CrosswalkField;

#[derive(Debug, Deserialize)]
pub struct UpdateCptCodesRequest {
    #[serde(default, rename = "cptCodes")]
    pub cpt_codes: String,
    #[serde(default, rename = "codeBuilderApproach")]
    pub code_builder_approach: String,
}

/// Replace the customer's selected CPT codes and bump their progress to
/// step 3. `cptCodes` arrives as a comma-separated string.
pub async fn update_cpt_codes(
    State(state): State<AppState>,
    CurrentCustomer(customer_id): CurrentCustomer,
    Json(req): Json<UpdateCptCodesRequest>,
) -> Result<Response, ApiError> {
    let context = "Error updating CPT codes";

    state
        .customers
        .find_by_id(customer_id)
        .await
        .map_err(|e| ApiError::from_backend(context, e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let codes: Vec<String> = req
        .cpt_codes
        .split(',')
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .collect();

    state
        .cpt_codes
        .replace_all(customer_id, &codes)
        .await
        .map_err(|e| ApiError::from_backend(context, e))?;

    if !req.code_builder_approach.is_empty() {
        state
            .customers
            .set_code_builder_approach(customer_id, &req.code_builder_approach)
            .await
            .map_err(|e| ApiError::from_backend(context, e))?;
    }

    state
        .progress
        .set_step(customer_id, 3)
        .await
        .map_err(|e| ApiError::from_backend(context, e))?;

    Ok(Json(json!({ "message": "CPT codes updated successfully." })).into_response())
}

/// Crosswalk lookup for the customer's own taxonomy code.
pub async fn get_cpt_code_options(
    State(state): State<AppState>,
    CurrentCustomer(customer_id): CurrentCustomer,
) -> Result<Response, ApiError> {
    let customer = state
        .customers
        .find_by_id(customer_id)
        .await
        .map_err(|e| ApiError::from_backend("Server error", e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if customer.taxonomy_code.is_empty() {
        return Err(ApiError::bad_request("Taxonomy code not found for user"));
    }

    let entries = state
        .crosswalk
        .search_by(CrosswalkField::TaxonomyCode, &customer.taxonomy_code)
        .await
        .map_err(|e| ApiError::from_backend("Server error", e))?;

    let codes: Vec<String> = entries.into_iter().map(|entry| entry.cpt_code).collect();
    if codes.is_empty() {
        return Err(ApiError::not_found(
            "No CPT codes found for the given taxonomy code",
        ));
    }

    Ok(Json(json!({ "data": codes })).into_response())
}

/// Suggest CPT codes for the customer: what they actually billed per the
/// CMS utilization dataset, falling back to the taxonomy crosswalk when
/// the dataset has nothing for their NPI.
pub async fn build_codes(
    State(state): State<AppState>,
    CurrentCustomer(customer_id): CurrentCustomer,
) -> Result<Response, ApiError> {
    let context = "Error fetching CPT data";

    let customer = state
        .customers
        .find_by_id(customer_id)
        .await
        .map_err(|e| ApiError::from_backend(context, e))?
        .ok_or_else(|| ApiError::not_found("No user data found."))?;

    let procedures = state
        .cms
        .provider_procedures(&customer.npi_number)
        .await
        .map_err(|e| ApiError::from_backend(context, e))?;

    if !procedures.is_empty() {
        return Ok(Json(json!({ "data": procedures })).into_response());
    }

    let fallback: Vec<CmsProcedure> = state
        .crosswalk
        .search_by(CrosswalkField::TaxonomyCode, &customer.taxonomy_code)
        .await
        .map_err(|e| ApiError::from_backend(context, e))?
        .into_iter()
        .map(|entry| CmsProcedure {
            cpt_code: entry.cpt_code,
            description: String::new(),
            place_of_service: String::new(),
        })
        .collect();

    Ok(Json(json!({ "data": fallback })).into_response())
}
