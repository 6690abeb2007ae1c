use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::auth::{hash_password, verify_password};
use crate::domain::NewCustomer;
use crate::http::error::ApiError;
use crate::http::extract::CurrentCustomer;
use crate::http::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;
const OTP_VALID_MINUTES: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub npi_number: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub taxonomy_description: String,
    #[serde(default)]
    pub taxonomy_code: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    let required = [
        &req.email,
        &req.password,
        &req.first_name,
        &req.last_name,
        &req.phone_number,
        &req.npi_number,
        &req.city,
        &req.taxonomy_description,
        &req.taxonomy_code,
    ];
    if required.iter().any(|field| field.is_empty()) {
        return Err(ApiError::bad_request("All fields are required"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters long",
        ));
    }

    let existing = state
        .customers
        .find_by_email(&req.email)
        .await
        .map_err(|e| ApiError::from_backend("Error creating customer", e))?;
    if existing.is_some() {
        return Err(ApiError::conflict("Email already exists."));
    }

    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::from_backend("Error creating customer", e))?;

    let new_customer = NewCustomer {
        first_name: req.first_name,
        middle_name: req.middle_name,
        last_name: req.last_name,
        email: req.email,
        password: password_hash,
        phone_number: req.phone_number,
        npi_number: req.npi_number,
        city: req.city,
        taxonomy_description: req.taxonomy_description,
        taxonomy_code: req.taxonomy_code,
    };

    let customer_id = state
        .customers
        .create(&new_customer)
        .await
        .map_err(|e| ApiError::from_backend("Error creating customer", e))?;

    let token = state
        .tokens
        .issue(customer_id)
        .map_err(|e| ApiError::from_backend("Error creating customer", e))?;

    Ok(Json(json!({ "token": token })).into_response())
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let customer = state
        .customers
        .find_by_email(&req.email)
        .await
        .map_err(|e| ApiError::from_backend("Error logging in", e))?
        .ok_or_else(|| ApiError::unauthorized("Authentication failed"))?;

    let matches = verify_password(&req.password, &customer.password)
        .map_err(|e| ApiError::from_backend("Error logging in", e))?;
    if !matches {
        return Err(ApiError::unauthorized("Invalid email or password."));
    }

    let token = state
        .tokens
        .issue(customer.id)
        .map_err(|e| ApiError::from_backend("Error logging in", e))?;

    Ok(Json(json!({ "token": token })).into_response())
}

pub async fn get_profile(
    State(state): State<AppState>,
    CurrentCustomer(customer_id): CurrentCustomer,
) -> Result<Response, ApiError> {
    let customer = state
        .customers
        .find_by_id(customer_id)
        .await
        .map_err(|e| ApiError::from_backend("Server error", e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(customer).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Response, ApiError> {
    let customer = state
        .customers
        .find_by_email(&req.email)
        .await
        .map_err(|e| ApiError::from_backend("Error handling forgot password", e))?
        .filter(|c| c.active == 1)
        .ok_or_else(|| ApiError::not_found("User not found or not active."))?;

    let otp: i64 = rand::thread_rng().gen_range(1000..10000);

    state
        .customers
        .set_otp(customer.id, otp, Utc::now())
        .await
        .map_err(|e| ApiError::from_backend("Error handling forgot password", e))?;

    if let Err(e) = state.mailer.send_password_reset(&req.email, otp).await {
        error!("Error sending email: {e}");
        return Err(ApiError::internal("Failed to send email"));
    }

    Ok(Json(json!({ "message": "Email sent successfully" })).into_response())
}

#[derive(Debug, Deserialize)]
pub struct CheckOtpRequest {
    #[serde(default)]
    pub email: String,
    pub otp: Option<i64>,
}

pub async fn check_otp(
    State(state): State<AppState>,
    Json(req): Json<CheckOtpRequest>,
) -> Result<Response, ApiError> {
    let customer = state
        .customers
        .find_by_email(&req.email)
        .await
        .map_err(|e| ApiError::from_backend("Error verifying OTP", e))?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    let matches = matches!((customer.otp, req.otp), (Some(s), Some(g)) if s == g);
    if !matches {
        return Err(ApiError::bad_request("Invalid OTP."));
    }

    let fresh = customer
        .otp_created_at
        .map(|at| Utc::now() - at <= Duration::minutes(OTP_VALID_MINUTES))
        .unwrap_or(false);
    if !fresh {
        return Err(ApiError::bad_request("OTP has expired."));
    }

    Ok(Json(json!({ "message": "OTP is valid." })).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "newPassword")]
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Response, ApiError> {
    if req.new_password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "New password must be at least 8 characters long.",
        ));
    }

    let customer = state
        .customers
        .find_by_email(&req.email)
        .await
        .map_err(|e| ApiError::from_backend("Error changing password", e))?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    let password_hash = hash_password(&req.new_password)
        .map_err(|e| ApiError::from_backend("Error changing password", e))?;

    state
        .customers
        .set_password(customer.id, &password_hash)
        .await
        .map_err(|e| ApiError::from_backend("Error changing password", e))?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Password updated successfully." })),
    )
        .into_response())
}
