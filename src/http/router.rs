use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::http::routes::{accounts, catalog, codes, institutes, uploads};
use crate::http::state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn app_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let api = Router::new()
        // Accounts
        .route("/signup", post(accounts::signup))
        .route("/login", post(accounts::login))
        .route("/getProfile", get(accounts::get_profile))
        .route("/forgotPassword", post(accounts::forgot_password))
        .route("/checkOTP", post(accounts::check_otp))
        .route("/changePassword", post(accounts::change_password))
        // Institutes
        .route("/getDataUsingNpi", get(institutes::get_data_using_npi))
        .route("/searchData", get(institutes::search_data))
        .route("/getDefaultInstitutes", post(institutes::get_default_institutes))
        .route("/getCustomerInstitutes", post(institutes::get_customer_institutes))
        .route("/addCustomerInstitutes", post(institutes::add_customer_institutes))
        .route("/addManualInstitute", post(institutes::add_manual_institute))
        .route("/updateManualInstitutes", post(institutes::update_manual_institutes))
        // Catalog
        .route("/fetchCptData", get(catalog::fetch_cpt_data))
        .route("/fetchBasicCptData", get(catalog::fetch_basic_cpt_data))
        .route("/searchCptData", get(catalog::search_cpt_data))
        .route("/filterCptData", get(catalog::filter_cpt_data))
        .route("/fetchGeneralCptData", get(catalog::fetch_general_cpt_data))
        // CPT codes
        .route("/updateCptCodes", post(codes::update_cpt_codes))
        .route("/getCptCodeOptions", get(codes::get_cpt_code_options))
        .route("/buildCodes", get(codes::build_codes))
        // Uploads
        .route(
            "/uploadFile",
            post(uploads::upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        );

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
