mod error;
mod extract;
mod router;
mod routes;
mod state;

pub use error::ApiError;
pub use extract::CurrentCustomer;
pub use router::app_router;
pub use state::AppState;
