use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the CPT catalog. Read-only from the query engine's
/// perspective; the table is loaded out of band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CptRecord {
    pub id: i64,
    pub code: String,
    pub description: String,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub anatomy: Option<String>,
}

/// Projection returned by the basic catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CptSummary {
    pub id: i64,
    pub code: String,
    pub description: String,
}

/// One distinct value of a facet column together with its occurrence count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacetCount {
    pub value: String,
    pub count: i64,
}

/// Distinct value+count summaries for the three facet columns, used to
/// populate filter UIs.
#[derive(Debug, Clone, Serialize)]
pub struct FacetCounts {
    pub categories: Vec<FacetCount>,
    #[serde(rename = "subCategories")]
    pub sub_categories: Vec<FacetCount>,
    pub anatomies: Vec<FacetCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub phone_number: String,
    pub npi_number: String,
    pub city: String,
    pub taxonomy_description: String,
    pub taxonomy_code: String,
    pub code_builder_approach: Option<String>,
    #[serde(skip_serializing)]
    pub otp: Option<i64>,
    #[serde(skip_serializing)]
    pub otp_created_at: Option<DateTime<Utc>>,
    pub active: i64,
    pub latest_step: Option<i64>,
}

/// Field set required to create a customer account.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    /// Already hashed; repositories never see plaintext passwords.
    pub password: String,
    pub phone_number: String,
    pub npi_number: String,
    pub city: String,
    pub taxonomy_description: String,
    pub taxonomy_code: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ManualInstitute {
    pub id: i64,
    pub name: String,
    pub zipcode: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CustomerUpload {
    pub id: i64,
    pub file: String,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CrosswalkEntry {
    pub id: i64,
    pub taxonomy_code: String,
    pub cpt_code: String,
}
