use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::common::error::Result;
use crate::config::CmsConfig;

/// One billed procedure from the CMS utilization dataset, projected down
/// to the fields the code builder needs.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CmsProcedure {
    #[serde(rename = "CPT_CODE")]
    pub cpt_code: String,
    #[serde(rename = "DESCRIPTION")]
    pub description: String,
    #[serde(rename = "PLACE_OF_SERVICE")]
    pub place_of_service: String,
}

/// Client for the CMS dataset viewer API. Responses arrive as positional
/// rows plus a parallel header list in `meta.headers`.
pub struct CmsClient {
    http: reqwest::Client,
    dataset_url: String,
}

impl CmsClient {
    pub fn new(config: &CmsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            dataset_url: config.dataset_url.clone(),
        })
    }

    /// Procedures billed by the provider with the given NPI number. Empty
    /// when the dataset has no rows for that provider.
    pub async fn provider_procedures(&self, npi_number: &str) -> Result<Vec<CmsProcedure>> {
        let payload: Value = self
            .http
            .get(&self.dataset_url)
            .query(&[("size", "10"), ("offset", "0"), ("keyword", npi_number)])
            .send()
            .await?
            .json()
            .await?;

        let procedures = parse_dataset(&payload);
        debug!(
            npi = npi_number,
            rows = procedures.len(),
            "CMS dataset lookup"
        );
        Ok(procedures)
    }
}

/// Zip `meta.headers` with each positional data row and pull out the
/// procedure columns. Rows missing any of the three columns are skipped.
pub(crate) fn parse_dataset(payload: &Value) -> Vec<CmsProcedure> {
    let headers: Vec<&str> = match payload["meta"]["headers"].as_array() {
        Some(headers) => headers.iter().filter_map(Value::as_str).collect(),
        None => return Vec::new(),
    };

    let position = |name: &str| headers.iter().position(|h| *h == name);
    let (code_idx, desc_idx, pos_idx) = match (
        position("HCPCS_Cd"),
        position("HCPCS_Desc"),
        position("Place_Of_Srvc"),
    ) {
        (Some(c), Some(d), Some(p)) => (c, d, p),
        _ => return Vec::new(),
    };

    let rows = match payload["data"].as_array() {
        Some(rows) => rows,
        None => return Vec::new(),
    };

    rows.iter()
        .filter_map(|row| {
            let cell = |idx: usize| row.get(idx).and_then(Value::as_str).map(str::to_string);
            Some(CmsProcedure {
                cpt_code: cell(code_idx)?,
                description: cell(desc_idx)?,
                place_of_service: cell(pos_idx)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_zips_headers_with_rows() {
        let payload = json!({
            "meta": {"headers": ["Rndrng_NPI", "HCPCS_Cd", "HCPCS_Desc", "Place_Of_Srvc"]},
            "data": [
                ["1234567890", "99213", "Office visit", "O"],
                ["1234567890", "29881", "Knee arthroscopy", "F"]
            ]
        });

        let procedures = parse_dataset(&payload);
        assert_eq!(
            procedures,
            vec![
                CmsProcedure {
                    cpt_code: "99213".to_string(),
                    description: "Office visit".to_string(),
                    place_of_service: "O".to_string(),
                },
                CmsProcedure {
                    cpt_code: "29881".to_string(),
                    description: "Knee arthroscopy".to_string(),
                    place_of_service: "F".to_string(),
                },
            ]
        );
    }

    #[test]
    fn parse_returns_empty_for_missing_headers() {
        let payload = json!({"meta": {"headers": ["Other"]}, "data": [["x"]]});
        assert!(parse_dataset(&payload).is_empty());
    }

    #[test]
    fn parse_returns_empty_for_empty_payload() {
        assert!(parse_dataset(&json!({})).is_empty());
        assert!(parse_dataset(&json!({"meta": {"headers": []}, "data": []})).is_empty());
    }

    #[test]
    fn serializes_with_legacy_field_names() {
        let procedure = CmsProcedure {
            cpt_code: "99213".to_string(),
            description: "Office visit".to_string(),
            place_of_service: "O".to_string(),
        };
        let value = serde_json::to_value(&procedure).unwrap();
        assert_eq!(
            value,
            json!({"CPT_CODE": "99213", "DESCRIPTION": "Office visit", "PLACE_OF_SERVICE": "O"})
        );
    }
}
