use std::collections::HashSet;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::debug;

use crate::common::error::Result;
use crate::config::NpiConfig;

/// Client for the public NPI registry. Every call carries the registry's
/// `version=2.1` parameter; lookups share one pooled connection with a
/// per-request timeout.
pub struct NpiClient {
    http: reqwest::Client,
    base_url: String,
    max_concurrent: usize,
}

impl NpiClient {
    pub fn new(config: &NpiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            max_concurrent: config.max_concurrent_lookups.max(1),
        })
    }

    /// Raw registry payload for a single NPI number, any enumeration type.
    pub async fn lookup_number(&self, number: &str) -> Result<Value> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("version", "2.1"), ("number", number)])
            .send()
            .await?;

        Ok(response.json().await?)
    }

    /// Raw registry payload for a single organization (NPI-2) number.
    pub async fn lookup_organization(&self, number: &str) -> Result<Value> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("version", "2.1"),
                ("enumeration_type", "NPI-2"),
                ("number", number),
            ])
            .send()
            .await?;

        Ok(response.json().await?)
    }

    /// Organization search by name and postal code.
    pub async fn search_by_name_and_postal(&self, name: &str, postal_code: &str) -> Result<Value> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("version", "2.1"),
                ("enumeration_type", "NPI-2"),
                ("organizationName", name),
                ("postal_code", postal_code),
            ])
            .send()
            .await?;

        Ok(response.json().await?)
    }

    /// Organization search by taxonomy description and city.
    pub async fn search_by_taxonomy_and_city(&self, taxonomy: &str, city: &str) -> Result<Value> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("version", "2.1"),
                ("enumeration_type", "NPI-2"),
                ("taxonomy_description", taxonomy),
                ("city", city),
            ])
            .send()
            .await?;

        Ok(response.json().await?)
    }

    /// Registry details for each NPI number: the first result per number,
    /// numbers the registry does not know are dropped. Lookups fan out
    /// concurrently, capped at `max_concurrent_lookups`.
    pub async fn org_details(&self, npi_numbers: &[String]) -> Result<Vec<Value>> {
        let lookups = npi_numbers.iter().cloned().map(|number| async move {
            let payload = self.lookup_organization(&number).await?;
            Ok::<Option<Value>, crate::common::error::BackendError>(
                payload.get("results").and_then(|r| r.get(0)).cloned(),
            )
        });

        let results: Vec<_> = stream::iter(lookups)
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut details = Vec::new();
        for result in results {
            if let Some(detail) = result? {
                details.push(detail);
            }
        }

        debug!(
            requested = npi_numbers.len(),
            found = details.len(),
            "registry detail fan-out"
        );
        Ok(details)
    }
}

/// Drop registry results whose NPI number the customer already has. The
/// registry encodes `number` as a JSON number while the database stores
/// text, so both spellings are normalized before comparison.
pub fn filter_new_institutes(fetched: Vec<Value>, existing: &[String]) -> Vec<Value> {
    let existing: HashSet<&str> = existing.iter().map(String::as_str).collect();

    fetched
        .into_iter()
        .filter(|item| {
            let number = match item.get("number") {
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::String(s)) => s.clone(),
                _ => return true,
            };
            !existing.contains(number.as_str())
        })
        .collect()
}
