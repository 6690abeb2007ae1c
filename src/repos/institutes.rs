use std::sync::Arc;

use tracing::debug;

use crate::common::error::Result;
use crate::db::DatabaseManager;

/// NPI-registry institute associations for a customer.
pub struct InstituteRepo {
    db: Arc<DatabaseManager>,
}

impl InstituteRepo {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Replace the customer's institute set with `npi_numbers`. The set is
    /// always the complete replacement, not a delta; delete and insert run
    /// in one transaction so the customer never observes an empty set
    /// mid-update.
    pub async fn replace_all(&self, customer_id: i64, npi_numbers: &[String]) -> Result<()> {
        let conn = self.db.get_connection().await?;
        let tx = conn.transaction().await?;

        tx.execute(
            "DELETE FROM customer_institutes WHERE customer_id = ?",
            libsql::params![customer_id],
        )
        .await?;

        for npi_number in npi_numbers {
            tx.execute(
                "INSERT INTO customer_institutes (customer_id, npi_number) VALUES (?, ?)",
                libsql::params![customer_id, npi_number.as_str()],
            )
            .await?;
        }

        tx.commit().await?;

        debug!(
            "Replaced institutes for customer {} ({} rows)",
            customer_id,
            npi_numbers.len()
        );
        Ok(())
    }

    pub async fn npi_numbers(&self, customer_id: i64) -> Result<Vec<String>> {
        let conn = self.db.get_connection().await?;

        let mut rows = conn
            .query(
                "SELECT npi_number FROM customer_institutes WHERE customer_id = ?",
                libsql::params![customer_id],
            )
            .await?;

        let mut numbers = Vec::new();
        while let Some(row) = rows.next().await? {
            numbers.push(row.get::<String>(0)?);
        }

        Ok(numbers)
    }
}
