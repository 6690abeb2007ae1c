use std::sync::Arc;

use tracing::debug;

use crate::common::error::Result;
use crate::db::DatabaseManager;

/// The CPT codes a customer has selected for their billing profile.
pub struct CptCodeRepo {
    db: Arc<DatabaseManager>,
}

impl CptCodeRepo {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Replace the customer's code set with `codes`, atomically. An empty
    /// slice clears the set.
    pub async fn replace_all(&self, customer_id: i64, codes: &[String]) -> Result<()> {
        let conn = self.db.get_connection().await?;
        let tx = conn.transaction().await?;

        tx.execute(
            "DELETE FROM customer_cpt_codes WHERE customer_id = ?",
            libsql::params![customer_id],
        )
        .await?;

        for code in codes {
            tx.execute(
                "INSERT INTO customer_cpt_codes (customer_id, cpt_code) VALUES (?, ?)",
                libsql::params![customer_id, code.as_str()],
            )
            .await?;
        }

        tx.commit().await?;

        debug!(
            "Replaced CPT codes for customer {} ({} rows)",
            customer_id,
            codes.len()
        );
        Ok(())
    }

    pub async fn codes(&self, customer_id: i64) -> Result<Vec<String>> {
        let conn = self.db.get_connection().await?;

        let mut rows = conn
            .query(
                "SELECT cpt_code FROM customer_cpt_codes WHERE customer_id = ?",
                libsql::params![customer_id],
            )
            .await?;

        let mut codes = Vec::new();
        while let Some(row) = rows.next().await? {
            codes.push(row.get::<String>(0)?);
        }

        Ok(codes)
    }
}
