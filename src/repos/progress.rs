use std::sync::Arc;

use tracing::debug;

use crate::common::error::Result;
use crate::db::{opt_i64, DatabaseManager};

/// Onboarding progress: a single `latest_step` row per customer.
pub struct ProgressRepo {
    db: Arc<DatabaseManager>,
}

impl ProgressRepo {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Replace the customer's progress row with `latest_step`. Delete and
    /// insert run in one transaction; calling this twice with the same
    /// step leaves exactly one row.
    pub async fn set_step(&self, customer_id: i64, latest_step: i64) -> Result<()> {
        let conn = self.db.get_connection().await?;
        let tx = conn.transaction().await?;

        tx.execute(
            "DELETE FROM customer_progress WHERE customer_id = ?",
            libsql::params![customer_id],
        )
        .await?;

        tx.execute(
            "INSERT INTO customer_progress (customer_id, latest_step) VALUES (?, ?)",
            libsql::params![customer_id, latest_step],
        )
        .await?;

        tx.commit().await?;

        debug!("Set progress step {} for customer {}", latest_step, customer_id);
        Ok(())
    }

    pub async fn latest_step(&self, customer_id: i64) -> Result<Option<i64>> {
        let conn = self.db.get_connection().await?;

        let mut rows = conn
            .query(
                "SELECT latest_step FROM customer_progress WHERE customer_id = ?",
                libsql::params![customer_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => opt_i64(&row, 0),
            None => Ok(None),
        }
    }
}
