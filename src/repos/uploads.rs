use std::sync::Arc;

use tracing::info;

use crate::common::error::Result;
use crate::db::{opt_text, DatabaseManager};
use crate::domain::CustomerUpload;

/// Ledger of files a customer has uploaded to object storage.
pub struct UploadRepo {
    db: Arc<DatabaseManager>,
}

impl UploadRepo {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    pub async fn record(&self, customer_id: i64, file_url: &str, comments: &str) -> Result<()> {
        let conn = self.db.get_connection().await?;

        conn.execute(
            "INSERT INTO customer_uploads (customer_id, file, comments) VALUES (?, ?, ?)",
            libsql::params![customer_id, file_url, comments],
        )
        .await?;

        info!("Recorded upload for customer {}", customer_id);
        Ok(())
    }

    pub async fn list(&self, customer_id: i64) -> Result<Vec<CustomerUpload>> {
        let conn = self.db.get_connection().await?;

        let mut rows = conn
            .query(
                "SELECT id, file, comments FROM customer_uploads WHERE customer_id = ?",
                libsql::params![customer_id],
            )
            .await?;

        let mut uploads = Vec::new();
        while let Some(row) = rows.next().await? {
            uploads.push(CustomerUpload {
                id: row.get::<i64>(0)?,
                file: row.get::<String>(1)?,
                comments: opt_text(&row, 2)?,
            });
        }

        Ok(uploads)
    }
}
