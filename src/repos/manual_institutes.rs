use std::sync::Arc;

use crate::common::error::Result;
use crate::db::DatabaseManager;
use crate::domain::ManualInstitute;

/// Institutes the customer typed in by hand because the NPI registry did
/// not have them.
pub struct ManualInstituteRepo {
    db: Arc<DatabaseManager>,
}

impl ManualInstituteRepo {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Returns the number of rows inserted (0 or 1).
    pub async fn add(&self, customer_id: i64, name: &str, zipcode: &str) -> Result<u64> {
        let conn = self.db.get_connection().await?;

        let affected = conn
            .execute(
                "INSERT INTO customer_manual_institutes (customer_id, name, zipcode) \
                 VALUES (?, ?, ?)",
                libsql::params![customer_id, name, zipcode],
            )
            .await?;

        Ok(affected)
    }

    /// Delete only rows that are both in `ids` AND owned by `customer_id`.
    /// Returns the number of rows actually deleted; ids belonging to other
    /// customers are left untouched and not counted.
    pub async fn delete_by_ids(&self, customer_id: i64, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "DELETE FROM customer_manual_institutes \
             WHERE customer_id = ? AND id IN ({placeholders})"
        );

        let mut params: Vec<libsql::Value> = Vec::with_capacity(ids.len() + 1);
        params.push(libsql::Value::from(customer_id));
        params.extend(ids.iter().map(|id| libsql::Value::from(*id)));

        let conn = self.db.get_connection().await?;
        let affected = conn
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        Ok(affected)
    }

    pub async fn list(&self, customer_id: i64) -> Result<Vec<ManualInstitute>> {
        let conn = self.db.get_connection().await?;

        let mut rows = conn
            .query(
                "SELECT id, name, zipcode FROM customer_manual_institutes \
                 WHERE customer_id = ?",
                libsql::params![customer_id],
            )
            .await?;

        let mut institutes = Vec::new();
        while let Some(row) = rows.next().await? {
            institutes.push(ManualInstitute {
                id: row.get::<i64>(0)?,
                name: row.get::<String>(1)?,
                zipcode: row.get::<String>(2)?,
            });
        }

        Ok(institutes)
    }
}
