use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::common::error::{BackendError, Result};
use crate::db::{opt_i64, opt_text, DatabaseManager};
use crate::domain::{Customer, NewCustomer};

const CUSTOMER_COLUMNS: &str = "c.id, c.first_name, c.middle_name, c.last_name, c.email, \
     c.password, c.phone_number, c.npi_number, c.city, c.taxonomy_description, \
     c.taxonomy_code, c.code_builder_approach, c.otp, c.otp_created_at, c.active, \
     cp.latest_step";

pub struct CustomerRepo {
    db: Arc<DatabaseManager>,
}

impl CustomerRepo {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Insert a customer together with their initial progress row
    /// (`latest_step = 1`) in one transaction. Returns the new customer id.
    pub async fn create(&self, new: &NewCustomer) -> Result<i64> {
        let conn = self.db.get_connection().await?;
        let tx = conn.transaction().await?;

        tx.execute(
            "INSERT INTO customers (first_name, middle_name, last_name, email, password, \
             phone_number, npi_number, city, taxonomy_description, taxonomy_code) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            libsql::params![
                new.first_name.as_str(),
                new.middle_name.as_str(),
                new.last_name.as_str(),
                new.email.as_str(),
                new.password.as_str(),
                new.phone_number.as_str(),
                new.npi_number.as_str(),
                new.city.as_str(),
                new.taxonomy_description.as_str(),
                new.taxonomy_code.as_str(),
            ],
        )
        .await?;

        let customer_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO customer_progress (customer_id, latest_step) VALUES (?, ?)",
            libsql::params![customer_id, 1],
        )
        .await?;

        tx.commit().await?;

        info!("Created customer {} ({})", customer_id, new.email);
        Ok(customer_id)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let conn = self.db.get_connection().await?;

        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers c \
             LEFT JOIN customer_progress cp ON c.id = cp.customer_id \
             WHERE c.email = ? LIMIT 1"
        );
        let mut rows = conn.query(&sql, libsql::params![email]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(customer_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Customer>> {
        let conn = self.db.get_connection().await?;

        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers c \
             LEFT JOIN customer_progress cp ON c.id = cp.customer_id \
             WHERE c.id = ? LIMIT 1"
        );
        let mut rows = conn.query(&sql, libsql::params![id]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(customer_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn set_password(&self, id: i64, password_hash: &str) -> Result<()> {
        let conn = self.db.get_connection().await?;
        conn.execute(
            "UPDATE customers SET password = ? WHERE id = ?",
            libsql::params![password_hash, id],
        )
        .await?;
        debug!("Updated password for customer {}", id);
        Ok(())
    }

    pub async fn set_otp(&self, id: i64, otp: i64, created_at: DateTime<Utc>) -> Result<()> {
        let conn = self.db.get_connection().await?;
        conn.execute(
            "UPDATE customers SET otp = ?, otp_created_at = ? WHERE id = ?",
            libsql::params![otp, created_at.to_rfc3339(), id],
        )
        .await?;
        Ok(())
    }

    pub async fn set_code_builder_approach(&self, id: i64, approach: &str) -> Result<()> {
        let conn = self.db.get_connection().await?;
        conn.execute(
            "UPDATE customers SET code_builder_approach = ? WHERE id = ?",
            libsql::params![approach, id],
        )
        .await?;
        Ok(())
    }
}

fn customer_from_row(row: &libsql::Row) -> Result<Customer> {
    let otp_created_at = match opt_text(row, 13)? {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(&raw)
                .map_err(|e| BackendError::Database {
                    message: format!("Invalid otp_created_at timestamp: {e}"),
                })?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    Ok(Customer {
        id: row.get::<i64>(0)?,
        first_name: row.get::<String>(1)?,
        middle_name: row.get::<String>(2)?,
        last_name: row.get::<String>(3)?,
        email: row.get::<String>(4)?,
        password: row.get::<String>(5)?,
        phone_number: row.get::<String>(6)?,
        npi_number: row.get::<String>(7)?,
        city: row.get::<String>(8)?,
        taxonomy_description: row.get::<String>(9)?,
        taxonomy_code: row.get::<String>(10)?,
        code_builder_approach: opt_text(row, 11)?,
        otp: opt_i64(row, 12)?,
        otp_created_at,
        active: row.get::<i64>(14)?,
        latest_step: opt_i64(row, 15)?,
    })
}
