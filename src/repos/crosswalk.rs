use std::sync::Arc;

use crate::common::error::{BackendError, Result};
use crate::db::DatabaseManager;
use crate::domain::CrosswalkEntry;

/// The closed set of searchable crosswalk columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrosswalkField {
    Id,
    CptCode,
    TaxonomyCode,
}

impl CrosswalkField {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "id" => Ok(Self::Id),
            "cpt_code" => Ok(Self::CptCode),
            "taxonomy_code" => Ok(Self::TaxonomyCode),
            _ => Err(BackendError::Validation(
                "Invalid field name. Please use 'id', 'cpt_code', or 'taxonomy_code'.".to_string(),
            )),
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::CptCode => "cpt_code",
            Self::TaxonomyCode => "taxonomy_code",
        }
    }
}

/// Read-only taxonomy-to-CPT mapping table, loaded out of band.
pub struct CrosswalkRepo {
    db: Arc<DatabaseManager>,
}

impl CrosswalkRepo {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    pub async fn search_by(&self, field: CrosswalkField, value: &str) -> Result<Vec<CrosswalkEntry>> {
        let sql = format!(
            "SELECT id, taxonomy_code, cpt_code FROM crosswalk WHERE {} = ?",
            field.as_sql()
        );

        let conn = self.db.get_connection().await?;
        let mut rows = conn.query(&sql, libsql::params![value]).await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(CrosswalkEntry {
                id: row.get::<i64>(0)?,
                taxonomy_code: row.get::<String>(1)?,
                cpt_code: row.get::<String>(2)?,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_fields() {
        assert_eq!(CrosswalkField::parse("id").unwrap(), CrosswalkField::Id);
        assert_eq!(
            CrosswalkField::parse("cpt_code").unwrap(),
            CrosswalkField::CptCode
        );
        assert_eq!(
            CrosswalkField::parse("taxonomy_code").unwrap(),
            CrosswalkField::TaxonomyCode
        );
    }

    #[test]
    fn parse_rejects_anything_else() {
        assert!(CrosswalkField::parse("taxonomy_code = '' OR 1=1").is_err());
        assert!(CrosswalkField::parse("npi_number").is_err());
    }
}
