//! # Storefront Section Repository
//!
//! Featured product groups for the storefront home page. The product id
//! list is stored as a JSON array in one TEXT column.

use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::StorefrontSection;

#[derive(Debug, FromRow)]
struct SectionRow {
    id: String,
    name: String,
    display_order: i64,
    product_ids: String,
}

impl TryFrom<SectionRow> for StorefrontSection {
    type Error = DbError;

    fn try_from(row: SectionRow) -> Result<Self, Self::Error> {
        let product_ids: Vec<String> =
            serde_json::from_str(&row.product_ids).map_err(|e| DbError::Corrupt {
                column: "storefront_sections.product_ids".to_string(),
                reason: e.to_string(),
            })?;

        Ok(StorefrontSection {
            id: row.id,
            name: row.name,
            display_order: row.display_order,
            product_ids,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SectionRepository {
    pool: SqlitePool,
}

impl SectionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SectionRepository { pool }
    }

    /// All sections in display order.
    pub async fn list(&self) -> DbResult<Vec<StorefrontSection>> {
        let rows = sqlx::query_as::<_, SectionRow>(
            "SELECT id, name, display_order, product_ids FROM storefront_sections \
             ORDER BY display_order, name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StorefrontSection::try_from).collect()
    }

    /// Inserts a section or replaces the one with the same id.
    pub async fn upsert(&self, section: &StorefrontSection) -> DbResult<()> {
        debug!(id = %section.id, name = %section.name, "Saving storefront section");

        let product_ids = serde_json::to_string(&section.product_ids)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO storefront_sections (id, name, display_order, product_ids)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                display_order = excluded.display_order,
                product_ids = excluded.product_ids
            "#,
        )
        .bind(&section.id)
        .bind(&section.name)
        .bind(section.display_order)
        .bind(product_ids)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting storefront section");

        let result = sqlx::query("DELETE FROM storefront_sections WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Storefront section", id));
        }
        Ok(())
    }
}
