//! # Category & Unit Repositories
//!
//! Two plain name lists. Products copy the name string, so deleting or
//! renaming an entry here never touches existing products.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use warung_core::{Category, Unit};

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// All categories, by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        list_names(&self.pool, "categories").await
    }

    /// Adds a category and returns it. Duplicate names are rejected.
    pub async fn add(&self, name: &str) -> DbResult<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        insert_name(&self.pool, "categories", &category.id, &category.name, category.created_at)
            .await?;
        Ok(category)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        delete_name(&self.pool, "categories", "Category", id).await
    }
}

#[derive(Debug, Clone)]
pub struct UnitRepository {
    pool: SqlitePool,
}

impl UnitRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UnitRepository { pool }
    }

    /// All units, by name.
    pub async fn list(&self) -> DbResult<Vec<Unit>> {
        list_names(&self.pool, "units").await
    }

    pub async fn add(&self, name: &str) -> DbResult<Unit> {
        let unit = Unit {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        insert_name(&self.pool, "units", &unit.id, &unit.name, unit.created_at).await?;
        Ok(unit)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        delete_name(&self.pool, "units", "Unit", id).await
    }
}

// `table` is always one of the two literals above, never user input.

async fn list_names<T>(pool: &SqlitePool, table: &'static str) -> DbResult<Vec<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let sql = format!("SELECT id, name, created_at FROM {} ORDER BY name", table);
    let rows = sqlx::query_as::<_, T>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

async fn insert_name(
    pool: &SqlitePool,
    table: &'static str,
    id: &str,
    name: &str,
    created_at: chrono::DateTime<Utc>,
) -> DbResult<()> {
    debug!(table = table, name = %name, "Inserting name");

    let sql = format!("INSERT INTO {} (id, name, created_at) VALUES (?, ?, ?)", table);
    sqlx::query(&sql)
        .bind(id)
        .bind(name)
        .bind(created_at)
        .execute(pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, name),
            other => other,
        })?;

    Ok(())
}

async fn delete_name(pool: &SqlitePool, table: &'static str, entity: &str, id: &str) -> DbResult<()> {
    debug!(table = table, id = %id, "Deleting name");

    let sql = format!("DELETE FROM {} WHERE id = ?", table);
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(entity, id));
    }
    Ok(())
}
