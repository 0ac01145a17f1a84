use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use platewise_core::domain::menu::{MenuCategory, MenuItem, MenuItemId, SectionId};
use platewise_core::recommendations::sources::{ItemCatalog, SourceError};

use super::RepositoryError;
use crate::DbPool;

const ITEM_COLUMNS: &str = "id, section_id, title, price, cost, category, total_purchases, is_active";

/// Sqlite-backed menu item catalog.
pub struct SqlItemCatalog {
    pool: DbPool,
}

impl SqlItemCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM menu_items WHERE id = ?"))
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(item_from_row).transpose()
    }

    pub async fn find_active(&self, id: &MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM menu_items WHERE id = ? AND is_active = 1"
        ))
        .bind(id.0.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(item_from_row).transpose()
    }

    pub async fn active_items(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM menu_items WHERE is_active = 1 ORDER BY title ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(item_from_row).collect()
    }
}

#[async_trait::async_trait]
impl ItemCatalog for SqlItemCatalog {
    async fn find_active(&self, id: &MenuItemId) -> Result<Option<MenuItem>, SourceError> {
        SqlItemCatalog::find_active(self, id).await.map_err(catalog_unavailable)
    }

    async fn find_by_id(&self, id: &MenuItemId) -> Result<Option<MenuItem>, SourceError> {
        SqlItemCatalog::find_by_id(self, id).await.map_err(catalog_unavailable)
    }

    async fn active_items(&self) -> Result<Vec<MenuItem>, SourceError> {
        SqlItemCatalog::active_items(self).await.map_err(catalog_unavailable)
    }
}

fn catalog_unavailable(error: RepositoryError) -> SourceError {
    SourceError::CatalogUnavailable(error.to_string())
}

fn item_from_row(row: SqliteRow) -> Result<MenuItem, RepositoryError> {
    // Unknown category labels degrade to None rather than failing the row.
    let category =
        row.try_get::<Option<String>, _>("category")?.as_deref().and_then(MenuCategory::parse);

    Ok(MenuItem {
        id: MenuItemId(parse_uuid("id", &row.try_get::<String, _>("id")?)?),
        title: row.try_get("title")?,
        price: parse_decimal("price", &row.try_get::<String, _>("price")?)?,
        cost: parse_decimal("cost", &row.try_get::<String, _>("cost")?)?,
        section_id: SectionId(parse_uuid("section_id", &row.try_get::<String, _>("section_id")?)?),
        category,
        total_purchases: parse_u64("total_purchases", row.try_get("total_purchases")?)?,
        active: row.try_get::<i64, _>("is_active")? != 0,
    })
}

pub(crate) fn parse_uuid(column: &str, value: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(value)
        .map_err(|error| RepositoryError::Decode(format!("invalid uuid in `{column}`: {error}")))
}

pub(crate) fn parse_decimal(column: &str, value: &str) -> Result<Decimal, RepositoryError> {
    value
        .parse()
        .map_err(|error| RepositoryError::Decode(format!("invalid decimal in `{column}`: {error}")))
}

pub(crate) fn parse_u64(column: &str, value: i64) -> Result<u64, RepositoryError> {
    u64::try_from(value)
        .map_err(|_| RepositoryError::Decode(format!("negative value in `{column}`: {value}")))
}
