//! # Product Repository
//!
//! Database operations for products.
//!
//! Products are referenced, never owned, by sale lines: the unit price is
//! copied onto the line at sale time, so edits here never rewrite sales
//! history. Deleting a product that lines still reference is refused by
//! the foreign key constraint.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caja_core::{Money, Product};

const PRODUCT_COLUMNS: &str = "id, sku, name, price_cents, stock, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product and returns it.
    pub async fn create(
        &self,
        sku: Option<String>,
        name: String,
        price: Money,
        stock: i64,
    ) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku,
            name,
            price,
            stock,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Creating product");

        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, price_cents, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products, optionally filtered by a search term over name and
    /// SKU (case-insensitive substring match).
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        let products = if query.is_empty() {
            sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name LIMIT ?1"
            ))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            let pattern = format!("%{query}%");
            sqlx::query_as::<_, Product>(&format!(
                r#"
                SELECT {PRODUCT_COLUMNS} FROM products
                WHERE name LIKE ?1 OR sku LIKE ?1
                ORDER BY name
                LIMIT ?2
                "#
            ))
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Updates a product in full and returns the new state.
    pub async fn update(
        &self,
        id: &str,
        sku: Option<String>,
        name: String,
        price: Money,
        stock: i64,
    ) -> DbResult<Product> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET sku = ?2, name = ?3, price_cents = ?4, stock = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&sku)
        .bind(&name)
        .bind(price)
        .bind(stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Applies a relative stock adjustment (positive = restock, negative =
    /// manual correction) and returns the new state.
    ///
    /// Stock is informational and may go negative.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<Product> {
        let result =
            sqlx::query("UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(delta)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(id = %id, delta = delta, "Stock adjusted");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product.
    ///
    /// Fails with a foreign key violation if any sale line references it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(id = %id, "Product deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use caja_core::Money;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db().await;
        let repo = db.products();

        let created = repo
            .create(
                Some("COKE-330".to_string()),
                "Coca-Cola 330ml".to_string(),
                Money::from_cents(99_000),
                24,
            )
            .await
            .unwrap();

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Coca-Cola 330ml");
        assert_eq!(fetched.price, Money::from_cents(99_000));
        assert_eq!(fetched.stock, 24);
    }

    #[tokio::test]
    async fn test_search_matches_name_and_sku() {
        let db = db().await;
        let repo = db.products();

        repo.create(
            Some("COKE-330".to_string()),
            "Coca-Cola 330ml".to_string(),
            Money::from_cents(99_000),
            0,
        )
        .await
        .unwrap();
        repo.create(None, "Pan Amasado".to_string(), Money::from_cents(50_000), 0)
            .await
            .unwrap();

        let by_name = repo.search("cola", 20).await.unwrap();
        assert_eq!(by_name.len(), 1);

        let by_sku = repo.search("COKE", 20).await.unwrap();
        assert_eq!(by_sku.len(), 1);

        let all = repo.search("", 20).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = db().await;
        let repo = db.products();

        let p = repo
            .create(None, "Old Name".to_string(), Money::from_cents(100), 1)
            .await
            .unwrap();

        let updated = repo
            .update(&p.id, None, "New Name".to_string(), Money::from_cents(200), 5)
            .await
            .unwrap();
        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.price, Money::from_cents(200));

        repo.delete(&p.id).await.unwrap();
        assert!(repo.get_by_id(&p.id).await.unwrap().is_none());
        assert!(repo.delete(&p.id).await.is_err());
    }

    #[tokio::test]
    async fn test_adjust_stock_is_relative() {
        let db = db().await;
        let repo = db.products();

        let p = repo
            .create(None, "Counted".to_string(), Money::from_cents(100), 10)
            .await
            .unwrap();

        assert_eq!(repo.adjust_stock(&p.id, 5).await.unwrap().stock, 15);
        assert_eq!(repo.adjust_stock(&p.id, -20).await.unwrap().stock, -5);
        assert!(repo.adjust_stock("missing", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_negative_stock_is_stored() {
        // Stock is informational and may go negative.
        let db = db().await;
        let repo = db.products();

        let p = repo
            .create(None, "Backordered".to_string(), Money::from_cents(100), -3)
            .await
            .unwrap();
        assert_eq!(p.stock, -3);
    }
}
