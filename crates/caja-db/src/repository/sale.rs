//! # Sale Repository
//!
//! Database operations for sale documents (receipts and invoices) and
//! their line items.
//!
//! ## Sale Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              create_sale: ONE atomic transaction                │
//! │                                                                 │
//! │  1. INSERT header (receipts or invoices) with zero totals       │
//! │  2. For each requested line, in input order:                    │
//! │     ├── resolve product (unknown id → NotFound, full rollback)  │
//! │     ├── unit price := override (if allowed) or product price    │
//! │     ├── subtotal   := quantity × unit price (exact, checked)    │
//! │     └── INSERT line                                             │
//! │  3. net := Σ subtotals, tax := round(net × 19%),                │
//! │     total := net + tax                                          │
//! │  4. UPDATE header with the three totals                         │
//! │  5. COMMIT                                                      │
//! │                                                                 │
//! │  Any failure before COMMIT leaves the store untouched.          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are written once, here. Nothing recomputes them later.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caja_core::{
    line_subtotal, validation::validate_new_sale, CoreError, DocumentKind, InvoiceBuyer, Money,
    NewSale, Sale, SaleLine, SaleTotals, ValidationError,
};

const LINE_COLUMNS: &str = "id, sale_kind, sale_id, product_id, product_name, position, \
                            quantity, unit_price_cents, subtotal_cents";

/// Retries for an auto-generated number that loses a race to a concurrent
/// creation.
const MAX_NUMBER_RETRIES: u32 = 3;

// =============================================================================
// Row Types
// =============================================================================

/// Flat receipt header row.
#[derive(sqlx::FromRow)]
struct ReceiptRow {
    id: String,
    number: String,
    user_id: String,
    net_cents: Money,
    tax_cents: Money,
    total_cents: Money,
    created_at: chrono::DateTime<Utc>,
}

/// Flat invoice header row.
#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    number: String,
    user_id: String,
    buyer_tax_id: String,
    buyer_legal_name: String,
    buyer_activity: String,
    buyer_address: String,
    net_cents: Money,
    tax_cents: Money,
    total_cents: Money,
    created_at: chrono::DateTime<Utc>,
}

/// Product fields the sale builder needs.
#[derive(sqlx::FromRow)]
struct ProductPick {
    name: String,
    price_cents: Money,
}

impl ReceiptRow {
    fn into_sale(self, lines: Vec<SaleLine>) -> Sale {
        Sale {
            id: self.id,
            kind: DocumentKind::Receipt,
            number: self.number,
            user_id: self.user_id,
            buyer: None,
            net: self.net_cents,
            tax: self.tax_cents,
            total: self.total_cents,
            created_at: self.created_at,
            lines,
        }
    }
}

impl InvoiceRow {
    fn into_sale(self, lines: Vec<SaleLine>) -> Sale {
        Sale {
            id: self.id,
            kind: DocumentKind::Invoice,
            number: self.number,
            user_id: self.user_id,
            buyer: Some(InvoiceBuyer {
                tax_id: self.buyer_tax_id,
                legal_name: self.buyer_legal_name,
                activity: self.buyer_activity,
                address: self.buyer_address,
            }),
            net: self.net_cents,
            tax: self.tax_cents,
            total: self.total_cents,
            created_at: self.created_at,
            lines,
        }
    }
}

// =============================================================================
// Daily Report
// =============================================================================

/// Aggregate sales figures for one calendar day, across both document
/// variants.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub date: NaiveDate,
    pub total_sold: Money,
    pub document_count: i64,
}

// =============================================================================
// Sale Repository
// =============================================================================

/// Repository for sale document operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a sale document with its line items and computed totals,
    /// all inside one transaction.
    ///
    /// ## Arguments
    /// * `kind` - document variant to issue
    /// * `user_id` - issuing user
    /// * `req` - header fields plus ordered line items
    /// * `allow_price_override` - whether caller-supplied unit prices are
    ///   honored; when false, any override is rejected before the
    ///   transaction opens
    ///
    /// ## Guarantees
    /// Either the header, every line, and the totals are durably
    /// persisted, or none of them are. An unknown product on line N rolls
    /// back lines 1..N-1 and the header.
    pub async fn create_sale(
        &self,
        kind: DocumentKind,
        user_id: &str,
        req: &NewSale,
        allow_price_override: bool,
    ) -> DbResult<Sale> {
        validate_new_sale(kind, req)?;

        if !allow_price_override {
            if let Some(line) = req.lines.iter().find(|l| l.unit_price.is_some()) {
                debug!(product_id = %line.product_id, "Rejecting price override");
                return Err(CoreError::Validation(ValidationError::InvalidFormat {
                    field: "unitPrice".to_string(),
                    reason: "price override is not allowed".to_string(),
                })
                .into());
            }
        }

        if let Some(number) = &req.number {
            return self
                .insert_sale(kind, user_id, req, number.trim().to_string())
                .await;
        }

        // Auto-numbered path. The next sequence value comes from the store,
        // so a racing creation can compute the same number; regenerate and
        // retry instead of surfacing a conflict the caller cannot act on.
        let mut attempt = 0;
        loop {
            let number = self.next_document_number(kind).await?;
            match self.insert_sale(kind, user_id, req, number).await {
                Err(DbError::UniqueViolation { .. }) if attempt < MAX_NUMBER_RETRIES => {
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Runs the creation transaction with a settled document number.
    async fn insert_sale(
        &self,
        kind: DocumentKind,
        user_id: &str,
        req: &NewSale,
        number: String,
    ) -> DbResult<Sale> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(kind = %kind, id = %id, number = %number, lines = req.lines.len(), "Creating sale");

        let mut tx = self.pool.begin().await?;

        // 1. Header with zero totals. A duplicate document number surfaces
        //    here as a unique violation.
        let header_result = match (kind, &req.buyer) {
            (DocumentKind::Receipt, _) => {
                sqlx::query(
                    r#"
                    INSERT INTO receipts (id, number, user_id, net_cents, tax_cents, total_cents, created_at)
                    VALUES (?1, ?2, ?3, 0, 0, 0, ?4)
                    "#,
                )
                .bind(&id)
                .bind(&number)
                .bind(user_id)
                .bind(now)
                .execute(&mut *tx)
                .await
            }
            (DocumentKind::Invoice, Some(buyer)) => {
                sqlx::query(
                    r#"
                    INSERT INTO invoices (
                        id, number, user_id,
                        buyer_tax_id, buyer_legal_name, buyer_activity, buyer_address,
                        net_cents, tax_cents, total_cents, created_at
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0, 0, ?8)
                    "#,
                )
                .bind(&id)
                .bind(&number)
                .bind(user_id)
                .bind(&buyer.tax_id)
                .bind(&buyer.legal_name)
                .bind(&buyer.activity)
                .bind(&buyer.address)
                .bind(now)
                .execute(&mut *tx)
                .await
            }
            // validate_new_sale guarantees the buyer block for invoices
            (DocumentKind::Invoice, None) => {
                return Err(CoreError::Validation(ValidationError::Required {
                    field: "buyer".to_string(),
                })
                .into());
            }
        };

        header_result.map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("number", &number),
            other => other,
        })?;

        // 2. Lines, in input order.
        let mut lines = Vec::with_capacity(req.lines.len());
        let mut subtotals = Vec::with_capacity(req.lines.len());

        for (position, line) in req.lines.iter().enumerate() {
            let product = sqlx::query_as::<_, ProductPick>(
                "SELECT name, price_cents FROM products WHERE id = ?1",
            )
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;

            // The price on the line is whatever was agreed at the register:
            // the override when supplied, the catalog price otherwise.
            let unit_price = line.unit_price.unwrap_or(product.price_cents);
            let subtotal = line_subtotal(line.quantity, unit_price)?;

            let sale_line = SaleLine {
                id: Uuid::new_v4().to_string(),
                sale_kind: kind,
                sale_id: id.clone(),
                product_id: line.product_id.clone(),
                product_name: product.name,
                position: position as i64,
                quantity: line.quantity,
                unit_price,
                subtotal,
            };

            sqlx::query(&format!(
                r#"
                INSERT INTO sale_lines ({LINE_COLUMNS})
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#
            ))
            .bind(&sale_line.id)
            .bind(sale_line.sale_kind)
            .bind(&sale_line.sale_id)
            .bind(&sale_line.product_id)
            .bind(&sale_line.product_name)
            .bind(sale_line.position)
            .bind(sale_line.quantity)
            .bind(sale_line.unit_price)
            .bind(sale_line.subtotal)
            .execute(&mut *tx)
            .await?;

            subtotals.push(subtotal);
            lines.push(sale_line);
        }

        // 3. Aggregate and write the totals back onto the header.
        let totals = SaleTotals::from_subtotals(subtotals)?;
        self.write_totals(&mut tx, kind, &id, totals).await?;

        tx.commit().await?;

        info!(
            kind = %kind,
            id = %id,
            number = %number,
            total = %totals.total,
            lines = lines.len(),
            "Sale created"
        );

        Ok(Sale {
            id,
            kind,
            number,
            user_id: user_id.to_string(),
            buyer: req.buyer.clone(),
            net: totals.net,
            tax: totals.tax,
            total: totals.total,
            created_at: now,
            lines,
        })
    }

    async fn write_totals(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        kind: DocumentKind,
        id: &str,
        totals: SaleTotals,
    ) -> DbResult<()> {
        let sql = match kind {
            DocumentKind::Receipt => {
                "UPDATE receipts SET net_cents = ?2, tax_cents = ?3, total_cents = ?4 WHERE id = ?1"
            }
            DocumentKind::Invoice => {
                "UPDATE invoices SET net_cents = ?2, tax_cents = ?3, total_cents = ?4 WHERE id = ?1"
            }
        };

        let result = sqlx::query(sql)
            .bind(id)
            .bind(totals.net)
            .bind(totals.tax)
            .bind(totals.total)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(kind.as_str(), id));
        }

        Ok(())
    }

    /// Gets a sale document by ID, with its lines in input order.
    pub async fn get(&self, kind: DocumentKind, id: &str) -> DbResult<Option<Sale>> {
        let sale = match kind {
            DocumentKind::Receipt => {
                let row = sqlx::query_as::<_, ReceiptRow>(
                    "SELECT id, number, user_id, net_cents, tax_cents, total_cents, created_at \
                     FROM receipts WHERE id = ?1",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

                match row {
                    Some(row) => {
                        let lines = self.get_lines(kind, id).await?;
                        Some(row.into_sale(lines))
                    }
                    None => None,
                }
            }
            DocumentKind::Invoice => {
                let row = sqlx::query_as::<_, InvoiceRow>(
                    "SELECT id, number, user_id, buyer_tax_id, buyer_legal_name, buyer_activity, \
                     buyer_address, net_cents, tax_cents, total_cents, created_at \
                     FROM invoices WHERE id = ?1",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

                match row {
                    Some(row) => {
                        let lines = self.get_lines(kind, id).await?;
                        Some(row.into_sale(lines))
                    }
                    None => None,
                }
            }
        };

        Ok(sale)
    }

    /// Lists sale documents of one kind, newest first, lines included.
    pub async fn list(&self, kind: DocumentKind, limit: u32) -> DbResult<Vec<Sale>> {
        let mut sales = Vec::new();

        match kind {
            DocumentKind::Receipt => {
                let rows = sqlx::query_as::<_, ReceiptRow>(
                    "SELECT id, number, user_id, net_cents, tax_cents, total_cents, created_at \
                     FROM receipts ORDER BY created_at DESC LIMIT ?1",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;

                for row in rows {
                    let lines = self.get_lines(kind, &row.id).await?;
                    sales.push(row.into_sale(lines));
                }
            }
            DocumentKind::Invoice => {
                let rows = sqlx::query_as::<_, InvoiceRow>(
                    "SELECT id, number, user_id, buyer_tax_id, buyer_legal_name, buyer_activity, \
                     buyer_address, net_cents, tax_cents, total_cents, created_at \
                     FROM invoices ORDER BY created_at DESC LIMIT ?1",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;

                for row in rows {
                    let lines = self.get_lines(kind, &row.id).await?;
                    sales.push(row.into_sale(lines));
                }
            }
        }

        Ok(sales)
    }

    /// Gets all lines of a sale in input order.
    pub async fn get_lines(&self, kind: DocumentKind, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM sale_lines \
             WHERE sale_kind = ?1 AND sale_id = ?2 ORDER BY position"
        ))
        .bind(kind)
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Deletes a sale document and its lines, transactionally.
    ///
    /// The cascade runs here because the tagged line reference spans two
    /// header tables.
    pub async fn delete(&self, kind: DocumentKind, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sale_lines WHERE sale_kind = ?1 AND sale_id = ?2")
            .bind(kind)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let sql = match kind {
            DocumentKind::Receipt => "DELETE FROM receipts WHERE id = ?1",
            DocumentKind::Invoice => "DELETE FROM invoices WHERE id = ?1",
        };
        let result = sqlx::query(sql).bind(id).execute(&mut *tx).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(kind.as_str(), id));
        }

        tx.commit().await?;

        info!(kind = %kind, id = %id, "Sale deleted");
        Ok(())
    }

    /// Aggregates total sold and document count for one calendar day,
    /// across receipts and invoices.
    pub async fn daily_report(&self, date: NaiveDate) -> DbResult<DailyReport> {
        let (receipt_total, receipt_count): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_cents), 0), COUNT(*) FROM receipts \
             WHERE date(created_at) = ?1",
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        let (invoice_total, invoice_count): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_cents), 0), COUNT(*) FROM invoices \
             WHERE date(created_at) = ?1",
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(DailyReport {
            date,
            total_sold: Money::from_cents(receipt_total + invoice_total),
            document_count: receipt_count + invoice_count,
        })
    }
}

impl SaleRepository {
    /// Computes the next document number: `B-YYYYMMDD-NNNN` for receipts,
    /// `F-YYYYMMDD-NNNN` for invoices.
    ///
    /// The sequence restarts at 0001 each day and each variant counts
    /// independently. It advances past the highest suffix already stored
    /// for today, including caller-supplied numbers that happen to match
    /// the pattern. Callers that need externally assigned folios supply
    /// their own number instead.
    async fn next_document_number(&self, kind: DocumentKind) -> DbResult<String> {
        let now = Utc::now();
        let (prefix, table) = match kind {
            DocumentKind::Receipt => ("B", "receipts"),
            DocumentKind::Invoice => ("F", "invoices"),
        };
        let day = now.format("%Y%m%d");

        // Prefix "X-YYYYMMDD-" is 11 characters, so the suffix starts at
        // position 12 (substr is 1-based). Non-numeric suffixes cast to 0.
        let max_seq: i64 = sqlx::query_scalar(&format!(
            "SELECT COALESCE(MAX(CAST(substr(number, 12) AS INTEGER)), 0) \
             FROM {table} WHERE number LIKE ?1"
        ))
        .bind(format!("{prefix}-{day}-%"))
        .fetch_one(&self.pool)
        .await?;

        Ok(format!("{}-{}-{:04}", prefix, day, max_seq + 1))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use caja_core::{NewSaleLine, Role};

    struct Fixture {
        db: Database,
        user_id: String,
        product_a: String,
        product_b: String,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = db
            .users()
            .create("cashier".to_string(), "hash".to_string(), Role::Seller)
            .await
            .unwrap();

        let a = db
            .products()
            .create(None, "Widget A".to_string(), Money::from_cents(100_000), 10)
            .await
            .unwrap();
        let b = db
            .products()
            .create(None, "Widget B".to_string(), Money::from_cents(50_000), 10)
            .await
            .unwrap();

        Fixture {
            db,
            user_id: user.id,
            product_a: a.id,
            product_b: b.id,
        }
    }

    fn request(lines: Vec<NewSaleLine>) -> NewSale {
        NewSale {
            number: None,
            buyer: None,
            lines,
        }
    }

    fn buyer() -> InvoiceBuyer {
        InvoiceBuyer {
            tax_id: "76.543.210-K".to_string(),
            legal_name: "Comercial Andina SpA".to_string(),
            activity: "Retail".to_string(),
            address: "Av. Siempre Viva 742".to_string(),
        }
    }

    async fn count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_worked_example_totals() {
        let fx = fixture().await;

        let sale = fx
            .db
            .sales()
            .create_sale(
                DocumentKind::Receipt,
                &fx.user_id,
                &request(vec![
                    NewSaleLine {
                        product_id: fx.product_a.clone(),
                        quantity: 3,
                        unit_price: None,
                    },
                    NewSaleLine {
                        product_id: fx.product_b.clone(),
                        quantity: 1,
                        unit_price: None,
                    },
                ]),
                true,
            )
            .await
            .unwrap();

        assert_eq!(sale.net.to_string(), "3500.00");
        assert_eq!(sale.tax.to_string(), "665.00");
        assert_eq!(sale.total.to_string(), "4165.00");
        assert_eq!(sale.total, sale.net + sale.tax);

        // Persisted state matches the returned value.
        let stored = fx
            .db
            .sales()
            .get(DocumentKind::Receipt, &sale.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.net, sale.net);
        assert_eq!(stored.lines.len(), 2);
        assert_eq!(stored.lines[0].subtotal.to_string(), "3000.00");
        assert_eq!(stored.lines[1].subtotal.to_string(), "500.00");
    }

    #[tokio::test]
    async fn test_line_order_is_preserved() {
        let fx = fixture().await;

        let lines: Vec<NewSaleLine> = (1..=5)
            .map(|q| NewSaleLine {
                product_id: if q % 2 == 0 {
                    fx.product_a.clone()
                } else {
                    fx.product_b.clone()
                },
                quantity: q,
                unit_price: None,
            })
            .collect();

        let sale = fx
            .db
            .sales()
            .create_sale(DocumentKind::Receipt, &fx.user_id, &request(lines), true)
            .await
            .unwrap();

        let stored = fx
            .db
            .sales()
            .get_lines(DocumentKind::Receipt, &sale.id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 5);
        for (i, line) in stored.iter().enumerate() {
            assert_eq!(line.position, i as i64);
            assert_eq!(line.quantity, (i + 1) as i64);
        }
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_back_everything() {
        let fx = fixture().await;

        let err = fx
            .db
            .sales()
            .create_sale(
                DocumentKind::Receipt,
                &fx.user_id,
                &request(vec![
                    NewSaleLine {
                        product_id: fx.product_a.clone(),
                        quantity: 1,
                        unit_price: None,
                    },
                    NewSaleLine {
                        product_id: "no-such-product".to_string(),
                        quantity: 1,
                        unit_price: None,
                    },
                ]),
                true,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));

        // Store unchanged from before the call: no header, no lines.
        assert_eq!(count(&fx.db, "receipts").await, 0);
        assert_eq!(count(&fx.db, "sale_lines").await, 0);
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_before_any_write() {
        let fx = fixture().await;

        let err = fx
            .db
            .sales()
            .create_sale(
                DocumentKind::Receipt,
                &fx.user_id,
                &request(vec![NewSaleLine {
                    product_id: fx.product_a.clone(),
                    quantity: 0,
                    unit_price: None,
                }]),
                true,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert_eq!(count(&fx.db, "receipts").await, 0);
    }

    #[tokio::test]
    async fn test_empty_line_list_yields_zero_total_sale() {
        let fx = fixture().await;

        let sale = fx
            .db
            .sales()
            .create_sale(DocumentKind::Receipt, &fx.user_id, &request(vec![]), true)
            .await
            .unwrap();

        assert!(sale.net.is_zero());
        assert!(sale.total.is_zero());
        assert!(sale.lines.is_empty());
    }

    #[tokio::test]
    async fn test_price_override_honored_and_copied() {
        let fx = fixture().await;

        let sale = fx
            .db
            .sales()
            .create_sale(
                DocumentKind::Receipt,
                &fx.user_id,
                &request(vec![NewSaleLine {
                    product_id: fx.product_a.clone(),
                    quantity: 2,
                    unit_price: Some(Money::from_cents(80_000)),
                }]),
                true,
            )
            .await
            .unwrap();

        assert_eq!(sale.lines[0].unit_price, Money::from_cents(80_000));
        assert_eq!(sale.net, Money::from_cents(160_000));

        // Changing the catalog price afterwards does not touch the line.
        fx.db
            .products()
            .update(
                &fx.product_a,
                None,
                "Widget A".to_string(),
                Money::from_cents(999_900),
                10,
            )
            .await
            .unwrap();
        let stored = fx
            .db
            .sales()
            .get(DocumentKind::Receipt, &sale.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.lines[0].unit_price, Money::from_cents(80_000));
    }

    #[tokio::test]
    async fn test_price_override_rejected_by_policy() {
        let fx = fixture().await;

        let err = fx
            .db
            .sales()
            .create_sale(
                DocumentKind::Receipt,
                &fx.user_id,
                &request(vec![NewSaleLine {
                    product_id: fx.product_a.clone(),
                    quantity: 1,
                    unit_price: Some(Money::from_cents(1)),
                }]),
                false,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(_)));
        assert_eq!(count(&fx.db, "receipts").await, 0);
    }

    #[tokio::test]
    async fn test_invoice_carries_buyer_and_own_numbering() {
        let fx = fixture().await;

        let sale = fx
            .db
            .sales()
            .create_sale(
                DocumentKind::Invoice,
                &fx.user_id,
                &NewSale {
                    number: Some("F-0001".to_string()),
                    buyer: Some(buyer()),
                    lines: vec![NewSaleLine {
                        product_id: fx.product_b.clone(),
                        quantity: 1,
                        unit_price: None,
                    }],
                },
                true,
            )
            .await
            .unwrap();

        assert_eq!(sale.kind, DocumentKind::Invoice);
        assert_eq!(sale.number, "F-0001");

        let stored = fx
            .db
            .sales()
            .get(DocumentKind::Invoice, &sale.id)
            .await
            .unwrap()
            .unwrap();
        let stored_buyer = stored.buyer.unwrap();
        assert_eq!(stored_buyer.legal_name, "Comercial Andina SpA");

        // Receipts may reuse an invoice number; variants number separately.
        fx.db
            .sales()
            .create_sale(
                DocumentKind::Receipt,
                &fx.user_id,
                &NewSale {
                    number: Some("F-0001".to_string()),
                    buyer: None,
                    lines: vec![],
                },
                true,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_generated_numbers_are_sequential_and_unique() {
        let fx = fixture().await;
        let sales = fx.db.sales();
        let day = Utc::now().format("%Y%m%d").to_string();

        // Same-day auto-numbered documents must never collide with each
        // other; a generated number is not the caller's fault and must not
        // surface as a conflict.
        let mut numbers = std::collections::HashSet::new();
        for _ in 0..5 {
            let sale = sales
                .create_sale(DocumentKind::Receipt, &fx.user_id, &request(vec![]), true)
                .await
                .unwrap();
            assert!(
                numbers.insert(sale.number.clone()),
                "generated number repeated: {}",
                sale.number
            );
        }
        assert!(numbers.contains(&format!("B-{day}-0001")));
        assert!(numbers.contains(&format!("B-{day}-0005")));

        // Variants number independently.
        let invoice = sales
            .create_sale(
                DocumentKind::Invoice,
                &fx.user_id,
                &NewSale {
                    number: None,
                    buyer: Some(buyer()),
                    lines: vec![],
                },
                true,
            )
            .await
            .unwrap();
        assert_eq!(invoice.number, format!("F-{day}-0001"));
    }

    #[tokio::test]
    async fn test_generated_number_advances_past_supplied_numbers() {
        let fx = fixture().await;
        let sales = fx.db.sales();
        let day = Utc::now().format("%Y%m%d").to_string();

        sales
            .create_sale(
                DocumentKind::Receipt,
                &fx.user_id,
                &NewSale {
                    number: Some(format!("B-{day}-0041")),
                    buyer: None,
                    lines: vec![],
                },
                true,
            )
            .await
            .unwrap();

        let sale = sales
            .create_sale(DocumentKind::Receipt, &fx.user_id, &request(vec![]), true)
            .await
            .unwrap();
        assert_eq!(sale.number, format!("B-{day}-0042"));
    }

    #[tokio::test]
    async fn test_duplicate_number_is_conflict() {
        let fx = fixture().await;

        let req = NewSale {
            number: Some("B-777".to_string()),
            buyer: None,
            lines: vec![],
        };

        fx.db
            .sales()
            .create_sale(DocumentKind::Receipt, &fx.user_id, &req, true)
            .await
            .unwrap();

        let err = fx
            .db
            .sales()
            .create_sale(DocumentKind::Receipt, &fx.user_id, &req, true)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // Only the first document exists.
        assert_eq!(count(&fx.db, "receipts").await, 1);
    }

    #[tokio::test]
    async fn test_delete_cascades_lines() {
        let fx = fixture().await;

        let sale = fx
            .db
            .sales()
            .create_sale(
                DocumentKind::Receipt,
                &fx.user_id,
                &request(vec![NewSaleLine {
                    product_id: fx.product_a.clone(),
                    quantity: 1,
                    unit_price: None,
                }]),
                true,
            )
            .await
            .unwrap();

        assert_eq!(count(&fx.db, "sale_lines").await, 1);

        fx.db
            .sales()
            .delete(DocumentKind::Receipt, &sale.id)
            .await
            .unwrap();

        assert_eq!(count(&fx.db, "receipts").await, 0);
        assert_eq!(count(&fx.db, "sale_lines").await, 0);
    }

    #[tokio::test]
    async fn test_daily_report_sums_both_variants() {
        let fx = fixture().await;
        let sales = fx.db.sales();

        sales
            .create_sale(
                DocumentKind::Receipt,
                &fx.user_id,
                &request(vec![NewSaleLine {
                    product_id: fx.product_a.clone(),
                    quantity: 1,
                    unit_price: None,
                }]),
                true,
            )
            .await
            .unwrap();
        sales
            .create_sale(
                DocumentKind::Invoice,
                &fx.user_id,
                &NewSale {
                    number: None,
                    buyer: Some(buyer()),
                    lines: vec![NewSaleLine {
                        product_id: fx.product_b.clone(),
                        quantity: 2,
                        unit_price: None,
                    }],
                },
                true,
            )
            .await
            .unwrap();

        let report = sales.daily_report(Utc::now().date_naive()).await.unwrap();
        assert_eq!(report.document_count, 2);
        // 1000 × 1.19 + 1000 × 1.19 = 2380.00
        assert_eq!(report.total_sold.to_string(), "2380.00");

        let empty = sales
            .daily_report(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(empty.document_count, 0);
        assert!(empty.total_sold.is_zero());
    }
}
