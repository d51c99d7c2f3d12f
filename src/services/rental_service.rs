//! src/services/rental_service.rs
//!
//! RentalService: the only component that reads or writes the `rentals`
//! table. Every write is validated first: presence through
//! [`validation::check`], then the scope-tuple uniqueness query, both inside
//! the same transaction as the write itself. The store's compound unique
//! index backs the query up and its failures surface as the same violation.

use crate::{
    models::rental::{Rental, RentalChanges, RentalFields},
    services::validation::{self, Violations},
};
use chrono::Utc;
use sqlx::{Executor, SqlitePool, Transaction, sqlite::Sqlite};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RentalError {
    #[error("rental `{0}` not found")]
    NotFound(i64),
    #[error("rental is invalid: {0}")]
    Invalid(Violations),
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

pub type RentalResult<T> = Result<T, RentalError>;

/// RentalService provides the five rental operations:
/// - List every rental in creation order
/// - Get one rental by id
/// - Create a rental from a full attribute set
/// - Update a rental from a partial attribute set
/// - Delete a rental permanently
#[derive(Clone)]
pub struct RentalService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl RentalService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// All rentals, oldest first.
    pub async fn list(&self) -> RentalResult<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>(
            "SELECT id, title, owner, city, category, image, bedrooms, description,
                    created_at, updated_at
             FROM rentals ORDER BY id ASC",
        )
        .fetch_all(&*self.db)
        .await?;

        debug!(count = rentals.len(), "listed rentals");
        Ok(rentals)
    }

    pub async fn get(&self, id: i64) -> RentalResult<Rental> {
        let rental = fetch_rental(&*self.db, id).await?;
        debug!(id, "fetched rental");
        Ok(rental)
    }

    /// Validate and insert a new rental.
    ///
    /// Returns `Invalid` with every blank field, or with a single
    /// `title: has already been taken` when the scope tuple is in use.
    pub async fn create(&self, changes: &RentalChanges) -> RentalResult<Rental> {
        let fields = validation::check(None, changes).map_err(rejected)?;

        let mut tx = self.begin_write().await?;
        if scope_taken(&mut *tx, &fields, None).await? {
            return Err(rejected(validation::taken()));
        }

        let now = Utc::now();
        let rental = sqlx::query_as::<_, Rental>(
            r#"
            INSERT INTO rentals (
                title, owner, city, category, image, bedrooms, description,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, owner, city, category, image, bedrooms, description,
                      created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.owner)
        .bind(&fields.city)
        .bind(&fields.category)
        .bind(&fields.image)
        .bind(fields.bedrooms)
        .bind(&fields.description)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(translate_write_error)?;

        tx.commit().await?;
        info!(id = rental.id, title = %rental.title, "created rental");
        Ok(rental)
    }

    /// Merge `changes` over rental `id`, re-validate and persist.
    ///
    /// The uniqueness query ignores the record's own row. `created_at` is
    /// left alone; `updated_at` is refreshed.
    pub async fn update(&self, id: i64, changes: &RentalChanges) -> RentalResult<Rental> {
        let mut tx = self.begin_write().await?;
        let existing = fetch_rental(&mut *tx, id).await?;
        let fields = validation::check(Some(&existing), changes).map_err(rejected)?;

        if scope_taken(&mut *tx, &fields, Some(id)).await? {
            return Err(rejected(validation::taken()));
        }

        let rental = sqlx::query_as::<_, Rental>(
            r#"
            UPDATE rentals SET
                title = ?, owner = ?, city = ?, category = ?, image = ?,
                bedrooms = ?, description = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, title, owner, city, category, image, bedrooms, description,
                      created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.owner)
        .bind(&fields.city)
        .bind(&fields.category)
        .bind(&fields.image)
        .bind(fields.bedrooms)
        .bind(&fields.description)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(translate_write_error)?;

        tx.commit().await?;
        info!(id, "updated rental");
        Ok(rental)
    }

    /// Remove rental `id` permanently.
    ///
    /// Deleting an id that is already gone is `NotFound`, not a no-op.
    pub async fn delete(&self, id: i64) -> RentalResult<()> {
        let result = sqlx::query("DELETE FROM rentals WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RentalError::NotFound(id));
        }

        info!(id, "deleted rental");
        Ok(())
    }

    /// Transaction that takes the write lock at `BEGIN`, so concurrent
    /// writers queue on the busy timeout rather than failing a lock upgrade.
    async fn begin_write(&self) -> RentalResult<Transaction<'static, Sqlite>> {
        Ok(self.db.begin_with("BEGIN IMMEDIATE").await?)
    }
}

async fn fetch_rental<'e, E>(executor: E, id: i64) -> RentalResult<Rental>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Rental>(
        "SELECT id, title, owner, city, category, image, bedrooms, description,
                created_at, updated_at
         FROM rentals WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or(RentalError::NotFound(id))
}

/// True if another row already holds this (title, owner, city, category, bedrooms).
async fn scope_taken<'e, E>(
    executor: E,
    fields: &RentalFields,
    exclude: Option<i64>,
) -> RentalResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let hits = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM rentals
         WHERE title = ? AND owner = ? AND city = ? AND category = ? AND bedrooms = ?
           AND (? IS NULL OR id <> ?)",
    )
    .bind(&fields.title)
    .bind(&fields.owner)
    .bind(&fields.city)
    .bind(&fields.category)
    .bind(fields.bedrooms)
    .bind(exclude)
    .bind(exclude)
    .fetch_one(executor)
    .await?;

    Ok(hits > 0)
}

fn rejected(violations: Violations) -> RentalError {
    debug!(%violations, "rental rejected");
    RentalError::Invalid(violations)
}

/// Map a unique-index failure on write to the uniqueness violation.
fn translate_write_error(err: sqlx::Error) -> RentalError {
    if is_unique_violation(&err) {
        rejected(validation::taken())
    } else {
        RentalError::Store(err)
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
