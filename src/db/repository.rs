// src/db/repository.rs
// DOCUMENTATION: Document store for restaurant records
// PURPOSE: Persist records as JSONB documents in a single collection table

use crate::errors::ScraperError;
use crate::models::Restaurant;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Stored record with its generated identifier
#[derive(Debug, Clone)]
pub struct StoredRestaurant {
    #[allow(dead_code)]
    pub id: Uuid,
    pub restaurant: Restaurant,
    /// Native timestamp column, not the ISO text inside the document
    pub created_at: DateTime<Utc>,
}

/// Document collection of restaurant records
/// DOCUMENTATION: Single logical collection in a single database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Health check; fails with StoreUnavailable when unreachable
    async fn ping(&self) -> Result<(), ScraperError>;

    /// Insert all records in one call; ids come back in input order
    async fn insert_many(&self, restaurants: &[Restaurant]) -> Result<Vec<Uuid>, ScraperError>;

    async fn find_by_postal_code(
        &self,
        postal_code: &str,
    ) -> Result<Vec<StoredRestaurant>, ScraperError>;

    async fn find_all(&self) -> Result<Vec<StoredRestaurant>, ScraperError>;

    async fn close(&self);
}

/// Internal struct for mapping rows to StoredRestaurant
#[derive(Debug, FromRow)]
struct RestaurantRow {
    pub id: Uuid,
    pub document: Value,
    pub created_at: DateTime<Utc>,
}

impl RestaurantRow {
    fn into_stored(self) -> Result<StoredRestaurant, ScraperError> {
        let restaurant: Restaurant = serde_json::from_value(self.document).map_err(|e| {
            ScraperError::DatabaseError(format!("Malformed document {}: {}", self.id, e))
        })?;

        Ok(StoredRestaurant {
            id: self.id,
            restaurant,
            created_at: self.created_at,
        })
    }
}

/// Document prepared for insertion
/// DOCUMENTATION: Numeric fields are already coerced by the record types
/// (rating and coordinates f64, review count integer); the timestamp is
/// stored natively next to the JSON document
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub id: Uuid,
    pub postal_code: String,
    pub document: Value,
    pub created_at: DateTime<Utc>,
}

impl PreparedDocument {
    pub fn from_restaurant(restaurant: &Restaurant) -> Result<Self, ScraperError> {
        let document = restaurant.to_document().map_err(|e| {
            ScraperError::DatabaseError(format!(
                "Cannot encode {} as a document: {}",
                restaurant.name, e
            ))
        })?;

        Ok(Self {
            id: Uuid::new_v4(),
            postal_code: restaurant.postal_code.clone(),
            document,
            created_at: restaurant.created_at(),
        })
    }
}

const CREATE_COLLECTION_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS restaurants (
        id UUID PRIMARY KEY,
        postal_code TEXT NOT NULL,
        document JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_POSTAL_CODE_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS restaurants_postal_code_idx ON restaurants (postal_code)";

/// PostgreSQL-backed document store
pub struct RestaurantRepository {
    pool: PgPool,
}

impl RestaurantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ping and make sure the collection exists
    async fn connect(&self) -> Result<(), ScraperError> {
        self.ping().await?;

        for statement in [CREATE_COLLECTION_SQL, CREATE_POSTAL_CODE_INDEX_SQL] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    log::error!("Failed to prepare restaurants collection: {}", e);
                    ScraperError::DatabaseError(e.to_string())
                })?;
        }

        Ok(())
    }

    async fn fetch_rows(
        &self,
        postal_code: Option<&str>,
    ) -> Result<Vec<StoredRestaurant>, ScraperError> {
        self.connect().await?;

        let query = match postal_code {
            Some(code) => sqlx::query_as::<_, RestaurantRow>(
                r#"
                    SELECT id, document, created_at FROM restaurants
                    WHERE postal_code = $1
                    ORDER BY created_at, id
                    "#,
            )
            .bind(code.to_string()),
            None => sqlx::query_as::<_, RestaurantRow>(
                r#"
                    SELECT id, document, created_at FROM restaurants
                    ORDER BY created_at, id
                    "#,
            ),
        };

        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            log::error!("Failed to query restaurants: {}", e);
            ScraperError::DatabaseError(format!("Query failed: {}", e))
        })?;

        rows.into_iter().map(RestaurantRow::into_stored).collect()
    }
}

#[async_trait]
impl DocumentStore for RestaurantRepository {
    async fn ping(&self) -> Result<(), ScraperError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Document store not available: {}", e);
                ScraperError::StoreUnavailable(e.to_string())
            })?;
        Ok(())
    }

    async fn insert_many(&self, restaurants: &[Restaurant]) -> Result<Vec<Uuid>, ScraperError> {
        if restaurants.is_empty() {
            return Ok(Vec::new());
        }

        self.connect().await?;

        let prepared = restaurants
            .iter()
            .map(PreparedDocument::from_restaurant)
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO restaurants (id, postal_code, document, created_at) ");
        builder.push_values(&prepared, |mut row, doc| {
            row.push_bind(doc.id)
                .push_bind(doc.postal_code.clone())
                .push_bind(doc.document.clone())
                .push_bind(doc.created_at);
        });

        builder.build().execute(&self.pool).await.map_err(|e| {
            log::error!("Failed to insert {} restaurants: {}", prepared.len(), e);
            ScraperError::DatabaseError(format!("Insert failed: {}", e))
        })?;

        log::info!("Stored {} restaurants", prepared.len());
        Ok(prepared.into_iter().map(|doc| doc.id).collect())
    }

    async fn find_by_postal_code(
        &self,
        postal_code: &str,
    ) -> Result<Vec<StoredRestaurant>, ScraperError> {
        self.fetch_rows(Some(postal_code)).await
    }

    async fn find_all(&self) -> Result<Vec<StoredRestaurant>, ScraperError> {
        self.fetch_rows(None).await
    }

    async fn close(&self) {
        self.pool.close().await;
        log::info!("Document store connection closed");
    }
}
