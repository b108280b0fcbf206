use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::{Bill, BillDraft};
use crate::store::{Store, StoreError, StoreResponse};

const SELECT_BILLS: &str = r#"
    SELECT id, email, type, name, amount, date, vat, pct, commentary,
           file_url, file_name, status, comment_admin
    FROM bills
"#;

/// Postgres-backed bills store
pub struct Database {
    pool: PgPool,
    // Employees only see their own bills
    email: Option<String>,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(database_url: &str, email: Option<String>) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool, email })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the bills table when it does not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bills (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                type TEXT NOT NULL,
                name TEXT NOT NULL,
                amount BIGINT NOT NULL,
                date DATE NOT NULL,
                vat TEXT NOT NULL DEFAULT '',
                pct INTEGER NOT NULL DEFAULT 20,
                commentary TEXT NOT NULL DEFAULT '',
                file_url TEXT NOT NULL,
                file_name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                comment_admin TEXT
            )
            "#,
        )
        .execute(self.get_pool())
        .await?;

        Ok(())
    }

    async fn load_bills(&self) -> Result<Vec<Bill>, sqlx::Error> {
        match &self.email {
            Some(email) => {
                sqlx::query_as::<_, Bill>(&format!("{SELECT_BILLS} WHERE email = $1"))
                    .bind(email)
                    .fetch_all(self.get_pool())
                    .await
            }
            None => {
                sqlx::query_as::<_, Bill>(SELECT_BILLS)
                    .fetch_all(self.get_pool())
                    .await
            }
        }
    }

    async fn insert_bill(&self, draft: &BillDraft) -> Result<(), sqlx::Error> {
        // Start a transaction so the insert and its id are committed together
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO bills (id, email, type, name, amount, date, vat, pct,
                               commentary, file_url, file_name, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(uuid::Uuid::new_v4().simple().to_string())
        .bind(&draft.email)
        .bind(&draft.bill_type)
        .bind(&draft.name)
        .bind(draft.amount)
        .bind(draft.date)
        .bind(&draft.vat)
        .bind(draft.pct)
        .bind(&draft.commentary)
        .bind(&draft.file_url)
        .bind(&draft.file_name)
        .bind(draft.status)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}

#[async_trait]
impl Store for Database {
    async fn get(&self) -> Result<StoreResponse, StoreError> {
        let data = self.load_bills().await?;
        tracing::debug!(count = data.len(), "loaded bills");
        Ok(StoreResponse { data })
    }

    async fn post(&self, draft: &BillDraft) -> Result<StoreResponse, StoreError> {
        self.insert_bill(draft).await?;
        tracing::info!(name = %draft.name, "bill created");

        let data = self.load_bills().await?;
        Ok(StoreResponse { data })
    }
}

/// Initialize the database connection and make sure the schema exists
pub async fn init(database_url: &str, email: Option<String>) -> Result<Database> {
    let db = Database::new(database_url, email).await?;
    db.ensure_schema().await?;
    Ok(db)
}
