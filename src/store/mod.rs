//! Store client abstraction over the remote bills API.
//!
//! Every failure is labelled with an HTTP-like status code and displays as
//! `Erreur <code>`, which is the text the bills page shows verbatim.

pub mod fixture;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Bill, BillDraft};

/// Payload returned by both store operations.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreResponse {
    pub data: Vec<Bill>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Erreur {0}")]
    Status(u16),
    #[error("Erreur 500")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    pub fn code(&self) -> u16 {
        match self {
            StoreError::Status(code) => *code,
            StoreError::Database(_) => 500,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::Status(404),
            other => {
                tracing::error!(error = %other, "bills query failed");
                StoreError::Database(other)
            }
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch every bill visible to the current user.
    async fn get(&self) -> Result<StoreResponse, StoreError>;

    /// Insert a new bill and return the updated collection.
    async fn post(&self, draft: &BillDraft) -> Result<StoreResponse, StoreError>;
}
