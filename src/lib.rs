//! # helpdesk-workload
//!
//! Workload scoring and ticket assignment recommendation for help-desk
//! resources (recursos).
//!
//! ## Features
//!
//! - **Workload Aggregation** - Per-resource load counters, workload score and bucket
//! - **Dashboard Feed** - Resource list, global summary and system alerts
//! - **Resource Detail** - Load status, overdue count and alerts for one resource
//! - **Assignment Suggestions** - Ranked resources for a prospective ticket
//! - **GraphQL API** - Read-only queries over the engine
//! - **Store Adapters** - PostgreSQL snapshot reader and an in-memory store
//!
//! ## Usage
//!
//! ### In a Service
//!
//! ```rust,no_run
//! use helpdesk_workload::{WorkloadConfig, WorkloadRepository, WorkloadService};
//! use sqlx::PgPool;
//! use std::sync::Arc;
//!
//! # async fn example(db_pool: PgPool) {
//! let store = Arc::new(WorkloadRepository::new(db_pool.clone()));
//! let service = Arc::new(WorkloadService::new(store, WorkloadConfig::default()).unwrap());
//!
//! // Schema::build(WorkloadQueries, EmptyMutation, EmptySubscription)
//! //     .data(service)
//! //     .finish()
//! # }
//! ```
//!
//! ### Scoring a snapshot directly
//!
//! ```rust
//! use helpdesk_workload::{workload, Recurso, ResourceSnapshot, WorkloadBucket, WorkloadConfig};
//!
//! let snapshot = ResourceSnapshot::new(Recurso::new(1, "Ana"));
//! let stats = workload::aggregate(&snapshot, chrono::Utc::now(), &WorkloadConfig::default());
//! assert_eq!(stats.recomendacao, WorkloadBucket::Disponivel);
//! ```

pub mod catalog;
pub mod config;
pub mod graphql;
pub mod models;
pub mod recommender;
pub mod repository;
pub mod service;
pub mod store;
pub mod workload;

// Re-export commonly used types
pub use config::WorkloadConfig;
pub use graphql::WorkloadQueries;
pub use models::*;
pub use repository::WorkloadRepository;
pub use service::WorkloadService;
pub use store::{InMemoryTicketStore, TicketStore};

use thiserror::Error;

/// Workload engine errors
#[derive(Error, Debug)]
pub enum WorkloadError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Resource not found: {0}")]
    ResourceNotFound(i32),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Ticket store unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Ticket store did not answer within {0}s")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkloadError {
    /// Errors caused by the request itself. Never retryable.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::ResourceNotFound(_))
    }

    /// The ticket store could not be read; the caller may try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::CollaboratorUnavailable(_) | Self::Timeout(_)
        )
    }

    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        Self::CollaboratorUnavailable(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, WorkloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes_are_disjoint() {
        let validation = WorkloadError::validation("prioridade must be positive");
        assert!(validation.is_validation());
        assert!(!validation.is_retryable());

        let missing = WorkloadError::ResourceNotFound(7);
        assert!(missing.is_validation());
        assert!(!missing.is_retryable());

        let timeout = WorkloadError::Timeout(10);
        assert!(timeout.is_retryable());
        assert!(!timeout.is_validation());

        let unavailable = WorkloadError::unavailable("connection refused");
        assert!(unavailable.is_retryable());

        let config = WorkloadError::Config("bad threshold".to_string());
        assert!(!config.is_retryable());
        assert!(!config.is_validation());
    }
}
