//! GraphQL API for the workload engine
//!
//! Provides WorkloadQueries that can be merged into any service's GraphQL
//! schema. All three queries are read-only: none of them assigns a ticket.
//!
//! ## Usage in Services
//!
//! Services should put an `Arc<WorkloadService>` in the GraphQL context.
//! Authentication is done by the service layer before delegating here.
//!
//! Errors carry a `code` extension (`VALIDATION`, `COLLABORATOR_UNAVAILABLE`,
//! `TIMEOUT`, `INTERNAL`) and a `retryable` flag so clients can tell a failed
//! read apart from an empty result. An unknown or inactive resource id is a
//! `VALIDATION` error.

use async_graphql::{Context, Error, ErrorExtensions, Object, Result as GraphQLResult};
use std::sync::Arc;

use crate::models::{
    DashboardRecursos, RecursoDetalhe, SugestaoRecursoInput, SugestaoRecursoResponse,
};
use crate::service::WorkloadService;
use crate::WorkloadError;

impl ErrorExtensions for WorkloadError {
    fn extend(&self) -> Error {
        Error::new(self.to_string()).extend_with(|_, e| {
            let code = match self {
                WorkloadError::Validation(_) | WorkloadError::ResourceNotFound(_) => "VALIDATION",
                WorkloadError::CollaboratorUnavailable(_) | WorkloadError::Database(_) => {
                    "COLLABORATOR_UNAVAILABLE"
                }
                WorkloadError::Timeout(_) => "TIMEOUT",
                WorkloadError::Config(_) | WorkloadError::TomlParse(_) | WorkloadError::Io(_) => {
                    "INTERNAL"
                }
            };
            e.set("code", code);
            e.set("retryable", self.is_retryable());
        })
    }
}

pub struct WorkloadQueries;

#[Object(name = "Query", extends)]
impl WorkloadQueries {
    /// Workload of every active resource, with global summary and alerts
    async fn dashboard_recursos(&self, ctx: &Context<'_>) -> GraphQLResult<DashboardRecursos> {
        let service = ctx.data::<Arc<WorkloadService>>()?;

        let feed = service.dashboard_recursos().await.map_err(|e| e.extend())?;
        Ok(feed)
    }

    /// Load summary for a single resource
    async fn dashboard_recurso(
        &self,
        ctx: &Context<'_>,
        cod_recurso: i32,
    ) -> GraphQLResult<RecursoDetalhe> {
        let service = ctx.data::<Arc<WorkloadService>>()?;

        let detalhe = service
            .dashboard_recurso(cod_recurso)
            .await
            .map_err(|e| e.extend())?;
        Ok(detalhe)
    }

    /// Ranked resources for a prospective ticket
    ///
    /// Note: this only suggests; committing the assignment is a separate write
    async fn sugestao_recurso(
        &self,
        ctx: &Context<'_>,
        input: SugestaoRecursoInput,
    ) -> GraphQLResult<SugestaoRecursoResponse> {
        let service = ctx.data::<Arc<WorkloadService>>()?;

        let sugestao = service
            .sugestao_recurso(&input)
            .await
            .map_err(|e| e.extend())?;
        Ok(sugestao)
    }
}
