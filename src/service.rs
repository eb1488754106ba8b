//! Request-level orchestration.
//!
//! Each operation reads one snapshot from the ticket store, bounded by the
//! configured timeout, and hands it to the pure projections. A failed or
//! late read is reported as an error; it is never replaced by empty data.

use std::future::Future;
use std::sync::Arc;

use crate::config::WorkloadConfig;
use crate::models::{
    CatalogSnapshot, DashboardRecursos, RecursoDetalhe, SugestaoRecursoInput,
    SugestaoRecursoResponse,
};
use crate::store::TicketStore;
use crate::{catalog, recommender, Result, WorkloadError};

pub struct WorkloadService {
    store: Arc<dyn TicketStore>,
    config: WorkloadConfig,
}

impl WorkloadService {
    pub fn new(store: Arc<dyn TicketStore>, config: WorkloadConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Dashboard feed: per-resource stats, global summary and alerts.
    pub async fn dashboard_recursos(&self) -> Result<DashboardRecursos> {
        let janela = self.config.sla.janela_resolucao();
        let snapshot = self
            .read("catalog_snapshot", self.store.catalog_snapshot(janela))
            .await?;

        let feed = catalog::dashboard(&snapshot, &self.config);
        tracing::debug!(
            recursos = feed.recursos.len(),
            alertas = feed.alertas.len(),
            "Computed resource dashboard"
        );
        Ok(feed)
    }

    /// Load summary for one active resource.
    pub async fn dashboard_recurso(&self, cod_recurso: i32) -> Result<RecursoDetalhe> {
        if cod_recurso <= 0 {
            return Err(WorkloadError::validation(format!(
                "codRecurso must be positive, got {cod_recurso}"
            )));
        }

        let janela = self.config.sla.janela_resolucao();
        let snapshot = self
            .read("resource_snapshot", self.store.resource_snapshot(cod_recurso, janela))
            .await?;

        let lido_em = snapshot.lido_em;
        let recurso = snapshot
            .recursos
            .into_iter()
            .find(|r| r.recurso.cod_recurso == cod_recurso)
            .ok_or(WorkloadError::ResourceNotFound(cod_recurso))?;

        Ok(catalog::detalhe(&recurso, lido_em, &self.config))
    }

    /// Ranks every active resource for a prospective ticket.
    pub async fn sugestao_recurso(
        &self,
        input: &SugestaoRecursoInput,
    ) -> Result<SugestaoRecursoResponse> {
        recommender::validate(input, &self.config).map_err(|e| {
            tracing::warn!(prioridade = input.prioridade, "Rejected suggestion request: {}", e);
            e
        })?;

        let janela = self.config.sla.janela_resolucao();
        let snapshot: CatalogSnapshot = self
            .read("catalog_snapshot", self.store.catalog_snapshot(janela))
            .await?;

        let response = recommender::recommend(&snapshot, input, &self.config)?;

        match &response.sugestao.recurso_recomendado {
            Some(melhor) => tracing::info!(
                prioridade = input.prioridade,
                cod_cliente = input.cod_cliente.as_deref().unwrap_or("-"),
                assunto = input.assunto.as_deref().unwrap_or("-"),
                cod_recurso = melhor.cod_recurso,
                score = melhor.score_adequacao,
                adequacao = %melhor.adequacao,
                "Suggested resource"
            ),
            None => tracing::info!(prioridade = input.prioridade, "No resource to suggest"),
        }

        Ok(response)
    }

    async fn read<F>(&self, operation: &'static str, fut: F) -> Result<CatalogSnapshot>
    where
        F: Future<Output = Result<CatalogSnapshot>>,
    {
        let timeout = self.config.store.timeout();
        match tokio::time::timeout(timeout, fut).await {
            Ok(Ok(snapshot)) => Ok(snapshot),
            Ok(Err(e)) => {
                tracing::error!(operation, "Ticket store read failed: {}", e);
                Err(e)
            }
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout_secs = self.config.store.timeout_secs,
                    "Ticket store read timed out"
                );
                Err(WorkloadError::Timeout(self.config.store.timeout_secs))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChamadoAtivo, Recurso};
    use crate::store::InMemoryTicketStore;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    async fn service() -> (Arc<InMemoryTicketStore>, WorkloadService) {
        let store = Arc::new(InMemoryTicketStore::with_clock(now()));
        store.upsert_recurso(Recurso::new(1, "Ana")).await;
        store.upsert_recurso(Recurso::new(2, "Bruno")).await;
        let service = WorkloadService::new(store.clone(), WorkloadConfig::default()).unwrap();
        (store, service)
    }

    #[tokio::test]
    async fn test_dashboard_reads_store() {
        let (store, service) = service().await;
        store
            .add_chamado(1, ChamadoAtivo::new(1, 200, now() - Duration::hours(1)).escalado())
            .await;

        let feed = service.dashboard_recursos().await.unwrap();
        assert_eq!(feed.recursos.len(), 2);
        assert_eq!(feed.recursos[0].cod_recurso, 1);
        assert_eq!(feed.resumo_geral.total_chamados_criticos, 1);
        assert_eq!(feed.resumo_geral.recursos_disponiveis, 1);
    }

    #[tokio::test]
    async fn test_unknown_resource_is_validation_error() {
        let (_, service) = service().await;
        let err = service.dashboard_recurso(42).await.unwrap_err();
        assert!(matches!(err, WorkloadError::ResourceNotFound(42)));
        assert!(err.is_validation());

        let err = service.dashboard_recurso(0).await.unwrap_err();
        assert!(matches!(err, WorkloadError::Validation(_)));
    }

    #[tokio::test]
    async fn test_suggestion_validates_before_reading() {
        let (_, service) = service().await;
        let err = service
            .sugestao_recurso(&SugestaoRecursoInput {
                prioridade: -5,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = WorkloadConfig::default();
        config.adequacao.limiar_bom = 10.0;
        let store: Arc<dyn TicketStore> = Arc::new(InMemoryTicketStore::new());
        assert!(matches!(
            WorkloadService::new(store, config),
            Err(WorkloadError::Config(_))
        ));
    }
}
