//! Integration tests for the workload engine through its service and
//! GraphQL surfaces.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use helpdesk_workload::Result as WorkloadResult;
use helpdesk_workload::{
    AdequacyTier, CatalogSnapshot, ChamadoAtivo, ChamadoResolvido, InMemoryTicketStore, Recurso,
    SugestaoRecursoInput, TicketStore, WorkloadBucket, WorkloadConfig, WorkloadError,
    WorkloadService,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
}

fn chamado(cod: i32, prioridade: i32) -> ChamadoAtivo {
    ChamadoAtivo::new(cod, prioridade, now() - Duration::hours(2))
}

fn service_for(store: Arc<dyn TicketStore>) -> WorkloadService {
    WorkloadService::new(store, WorkloadConfig::default()).unwrap()
}

/// R1: 10 active, 6 high priority, 3 critical. R2: idle. R3: a few ordinary tickets.
async fn seeded_store() -> Arc<InMemoryTicketStore> {
    let store = Arc::new(InMemoryTicketStore::with_clock(now()));
    store.upsert_recurso(Recurso::new(1, "R1").with_email("r1@example.com")).await;
    store.upsert_recurso(Recurso::new(2, "R2")).await;
    store.upsert_recurso(Recurso::new(3, "R3")).await;

    for i in 0..4 {
        store.add_chamado(1, chamado(100 + i, 20)).await;
    }
    for i in 0..3 {
        store.add_chamado(1, chamado(110 + i, 150)).await;
    }
    for i in 0..3 {
        store
            .add_chamado(1, chamado(120 + i, 150).with_prazo(now() - Duration::hours(1)))
            .await;
    }
    for i in 0..3 {
        store.add_chamado(3, chamado(300 + i, 30).with_cliente("ACME")).await;
    }
    store
        .add_resolvido(
            3,
            ChamadoResolvido {
                cod_chamado: 399,
                cod_recurso: None,
                cod_cliente: Some("ACME".to_string()),
                data_abertura: now() - Duration::days(2),
                data_resolucao: now() - Duration::days(2) + Duration::hours(6),
            },
        )
        .await;
    store
}

struct FailingStore;

#[async_trait]
impl TicketStore for FailingStore {
    async fn catalog_snapshot(&self, _janela: Duration) -> WorkloadResult<CatalogSnapshot> {
        Err(WorkloadError::unavailable("connection refused"))
    }

    async fn resource_snapshot(
        &self,
        _cod: i32,
        _janela: Duration,
    ) -> WorkloadResult<CatalogSnapshot> {
        Err(WorkloadError::unavailable("connection refused"))
    }
}

struct SlowStore;

#[async_trait]
impl TicketStore for SlowStore {
    async fn catalog_snapshot(&self, _janela: Duration) -> WorkloadResult<CatalogSnapshot> {
        tokio::time::sleep(StdDuration::from_secs(3)).await;
        Ok(CatalogSnapshot {
            lido_em: now(),
            recursos: vec![],
        })
    }

    async fn resource_snapshot(
        &self,
        _cod: i32,
        janela: Duration,
    ) -> WorkloadResult<CatalogSnapshot> {
        self.catalog_snapshot(janela).await
    }
}

mod dashboard_tests {
    use super::*;

    #[tokio::test]
    async fn test_critical_floor_scenario() {
        let service = service_for(seeded_store().await);
        let feed = service.dashboard_recursos().await.unwrap();

        let r1 = feed.recursos.iter().find(|r| r.cod_recurso == 1).unwrap();
        assert_eq!(r1.total_chamados_ativos, 10);
        assert_eq!(r1.chamados_alta_prioridade, 6);
        assert_eq!(r1.chamados_criticos, 3);
        assert_eq!(r1.recomendacao, WorkloadBucket::Critico);
        assert_eq!(r1.email_recurso.as_deref(), Some("r1@example.com"));
    }

    #[tokio::test]
    async fn test_count_invariant_holds_for_every_resource() {
        let service = service_for(seeded_store().await);
        let feed = service.dashboard_recursos().await.unwrap();

        for r in &feed.recursos {
            assert!(r.chamados_criticos <= r.chamados_alta_prioridade);
            assert!(r.chamados_alta_prioridade <= r.total_chamados_ativos);
            if r.chamados_criticos >= 1 {
                assert!(matches!(
                    r.recomendacao,
                    WorkloadBucket::Sobrecarregado | WorkloadBucket::Critico
                ));
            }
            if r.total_chamados_ativos == 0 {
                assert_eq!(r.percentual_alta_prioridade, 0.0);
            }
        }
    }

    #[tokio::test]
    async fn test_summary_and_average_resolution() {
        let service = service_for(seeded_store().await);
        let feed = service.dashboard_recursos().await.unwrap();

        assert_eq!(feed.resumo_geral.total_chamados_ativos, 13);
        assert_eq!(feed.resumo_geral.total_chamados_criticos, 3);
        assert_eq!(feed.resumo_geral.recursos_disponiveis, 2);
        assert_eq!(feed.resumo_geral.recursos_sobrecarregados, 1);

        let r3 = feed.recursos.iter().find(|r| r.cod_recurso == 3).unwrap();
        assert_eq!(r3.tempo_medio_resolucao, Some(6.0));
    }

    #[tokio::test]
    async fn test_empty_catalog_is_empty_feed() {
        let service = service_for(Arc::new(InMemoryTicketStore::with_clock(now())));
        let feed = service.dashboard_recursos().await.unwrap();

        assert!(feed.recursos.is_empty());
        assert_eq!(feed.resumo_geral.total_chamados_ativos, 0);
        assert_eq!(feed.resumo_geral.total_chamados_criticos, 0);
        assert_eq!(feed.resumo_geral.recursos_disponiveis, 0);
        assert_eq!(feed.resumo_geral.recursos_sobrecarregados, 0);
        assert!(feed.alertas.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_reads_are_byte_identical() {
        let service = service_for(seeded_store().await);
        let first = service.dashboard_recursos().await.unwrap();
        let second = service.dashboard_recursos().await.unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_wire_shape() {
        let service = service_for(seeded_store().await);
        let feed = service.dashboard_recursos().await.unwrap();
        let json = serde_json::to_value(&feed).unwrap();

        assert_eq!(json["recursos"][0]["COD_RECURSO"], 1);
        assert_eq!(json["recursos"][0]["RECOMENDACAO"], "CRÍTICO");
        assert_eq!(json["resumoGeral"]["totalChamadosCriticos"], 3);
        assert!(json["alertas"].is_array());
    }

    #[tokio::test]
    async fn test_resource_detail() {
        let service = service_for(seeded_store().await);
        let detalhe = service.dashboard_recurso(1).await.unwrap();

        assert_eq!(detalhe.recurso.nome_recurso, "R1");
        assert_eq!(detalhe.resumo.total_chamados_ativos, 10);
        assert_eq!(detalhe.resumo.chamados_criticos, 3);
        assert_eq!(detalhe.resumo.chamados_atrasados, 3);
        assert_eq!(detalhe.resumo.status_carga.as_str(), "CRÍTICA");
        assert!(detalhe.alertas.is_some());

        let idle = service.dashboard_recurso(2).await.unwrap();
        assert!(idle.alertas.is_none());
    }
}

mod suggestion_tests {
    use super::*;

    fn pedido(prioridade: i32) -> SugestaoRecursoInput {
        SugestaoRecursoInput {
            prioridade,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_idle_resource_recommended() {
        let service = service_for(seeded_store().await);
        let response = service.sugestao_recurso(&pedido(100)).await.unwrap();

        let melhor = response.sugestao.recurso_recomendado.unwrap();
        assert_eq!(melhor.cod_recurso, 2);
        assert_eq!(melhor.chamados_ativos, 0);
        assert_eq!(response.sugestao.ranking.len(), 3);
        assert_eq!(response.sugestao.ranking.last().unwrap().cod_recurso, 1);
    }

    #[tokio::test]
    async fn test_critical_resource_capped() {
        let service = service_for(seeded_store().await);
        let response = service.sugestao_recurso(&pedido(1)).await.unwrap();

        for r in &response.sugestao.ranking {
            if r.carga_atual == WorkloadBucket::Critico {
                assert!(!matches!(r.adequacao, AdequacyTier::Excelente | AdequacyTier::Bom));
            }
        }
    }

    #[tokio::test]
    async fn test_negative_priority_rejected() {
        let service = service_for(seeded_store().await);
        let err = service.sugestao_recurso(&pedido(-5)).await.unwrap_err();
        assert!(matches!(err, WorkloadError::Validation(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_priority_is_validated_before_store_read() {
        // A broken store must not mask the validation error.
        let service = service_for(Arc::new(FailingStore));
        let err = service.sugestao_recurso(&pedido(0)).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_ties_resolved_by_id_across_calls() {
        let store = Arc::new(InMemoryTicketStore::with_clock(now()));
        store.upsert_recurso(Recurso::new(8, "Oito")).await;
        store.upsert_recurso(Recurso::new(5, "Cinco")).await;
        store.add_chamado(8, chamado(1, 10)).await;
        store.add_chamado(5, chamado(2, 10)).await;
        let service = service_for(store);

        for _ in 0..3 {
            let response = service.sugestao_recurso(&pedido(100)).await.unwrap();
            let ranking = &response.sugestao.ranking;
            assert_eq!(ranking[0].score_adequacao, ranking[1].score_adequacao);
            assert_eq!(ranking[0].cod_recurso, 5);
            assert_eq!(ranking[1].cod_recurso, 8);
        }
    }

    #[tokio::test]
    async fn test_client_affinity_in_rationale() {
        let service = service_for(seeded_store().await);
        let response = service
            .sugestao_recurso(&SugestaoRecursoInput {
                prioridade: 30,
                cod_cliente: Some("ACME".to_string()),
                assunto: Some("Erro no faturamento".to_string()),
            })
            .await
            .unwrap();

        let r3 = response.sugestao.ranking.iter().find(|r| r.cod_recurso == 3).unwrap();
        assert!(r3.vantagens.iter().any(|v| v.contains("ACME")));
    }

    #[tokio::test]
    async fn test_empty_catalog_guidance() {
        let service = service_for(Arc::new(InMemoryTicketStore::with_clock(now())));
        let response = service.sugestao_recurso(&pedido(100)).await.unwrap();

        assert!(response.sugestao.recurso_recomendado.is_none());
        assert_eq!(response.recomendacoes_gerais.len(), 1);
    }
}

mod collaborator_tests {
    use super::*;

    #[tokio::test]
    async fn test_store_failure_is_retryable_error() {
        let service = service_for(Arc::new(FailingStore));

        let err = service.dashboard_recursos().await.unwrap_err();
        assert!(matches!(err, WorkloadError::CollaboratorUnavailable(_)));
        assert!(err.is_retryable());

        let err = service.dashboard_recurso(1).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let config = WorkloadConfig::from_toml_str("[store]\ntimeout_secs = 1\n").unwrap();
        let service = WorkloadService::new(Arc::new(SlowStore), config).unwrap();

        let err = service.dashboard_recursos().await.unwrap_err();
        assert!(matches!(err, WorkloadError::Timeout(1)));
        assert!(err.is_retryable());
    }
}

mod graphql_tests {
    use super::*;
    use async_graphql::{EmptyMutation, EmptySubscription, Schema};
    use helpdesk_workload::WorkloadQueries;

    type WorkloadSchema = Schema<WorkloadQueries, EmptyMutation, EmptySubscription>;

    async fn schema(store: Arc<dyn TicketStore>) -> WorkloadSchema {
        Schema::build(WorkloadQueries, EmptyMutation, EmptySubscription)
            .data(Arc::new(service_for(store)))
            .finish()
    }

    #[tokio::test]
    async fn test_dashboard_query_uses_wire_names() {
        let schema = schema(seeded_store().await).await;
        let response = schema
            .execute(
                "{ dashboardRecursos { recursos { COD_RECURSO RECOMENDACAO } \
                 resumoGeral { totalChamadosAtivos } alertas } }",
            )
            .await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        assert_eq!(data["dashboardRecursos"]["recursos"][0]["COD_RECURSO"], 1);
        assert_eq!(data["dashboardRecursos"]["recursos"][0]["RECOMENDACAO"], "CRÍTICO");
        assert_eq!(data["dashboardRecursos"]["resumoGeral"]["totalChamadosAtivos"], 13);
    }

    #[tokio::test]
    async fn test_suggestion_query() {
        let schema = schema(seeded_store().await).await;
        let response = schema
            .execute(
                "{ sugestaoRecurso(input: { prioridade: 100, codCliente: \"ACME\" }) { \
                 sugestao { recursoRecomendado { COD_RECURSO ADEQUACAO VANTAGENS } } recomendacoesGerais } }",
            )
            .await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        let melhor = &data["sugestaoRecurso"]["sugestao"]["recursoRecomendado"];
        assert_eq!(melhor["COD_RECURSO"], 2);
        assert_eq!(melhor["ADEQUACAO"], "EXCELENTE");
    }

    #[tokio::test]
    async fn test_validation_error_extension() {
        let schema = schema(seeded_store().await).await;
        let response = schema
            .execute("{ sugestaoRecurso(input: { prioridade: -5 }) { recomendacoesGerais } }")
            .await;

        assert_eq!(response.errors.len(), 1);
        let error = serde_json::to_value(&response.errors[0]).unwrap();
        assert_eq!(error["extensions"]["code"], "VALIDATION");
        assert_eq!(error["extensions"]["retryable"], false);
    }

    #[tokio::test]
    async fn test_unknown_resource_is_validation_extension() {
        let schema = schema(seeded_store().await).await;
        let response = schema
            .execute("{ dashboardRecurso(codRecurso: 42) { recurso { COD_RECURSO } } }")
            .await;

        assert_eq!(response.errors.len(), 1);
        let error = serde_json::to_value(&response.errors[0]).unwrap();
        assert_eq!(error["extensions"]["code"], "VALIDATION");
        assert_eq!(error["extensions"]["retryable"], false);
    }

    #[tokio::test]
    async fn test_collaborator_error_extension() {
        let schema = schema(Arc::new(FailingStore)).await;
        let response = schema.execute("{ dashboardRecursos { alertas } }").await;

        assert_eq!(response.errors.len(), 1);
        let error = serde_json::to_value(&response.errors[0]).unwrap();
        assert_eq!(error["extensions"]["code"], "COLLABORATOR_UNAVAILABLE");
        assert_eq!(error["extensions"]["retryable"], true);
    }
}
