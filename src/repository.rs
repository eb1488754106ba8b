use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::collections::HashMap;

use crate::models::{CatalogSnapshot, ChamadoAtivo, ChamadoResolvido, Recurso, ResourceSnapshot};
use crate::store::TicketStore;
use crate::{Result, WorkloadError};

/// PostgreSQL ticket store.
///
/// Reads resources, open tickets and resolved tickets inside one
/// `REPEATABLE READ` transaction so every query sees the same snapshot.
pub struct WorkloadRepository {
    pool: PgPool,
}

impl WorkloadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn read_snapshot(
        &self,
        cod_recurso: Option<i32>,
        janela_resolucao: Duration,
    ) -> Result<CatalogSnapshot> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to open snapshot transaction: {}", e);
            WorkloadError::Database(e)
        })?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(WorkloadError::Database)?;

        // NOW() is fixed for the whole transaction
        let lido_em: DateTime<Utc> = sqlx::query_scalar("SELECT NOW()")
            .fetch_one(&mut *tx)
            .await
            .map_err(WorkloadError::Database)?;
        let resolvidos_desde = lido_em - janela_resolucao;

        let recursos = sqlx::query_as::<_, Recurso>(
            r#"
            SELECT cod_recurso, nome_recurso, email_recurso, ativo
            FROM recursos
            WHERE ativo = TRUE
              AND ($1::INT IS NULL OR cod_recurso = $1)
            ORDER BY cod_recurso
            "#,
        )
        .bind(cod_recurso)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch resources: {}", e);
            WorkloadError::Database(e)
        })?;

        let ativos = sqlx::query_as::<_, ChamadoAtivo>(
            r#"
            SELECT
                cod_chamado,
                cod_recurso,
                cod_cliente,
                prioridade,
                status,
                data_abertura,
                prazo,
                escalado
            FROM chamados
            WHERE data_resolucao IS NULL
              AND cod_recurso IS NOT NULL
              AND ($1::INT IS NULL OR cod_recurso = $1)
            ORDER BY cod_chamado
            "#,
        )
        .bind(cod_recurso)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch active tickets: {}", e);
            WorkloadError::Database(e)
        })?;

        let resolvidos = sqlx::query_as::<_, ChamadoResolvido>(
            r#"
            SELECT
                cod_chamado,
                cod_recurso,
                cod_cliente,
                data_abertura,
                data_resolucao
            FROM chamados
            WHERE data_resolucao IS NOT NULL
              AND data_resolucao >= $2
              AND cod_recurso IS NOT NULL
              AND ($1::INT IS NULL OR cod_recurso = $1)
            ORDER BY cod_chamado
            "#,
        )
        .bind(cod_recurso)
        .bind(resolvidos_desde)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch resolved tickets: {}", e);
            WorkloadError::Database(e)
        })?;

        tx.commit().await.map_err(WorkloadError::Database)?;

        tracing::debug!(
            recursos = recursos.len(),
            ativos = ativos.len(),
            resolvidos = resolvidos.len(),
            "Read workload snapshot"
        );

        Ok(assemble(lido_em, recursos, ativos, resolvidos))
    }
}

#[async_trait::async_trait]
impl TicketStore for WorkloadRepository {
    async fn catalog_snapshot(&self, janela_resolucao: Duration) -> Result<CatalogSnapshot> {
        self.read_snapshot(None, janela_resolucao).await
    }

    async fn resource_snapshot(
        &self,
        cod_recurso: i32,
        janela_resolucao: Duration,
    ) -> Result<CatalogSnapshot> {
        self.read_snapshot(Some(cod_recurso), janela_resolucao).await
    }
}

/// Groups ticket rows under their owning resources. Tickets of resources
/// outside `recursos` are dropped.
fn assemble(
    lido_em: DateTime<Utc>,
    recursos: Vec<Recurso>,
    ativos: Vec<ChamadoAtivo>,
    resolvidos: Vec<ChamadoResolvido>,
) -> CatalogSnapshot {
    let mut ativos_por_recurso: HashMap<i32, Vec<ChamadoAtivo>> = HashMap::new();
    for chamado in ativos {
        if let Some(cod) = chamado.cod_recurso {
            ativos_por_recurso.entry(cod).or_default().push(chamado);
        }
    }

    let mut resolvidos_por_recurso: HashMap<i32, Vec<ChamadoResolvido>> = HashMap::new();
    for chamado in resolvidos {
        if let Some(cod) = chamado.cod_recurso {
            resolvidos_por_recurso.entry(cod).or_default().push(chamado);
        }
    }

    let recursos = recursos
        .into_iter()
        .map(|recurso| ResourceSnapshot {
            ativos: ativos_por_recurso.remove(&recurso.cod_recurso).unwrap_or_default(),
            resolvidos: resolvidos_por_recurso.remove(&recurso.cod_recurso).unwrap_or_default(),
            recurso,
        })
        .collect();

    CatalogSnapshot { lido_em, recursos }
}
