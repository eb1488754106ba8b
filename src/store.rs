//! Ticket store seam.
//!
//! The engine never reads tickets piecemeal: each request asks the store for
//! one snapshot and derives every counter from it, so fields from two
//! different reads are never mixed.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::models::{CatalogSnapshot, ChamadoAtivo, ChamadoResolvido, Recurso, ResourceSnapshot};
use crate::Result;

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Every active resource with its open tickets and the tickets it
    /// resolved within `janela_resolucao` before the snapshot instant.
    async fn catalog_snapshot(&self, janela_resolucao: Duration) -> Result<CatalogSnapshot>;

    /// Same as [`TicketStore::catalog_snapshot`] restricted to one resource.
    /// `recursos` is empty when the resource is unknown or inactive.
    async fn resource_snapshot(
        &self,
        cod_recurso: i32,
        janela_resolucao: Duration,
    ) -> Result<CatalogSnapshot>;
}

#[derive(Debug, Default)]
struct MemoryState {
    recursos: Vec<Recurso>,
    ativos: Vec<ChamadoAtivo>,
    resolvidos: Vec<ChamadoResolvido>,
    clock: Option<DateTime<Utc>>,
}

/// Store kept in process memory. Useful for tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    state: RwLock<MemoryState>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the snapshot instant instead of reading the wall clock.
    pub fn with_clock(now: DateTime<Utc>) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                clock: Some(now),
                ..Default::default()
            }),
        }
    }

    pub async fn set_clock(&self, now: DateTime<Utc>) {
        self.state.write().await.clock = Some(now);
    }

    /// Inserts or replaces a resource.
    pub async fn upsert_recurso(&self, recurso: Recurso) {
        let mut state = self.state.write().await;
        match state.recursos.iter().position(|r| r.cod_recurso == recurso.cod_recurso) {
            Some(pos) => state.recursos[pos] = recurso,
            None => state.recursos.push(recurso),
        }
    }

    /// Adds an open ticket owned by `cod_recurso`.
    pub async fn add_chamado(&self, cod_recurso: i32, mut chamado: ChamadoAtivo) {
        chamado.cod_recurso = Some(cod_recurso);
        self.state.write().await.ativos.push(chamado);
    }

    /// Adds an open ticket that nobody owns yet.
    pub async fn add_chamado_sem_recurso(&self, mut chamado: ChamadoAtivo) {
        chamado.cod_recurso = None;
        self.state.write().await.ativos.push(chamado);
    }

    pub async fn add_resolvido(&self, cod_recurso: i32, mut chamado: ChamadoResolvido) {
        chamado.cod_recurso = Some(cod_recurso);
        self.state.write().await.resolvidos.push(chamado);
    }

    /// Moves an open ticket to the resolved set.
    pub async fn resolver(&self, cod_chamado: i32, data_resolucao: DateTime<Utc>) -> bool {
        let mut state = self.state.write().await;
        let Some(pos) = state.ativos.iter().position(|c| c.cod_chamado == cod_chamado) else {
            return false;
        };
        let chamado = state.ativos.remove(pos);
        state.resolvidos.push(ChamadoResolvido {
            cod_chamado: chamado.cod_chamado,
            cod_recurso: chamado.cod_recurso,
            cod_cliente: chamado.cod_cliente,
            data_abertura: chamado.data_abertura,
            data_resolucao,
        });
        true
    }

    fn build(
        state: &MemoryState,
        filtro: Option<i32>,
        janela_resolucao: Duration,
    ) -> CatalogSnapshot {
        let lido_em = state.clock.unwrap_or_else(Utc::now);
        let resolvidos_desde = lido_em - janela_resolucao;

        let mut recursos: Vec<&Recurso> = state
            .recursos
            .iter()
            .filter(|r| r.ativo)
            .filter(|r| filtro.map_or(true, |cod| r.cod_recurso == cod))
            .collect();
        recursos.sort_by_key(|r| r.cod_recurso);

        let recursos = recursos
            .into_iter()
            .map(|recurso| {
                let cod = Some(recurso.cod_recurso);
                let ativos = state
                    .ativos
                    .iter()
                    .filter(|c| c.cod_recurso == cod)
                    .cloned()
                    .collect();
                let resolvidos = state
                    .resolvidos
                    .iter()
                    .filter(|c| c.cod_recurso == cod && c.data_resolucao >= resolvidos_desde)
                    .cloned()
                    .collect();
                ResourceSnapshot {
                    recurso: recurso.clone(),
                    ativos,
                    resolvidos,
                }
            })
            .collect();

        CatalogSnapshot {
            lido_em,
            recursos,
        }
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn catalog_snapshot(&self, janela_resolucao: Duration) -> Result<CatalogSnapshot> {
        let state = self.state.read().await;
        Ok(Self::build(&state, None, janela_resolucao))
    }

    async fn resource_snapshot(
        &self,
        cod_recurso: i32,
        janela_resolucao: Duration,
    ) -> Result<CatalogSnapshot> {
        let state = self.state.read().await;
        Ok(Self::build(&state, Some(cod_recurso), janela_resolucao))
    }
}
