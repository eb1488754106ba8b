use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// A support agent able to own tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, SimpleObject)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[graphql(rename_fields = "SCREAMING_SNAKE_CASE")]
pub struct Recurso {
    pub cod_recurso: i32,
    pub nome_recurso: String,
    pub email_recurso: Option<String>,
    pub ativo: bool,
}

impl Recurso {
    pub fn new(cod_recurso: i32, nome_recurso: impl Into<String>) -> Self {
        Self {
            cod_recurso,
            nome_recurso: nome_recurso.into(),
            email_recurso: None,
            ativo: true,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email_recurso = Some(email.into());
        self
    }
}

/// A ticket that has not been resolved yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChamadoAtivo {
    pub cod_chamado: i32,
    pub cod_recurso: Option<i32>,
    pub cod_cliente: Option<String>,
    pub prioridade: i32,
    pub status: String,
    pub data_abertura: DateTime<Utc>,
    pub prazo: Option<DateTime<Utc>>,
    pub escalado: bool,
}

impl ChamadoAtivo {
    pub fn new(cod_chamado: i32, prioridade: i32, data_abertura: DateTime<Utc>) -> Self {
        Self {
            cod_chamado,
            cod_recurso: None,
            cod_cliente: None,
            prioridade,
            status: "ABERTO".to_string(),
            data_abertura,
            prazo: None,
            escalado: false,
        }
    }

    pub fn with_cliente(mut self, cod_cliente: impl Into<String>) -> Self {
        self.cod_cliente = Some(cod_cliente.into());
        self
    }

    pub fn with_prazo(mut self, prazo: DateTime<Utc>) -> Self {
        self.prazo = Some(prazo);
        self
    }

    pub fn escalado(mut self) -> Self {
        self.escalado = true;
        self
    }
}

/// A ticket resolved by a resource, used for resolution time and client history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChamadoResolvido {
    pub cod_chamado: i32,
    pub cod_recurso: Option<i32>,
    pub cod_cliente: Option<String>,
    pub data_abertura: DateTime<Utc>,
    pub data_resolucao: DateTime<Utc>,
}

/// Everything known about one resource at a single instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSnapshot {
    pub recurso: Recurso,
    pub ativos: Vec<ChamadoAtivo>,
    pub resolvidos: Vec<ChamadoResolvido>,
}

impl ResourceSnapshot {
    pub fn new(recurso: Recurso) -> Self {
        Self {
            recurso,
            ativos: Vec::new(),
            resolvidos: Vec::new(),
        }
    }

    pub fn with_ativos(mut self, ativos: Vec<ChamadoAtivo>) -> Self {
        self.ativos = ativos;
        self
    }

    pub fn with_resolvidos(mut self, resolvidos: Vec<ChamadoResolvido>) -> Self {
        self.resolvidos = resolvidos;
        self
    }

    /// Tickets, open or resolved in the window, raised by the given client.
    pub fn chamados_do_cliente(&self, cod_cliente: &str) -> usize {
        let ativos = self
            .ativos
            .iter()
            .filter(|c| c.cod_cliente.as_deref() == Some(cod_cliente))
            .count();
        let resolvidos = self
            .resolvidos
            .iter()
            .filter(|c| c.cod_cliente.as_deref() == Some(cod_cliente))
            .count();
        ativos + resolvidos
    }
}

/// All active resources read in one logical store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub lido_em: DateTime<Utc>,
    pub recursos: Vec<ResourceSnapshot>,
}

/// Workload bucket, in increasing severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkloadBucket {
    #[serde(rename = "DISPONÍVEL")]
    Disponivel,
    #[serde(rename = "MODERADO")]
    Moderado,
    #[serde(rename = "SOBRECARREGADO")]
    Sobrecarregado,
    #[serde(rename = "CRÍTICO")]
    Critico,
}

impl WorkloadBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadBucket::Disponivel => "DISPONÍVEL",
            WorkloadBucket::Moderado => "MODERADO",
            WorkloadBucket::Sobrecarregado => "SOBRECARREGADO",
            WorkloadBucket::Critico => "CRÍTICO",
        }
    }

    pub fn is_overloaded(&self) -> bool {
        *self >= WorkloadBucket::Sobrecarregado
    }
}

impl fmt::Display for WorkloadBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WorkloadBucket {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "DISPONÍVEL" => Ok(WorkloadBucket::Disponivel),
            "MODERADO" => Ok(WorkloadBucket::Moderado),
            "SOBRECARREGADO" => Ok(WorkloadBucket::Sobrecarregado),
            "CRÍTICO" => Ok(WorkloadBucket::Critico),
            other => Err(format!("unsupported workload bucket: {other}")),
        }
    }
}

async_graphql::scalar!(
    WorkloadBucket,
    "WorkloadBucket",
    "DISPONÍVEL, MODERADO, SOBRECARREGADO or CRÍTICO"
);

/// Suitability of a resource to receive a new ticket, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdequacyTier {
    Inadequado,
    Baixo,
    Moderado,
    Bom,
    Excelente,
}

impl AdequacyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdequacyTier::Inadequado => "INADEQUADO",
            AdequacyTier::Baixo => "BAIXO",
            AdequacyTier::Moderado => "MODERADO",
            AdequacyTier::Bom => "BOM",
            AdequacyTier::Excelente => "EXCELENTE",
        }
    }
}

impl fmt::Display for AdequacyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

async_graphql::scalar!(
    AdequacyTier,
    "AdequacyTier",
    "EXCELENTE, BOM, MODERADO, BAIXO or INADEQUADO"
);

/// Load status shown on the resource detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoadStatus {
    #[serde(rename = "BAIXA")]
    Baixa,
    #[serde(rename = "MODERADA")]
    Moderada,
    #[serde(rename = "ALTA")]
    Alta,
    #[serde(rename = "CRÍTICA")]
    Critica,
}

impl LoadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStatus::Baixa => "BAIXA",
            LoadStatus::Moderada => "MODERADA",
            LoadStatus::Alta => "ALTA",
            LoadStatus::Critica => "CRÍTICA",
        }
    }
}

impl From<WorkloadBucket> for LoadStatus {
    fn from(bucket: WorkloadBucket) -> Self {
        match bucket {
            WorkloadBucket::Disponivel => LoadStatus::Baixa,
            WorkloadBucket::Moderado => LoadStatus::Moderada,
            WorkloadBucket::Sobrecarregado => LoadStatus::Alta,
            WorkloadBucket::Critico => LoadStatus::Critica,
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

async_graphql::scalar!(LoadStatus, "LoadStatus", "BAIXA, MODERADA, ALTA or CRÍTICA");

/// Per-resource workload, recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[graphql(rename_fields = "SCREAMING_SNAKE_CASE")]
pub struct ResourceWorkloadStats {
    pub cod_recurso: i32,
    pub nome_recurso: String,
    pub email_recurso: Option<String>,
    pub total_chamados_ativos: i64,
    pub chamados_alta_prioridade: i64,
    pub chamados_criticos: i64,
    pub score_carga_trabalho: f64,
    pub recomendacao: WorkloadBucket,
    pub percentual_alta_prioridade: f64,
    /// Mean resolution time in hours over the trailing window.
    pub tempo_medio_resolucao: Option<f64>,
}

// Dashboard feed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ResumoGeral {
    pub total_chamados_ativos: i64,
    pub total_chamados_criticos: i64,
    pub recursos_disponiveis: i64,
    pub recursos_sobrecarregados: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRecursos {
    pub recursos: Vec<ResourceWorkloadStats>,
    pub resumo_geral: ResumoGeral,
    pub alertas: Vec<String>,
}

// Resource detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ResumoRecurso {
    pub total_chamados_ativos: i64,
    pub chamados_criticos: i64,
    pub chamados_atrasados: i64,
    pub status_carga: LoadStatus,
    pub recomendacao: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct RecursoDetalhe {
    pub recurso: Recurso,
    pub resumo: ResumoRecurso,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alertas: Option<Vec<String>>,
}

// Assignment suggestion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct SugestaoRecursoInput {
    pub prioridade: i32,
    pub cod_cliente: Option<String>,
    pub assunto: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[graphql(rename_fields = "SCREAMING_SNAKE_CASE")]
pub struct SuggestionResult {
    pub cod_recurso: i32,
    pub nome_recurso: String,
    pub score_adequacao: f64,
    pub adequacao: AdequacyTier,
    pub recomendacao: String,
    pub vantagens: Vec<String>,
    pub desvantagens: Vec<String>,
    pub chamados_ativos: i64,
    pub chamados_criticos: i64,
    pub carga_atual: WorkloadBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Sugestao {
    pub recurso_recomendado: Option<SuggestionResult>,
    pub ranking: Vec<SuggestionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct SugestaoRecursoResponse {
    pub sugestao: Sugestao,
    pub recomendacoes_gerais: Vec<String>,
}
