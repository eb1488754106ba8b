//! Weights and thresholds for the workload engine.
//!
//! Every section falls back to its defaults, so an empty TOML document is a
//! valid configuration:
//!
//! ```toml
//! [prioridade]
//! alta = 100
//!
//! [carga]
//! peso_critico = 12.0
//!
//! [store]
//! timeout_secs = 5
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{Result, WorkloadError};

/// Main engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    #[serde(default)]
    pub prioridade: PriorityConfig,

    #[serde(default)]
    pub sla: SlaConfig,

    #[serde(default)]
    pub carga: LoadConfig,

    #[serde(default)]
    pub adequacao: AdequacyConfig,

    #[serde(default)]
    pub alertas: AlertConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

impl WorkloadConfig {
    /// Parses a TOML document and validates it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: WorkloadConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loaded workload configuration");
        Self::from_toml_str(&content)
    }

    /// Checks that thresholds are ordered and weights are usable.
    pub fn validate(&self) -> Result<()> {
        if self.prioridade.alta <= 0 {
            return Err(WorkloadError::Config(
                "prioridade.alta must be positive".to_string(),
            ));
        }
        if self.prioridade.maxima < self.prioridade.alta {
            return Err(WorkloadError::Config(
                "prioridade.maxima must not be below prioridade.alta".to_string(),
            ));
        }
        if self.sla.horas_atraso <= 0 || self.sla.janela_resolucao_dias <= 0 {
            return Err(WorkloadError::Config(
                "sla windows must be positive".to_string(),
            ));
        }

        let carga = &self.carga;
        let adequacao = &self.adequacao;
        let numeros = [
            ("carga.peso_ativo", carga.peso_ativo),
            ("carga.peso_alta", carga.peso_alta),
            ("carga.peso_critico", carga.peso_critico),
            ("carga.limiar_moderado", carga.limiar_moderado),
            ("carga.limiar_sobrecarregado", carga.limiar_sobrecarregado),
            ("carga.limiar_critico", carga.limiar_critico),
            ("adequacao.peso_carga", adequacao.peso_carga),
            ("adequacao.peso_colisao", adequacao.peso_colisao),
            ("adequacao.bonus_afinidade_por_chamado", adequacao.bonus_afinidade_por_chamado),
            ("adequacao.limiar_baixo", adequacao.limiar_baixo),
            ("adequacao.limiar_moderado", adequacao.limiar_moderado),
            ("adequacao.limiar_bom", adequacao.limiar_bom),
            ("adequacao.limiar_excelente", adequacao.limiar_excelente),
            (
                "alertas.max_percentual_sobrecarregados",
                self.alertas.max_percentual_sobrecarregados,
            ),
        ];
        if let Some((nome, _)) = numeros.iter().find(|(_, valor)| !valor.is_finite()) {
            return Err(WorkloadError::Config(format!("{nome} must be a finite number")));
        }

        if !(0.0 < carga.limiar_moderado
            && carga.limiar_moderado < carga.limiar_sobrecarregado
            && carga.limiar_sobrecarregado < carga.limiar_critico)
        {
            return Err(WorkloadError::Config(
                "carga thresholds must be positive and strictly increasing".to_string(),
            ));
        }
        if carga.peso_ativo < 0.0
            || carga.peso_alta < 0.0
            || carga.peso_critico <= carga.peso_ativo
        {
            return Err(WorkloadError::Config(
                "carga.peso_critico must outweigh carga.peso_ativo and weights must be non-negative"
                    .to_string(),
            ));
        }
        if carga.criticos_para_critico < 1 {
            return Err(WorkloadError::Config(
                "carga.criticos_para_critico must be at least 1".to_string(),
            ));
        }

        if !(0.0 < adequacao.limiar_baixo
            && adequacao.limiar_baixo < adequacao.limiar_moderado
            && adequacao.limiar_moderado < adequacao.limiar_bom
            && adequacao.limiar_bom < adequacao.limiar_excelente
            && adequacao.limiar_excelente <= 100.0)
        {
            return Err(WorkloadError::Config(
                "adequacao thresholds must be strictly increasing within (0, 100]".to_string(),
            ));
        }
        if adequacao.peso_carga <= 0.0 || adequacao.peso_colisao < 0.0 {
            return Err(WorkloadError::Config(
                "adequacao weights must be non-negative and peso_carga positive".to_string(),
            ));
        }
        if adequacao.bonus_afinidade_por_chamado < 0.0 {
            return Err(WorkloadError::Config(
                "adequacao.bonus_afinidade_por_chamado must be non-negative".to_string(),
            ));
        }

        if self.store.timeout_secs == 0 {
            return Err(WorkloadError::Config(
                "store.timeout_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Ticket priority tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Tickets at or above this priority count as high priority ("Alta").
    #[serde(default = "default_prioridade_alta")]
    pub alta: i32,

    /// Largest priority a suggestion request may carry.
    #[serde(default = "default_prioridade_maxima")]
    pub maxima: i32,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            alta: default_prioridade_alta(),
            maxima: default_prioridade_maxima(),
        }
    }
}

fn default_prioridade_alta() -> i32 {
    100
}

fn default_prioridade_maxima() -> i32 {
    999
}

/// Overdue and resolution-time windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaConfig {
    /// Tickets without a due date are overdue after this many hours open.
    #[serde(default = "default_horas_atraso")]
    pub horas_atraso: i64,

    /// Trailing window for average resolution time and client history.
    #[serde(default = "default_janela_resolucao_dias")]
    pub janela_resolucao_dias: i64,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            horas_atraso: default_horas_atraso(),
            janela_resolucao_dias: default_janela_resolucao_dias(),
        }
    }
}

impl SlaConfig {
    pub fn atraso(&self) -> chrono::Duration {
        chrono::Duration::hours(self.horas_atraso)
    }

    pub fn janela_resolucao(&self) -> chrono::Duration {
        chrono::Duration::days(self.janela_resolucao_dias)
    }
}

fn default_horas_atraso() -> i64 {
    48
}

fn default_janela_resolucao_dias() -> i64 {
    30
}

/// Workload score weights and bucket thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadConfig {
    #[serde(default = "default_peso_ativo")]
    pub peso_ativo: f64,

    #[serde(default = "default_peso_alta")]
    pub peso_alta: f64,

    #[serde(default = "default_peso_critico")]
    pub peso_critico: f64,

    #[serde(default = "default_limiar_carga_moderado")]
    pub limiar_moderado: f64,

    #[serde(default = "default_limiar_carga_sobrecarregado")]
    pub limiar_sobrecarregado: f64,

    #[serde(default = "default_limiar_carga_critico")]
    pub limiar_critico: f64,

    /// Critical tickets that force the CRÍTICO bucket regardless of score.
    #[serde(default = "default_criticos_para_critico")]
    pub criticos_para_critico: i64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            peso_ativo: default_peso_ativo(),
            peso_alta: default_peso_alta(),
            peso_critico: default_peso_critico(),
            limiar_moderado: default_limiar_carga_moderado(),
            limiar_sobrecarregado: default_limiar_carga_sobrecarregado(),
            limiar_critico: default_limiar_carga_critico(),
            criticos_para_critico: default_criticos_para_critico(),
        }
    }
}

fn default_peso_ativo() -> f64 {
    1.0
}

fn default_peso_alta() -> f64 {
    2.0
}

fn default_peso_critico() -> f64 {
    10.0
}

fn default_limiar_carga_moderado() -> f64 {
    5.0
}

fn default_limiar_carga_sobrecarregado() -> f64 {
    15.0
}

fn default_limiar_carga_critico() -> f64 {
    30.0
}

fn default_criticos_para_critico() -> i64 {
    3
}

/// Suitability weights and tier thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdequacyConfig {
    #[serde(default = "default_peso_carga")]
    pub peso_carga: f64,

    #[serde(default = "default_peso_colisao")]
    pub peso_colisao: f64,

    #[serde(default = "default_bonus_afinidade")]
    pub bonus_afinidade_por_chamado: f64,

    /// Client tickets counted towards the affinity bonus.
    #[serde(default = "default_max_chamados_afinidade")]
    pub max_chamados_afinidade: usize,

    #[serde(default = "default_limiar_baixo")]
    pub limiar_baixo: f64,

    #[serde(default = "default_limiar_adequacao_moderado")]
    pub limiar_moderado: f64,

    #[serde(default = "default_limiar_bom")]
    pub limiar_bom: f64,

    #[serde(default = "default_limiar_excelente")]
    pub limiar_excelente: f64,
}

impl Default for AdequacyConfig {
    fn default() -> Self {
        Self {
            peso_carga: default_peso_carga(),
            peso_colisao: default_peso_colisao(),
            bonus_afinidade_por_chamado: default_bonus_afinidade(),
            max_chamados_afinidade: default_max_chamados_afinidade(),
            limiar_baixo: default_limiar_baixo(),
            limiar_moderado: default_limiar_adequacao_moderado(),
            limiar_bom: default_limiar_bom(),
            limiar_excelente: default_limiar_excelente(),
        }
    }
}

fn default_peso_carga() -> f64 {
    1.5
}

fn default_peso_colisao() -> f64 {
    30.0
}

fn default_bonus_afinidade() -> f64 {
    5.0
}

fn default_max_chamados_afinidade() -> usize {
    3
}

fn default_limiar_baixo() -> f64 {
    20.0
}

fn default_limiar_adequacao_moderado() -> f64 {
    40.0
}

fn default_limiar_bom() -> f64 {
    60.0
}

fn default_limiar_excelente() -> f64 {
    80.0
}

/// System-wide alert thresholds for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Alert when more resources than this are CRÍTICO.
    #[serde(default = "default_max_recursos_criticos")]
    pub max_recursos_criticos: i64,

    /// Alert when one resource holds more critical tickets than this.
    #[serde(default = "default_max_criticos_por_recurso")]
    pub max_criticos_por_recurso: i64,

    /// Alert when the overloaded share of resources exceeds this percentage.
    #[serde(default = "default_max_percentual_sobrecarregados")]
    pub max_percentual_sobrecarregados: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            max_recursos_criticos: default_max_recursos_criticos(),
            max_criticos_por_recurso: default_max_criticos_por_recurso(),
            max_percentual_sobrecarregados: default_max_percentual_sobrecarregados(),
        }
    }
}

fn default_max_recursos_criticos() -> i64 {
    2
}

fn default_max_criticos_por_recurso() -> i64 {
    3
}

fn default_max_percentual_sobrecarregados() -> f64 {
    50.0
}

/// Ticket store access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout() -> u64 {
    10
}
