//! Workload aggregation.
//!
//! Reduces one [`ResourceSnapshot`] into [`ResourceWorkloadStats`]:
//!
//! - total, high-priority and critical ticket counts
//! - a weighted workload score
//! - the workload bucket, with critical tickets acting as a severity floor
//! - the mean resolution time over the trailing window
//!
//! Everything here is a pure function of the snapshot, its read instant and
//! the configuration.

use chrono::{DateTime, Utc};

use crate::config::{LoadConfig, WorkloadConfig};
use crate::models::{
    ChamadoAtivo, ChamadoResolvido, ResourceSnapshot, ResourceWorkloadStats, WorkloadBucket,
};

pub fn is_alta_prioridade(chamado: &ChamadoAtivo, config: &WorkloadConfig) -> bool {
    chamado.prioridade >= config.prioridade.alta
}

/// Past its due date, or open longer than the SLA when it has none.
pub fn is_atrasado(chamado: &ChamadoAtivo, now: DateTime<Utc>, config: &WorkloadConfig) -> bool {
    match chamado.prazo {
        Some(prazo) => prazo < now,
        None => now - chamado.data_abertura > config.sla.atraso(),
    }
}

/// High priority and either escalated or overdue.
pub fn is_critico(chamado: &ChamadoAtivo, now: DateTime<Utc>, config: &WorkloadConfig) -> bool {
    is_alta_prioridade(chamado, config) && (chamado.escalado || is_atrasado(chamado, now, config))
}

pub fn workload_score(total: i64, alta: i64, criticos: i64, carga: &LoadConfig) -> f64 {
    let score = total as f64 * carga.peso_ativo
        + alta as f64 * carga.peso_alta
        + criticos as f64 * carga.peso_critico;
    round2(score)
}

/// Maps a score to its bucket, then applies the critical-ticket floors.
pub fn classify(score: f64, criticos: i64, carga: &LoadConfig) -> WorkloadBucket {
    let by_score = if score >= carga.limiar_critico {
        WorkloadBucket::Critico
    } else if score >= carga.limiar_sobrecarregado {
        WorkloadBucket::Sobrecarregado
    } else if score >= carga.limiar_moderado {
        WorkloadBucket::Moderado
    } else {
        WorkloadBucket::Disponivel
    };

    let floor = if criticos >= carga.criticos_para_critico {
        WorkloadBucket::Critico
    } else if criticos >= 1 {
        WorkloadBucket::Sobrecarregado
    } else {
        WorkloadBucket::Disponivel
    };

    by_score.max(floor)
}

/// Share of high-priority tickets, 0 when there are no tickets.
pub fn percentual(parte: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (parte as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Mean hours from opening to resolution for tickets resolved in the window.
pub fn tempo_medio_resolucao(
    resolvidos: &[ChamadoResolvido],
    now: DateTime<Utc>,
    config: &WorkloadConfig,
) -> Option<f64> {
    let desde = now - config.sla.janela_resolucao();

    let horas: Vec<f64> = resolvidos
        .iter()
        .filter(|c| c.data_resolucao >= desde && c.data_resolucao <= now)
        .map(|c| c.data_resolucao - c.data_abertura)
        .filter(|duracao| duracao.num_seconds() >= 0)
        .map(|duracao| duracao.num_seconds() as f64 / 3600.0)
        .collect();

    if horas.is_empty() {
        return None;
    }

    Some(round2(horas.iter().sum::<f64>() / horas.len() as f64))
}

pub fn chamados_atrasados(
    snapshot: &ResourceSnapshot,
    now: DateTime<Utc>,
    config: &WorkloadConfig,
) -> i64 {
    snapshot
        .ativos
        .iter()
        .filter(|c| is_atrasado(c, now, config))
        .count() as i64
}

/// Builds the workload record for one resource.
pub fn aggregate(
    snapshot: &ResourceSnapshot,
    now: DateTime<Utc>,
    config: &WorkloadConfig,
) -> ResourceWorkloadStats {
    let mut total = 0i64;
    let mut alta = 0i64;
    let mut criticos = 0i64;

    for chamado in &snapshot.ativos {
        total += 1;
        if is_alta_prioridade(chamado, config) {
            alta += 1;
            if chamado.escalado || is_atrasado(chamado, now, config) {
                criticos += 1;
            }
        }
    }

    let score = workload_score(total, alta, criticos, &config.carga);
    let recomendacao = classify(score, criticos, &config.carga);

    ResourceWorkloadStats {
        cod_recurso: snapshot.recurso.cod_recurso,
        nome_recurso: snapshot.recurso.nome_recurso.clone(),
        email_recurso: snapshot.recurso.email_recurso.clone(),
        total_chamados_ativos: total,
        chamados_alta_prioridade: alta,
        chamados_criticos: criticos,
        score_carga_trabalho: score,
        recomendacao,
        percentual_alta_prioridade: percentual(alta, total),
        tempo_medio_resolucao: tempo_medio_resolucao(&snapshot.resolvidos, now, config),
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
