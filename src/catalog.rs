//! Dashboard projections over a workload snapshot.
//!
//! Pure functions: the same snapshot always yields the same feed, alerts
//! included, so the dashboard can be recomputed on every poll.

use chrono::{DateTime, Utc};

use crate::config::WorkloadConfig;
use crate::models::{
    CatalogSnapshot, DashboardRecursos, LoadStatus, RecursoDetalhe, ResourceSnapshot,
    ResourceWorkloadStats, ResumoGeral, ResumoRecurso, WorkloadBucket,
};
use crate::workload;

/// Stats for every resource in the snapshot, heaviest first.
pub fn workload_stats(
    snapshot: &CatalogSnapshot,
    config: &WorkloadConfig,
) -> Vec<ResourceWorkloadStats> {
    let mut stats: Vec<ResourceWorkloadStats> = snapshot
        .recursos
        .iter()
        .map(|recurso| workload::aggregate(recurso, snapshot.lido_em, config))
        .collect();

    stats.sort_by(|a, b| {
        b.score_carga_trabalho
            .total_cmp(&a.score_carga_trabalho)
            .then(a.cod_recurso.cmp(&b.cod_recurso))
    });
    stats
}

pub fn dashboard(snapshot: &CatalogSnapshot, config: &WorkloadConfig) -> DashboardRecursos {
    let recursos = workload_stats(snapshot, config);
    let resumo_geral = resumo_geral(&recursos);
    let alertas = alertas(&recursos, config);

    DashboardRecursos {
        recursos,
        resumo_geral,
        alertas,
    }
}

pub fn resumo_geral(stats: &[ResourceWorkloadStats]) -> ResumoGeral {
    stats.iter().fold(ResumoGeral::default(), |mut resumo, s| {
        resumo.total_chamados_ativos += s.total_chamados_ativos;
        resumo.total_chamados_criticos += s.chamados_criticos;
        if s.recomendacao == WorkloadBucket::Disponivel {
            resumo.recursos_disponiveis += 1;
        }
        if s.recomendacao.is_overloaded() {
            resumo.recursos_sobrecarregados += 1;
        }
        resumo
    })
}

/// System-wide alerts, in a fixed order.
pub fn alertas(stats: &[ResourceWorkloadStats], config: &WorkloadConfig) -> Vec<String> {
    let mut alertas = Vec::new();
    if stats.is_empty() {
        return alertas;
    }

    let limites = &config.alertas;

    let criticos = stats
        .iter()
        .filter(|s| s.recomendacao == WorkloadBucket::Critico)
        .count() as i64;
    if criticos > limites.max_recursos_criticos {
        alertas.push(format!(
            "{criticos} recursos em estado CRÍTICO (limite: {})",
            limites.max_recursos_criticos
        ));
    }

    let sobrecarregados = stats.iter().filter(|s| s.recomendacao.is_overloaded()).count();
    let percentual = sobrecarregados as f64 / stats.len() as f64 * 100.0;
    if percentual > limites.max_percentual_sobrecarregados {
        alertas.push(format!(
            "{percentual:.0}% dos recursos estão sobrecarregados ({sobrecarregados} de {})",
            stats.len()
        ));
    }

    if !stats.iter().any(|s| s.recomendacao == WorkloadBucket::Disponivel) {
        alertas.push("Nenhum recurso disponível para receber novos chamados".to_string());
    }

    let mut acumulando: Vec<&ResourceWorkloadStats> = stats
        .iter()
        .filter(|s| s.chamados_criticos > limites.max_criticos_por_recurso)
        .collect();
    acumulando.sort_by_key(|s| s.cod_recurso);
    for s in acumulando {
        alertas.push(format!(
            "{} (#{}) possui {} chamados críticos",
            s.nome_recurso, s.cod_recurso, s.chamados_criticos
        ));
    }

    alertas
}

/// Detail panel for a single resource.
pub fn detalhe(
    snapshot: &ResourceSnapshot,
    now: DateTime<Utc>,
    config: &WorkloadConfig,
) -> RecursoDetalhe {
    let stats = workload::aggregate(snapshot, now, config);
    let atrasados = workload::chamados_atrasados(snapshot, now, config);
    let status_carga = LoadStatus::from(stats.recomendacao);

    let mut alertas = Vec::new();
    if stats.chamados_criticos > 0 {
        alertas.push(format!(
            "{} chamado(s) crítico(s) aguardando atendimento",
            stats.chamados_criticos
        ));
    }
    if atrasados > 0 {
        alertas.push(format!("{atrasados} chamado(s) atrasado(s)"));
    }
    if stats.total_chamados_ativos > 0 && stats.percentual_alta_prioridade >= 50.0 {
        alertas.push(format!(
            "{:.1}% dos chamados ativos são de alta prioridade",
            stats.percentual_alta_prioridade
        ));
    }

    RecursoDetalhe {
        recurso: snapshot.recurso.clone(),
        resumo: ResumoRecurso {
            total_chamados_ativos: stats.total_chamados_ativos,
            chamados_criticos: stats.chamados_criticos,
            chamados_atrasados: atrasados,
            status_carga,
            recomendacao: recomendacao_carga(status_carga).to_string(),
        },
        alertas: if alertas.is_empty() { None } else { Some(alertas) },
    }
}

fn recomendacao_carga(status: LoadStatus) -> &'static str {
    match status {
        LoadStatus::Baixa => "Recurso com baixa carga, pode receber novos chamados",
        LoadStatus::Moderada => "Carga moderada, prefira chamados de menor prioridade",
        LoadStatus::Alta => "Recurso sobrecarregado, evite novas atribuições",
        LoadStatus::Critica => "Carga crítica, redistribua chamados com urgência",
    }
}
