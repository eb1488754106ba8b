//! Assignment recommendation.
//!
//! Scores how suitable each resource is to receive a prospective ticket and
//! ranks them. Suitability starts from the inverse of the current workload,
//! is penalized when a high-priority ticket would land on a resource already
//! saturated with high-priority work, and gets a bonus for prior history
//! with the ticket's client. The bonus is never applied to a resource in the
//! CRÍTICO bucket, and such a resource can never rank as BOM or EXCELENTE.
//!
//! Nothing here mutates ticket ownership.

use std::cmp::Ordering;

use crate::config::WorkloadConfig;
use crate::models::{
    AdequacyTier, CatalogSnapshot, ResourceWorkloadStats, Sugestao, SugestaoRecursoInput,
    SugestaoRecursoResponse, SuggestionResult, WorkloadBucket,
};
use crate::workload::{self, round2};
use crate::{Result, WorkloadError};

/// Rejects requests that must not reach scoring.
pub fn validate(input: &SugestaoRecursoInput, config: &WorkloadConfig) -> Result<()> {
    if input.prioridade <= 0 {
        return Err(WorkloadError::validation(format!(
            "prioridade must be a positive integer, got {}",
            input.prioridade
        )));
    }
    if input.prioridade > config.prioridade.maxima {
        return Err(WorkloadError::validation(format!(
            "prioridade must not exceed {}, got {}",
            config.prioridade.maxima, input.prioridade
        )));
    }
    Ok(())
}

pub fn score_adequacao(
    stats: &ResourceWorkloadStats,
    prioridade: i32,
    historico_cliente: usize,
    config: &WorkloadConfig,
) -> f64 {
    let pesos = &config.adequacao;
    let critico = stats.recomendacao == WorkloadBucket::Critico;

    let carga = stats.score_carga_trabalho * pesos.peso_carga;

    let fator_prioridade = (prioridade as f64 / config.prioridade.alta as f64).min(2.0);
    let colisao = fator_prioridade * stats.percentual_alta_prioridade / 100.0 * pesos.peso_colisao;

    let afinidade = if critico {
        0.0
    } else {
        let chamados = historico_cliente.min(pesos.max_chamados_afinidade);
        chamados as f64 * pesos.bonus_afinidade_por_chamado
    };

    let mut score = (100.0 - carga - colisao + afinidade).clamp(0.0, 100.0);
    if critico {
        score = score.min(pesos.limiar_bom - 0.01);
    }
    round2(score)
}

pub fn classify_adequacao(
    score: f64,
    carga: WorkloadBucket,
    config: &WorkloadConfig,
) -> AdequacyTier {
    let limites = &config.adequacao;
    let tier = if score >= limites.limiar_excelente {
        AdequacyTier::Excelente
    } else if score >= limites.limiar_bom {
        AdequacyTier::Bom
    } else if score >= limites.limiar_moderado {
        AdequacyTier::Moderado
    } else if score >= limites.limiar_baixo {
        AdequacyTier::Baixo
    } else {
        AdequacyTier::Inadequado
    };

    if carga == WorkloadBucket::Critico {
        tier.min(AdequacyTier::Moderado)
    } else {
        tier
    }
}

/// Ranking order: best score, then fewer active tickets, then lower id.
pub fn ranking_order(a: &SuggestionResult, b: &SuggestionResult) -> Ordering {
    b.score_adequacao
        .total_cmp(&a.score_adequacao)
        .then(a.chamados_ativos.cmp(&b.chamados_ativos))
        .then(a.cod_recurso.cmp(&b.cod_recurso))
}

pub fn mediana(valores: &[i64]) -> f64 {
    if valores.is_empty() {
        return 0.0;
    }
    let mut ordenados = valores.to_vec();
    ordenados.sort_unstable();
    let meio = ordenados.len() / 2;
    if ordenados.len() % 2 == 0 {
        (ordenados[meio - 1] + ordenados[meio]) as f64 / 2.0
    } else {
        ordenados[meio] as f64
    }
}

struct Candidato<'a> {
    stats: ResourceWorkloadStats,
    historico_cliente: usize,
    cliente: Option<&'a str>,
}

pub fn recommend(
    snapshot: &CatalogSnapshot,
    input: &SugestaoRecursoInput,
    config: &WorkloadConfig,
) -> Result<SugestaoRecursoResponse> {
    validate(input, config)?;

    let cliente = input
        .cod_cliente
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let candidatos: Vec<Candidato> = snapshot
        .recursos
        .iter()
        .map(|recurso| Candidato {
            stats: workload::aggregate(recurso, snapshot.lido_em, config),
            historico_cliente: cliente.map_or(0, |c| recurso.chamados_do_cliente(c)),
            cliente,
        })
        .collect();

    let ativos: Vec<i64> = candidatos.iter().map(|c| c.stats.total_chamados_ativos).collect();
    let mediana_ativos = mediana(&ativos);

    let mut ranking: Vec<SuggestionResult> = candidatos
        .iter()
        .map(|c| avaliar(c, input.prioridade, mediana_ativos, config))
        .collect();
    ranking.sort_by(ranking_order);

    let recomendacoes_gerais = recomendacoes_gerais(&ranking, input.prioridade, config);

    Ok(SugestaoRecursoResponse {
        sugestao: Sugestao {
            recurso_recomendado: ranking.first().cloned(),
            ranking,
        },
        recomendacoes_gerais,
    })
}

fn avaliar(
    candidato: &Candidato,
    prioridade: i32,
    mediana_ativos: f64,
    config: &WorkloadConfig,
) -> SuggestionResult {
    let stats = &candidato.stats;
    let score = score_adequacao(stats, prioridade, candidato.historico_cliente, config);
    let adequacao = classify_adequacao(score, stats.recomendacao, config);
    let chamado_alta = prioridade >= config.prioridade.alta;
    let ativos = stats.total_chamados_ativos;

    let mut vantagens = Vec::new();
    let mut desvantagens = Vec::new();

    if ativos == 0 {
        vantagens.push("sem chamados ativos".to_string());
    } else if ativos as f64 > mediana_ativos {
        desvantagens.push(format!("carga acima da mediana ({ativos} chamados ativos)"));
    } else if !stats.recomendacao.is_overloaded() {
        vantagens.push(format!("baixa carga atual ({ativos} chamados ativos)"));
    }

    if stats.chamados_criticos > 0 {
        desvantagens.push(format!(
            "já possui {} chamado(s) crítico(s)",
            stats.chamados_criticos
        ));
    } else if ativos > 0 {
        vantagens.push("nenhum chamado crítico".to_string());
    }

    if stats.recomendacao.is_overloaded() {
        desvantagens.push(format!("carga atual {}", stats.recomendacao));
    }

    if chamado_alta && ativos > 0 {
        if stats.percentual_alta_prioridade >= 50.0 {
            desvantagens.push(format!(
                "{:.1}% dos chamados ativos já são de alta prioridade",
                stats.percentual_alta_prioridade
            ));
        } else if stats.chamados_alta_prioridade == 0 {
            vantagens.push("nenhum chamado de alta prioridade em andamento".to_string());
        }
    }

    if let Some(cliente) = candidato.cliente {
        if candidato.historico_cliente > 0 {
            if stats.recomendacao == WorkloadBucket::Critico {
                desvantagens.push(format!(
                    "histórico com o cliente {cliente} desconsiderado pela carga crítica"
                ));
            } else {
                vantagens.push(format!(
                    "já atendeu o cliente {cliente} ({} chamado(s) recentes)",
                    candidato.historico_cliente
                ));
            }
        }
    }

    if let Some(horas) = stats.tempo_medio_resolucao {
        if horas <= 24.0 {
            vantagens.push(format!("resolve chamados em {horas:.1}h em média"));
        }
    }

    SuggestionResult {
        cod_recurso: stats.cod_recurso,
        nome_recurso: stats.nome_recurso.clone(),
        score_adequacao: score,
        adequacao,
        recomendacao: recomendacao_adequacao(adequacao).to_string(),
        vantagens,
        desvantagens,
        chamados_ativos: ativos,
        chamados_criticos: stats.chamados_criticos,
        carga_atual: stats.recomendacao,
    }
}

fn recomendacao_adequacao(adequacao: AdequacyTier) -> &'static str {
    match adequacao {
        AdequacyTier::Excelente => "Recurso ideal para receber este chamado",
        AdequacyTier::Bom => "Recurso adequado para receber este chamado",
        AdequacyTier::Moderado => "Pode receber o chamado, acompanhe a carga de trabalho",
        AdequacyTier::Baixo => "Atribuir apenas se não houver alternativa",
        AdequacyTier::Inadequado => "Não recomendado, recurso sem capacidade no momento",
    }
}

fn recomendacoes_gerais(
    ranking: &[SuggestionResult],
    prioridade: i32,
    config: &WorkloadConfig,
) -> Vec<String> {
    let mut gerais = Vec::new();

    let Some(melhor) = ranking.first() else {
        gerais.push("Nenhum recurso ativo configurado para receber chamados".to_string());
        return gerais;
    };

    if melhor.score_adequacao < config.adequacao.limiar_moderado {
        gerais.push(
            "Nenhum recurso disponível com baixa carga, considere redistribuir os chamados"
                .to_string(),
        );
    }

    let sobrecarregados = ranking.iter().filter(|r| r.carga_atual.is_overloaded()).count();
    let percentual = sobrecarregados as f64 / ranking.len() as f64 * 100.0;
    if prioridade >= config.prioridade.alta
        && percentual > config.alertas.max_percentual_sobrecarregados
    {
        gerais.push(format!(
            "Chamado de alta prioridade com {sobrecarregados} de {} recursos sobrecarregados, considere escalonar",
            ranking.len()
        ));
    }

    if melhor.chamados_criticos > 0 {
        gerais.push(format!(
            "{} já possui chamados críticos, acompanhe os prazos após a atribuição",
            melhor.nome_recurso
        ));
    }

    gerais
}
