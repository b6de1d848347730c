//! # Fusão de Spans e Mascaramento
//!
//! Junta os spans do [`crate::pattern`] com os nomes de pessoa do NER numa
//! única lista de anotações e reescreve o texto trocando cada trecho por
//! `[<categoria>]`.
//!
//! ## Estratégias
//!
//! | Estratégia  | Substituição                  | "Já mascarado?"                      |
//! |-------------|-------------------------------|--------------------------------------|
//! | `Substring` | toda ocorrência da substring  | substring ainda presente no texto    |
//! | `Offset`    | só o intervalo detectado      | sobreposição de intervalos           |
//!
//! `Substring` reproduz o comportamento histórico, inclusive as arestas:
//! uma PII que reaparece em outro contexto também é mascarada, e um nome cuja
//! grafia ainda existe em outro ponto do texto é pulado mesmo que seu próprio
//! intervalo nunca tenha sido tocado.
//!
//! `Offset` resolve sobreposições entre regras pelo span mais longo à
//! esquerda (empate: ordem da tabela), descarta nomes que cruzam qualquer
//! span de regra e corta o texto uma única vez.
//!
//! Nas duas estratégias a lista de anotações sai na ordem da tabela de regras
//! (todos os matches de uma regra juntos) seguida dos nomes na ordem do NER.

use std::cmp::Reverse;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::span::{placeholder, EntitySpan, MaskedDocument, FULL_NAME_LABEL};

/// Estratégia de substituição.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskStrategy {
    /// Substituição textual de todas as ocorrências (paridade com o legado)
    Substring,
    /// Fusão de intervalos sem sobreposição, corte único
    #[default]
    Offset,
}

impl FromStr for MaskStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "offset" => Ok(Self::Offset),
            other => Err(other.to_string()),
        }
    }
}

/// Aplica a estratégia configurada.
#[derive(Debug, Clone, Copy, Default)]
pub struct Masker {
    strategy: MaskStrategy,
}

impl Masker {
    pub fn new(strategy: MaskStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> MaskStrategy {
        self.strategy
    }

    /// Mascara `text`.
    ///
    /// `pattern_spans` deve vir na ordem do detector (tabela, depois texto);
    /// `person_spans` na ordem de emissão do NER, com categoria `full_name`.
    pub fn mask(&self, text: &str, pattern_spans: &[EntitySpan], person_spans: &[EntitySpan]) -> MaskedDocument {
        match self.strategy {
            MaskStrategy::Substring => mask_by_substring(text, pattern_spans, person_spans),
            MaskStrategy::Offset => mask_by_offset(text, pattern_spans, person_spans),
        }
    }
}

fn mask_by_substring(text: &str, pattern_spans: &[EntitySpan], person_spans: &[EntitySpan]) -> MaskedDocument {
    let mut redacted = text.to_string();
    let mut annotations = Vec::with_capacity(pattern_spans.len() + person_spans.len());

    for span in pattern_spans {
        redacted = redacted.replace(&span.text, &span.placeholder());
        annotations.push(span.clone());
    }

    for person in person_spans {
        if redacted.contains(&person.text) {
            redacted = redacted.replace(&person.text, &placeholder(FULL_NAME_LABEL));
            annotations.push(EntitySpan {
                category: FULL_NAME_LABEL.to_string(),
                ..person.clone()
            });
        } else {
            debug!(start = person.start, end = person.end, "nome já mascarado, ignorado");
        }
    }

    MaskedDocument {
        redacted_text: redacted,
        annotations,
    }
}

fn mask_by_offset(text: &str, pattern_spans: &[EntitySpan], person_spans: &[EntitySpan]) -> MaskedDocument {
    // Índices na ordem original; a ordem de emissão vale como prioridade de regra.
    let mut order: Vec<usize> = (0..pattern_spans.len()).collect();
    order.sort_by_key(|&i| {
        let s = &pattern_spans[i];
        (s.start, Reverse(s.len()), i)
    });

    let mut kept_pattern = vec![false; pattern_spans.len()];
    let mut last_end = 0;
    for i in order {
        let span = &pattern_spans[i];
        if span.start >= last_end {
            kept_pattern[i] = true;
            last_end = span.end;
        }
    }

    let mut annotations: Vec<EntitySpan> = pattern_spans
        .iter()
        .zip(&kept_pattern)
        .filter(|(_, kept)| **kept)
        .map(|(span, _)| span.clone())
        .collect();
    let pattern_count = annotations.len();

    for person in person_spans {
        if annotations.iter().any(|kept| kept.overlaps(person)) {
            debug!(start = person.start, end = person.end, "nome sobreposto a outro span, ignorado");
            continue;
        }
        annotations.push(EntitySpan {
            category: FULL_NAME_LABEL.to_string(),
            ..person.clone()
        });
    }
    debug!(patterns = pattern_count, persons = annotations.len() - pattern_count, "spans mantidos");

    let mut by_position: Vec<&EntitySpan> = annotations.iter().collect();
    by_position.sort_by_key(|s| s.start);

    let mut redacted = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in by_position {
        redacted.push_str(&text[cursor..span.start]);
        redacted.push_str(&span.placeholder());
        cursor = span.end;
    }
    redacted.push_str(&text[cursor..]);

    MaskedDocument {
        redacted_text: redacted,
        annotations,
    }
}
